use chrono::NaiveDate;
use eframe::egui::Pos2;

use crate::ledger::ExpenseId;

use super::layout::{CategoryBubble, DAY_HEIGHT, DAY_WIDTH, DaySlot};
use super::physics::Simulation;

pub type PointerId = u64;

/// What a released node commits to: toggling a category link or moving
/// the expense to a calendar day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HitTarget {
    Category(String),
    Day(NaiveDate),
}

struct ActiveDrag {
    pointer: PointerId,
    expense: ExpenseId,
    hit: Option<HitTarget>,
}

/// Drag state machine, one slot per pointer. Transitions take explicit
/// pointer parameters so the controller stays independent of the input
/// backend; the view layer feeds it pointer events and applies the commit
/// returned on release.
#[derive(Default)]
pub struct DragController {
    active: Vec<ActiveDrag>,
}

impl DragController {
    pub fn is_dragging(&self) -> bool {
        !self.active.is_empty()
    }

    /// Pin the node at its current live position and hold the simulation
    /// floor. Ignored if the node is unknown or already owned by another
    /// pointer.
    pub fn pointer_down(&mut self, pointer: PointerId, expense: ExpenseId, sim: &mut Simulation) {
        if self.active.iter().any(|drag| drag.pointer == pointer)
            || self.active.iter().any(|drag| drag.expense == expense)
        {
            return;
        }
        let Some(pos) = sim.position(expense) else {
            return;
        };

        sim.pin(expense, pos);
        sim.hold_floor();
        self.active.push(ActiveDrag {
            pointer,
            expense,
            hit: None,
        });
    }

    /// Move the pin to the pointer and re-resolve the drop target.
    pub fn pointer_move(
        &mut self,
        pointer: PointerId,
        pos: Pos2,
        categories: &[CategoryBubble],
        days: &[DaySlot],
        sim: &mut Simulation,
    ) {
        let Some(drag) = self
            .active
            .iter_mut()
            .find(|drag| drag.pointer == pointer)
        else {
            return;
        };

        sim.pin(drag.expense, pos);
        drag.hit = hit_test(pos, categories, days);
    }

    /// Release the pin and the floor; returns the commit to apply, if the
    /// pointer was over a target when it let go.
    pub fn pointer_up(
        &mut self,
        pointer: PointerId,
        sim: &mut Simulation,
    ) -> Option<(ExpenseId, HitTarget)> {
        let index = self
            .active
            .iter()
            .position(|drag| drag.pointer == pointer)?;
        let drag = self.active.remove(index);

        sim.release(drag.expense);
        sim.release_floor();
        drag.hit.map(|hit| (drag.expense, hit))
    }
}

/// Resolve the drop target under `pos`. Categories are scanned first and
/// day slots second, later matches overwriting earlier ones, so a day
/// slot beats a category when both boxes contain the point.
fn hit_test(pos: Pos2, categories: &[CategoryBubble], days: &[DaySlot]) -> Option<HitTarget> {
    let mut hit = None;
    for bubble in categories {
        if (pos.x - bubble.center.x).abs() < bubble.radius
            && (pos.y - bubble.center.y).abs() < bubble.radius
        {
            hit = Some(HitTarget::Category(bubble.name.clone()));
        }
    }
    for slot in days {
        if (pos.x - slot.pos.x).abs() < DAY_WIDTH && (pos.y - slot.pos.y).abs() < DAY_HEIGHT {
            hit = Some(HitTarget::Day(slot.date));
        }
    }
    hit
}
