use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};
use eframe::egui::{Pos2, pos2};

use crate::ledger::{ExpenseId, LedgerStore};
use crate::util::{day_of_week, week_floor};

// Fixed diagram geometry. The ledger band sits below the category row,
// with the focused week's arc above the week-by-week grid.
pub const BAND_HEIGHT: f32 = 650.0;
pub const DAY_WIDTH: f32 = 55.0;
pub const DAY_HEIGHT: f32 = 75.0;
pub const MARGIN_LEFT: f32 = 40.0;
pub const MARGIN_TOP: f32 = 20.0;
pub const MARGIN_RIGHT: f32 = 40.0;
pub const MARGIN_BOTTOM: f32 = 20.0;
pub const TOP_PADDING: f32 = 150.0;
pub const BASE_RADIUS: f32 = 8.0;
pub const CANVAS_HEIGHT: f32 = 1800.0;

const CATEGORY_ROW_Y: f32 = 300.0;
const CATEGORY_MIN_RADIUS: f32 = 30.0;
const CATEGORY_MAX_RADIUS: f32 = 65.0;

/// Linear domain-to-range mapping. A collapsed domain maps everything to
/// the range midpoint instead of dividing by zero.
#[derive(Clone, Copy, Debug)]
pub struct LinearScale {
    domain: (f32, f32),
    range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f32) -> f32 {
        let span = self.domain.1 - self.domain.0;
        if span.abs() <= f32::EPSILON {
            return (self.range.0 + self.range.1) * 0.5;
        }
        let t = (value - self.domain.0) / span;
        self.range.0 + t * (self.range.1 - self.range.0)
    }
}

fn week_ordinal(week: NaiveDate) -> f32 {
    week.num_days_from_ce() as f32
}

/// Maps domain values (day of week, week, amount) to screen coordinates.
/// Rebuilt on every layout pass since the domains follow the expense list.
pub struct CoordinateMapper {
    day_x: LinearScale,
    week_y: LinearScale,
    amount_radius: LinearScale,
    focused_week: NaiveDate,
}

impl CoordinateMapper {
    pub fn new(store: &LedgerStore, focused_week: NaiveDate, width: f32) -> Self {
        let expenses = store.expenses();

        let mut min_amount = f32::INFINITY;
        let mut max_amount = f32::NEG_INFINITY;
        let mut min_week = f32::INFINITY;
        let mut max_week = f32::NEG_INFINITY;
        for expense in expenses {
            min_amount = min_amount.min(expense.amount);
            max_amount = max_amount.max(expense.amount);
            let week = week_ordinal(week_floor(expense.date));
            min_week = min_week.min(week);
            max_week = max_week.max(week);
        }
        if expenses.is_empty() {
            min_amount = 0.0;
            max_amount = 0.0;
            min_week = 0.0;
            max_week = 0.0;
        }

        Self {
            day_x: LinearScale::new((0.0, 6.0), (MARGIN_LEFT, width - MARGIN_RIGHT)),
            week_y: LinearScale::new(
                (min_week, max_week),
                (BAND_HEIGHT - MARGIN_BOTTOM, MARGIN_TOP),
            ),
            amount_radius: LinearScale::new(
                (min_amount, max_amount),
                (BASE_RADIUS, 3.0 * BASE_RADIUS),
            ),
            focused_week,
        }
    }

    pub fn day_x(&self, day_index: usize) -> f32 {
        self.day_x.map(day_index as f32)
    }

    pub fn amount_radius(&self, amount: f32) -> f32 {
        self.amount_radius.map(amount)
    }

    /// Target position for a date. With `curve_focused_week`, dates inside
    /// the focused week leave the grid and spread along a symmetric arc
    /// (middle day lowest, edges raised).
    pub fn day_position(&self, date: NaiveDate, curve_focused_week: bool) -> Pos2 {
        let day_index = day_of_week(date);
        let week = week_floor(date);
        let x = self.day_x(day_index);

        let mut y = if curve_focused_week && week == self.focused_week {
            let offset = (3 - day_index as i32).abs() as f32;
            BAND_HEIGHT - 2.0 * DAY_HEIGHT - 0.5 * offset * DAY_HEIGHT
        } else {
            self.week_y.map(week_ordinal(week)) + BAND_HEIGHT + 2.0 * DAY_HEIGHT
        };
        y += TOP_PADDING;

        pos2(x, y)
    }
}

/// Per-expense simulation target, consumed by `Simulation::sync`.
#[derive(Clone, Copy, Debug)]
pub struct NodeTarget {
    pub id: ExpenseId,
    pub focus: Pos2,
    pub radius: f32,
}

/// A calendar day an expense can be dropped onto.
#[derive(Clone, Copy, Debug)]
pub struct DaySlot {
    pub date: NaiveDate,
    pub pos: Pos2,
}

/// On-screen category bubble; position and radius feed both painting and
/// drag hit-testing.
#[derive(Clone, Debug)]
pub struct CategoryBubble {
    pub name: String,
    pub center: Pos2,
    pub radius: f32,
}

/// Everything the simulation, drag controller and painter read for one
/// view of the ledger. Recomputed whenever expenses, categories or the
/// focused week change.
#[derive(Default)]
pub struct LayoutDataset {
    pub targets: Vec<NodeTarget>,
    pub day_slots: Vec<DaySlot>,
    pub categories: Vec<CategoryBubble>,
}

impl LayoutDataset {
    pub fn recompute(store: &LedgerStore, focused_week: NaiveDate, width: f32) -> Self {
        let mapper = CoordinateMapper::new(store, focused_week, width);

        let targets = store
            .expenses()
            .iter()
            .map(|expense| NodeTarget {
                id: expense.id,
                focus: mapper.day_position(expense.date, true),
                radius: mapper.amount_radius(expense.amount),
            })
            .collect();

        // Focused-week slots first so they win the per-date dedup against
        // the grid row for the same week.
        let mut seen = HashSet::new();
        let mut day_slots = Vec::new();
        for offset in 0..7 {
            let date = focused_week + Duration::days(offset);
            if seen.insert(date) {
                day_slots.push(DaySlot {
                    date,
                    pos: mapper.day_position(date, true),
                });
            }
        }
        let extent = store.expenses().iter().map(|expense| expense.date);
        if let (Some(first), Some(last)) = (extent.clone().min(), extent.max()) {
            let mut date = first;
            while date <= last {
                if seen.insert(date) {
                    day_slots.push(DaySlot {
                        date,
                        pos: mapper.day_position(date, false),
                    });
                }
                date += Duration::days(1);
            }
        }

        let categories = Self::category_row(store, width);

        Self {
            targets,
            day_slots,
            categories,
        }
    }

    fn category_row(store: &LedgerStore, width: f32) -> Vec<CategoryBubble> {
        let count = store.categories().len();
        if count == 0 {
            return Vec::new();
        }

        let span = (width - MARGIN_LEFT - MARGIN_RIGHT) / count as f32;
        store
            .categories()
            .iter()
            .enumerate()
            .map(|(index, category)| CategoryBubble {
                name: category.name.clone(),
                center: pos2(
                    MARGIN_LEFT + span * (index as f32 + 0.5),
                    CATEGORY_ROW_Y,
                ),
                radius: (CATEGORY_MIN_RADIUS + category.total.max(0.0).sqrt() * 1.5)
                    .clamp(CATEGORY_MIN_RADIUS, CATEGORY_MAX_RADIUS),
            })
            .collect()
    }
}
