use eframe::egui::{
    self, Align2, Color32, CornerRadius, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2,
};

use crate::ledger::ExpenseId;
use crate::util::{format_amount, title_case};

use super::ViewModel;
use super::layout::{CANVAS_HEIGHT, DAY_HEIGHT, DAY_WIDTH};

// Palette of the drawn ledger page.
const PAPER: Color32 = Color32::from_rgb(0xff, 0xf8, 0xfa);
const MIST: Color32 = Color32::from_rgb(0xe1, 0xec, 0xea);
const INK: Color32 = Color32::from_rgb(0x51, 0x65, 0x61);

const PRIMARY_POINTER: u64 = 0;
const GRAB_PADDING: f32 = 2.0;

fn to_screen(rect: Rect, world: Pos2) -> Pos2 {
    rect.min + world.to_vec2()
}

fn to_world(rect: Rect, screen: Pos2) -> Pos2 {
    (screen - rect.min).to_pos2()
}

fn stroke_box(painter: &egui::Painter, center: Pos2, half: egui::Vec2, stroke: Stroke) {
    let top_left = center - half;
    let top_right = center + vec2(half.x, -half.y);
    let bottom_right = center + half;
    let bottom_left = center + vec2(-half.x, half.y);
    painter.line_segment([top_left, top_right], stroke);
    painter.line_segment([top_right, bottom_right], stroke);
    painter.line_segment([bottom_right, bottom_left], stroke);
    painter.line_segment([bottom_left, top_left], stroke);
}

impl ViewModel {
    /// Nearest expense node whose circle contains `pos`, in world space.
    fn node_at(&self, pos: Pos2) -> Option<ExpenseId> {
        self.sim
            .nodes()
            .iter()
            .filter_map(|node| {
                let distance = node.pos.distance(pos);
                (distance <= node.radius + GRAB_PADDING).then_some((node.id, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Paint one frame of the diagram and route pointer input. All layout
    /// and drop decisions live in the layout/drag modules; this only
    /// synchronizes pixels and events with them.
    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui) {
        self.ensure_layout();

        let desired = vec2(self.canvas_width, CANVAS_HEIGHT);
        let (rect, response) = ui.allocate_exact_size(desired, Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, CornerRadius::ZERO, MIST);

        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let physics_moving = self.sim.step(frame_delta_seconds);
        if physics_moving || self.drag.is_dragging() {
            ui.ctx().request_repaint();
        }

        // Pointer routing. One logical pointer; the drag controller keeps
        // the pin ahead of the next simulation step.
        let pointer_world = response
            .interact_pointer_pos()
            .map(|pointer| to_world(rect, pointer));
        if response.drag_started()
            && let Some(pos) = pointer_world
            && let Some(id) = self.node_at(pos)
        {
            self.drag.pointer_down(PRIMARY_POINTER, id, &mut self.sim);
        }
        if response.dragged()
            && let Some(pos) = pointer_world
        {
            self.drag.pointer_move(
                PRIMARY_POINTER,
                pos,
                &self.dataset.categories,
                &self.dataset.day_slots,
                &mut self.sim,
            );
        }
        if response.drag_stopped()
            && let Some((expense, target)) = self.drag.pointer_up(PRIMARY_POINTER, &mut self.sim)
        {
            self.apply_drop(expense, target);
        }

        let hover_world = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .map(|pointer| to_world(rect, pointer));
        let hovered = if self.drag.is_dragging() {
            None
        } else {
            hover_world.and_then(|pos| self.node_at(pos))
        };
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grab);
        }

        self.draw_day_slots(rect, &painter);
        self.draw_categories(rect, &painter, &response);
        self.draw_expenses(rect, &painter);
        self.draw_tooltip(rect, &painter, hovered);

        if self.sim.is_empty() {
            painter.text(
                rect.center_top() + vec2(0.0, 60.0),
                Align2::CENTER_CENTER,
                "No expenses in this ledger",
                FontId::proportional(14.0),
                INK.gamma_multiply(0.6),
            );
        }

        if self.layout_dirty {
            ui.ctx().request_repaint();
        }
    }

    fn draw_day_slots(&self, rect: Rect, painter: &egui::Painter) {
        let stroke = Stroke::new(1.0, INK.gamma_multiply(0.35));
        let half = vec2(DAY_WIDTH - 8.0, DAY_HEIGHT - 8.0);
        for slot in &self.dataset.day_slots {
            let center = to_screen(rect, slot.pos);
            stroke_box(painter, center, half, stroke);
            painter.text(
                center + vec2(0.0, -half.y + 12.0),
                Align2::CENTER_CENTER,
                slot.date.format("%m/%d").to_string(),
                FontId::proportional(11.0),
                INK.gamma_multiply(0.6),
            );
        }
    }

    fn draw_categories(&mut self, rect: Rect, painter: &egui::Painter, response: &egui::Response) {
        let mut delete_request = None;

        for bubble in &self.dataset.categories {
            let center = to_screen(rect, bubble.center);
            painter.circle_filled(center, bubble.radius, PAPER);
            painter.circle_stroke(center, bubble.radius, Stroke::new(1.5, INK));
            painter.text(
                center,
                Align2::CENTER_CENTER,
                &bubble.name,
                FontId::proportional(13.0),
                INK,
            );
            if let Some(category) = self.store.category(&bubble.name) {
                painter.text(
                    center + vec2(0.0, 16.0),
                    Align2::CENTER_CENTER,
                    format_amount(category.total),
                    FontId::proportional(11.0),
                    INK.gamma_multiply(0.7),
                );
            }

            let delete_anchor = center + vec2(bubble.radius * 0.75, -bubble.radius * 0.75);
            painter.text(
                delete_anchor,
                Align2::CENTER_CENTER,
                "✕",
                FontId::proportional(12.0),
                INK.gamma_multiply(0.55),
            );
            if response.clicked()
                && let Some(pointer) = response.interact_pointer_pos()
                && pointer.distance(delete_anchor) <= 8.0
            {
                delete_request = Some(bubble.name.clone());
            }
        }

        if let Some(name) = delete_request {
            self.remove_category(&name);
        }
    }

    fn draw_expenses(&self, rect: Rect, painter: &egui::Painter) {
        for node in self.sim.nodes() {
            let center = to_screen(rect, node.pos);
            painter.circle_filled(center, node.radius, PAPER);

            let categorized = self
                .store
                .expense(node.id)
                .is_some_and(|expense| expense.category_count > 0);
            if categorized {
                painter.circle_stroke(center, node.radius, Stroke::new(1.5, INK));
            }
        }
    }

    fn draw_tooltip(&self, rect: Rect, painter: &egui::Painter, hovered: Option<ExpenseId>) {
        let Some(id) = hovered else {
            return;
        };
        let (Some(node), Some(expense)) = (self.sim.node(id), self.store.expense(id)) else {
            return;
        };

        let text = format!(
            "{}  {}",
            title_case(&expense.name),
            format_amount(expense.amount)
        );
        let galley = painter.layout_no_wrap(text, FontId::proportional(13.0), INK);
        let anchor = to_screen(rect, node.pos) + vec2(0.0, node.radius + 14.0);
        let background = Rect::from_center_size(anchor, galley.size() + vec2(12.0, 6.0));
        painter.rect_filled(
            background,
            CornerRadius::same(3),
            Color32::from_rgba_unmultiplied(0xff, 0xf8, 0xfa, 217),
        );
        painter.galley(background.min + vec2(6.0, 3.0), galley, INK);
    }
}
