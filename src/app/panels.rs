use eframe::egui::{self, Context, Key, RichText, TextEdit};

use super::ViewModel;

pub(in crate::app) fn header(ctx: &Context, model: &mut ViewModel) {
    egui::TopBottomPanel::top("ledger-header").show(ctx, |ui| {
        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            ui.horizontal(|ui| {
                // Rough centering for the fixed-width title row.
                let label = format!("Week of {}", model.focused_week.format("%B %d, %Y"));
                ui.add_space((ui.available_width() - 340.0).max(0.0) / 2.0);
                if ui.button(RichText::new("←").heading()).clicked() {
                    model.previous_week();
                }
                ui.heading(label);
                if ui.button(RichText::new("→").heading()).clicked() {
                    model.next_week();
                }
            });

            ui.add_space(4.0);
            let edit = TextEdit::singleline(&mut model.category_draft)
                .hint_text("Add Category")
                .desired_width(200.0);
            let response = ui.add(edit);
            if response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter)) {
                model.submit_category_draft();
            }
            if ui.input(|input| input.key_pressed(Key::Escape)) {
                model.category_draft.clear();
            }
        });
        ui.add_space(8.0);
    });
}
