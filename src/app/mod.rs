use chrono::{Duration, NaiveDate, Utc};
use eframe::egui::{self, Context};

use crate::ledger::{ExpenseId, LedgerStore};
use crate::util::week_floor;

mod drag;
mod layout;
mod panels;
mod physics;
mod view;

use drag::{DragController, HitTarget};
use layout::LayoutDataset;
use physics::Simulation;

const DEFAULT_CATEGORIES: [&str; 3] = ["Restaurants", "Travel", "Dessert"];

pub struct LedgerApp {
    model: ViewModel,
}

struct ViewModel {
    store: LedgerStore,
    focused_week: NaiveDate,
    canvas_width: f32,
    dataset: LayoutDataset,
    sim: Simulation,
    drag: DragController,
    layout_dirty: bool,
    category_draft: String,
}

impl ViewModel {
    fn new(mut store: LedgerStore, canvas_width: f32) -> Self {
        for name in DEFAULT_CATEGORIES {
            store.add_category(name);
        }
        let focused_week = store
            .latest_week()
            .unwrap_or_else(|| week_floor(Utc::now().date_naive()));

        Self {
            store,
            focused_week,
            canvas_width,
            dataset: LayoutDataset::default(),
            sim: Simulation::new(),
            drag: DragController::default(),
            layout_dirty: true,
            category_draft: String::new(),
        }
    }

    /// Lazy recompute: targets and day slots refresh, live node positions
    /// carry over inside the simulation.
    fn ensure_layout(&mut self) {
        if !self.layout_dirty {
            return;
        }
        self.dataset =
            LayoutDataset::recompute(&self.store, self.focused_week, self.canvas_width);
        self.sim.sync(&self.dataset.targets);
        self.layout_dirty = false;
    }

    fn previous_week(&mut self) {
        self.focused_week -= Duration::weeks(1);
        self.layout_dirty = true;
    }

    fn next_week(&mut self) {
        self.focused_week += Duration::weeks(1);
        self.layout_dirty = true;
    }

    fn submit_category_draft(&mut self) {
        let name = std::mem::take(&mut self.category_draft);
        if self.store.add_category(&name) {
            self.layout_dirty = true;
        }
    }

    fn remove_category(&mut self, name: &str) {
        if self.store.remove_category(name) {
            self.layout_dirty = true;
        }
    }

    fn apply_drop(&mut self, expense: ExpenseId, target: HitTarget) {
        match target {
            HitTarget::Category(name) => {
                self.store.toggle_link(expense, &name);
            }
            HitTarget::Day(date) => {
                self.store.set_date(expense, date);
            }
        }
        self.layout_dirty = true;
    }
}

impl LedgerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, store: LedgerStore, width: f32) -> Self {
        Self {
            model: ViewModel::new(store, width),
        }
    }
}

impl eframe::App for LedgerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        panels::header(ctx, &mut self.model);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.model.draw_canvas(ui);
            });
        });
    }
}
