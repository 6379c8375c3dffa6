use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{self, Context, Key};

use crate::canvas::{self, SharedCanvas, SimulationHint};
use crate::scheduler::SimulationScheduler;

mod graph;
mod render_utils;
mod ui;

pub struct BubbleCanvasApp {
    canvas: SharedCanvas,
    scheduler: SimulationScheduler,
    rename_draft: Option<RenameDraft>,
}

/// Text being edited in the rename dialog, keyed to the bubble it belongs to.
struct RenameDraft {
    bubble_id: String,
    text: String,
}

impl BubbleCanvasApp {
    pub fn new(cc: &eframe::CreationContext<'_>, canvas: SharedCanvas, tick_interval: Duration) -> Self {
        let repaint_ctx = cc.egui_ctx.clone();
        let mut scheduler = SimulationScheduler::new(Arc::clone(&canvas), tick_interval)
            .with_listener(move || repaint_ctx.request_repaint());
        scheduler.start();

        Self {
            canvas,
            scheduler,
            rename_draft: None,
        }
    }

    fn apply_hints(&mut self, hints: Vec<SimulationHint>) {
        for hint in hints {
            self.scheduler.apply(hint);
        }
    }
}

impl eframe::App for BubbleCanvasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if ctx.input(|input| input.key_pressed(Key::Escape)) {
            canvas::lock(&self.canvas).dismiss();
        }

        let (snapshot, rect) = egui::CentralPanel::default()
            .frame(egui::Frame::new())
            .show(ctx, |ui| self.draw_canvas(ui))
            .inner;

        self.show_menus(ctx, rect, &snapshot);
        self.show_rename_dialog(ctx, &snapshot);
        self.show_content_overlay(ctx, &snapshot);
    }
}
