//! Chart Viewer Widget
//! Central scrollable panel showing the current view, or the pipeline's
//! error message.

use crate::charts::{ChartPlotter, Labels, ViewOutcome};
use crate::pipeline::ViewKind;
use egui::{Color32, RichText, ScrollArea};

const CARD_WIDTH: f32 = 900.0;

#[derive(Default)]
pub struct ChartViewer {
    pub view: Option<ViewKind>,
    pub outcome: Option<ViewOutcome>,
    pub error: Option<String>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.view = None;
        self.outcome = None;
        self.error = None;
    }

    pub fn set_outcome(&mut self, view: ViewKind, outcome: ViewOutcome) {
        self.view = Some(view);
        self.outcome = Some(outcome);
        self.error = None;
    }

    pub fn set_error(&mut self, message: String) {
        self.outcome = None;
        self.error = Some(message);
    }

    pub fn show(&mut self, ui: &mut egui::Ui, labels: &Labels) {
        if let Some(message) = &self.error {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new(message)
                        .size(18.0)
                        .color(Color32::from_rgb(220, 53, 69)),
                );
            });
            return;
        }

        let Some(outcome) = self.outcome.as_mut() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(labels.nothing_rendered).size(20.0));
            });
            return;
        };

        let border_color = if outcome.is_no_data() {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::from_rgb(100, 149, 237)
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Frame::none()
                    .rounding(8.0)
                    .stroke(egui::Stroke::new(2.0, border_color))
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .inner_margin(12.0)
                    .show(ui, |ui| {
                        ui.set_width(CARD_WIDTH.min(ui.available_width()));
                        ChartPlotter::draw(ui, outcome, true);
                    });
            });
    }
}
