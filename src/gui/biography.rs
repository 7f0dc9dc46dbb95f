//! Biography page and the sidebar profile card.

use crate::config::Profile;
use egui::{Color32, RichText, ScrollArea};

pub struct BiographyPage;

impl BiographyPage {
    /// Name, headline and contact links.
    pub fn profile_card(ui: &mut egui::Ui, profile: &Profile) {
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new(&profile.name)
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            if !profile.headline.is_empty() {
                ui.label(RichText::new(&profile.headline).size(11.0).color(Color32::GRAY));
            }
        });

        if !profile.contacts.is_empty() {
            ui.add_space(6.0);
            for contact in &profile.contacts {
                ui.hyperlink_to(&contact.label, &contact.url);
            }
        }
    }

    pub fn show(ui: &mut egui::Ui, profile: &Profile) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(&profile.name);
                if !profile.headline.is_empty() {
                    ui.label(RichText::new(&profile.headline).italics());
                }
                ui.add_space(12.0);

                for section in &profile.sections {
                    ui.label(RichText::new(&section.title).size(16.0).strong());
                    ui.add_space(4.0);
                    ui.label(&section.body);
                    ui.add_space(12.0);
                }
            });
    }
}
