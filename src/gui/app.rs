//! Crime Atlas Main Application
//! Main window: sidebar with profile, page selector and control panel, and a
//! central page (biography or chart viewer).

use crate::config::AppConfig;
use crate::gui::{BiographyPage, ChartViewer, ControlPanel, ControlPanelAction};
use crate::pipeline::{Datasets, Page};
use egui::{Color32, RichText, SidePanel};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Main application window.
pub struct CrimeAtlasApp {
    config: AppConfig,
    datasets: Option<Datasets>,
    page: Page,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    rng: StdRng,
    /// Set when the last load failed because an input file is missing.
    missing_file: bool,
}

impl CrimeAtlasApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let control_panel = ControlPanel::new(
            config.stats_path.clone(),
            config.regions_path.clone(),
            &config.labels,
        );

        let mut app = Self {
            config,
            datasets: None,
            page: Page::default(),
            control_panel,
            chart_viewer: ChartViewer::new(),
            rng,
            missing_file: false,
        };
        app.reload();
        app
    }

    /// Load both files from the configured paths, then render the current view.
    fn reload(&mut self) {
        self.chart_viewer.clear();
        match Datasets::load(
            &self.config.stats_path,
            &self.config.regions_path,
            &self.config.code_property,
            self.config.mapping.clone(),
        ) {
            Ok(datasets) => {
                self.control_panel.update_options(&datasets);
                let status = self
                    .config
                    .labels
                    .loaded_status(datasets.stats.len(), datasets.geometries.len());
                self.control_panel.set_status(&status);
                self.datasets = Some(datasets);
                self.missing_file = false;
                self.rerender();
            }
            Err(e) => {
                error!("Failed to load datasets: {}", e);
                let message = e.user_message(&self.config.labels);
                self.missing_file = e.is_missing_file();
                self.datasets = None;
                self.control_panel.set_status(&message);
                self.chart_viewer.set_error(message);
            }
        }
    }

    /// Run the selected view once for the current selection.
    fn rerender(&mut self) {
        let Some(datasets) = &self.datasets else {
            return;
        };
        let view = self.control_panel.view;
        match datasets.render(
            view,
            &self.control_panel.selection,
            &self.config.options,
            &self.config.labels,
            &mut self.rng,
        ) {
            Ok(outcome) => self.chart_viewer.set_outcome(view, outcome),
            Err(e) => {
                error!("Failed to render {} view: {}", view.slug(), e);
                self.chart_viewer
                    .set_error(e.user_message(&self.config.labels));
            }
        }
    }

    fn handle_browse_stats(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter(self.config.labels.csv_files, &["csv"])
            .pick_file()
        {
            info!("Statistics file selected: {}", path.display());
            self.control_panel.stats_path = path.clone();
            self.config.stats_path = path;
            self.reload();
        }
    }

    fn handle_browse_regions(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter(self.config.labels.geojson_files, &["geojson", "json"])
            .pick_file()
        {
            info!("Regions file selected: {}", path.display());
            self.control_panel.regions_path = path.clone();
            self.config.regions_path = path;
            self.reload();
        }
    }

    fn handle_filter_column_changed(&mut self) {
        if let (Some(datasets), Some(column)) = (
            &self.datasets,
            self.control_panel.selection.filter_column.clone(),
        ) {
            let values = datasets.column_values(&column);
            self.control_panel.update_column_values(values);
        }
        self.rerender();
    }

    fn show_missing_file(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label(
                RichText::new(self.config.labels.missing_file)
                    .size(18.0)
                    .color(Color32::from_rgb(220, 53, 69)),
            );
            ui.add_space(12.0);
            if ui.button("📂 CSV").clicked() {
                self.handle_browse_stats();
            }
            if ui.button("📂 GeoJSON").clicked() {
                self.handle_browse_regions();
            }
        });
    }
}

impl eframe::App for CrimeAtlasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - profile, page selector and controls
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(360.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    BiographyPage::profile_card(ui, &self.config.profile);
                    ui.add_space(10.0);
                    ui.separator();

                    ui.horizontal(|ui| {
                        for page in [Page::Biography, Page::Visualisation] {
                            ui.selectable_value(&mut self.page, page, page.title(&self.config.labels));
                        }
                    });
                    ui.separator();
                    ui.add_space(5.0);

                    if self.page == Page::Visualisation {
                        let action = self.control_panel.show(ui, &self.config.labels);
                        match action {
                            ControlPanelAction::BrowseStats => self.handle_browse_stats(),
                            ControlPanelAction::BrowseRegions => self.handle_browse_regions(),
                            ControlPanelAction::FilterColumnChanged => {
                                self.handle_filter_column_changed()
                            }
                            ControlPanelAction::SelectionChanged => self.rerender(),
                            ControlPanelAction::None => {}
                        }
                    }
                });
            });

        // Central panel - current page
        egui::CentralPanel::default().show(ctx, |ui| match self.page {
            Page::Biography => BiographyPage::show(ui, &self.config.profile),
            Page::Visualisation if self.missing_file => self.show_missing_file(ui),
            Page::Visualisation => self.chart_viewer.show(ui, &self.config.labels),
        });
    }
}
