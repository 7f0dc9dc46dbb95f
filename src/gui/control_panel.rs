//! Control Panel Widget
//! Left side panel with data sources, view selection and the user's filters.

use crate::charts::{AnimationMode, Labels};
use crate::data::RegionCode;
use crate::pipeline::{Datasets, Selection, ViewKind, DEFAULT_DISPLAY_COLUMNS};
use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::path::{Path, PathBuf};

/// Left side control panel with file selection and view controls.
pub struct ControlPanel {
    pub selection: Selection,
    pub view: ViewKind,
    pub stats_path: PathBuf,
    pub regions_path: PathBuf,
    pub categories: Vec<String>,
    pub regions: Vec<RegionCode>,
    pub years: Vec<i32>,
    pub columns: Vec<String>,
    pub column_values: Vec<String>,
    pub selected_display_cols: Vec<bool>,
    pub status: String,
}

impl ControlPanel {
    pub fn new(stats_path: PathBuf, regions_path: PathBuf, labels: &Labels) -> Self {
        Self {
            selection: Selection::default(),
            view: ViewKind::Pie,
            stats_path,
            regions_path,
            categories: Vec::new(),
            regions: Vec::new(),
            years: Vec::new(),
            columns: Vec::new(),
            column_values: Vec::new(),
            selected_display_cols: Vec::new(),
            status: labels.ready.to_string(),
        }
    }

    /// Refresh the choice lists after a (re)load and reset the selection.
    pub fn update_options(&mut self, datasets: &Datasets) {
        self.categories = datasets.categories();
        self.regions = datasets.regions();
        self.years = datasets.years();
        self.columns = datasets.columns();
        self.selected_display_cols = (0..self.columns.len())
            .map(|i| i < DEFAULT_DISPLAY_COLUMNS)
            .collect();
        self.selection = Selection {
            mode: self.selection.mode,
            ..datasets.default_selection()
        };
        self.column_values = self
            .selection
            .filter_column
            .as_deref()
            .map(|c| datasets.column_values(c))
            .unwrap_or_default();
    }

    pub fn update_column_values(&mut self, values: Vec<String>) {
        self.selection.filter_value = values.first().cloned();
        self.column_values = values;
    }

    fn sync_display_columns(&mut self) {
        self.selection.display_columns = Some(
            self.columns
                .iter()
                .zip(&self.selected_display_cols)
                .filter(|(_, &selected)| selected)
                .map(|(col, _)| col.clone())
                .collect(),
        );
    }

    fn file_row(ui: &mut egui::Ui, path: &Path, labels: &Labels) -> bool {
        let mut clicked = false;
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| labels.no_file.to_string());
                    ui.label(RichText::new(name).size(12.0));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        clicked = ui.button(labels.browse).clicked();
                    });
                });
            });
        clicked
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, labels: &Labels) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // ===== Data Source Section =====
        ui.label(RichText::new(labels.data_source).size(14.0).strong());
        ui.add_space(5.0);
        if Self::file_row(ui, &self.stats_path, labels) {
            action = ControlPanelAction::BrowseStats;
        }
        ui.add_space(4.0);
        if Self::file_row(ui, &self.regions_path, labels) {
            action = ControlPanelAction::BrowseRegions;
        }

        if self.categories.is_empty() {
            ui.add_space(10.0);
            ui.label(RichText::new(&self.status).size(11.0).color(Color32::GRAY));
            return action;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== View Section =====
        ui.label(RichText::new(labels.view_section).size(14.0).strong());
        ui.add_space(5.0);
        for view in ViewKind::ALL {
            if ui
                .radio_value(&mut self.view, view, view.title(labels))
                .changed()
            {
                action = ControlPanelAction::SelectionChanged;
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Selection Section =====
        ui.label(RichText::new(labels.selection_section).size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 90.0;
        let combo_width = 170.0;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new(labels.category));
            ComboBox::from_id_salt("category")
                .width(combo_width)
                .selected_text(self.selection.category.as_deref().unwrap_or("-"))
                .show_ui(ui, |ui| {
                    for category in &self.categories {
                        let selected = self.selection.category.as_ref() == Some(category);
                        if ui.selectable_label(selected, category).clicked() {
                            self.selection.category = Some(category.clone());
                            action = ControlPanelAction::SelectionChanged;
                        }
                    }
                });
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new(labels.region));
            let current = self
                .selection
                .region
                .as_ref()
                .map_or_else(|| "-".to_string(), |r| r.to_string());
            ComboBox::from_id_salt("region")
                .width(combo_width)
                .selected_text(current)
                .show_ui(ui, |ui| {
                    for region in &self.regions {
                        let selected = self.selection.region.as_ref() == Some(region);
                        if ui.selectable_label(selected, region.as_str()).clicked() {
                            self.selection.region = Some(region.clone());
                            action = ControlPanelAction::SelectionChanged;
                        }
                    }
                });
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new(labels.year));
            let current = self
                .selection
                .year
                .map_or_else(|| "-".to_string(), |y| y.to_string());
            ComboBox::from_id_salt("year")
                .width(combo_width)
                .selected_text(current)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(self.selection.year.is_none(), "-")
                        .clicked()
                    {
                        self.selection.year = None;
                        action = ControlPanelAction::SelectionChanged;
                    }
                    for &year in &self.years {
                        let selected = self.selection.year == Some(year);
                        if ui.selectable_label(selected, year.to_string()).clicked() {
                            self.selection.year = Some(year);
                            action = ControlPanelAction::SelectionChanged;
                        }
                    }
                });
        });

        match self.view {
            ViewKind::Animated => {
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    for mode in [AnimationMode::Scatter, AnimationMode::Bar, AnimationMode::Line] {
                        if ui
                            .radio_value(&mut self.selection.mode, mode, labels.mode_name(mode))
                            .changed()
                        {
                            action = ControlPanelAction::SelectionChanged;
                        }
                    }
                });
            }
            ViewKind::Table => {
                ui.add_space(10.0);
                self.show_table_controls(ui, labels, label_width, combo_width, &mut action);
            }
            _ => {}
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(5.0);
        ui.label(RichText::new(&self.status).size(11.0).color(Color32::GRAY));

        action
    }

    fn show_table_controls(
        &mut self,
        ui: &mut egui::Ui,
        labels: &Labels,
        label_width: f32,
        combo_width: f32,
        action: &mut ControlPanelAction,
    ) {
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new(labels.column));
            ComboBox::from_id_salt("filter_col")
                .width(combo_width)
                .selected_text(self.selection.filter_column.as_deref().unwrap_or("-"))
                .show_ui(ui, |ui| {
                    for col in &self.columns {
                        let selected = self.selection.filter_column.as_ref() == Some(col);
                        if ui.selectable_label(selected, col).clicked() {
                            self.selection.filter_column = Some(col.clone());
                            *action = ControlPanelAction::FilterColumnChanged;
                        }
                    }
                });
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new(labels.value));
            ComboBox::from_id_salt("filter_value")
                .width(combo_width)
                .selected_text(self.selection.filter_value.as_deref().unwrap_or("-"))
                .show_ui(ui, |ui| {
                    for value in &self.column_values {
                        let selected = self.selection.filter_value.as_ref() == Some(value);
                        if ui.selectable_label(selected, value).clicked() {
                            self.selection.filter_value = Some(value.clone());
                            *action = ControlPanelAction::SelectionChanged;
                        }
                    }
                });
        });

        ui.add_space(5.0);
        ui.label(labels.display_columns);
        let mut changed = false;
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical().max_height(120.0).show(ui, |ui| {
                    for (col, selected) in self.columns.iter().zip(self.selected_display_cols.iter_mut()) {
                        changed |= ui.checkbox(selected, col).changed();
                    }
                });
            });

        ui.horizontal(|ui| {
            if ui.small_button(labels.select_all).clicked() {
                self.selected_display_cols.iter_mut().for_each(|v| *v = true);
                changed = true;
            }
            if ui.small_button(labels.clear_all).clicked() {
                self.selected_display_cols.iter_mut().for_each(|v| *v = false);
                changed = true;
            }
        });

        if changed {
            self.sync_display_columns();
            if *action == ControlPanelAction::None {
                *action = ControlPanelAction::SelectionChanged;
            }
        }
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseStats,
    BrowseRegions,
    FilterColumnChanged,
    SelectionChanged,
}
