//! Page Composer
//! Loads both datasets once, then runs filter → join → aggregate → render for
//! whichever views the user selects.

use crate::charts::{AnimationMode, Labels, ViewOutcome, ViewRenderer};
use crate::data::{
    ColumnMapping, DataLoader, DataProcessor, LoaderError, ProcessorError, RecordFilter,
    RegionCode, RegionGeometry, StatRecord,
};
use log::{debug, info};
use polars::prelude::DataFrame;
use rand::Rng;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

impl PipelineError {
    pub fn is_missing_file(&self) -> bool {
        matches!(self, PipelineError::Loader(LoaderError::NotFound(_)))
    }

    /// The single message shown to the user for this failure.
    pub fn user_message(&self, labels: &Labels) -> String {
        if self.is_missing_file() {
            labels.missing_file.to_string()
        } else {
            self.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Biography,
    Visualisation,
}

impl Page {
    pub fn title(&self, labels: &Labels) -> &'static str {
        match self {
            Page::Biography => labels.page_biography,
            Page::Visualisation => labels.page_visualisation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Pie,
    Choropleth,
    BarsOverMap,
    VictimAccused,
    RateMap,
    Animated,
    RegionDetail,
    Table,
}

impl ViewKind {
    pub const ALL: [ViewKind; 8] = [
        ViewKind::Pie,
        ViewKind::Choropleth,
        ViewKind::BarsOverMap,
        ViewKind::VictimAccused,
        ViewKind::RateMap,
        ViewKind::Animated,
        ViewKind::RegionDetail,
        ViewKind::Table,
    ];

    /// Stable identifier, used for export file names.
    pub fn slug(&self) -> &'static str {
        match self {
            ViewKind::Pie => "pie",
            ViewKind::Choropleth => "choropleth",
            ViewKind::BarsOverMap => "bars_over_map",
            ViewKind::VictimAccused => "victim_accused",
            ViewKind::RateMap => "rate_map",
            ViewKind::Animated => "animated",
            ViewKind::RegionDetail => "region_detail",
            ViewKind::Table => "table",
        }
    }

    /// Name shown in the view picker.
    pub fn title(&self, labels: &Labels) -> &'static str {
        match self {
            ViewKind::Pie => labels.view_pie,
            ViewKind::Choropleth => labels.view_choropleth,
            ViewKind::BarsOverMap => labels.view_bars_over_map,
            ViewKind::VictimAccused => labels.view_victim_accused,
            ViewKind::RateMap => labels.view_rate_map,
            ViewKind::Animated => labels.view_animated,
            ViewKind::RegionDetail => labels.view_region_detail,
            ViewKind::Table => labels.view_table,
        }
    }
}

/// Number of leading columns the filter table shows when none are chosen.
pub const DEFAULT_DISPLAY_COLUMNS: usize = 5;

/// Primitive values chosen by the user. `None` means "not selected".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub category: Option<String>,
    pub region: Option<RegionCode>,
    pub year: Option<i32>,
    pub mode: AnimationMode,
    pub filter_column: Option<String>,
    pub filter_value: Option<String>,
    /// Columns shown by the filter table; `None` shows the first
    /// [`DEFAULT_DISPLAY_COLUMNS`] columns.
    pub display_columns: Option<Vec<String>>,
}

impl Selection {
    /// Record filter for the category/region/year part of the selection.
    pub fn record_filter(&self) -> RecordFilter {
        RecordFilter {
            category: self.category.clone(),
            region: self.region.clone(),
            year: self.year,
            unit: None,
        }
    }
}

/// Rendering knobs that come from configuration rather than the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub rate_max: Option<f64>,
    pub sample_size: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            rate_max: None,
            sample_size: 5,
        }
    }
}

/// Both source datasets, normalized and ready to join.
pub struct Datasets {
    loader: DataLoader,
    mapping: ColumnMapping,
    pub stats: Vec<StatRecord>,
    pub geometries: Vec<RegionGeometry>,
}

impl Datasets {
    pub fn load(
        stats_path: &Path,
        regions_path: &Path,
        code_property: &str,
        mapping: ColumnMapping,
    ) -> Result<Self, PipelineError> {
        let mut loader = DataLoader::new();
        let stats = loader.load_stats(stats_path, &mapping)?;
        let geometries = DataLoader::load_geojson(regions_path, code_property)?;
        info!(
            "Datasets ready: {} statistics, {} regions",
            stats.len(),
            geometries.len()
        );

        Ok(Self {
            loader,
            mapping,
            stats,
            geometries,
        })
    }

    pub fn frame(&self) -> Option<&DataFrame> {
        self.loader.get_dataframe()
    }

    pub fn categories(&self) -> Vec<String> {
        DataProcessor::categories(&self.stats)
    }

    pub fn regions(&self) -> Vec<RegionCode> {
        DataProcessor::regions(&self.stats)
    }

    pub fn years(&self) -> Vec<i32> {
        DataProcessor::years(&self.stats)
    }

    pub fn columns(&self) -> Vec<String> {
        self.loader.get_columns()
    }

    /// Columns shown by the filter table when the user has not picked any.
    pub fn default_display_columns(&self) -> Vec<String> {
        self.columns()
            .into_iter()
            .take(DEFAULT_DISPLAY_COLUMNS)
            .collect()
    }

    pub fn column_values(&self, column: &str) -> Vec<String> {
        self.loader.get_unique_values(column)
    }

    /// First category, region and year, with the filter table keyed on the
    /// category column.
    pub fn default_selection(&self) -> Selection {
        let category = self.categories().into_iter().next();
        Selection {
            region: self.regions().into_iter().next(),
            year: self.years().into_iter().next(),
            mode: AnimationMode::default(),
            filter_column: Some(self.mapping.category.clone()),
            filter_value: category.clone(),
            display_columns: None,
            category,
        }
    }

    /// Run one view for the current selection.
    pub fn render<R: Rng + ?Sized>(
        &self,
        view: ViewKind,
        selection: &Selection,
        options: &RenderOptions,
        labels: &Labels,
        rng: &mut R,
    ) -> Result<ViewOutcome, PipelineError> {
        let no_data = || ViewOutcome::no_data(labels.no_data);

        let outcome = match view {
            ViewKind::Pie => match &selection.category {
                Some(category) => ViewRenderer::pie_by_category(&self.stats, category, labels),
                None => no_data(),
            },
            ViewKind::Choropleth => match &selection.category {
                Some(category) => {
                    let joined = DataProcessor::join(&self.stats, &self.geometries);
                    ViewRenderer::choropleth(&joined, category, labels)
                }
                None => no_data(),
            },
            ViewKind::BarsOverMap => {
                let joined = DataProcessor::join(&self.stats, &self.geometries);
                ViewRenderer::bars_over_map(&joined, &self.geometries, labels)
            }
            ViewKind::VictimAccused => ViewRenderer::victim_vs_accused(&self.stats, labels),
            ViewKind::RateMap => {
                let joined = DataProcessor::join(&self.stats, &self.geometries);
                let filter = RecordFilter {
                    region: None,
                    ..selection.record_filter()
                };
                ViewRenderer::rate_map(&joined, &filter, options.rate_max, labels)
            }
            ViewKind::Animated => {
                let filter = RecordFilter {
                    category: selection.category.clone(),
                    ..RecordFilter::default()
                };
                let records = DataProcessor::filter(&self.stats, &filter);
                ViewRenderer::animated_series(&records, selection.mode, labels)
            }
            ViewKind::RegionDetail => match (&selection.region, selection.year) {
                (Some(region), Some(year)) => {
                    ViewRenderer::region_detail(&self.stats, region, year, labels)
                }
                _ => ViewOutcome::no_data(labels.no_data_region_year),
            },
            ViewKind::Table => {
                let (Some(frame), Some(column), Some(value)) = (
                    self.frame(),
                    selection.filter_column.as_deref(),
                    selection.filter_value.as_deref(),
                ) else {
                    return Ok(no_data());
                };
                let display = selection
                    .display_columns
                    .clone()
                    .unwrap_or_else(|| self.default_display_columns());
                ViewRenderer::filter_table(
                    frame,
                    column,
                    value,
                    &display,
                    options.sample_size,
                    rng,
                    labels,
                )?
            }
        };

        debug!(
            "Rendered {} view: {}",
            view.slug(),
            if outcome.is_no_data() { "no data" } else { "chart" }
        );
        Ok(outcome)
    }

    /// Run every view for the same selection.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        selection: &Selection,
        options: &RenderOptions,
        labels: &Labels,
        rng: &mut R,
    ) -> Result<Vec<(ViewKind, ViewOutcome)>, PipelineError> {
        ViewKind::ALL
            .iter()
            .map(|&view| Ok((view, self.render(view, selection, options, labels, rng)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_file_has_one_user_message() {
        let err = PipelineError::from(LoaderError::NotFound(PathBuf::from("nope.csv")));
        assert!(err.is_missing_file());
        assert_eq!(
            err.user_message(&Labels::english()),
            "The data file was not found. Please upload a valid CSV file."
        );

        let other = PipelineError::from(LoaderError::MissingColumn("faits".to_string()));
        assert!(!other.is_missing_file());
        assert!(other.user_message(&Labels::english()).contains("faits"));
    }

    #[test]
    fn view_slugs_are_unique() {
        let mut slugs: Vec<&str> = ViewKind::ALL.iter().map(ViewKind::slug).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), ViewKind::ALL.len());
    }

    #[test]
    fn picker_titles_follow_language() {
        let fr = Labels::french();
        let en = Labels::english();
        for view in ViewKind::ALL {
            assert!(!view.title(&fr).is_empty());
            assert_ne!(view.title(&fr), view.title(&en), "{}", view.slug());
        }
        assert_eq!(Page::Visualisation.title(&en), "Visualisation");
        assert_eq!(Page::Biography.title(&fr), "Biographie");
    }

    #[test]
    fn selection_builds_record_filter() {
        let selection = Selection {
            category: Some("theft".to_string()),
            year: Some(2021),
            ..Selection::default()
        };
        let filter = selection.record_filter();
        assert_eq!(filter.category.as_deref(), Some("theft"));
        assert_eq!(filter.year, Some(2021));
        assert_eq!(filter.region, None);
        assert_eq!(filter.unit, None);
    }
}
