//! Chart descriptions handed to the presentation layer.
//!
//! Every view produces a [`ViewOutcome`]: either a finished chart description
//! or an explicit "no data" message. Specs are plain data; the egui viewer and
//! the static PNG renderer both draw from them, and the export command writes
//! them as JSON.

use crate::data::RegionCode;
use crate::stats::{RateScale, ScaledRate};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "body", rename_all = "snake_case")]
pub enum ViewOutcome {
    Chart(ChartSpec),
    NoData { message: String },
}

impl ViewOutcome {
    pub fn no_data(message: impl Into<String>) -> Self {
        ViewOutcome::NoData {
            message: message.into(),
        }
    }

    pub fn chart(&self) -> Option<&ChartSpec> {
        match self {
            ViewOutcome::Chart(spec) => Some(spec),
            ViewOutcome::NoData { .. } => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, ViewOutcome::NoData { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Pie(PieSpec),
    Choropleth(ChoroplethSpec),
    BarsOverMap(BarsOverMapSpec),
    VictimAccused(VictimAccusedSpec),
    RateMap(RateMapSpec),
    Animated(AnimatedSpec),
    RegionDetail(RegionDetailSpec),
    Table(TableSpec),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Pie(s) => &s.title,
            ChartSpec::Choropleth(s) => &s.title,
            ChartSpec::BarsOverMap(s) => &s.title,
            ChartSpec::VictimAccused(s) => &s.title,
            ChartSpec::RateMap(s) => &s.title,
            ChartSpec::Animated(s) => &s.title,
            ChartSpec::RegionDetail(s) => &s.title,
            ChartSpec::Table(s) => &s.title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: u64,
    /// Fraction of the total, in `[0, 1]`.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSpec {
    pub title: String,
    pub total: u64,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethRegion {
    pub code: RegionCode,
    pub name: String,
    pub value: u64,
    /// Exterior rings as `[lon, lat]` paths.
    pub rings: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethSpec {
    pub title: String,
    pub regions: Vec<ChoroplethRegion>,
    pub value_range: [u64; 2],
    /// Region codes with statistics but no boundary.
    pub skipped: Vec<RegionCode>,
    /// `[lon, lat]` map center.
    pub center: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapBar {
    pub category_index: usize,
    pub region: RegionCode,
    pub x: f64,
    pub y: f64,
    pub height: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarsOverMapSpec {
    pub title: String,
    pub categories: Vec<String>,
    pub bars: Vec<MapBar>,
    /// Region outlines drawn at height zero.
    pub outlines: Vec<Vec<[f64; 2]>>,
    pub axis_labels: [String; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarPoint {
    pub region: RegionCode,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub bars: Vec<BarPoint>,
}

/// Stacked bars per region, one series per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub regions: Vec<RegionCode>,
    pub series: Vec<BarSeries>,
}

/// Two independent charts split on the unit-of-count tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VictimAccusedSpec {
    pub title: String,
    pub victims: BarsOrNoData,
    pub accused: BarsOrNoData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "body", rename_all = "snake_case")]
pub enum BarsOrNoData {
    Chart(BarChartSpec),
    NoData { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatePoint {
    pub code: RegionCode,
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    pub facts: u64,
    pub population: Option<f64>,
    pub rate: ScaledRate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateMapSpec {
    pub title: String,
    pub scale: RateScale,
    pub points: Vec<RatePoint>,
    /// Region codes with statistics but no boundary to place them on.
    pub skipped: Vec<RegionCode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AnimationMode {
    /// Facts as markers sized by count.
    #[default]
    Scatter,
    /// Facts as bars per region.
    Bar,
    /// Facts as a line with markers.
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub region: RegionCode,
    pub facts: u64,
    pub population: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearFrame {
    pub year: i32,
    pub points: Vec<SeriesPoint>,
}

/// One frame per distinct year; only the active frame is shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimatedSpec {
    pub title: String,
    pub mode: AnimationMode,
    pub frames: Vec<YearFrame>,
    pub active: usize,
    pub y_range: [f64; 2],
    pub x_label: String,
    pub y_label: String,
    pub year_prefix: String,
}

impl AnimatedSpec {
    /// A year control is only useful with more than one frame.
    pub fn show_slider(&self) -> bool {
        self.frames.len() > 1
    }

    pub fn active_frame(&self) -> Option<&YearFrame> {
        self.frames.get(self.active)
    }

    /// Make `year` the active frame. Returns `false` (and keeps the current
    /// frame) when no frame exists for that year.
    pub fn select_year(&mut self, year: i32) -> bool {
        match self.frames.iter().position(|f| f.year == year) {
            Some(idx) => {
                self.active = idx;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBar {
    pub category: String,
    pub facts: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionDetailSpec {
    pub title: String,
    pub region: RegionCode,
    pub year: i32,
    pub bars: Vec<CategoryBar>,
    pub total_facts: u64,
    pub population: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSpec {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Matching rows before sampling.
    pub total_matches: usize,
}
