//! Charts module - view renderers, chart specs and drawing

mod labels;
mod plotter;
mod renderer;
mod spec;
mod views;

pub use labels::{Labels, Language};
pub use plotter::{ChartPlotter, MISSING_COLOR, PALETTE};
pub use renderer::{RenderError, StaticChartRenderer};
pub use spec::{
    AnimatedSpec, AnimationMode, BarChartSpec, BarPoint, BarSeries, BarsOrNoData,
    BarsOverMapSpec, CategoryBar, ChartSpec, ChoroplethRegion, ChoroplethSpec, MapBar, PieSlice,
    PieSpec, RateMapSpec, RatePoint, RegionDetailSpec, SeriesPoint, TableSpec, VictimAccusedSpec,
    ViewOutcome, YearFrame,
};
pub use views::{ViewRenderer, BAR_OFFSET, Y_HEADROOM};
