//! GUI module - User interface components

mod app;
mod biography;
mod chart_viewer;
mod control_panel;

pub use app::CrimeAtlasApp;
pub use biography::BiographyPage;
pub use chart_viewer::ChartViewer;
pub use control_panel::{ControlPanel, ControlPanelAction};
