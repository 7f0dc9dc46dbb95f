//! Crime Atlas - regional crime statistics viewer
//!
//! Loads a semicolon-separated statistics table and a GeoJSON region file,
//! joins them on a normalized region code and renders pies, maps, bar charts,
//! per-year series and sampled tables.

pub mod charts;
pub mod config;
pub mod data;
pub mod export;
pub mod gui;
pub mod pipeline;
pub mod stats;
