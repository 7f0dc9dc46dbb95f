//! Report Exporter Module
//! Writes every composed view to a directory: one JSON document per view, plus
//! a PNG image for views that have a static rendering.

use crate::charts::{StaticChartRenderer, ViewOutcome};
use crate::pipeline::ViewKind;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Files written by one export run.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub json: Vec<PathBuf>,
    pub png: Vec<PathBuf>,
}

pub struct ReportExporter;

impl ReportExporter {
    /// Write `<view>.json` for each outcome and `<view>.png` when the view
    /// has a chart with a static rendering. PNG failures are logged and
    /// skipped; JSON failures abort the export.
    pub fn export_views(
        views: &[(ViewKind, ViewOutcome)],
        out_dir: &Path,
    ) -> Result<ExportReport, ExportError> {
        fs::create_dir_all(out_dir).map_err(|source| ExportError::Io {
            path: out_dir.to_path_buf(),
            source,
        })?;

        let mut report = ExportReport::default();
        for (view, outcome) in views {
            let json_path = out_dir.join(format!("{}.json", view.slug()));
            let body = serde_json::to_string_pretty(outcome)?;
            fs::write(&json_path, body).map_err(|source| ExportError::Io {
                path: json_path.clone(),
                source,
            })?;
            report.json.push(json_path);

            let Some(spec) = outcome.chart() else {
                continue;
            };
            if !StaticChartRenderer::supports(spec) {
                continue;
            }

            let png_path = out_dir.join(format!("{}.png", view.slug()));
            match StaticChartRenderer::save_png(spec, &png_path) {
                Ok(()) => report.png.push(png_path),
                Err(e) => warn!("Skipped image for {} view: {}", view.slug(), e),
            }
        }

        info!(
            "Exported {} views ({} images) to {}",
            report.json.len(),
            report.png.len(),
            out_dir.display()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn no_data_views_are_written_as_json_only() {
        let dir = TempDir::new().unwrap();
        let views = vec![(ViewKind::Pie, ViewOutcome::no_data("nothing here"))];

        let report = ReportExporter::export_views(&views, dir.path()).unwrap();
        assert_eq!(report.json, vec![dir.path().join("pie.json")]);
        assert!(report.png.is_empty());

        let written = fs::read_to_string(dir.path().join("pie.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["outcome"], "no_data");
        assert_eq!(value["body"]["message"], "nothing here");
    }
}
