//! Command line and environment configuration, plus the optional profile
//! document shown on the biography page.

use crate::charts::{AnimationMode, Labels, Language};
use crate::data::{ColumnMapping, RegionCode};
use crate::pipeline::{RenderOptions, Selection};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid profile document: {0}")]
    Profile(#[from] serde_json::Error),
    #[error("Invalid region code '{0}'")]
    RegionCode(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "crime_atlas",
    version,
    about = "Regional crime statistics: charts and maps from a CSV and a GeoJSON file"
)]
pub struct Cli {
    /// Semicolon-separated statistics file
    #[arg(long, env = "CRIME_ATLAS_STATS", default_value = "data_regional.csv")]
    pub stats: PathBuf,

    /// GeoJSON FeatureCollection with one feature per region
    #[arg(long, env = "CRIME_ATLAS_REGIONS", default_value = "regions.geojson")]
    pub regions: PathBuf,

    /// Feature property holding the region code
    #[arg(long, env = "CRIME_ATLAS_CODE_PROPERTY", default_value = "code")]
    pub geometry_code_property: String,

    /// Label language
    #[arg(long, env = "CRIME_ATLAS_LANG", value_enum, default_value_t = Language::French)]
    pub lang: Language,

    /// Fixed upper bound of the crime rate scale
    #[arg(long, env = "CRIME_ATLAS_RATE_MAX")]
    pub rate_max: Option<f64>,

    /// Maximum number of rows shown by the filter table
    #[arg(long, env = "CRIME_ATLAS_SAMPLE_SIZE", default_value_t = 5)]
    pub sample_size: usize,

    /// Seed for the filter table sample
    #[arg(long, env = "CRIME_ATLAS_SEED")]
    pub seed: Option<u64>,

    /// JSON profile document for the biography page
    #[arg(long, env = "CRIME_ATLAS_PROFILE")]
    pub profile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render every view to JSON (and PNG where possible) without a window
    Export(ExportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Output directory
    #[arg(long)]
    pub out: PathBuf,

    /// Offense category (defaults to the first one)
    #[arg(long)]
    pub category: Option<String>,

    /// Region code (defaults to the first one)
    #[arg(long)]
    pub region: Option<String>,

    /// Year (defaults to the first one)
    #[arg(long)]
    pub year: Option<i32>,

    /// Animated series mode
    #[arg(long, value_enum, default_value_t = AnimationMode::Scatter)]
    pub mode: AnimationMode,

    /// Open the output directory when done
    #[arg(long)]
    pub open: bool,
}

impl ExportArgs {
    /// Override the parts of `selection` given on the command line.
    pub fn apply(&self, selection: &mut Selection) -> Result<(), ConfigError> {
        if let Some(category) = &self.category {
            selection.category = Some(category.clone());
            selection.filter_value = Some(category.clone());
        }
        if let Some(raw) = &self.region {
            let code =
                RegionCode::parse(raw).ok_or_else(|| ConfigError::RegionCode(raw.clone()))?;
            selection.region = Some(code);
        }
        if let Some(year) = self.year {
            selection.year = Some(year);
        }
        selection.mode = self.mode;
        Ok(())
    }
}

/// Settings shared by the window and the export command.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub stats_path: PathBuf,
    pub regions_path: PathBuf,
    pub code_property: String,
    pub mapping: ColumnMapping,
    pub labels: Labels,
    pub options: RenderOptions,
    pub seed: Option<u64>,
    pub profile: Profile,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let profile = match &cli.profile {
            Some(path) => Profile::load(path)?,
            None => Profile::default(),
        };

        Ok(Self {
            stats_path: cli.stats.clone(),
            regions_path: cli.regions.clone(),
            code_property: cli.geometry_code_property.clone(),
            mapping: ColumnMapping::default(),
            labels: Labels::for_language(cli.lang),
            options: RenderOptions {
                rate_max: cli.rate_max,
                sample_size: cli.sample_size.max(1),
            },
            seed: cli.seed,
            profile,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContactLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileSection {
    pub title: String,
    pub body: String,
}

/// Biography page content.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub contacts: Vec<ContactLink>,
    #[serde(default)]
    pub sections: Vec<ProfileSection>,
}

impl Profile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Crime Atlas".to_string(),
            headline: "Regional crime statistics".to_string(),
            contacts: Vec::new(),
            sections: vec![ProfileSection {
                title: "About".to_string(),
                body: "Pass --profile <file.json> to show your own biography here."
                    .to_string(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_regional_dataset() {
        let cli = Cli::parse_from(["crime_atlas"]);
        assert_eq!(cli.stats, PathBuf::from("data_regional.csv"));
        assert_eq!(cli.geometry_code_property, "code");
        assert_eq!(cli.lang, Language::French);
        assert_eq!(cli.sample_size, 5);
        assert!(cli.command.is_none());
    }

    #[test]
    fn export_subcommand_overrides_selection() {
        let cli = Cli::parse_from([
            "crime_atlas",
            "--lang",
            "en",
            "export",
            "--out",
            "out",
            "--region",
            "01",
            "--mode",
            "line",
        ]);
        let Some(Commands::Export(args)) = cli.command else {
            panic!("expected export");
        };
        let mut selection = Selection::default();
        args.apply(&mut selection).unwrap();
        assert_eq!(selection.region.unwrap().as_str(), "1");
        assert_eq!(selection.mode, AnimationMode::Line);
        assert_eq!(cli.lang, Language::English);
    }

    #[test]
    fn profile_loads_from_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"name": "A. Author", "contacts": [{{"label": "Site", "url": "https://example.org"}}]}}"#
        )
        .unwrap();

        let profile = Profile::load(file.path()).unwrap();
        assert_eq!(profile.name, "A. Author");
        assert_eq!(profile.contacts.len(), 1);
        assert!(profile.sections.is_empty());

        let mut broken = NamedTempFile::new().unwrap();
        write!(broken, "not json").unwrap();
        assert!(matches!(
            Profile::load(broken.path()),
            Err(ConfigError::Profile(_))
        ));
    }
}
