//! Dataset Loader Module
//! Loads the semicolon-separated statistics file with Polars and the region
//! boundaries from GeoJSON.

use crate::data::{ColumnMapping, CountUnit, RegionCode, RegionGeometry, StatRecord};
use geojson::GeoJson;
use polars::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Feature property holding the region's display name.
const NAME_PROPERTY: &str = "nom";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("GeoJSON document is not a FeatureCollection")]
    NotFeatureCollection,
    #[error("Missing column '{0}'")]
    MissingColumn(String),
    #[error("No data loaded")]
    NoData,
}

/// Handles statistics and boundary loading.
///
/// The raw statistics frame is kept (every column as text) so the filter
/// table can display columns the typed records do not carry.
pub struct DataLoader {
    df: Option<DataFrame>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self { df: None }
    }

    /// Load a semicolon-separated CSV file using Polars.
    pub fn load_csv(&mut self, file_path: &Path) -> Result<&DataFrame, LoaderError> {
        ensure_file(file_path)?;

        // Schema length 0 reads every column as text; codes keep their padding.
        let df = LazyCsvReader::new(file_path)
            .with_separator(b';')
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;

        log::info!(
            "Loaded {} rows, {} columns from {}",
            df.height(),
            df.width(),
            file_path.display()
        );

        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Load the CSV file and convert its rows into [`StatRecord`]s.
    pub fn load_stats(
        &mut self,
        file_path: &Path,
        mapping: &ColumnMapping,
    ) -> Result<Vec<StatRecord>, LoaderError> {
        let df = self.load_csv(file_path)?;
        let (records, skipped) = records_from_frame(df, mapping)?;
        if skipped > 0 {
            log::warn!(
                "Skipped {} rows with a blank region code, invalid fact count or year",
                skipped
            );
        }
        Ok(records)
    }

    /// Load region boundaries from a GeoJSON FeatureCollection.
    ///
    /// The first feature wins when two features normalize to the same code.
    pub fn load_geojson(
        file_path: &Path,
        code_property: &str,
    ) -> Result<Vec<RegionGeometry>, LoaderError> {
        ensure_file(file_path)?;
        let text = std::fs::read_to_string(file_path).map_err(|source| LoaderError::Io {
            path: file_path.to_path_buf(),
            source,
        })?;

        let geometries = parse_geojson(&text, code_property)?;
        log::info!(
            "Loaded {} region boundaries from {}",
            geometries.len(),
            file_path.display()
        );
        Ok(geometries)
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get sorted unique values from a column.
    pub fn get_unique_values(&self, column: &str) -> Vec<String> {
        let Some(df) = &self.df else {
            return Vec::new();
        };

        let mut values: Vec<String> = df
            .column(column)
            .ok()
            .and_then(|col| col.unique().ok())
            .map(|unique| {
                let series = unique.as_materialized_series();
                (0..series.len())
                    .filter_map(|i| {
                        let val = series.get(i).ok()?;
                        if val.is_null() {
                            None
                        } else {
                            Some(val.to_string().trim_matches('"').to_string())
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        values.sort();
        values
    }

    /// Get a reference to the loaded DataFrame.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }
}

fn ensure_file(path: &Path) -> Result<(), LoaderError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(LoaderError::NotFound(path.to_path_buf()))
    }
}

/// Convert a text-typed frame into records. Returns the records and the
/// number of rows that could not be converted.
pub fn records_from_frame(
    df: &DataFrame,
    mapping: &ColumnMapping,
) -> Result<(Vec<StatRecord>, usize), LoaderError> {
    let text_column = |name: &str| -> Result<StringChunked, LoaderError> {
        let column = df
            .column(name)
            .map_err(|_| LoaderError::MissingColumn(name.to_string()))?;
        let series = column.as_materialized_series().cast(&DataType::String)?;
        Ok(series.str()?.clone())
    };

    let regions = text_column(&mapping.region)?;
    let categories = text_column(&mapping.category)?;
    let facts = text_column(&mapping.facts)?;
    let populations = text_column(&mapping.population)?;
    let units = text_column(&mapping.unit)?;
    let years = text_column(&mapping.year)?;

    let mut records = Vec::with_capacity(df.height());
    let mut skipped = 0;

    for i in 0..df.height() {
        let region = regions.get(i).and_then(RegionCode::parse);
        let fact_count = facts.get(i).and_then(parse_count);
        let year = years.get(i).and_then(parse_year);

        let (Some(region), Some(fact_count), Some(year)) = (region, fact_count, year) else {
            skipped += 1;
            continue;
        };

        records.push(StatRecord {
            region,
            category: categories.get(i).unwrap_or_default().trim().to_string(),
            facts: fact_count,
            population: populations.get(i).and_then(parse_number),
            unit: CountUnit::parse(units.get(i).unwrap_or_default()),
            year,
        });
    }

    Ok((records, skipped))
}

/// Parse GeoJSON text into region boundaries.
pub fn parse_geojson(text: &str, code_property: &str) -> Result<Vec<RegionGeometry>, LoaderError> {
    let GeoJson::FeatureCollection(collection) = text.parse::<GeoJson>()? else {
        return Err(LoaderError::NotFeatureCollection);
    };

    let mut seen = HashSet::new();
    let mut geometries = Vec::with_capacity(collection.features.len());

    for feature in collection.features {
        let Some(code) = feature
            .property(code_property)
            .and_then(RegionCode::from_json)
        else {
            log::warn!("Skipping feature without '{}' property", code_property);
            continue;
        };
        let name = feature
            .property(NAME_PROPERTY)
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);

        let Some(geometry) = feature.geometry else {
            log::warn!("Skipping region {} without geometry", code);
            continue;
        };
        let boundary = match geo::Geometry::<f64>::try_from(geometry) {
            Ok(geo::Geometry::MultiPolygon(mp)) => mp,
            Ok(geo::Geometry::Polygon(p)) => geo::MultiPolygon(vec![p]),
            Ok(_) => {
                log::warn!("Skipping region {}: geometry is not a polygon", code);
                continue;
            }
            Err(e) => {
                log::warn!("Skipping region {}: {}", code, e);
                continue;
            }
        };

        if !seen.insert(code.clone()) {
            log::warn!("Duplicate boundary for region {}, keeping the first", code);
            continue;
        }

        geometries.push(RegionGeometry {
            code,
            name,
            boundary,
        });
    }

    Ok(geometries)
}

fn clean_number(raw: &str) -> String {
    raw.trim()
        .trim_matches('"')
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// Non-negative finite number, decimal comma accepted.
fn parse_number(raw: &str) -> Option<f64> {
    clean_number(raw)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Non-negative integer count; `"12.0"` is accepted, `"12.5"` is not.
fn parse_count(raw: &str) -> Option<u64> {
    let cleaned = clean_number(raw);
    if let Ok(v) = cleaned.parse::<u64>() {
        return Some(v);
    }
    let v = cleaned.parse::<f64>().ok()?;
    (v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64).then(|| v as u64)
}

fn parse_year(raw: &str) -> Option<i32> {
    let cleaned = clean_number(raw);
    if let Ok(v) = cleaned.parse::<i32>() {
        return Some(v);
    }
    let v = cleaned.parse::<f64>().ok()?;
    (v.is_finite() && v.fract() == 0.0 && v.abs() <= i32::MAX as f64).then(|| v as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\
Code.région;annee;classe;unité.de.compte;faits;POP;tauxpourmille
01;2021;theft;victime;120;400000;0,3
11;2021;assault;Mis en cause;45;12000000;0,004
24;2022;theft;victime;7;0;
;2022;theft;victime;3;1000;
24;2022;theft;victime;-4;1000;
";

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_is_not_found() {
        let mut loader = DataLoader::new();
        let err = loader
            .load_stats(Path::new("/definitely/not/here.csv"), &ColumnMapping::default())
            .unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));

        let err = DataLoader::load_geojson(Path::new("/nope.geojson"), "code").unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
    }

    #[test]
    fn csv_rows_become_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "data.csv", CSV);

        let mut loader = DataLoader::new();
        let records = loader.load_stats(&path, &ColumnMapping::default()).unwrap();

        // blank region and negative count rows are skipped
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].region.as_str(), "1");
        assert_eq!(records[0].facts, 120);
        assert_eq!(records[0].unit, CountUnit::Victim);
        assert_eq!(records[1].unit, CountUnit::Accused);
        assert_eq!(records[2].population, Some(0.0));
        assert_eq!(records[2].year, 2022);

        // raw frame keeps extra columns and the original padding
        assert!(loader.get_columns().contains(&"tauxpourmille".to_string()));
        assert!(loader
            .get_unique_values("Code.région")
            .contains(&"01".to_string()));
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "data.csv", "a;b\n1;2\n");
        let mut loader = DataLoader::new();
        let err = loader.load_stats(&path, &ColumnMapping::default()).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn(_)));
    }

    #[test]
    fn numbers_accept_decimal_comma() {
        assert_eq!(parse_number("0,25"), Some(0.25));
        assert_eq!(parse_number(" 1 200 "), Some(1200.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("-3"), None);
        assert_eq!(parse_count("12.0"), Some(12));
        assert_eq!(parse_count("12.5"), None);
        assert_eq!(parse_year("2021"), Some(2021));
        assert_eq!(parse_year("16"), Some(16));
    }

    #[test]
    fn geojson_features_become_geometries() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"code": "11", "nom": "Île-de-France"},
                 "geometry": {"type": "Polygon", "coordinates": [[[2,48],[3,48],[3,49],[2,49],[2,48]]]}},
                {"type": "Feature", "properties": {"code": 24},
                 "geometry": {"type": "MultiPolygon", "coordinates": [[[[0,46],[1,46],[1,47],[0,47],[0,46]]]]}},
                {"type": "Feature", "properties": {"code": "011"},
                 "geometry": {"type": "Polygon", "coordinates": [[[9,9],[9,10],[10,10],[9,9]]]}},
                {"type": "Feature", "properties": {"code": "32"},
                 "geometry": {"type": "Point", "coordinates": [1, 2]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}}
            ]
        }"#;

        let geometries = parse_geojson(text, "code").unwrap();
        assert_eq!(geometries.len(), 2);
        assert_eq!(geometries[0].code.as_str(), "11");
        assert_eq!(geometries[0].name.as_deref(), Some("Île-de-France"));
        // duplicate "011" did not replace the first "11"
        let (x, _) = geometries[0].centroid().unwrap();
        assert!(x < 5.0);
        assert_eq!(geometries[1].code.as_str(), "24");
    }

    #[test]
    fn non_collection_geojson_is_rejected() {
        let text = r#"{"type": "Point", "coordinates": [1, 2]}"#;
        assert!(matches!(
            parse_geojson(text, "code"),
            Err(LoaderError::NotFeatureCollection)
        ));
    }
}
