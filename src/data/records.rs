//! Record types shared by the loader, joiner, aggregator and renderers.

use crate::data::RegionCode;
use geo::{Centroid, MultiPolygon};
use serde::Serialize;
use std::fmt;

/// Perspective a fact was counted from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountUnit {
    Victim,
    Accused,
    Other(String),
}

impl CountUnit {
    /// Parse the `unité.de.compte` tag. Case and accents on the tag are
    /// ignored.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let folded: String = trimmed
            .to_lowercase()
            .chars()
            .map(|c| match c {
                'é' | 'è' | 'ê' => 'e',
                _ => c,
            })
            .collect();

        match folded.as_str() {
            "victime" | "victim" => CountUnit::Victim,
            "mis en cause" | "accused" => CountUnit::Accused,
            _ => CountUnit::Other(trimmed.to_string()),
        }
    }
}

impl fmt::Display for CountUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountUnit::Victim => f.write_str("victime"),
            CountUnit::Accused => f.write_str("Mis en cause"),
            CountUnit::Other(s) => f.write_str(s),
        }
    }
}

/// One row of crime statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatRecord {
    pub region: RegionCode,
    pub category: String,
    pub facts: u64,
    /// `None` when the source cell is blank or not numeric.
    pub population: Option<f64>,
    pub unit: CountUnit,
    pub year: i32,
}

impl AsRef<StatRecord> for StatRecord {
    fn as_ref(&self) -> &StatRecord {
        self
    }
}

/// Boundary of one region, unique per code.
#[derive(Debug, Clone)]
pub struct RegionGeometry {
    pub code: RegionCode,
    pub name: Option<String>,
    pub boundary: MultiPolygon<f64>,
}

impl RegionGeometry {
    /// Centroid as `(lon, lat)`.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        self.boundary.centroid().map(|p| (p.x(), p.y()))
    }

    /// Exterior rings of every polygon, as `[lon, lat]` paths.
    pub fn outlines(&self) -> Vec<Vec<[f64; 2]>> {
        self.boundary
            .0
            .iter()
            .map(|polygon| polygon.exterior().coords().map(|c| [c.x, c.y]).collect())
            .collect()
    }

    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.code.to_string())
    }
}

/// A statistic row together with its matched boundary, if any.
#[derive(Debug, Clone, Copy)]
pub struct JoinedRecord<'a> {
    pub stat: &'a StatRecord,
    pub geometry: Option<&'a RegionGeometry>,
}

impl AsRef<StatRecord> for JoinedRecord<'_> {
    fn as_ref(&self) -> &StatRecord {
        self.stat
    }
}

/// Header names of the semicolon-separated statistics file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub region: String,
    pub category: String,
    pub facts: String,
    pub population: String,
    pub unit: String,
    pub year: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            region: "Code.région".to_string(),
            category: "classe".to_string(),
            facts: "faits".to_string(),
            population: "POP".to_string(),
            unit: "unité.de.compte".to_string(),
            year: "annee".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    #[test]
    fn unit_tags_are_recognized() {
        assert_eq!(CountUnit::parse("victime"), CountUnit::Victim);
        assert_eq!(CountUnit::parse(" Victime "), CountUnit::Victim);
        assert_eq!(CountUnit::parse("Mis en cause"), CountUnit::Accused);
        assert_eq!(CountUnit::parse("mis en cause"), CountUnit::Accused);
        assert_eq!(
            CountUnit::parse("infraction"),
            CountUnit::Other("infraction".to_string())
        );
    }

    #[test]
    fn square_centroid_and_outline() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
            (x: 0.0, y: 0.0),
        ];
        let geometry = RegionGeometry {
            code: RegionCode::parse("11").unwrap(),
            name: None,
            boundary: MultiPolygon(vec![square]),
        };

        let (x, y) = geometry.centroid().unwrap();
        assert!((x - 1.0).abs() < 1e-9);
        assert!((y - 1.0).abs() < 1e-9);
        assert_eq!(geometry.outlines().len(), 1);
        assert_eq!(geometry.outlines()[0].len(), 5);
        assert_eq!(geometry.label(), "11");
    }
}
