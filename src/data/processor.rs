//! Data Processor Module
//! Joins statistics to boundaries and applies the user's filters.

use crate::data::{CountUnit, JoinedRecord, RegionCode, RegionGeometry, StatRecord};
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
    #[error("No columns selected for display")]
    NoDisplayColumns,
}

/// Row filter on the typed fields. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub category: Option<String>,
    pub region: Option<RegionCode>,
    pub year: Option<i32>,
    pub unit: Option<CountUnit>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn region(mut self, region: RegionCode) -> Self {
        self.region = Some(region);
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn unit(mut self, unit: CountUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn matches(&self, record: &StatRecord) -> bool {
        self.category.as_ref().map_or(true, |c| &record.category == c)
            && self.region.as_ref().map_or(true, |r| &record.region == r)
            && self.year.map_or(true, |y| record.year == y)
            && self.unit.as_ref().map_or(true, |u| &record.unit == u)
    }
}

/// Text rows extracted from the raw statistics frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Handles joining and filtering operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Left join of statistics onto boundaries by canonical region code.
    ///
    /// One output per input statistic, in input order. Statistics without a
    /// boundary keep `geometry: None`; boundaries without statistics are
    /// dropped.
    pub fn join<'a>(
        stats: &'a [StatRecord],
        geometries: &'a [RegionGeometry],
    ) -> Vec<JoinedRecord<'a>> {
        let index: HashMap<&RegionCode, &RegionGeometry> =
            geometries.iter().map(|g| (&g.code, g)).collect();

        let mut unmatched: BTreeSet<&RegionCode> = BTreeSet::new();
        let joined: Vec<JoinedRecord<'a>> = stats
            .iter()
            .map(|stat| {
                let geometry = index.get(&stat.region).copied();
                if geometry.is_none() {
                    unmatched.insert(&stat.region);
                }
                JoinedRecord { stat, geometry }
            })
            .collect();

        if !unmatched.is_empty() {
            let codes: Vec<&str> = unmatched.iter().map(|c| c.as_str()).collect();
            log::warn!("No boundary for region codes: {}", codes.join(", "));
        }

        joined
    }

    /// Records matching the filter, in input order.
    pub fn filter<'r, R: AsRef<StatRecord>>(records: &'r [R], filter: &RecordFilter) -> Vec<&'r R> {
        records
            .iter()
            .filter(|r| filter.matches(r.as_ref()))
            .collect()
    }

    /// Sorted distinct categories.
    pub fn categories<R: AsRef<StatRecord>>(records: &[R]) -> Vec<String> {
        let set: BTreeSet<&str> = records
            .iter()
            .map(|r| r.as_ref().category.as_str())
            .collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Sorted distinct region codes.
    pub fn regions<R: AsRef<StatRecord>>(records: &[R]) -> Vec<RegionCode> {
        let set: BTreeSet<&RegionCode> = records.iter().map(|r| &r.as_ref().region).collect();
        set.into_iter().cloned().collect()
    }

    /// Sorted distinct years.
    pub fn years<R: AsRef<StatRecord>>(records: &[R]) -> Vec<i32> {
        let set: BTreeSet<i32> = records.iter().map(|r| r.as_ref().year).collect();
        set.into_iter().collect()
    }

    /// Rows of the raw frame whose `filter_col` equals `value`, restricted to
    /// `display_cols`.
    pub fn filter_rows(
        df: &DataFrame,
        filter_col: &str,
        value: &str,
        display_cols: &[String],
    ) -> Result<TableRows, ProcessorError> {
        if display_cols.is_empty() {
            return Err(ProcessorError::NoDisplayColumns);
        }
        for name in std::iter::once(filter_col).chain(display_cols.iter().map(String::as_str)) {
            if df.column(name).is_err() {
                return Err(ProcessorError::UnknownColumn(name.to_string()));
            }
        }

        let selection: Vec<Expr> = display_cols.iter().map(|c| col(c.as_str())).collect();
        let filtered = df
            .clone()
            .lazy()
            .filter(col(filter_col).cast(DataType::String).eq(lit(value)))
            .select(selection)
            .collect()?;

        let mut text_columns = Vec::with_capacity(display_cols.len());
        for name in display_cols {
            let series = filtered
                .column(name)?
                .as_materialized_series()
                .cast(&DataType::String)?;
            text_columns.push(series.str()?.clone());
        }

        let rows = (0..filtered.height())
            .map(|i| {
                text_columns
                    .iter()
                    .map(|ca| ca.get(i).unwrap_or_default().to_string())
                    .collect()
            })
            .collect();

        Ok(TableRows {
            columns: display_cols.to_vec(),
            rows,
        })
    }
}
