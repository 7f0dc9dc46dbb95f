//! Aggregator Module
//! Groups statistic rows by a key tuple and reduces each group.

use crate::data::{CountUnit, RegionCode, StatRecord};
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Field that participates in a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Year,
    Region,
    Category,
    Unit,
}

/// Reduction applied to the members of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Exact integer sum of fact counts.
    SumFacts,
    /// Unweighted arithmetic mean of the known populations. Zero counts as
    /// unknown.
    MeanPopulation,
    /// Number of member rows.
    Count,
}

/// Grouping key. Only the fields requested by the grouping are set.
///
/// Field order is the sort order: year, then region, then category.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupKey {
    pub year: Option<i32>,
    pub region: Option<RegionCode>,
    pub category: Option<String>,
    pub unit: Option<CountUnit>,
}

impl GroupKey {
    fn of(record: &StatRecord, fields: &[GroupField]) -> Self {
        let mut key = GroupKey::default();
        for field in fields {
            match field {
                GroupField::Year => key.year = Some(record.year),
                GroupField::Region => key.region = Some(record.region.clone()),
                GroupField::Category => key.category = Some(record.category.clone()),
                GroupField::Unit => key.unit = Some(record.unit.clone()),
            }
        }
        key
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reduction", content = "value", rename_all = "snake_case")]
pub enum AggregateValue {
    Sum(u64),
    /// `None` when no member has a known population.
    Mean(Option<f64>),
    Count(usize),
}

impl AggregateValue {
    pub fn as_sum(&self) -> Option<u64> {
        match self {
            AggregateValue::Sum(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_mean(&self) -> Option<f64> {
        match self {
            AggregateValue::Mean(v) => *v,
            _ => None,
        }
    }
}

/// One reduced group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRecord {
    pub key: GroupKey,
    pub value: AggregateValue,
    pub members: usize,
}

/// Result of an aggregation: groups in key order, or an explicit empty
/// outcome when no row survived the filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    Groups(Vec<AggregateRecord>),
    NoData,
}

impl Aggregation {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Aggregation::NoData)
    }

    pub fn groups(&self) -> &[AggregateRecord] {
        match self {
            Aggregation::Groups(groups) => groups,
            Aggregation::NoData => &[],
        }
    }

    pub fn into_groups(self) -> Option<Vec<AggregateRecord>> {
        match self {
            Aggregation::Groups(groups) => Some(groups),
            Aggregation::NoData => None,
        }
    }
}

/// Handles grouping and reductions.
pub struct Aggregator;

impl Aggregator {
    /// Group `records` by `group_by` and reduce every group.
    pub fn aggregate<R: AsRef<StatRecord>>(
        records: &[R],
        group_by: &[GroupField],
        reduction: Reduction,
    ) -> Aggregation {
        if records.is_empty() {
            return Aggregation::NoData;
        }

        let mut groups: BTreeMap<GroupKey, Vec<&StatRecord>> = BTreeMap::new();
        for record in records {
            let record = record.as_ref();
            groups
                .entry(GroupKey::of(record, group_by))
                .or_default()
                .push(record);
        }

        log::debug!(
            "Aggregated {} rows into {} groups by {:?}",
            records.len(),
            groups.len(),
            group_by
        );

        Aggregation::Groups(
            groups
                .into_iter()
                .map(|(key, members)| AggregateRecord {
                    value: Self::reduce(&members, reduction),
                    members: members.len(),
                    key,
                })
                .collect(),
        )
    }

    /// Exact sum of fact counts over all records.
    pub fn total_facts<R: AsRef<StatRecord>>(records: &[R]) -> u64 {
        records.iter().map(|r| r.as_ref().facts).sum()
    }

    fn reduce(members: &[&StatRecord], reduction: Reduction) -> AggregateValue {
        match reduction {
            Reduction::SumFacts => AggregateValue::Sum(members.iter().map(|r| r.facts).sum()),
            Reduction::MeanPopulation => {
                let known: Vec<f64> = members
                    .iter()
                    .filter_map(|r| r.population.filter(|p| p.is_finite() && *p > 0.0))
                    .collect();
                if known.is_empty() {
                    AggregateValue::Mean(None)
                } else {
                    AggregateValue::Mean(Some(known.iter().mean()))
                }
            }
            Reduction::Count => AggregateValue::Count(members.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataProcessor, RecordFilter};

    fn stat(region: &str, category: &str, facts: u64, population: Option<f64>, year: i32) -> StatRecord {
        StatRecord {
            region: RegionCode::parse(region).unwrap(),
            category: category.to_string(),
            facts,
            population,
            unit: CountUnit::Victim,
            year,
        }
    }

    fn sample() -> Vec<StatRecord> {
        vec![
            stat("11", "theft", 10, Some(100.0), 2021),
            stat("11", "assault", 4, Some(100.0), 2021),
            stat("24", "theft", 7, Some(50.0), 2021),
            stat("24", "theft", 1, None, 2022),
            stat("11", "theft", 5, Some(300.0), 2022),
        ]
    }

    #[test]
    fn group_sums_add_up_to_total() {
        let records = sample();
        let total = Aggregator::total_facts(&records);

        for fields in [
            vec![GroupField::Region],
            vec![GroupField::Category, GroupField::Region],
            vec![GroupField::Year, GroupField::Region],
            vec![GroupField::Unit],
        ] {
            let aggregation = Aggregator::aggregate(&records, &fields, Reduction::SumFacts);
            let summed: u64 = aggregation
                .groups()
                .iter()
                .filter_map(|g| g.value.as_sum())
                .sum();
            assert_eq!(summed, total, "grouping by {:?}", fields);
        }
    }

    #[test]
    fn groups_follow_key_order() {
        let records = sample();
        let groups = Aggregator::aggregate(
            &records,
            &[GroupField::Year, GroupField::Region],
            Reduction::SumFacts,
        )
        .into_groups()
        .unwrap();

        let keys: Vec<(i32, String, u64)> = groups
            .iter()
            .map(|g| {
                (
                    g.key.year.unwrap(),
                    g.key.region.as_ref().unwrap().to_string(),
                    g.value.as_sum().unwrap(),
                )
            })
            .collect();
        assert_eq!(
            keys,
            vec![
                (2021, "11".to_string(), 14),
                (2021, "24".to_string(), 7),
                (2022, "11".to_string(), 5),
                (2022, "24".to_string(), 1),
            ]
        );
    }

    #[test]
    fn mean_population_ignores_missing_values() {
        let records = sample();
        let groups = Aggregator::aggregate(&records, &[GroupField::Region], Reduction::MeanPopulation)
            .into_groups()
            .unwrap();

        // region 11: (100 + 100 + 300) / 3
        assert!((groups[0].value.as_mean().unwrap() - 500.0 / 3.0).abs() < 1e-9);
        // region 24: only 50 is known
        assert_eq!(groups[1].value.as_mean(), Some(50.0));
        assert_eq!(groups[1].members, 2);

        let unknown = vec![stat("53", "theft", 1, None, 2021)];
        let groups = Aggregator::aggregate(&unknown, &[GroupField::Region], Reduction::MeanPopulation);
        assert_eq!(groups.groups()[0].value, AggregateValue::Mean(None));
    }

    #[test]
    fn mean_population_skips_zero_population_rows() {
        let records = vec![
            stat("11", "theft", 10, Some(0.0), 2021),
            stat("11", "assault", 10, Some(1000.0), 2021),
        ];
        let groups = Aggregator::aggregate(&records, &[GroupField::Region], Reduction::MeanPopulation);
        assert_eq!(groups.groups()[0].value.as_mean(), Some(1000.0));

        let zeros = vec![stat("11", "theft", 10, Some(0.0), 2021)];
        let groups = Aggregator::aggregate(&zeros, &[GroupField::Region], Reduction::MeanPopulation);
        assert_eq!(groups.groups()[0].value, AggregateValue::Mean(None));
    }

    #[test]
    fn count_reduction_counts_members() {
        let records = sample();
        let groups = Aggregator::aggregate(&records, &[GroupField::Category], Reduction::Count);
        let counts: Vec<usize> = groups
            .groups()
            .iter()
            .map(|g| match g.value {
                AggregateValue::Count(n) => n,
                _ => 0,
            })
            .collect();
        assert_eq!(counts, vec![1, 4]);
    }

    #[test]
    fn empty_filter_result_is_no_data() {
        let records = sample();
        let filter = RecordFilter::new().category("theft").year(1999);
        let filtered = DataProcessor::filter(&records, &filter);
        let aggregation = Aggregator::aggregate(&filtered, &[GroupField::Region], Reduction::SumFacts);
        assert!(aggregation.is_no_data());
        assert!(aggregation.groups().is_empty());
    }
}
