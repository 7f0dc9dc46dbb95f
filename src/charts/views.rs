//! View Renderers
//! Pure functions from filtered/aggregated data and the user's selections to
//! a [`ViewOutcome`]. Nothing is kept between calls.

use crate::charts::{
    AnimatedSpec, AnimationMode, BarChartSpec, BarPoint, BarSeries, BarsOrNoData,
    BarsOverMapSpec, CategoryBar, ChartSpec, ChoroplethRegion, ChoroplethSpec, Labels, MapBar,
    PieSlice, PieSpec, RateMapSpec, RatePoint, RegionDetailSpec, SeriesPoint, TableSpec,
    VictimAccusedSpec, ViewOutcome, YearFrame,
};
use crate::data::{
    CountUnit, DataProcessor, JoinedRecord, ProcessorError, RecordFilter, RegionCode,
    RegionGeometry, StatRecord,
};
use crate::stats::{crime_rate, Aggregator, GroupField, RateScale, Reduction, ScaledRate};
use polars::prelude::DataFrame;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};

/// Lateral offset between the bars of consecutive categories, in degrees.
pub const BAR_OFFSET: f64 = 0.02;
/// Headroom above the tallest value of an animated series.
pub const Y_HEADROOM: f64 = 1.1;

/// Builds chart descriptions for every view type.
pub struct ViewRenderer;

impl ViewRenderer {
    /// Share of facts per region for one category.
    pub fn pie_by_category(records: &[StatRecord], category: &str, labels: &Labels) -> ViewOutcome {
        let filtered = DataProcessor::filter(records, &RecordFilter::new().category(category));
        let Some(sums) = region_sums(&filtered) else {
            return ViewOutcome::no_data(labels.no_data);
        };

        let total: u64 = sums.iter().map(|(_, v)| v).sum();
        if total == 0 {
            return ViewOutcome::no_data(labels.no_data);
        }

        let slices = sums
            .into_iter()
            .map(|(region, value)| PieSlice {
                label: region.to_string(),
                value,
                share: value as f64 / total as f64,
            })
            .collect();

        ViewOutcome::Chart(ChartSpec::Pie(PieSpec {
            title: labels.category_title(category),
            total,
            slices,
        }))
    }

    /// Regions colored by their fact count for one category. Regions without a
    /// boundary are listed in `skipped` instead of failing the map.
    pub fn choropleth(joined: &[JoinedRecord<'_>], category: &str, labels: &Labels) -> ViewOutcome {
        let filtered = DataProcessor::filter(joined, &RecordFilter::new().category(category));
        let index = geometry_index(filtered.iter().copied());
        let Some(sums) = region_sums(&filtered) else {
            return ViewOutcome::no_data(labels.no_data);
        };

        let mut regions = Vec::with_capacity(sums.len());
        let mut skipped = Vec::new();
        for (code, value) in sums {
            match index.get(&code) {
                Some(geometry) => regions.push(ChoroplethRegion {
                    name: geometry.label(),
                    rings: geometry.outlines(),
                    code,
                    value,
                }),
                None => skipped.push(code),
            }
        }

        if regions.is_empty() {
            return ViewOutcome::no_data(labels.no_data);
        }

        let min = regions.iter().map(|r| r.value).min().unwrap_or(0);
        let max = regions.iter().map(|r| r.value).max().unwrap_or(0);
        let center = mean_centroid(regions.iter().filter_map(|r| index.get(&r.code).copied()));

        ViewOutcome::Chart(ChartSpec::Choropleth(ChoroplethSpec {
            title: labels.category_title(category),
            regions,
            value_range: [min, max],
            skipped,
            center,
        }))
    }

    /// One vertical bar per (category, region) at the region centroid, shifted
    /// by `index * BAR_OFFSET` per category, over every region outline.
    pub fn bars_over_map(
        joined: &[JoinedRecord<'_>],
        geometries: &[RegionGeometry],
        labels: &Labels,
    ) -> ViewOutcome {
        let categories = DataProcessor::categories(joined);
        let index = geometry_index(joined.iter());

        let mut bars = Vec::new();
        for (i, category) in categories.iter().enumerate() {
            let filtered =
                DataProcessor::filter(joined, &RecordFilter::new().category(category.as_str()));
            let Some(sums) = region_sums(&filtered) else {
                continue;
            };

            let offset = i as f64 * BAR_OFFSET;
            for (region, height) in sums {
                let Some((x, y)) = index.get(&region).and_then(|g| g.centroid()) else {
                    continue;
                };
                bars.push(MapBar {
                    category_index: i,
                    region,
                    x: x + offset,
                    y: y + offset,
                    height,
                });
            }
        }

        if bars.is_empty() {
            return ViewOutcome::no_data(labels.no_data);
        }

        ViewOutcome::Chart(ChartSpec::BarsOverMap(BarsOverMapSpec {
            title: labels.bars_over_map_title.to_string(),
            categories,
            bars,
            outlines: geometries.iter().flat_map(RegionGeometry::outlines).collect(),
            axis_labels: [
                labels.longitude.to_string(),
                labels.latitude.to_string(),
                labels.facts_axis.to_string(),
            ],
        }))
    }

    /// Facts per region and category, split into a victim chart and an
    /// accused chart. Each side reports its own "no data".
    pub fn victim_vs_accused(records: &[StatRecord], labels: &Labels) -> ViewOutcome {
        let victims = bars_for_unit(records, CountUnit::Victim, labels.victims_title, labels);
        let accused = bars_for_unit(records, CountUnit::Accused, labels.accused_title, labels);

        if matches!(victims, BarsOrNoData::NoData { .. })
            && matches!(accused, BarsOrNoData::NoData { .. })
        {
            return ViewOutcome::no_data(labels.no_data);
        }

        ViewOutcome::Chart(ChartSpec::VictimAccused(VictimAccusedSpec {
            title: format!("{} / {}", labels.victims_title, labels.accused_title),
            victims,
            accused,
        }))
    }

    /// Crime rate per region placed at the region centroid.
    ///
    /// The rate is `sum(facts) / mean(population) * 100` over the filtered
    /// rows. Regions with no usable population keep a missing rate and do not
    /// take part in the scale; `rate_max` fixes the upper bound of the scale.
    pub fn rate_map(
        joined: &[JoinedRecord<'_>],
        filter: &RecordFilter,
        rate_max: Option<f64>,
        labels: &Labels,
    ) -> ViewOutcome {
        let filtered = DataProcessor::filter(joined, filter);
        let index = geometry_index(filtered.iter().copied());

        let facts = Aggregator::aggregate(&filtered, &[GroupField::Region], Reduction::SumFacts);
        let populations =
            Aggregator::aggregate(&filtered, &[GroupField::Region], Reduction::MeanPopulation);

        let mut points = Vec::new();
        let mut skipped = Vec::new();
        for (f, p) in facts.groups().iter().zip(populations.groups()) {
            let Some(code) = f.key.region.clone() else {
                continue;
            };
            let total = f.value.as_sum().unwrap_or(0);
            let population = p.value.as_mean();

            let placed = index
                .get(&code)
                .and_then(|g| g.centroid().map(|c| (g.label(), c)));
            let Some((name, (lon, lat))) = placed else {
                skipped.push(code);
                continue;
            };

            points.push(RatePoint {
                code,
                name,
                lon,
                lat,
                facts: total,
                population,
                rate: ScaledRate {
                    rate: crime_rate(total, population),
                    position: None,
                    clamped: false,
                },
            });
        }

        if points.is_empty() {
            return ViewOutcome::no_data(labels.no_data);
        }

        let scale = match rate_max {
            Some(max) => RateScale::fixed(max),
            None => {
                let rates: Vec<f64> = points.iter().filter_map(|p| p.rate.rate).collect();
                RateScale::from_rates(&rates)
            }
        };
        for point in &mut points {
            point.rate = scale.place(point.rate.rate);
        }

        ViewOutcome::Chart(ChartSpec::RateMap(RateMapSpec {
            title: labels.rate_title.to_string(),
            scale,
            points,
            skipped,
        }))
    }

    /// Facts per region, one frame per year; the first year is active.
    pub fn animated_series<R: AsRef<StatRecord>>(
        records: &[R],
        mode: AnimationMode,
        labels: &Labels,
    ) -> ViewOutcome {
        let fields = [GroupField::Year, GroupField::Region];
        let facts = Aggregator::aggregate(records, &fields, Reduction::SumFacts);
        let populations = Aggregator::aggregate(records, &fields, Reduction::MeanPopulation);

        let mut frames: Vec<YearFrame> = Vec::new();
        for (f, p) in facts.groups().iter().zip(populations.groups()) {
            let (Some(year), Some(region)) = (f.key.year, f.key.region.clone()) else {
                continue;
            };
            let point = SeriesPoint {
                region,
                facts: f.value.as_sum().unwrap_or(0),
                population: p.value.as_mean(),
            };
            match frames.last_mut() {
                Some(frame) if frame.year == year => frame.points.push(point),
                _ => frames.push(YearFrame {
                    year,
                    points: vec![point],
                }),
            }
        }

        if frames.is_empty() {
            return ViewOutcome::no_data(labels.no_data);
        }

        let max = frames
            .iter()
            .flat_map(|f| f.points.iter())
            .map(|p| p.facts)
            .max()
            .unwrap_or(0);
        let upper = if max == 0 { 1.0 } else { max as f64 * Y_HEADROOM };

        let title = match mode {
            AnimationMode::Scatter => labels.scatter_title,
            AnimationMode::Bar => labels.bar_title,
            AnimationMode::Line => labels.line_title,
        };

        ViewOutcome::Chart(ChartSpec::Animated(AnimatedSpec {
            title: title.to_string(),
            mode,
            frames,
            active: 0,
            y_range: [0.0, upper],
            x_label: labels.region_axis.to_string(),
            y_label: labels.facts_axis.to_string(),
            year_prefix: labels.year_prefix.to_string(),
        }))
    }

    /// Facts per category for one region and year, with the mean population
    /// of the selection.
    pub fn region_detail(
        records: &[StatRecord],
        region: &RegionCode,
        year: i32,
        labels: &Labels,
    ) -> ViewOutcome {
        let filtered =
            DataProcessor::filter(records, &RecordFilter::new().region(region.clone()).year(year));
        let Some(groups) =
            Aggregator::aggregate(&filtered, &[GroupField::Category], Reduction::SumFacts)
                .into_groups()
        else {
            return ViewOutcome::no_data(labels.no_data_region_year);
        };

        let population = Aggregator::aggregate(&filtered, &[], Reduction::MeanPopulation)
            .groups()
            .first()
            .and_then(|g| g.value.as_mean());

        let bars: Vec<CategoryBar> = groups
            .into_iter()
            .filter_map(|g| {
                Some(CategoryBar {
                    facts: g.value.as_sum()?,
                    category: g.key.category?,
                })
            })
            .collect();

        ViewOutcome::Chart(ChartSpec::RegionDetail(RegionDetailSpec {
            title: labels.detail_title(year, region.as_str()),
            region: region.clone(),
            year,
            total_facts: bars.iter().map(|b| b.facts).sum(),
            bars,
            population,
        }))
    }

    /// Random sample of at most `sample_size` rows whose `filter_col` equals
    /// `value`, restricted to `display_cols`.
    pub fn filter_table<R: Rng + ?Sized>(
        df: &DataFrame,
        filter_col: &str,
        value: &str,
        display_cols: &[String],
        sample_size: usize,
        rng: &mut R,
        labels: &Labels,
    ) -> Result<ViewOutcome, ProcessorError> {
        let table = DataProcessor::filter_rows(df, filter_col, value, display_cols)?;
        if table.rows.is_empty() {
            return Ok(ViewOutcome::no_data(labels.no_data_table(value, filter_col)));
        }

        let total_matches = table.rows.len();
        let rows: Vec<Vec<String>> = table
            .rows
            .choose_multiple(rng, sample_size.max(1))
            .cloned()
            .collect();

        Ok(ViewOutcome::Chart(ChartSpec::Table(TableSpec {
            title: labels.table_title(value),
            columns: table.columns,
            rows,
            total_matches,
        })))
    }
}

/// Sum of facts per region, in region order. `None` when nothing matched.
fn region_sums<R: AsRef<StatRecord>>(records: &[R]) -> Option<Vec<(RegionCode, u64)>> {
    let groups = Aggregator::aggregate(records, &[GroupField::Region], Reduction::SumFacts)
        .into_groups()?;
    Some(
        groups
            .into_iter()
            .filter_map(|g| Some((g.key.region?, g.value.as_sum()?)))
            .collect(),
    )
}

fn geometry_index<'a, 'b, I>(records: I) -> HashMap<RegionCode, &'a RegionGeometry>
where
    'a: 'b,
    I: IntoIterator<Item = &'b JoinedRecord<'a>>,
{
    records
        .into_iter()
        .filter_map(|r| r.geometry)
        .map(|g| (g.code.clone(), g))
        .collect()
}

fn mean_centroid<'a>(geometries: impl Iterator<Item = &'a RegionGeometry>) -> [f64; 2] {
    let (sum_x, sum_y, n) = geometries
        .filter_map(RegionGeometry::centroid)
        .fold((0.0, 0.0, 0usize), |(sx, sy, n), (x, y)| (sx + x, sy + y, n + 1));
    if n == 0 {
        [0.0, 0.0]
    } else {
        [sum_x / n as f64, sum_y / n as f64]
    }
}

fn bars_for_unit(
    records: &[StatRecord],
    unit: CountUnit,
    title: &str,
    labels: &Labels,
) -> BarsOrNoData {
    let filtered = DataProcessor::filter(records, &RecordFilter::new().unit(unit));
    let Some(groups) = Aggregator::aggregate(
        &filtered,
        &[GroupField::Category, GroupField::Region],
        Reduction::SumFacts,
    )
    .into_groups() else {
        return BarsOrNoData::NoData {
            message: labels.no_data.to_string(),
        };
    };

    let mut series: BTreeMap<String, Vec<BarPoint>> = BTreeMap::new();
    for group in groups {
        let (Some(category), Some(region), Some(value)) =
            (group.key.category, group.key.region, group.value.as_sum())
        else {
            continue;
        };
        series
            .entry(category)
            .or_default()
            .push(BarPoint { region, value });
    }

    BarsOrNoData::Chart(BarChartSpec {
        title: title.to_string(),
        x_label: labels.region_axis.to_string(),
        y_label: labels.facts_axis.to_string(),
        regions: DataProcessor::regions(&filtered),
        series: series
            .into_iter()
            .map(|(name, bars)| BarSeries { name, bars })
            .collect(),
    })
}
