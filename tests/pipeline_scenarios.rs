use approx::assert_relative_eq;
use crime_atlas::charts::{AnimationMode, ChartSpec, Labels, ViewOutcome};
use crime_atlas::data::{ColumnMapping, DataProcessor, RegionCode};
use crime_atlas::export::ReportExporter;
use crime_atlas::pipeline::{Datasets, RenderOptions, Selection, ViewKind};
use crime_atlas::stats::{Aggregator, GroupField, Reduction};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const STATS: &str = "\
Code.région;annee;classe;unité.de.compte;faits;POP
11;2021;theft;victime;30;1000
11;2021;assault;Mis en cause;5;1000
24;2021;theft;victime;10;2000
24;2022;theft;victime;8;2000
11;2022;assault;victime;4;1000
01;2021;theft;Mis en cause;2;400
99;2021;theft;victime;6;500
";

fn square(code: &str, x0: f64, y0: f64) -> String {
    format!(
        r#"{{"type": "Feature", "properties": {{"code": {code}, "nom": "Region {x0}"}},
            "geometry": {{"type": "Polygon", "coordinates": [[[{x0}, {y0}], [{x1}, {y0}], [{x1}, {y1}], [{x0}, {y1}], [{x0}, {y0}]]]}}}}"#,
        code = code,
        x0 = x0,
        y0 = y0,
        x1 = x0 + 2.0,
        y1 = y0 + 2.0,
    )
}

fn regions_geojson() -> String {
    format!(
        r#"{{"type": "FeatureCollection", "features": [{}, {}, {}]}}"#,
        square(r#""11""#, 0.0, 45.0),
        square("24", 4.0, 47.0),
        square("1", -2.0, 43.0),
    )
}

struct Fixture {
    _dir: TempDir,
    stats: PathBuf,
    regions: PathBuf,
}

fn fixture(stats: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let stats_path = dir.path().join("data_regional.csv");
    let regions_path = dir.path().join("regions.geojson");
    fs::write(&stats_path, stats).unwrap();
    fs::write(&regions_path, regions_geojson()).unwrap();
    Fixture {
        _dir: dir,
        stats: stats_path,
        regions: regions_path,
    }
}

fn load(fixture: &Fixture) -> Datasets {
    Datasets::load(
        &fixture.stats,
        &fixture.regions,
        "code",
        ColumnMapping::default(),
    )
    .unwrap()
}

#[test]
fn padded_codes_join_their_boundary() {
    let fixture = fixture(STATS);
    let datasets = load(&fixture);

    let joined = DataProcessor::join(&datasets.stats, &datasets.geometries);
    let padded = joined
        .iter()
        .find(|j| j.stat.region.as_str() == "1")
        .expect("row with code 01");
    assert_eq!(padded.geometry.map(|g| g.code.as_str()), Some("1"));
}

#[test]
fn left_join_keeps_every_statistic() {
    let fixture = fixture(STATS);
    let datasets = load(&fixture);

    let joined = DataProcessor::join(&datasets.stats, &datasets.geometries);
    assert_eq!(joined.len(), datasets.stats.len());
    assert_eq!(joined.len(), 7);
    assert_eq!(joined.iter().filter(|j| j.geometry.is_none()).count(), 1);
}

#[test]
fn category_and_year_selection_aggregates_matching_rows_only() {
    let fixture = fixture(STATS);
    let datasets = load(&fixture);

    let selection = Selection {
        category: Some("theft".to_string()),
        year: Some(2021),
        ..Selection::default()
    };
    let filtered = DataProcessor::filter(&datasets.stats, &selection.record_filter());
    assert_eq!(filtered.len(), 4);
    assert!(filtered
        .iter()
        .all(|r| r.category == "theft" && r.year == 2021));

    let aggregation =
        Aggregator::aggregate(&filtered, &[GroupField::Region], Reduction::SumFacts);
    let sums: Vec<(String, u64)> = aggregation
        .groups()
        .iter()
        .map(|g| {
            (
                g.key.region.as_ref().unwrap().to_string(),
                g.value.as_sum().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        sums,
        vec![
            ("1".to_string(), 2),
            ("11".to_string(), 30),
            ("24".to_string(), 10),
            ("99".to_string(), 6),
        ]
    );
    let total: u64 = sums.iter().map(|(_, v)| v).sum();
    assert_eq!(total, Aggregator::total_facts(&filtered));
}

#[test]
fn choropleth_renders_despite_unknown_region() {
    let fixture = fixture(STATS);
    let datasets = load(&fixture);
    let selection = Selection {
        category: Some("theft".to_string()),
        ..Selection::default()
    };
    let mut rng = StdRng::seed_from_u64(3);

    let outcome = datasets
        .render(
            ViewKind::Choropleth,
            &selection,
            &RenderOptions::default(),
            &Labels::english(),
            &mut rng,
        )
        .unwrap();
    let Some(ChartSpec::Choropleth(map)) = outcome.chart() else {
        panic!("expected a choropleth, got {:?}", outcome);
    };
    let codes: Vec<&str> = map.regions.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["1", "11", "24"]);
    assert_eq!(map.skipped, vec![RegionCode::parse("99").unwrap()]);
}

#[test]
fn zero_population_region_is_unscaled_on_rate_map() {
    let stats = STATS.replace("11;2021;theft;victime;30;1000", "11;2021;theft;victime;30;0")
        .replace("11;2021;assault;Mis en cause;5;1000", "11;2021;assault;Mis en cause;5;0")
        .replace("11;2022;assault;victime;4;1000", "11;2022;assault;victime;4;0");
    let fixture = fixture(&stats);
    let datasets = load(&fixture);
    let mut rng = StdRng::seed_from_u64(3);

    let outcome = datasets
        .render(
            ViewKind::RateMap,
            &Selection::default(),
            &RenderOptions::default(),
            &Labels::english(),
            &mut rng,
        )
        .unwrap();
    let Some(ChartSpec::RateMap(map)) = outcome.chart() else {
        panic!("expected a rate map, got {:?}", outcome);
    };

    let region_11 = map.points.iter().find(|p| p.code.as_str() == "11").unwrap();
    assert_eq!(region_11.rate.rate, None);
    assert_eq!(region_11.rate.position, None);
    assert!(!region_11.rate.clamped);

    // 24: (10 + 8) / 2000 * 100
    let region_24 = map.points.iter().find(|p| p.code.as_str() == "24").unwrap();
    assert_relative_eq!(region_24.rate.rate.unwrap(), 0.9);
    assert!(map.scale.max.is_finite() && map.scale.max > 0.0);

    let json = serde_json::to_string(&outcome).unwrap();
    assert!(!json.contains("NaN") && !json.contains("inf"));
}

#[test]
fn missing_file_becomes_one_message() {
    let dir = TempDir::new().unwrap();
    let err = Datasets::load(
        &dir.path().join("absent.csv"),
        &dir.path().join("absent.geojson"),
        "code",
        ColumnMapping::default(),
    )
    .err()
    .expect("load should fail");

    assert!(err.is_missing_file());
    assert_eq!(
        err.user_message(&Labels::english()),
        "The data file was not found. Please upload a valid CSV file."
    );
}

#[test]
fn filter_table_returns_all_matches_below_sample_bound() {
    let fixture = fixture(STATS);
    let datasets = load(&fixture);
    let selection = Selection {
        filter_column: Some("classe".to_string()),
        filter_value: Some("assault".to_string()),
        display_columns: Some(vec!["Code.région".to_string(), "faits".to_string()]),
        ..Selection::default()
    };
    let mut rng = StdRng::seed_from_u64(11);

    let outcome = datasets
        .render(
            ViewKind::Table,
            &selection,
            &RenderOptions::default(),
            &Labels::english(),
            &mut rng,
        )
        .unwrap();
    let Some(ChartSpec::Table(table)) = outcome.chart() else {
        panic!("expected a table, got {:?}", outcome);
    };
    assert_eq!(table.columns, vec!["Code.région", "faits"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.total_matches, 2);

    let none = Selection {
        filter_value: Some("fraud".to_string()),
        ..selection
    };
    let outcome = datasets
        .render(
            ViewKind::Table,
            &none,
            &RenderOptions::default(),
            &Labels::english(),
            &mut rng,
        )
        .unwrap();
    assert!(outcome.is_no_data());
}

#[test]
fn filter_table_defaults_to_leading_columns() {
    let fixture = fixture(STATS);
    let datasets = load(&fixture);
    let selection = Selection {
        filter_column: Some("classe".to_string()),
        filter_value: Some("theft".to_string()),
        display_columns: None,
        ..Selection::default()
    };
    let mut rng = StdRng::seed_from_u64(11);

    let outcome = datasets
        .render(
            ViewKind::Table,
            &selection,
            &RenderOptions::default(),
            &Labels::english(),
            &mut rng,
        )
        .unwrap();
    let Some(ChartSpec::Table(table)) = outcome.chart() else {
        panic!("expected a table, got {:?}", outcome);
    };
    assert_eq!(
        table.columns,
        vec!["Code.région", "annee", "classe", "unité.de.compte", "faits"]
    );
    assert_eq!(table.columns, datasets.default_display_columns());
    assert!(table.rows.len() <= RenderOptions::default().sample_size);
}

#[test]
fn animated_series_follows_years_and_mode() {
    let fixture = fixture(STATS);
    let datasets = load(&fixture);
    let selection = Selection {
        mode: AnimationMode::Bar,
        ..Selection::default()
    };
    let mut rng = StdRng::seed_from_u64(5);

    let outcome = datasets
        .render(
            ViewKind::Animated,
            &selection,
            &RenderOptions::default(),
            &Labels::english(),
            &mut rng,
        )
        .unwrap();
    let Some(ChartSpec::Animated(spec)) = outcome.chart() else {
        panic!("expected an animated series, got {:?}", outcome);
    };
    assert_eq!(spec.mode, AnimationMode::Bar);
    assert_eq!(
        spec.frames.iter().map(|f| f.year).collect::<Vec<_>>(),
        vec![2021, 2022]
    );
    assert!(spec.show_slider());
}

#[test]
fn export_writes_one_document_per_view() {
    let fixture = fixture(STATS);
    let datasets = load(&fixture);
    let out = TempDir::new().unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    let selection = datasets.default_selection();
    let views = datasets
        .compose(&selection, &RenderOptions::default(), &Labels::french(), &mut rng)
        .unwrap();
    assert_eq!(views.len(), ViewKind::ALL.len());

    let report = ReportExporter::export_views(&views, out.path()).unwrap();
    assert_eq!(report.json.len(), ViewKind::ALL.len());
    for view in ViewKind::ALL {
        let path = out.path().join(format!("{}.json", view.slug()));
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value.get("outcome").is_some(), "{} has no outcome", view.slug());
    }
    assert!(!report.png.iter().any(|p| p.ends_with("table.png")));

    let ViewOutcome::Chart(_) = &views[0].1 else {
        panic!("default selection should produce a pie");
    };
}
