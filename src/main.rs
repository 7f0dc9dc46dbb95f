//! Crime Atlas - regional crime statistics viewer
//!
//! Opens the interactive window by default; `export` renders every view to a
//! directory without one.

use anyhow::Context;
use clap::Parser;
use crime_atlas::config::{AppConfig, Cli, Commands, ExportArgs};
use crime_atlas::export::ReportExporter;
use crime_atlas::gui::CrimeAtlasApp;
use crime_atlas::pipeline::Datasets;
use eframe::egui;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli).context("invalid configuration")?;

    match cli.command {
        Some(Commands::Export(args)) => run_export(&config, &args),
        None => run_window(config),
    }
}

fn run_export(config: &AppConfig, args: &ExportArgs) -> anyhow::Result<()> {
    let datasets = match Datasets::load(
        &config.stats_path,
        &config.regions_path,
        &config.code_property,
        config.mapping.clone(),
    ) {
        Ok(datasets) => datasets,
        Err(e) => {
            eprintln!("{}", e.user_message(&config.labels));
            return Err(e).context("failed to load datasets");
        }
    };

    let mut selection = datasets.default_selection();
    args.apply(&mut selection)?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let views = datasets
        .compose(&selection, &config.options, &config.labels, &mut rng)
        .context("failed to render views")?;

    let report = ReportExporter::export_views(&views, &args.out)
        .with_context(|| format!("failed to export to {}", args.out.display()))?;
    println!(
        "Wrote {} JSON documents and {} images to {}",
        report.json.len(),
        report.png.len(),
        args.out.display()
    );

    if args.open {
        open::that(&args.out)
            .with_context(|| format!("failed to open {}", args.out.display()))?;
    }
    Ok(())
}

fn run_window(config: AppConfig) -> anyhow::Result<()> {
    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1100.0, 650.0])
            .with_title("Crime Atlas"),
        ..Default::default()
    };

    eframe::run_native(
        "Crime Atlas",
        options,
        Box::new(|cc| Ok(Box::new(CrimeAtlasApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {e}"))
}
