mod app;

use std::path::PathBuf;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use chart_atlas::charts::ChartKind;
use chart_atlas::config::GalleryConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding the chart data files.
    #[arg(long, default_value = "assets/data")]
    data_dir: PathBuf,

    /// Chart shown at startup.
    #[arg(long, value_enum, default_value_t = ChartKind::CirclePack)]
    chart: ChartKind,

    /// JSON file overriding chart settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the force layout's initial jitter.
    #[arg(long)]
    seed: Option<u64>,
}

fn load_config(args: &Args) -> GalleryConfig {
    let config = match &args.config {
        Some(path) => GalleryConfig::load(path).unwrap_or_else(|error| {
            warn!(error = %format!("{error:#}"), "using default chart settings");
            GalleryConfig::default()
        }),
        None => GalleryConfig::default(),
    };
    match args.seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args);
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "chart-atlas",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ChartAtlasApp::new(
                cc,
                args.data_dir.clone(),
                config.clone(),
                args.chart,
            )))
        }),
    )
}
