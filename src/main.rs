use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use bubble_canvas::app::BubbleCanvasApp;
use bubble_canvas::canvas::{self, Canvas};
use bubble_canvas::graph::JsonFileStore;
use bubble_canvas::physics::SimulationParams;
use bubble_canvas::scheduler::DEFAULT_TICK_INTERVAL;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file the bubble graph is loaded from and saved to.
    #[arg(long, default_value = "bubbles_data.json")]
    data_file: PathBuf,
    /// Milliseconds between simulation ticks.
    #[arg(long, default_value_t = DEFAULT_TICK_INTERVAL.as_millis() as u64)]
    tick_ms: u64,
    /// Random drift applied to every bubble each tick; 0 disables it.
    #[arg(long, default_value_t = 0.5)]
    float_strength: f32,
    #[arg(short, long)]
    verbose: bool,
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_tracing(args: &Args) {
    let level = if args.quiet {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args);

    let store = JsonFileStore::new(&args.data_file);
    info!(path = %store.path().display(), "using data file");

    let params = SimulationParams {
        float_strength: args.float_strength.max(0.0),
        ..SimulationParams::default()
    };
    let shared = Canvas::new(store, params).into_shared();
    let tick_interval = Duration::from_millis(args.tick_ms.max(1));

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 860.0]),
        ..Default::default()
    };

    let app_canvas = Arc::clone(&shared);
    let result = eframe::run_native(
        "Bubble Canvas",
        options,
        Box::new(move |cc| Ok(Box::new(BubbleCanvasApp::new(cc, app_canvas, tick_interval)))),
    );

    canvas::lock(&shared).persist();
    info!("bubble graph saved on shutdown");

    result.map_err(|error| anyhow!("window closed with an error: {error}"))
}
