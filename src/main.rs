mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::{anyhow, Context};
use app::Co2ExplorerApp;
use config::Config;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let config = Config::resolve(&args)?;

    // A configured dataset that cannot be loaded aborts startup; there is
    // no fallback table.
    let mut state = AppState::new(config);
    state
        .load_configured()
        .context("loading configured input files")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CO₂ Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(Co2ExplorerApp::new(state)))),
    )
    .map_err(|e| anyhow!("running the UI: {e}"))
}
