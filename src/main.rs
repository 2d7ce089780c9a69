mod app;
mod bodies;
mod camera;
mod config;
mod drawing;
mod error;
mod loader;
mod panel;
mod scene;
mod session;
mod stars;
mod state;
mod store;
mod texture;

use app::App;
use clap::Parser;
use config::{AppConfig, CliArgs};
use eframe::egui;

/// Short commit hash baked in at build time, empty outside a git checkout.
pub(crate) const BUILD_HASH: &str = env!("GIT_HASH");

fn main() -> eframe::Result<()> {
    let args = CliArgs::parse();
    let config_dir = args.config.clone().unwrap_or_else(AppConfig::default_dir);
    let (mut config, load_error) = match AppConfig::load_or_create(&config_dir) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    config.apply_env(|var| std::env::var(var).ok());
    config.apply_cli_overrides(&args);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter())).init();
    if let Some(e) = load_error {
        log::warn!("using default settings, {} unreadable: {e}", config_dir.display());
    }
    log::info!("solar-viz {} ({})", env!("CARGO_PKG_VERSION"), BUILD_HASH);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_title(config.window.title.clone()),
        ..Default::default()
    };
    let title = config.window.title.clone();
    eframe::run_native(&title, options, Box::new(|cc| Ok(Box::new(App::new(cc, config)))))
}
