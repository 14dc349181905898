mod app;
mod ui;

use app::ClassifierApp;
use scenery::{Config, Pipeline};
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // A broken config is reported in the window rather than aborting startup.
    let (config, config_error) = match Config::load(None) {
        Ok(config) => (config, None),
        Err(e) => {
            tracing::error!(error = %e, "falling back to default config");
            (Config::default(), Some(e.to_string()))
        }
    };
    let mut app = ClassifierApp::new(Pipeline::from_config(&config));
    if let Some(message) = config_error {
        app.error = Some(message);
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([720.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Image Classification",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
