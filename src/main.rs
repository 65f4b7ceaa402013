use eframe::egui;
use float_launcher::gui::LauncherApp;
use float_launcher::license::LicenseGate;
use float_launcher::logging;
use float_launcher::settings::{Settings, SETTINGS_FILE};
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    logging::init(settings.debug_logging, settings.log_file.as_ref().map(PathBuf::from));
    settings.validate();

    let gate = Arc::new(LicenseGate::from_settings(&settings.license)?);
    tracing::info!(policy = ?gate.policy(), endpoint = %settings.license.endpoint, "starting launcher");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Float Launcher")
            .with_inner_size([420.0, 220.0])
            .with_min_inner_size([40.0, 40.0])
            .with_always_on_top(),
        ..Default::default()
    };

    eframe::run_native(
        "Float Launcher",
        native_options,
        Box::new(move |_cc| Box::new(LauncherApp::new(&settings, gate))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run launcher: {e}"))
}
