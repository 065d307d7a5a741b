use std::path::PathBuf;

use eframe::egui;
use krbcam_viewer::app::KrbCamApp;
use krbcam_viewer::config::Settings;
use krbcam_viewer::data::od::OdExtractor;
use krbcam_viewer::state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let (settings, extractor) = match load_settings() {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("Falling back to default settings: {e:#}");
            (Settings::default(), OdExtractor::default())
        }
    };

    let mut state = AppState::new(settings, extractor);
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        state.open(&path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "KRbCam – Kinetic OD Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(KrbCamApp::new(state)))),
    )
}

fn load_settings() -> anyhow::Result<(Settings, OdExtractor)> {
    let settings = Settings::load()?;
    let extractor = settings.extractor()?;
    Ok((settings, extractor))
}
