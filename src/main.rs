mod app;
mod app_dirs;
mod classify;
mod history;
mod intake;
mod logging;

use eframe::CreationContext;

fn main() -> Result<(), eframe::Error> {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([540.0, 780.0])
            .with_min_inner_size([420.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "LeafScan AI",
        options,
        Box::new(|cc: &CreationContext| Box::new(app::LeafScanApp::new(cc))),
    )
}
