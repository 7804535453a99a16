mod app;

use app::MonitorApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 520.0])
            .with_min_inner_size([400.0, 300.0])
            .with_title("XR Input Monitor"),
        ..Default::default()
    };

    eframe::run_native(
        "XR Input Monitor",
        native_options,
        Box::new(|cc| Ok(Box::new(MonitorApp::new(cc)))),
    )
}
