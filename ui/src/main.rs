#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use qrview_ui::config::DemoConfig;

mod alloc {
    #[global_allocator]
    static MALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;
}

fn main() -> eframe::Result {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    // Log to stderr (if you run with `RUST_LOG=debug`).
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_module("egui_winit::clipboard", log::LevelFilter::Off)
        .init();

    let config = DemoConfig::from_env().unwrap_or_else(|err| {
        log::warn!("{err}; falling back to defaults");
        DemoConfig::default()
    });
    log::info!("Starting with {config:?}");

    let native_options = eframe::NativeOptions {
        hardware_acceleration: eframe::HardwareAcceleration::Preferred,
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 480.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };

    eframe::run_native(
        "qrview",
        native_options,
        Box::new(move |_cc| Ok(Box::new(qrview_ui::QrViewApp::new(config)))),
    )
}
