#![warn(clippy::all, rust_2018_idioms)]

use sketch_studio::SketchApp;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Sketch Studio"),
        ..Default::default()
    };

    eframe::run_native(
        "Sketch Studio",
        options,
        Box::new(|cc| Ok(Box::new(SketchApp::new(cc)))),
    )
}
