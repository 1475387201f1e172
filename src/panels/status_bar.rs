use eframe::egui::{self, Color32};

use crate::SketchApp;

pub fn status_bar(app: &mut SketchApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        if let Some(message) = app.error.clone() {
            ui.horizontal(|ui| {
                ui.colored_label(Color32::from_rgb(200, 40, 40), message);
                if ui.small_button("✕").clicked() {
                    app.error = None;
                }
            });
        }
        ui.horizontal(|ui| {
            let editor = &app.editor;
            ui.label(format!("{} · {}", editor.tool().name(), editor.gesture().label()));
            ui.separator();
            ui.label(format!("{}×{}", editor.doc.width(), editor.doc.height()));
            ui.separator();
            ui.label(format!("{:.0}%", editor.view.scale * 100.0));
            ui.separator();
            ui.label(format!(
                "{} layer(s), {} shape(s)",
                editor.doc.layers.len(),
                editor.doc.shapes().len()
            ));
            ui.separator();
            ui.label(format!("History {}/{}", editor.history().cursor() + 1, editor.history().len()));
            if app.is_generating() {
                ui.separator();
                ui.spinner();
                ui.label("Generating…");
            }
        });
    });
}
