use eframe::egui;

use crate::SketchApp;
use crate::layer::LayerId;
use crate::perspective::SetupType;

pub fn layers_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::SidePanel::right("layers_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            layer_list(app, ui);
            ui.separator();
            perspective_controls(app, ui);
        });
}

fn layer_list(app: &mut SketchApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.heading("Layers");
        if ui.button("+").on_hover_text("Add layer").clicked() {
            app.editor.add_layer();
        }
        let can_delete = app.editor.doc.layers.len() > 1;
        if ui
            .add_enabled(can_delete, egui::Button::new("🗑"))
            .on_hover_text("Delete active layer")
            .clicked()
        {
            app.editor.delete_active_layer();
        }
    });

    let active = app.editor.doc.layers.active_id();
    let rows: Vec<(LayerId, String, bool)> = app
        .editor
        .doc
        .layers
        .iter()
        .map(|layer| (layer.id, layer.name.clone(), layer.visible))
        .collect();
    let count = rows.len();

    for (index, (id, name, visible)) in rows.into_iter().enumerate() {
        ui.horizontal(|ui| {
            let mut shown = visible;
            if ui.checkbox(&mut shown, "").on_hover_text("Visible").changed() {
                app.editor.set_layer_visibility(id, shown);
            }

            let renaming = app.layer_rename.as_ref().is_some_and(|(layer, _)| *layer == id);
            if renaming {
                if let Some((_, buffer)) = app.layer_rename.as_mut() {
                    let response = ui.text_edit_singleline(buffer);
                    if response.lost_focus() {
                        let new_name = buffer.clone();
                        app.layer_rename = None;
                        app.editor.rename_layer(id, &new_name);
                    } else if !response.has_focus() {
                        response.request_focus();
                    }
                }
            } else {
                let response = ui
                    .selectable_label(active == Some(id), name.as_str())
                    .on_hover_text("Double-click to rename");
                if response.double_clicked() {
                    app.layer_rename = Some((id, name.clone()));
                } else if response.clicked() {
                    app.editor.select_layer(id);
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(index + 1 < count, egui::Button::new("⏷")).clicked() {
                    app.editor.move_layer(index, index + 1);
                }
                if ui.add_enabled(index > 0, egui::Button::new("⏶")).clicked() {
                    app.editor.move_layer(index, index - 1);
                }
            });
        });
    }
}

fn perspective_controls(app: &mut SketchApp, ui: &mut egui::Ui) {
    ui.heading("Perspective");
    let perspective = &mut app.editor.perspective;
    ui.horizontal(|ui| {
        if ui.button("1-Point").clicked() {
            perspective.start_setup(SetupType::OnePoint);
        }
        if ui.button("2-Point").clicked() {
            perspective.start_setup(SetupType::TwoPoint);
        }
        if ui.button("Clear").clicked() {
            perspective.clear();
        }
    });
    ui.checkbox(&mut perspective.show_guides, "Show guides");
    ui.add(egui::Slider::new(&mut perspective.line_count, 2..=24).text("Lines"));
    ui.add(egui::Slider::new(&mut perspective.spread, 0.5..=4.0).text("Spread"));
    ui.label(format!("Mode: {:?}", perspective.mode()));
}
