use eframe::egui::{self, Color32, color_picker::Alpha};

use crate::SketchApp;
use crate::components::ToolButton;
use crate::shape::FlipAxis;
use crate::style::{FillKind, TextAlign};
use crate::tool::{LineStyle, ToolKind};

const FONT_FAMILIES: [&str; 5] = ["Roboto", "Arial", "Georgia", "Courier New", "Verdana"];

fn color_button(ui: &mut egui::Ui, label: &str, color: Color32) -> Option<Color32> {
    let mut edited = color;
    ui.horizontal(|ui| {
        ui.label(label);
        egui::color_picker::color_edit_button_srgba(ui, &mut edited, Alpha::Opaque);
    });
    (edited != color).then_some(edited)
}

pub fn tools_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                tool_buttons(app, ui);
                ui.separator();
                tool_options(app, ui);
                ui.separator();
                view_and_snap(app, ui);
                ui.separator();
                document_actions(app, ui);
            });
        });
}

fn tool_buttons(app: &mut SketchApp, ui: &mut egui::Ui) {
    ui.heading("Tools");
    let active = app.editor.tool();
    ui.horizontal_wrapped(|ui| {
        for tool in ToolKind::ALL {
            if ToolButton::new(tool, active == tool).show(ui).clicked() {
                app.editor.select_tool(tool);
            }
        }
    });

    ui.horizontal(|ui| {
        if ui.add_enabled(app.editor.can_undo(), egui::Button::new("⟲ Undo")).clicked() {
            app.editor.undo();
        }
        if ui.add_enabled(app.editor.can_redo(), egui::Button::new("⟳ Redo")).clicked() {
            app.editor.redo();
        }
    });
}

fn tool_options(app: &mut SketchApp, ui: &mut egui::Ui) {
    let config = app.editor.panel_config();
    let values = &config.values;

    if config.brush {
        ui.strong("Stroke");
        if let Some(color) = color_button(ui, "Color", values.stroke_color) {
            app.editor.set_stroke_color(color);
        }
        let mut width = values.stroke_width;
        if ui.add(egui::Slider::new(&mut width, 1.0..=50.0).text("Size")).changed() {
            app.editor.set_stroke_width(width);
        }
    }

    if config.line_style {
        ui.horizontal(|ui| {
            ui.label("Line");
            let mut style = values.line_style;
            ui.selectable_value(&mut style, LineStyle::Solid, "Solid");
            ui.selectable_value(&mut style, LineStyle::Hidden, "Hidden");
            if style != values.line_style {
                app.editor.set_line_style(style);
            }
        });
    }

    if config.fill {
        ui.strong("Fill");
        let mut filled = values.filled;
        if ui.checkbox(&mut filled, "Filled").changed() {
            app.editor.set_fill_enabled(filled);
        }
        ui.horizontal(|ui| {
            for kind in FillKind::ALL {
                if ui.selectable_label(values.fill_kind == kind, kind.as_str()).clicked() && values.fill_kind != kind {
                    app.editor.set_fill_kind(kind);
                }
            }
        });
        if let Some(color) = color_button(ui, "Fill color", values.fill_color) {
            app.editor.set_fill_color(color);
        }
        if config.gradient_colors {
            if let Some(color) = color_button(ui, "Gradient from", values.gradient_color_1) {
                app.editor.set_gradient_color_1(color);
            }
            if let Some(color) = color_button(ui, "Gradient to", values.gradient_color_2) {
                app.editor.set_gradient_color_2(color);
            }
        }

        let names: Vec<String> = app.editor.doc.patterns().keys().cloned().collect();
        let selected = values.pattern_name.clone().unwrap_or_else(|| "None".to_string());
        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Pattern")
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    for name in &names {
                        if ui.selectable_label(values.pattern_name.as_ref() == Some(name), name).clicked() {
                            app.editor.set_pattern(name);
                        }
                    }
                });
            if ui.button("Upload…").clicked() {
                app.upload_pattern();
            }
        });
    }

    if config.text {
        ui.strong("Text");
        if !config.brush {
            if let Some(color) = color_button(ui, "Color", values.stroke_color) {
                app.editor.set_stroke_color(color);
            }
        }
        let font = &values.font;
        egui::ComboBox::from_label("Font")
            .selected_text(font.font_family.as_str())
            .show_ui(ui, |ui| {
                for family in FONT_FAMILIES {
                    if ui.selectable_label(font.font_family == family, family).clicked() {
                        app.editor.set_font_family(family);
                    }
                }
            });
        let mut size = font.font_size;
        if ui.add(egui::DragValue::new(&mut size).range(6.0..=200.0).prefix("Size ")).changed() {
            app.editor.set_font_size(size);
        }
        ui.horizontal(|ui| {
            if ui.selectable_label(font.bold, "B").clicked() {
                app.editor.set_bold(!font.bold);
            }
            if ui.selectable_label(font.italic, "I").clicked() {
                app.editor.set_italic(!font.italic);
            }
            for align in TextAlign::ALL {
                if ui.selectable_label(font.text_align == align, align.as_str()).clicked() {
                    app.editor.set_text_align(align);
                }
            }
        });
    }

    if config.shape_context {
        ui.strong("Shape");
        ui.horizontal(|ui| {
            if ui.button("⇔ Flip H").clicked() {
                app.editor.flip_selected(FlipAxis::Horizontal);
            }
            if ui.button("⇕ Flip V").clicked() {
                app.editor.flip_selected(FlipAxis::Vertical);
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Copy").clicked() {
                app.editor.copy();
            }
            if ui.add_enabled(app.editor.clipboard().is_some(), egui::Button::new("Paste")).clicked() {
                app.editor.paste();
            }
            if ui.button("🗑 Delete").clicked() {
                app.editor.delete_selected();
            }
        });
    }
}

fn view_and_snap(app: &mut SketchApp, ui: &mut egui::Ui) {
    ui.strong("View");
    ui.horizontal(|ui| {
        if ui.button("−").clicked() {
            app.editor.zoom_out();
        }
        ui.label(format!("{:.0}%", app.editor.view.scale * 100.0));
        if ui.button("+").clicked() {
            app.editor.zoom_in();
        }
        if ui.button("Reset").clicked() {
            app.editor.reset_view();
        }
    });
    ui.checkbox(&mut app.editor.snap.to_grid, "Snap to grid");
    ui.checkbox(&mut app.editor.snap.to_objects, "Snap to objects");
}

fn document_actions(app: &mut SketchApp, ui: &mut egui::Ui) {
    ui.strong("Document");
    if ui.button("Import image…").clicked() {
        app.import_image();
    }
    if ui.button("Commit shapes").clicked() {
        app.editor.commit_all_shapes();
    }
    if ui.button("Clear layer").clicked() {
        app.editor.clear_sketch();
    }
    if ui.button("Clear all").clicked() {
        app.clear_all();
    }
    ui.horizontal(|ui| {
        if ui.button("Open session…").clicked() {
            app.open_session();
        }
        if ui.button("Save session…").clicked() {
            app.save_session();
        }
    });
    if ui.button("Save settings as default").clicked() {
        app.save_settings();
    }
}
