use eframe::egui::{self, Key};
use eframe::egui::text::{LayoutJob, TextFormat};

use crate::SketchApp;
use crate::input::InputEvent;
use crate::style::{FontStyle, TextAlign};

pub fn central_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            app.input.set_canvas_rect(rect);
            app.editor.viewport = rect.size();

            let events = app.input.process_input(ctx, !ctx.wants_keyboard_input());
            for event in &events {
                // Presses over floating windows or the text overlay belong to them
                let blocked = matches!(
                    event,
                    InputEvent::PointerDown { .. } | InputEvent::DoubleClick { .. } | InputEvent::Scroll { .. }
                ) && !response.hovered();
                if !blocked {
                    app.editor.handle_event(event);
                }
            }

            app.renderer.render(ctx, &painter, rect, &app.editor);
            text_overlay(app, ctx, rect);

            if let Some(hover) = response.hover_pos() {
                ctx.set_cursor_icon(app.editor.cursor_at(hover - rect.min.to_vec2()));
            }
        });
}

fn overlay_font_id(font: &FontStyle, scale: f32) -> egui::FontId {
    let size = (font.font_size * scale).max(6.0);
    match font.font_family.as_str() {
        "Courier New" => egui::FontId::monospace(size),
        _ => egui::FontId::proportional(size),
    }
}

fn overlay_align(align: TextAlign) -> egui::Align {
    match align {
        TextAlign::Left => egui::Align::LEFT,
        TextAlign::Center => egui::Align::Center,
        TextAlign::Right => egui::Align::RIGHT,
    }
}

/// Inline editor laid over the text shape being edited, in the shape's own
/// font, color and alignment
fn text_overlay(app: &mut SketchApp, ctx: &egui::Context, canvas: egui::Rect) {
    let Some(overlay) = app.editor.text_edit_overlay() else {
        app.text_focus = None;
        return;
    };
    let id = overlay.shape;
    let rect = overlay.rect.translate(canvas.min.to_vec2());
    let font_id = overlay_font_id(&overlay.font, overlay.scale);
    let align = overlay_align(overlay.font.text_align);
    let (color, italics, bold) = (overlay.color, overlay.font.italic, overlay.font.bold);

    let mut layouter = |ui: &egui::Ui, text: &str, wrap_width: f32| {
        let format = TextFormat {
            font_id: font_id.clone(),
            color,
            italics,
            ..Default::default()
        };
        let mut job = LayoutJob::single_section(text.to_owned(), format);
        job.wrap.max_width = wrap_width;
        job.halign = align;
        ui.fonts(|fonts| fonts.layout_job(job))
    };

    let mut commit = false;
    let mut cancel = false;
    egui::Area::new(egui::Id::new(("text_overlay", id.0)))
        .fixed_pos(rect.min)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            let Some(buffer) = app.editor.text_edit_buffer_mut() else {
                return;
            };
            let output = egui::TextEdit::multiline(buffer)
                .frame(false)
                .margin(egui::Margin::ZERO)
                .horizontal_align(align)
                .desired_rows(1)
                .desired_width(rect.width())
                .min_size(rect.size())
                .layouter(&mut layouter)
                .show(ui);
            if bold {
                // Second pass one pixel over, like committed bold text
                ui.painter()
                    .galley(output.galley_pos + egui::vec2(1.0, 0.0), output.galley.clone(), color);
            }

            let response = output.response;
            if app.text_focus != Some(id) {
                response.request_focus();
                app.text_focus = Some(id);
            }
            if response.lost_focus() {
                if ui.input(|input| input.key_pressed(Key::Escape)) {
                    cancel = true;
                } else {
                    commit = true;
                }
            }
        });

    if cancel {
        app.editor.cancel_text_edit();
    } else if commit {
        app.editor.commit_text_edit();
    }
    if cancel || commit {
        app.text_focus = None;
    }
}
