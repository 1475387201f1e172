use eframe::egui;

use crate::SketchApp;
use crate::components::ComparisonSlider;
use crate::export::MAX_HISTORY_IMAGES;

pub fn prompt_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::SidePanel::right("prompt_panel")
        .resizable(true)
        .default_width(300.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                prompt_editor(app, ui);
                ui.separator();
                prompt_ideas(app, ui);
                ui.separator();
                saved_prompts(app, ui);
                ui.separator();
                result_view(app, ctx, ui);
                ui.separator();
                history_list(app, ui);
            });
        });
}

fn prompt_editor(app: &mut SketchApp, ui: &mut egui::Ui) {
    ui.heading("Prompt");
    ui.add(
        egui::TextEdit::multiline(&mut app.prompt)
            .hint_text("Describe the render you want…")
            .desired_rows(4)
            .desired_width(f32::INFINITY),
    );
    grammar_suggestion(app, ui);
    ui.horizontal(|ui| {
        let generating = app.is_generating();
        if ui.add_enabled(!generating, egui::Button::new("✨ Generate")).clicked() {
            app.start_generation();
        }
        if generating {
            ui.spinner();
        }
        if ui.button("Save prompt").clicked() {
            app.save_current_prompt();
        }
    });
}

fn grammar_suggestion(app: &mut SketchApp, ui: &mut egui::Ui) {
    let Some(suggestion) = app.prompt_assist.suggestion().map(str::to_owned) else {
        return;
    };
    let mut accept = false;
    let mut dismiss = false;
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.weak("Did you mean:");
        ui.label(&suggestion);
        ui.horizontal(|ui| {
            accept = ui.small_button("Accept").clicked();
            dismiss = ui.small_button("Dismiss").clicked();
        });
    });
    if accept {
        app.accept_grammar_suggestion();
    } else if dismiss {
        app.prompt_assist.dismiss_suggestion();
    }
}

fn prompt_ideas(app: &mut SketchApp, ui: &mut egui::Ui) {
    let mut use_variation = None;
    egui::CollapsingHeader::new("Prompt ideas").show(ui, |ui| {
        ui.add(
            egui::TextEdit::singleline(&mut app.prompt_assist.core_idea)
                .hint_text("Core idea, e.g. a reading nook")
                .desired_width(f32::INFINITY),
        );
        ui.horizontal(|ui| {
            let fetching = app.prompt_assist.is_fetching_variations();
            if ui.add_enabled(!fetching, egui::Button::new("💡 Generate ideas")).clicked() {
                app.generate_variations();
            }
            if fetching {
                ui.spinner();
            }
        });
        if let Some(message) = app.prompt_assist.variations_message() {
            ui.weak(message);
        }
        for variation in app.prompt_assist.variations() {
            ui.horizontal_wrapped(|ui| {
                if ui.small_button("Use").clicked() {
                    use_variation = Some(variation.clone());
                }
                ui.label(variation);
            });
        }
    });
    if let Some(variation) = use_variation {
        app.prompt = variation;
    }
}

fn saved_prompts(app: &mut SketchApp, ui: &mut egui::Ui) {
    let mut use_prompt = None;
    let mut delete = None;
    egui::CollapsingHeader::new(format!("Saved prompts ({})", app.saved_prompts.prompts().len())).show(ui, |ui| {
        if app.saved_prompts.is_empty() {
            ui.weak("No saved prompts yet.");
        }
        for (index, prompt) in app.saved_prompts.prompts().iter().enumerate() {
            ui.horizontal(|ui| {
                if ui.small_button("Use").clicked() {
                    use_prompt = Some(prompt.clone());
                }
                if ui.small_button("🗑").clicked() {
                    delete = Some(index);
                }
                ui.label(prompt);
            });
        }
        if ui
            .add_enabled(!app.saved_prompts.is_empty(), egui::Button::new("Download prompts…"))
            .clicked()
        {
            app.download_prompts();
        }
    });
    if let Some(prompt) = use_prompt {
        app.prompt = prompt;
    }
    if let Some(index) = delete {
        app.delete_saved_prompt(index);
    }
}

fn result_view(app: &mut SketchApp, ctx: &egui::Context, ui: &mut egui::Ui) {
    ui.heading("Result");
    let width = ui.available_width();
    let mut split = app.comparison_split;
    if let Some((before, after)) = app.comparison_textures(ctx) {
        ComparisonSlider::new(before, after, &mut split)
            .show(ui, width)
            .on_hover_text("Drag to compare the sketch with the result");
        app.comparison_split = split;
    } else if let Some(texture) = app.result_texture(ctx) {
        let size = texture.size_vec2();
        let width = ui.available_width().min(size.x);
        let scaled = size * (width / size.x.max(1.0));
        ui.image((texture.id(), scaled));
    } else if app.is_generating() {
        ui.label("Generating…");
    } else {
        ui.weak("Generated images appear here.");
    }

    ui.horizontal(|ui| {
        if ui.add_enabled(app.outputs.sketch().is_some(), egui::Button::new("Sketch PNG")).clicked() {
            app.download_sketch();
        }
        let has_result = app.outputs.generated().is_some();
        if ui.add_enabled(has_result, egui::Button::new("Image PNG")).clicked() {
            app.download_generated();
        }
        let caption = if app.outputs.show_prompt { "Hide prompt" } else { "Show prompt" };
        if ui.add_enabled(has_result, egui::Button::new(caption)).clicked() {
            app.toggle_caption();
        }
    });
}

fn history_list(app: &mut SketchApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.heading(format!("History {}/{}", app.image_history.len(), MAX_HISTORY_IMAGES));
        if ui
            .add_enabled(!app.image_history.is_empty(), egui::Button::new("Download zip…"))
            .clicked()
        {
            app.download_history();
        }
    });
    for entry in app.image_history.entries() {
        ui.label(format!("• {}", entry.prompt));
    }
}
