use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::egui::{self, Key, KeyboardShortcut, Modifiers, TextureHandle, TextureOptions};

use crate::caption::caption_image;
use crate::config::AppConfig;
use crate::editor::Editor;
use crate::export::{GenerationOutputs, HISTORY_ZIP_NAME, HistoryEntry, ImageHistory, export_history};
use crate::generation::{GeminiClient, GenerationRequest, GenerationTask};
use crate::input::InputHandler;
use crate::layer::LayerId;
use crate::panels::{central_panel, layers_panel, prompt_panel, status_bar, tools_panel};
use crate::prompt_assist::PromptAssist;
use crate::prompts::{SAVED_PROMPTS_DOWNLOAD, SavedPrompts};
use crate::renderer::Renderer;
use crate::session::{load_session_from_path, save_session_to_path, session_file_name};
use crate::shape::ShapeId;
use crate::text::FontBook;

const PROMPT_STORAGE_KEY: &str = "prompt";
const SAVE_SHORTCUT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::S);
const OPEN_SHORTCUT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::O);
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "bmp", "gif"];

/// A generation in flight, with the prompt it was started for
struct PendingGeneration {
    task: GenerationTask,
    prompt: String,
}

pub struct SketchApp {
    pub(crate) config: AppConfig,
    pub(crate) editor: Editor,
    pub(crate) renderer: Renderer,
    pub(crate) input: InputHandler,
    pub(crate) prompt: String,
    pub(crate) saved_prompts: SavedPrompts,
    pub(crate) outputs: GenerationOutputs,
    pub(crate) image_history: ImageHistory,
    pub(crate) error: Option<String>,
    pub(crate) show_history_full: bool,
    /// Layer whose name is being edited and the edit buffer
    pub(crate) layer_rename: Option<(LayerId, String)>,
    /// Text shape the overlay editor last requested focus for
    pub(crate) text_focus: Option<ShapeId>,
    pub(crate) prompt_assist: PromptAssist,
    /// Divider of the sketch/result comparison, as a fraction of the width
    pub(crate) comparison_split: f32,
    pending: Option<PendingGeneration>,
    result_texture: Option<TextureHandle>,
    sketch_texture: Option<TextureHandle>,
    result_dirty: bool,
}

impl SketchApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = AppConfig::load_or_default();
        let mut editor = Editor::new(config.canvas_width, config.canvas_height).with_fonts(FontBook::from_egui_defaults());
        editor.snap.to_grid = config.snap_to_grid;
        editor.snap.to_objects = config.snap_to_objects;
        editor.perspective.line_count = config.perspective_line_count;
        editor.perspective.spread = config.perspective_spread;
        editor.perspective.show_guides = config.show_guides;

        let prompt = cc
            .storage
            .and_then(|storage| eframe::get_value::<String>(storage, PROMPT_STORAGE_KEY))
            .unwrap_or_default();

        Self {
            config,
            editor,
            renderer: Renderer::new(cc),
            input: InputHandler::new(),
            prompt,
            saved_prompts: SavedPrompts::load_default(),
            outputs: GenerationOutputs::default(),
            image_history: ImageHistory::new(),
            error: None,
            show_history_full: false,
            layer_rename: None,
            text_focus: None,
            prompt_assist: PromptAssist::default(),
            comparison_split: 0.5,
            pending: None,
            result_texture: None,
            sketch_texture: None,
            result_dirty: false,
        }
    }

    pub fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{message}");
        self.error = Some(message);
    }

    /// Flattens the sketch and sends it off with the prompt on a worker thread
    pub(crate) fn start_generation(&mut self) {
        if self.pending.is_some() {
            return;
        }
        self.error = None;
        let composite = self.editor.flatten_for_export().into_image();
        let request = match GenerationRequest::new(&self.prompt, &composite) {
            Ok(request) => request,
            Err(err) => return self.set_error(err.to_string()),
        };
        let client = match GeminiClient::from_config(&self.config) {
            Ok(client) => client,
            Err(err) => return self.set_error(format!("Generation Failed: {err}")),
        };
        self.outputs.set_sketch(composite);
        let prompt = request.prompt.clone();
        self.pending = Some(PendingGeneration {
            task: GenerationTask::spawn(client, request),
            prompt,
        });
    }

    fn poll_generation(&mut self, ctx: &egui::Context) {
        let Some(pending) = &mut self.pending else {
            return;
        };
        let Some(result) = pending.task.poll() else {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
            return;
        };
        let prompt = std::mem::take(&mut pending.prompt);
        self.pending = None;

        match result {
            Ok(generated) => {
                self.prompt_assist.settle(&prompt);
                self.comparison_split = 0.5;
                let captioned = caption_image(&generated.image, &prompt, self.editor.fonts());
                let entry = HistoryEntry {
                    original: generated.image,
                    captioned,
                    prompt,
                };
                self.outputs.set_generated(entry.clone());
                self.result_dirty = true;
                if !self.image_history.add(entry) {
                    self.show_history_full = true;
                }
            }
            Err(err) => {
                self.outputs.clear_generated();
                self.result_dirty = true;
                self.set_error(format!("Generation Failed: {err}"));
            }
        }
    }

    /// Ideas for the core idea, fetched on a worker thread
    pub(crate) fn generate_variations(&mut self) {
        match GeminiClient::from_config(&self.config) {
            Ok(client) => {
                self.prompt_assist.request_variations(client);
            }
            Err(err) => self.prompt_assist.variations_failed(err.to_string()),
        }
    }

    /// Feeds prompt edits to the grammar check and collects finished helpers
    fn poll_assist(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.prompt_assist.prompt_edited(&self.prompt, now);
        if let Some(prompt) = self.prompt_assist.take_due_check(now) {
            match GeminiClient::from_config(&self.config) {
                Ok(client) => self.prompt_assist.start_grammar_check(client, prompt),
                Err(err) => log::debug!("Skipping grammar check: {err}"),
            }
        }
        if self.prompt_assist.poll() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        if let Some(delay) = self.prompt_assist.check_delay(now) {
            ctx.request_repaint_after(delay);
        }
    }

    pub(crate) fn accept_grammar_suggestion(&mut self) {
        if let Some(prompt) = self.prompt_assist.accept_suggestion() {
            self.prompt = prompt;
        }
    }

    fn refresh_textures(&mut self, ctx: &egui::Context) {
        if !self.result_dirty {
            return;
        }
        self.result_dirty = false;
        let load = |name: &str, image: &image::RgbaImage| {
            let size = [image.width() as usize, image.height() as usize];
            let color = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
            ctx.load_texture(name, color, TextureOptions::LINEAR)
        };
        self.result_texture = self.outputs.displayed().map(|image| load("generated", image));
        self.sketch_texture = self.outputs.sketch().map(|image| load("sketch", image));
    }

    /// Texture of the generated image as currently displayed
    pub(crate) fn result_texture(&mut self, ctx: &egui::Context) -> Option<&TextureHandle> {
        self.refresh_textures(ctx);
        self.result_texture.as_ref()
    }

    /// Sketch and displayed result, once both exist
    pub(crate) fn comparison_textures(&mut self, ctx: &egui::Context) -> Option<(&TextureHandle, &TextureHandle)> {
        self.refresh_textures(ctx);
        Some((self.sketch_texture.as_ref()?, self.result_texture.as_ref()?))
    }

    pub(crate) fn toggle_caption(&mut self) {
        self.outputs.show_prompt = !self.outputs.show_prompt;
        self.result_dirty = true;
    }

    fn save_dialog(name: &str) -> Option<PathBuf> {
        rfd::FileDialog::new().set_file_name(name).save_file()
    }

    fn write_download(&mut self, name: &str, bytes: &[u8]) {
        let Some(path) = Self::save_dialog(name) else {
            return;
        };
        match std::fs::write(&path, bytes) {
            Ok(()) => log::info!("Wrote {}", path.display()),
            Err(err) => self.set_error(format!("Could not write {}: {err}", path.display())),
        }
    }

    pub(crate) fn save_session(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Session", &["json"])
            .set_file_name(session_file_name())
            .save_file()
        else {
            return;
        };
        if let Err(err) = save_session_to_path(&self.editor, &self.prompt, &path) {
            log::error!("Failed to save session: {err}");
            self.set_error("Could not save the session file.");
        }
    }

    pub(crate) fn open_session(&mut self) {
        let Some(path) = rfd::FileDialog::new().add_filter("Session", &["json"]).pick_file() else {
            return;
        };
        match load_session_from_path(&mut self.editor, &path) {
            Ok(prompt) => {
                self.prompt = prompt;
                self.error = None;
            }
            Err(err) => self.set_error(format!("Failed to load session: {err}")),
        }
    }

    fn pick_image() -> Option<PathBuf> {
        rfd::FileDialog::new().add_filter("Image", &IMAGE_EXTENSIONS).pick_file()
    }

    pub(crate) fn import_image(&mut self) {
        let Some(path) = Self::pick_image() else {
            return;
        };
        match image::open(&path) {
            Ok(image) => self.editor.import_background(image.to_rgba8()),
            Err(err) => self.set_error(format!("Could not open {}: {err}", path.display())),
        }
    }

    pub(crate) fn upload_pattern(&mut self) {
        let Some(path) = Self::pick_image() else {
            return;
        };
        match image::open(&path) {
            Ok(image) => {
                self.editor.upload_pattern(image.to_rgba8());
            }
            Err(err) => self.set_error(format!("Could not open pattern {}: {err}", path.display())),
        }
    }

    pub(crate) fn download_sketch(&mut self) {
        match self.outputs.sketch_download() {
            Ok((name, bytes)) => self.write_download(&name, &bytes),
            Err(err) => self.set_error(err.to_string()),
        }
    }

    pub(crate) fn download_generated(&mut self) {
        match self.outputs.generated_download() {
            Ok((name, bytes)) => self.write_download(&name, &bytes),
            Err(err) => self.set_error(err.to_string()),
        }
    }

    pub(crate) fn download_history(&mut self) {
        if self.image_history.is_empty() {
            return;
        }
        let Some(dir) = rfd::FileDialog::new()
            .set_title(format!("Choose where to save {HISTORY_ZIP_NAME}"))
            .pick_folder()
        else {
            return;
        };
        match export_history(&mut self.image_history, &dir) {
            Ok(_) => self.show_history_full = false,
            Err(err) => self.set_error(format!("Could not export history: {err}")),
        }
    }

    pub(crate) fn save_current_prompt(&mut self) {
        if self.saved_prompts.add(&self.prompt) {
            if let Err(err) = self.saved_prompts.persist() {
                log::warn!("Could not store saved prompts: {err}");
            }
        }
    }

    pub(crate) fn delete_saved_prompt(&mut self, index: usize) {
        if self.saved_prompts.remove(index).is_some() {
            if let Err(err) = self.saved_prompts.persist() {
                log::warn!("Could not store saved prompts: {err}");
            }
        }
    }

    pub(crate) fn download_prompts(&mut self) {
        match self.saved_prompts.to_text() {
            Some(text) => self.write_download(SAVED_PROMPTS_DOWNLOAD, text.as_bytes()),
            None => log::info!("No prompts to download."),
        }
    }

    /// Fresh document and no generated results; uploaded patterns survive
    pub(crate) fn clear_all(&mut self) {
        self.editor.clear_all();
        self.image_history.clear();
        self.outputs.clear();
        self.result_dirty = true;
        self.show_history_full = false;
        self.error = None;
        self.renderer.invalidate();
    }

    /// Stores the current snap and guide settings as the defaults
    pub(crate) fn save_settings(&mut self) {
        self.config.snap_to_grid = self.editor.snap.to_grid;
        self.config.snap_to_objects = self.editor.snap.to_objects;
        self.config.perspective_line_count = self.editor.perspective.line_count;
        self.config.perspective_spread = self.editor.perspective.spread;
        self.config.show_guides = self.editor.perspective.show_guides;
        if let Err(err) = self.config.save() {
            self.set_error(format!("Could not save settings: {err}"));
        }
    }

    fn handle_app_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input_mut(|input| input.consume_shortcut(&SAVE_SHORTCUT)) {
            self.save_session();
        }
        if ctx.input_mut(|input| input.consume_shortcut(&OPEN_SHORTCUT)) {
            self.open_session();
        }
    }
}

impl eframe::App for SketchApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, PROMPT_STORAGE_KEY, &self.prompt);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_generation(ctx);
        self.poll_assist(ctx);
        self.handle_app_shortcuts(ctx);

        status_bar(self, ctx);
        tools_panel(self, ctx);
        layers_panel(self, ctx);
        prompt_panel(self, ctx);
        central_panel(self, ctx);

        if self.show_history_full {
            egui::Window::new("History full")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label("The image history is full. Download it as a zip to make room for new images.");
                    ui.horizontal(|ui| {
                        if ui.button("Download history").clicked() {
                            self.download_history();
                        }
                        if ui.button("Later").clicked() {
                            self.show_history_full = false;
                        }
                    });
                });
        }
    }
}
