//! The interaction controller: owns the document, history, view and tool
//! state, and turns input events into document edits.

mod actions;
mod layers;
mod pointer;

use egui::{Color32, Key, Modifiers, Pos2, Rect, Vec2, pos2, vec2};

use crate::compositor::{self, Preview};
use crate::document::Document;
use crate::history::History;
use crate::input::InputEvent;
use crate::perspective::Perspective;
use crate::raster::Surface;
use crate::shape::{Shape, ShapeId};
use crate::snap::SnapSettings;
use crate::style::FontStyle;
use crate::state::Gesture;
use crate::text::FontBook;
use crate::tool::{ToolKind, ToolSettings};
use crate::tool_options::{PanelConfig, options_for};
use crate::view::{KEYBOARD_ZOOM_FACTOR, ViewTransform, WHEEL_ZOOM_FACTOR};

pub use pointer::MIN_SHAPE_DRAG;

/// Screen-pixel offset applied to pasted shapes
pub const PASTE_OFFSET: f32 = 20.0;

/// Open inline text editor bound to one text shape
#[derive(Debug, Clone, PartialEq)]
pub struct TextEdit {
    pub shape: ShapeId,
    pub buffer: String,
}

/// Where and how to draw the inline text field so it lines up with the
/// shape it replaces. `rect` is in canvas screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    pub shape: ShapeId,
    pub rect: Rect,
    pub font: FontStyle,
    pub color: Color32,
    /// View zoom; font sizes in `font` are world units
    pub scale: f32,
}

pub struct Editor {
    pub doc: Document,
    pub perspective: Perspective,
    pub view: ViewTransform,
    pub snap: SnapSettings,
    pub settings: ToolSettings,
    /// Size of the canvas viewport in screen pixels
    pub viewport: Vec2,
    history: History,
    tool: ToolKind,
    selection: Option<ShapeId>,
    clipboard: Option<Shape>,
    gesture: Gesture,
    text_edit: Option<TextEdit>,
    space_down: bool,
    shift_down: bool,
    fonts: FontBook,
    revision: u64,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("tool", &self.tool)
            .field("selection", &self.selection)
            .field("gesture", &self.gesture.label())
            .field("layers", &self.doc.layers.len())
            .field("shapes", &self.doc.shapes().len())
            .field("history", &self.history.len())
            .finish()
    }
}

impl Editor {
    /// A fresh editor with one empty layer and a single history entry
    pub fn new(width: u32, height: u32) -> Self {
        let mut editor = Self {
            doc: Document::new(width, height),
            perspective: Perspective::default(),
            view: ViewTransform::default(),
            snap: SnapSettings::default(),
            settings: ToolSettings::default(),
            viewport: vec2(width as f32, height as f32),
            history: History::new(),
            tool: ToolKind::Sketch,
            selection: None,
            clipboard: None,
            gesture: Gesture::Idle,
            text_edit: None,
            space_down: false,
            shift_down: false,
            fonts: FontBook::new(),
            revision: 0,
        };
        editor.record();
        editor
    }

    pub fn with_fonts(mut self, fonts: FontBook) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn selection(&self) -> Option<ShapeId> {
        self.selection
    }

    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selection.and_then(|id| self.doc.shape(id))
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clipboard(&self) -> Option<&Shape> {
        self.clipboard.as_ref()
    }

    pub fn is_space_down(&self) -> bool {
        self.space_down
    }

    /// Changes whenever anything visible on the canvas may have changed
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn mark_changed(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Pushes the current document state onto the undo stack
    fn record(&mut self) {
        self.history.push(self.doc.snapshot());
        self.mark_changed();
    }

    /// Drops a selection whose shape no longer exists
    fn prune_selection(&mut self) {
        if self
            .selection
            .is_some_and(|id| self.doc.shape(id).is_none())
        {
            self.selection = None;
        }
        if self
            .text_edit
            .as_ref()
            .is_some_and(|edit| self.doc.shape(edit.shape).is_none())
        {
            self.text_edit = None;
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restores the previous snapshot; no-op at the start of history
    pub fn undo(&mut self) -> bool {
        self.text_edit = None;
        let Some(state) = self.history.undo() else {
            return false;
        };
        self.doc.restore(state);
        self.prune_selection();
        self.mark_changed();
        log::debug!("Undo to history entry {}", self.history.cursor());
        true
    }

    /// Re-applies the next snapshot; no-op at the end of history
    pub fn redo(&mut self) -> bool {
        self.text_edit = None;
        let Some(state) = self.history.redo() else {
            return false;
        };
        self.doc.restore(state);
        self.prune_selection();
        self.mark_changed();
        log::debug!("Redo to history entry {}", self.history.cursor());
        true
    }

    /// Switches tools. Any tool other than select drops the selection; the
    /// text editor is committed and an unfinished shape drag is abandoned.
    pub fn select_tool(&mut self, tool: ToolKind) {
        if tool != ToolKind::Select {
            self.selection = None;
        }
        self.commit_text_edit();
        if self.gesture.is_drawing_shape() {
            self.gesture = Gesture::Idle;
        }
        if self.tool != tool {
            log::info!("Tool: {}", tool.name());
        }
        self.tool = tool;
        self.mark_changed();
    }

    fn viewport_center(&self) -> Pos2 {
        pos2(self.viewport.x / 2.0, self.viewport.y / 2.0)
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_by(KEYBOARD_ZOOM_FACTOR, self.viewport_center());
        self.mark_changed();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_by(1.0 / KEYBOARD_ZOOM_FACTOR, self.viewport_center());
        self.mark_changed();
    }

    pub fn reset_view(&mut self) {
        self.view.reset();
        self.mark_changed();
    }

    /// Wheel zoom about the cursor
    pub fn scroll_zoom(&mut self, screen: Pos2, delta: f32) {
        let factor = if delta > 0.0 {
            WHEEL_ZOOM_FACTOR
        } else {
            1.0 / WHEEL_ZOOM_FACTOR
        };
        self.view.zoom_by(factor, screen);
        self.mark_changed();
    }

    /// Feeds one input event through the controller
    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerDown {
                location,
                button: egui::PointerButton::Primary,
                modifiers,
            } if location.is_in_canvas => self.pointer_down(location.position, *modifiers),
            InputEvent::PointerMove { location, modifiers } => self.pointer_move(location.position, *modifiers),
            InputEvent::PointerUp {
                location,
                button: egui::PointerButton::Primary,
                modifiers,
            } => self.pointer_up(location.position, *modifiers),
            InputEvent::DoubleClick { location } if location.is_in_canvas => self.double_click(location.position),
            InputEvent::Scroll { location, delta } if location.is_in_canvas => {
                self.scroll_zoom(location.position, *delta)
            }
            InputEvent::PointerLeave { last_known_location } => {
                self.pointer_up(last_known_location.position, Modifiers::NONE)
            }
            InputEvent::KeyDown { key, modifiers } => self.key_down(*key, *modifiers),
            InputEvent::KeyUp { key, modifiers } => self.key_up(*key, *modifiers),
            _ => {}
        }
    }

    fn key_up(&mut self, key: Key, modifiers: Modifiers) {
        self.shift_down = modifiers.shift;
        if key == Key::Space {
            self.space_down = false;
        }
    }

    /// Keyboard shortcuts; ignored entirely while the text editor is open
    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) {
        self.shift_down = modifiers.shift;
        if self.text_edit.is_some() {
            return;
        }

        if modifiers.command || modifiers.ctrl {
            match key {
                Key::Z if modifiers.shift => {
                    self.redo();
                }
                Key::Z => {
                    self.undo();
                }
                Key::Y => {
                    self.redo();
                }
                Key::C => {
                    self.copy();
                }
                Key::V => {
                    self.paste();
                }
                Key::Plus | Key::Equals => self.zoom_in(),
                Key::Minus => self.zoom_out(),
                Key::Num0 => self.reset_view(),
                _ => {}
            }
            return;
        }

        if let Some(tool) = ToolKind::from_shortcut(key) {
            self.select_tool(tool);
            return;
        }

        match key {
            Key::Space => self.space_down = true,
            Key::Delete | Key::Backspace => {
                self.delete_selected();
            }
            Key::Escape => {
                if self.perspective.cancel_setup() {
                    self.mark_changed();
                } else if self.gesture.is_drawing_shape() {
                    self.gesture = Gesture::Idle;
                    self.mark_changed();
                }
            }
            _ => {}
        }
    }

    /// Shape being drawn or line being dragged, for the live preview
    pub fn preview(&self) -> Option<Preview> {
        match &self.gesture {
            Gesture::Line { start, current } => Some(Preview::Line {
                start: *start,
                end: *current,
                color: self.settings.brush_color,
                width: self.settings.brush_size,
                dashed: self.settings.line_style.is_dashed(),
            }),
            Gesture::Shape { tool, start, current } => {
                let shape = self.build_shape(*tool, ShapeId(u32::MAX), *start, *current)?;
                let dashed = *tool != ToolKind::Curve && self.settings.line_style.is_dashed();
                Some(Preview::Shape { shape, dashed })
            }
            _ => None,
        }
    }

    /// Option groups for the tool panel
    pub fn panel_config(&self) -> PanelConfig {
        options_for(self.selected_shape(), self.tool, &self.settings)
    }

    /// Current composition of the canvas in document space
    pub fn compose(&self) -> Surface {
        let hidden = self.text_edit.as_ref().map(|edit| edit.shape);
        compositor::compose_scene(&self.doc, &self.fonts, hidden, self.preview().as_ref())
    }
}
