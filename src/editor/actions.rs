use egui::{Color32, Rect, Vec2, pos2, vec2};
use image::RgbaImage;

use super::{Editor, PASTE_OFFSET, TextEdit, TextOverlay};
use crate::compositor;
use crate::raster::Surface;
use crate::session::LoadedSession;
use crate::shape::{FlipAxis, Shape, ShapeId};
use crate::state::Gesture;
use crate::style::{FillKind, FontStyle, TextAlign};
use crate::tool::LineStyle;
use crate::util::time::timestamp_millis;

/// Largest canvas with the image's aspect ratio that fits the viewport
pub fn fit_to_viewport(image_width: u32, image_height: u32, viewport: Vec2) -> (u32, u32) {
    if image_width == 0 || image_height == 0 || viewport.x <= 0.0 || viewport.y <= 0.0 {
        return (image_width.max(1), image_height.max(1));
    }
    let image_aspect = image_width as f32 / image_height as f32;
    let viewport_aspect = viewport.x / viewport.y;
    let (width, height) = if image_aspect > viewport_aspect {
        (viewport.x, viewport.x / image_aspect)
    } else {
        (viewport.y * image_aspect, viewport.y)
    };
    ((width.floor() as u32).max(1), (height.floor() as u32).max(1))
}

impl Editor {
    pub fn text_edit(&self) -> Option<&TextEdit> {
        self.text_edit.as_ref()
    }

    /// Buffer of the open text editor, for binding to a text field.
    /// The shape is hidden while edited, so typing never changes the canvas.
    pub fn text_edit_buffer_mut(&mut self) -> Option<&mut String> {
        self.text_edit.as_mut().map(|edit| &mut edit.buffer)
    }

    /// Placement of the inline text field: the measured box of the live
    /// buffer, aligned on the shape's anchor like the committed text
    pub fn text_edit_overlay(&self) -> Option<TextOverlay> {
        let edit = self.text_edit.as_ref()?;
        let shape = self.doc.shape(edit.shape)?;
        let anchor = *shape.points.first()?;
        let font = shape.text_content()?.font.clone();

        let measured = self.fonts.block_size(&edit.buffer, &font);
        let size = vec2(measured.x.max(font.font_size), measured.y.max(font.line_height()));
        let min = pos2(anchor.x + font.text_align.offset(size.x), anchor.y);
        let rect = Rect::from_min_max(
            self.view.world_to_screen(min),
            self.view.world_to_screen(min + size),
        );
        Some(TextOverlay {
            shape: edit.shape,
            rect,
            font,
            color: shape.style.stroke_color,
            scale: self.view.scale,
        })
    }

    /// Opens the inline editor on a text shape of the active layer
    pub fn begin_text_edit(&mut self, id: ShapeId) -> bool {
        let active = self.doc.layers.active_id();
        let Some(text) = self
            .doc
            .shape(id)
            .filter(|shape| Some(shape.layer_id) == active)
            .and_then(Shape::text_content)
            .map(|content| content.text.clone())
        else {
            return false;
        };
        self.commit_text_edit();
        self.text_edit = Some(TextEdit { shape: id, buffer: text });
        self.mark_changed();
        true
    }

    /// Closes the editor, writing the buffer back; snapshots only on change
    pub fn commit_text_edit(&mut self) -> bool {
        let Some(edit) = self.text_edit.take() else {
            return false;
        };
        self.mark_changed();
        let Some(content) = self
            .doc
            .shape_mut(edit.shape)
            .and_then(Shape::text_content_mut)
        else {
            return false;
        };
        if content.text == edit.buffer {
            return false;
        }
        content.text = edit.buffer;
        self.record();
        true
    }

    /// Closes the editor, discarding the buffer
    pub fn cancel_text_edit(&mut self) {
        if self.text_edit.take().is_some() {
            self.mark_changed();
        }
    }

    /// Remembers a structural copy of the selected shape
    pub fn copy(&mut self) -> bool {
        match self.selected_shape().cloned() {
            Some(shape) => {
                self.clipboard = Some(shape);
                true
            }
            None => false,
        }
    }

    /// Pastes the clipboard onto the active layer under a fresh id, offset
    /// from the original, and selects it
    pub fn paste(&mut self) -> Option<ShapeId> {
        let mut shape = self.clipboard.clone()?;
        let layer = self.doc.layers.active_id()?;
        let offset = PASTE_OFFSET / self.view.scale;
        shape.id = self.doc.next_shape_id();
        shape.layer_id = layer;
        shape.translate(vec2(offset, offset));
        let id = shape.id;
        if !self.doc.add_shape(shape) {
            return None;
        }
        self.selection = Some(id);
        self.record();
        Some(id)
    }

    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection.take() else {
            return false;
        };
        self.text_edit = None;
        if self.doc.remove_shape(id).is_none() {
            return false;
        }
        log::debug!("Deleted {id}");
        self.record();
        true
    }

    /// Mirrors the selected shape; text shapes are left untouched
    pub fn flip_selected(&mut self, axis: FlipAxis) -> bool {
        let Some(shape) = self.selection.and_then(|id| self.doc.shape_mut(id)) else {
            return false;
        };
        if !shape.flip(axis) {
            return false;
        }
        self.record();
        true
    }

    /// Rasterizes every shape into its layer and clears the selection.
    /// Returns the number of shapes committed.
    pub fn commit_all_shapes(&mut self) -> usize {
        self.commit_text_edit();
        if self.doc.shapes().is_empty() {
            return 0;
        }
        self.selection = None;
        let committed = self.doc.commit_all_shapes(&self.fonts);
        if committed > 0 {
            self.record();
        }
        committed
    }

    /// Commits shapes, then flattens background and visible layers over white
    pub fn flatten_for_export(&mut self) -> Surface {
        self.commit_all_shapes();
        compositor::compose_flattened(&self.doc)
    }

    /// Clears the active layer's pixels and shapes
    pub fn clear_sketch(&mut self) -> bool {
        let Some(active) = self.doc.layers.active_id() else {
            return false;
        };
        self.text_edit = None;
        self.doc.clear_layer(active);
        self.prune_selection();
        self.record();
        true
    }

    /// Back to a blank single-layer document with fresh history. Patterns
    /// are kept.
    pub fn clear_all(&mut self) {
        self.doc.reset();
        self.selection = None;
        self.text_edit = None;
        self.gesture = Gesture::Idle;
        self.perspective.clear();
        self.view.reset();
        self.history.clear();
        self.record();
        log::info!("Cleared document");
    }

    /// Uses `image` as the background, resizing the canvas to its aspect
    /// ratio within the viewport. Layer pixels are kept, not rescaled.
    pub fn import_background(&mut self, image: RgbaImage) {
        let (width, height) = fit_to_viewport(image.width(), image.height(), self.viewport);
        self.doc.resize(width, height);
        self.doc.set_background(Some(image));
        self.record();
        log::info!("Imported background, canvas now {width}x{height}");
    }

    /// Replaces the document with a decoded session and snapshots it.
    /// Perspective guides and undo history carry over. Returns the prompt.
    pub fn install_session(&mut self, session: LoadedSession) -> String {
        self.selection = None;
        self.text_edit = None;
        self.gesture = Gesture::Idle;
        self.doc.install(session.layers, session.shapes);
        self.doc.set_background(session.background);
        self.doc.replace_patterns(session.patterns);
        self.view.reset();
        self.record();
        log::info!(
            "Installed session: {}x{}, {} layer(s), {} shape(s)",
            self.doc.width(),
            self.doc.height(),
            self.doc.layers.len(),
            self.doc.shapes().len()
        );
        session.prompt
    }

    /// Applies `change` to the selected shape and snapshots if it reports a change
    fn update_selected(&mut self, change: impl FnOnce(&mut Shape) -> bool) -> bool {
        let Some(shape) = self.selection.and_then(|id| self.doc.shape_mut(id)) else {
            return false;
        };
        if !change(shape) {
            return false;
        }
        self.record();
        true
    }

    fn update_selected_text(&mut self, change: impl FnOnce(&mut FontStyle)) -> bool {
        self.update_selected(|shape| match shape.text_content_mut() {
            Some(content) => {
                let before = content.font.clone();
                change(&mut content.font);
                content.font != before
            }
            None => false,
        })
    }

    pub fn set_stroke_color(&mut self, color: Color32) -> bool {
        self.settings.brush_color = color;
        self.mark_changed();
        self.update_selected(|shape| {
            let changed = shape.style.stroke_color != color;
            shape.style.stroke_color = color;
            changed
        })
    }

    pub fn set_stroke_width(&mut self, width: f32) -> bool {
        self.settings.brush_size = width;
        self.mark_changed();
        self.update_selected(|shape| {
            let changed = shape.style.stroke_width != width;
            shape.style.stroke_width = width;
            changed
        })
    }

    /// Line style only affects new lines and shape previews
    pub fn set_line_style(&mut self, style: LineStyle) {
        self.settings.line_style = style;
        self.mark_changed();
    }

    pub fn set_fill_enabled(&mut self, filled: bool) -> bool {
        self.settings.shape_style.filled = filled;
        self.mark_changed();
        self.update_selected(|shape| {
            let changed = shape.style.filled != filled;
            shape.style.filled = filled;
            changed
        })
    }

    pub fn set_fill_kind(&mut self, kind: FillKind) -> bool {
        self.settings.shape_style.fill_kind = kind;
        self.mark_changed();
        self.update_selected(|shape| {
            let changed = shape.style.fill_kind != kind;
            shape.style.fill_kind = kind;
            changed
        })
    }

    /// Picking a fill color switches the fill back to solid
    pub fn set_fill_color(&mut self, color: Color32) -> bool {
        self.settings.shape_style.fill_color = color;
        self.settings.shape_style.fill_kind = FillKind::Solid;
        self.mark_changed();
        self.update_selected(|shape| {
            let changed = shape.style.fill_color != color || shape.style.fill_kind != FillKind::Solid;
            shape.style.fill_color = color;
            shape.style.fill_kind = FillKind::Solid;
            changed
        })
    }

    pub fn set_gradient_color_1(&mut self, color: Color32) -> bool {
        self.settings.shape_style.gradient_color_1 = color;
        self.mark_changed();
        self.update_selected(|shape| {
            let changed = shape.style.gradient_color_1 != color;
            shape.style.gradient_color_1 = color;
            changed
        })
    }

    pub fn set_gradient_color_2(&mut self, color: Color32) -> bool {
        self.settings.shape_style.gradient_color_2 = color;
        self.mark_changed();
        self.update_selected(|shape| {
            let changed = shape.style.gradient_color_2 != color;
            shape.style.gradient_color_2 = color;
            changed
        })
    }

    /// Fills with a named pattern: fill on, kind pattern
    pub fn set_pattern(&mut self, name: &str) -> bool {
        if !self.doc.patterns().contains_key(name) {
            return false;
        }
        let style = &mut self.settings.shape_style;
        style.filled = true;
        style.fill_kind = FillKind::Pattern;
        style.pattern_name = Some(name.to_string());
        self.mark_changed();
        self.update_selected(|shape| {
            let before = shape.style.clone();
            shape.style.filled = true;
            shape.style.fill_kind = FillKind::Pattern;
            shape.style.pattern_name = Some(name.to_string());
            shape.style != before
        });
        true
    }

    /// Stores an uploaded image under a timestamp name and applies it as
    /// the current fill. Returns the pattern name.
    pub fn upload_pattern(&mut self, image: RgbaImage) -> String {
        let base = format!("user-pattern-{}", timestamp_millis());
        let mut name = base.clone();
        let mut n = 1;
        while self.doc.patterns().contains_key(&name) {
            n += 1;
            name = format!("{base}-{n}");
        }
        self.doc.add_pattern(&name, image);
        log::info!("Added fill pattern {name}");
        self.set_pattern(&name);
        name
    }

    pub fn set_font_family(&mut self, family: &str) -> bool {
        self.settings.font.font_family = family.to_string();
        self.update_selected_text(|font| font.font_family = family.to_string())
    }

    pub fn set_font_size(&mut self, size: f32) -> bool {
        self.settings.font.font_size = size;
        self.update_selected_text(|font| font.font_size = size)
    }

    pub fn set_bold(&mut self, bold: bool) -> bool {
        self.settings.font.bold = bold;
        self.update_selected_text(|font| font.bold = bold)
    }

    pub fn set_italic(&mut self, italic: bool) -> bool {
        self.settings.font.italic = italic;
        self.update_selected_text(|font| font.italic = italic)
    }

    pub fn set_text_align(&mut self, align: TextAlign) -> bool {
        self.settings.font.text_align = align;
        self.update_selected_text(|font| font.text_align = align)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_wide_image_uses_full_width() {
        assert_eq!(fit_to_viewport(2000, 1000, vec2(800.0, 600.0)), (800, 400));
    }

    #[test]
    fn test_fit_tall_image_uses_full_height() {
        assert_eq!(fit_to_viewport(500, 1000, vec2(800.0, 600.0)), (300, 600));
    }
}
