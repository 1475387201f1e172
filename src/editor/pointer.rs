use egui::{CursorIcon, Modifiers, Pos2, pos2};

use super::Editor;
use crate::compositor;
use crate::geometry::{self, CURVE_FLATTEN_SEGMENTS};
use crate::layer::LayerId;
use crate::raster::{BlendMode, Paint};
use crate::shape::{HANDLE_HIT_RADIUS, Shape, ShapeId, TextContent};
use crate::snap;
use crate::state::Gesture;
use crate::style::DEFAULT_TEXT;
use crate::tool::ToolKind;

/// Drags no longer than this (world units) do not create a shape
pub const MIN_SHAPE_DRAG: f32 = 5.0;

/// Segments per smoothed freehand piece
const FREEHAND_SEGMENTS: usize = 8;

/// Like `f32::signum` but zero for zero
fn sign(v: f32) -> f32 {
    if v == 0.0 { 0.0 } else { v.signum() }
}

/// End point constrained so the drag spans a square, keeping its direction
fn square_end(start: Pos2, end: Pos2) -> Pos2 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let size = dx.abs().max(dy.abs());
    pos2(start.x + size * sign(dx), start.y + size * sign(dy))
}

impl Editor {
    fn world(&self, screen: Pos2) -> Pos2 {
        self.view.screen_to_world(screen)
    }

    /// Grid/object snapping, ignoring the selected shape's own handles
    pub fn snapped(&self, raw: Pos2) -> Pos2 {
        snap::snapped_coords(raw, self.doc.shapes(), self.selection, self.view.scale, self.snap)
    }

    /// Builds the shape a drag from `start` to `end` would create
    pub(super) fn build_shape(&self, tool: ToolKind, id: ShapeId, start: Pos2, end: Pos2) -> Option<Shape> {
        let layer = self.doc.layers.active_id()?;
        let style = self.settings.new_shape_style();
        let constrained = if self.shift_down { square_end(start, end) } else { end };
        match tool {
            ToolKind::Rectangle => Some(Shape::rectangle(id, layer, start, constrained, style)),
            ToolKind::Circle => Some(Shape::circle(id, layer, start, constrained, style)),
            ToolKind::Curve => Some(Shape::curve(id, layer, start, end, style)),
            _ => None,
        }
    }

    pub(super) fn pointer_down(&mut self, screen: Pos2, modifiers: Modifiers) {
        self.shift_down = modifiers.shift;
        self.commit_text_edit();

        let raw = self.world(screen);
        let pos = self.snapped(raw);

        if self.space_down || self.tool == ToolKind::Pan {
            self.gesture = Gesture::Panning { last: screen };
            return;
        }

        if let Some(index) = self.perspective.vanishing_point_at(raw, self.view.scale) {
            self.gesture = Gesture::DraggingVp { index, moved: false };
            return;
        }

        if self.perspective.is_setup_active() {
            self.perspective.handle_setup_click(raw);
            self.mark_changed();
            return;
        }

        let Some(active) = self.doc.layers.active_id() else {
            return;
        };

        match self.tool {
            ToolKind::Select => self.begin_select(raw, pos, active),
            ToolKind::Text => self.create_text(pos, active),
            ToolKind::Sketch | ToolKind::Eraser => {
                self.gesture = Gesture::Freehand {
                    last: pos,
                    last_mid: pos,
                    erase: self.tool == ToolKind::Eraser,
                };
            }
            ToolKind::Line => self.gesture = Gesture::Line { start: pos, current: pos },
            ToolKind::Rectangle | ToolKind::Curve | ToolKind::Circle => {
                self.gesture = Gesture::Shape {
                    tool: self.tool,
                    start: pos,
                    current: pos,
                };
            }
            ToolKind::Pan => {}
        }
    }

    /// Selected shape's handles, then its body, then the topmost shape on
    /// the active layer; empty space deselects
    fn begin_select(&mut self, raw: Pos2, pos: Pos2, active: LayerId) {
        let scale = self.view.scale;
        let selected = self
            .selected_shape()
            .filter(|shape| shape.layer_id == active)
            .cloned();
        if let Some(selected) = selected {
            if let Some(handle) = selected.handle_at(raw, HANDLE_HIT_RADIUS / scale) {
                self.gesture = Gesture::DraggingHandle {
                    shape: selected.id,
                    handle,
                    original: selected,
                };
                return;
            }
            if selected.contains_point(raw, scale, &self.fonts) {
                self.gesture = Gesture::DraggingShape {
                    shape: selected.id,
                    start: pos,
                    original: selected,
                };
                return;
            }
        }

        match self.doc.topmost_shape_at(raw, active, scale, &self.fonts) {
            Some(id) => {
                self.selection = Some(id);
                if let Some(original) = self.doc.shape(id).cloned() {
                    self.gesture = Gesture::DraggingShape {
                        shape: id,
                        start: pos,
                        original,
                    };
                }
                self.mark_changed();
            }
            None => {
                if self.selection.take().is_some() {
                    self.mark_changed();
                }
            }
        }
    }

    fn create_text(&mut self, pos: Pos2, active: LayerId) {
        let id = self.doc.next_shape_id();
        let content = TextContent {
            text: DEFAULT_TEXT.to_string(),
            font: self.settings.font.clone(),
        };
        let shape = Shape::text(id, active, pos, content, self.settings.new_text_style());
        if !self.doc.add_shape(shape) {
            return;
        }
        self.select_tool(ToolKind::Select);
        self.selection = Some(id);
        self.record();
        self.begin_text_edit(id);
    }

    pub(super) fn pointer_move(&mut self, screen: Pos2, modifiers: Modifiers) {
        self.shift_down = modifiers.shift;
        if self.gesture.is_idle() {
            return;
        }

        let raw = self.world(screen);
        let pos = self.snapped(raw);

        match std::mem::take(&mut self.gesture) {
            Gesture::Panning { last } => {
                self.view.pan(screen - last);
                self.gesture = Gesture::Panning { last: screen };
            }
            Gesture::DraggingVp { index, moved } => {
                let visible = self.view.visible_world_rect(self.viewport);
                let dragged = self
                    .perspective
                    .drag_vanishing_point(index, raw.x, visible.min.x, visible.max.x);
                self.gesture = Gesture::DraggingVp {
                    index,
                    moved: moved || dragged,
                };
            }
            Gesture::DraggingHandle { shape, handle, original } => {
                if let Some(live) = self.doc.shape_mut(shape) {
                    live.move_handle(handle, pos);
                }
                self.gesture = Gesture::DraggingHandle { shape, handle, original };
            }
            Gesture::DraggingShape { shape, start, original } => {
                if let Some(live) = self.doc.shape_mut(shape) {
                    live.translate_from(&original, pos - start);
                }
                self.gesture = Gesture::DraggingShape { shape, start, original };
            }
            Gesture::Freehand { last, last_mid, erase } => {
                let mid = geometry::midpoint(last, pos);
                self.paint_freehand(last_mid, last, mid, erase);
                self.gesture = Gesture::Freehand {
                    last: pos,
                    last_mid: mid,
                    erase,
                };
            }
            Gesture::Line { start, .. } => {
                let current = snap::line_snap_to_perspective(start, pos, &self.perspective, self.view.scale);
                self.gesture = Gesture::Line { start, current };
            }
            Gesture::Shape { tool, start, .. } => {
                self.gesture = Gesture::Shape { tool, start, current: pos };
            }
            Gesture::Idle => {}
        }
        self.mark_changed();
    }

    /// One smoothed piece: from the previous midpoint through the previous
    /// point to the new midpoint
    fn paint_freehand(&mut self, from: Pos2, control: Pos2, to: Pos2, erase: bool) {
        let points = geometry::flatten_quadratic(from, control, to, FREEHAND_SEGMENTS);
        let paint = Paint::Solid(self.settings.brush_color);
        let mode = if erase {
            BlendMode::DestinationOut
        } else {
            BlendMode::SourceOver
        };
        let width = self.settings.brush_size;
        if let Some(layer) = self.doc.layers.active_mut() {
            layer.surface.stroke_polyline(&points, width, &paint, false, mode);
        }
    }

    pub(super) fn pointer_up(&mut self, screen: Pos2, modifiers: Modifiers) {
        self.shift_down = modifiers.shift;
        let raw = self.world(screen);
        let pos = self.snapped(raw);

        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => return,
            Gesture::Panning { .. } => {}
            Gesture::DraggingVp { moved, .. } => {
                if moved {
                    self.record();
                }
            }
            Gesture::DraggingHandle { shape, original, .. } | Gesture::DraggingShape { shape, original, .. } => {
                if self.doc.shape(shape).is_some_and(|live| *live != original) {
                    self.record();
                }
            }
            Gesture::Freehand { .. } => self.record(),
            Gesture::Line { start, .. } => {
                let end = snap::line_snap_to_perspective(start, pos, &self.perspective, self.view.scale);
                let (color, width) = (self.settings.brush_color, self.settings.brush_size);
                let dashed = self.settings.line_style.is_dashed();
                if let Some(layer) = self.doc.layers.active_mut() {
                    compositor::draw_line(&mut layer.surface, start, end, color, width, dashed);
                }
                self.record();
            }
            Gesture::Shape { tool, start, .. } => self.finish_shape(tool, start, pos),
        }
        self.mark_changed();
    }

    /// Creates the dragged shape if the drag was long enough, selects it and
    /// switches to the select tool
    fn finish_shape(&mut self, tool: ToolKind, start: Pos2, end: Pos2) {
        if geometry::distance(start, end) <= MIN_SHAPE_DRAG {
            log::debug!("Discarding {} drag shorter than {MIN_SHAPE_DRAG}", tool.name());
            return;
        }
        let id = self.doc.next_shape_id();
        let Some(shape) = self.build_shape(tool, id, start, end) else {
            return;
        };
        if !self.doc.add_shape(shape) {
            return;
        }
        log::debug!("Created {id} with the {} tool", tool.name());
        self.selection = Some(id);
        self.select_tool(ToolKind::Select);
        self.record();
    }

    /// Selects the topmost shape under the cursor on the active layer and
    /// opens the text editor when it is a text shape
    pub(super) fn double_click(&mut self, screen: Pos2) {
        let raw = self.world(screen);
        let Some(active) = self.doc.layers.active_id() else {
            return;
        };
        let Some(id) = self
            .doc
            .topmost_shape_at(raw, active, self.view.scale, &self.fonts)
        else {
            return;
        };
        self.select_tool(ToolKind::Select);
        self.selection = Some(id);
        if self.doc.shape(id).is_some_and(Shape::is_text) {
            self.begin_text_edit(id);
        }
        self.mark_changed();
    }

    /// Cursor to show while hovering `screen` with no button held
    pub fn cursor_at(&self, screen: Pos2) -> CursorIcon {
        match (&self.gesture, self.tool) {
            (Gesture::Panning { .. }, _) => return CursorIcon::Grabbing,
            (Gesture::DraggingVp { .. }, _) => return CursorIcon::Move,
            (_, ToolKind::Eraser) => return CursorIcon::None,
            (_, ToolKind::Text) => return CursorIcon::Text,
            (_, ToolKind::Pan) => return CursorIcon::Grab,
            _ => {}
        }

        let raw = self.world(screen);
        let scale = self.view.scale;
        if self.perspective.vanishing_point_at(raw, scale).is_some() {
            return CursorIcon::Move;
        }
        if self.space_down {
            return CursorIcon::Grab;
        }
        if self.tool == ToolKind::Select {
            let active = self.doc.layers.active_id();
            if let Some(shape) = self.selected_shape().filter(|s| Some(s.layer_id) == active) {
                if let Some(handle) = shape.handle_at(raw, HANDLE_HIT_RADIUS / scale) {
                    return handle.cursor_icon();
                }
                if shape.contains_point(raw, scale, &self.fonts) {
                    return CursorIcon::Move;
                }
            }
        }
        if self.perspective.is_setup_active() {
            return CursorIcon::Crosshair;
        }
        if self.tool == ToolKind::Select {
            CursorIcon::Default
        } else {
            self.tool.cursor_icon()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_end_keeps_direction() {
        let end = square_end(pos2(10.0, 10.0), pos2(4.0, 30.0));
        assert_eq!(end, pos2(-10.0, 30.0));
        assert_eq!(square_end(pos2(0.0, 0.0), pos2(0.0, 8.0)), pos2(0.0, 8.0));
    }
}
