use egui::Pos2;

use super::{Shape, ShapeKind};

/// Pointer distance, in screen pixels, within which a handle is grabbed
pub const HANDLE_HIT_RADIUS: f32 = 10.0;

/// Named control point of a selected shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
    Start,
    Control1,
    Control2,
    End,
}

impl Handle {
    const QUAD: [Handle; 4] = [Handle::TopLeft, Handle::TopRight, Handle::BottomRight, Handle::BottomLeft];
    const CURVE: [Handle; 4] = [Handle::Start, Handle::Control1, Handle::Control2, Handle::End];

    pub fn as_str(&self) -> &'static str {
        match self {
            Handle::TopLeft => "tl",
            Handle::TopRight => "tr",
            Handle::BottomRight => "br",
            Handle::BottomLeft => "bl",
            Handle::Start => "start",
            Handle::Control1 => "c1",
            Handle::Control2 => "c2",
            Handle::End => "end",
        }
    }

    /// Index into the shape's point list that this handle moves
    pub fn point_index(&self) -> usize {
        match self {
            Handle::TopLeft | Handle::Start => 0,
            Handle::TopRight | Handle::Control1 => 1,
            Handle::BottomRight | Handle::Control2 => 2,
            Handle::BottomLeft | Handle::End => 3,
        }
    }

    /// Curve control points are drawn round, everything else square
    pub fn is_control_point(&self) -> bool {
        matches!(self, Handle::Control1 | Handle::Control2)
    }

    pub fn cursor_icon(&self) -> egui::CursorIcon {
        match self {
            Handle::TopLeft | Handle::BottomRight => egui::CursorIcon::ResizeNwSe,
            Handle::TopRight | Handle::BottomLeft => egui::CursorIcon::ResizeNeSw,
            _ => egui::CursorIcon::Move,
        }
    }
}

impl Shape {
    fn handle_names(&self) -> &'static [Handle] {
        match self.kind {
            ShapeKind::Rectangle | ShapeKind::Circle => &Handle::QUAD,
            ShapeKind::Curve => &Handle::CURVE,
            ShapeKind::Text(_) => &[],
        }
    }

    /// Draggable handles and their positions; text has none
    pub fn handles(&self) -> Vec<(Handle, Pos2)> {
        self.handle_names()
            .iter()
            .filter_map(|handle| self.points.get(handle.point_index()).map(|p| (*handle, *p)))
            .collect()
    }

    /// First handle within `radius` of `point`
    pub fn handle_at(&self, point: Pos2, radius: f32) -> Option<Handle> {
        self.handles()
            .into_iter()
            .find(|(_, pos)| pos.distance(point) < radius)
            .map(|(handle, _)| handle)
    }

    /// Relocates only the point behind `handle`, allowing free skew
    pub fn move_handle(&mut self, handle: Handle, to: Pos2) -> bool {
        if !self.handle_names().contains(&handle) {
            return false;
        }
        match self.points.get_mut(handle.point_index()) {
            Some(point) => {
                *point = to;
                true
            }
            None => false,
        }
    }
}
