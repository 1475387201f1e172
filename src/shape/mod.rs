//! Vector shapes drawn above layer rasters until they are committed.

mod handles;
mod hit_test;

pub use handles::{Handle, HANDLE_HIT_RADIUS};

use egui::{Pos2, Rect, Vec2, pos2};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry;
use crate::layer::LayerId;
use crate::style::{FontStyle, ShapeStyle};
use crate::text::FontBook;

/// Shape identifier, unique and increasing within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub u32);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape#{}", self.0)
    }
}

/// Text payload of a text shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
    #[serde(flatten)]
    pub font: FontStyle,
}

/// The geometric interpretation of a shape's points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ShapeKind {
    /// Four corners tl, tr, br, bl of a possibly skewed quad
    Rectangle,
    /// Cubic curve: start, control 1, control 2, end
    #[serde(rename = "french-curve", alias = "curve")]
    Curve,
    /// Ellipse inscribed in the box spanned by points 0 and 2
    Circle,
    /// Single top anchor point
    Text(TextContent),
}

impl ShapeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Curve => "Curve",
            ShapeKind::Circle => "Circle",
            ShapeKind::Text(_) => "Text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: ShapeId,
    pub layer_id: LayerId,
    #[serde(flatten)]
    pub kind: ShapeKind,
    pub points: Vec<Pos2>,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

/// Corners tl, tr, br, bl of the axis-aligned box spanned by two points
fn quad_from_drag(start: Pos2, end: Pos2) -> Vec<Pos2> {
    let rect = Rect::from_two_pos(start, end);
    vec![rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()]
}

impl Shape {
    pub fn rectangle(id: ShapeId, layer_id: LayerId, start: Pos2, end: Pos2, style: ShapeStyle) -> Self {
        Self {
            id,
            layer_id,
            kind: ShapeKind::Rectangle,
            points: quad_from_drag(start, end),
            style,
        }
    }

    pub fn circle(id: ShapeId, layer_id: LayerId, start: Pos2, end: Pos2, style: ShapeStyle) -> Self {
        Self {
            id,
            layer_id,
            kind: ShapeKind::Circle,
            points: quad_from_drag(start, end),
            style,
        }
    }

    /// Curve from a drag; the controls give it an S-bend along the drag vector
    pub fn curve(id: ShapeId, layer_id: LayerId, start: Pos2, end: Pos2, style: ShapeStyle) -> Self {
        let d = end - start;
        let c1 = pos2(start.x + d.x * 0.25, start.y + d.y * 0.75);
        let c2 = pos2(start.x + d.x * 0.75, start.y + d.y * 0.25);
        Self {
            id,
            layer_id,
            kind: ShapeKind::Curve,
            points: vec![start, c1, c2, end],
            style,
        }
    }

    pub fn text(id: ShapeId, layer_id: LayerId, anchor: Pos2, content: TextContent, style: ShapeStyle) -> Self {
        Self {
            id,
            layer_id,
            kind: ShapeKind::Text(content),
            points: vec![anchor],
            style,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ShapeKind::Text(_))
    }

    pub fn text_content(&self) -> Option<&TextContent> {
        match &self.kind {
            ShapeKind::Text(content) => Some(content),
            _ => None,
        }
    }

    pub fn text_content_mut(&mut self) -> Option<&mut TextContent> {
        match &mut self.kind {
            ShapeKind::Text(content) => Some(content),
            _ => None,
        }
    }

    /// Whether the point list matches what the kind requires
    pub fn is_well_formed(&self) -> bool {
        let expected = if self.is_text() { 1 } else { 4 };
        self.points.len() == expected
    }

    /// Measured box of a text shape, offset for its alignment
    pub fn text_bounds(&self, fonts: &FontBook) -> Option<Rect> {
        let content = self.text_content()?;
        let anchor = *self.points.first()?;
        let size = fonts.block_size(&content.text, &content.font);
        let x = anchor.x + content.font.text_align.offset(size.x);
        Some(Rect::from_min_size(pos2(x, anchor.y), size))
    }

    /// Axis-aligned bounds of the geometry (measured box for text)
    pub fn bounds(&self, fonts: &FontBook) -> Rect {
        self.text_bounds(fonts)
            .unwrap_or_else(|| geometry::bounds_of(&self.points))
    }

    /// Mirrors the points about the center of their bounding box.
    /// Text shapes are left alone; returns whether anything changed.
    pub fn flip(&mut self, axis: FlipAxis) -> bool {
        if self.is_text() || self.points.is_empty() {
            return false;
        }
        let center = geometry::bounds_of(&self.points).center();
        for point in &mut self.points {
            match axis {
                FlipAxis::Horizontal => point.x = 2.0 * center.x - point.x,
                FlipAxis::Vertical => point.y = 2.0 * center.y - point.y,
            }
        }
        true
    }

    pub fn translate(&mut self, delta: Vec2) {
        for point in &mut self.points {
            *point += delta;
        }
    }

    /// Sets the points to `original`'s points shifted by `delta`
    pub fn translate_from(&mut self, original: &Shape, delta: Vec2) {
        self.points = original.points.iter().map(|p| *p + delta).collect();
    }
}
