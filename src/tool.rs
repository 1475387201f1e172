use egui::{Color32, CursorIcon, Key};
use serde::{Deserialize, Serialize};

use crate::style::{FontStyle, ShapeStyle};

/// The active canvas tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Sketch,
    Line,
    Eraser,
    Rectangle,
    Curve,
    Circle,
    Text,
}

impl ToolKind {
    pub const ALL: [ToolKind; 9] = [
        ToolKind::Select,
        ToolKind::Pan,
        ToolKind::Sketch,
        ToolKind::Line,
        ToolKind::Eraser,
        ToolKind::Rectangle,
        ToolKind::Curve,
        ToolKind::Circle,
        ToolKind::Text,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Pan => "Pan",
            ToolKind::Sketch => "Sketch",
            ToolKind::Line => "Line",
            ToolKind::Eraser => "Eraser",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Curve => "Curve",
            ToolKind::Circle => "Circle",
            ToolKind::Text => "Text",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ToolKind::Select => "⬉",
            ToolKind::Pan => "✋",
            ToolKind::Sketch => "✏",
            ToolKind::Line => "╱",
            ToolKind::Eraser => "⌫",
            ToolKind::Rectangle => "▭",
            ToolKind::Curve => "∿",
            ToolKind::Circle => "◯",
            ToolKind::Text => "T",
        }
    }

    /// Single-key shortcut that selects this tool
    pub fn shortcut(&self) -> Key {
        match self {
            ToolKind::Select => Key::S,
            ToolKind::Pan => Key::H,
            ToolKind::Sketch => Key::B,
            ToolKind::Line => Key::L,
            ToolKind::Eraser => Key::E,
            ToolKind::Rectangle => Key::R,
            ToolKind::Curve => Key::V,
            ToolKind::Circle => Key::C,
            ToolKind::Text => Key::T,
        }
    }

    pub fn from_shortcut(key: Key) -> Option<ToolKind> {
        ToolKind::ALL.into_iter().find(|tool| tool.shortcut() == key)
    }

    /// Tools that create vector shapes by dragging
    pub fn is_shape_tool(&self) -> bool {
        matches!(self, ToolKind::Rectangle | ToolKind::Curve | ToolKind::Circle)
    }

    /// Tools that paint into the active layer raster
    pub fn is_raster_tool(&self) -> bool {
        matches!(self, ToolKind::Sketch | ToolKind::Eraser | ToolKind::Line)
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            ToolKind::Select => CursorIcon::Default,
            ToolKind::Pan => CursorIcon::Grab,
            ToolKind::Text => CursorIcon::Text,
            _ => CursorIcon::Crosshair,
        }
    }
}

/// Solid or dashed ("hidden") strokes for lines and shape previews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Hidden,
}

impl LineStyle {
    pub fn is_dashed(&self) -> bool {
        matches!(self, LineStyle::Hidden)
    }
}

/// Defaults applied to newly drawn strokes, lines and shapes
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    pub brush_color: Color32,
    pub brush_size: f32,
    pub line_style: LineStyle,
    pub shape_style: ShapeStyle,
    pub font: FontStyle,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            brush_color: Color32::BLACK,
            brush_size: 5.0,
            line_style: LineStyle::Solid,
            shape_style: ShapeStyle::default(),
            font: FontStyle::default(),
        }
    }
}

impl ToolSettings {
    /// Style for a new vector shape: the brush color and size as stroke,
    /// the fill defaults as fill
    pub fn new_shape_style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke_color: self.brush_color,
            stroke_width: self.brush_size,
            ..self.shape_style.clone()
        }
    }

    /// Style for a new text shape: the brush color, width 1, no fill
    pub fn new_text_style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke_color: self.brush_color,
            stroke_width: 1.0,
            ..ShapeStyle::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcuts_round_trip() {
        for tool in ToolKind::ALL {
            assert_eq!(ToolKind::from_shortcut(tool.shortcut()), Some(tool));
        }
        assert_eq!(ToolKind::from_shortcut(Key::Z), None);
    }
}
