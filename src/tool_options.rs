//! Which option groups the tool panel shows, and what they display.

use egui::Color32;

use crate::shape::{Shape, ShapeKind};
use crate::style::{FillKind, FontStyle};
use crate::tool::{LineStyle, ToolKind, ToolSettings};

/// Values the option controls should display
#[derive(Debug, Clone, PartialEq)]
pub struct PanelValues {
    pub stroke_color: Color32,
    pub stroke_width: f32,
    pub line_style: LineStyle,
    pub filled: bool,
    pub fill_kind: FillKind,
    pub fill_color: Color32,
    pub gradient_color_1: Color32,
    pub gradient_color_2: Color32,
    pub pattern_name: Option<String>,
    pub font: FontStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelConfig {
    pub brush: bool,
    pub line_style: bool,
    pub fill: bool,
    pub gradient_colors: bool,
    pub text: bool,
    /// Flip, copy and delete for the selected shape
    pub shape_context: bool,
    pub values: PanelValues,
}

/// What the panel is configuring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subject {
    Brush,
    Stroked,
    Text,
    Other,
}

fn subject(selection: Option<&Shape>, tool: ToolKind) -> Subject {
    match selection.map(|shape| &shape.kind) {
        Some(ShapeKind::Text(_)) => Subject::Text,
        Some(_) => Subject::Stroked,
        None => match tool {
            ToolKind::Sketch | ToolKind::Eraser => Subject::Brush,
            ToolKind::Line | ToolKind::Rectangle | ToolKind::Curve | ToolKind::Circle => Subject::Stroked,
            ToolKind::Text => Subject::Text,
            ToolKind::Select | ToolKind::Pan => Subject::Other,
        },
    }
}

/// Projects the selection and tool onto panel visibility. Values come from
/// the selected shape when there is one, otherwise from the defaults.
pub fn options_for(selection: Option<&Shape>, tool: ToolKind, settings: &ToolSettings) -> PanelConfig {
    let values = match selection {
        Some(shape) => PanelValues {
            stroke_color: shape.style.stroke_color,
            stroke_width: shape.style.stroke_width,
            line_style: settings.line_style,
            filled: shape.style.filled,
            fill_kind: shape.style.fill_kind,
            fill_color: shape.style.fill_color,
            gradient_color_1: shape.style.gradient_color_1,
            gradient_color_2: shape.style.gradient_color_2,
            pattern_name: shape.style.pattern_name.clone(),
            font: shape
                .text_content()
                .map(|content| content.font.clone())
                .unwrap_or_else(|| settings.font.clone()),
        },
        None => {
            let style = &settings.shape_style;
            PanelValues {
                stroke_color: settings.brush_color,
                stroke_width: settings.brush_size,
                line_style: settings.line_style,
                filled: style.filled,
                fill_kind: style.fill_kind,
                fill_color: style.fill_color,
                gradient_color_1: style.gradient_color_1,
                gradient_color_2: style.gradient_color_2,
                pattern_name: style.pattern_name.clone(),
                font: settings.font.clone(),
            }
        }
    };

    let subject = subject(selection, tool);
    let stroked = subject == Subject::Stroked;
    PanelConfig {
        brush: matches!(subject, Subject::Brush | Subject::Stroked),
        line_style: stroked,
        fill: stroked,
        gradient_colors: stroked && values.fill_kind.uses_gradient(),
        text: subject == Subject::Text,
        shape_context: selection.is_some(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerId;
    use crate::shape::{ShapeId, TextContent};
    use crate::style::ShapeStyle;
    use egui::pos2;

    #[test]
    fn test_sketch_tool_shows_only_brush() {
        let config = options_for(None, ToolKind::Sketch, &ToolSettings::default());
        assert!(config.brush);
        assert!(!config.fill && !config.text && !config.shape_context);
    }

    #[test]
    fn test_selected_radial_rectangle_shows_gradients() {
        let style = ShapeStyle {
            filled: true,
            fill_kind: FillKind::Radial,
            stroke_width: 9.0,
            ..ShapeStyle::default()
        };
        let rect = Shape::rectangle(ShapeId(1), LayerId(1), pos2(0.0, 0.0), pos2(10.0, 10.0), style);
        let config = options_for(Some(&rect), ToolKind::Select, &ToolSettings::default());
        assert!(config.fill && config.gradient_colors && config.shape_context && config.line_style);
        assert_eq!(config.values.stroke_width, 9.0);
    }

    #[test]
    fn test_selected_text_shows_text_options() {
        let content = TextContent {
            text: "hi".into(),
            font: FontStyle {
                font_size: 30.0,
                ..FontStyle::default()
            },
        };
        let text = Shape::text(ShapeId(2), LayerId(1), pos2(5.0, 5.0), content, ShapeStyle::default());
        let config = options_for(Some(&text), ToolKind::Select, &ToolSettings::default());
        assert!(config.text && config.shape_context);
        assert!(!config.fill && !config.brush);
        assert_eq!(config.values.font.font_size, 30.0);
    }

    #[test]
    fn test_select_tool_without_selection_shows_nothing() {
        let config = options_for(None, ToolKind::Select, &ToolSettings::default());
        assert!(!config.brush && !config.fill && !config.text && !config.shape_context);
    }
}
