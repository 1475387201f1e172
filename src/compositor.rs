//! Flattens layers and shapes into rasters for display, commit and export.

use std::sync::Arc;

use egui::{Color32, Pos2, Rect, vec2};

use crate::document::{Document, PatternLibrary};
use crate::geometry::{self, CURVE_FLATTEN_SEGMENTS};
use crate::raster::{BlendMode, Paint, Surface};
use crate::shape::{Shape, ShapeId, ShapeKind};
use crate::style::{FillKind, ShapeStyle};
use crate::text::FontBook;

const ELLIPSE_SEGMENTS: usize = 96;

/// Dash and gap length for hidden lines
pub const HIDDEN_LINE_DASH: f32 = 10.0;

/// Live feedback for a gesture in progress, drawn above everything else
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Line {
        start: Pos2,
        end: Pos2,
        color: Color32,
        width: f32,
        dashed: bool,
    },
    Shape {
        shape: Shape,
        dashed: bool,
    },
}

/// Resolves the fill paint of a style over `bounds`. A missing pattern
/// falls back to the solid fill color.
pub fn fill_paint(style: &ShapeStyle, bounds: Rect, patterns: &PatternLibrary) -> Paint {
    let stops = || Paint::two_stops(style.gradient_color_1, style.gradient_color_2);
    match style.fill_kind {
        FillKind::Solid => Paint::Solid(style.fill_color),
        FillKind::Linear => Paint::Linear {
            start: bounds.min,
            end: bounds.max,
            stops: stops(),
        },
        FillKind::Radial => Paint::Radial {
            center: bounds.center(),
            radius: bounds.width().max(bounds.height()) / 2.0,
            stops: stops(),
        },
        FillKind::Pattern => style
            .pattern_name
            .as_ref()
            .and_then(|name| patterns.get(name))
            .map(|image| Paint::Pattern(Arc::clone(image)))
            .unwrap_or(Paint::Solid(style.fill_color)),
    }
}

/// Outline polygon of a non-text shape and whether it is a closed path
fn outline(shape: &Shape) -> Option<(Vec<Pos2>, bool)> {
    match (&shape.kind, shape.points.as_slice()) {
        (ShapeKind::Rectangle, [_, _, _, _]) => Some((shape.points.clone(), true)),
        (ShapeKind::Curve, [start, c1, c2, end]) => Some((
            geometry::flatten_cubic(*start, *c1, *c2, *end, CURVE_FLATTEN_SEGMENTS),
            shape.style.filled,
        )),
        (ShapeKind::Circle, [p1, _, p3, _]) => {
            let center = geometry::midpoint(*p1, *p3);
            let radii = vec2((p3.x - p1.x).abs() / 2.0, (p3.y - p1.y).abs() / 2.0);
            Some((geometry::ellipse_points(center, radii, ELLIPSE_SEGMENTS), true))
        }
        _ => None,
    }
}

/// Draws one shape with its own style. Text is filled with the stroke color.
pub fn draw_shape(surface: &mut Surface, shape: &Shape, patterns: &PatternLibrary, fonts: &FontBook) {
    draw_shape_with_dash(surface, shape, patterns, fonts, false);
}

fn draw_shape_with_dash(surface: &mut Surface, shape: &Shape, patterns: &PatternLibrary, fonts: &FontBook, dashed: bool) {
    if let ShapeKind::Text(content) = &shape.kind {
        if let Some(anchor) = shape.points.first() {
            fonts.draw_text(surface, &content.text, *anchor, &content.font, shape.style.stroke_color);
        }
        return;
    }

    let Some((points, closed)) = outline(shape) else {
        log::debug!("Skipping malformed {}", shape.id);
        return;
    };

    if shape.style.filled {
        let bounds = geometry::bounds_of(&shape.points);
        let paint = fill_paint(&shape.style, bounds, patterns);
        surface.fill_polygon(&points, &paint, BlendMode::SourceOver);
    }

    let stroke = Paint::Solid(shape.style.stroke_color);
    if dashed {
        surface.stroke_dashed(&points, shape.style.stroke_width, &stroke, HIDDEN_LINE_DASH, HIDDEN_LINE_DASH, closed);
    } else {
        surface.stroke_polyline(&points, shape.style.stroke_width, &stroke, closed, BlendMode::SourceOver);
    }
}

pub fn draw_preview(surface: &mut Surface, preview: &Preview, patterns: &PatternLibrary, fonts: &FontBook) {
    match preview {
        Preview::Line {
            start,
            end,
            color,
            width,
            dashed,
        } => draw_line(surface, *start, *end, *color, *width, *dashed),
        Preview::Shape { shape, dashed } => draw_shape_with_dash(surface, shape, patterns, fonts, *dashed),
    }
}

/// Straight segment, solid or hidden (dashed)
pub fn draw_line(surface: &mut Surface, start: Pos2, end: Pos2, color: Color32, width: f32, dashed: bool) {
    let paint = Paint::Solid(color);
    if dashed {
        surface.stroke_dashed(&[start, end], width, &paint, HIDDEN_LINE_DASH, HIDDEN_LINE_DASH, false);
    } else {
        surface.stroke_polyline(&[start, end], width, &paint, false, BlendMode::SourceOver);
    }
}

/// Live view of the document: background, then visible layers from the
/// bottom of the stack up, each followed by its shapes, then the preview.
/// `hidden` suppresses one shape (the text being edited).
pub fn compose_scene(doc: &Document, fonts: &FontBook, hidden: Option<ShapeId>, preview: Option<&Preview>) -> Surface {
    let mut scene = Surface::new(doc.width(), doc.height());
    if let Some(background) = doc.background() {
        scene.draw_image_scaled(background, doc.width(), doc.height());
    }

    for layer in doc.layers.iter().rev().filter(|layer| layer.visible) {
        scene.draw_surface(&layer.surface);
        for shape in doc
            .shapes_on_layer(layer.id)
            .filter(|shape| Some(shape.id) != hidden)
        {
            draw_shape(&mut scene, shape, doc.patterns(), fonts);
        }
    }

    if let Some(preview) = preview {
        draw_preview(&mut scene, preview, doc.patterns(), fonts);
    }
    scene
}

/// Flat image for generation and sketch export: white backdrop, the
/// background stretched to the canvas, then visible layer rasters.
/// Shapes are expected to have been committed already.
pub fn compose_flattened(doc: &Document) -> Surface {
    let mut flat = Surface::filled(doc.width(), doc.height(), Color32::WHITE);
    if let Some(background) = doc.background() {
        flat.draw_image_scaled(background, doc.width(), doc.height());
    }
    for layer in doc.layers.iter().rev().filter(|layer| layer.visible) {
        flat.draw_surface(&layer.surface);
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerId;
    use egui::pos2;

    fn filled_rect(color: Color32) -> Shape {
        let style = ShapeStyle {
            filled: true,
            fill_color: color,
            stroke_color: color,
            stroke_width: 1.0,
            ..ShapeStyle::default()
        };
        Shape::rectangle(ShapeId(1), LayerId(0), pos2(2.0, 2.0), pos2(8.0, 8.0), style)
    }

    #[test]
    fn test_missing_pattern_falls_back_to_solid() {
        let style = ShapeStyle {
            fill_kind: FillKind::Pattern,
            pattern_name: Some("pattern_404".into()),
            fill_color: Color32::RED,
            ..ShapeStyle::default()
        };
        let paint = fill_paint(&style, Rect::from_min_size(Pos2::ZERO, vec2(4.0, 4.0)), &PatternLibrary::new());
        assert!(matches!(paint, Paint::Solid(c) if c == Color32::RED));
    }

    #[test]
    fn test_hidden_shape_is_not_drawn() {
        let mut doc = Document::new(10, 10);
        let layer = doc.layers.active_id().unwrap();
        let mut shape = filled_rect(Color32::BLUE);
        shape.layer_id = layer;
        doc.add_shape(shape);

        let fonts = FontBook::new();
        let shown = compose_scene(&doc, &fonts, None, None);
        let hidden = compose_scene(&doc, &fonts, Some(ShapeId(1)), None);
        assert_eq!(shown.pixel(5, 5), Some([0, 0, 255, 255]));
        assert_eq!(hidden.pixel(5, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_front_layer_paints_last() {
        let mut doc = Document::new(4, 4);
        let back = doc.layers.active_id().unwrap();
        let front = doc.layers.add_layer("Layer 2");
        doc.layers.get_mut(back).unwrap().surface = Surface::filled(4, 4, Color32::RED);
        doc.layers.get_mut(front).unwrap().surface = Surface::filled(4, 4, Color32::GREEN);

        let flat = compose_flattened(&doc);
        assert_eq!(flat.pixel(1, 1), Some([0, 255, 0, 255]));
    }
}
