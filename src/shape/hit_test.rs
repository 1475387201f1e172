use egui::{Pos2, pos2};

use super::{Shape, ShapeKind};
use crate::geometry::{self, CURVE_FLATTEN_SEGMENTS, CURVE_SAMPLE_STEP};
use crate::text::FontBook;

/// Screen-pixel tolerance for picking an unfilled curve
const CURVE_HIT_TOLERANCE: f32 = 10.0;

impl Shape {
    /// Whether `point` (world space) lies on or in the shape at zoom `scale`
    pub fn contains_point(&self, point: Pos2, scale: f32, fonts: &FontBook) -> bool {
        match &self.kind {
            ShapeKind::Rectangle => geometry::point_in_polygon(point, &self.points),
            ShapeKind::Circle => self.ellipse_contains(point),
            ShapeKind::Curve => self.curve_contains(point, scale),
            ShapeKind::Text(_) => self
                .text_bounds(fonts)
                .is_some_and(|rect| rect.contains(point)),
        }
    }

    fn ellipse_contains(&self, point: Pos2) -> bool {
        let (Some(p1), Some(p3)) = (self.points.first(), self.points.get(2)) else {
            return false;
        };
        let center = pos2((p1.x + p3.x) / 2.0, (p1.y + p3.y) / 2.0);
        let rx = (p3.x - p1.x).abs() / 2.0;
        let ry = (p3.y - p1.y).abs() / 2.0;
        if rx == 0.0 || ry == 0.0 {
            return false;
        }
        let nx = (point.x - center.x) / rx;
        let ny = (point.y - center.y) / ry;
        nx * nx + ny * ny <= 1.0
    }

    fn curve_contains(&self, point: Pos2, scale: f32) -> bool {
        let [start, c1, c2, end] = match self.points.as_slice() {
            [a, b, c, d] => [*a, *b, *c, *d],
            _ => return false,
        };

        if self.style.filled {
            let outline = geometry::flatten_cubic(start, c1, c2, end, CURVE_FLATTEN_SEGMENTS);
            return geometry::winding_contains(point, &outline);
        }

        let threshold = CURVE_HIT_TOLERANCE / scale;
        let steps = (1.0 / CURVE_SAMPLE_STEP).round() as usize;
        (0..=steps).any(|i| {
            let t = i as f32 * CURVE_SAMPLE_STEP;
            geometry::cubic_bezier_point(start, c1, c2, end, t).distance(point) < threshold
        })
    }
}
