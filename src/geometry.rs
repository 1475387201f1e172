use egui::{Pos2, Rect, Vec2, pos2};

/// Snap grid spacing in world units
pub const GRID_SIZE: f32 = 20.0;

/// Parametric step used when sampling cubic curves for hit testing
pub const CURVE_SAMPLE_STEP: f32 = 0.05;

/// Segments used when a curve is turned into a polyline for filling or stroking
pub const CURVE_FLATTEN_SEGMENTS: usize = 48;

pub fn distance(a: Pos2, b: Pos2) -> f32 {
    (a - b).length()
}

/// Closest point to `p` on the segment `a..b`, clamped to the endpoints
pub fn closest_point_on_segment(p: Pos2, a: Pos2, b: Pos2) -> Pos2 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest point to `p` on the infinite line through `a` and `b`
pub fn closest_point_on_ray(p: Pos2, a: Pos2, b: Pos2) -> Pos2 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return a;
    }
    let t = (p - a).dot(ab) / len_sq;
    a + ab * t
}

/// Distance from a point to a line segment (used for stroke coverage)
pub fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    distance(p, closest_point_on_segment(p, a, b))
}

/// Axis-aligned bounds of a set of points. Empty input yields `Rect::NOTHING`.
pub fn bounds_of(points: &[Pos2]) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(pos2(min_x, min_y), pos2(max_x, max_y))
}

pub fn midpoint(a: Pos2, b: Pos2) -> Pos2 {
    pos2((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

pub fn cubic_bezier_point(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, t: f32) -> Pos2 {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    pos2(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

pub fn quadratic_bezier_point(p0: Pos2, p1: Pos2, p2: Pos2, t: f32) -> Pos2 {
    let mt = 1.0 - t;
    pos2(
        mt * mt * p0.x + 2.0 * mt * t * p1.x + t * t * p2.x,
        mt * mt * p0.y + 2.0 * mt * t * p1.y + t * t * p2.y,
    )
}

/// Polyline approximation of a cubic curve, endpoints included
pub fn flatten_cubic(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, segments: usize) -> Vec<Pos2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| cubic_bezier_point(p0, p1, p2, p3, i as f32 / segments as f32))
        .collect()
}

/// Polyline approximation of a quadratic curve, endpoints included
pub fn flatten_quadratic(p0: Pos2, p1: Pos2, p2: Pos2, segments: usize) -> Vec<Pos2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| quadratic_bezier_point(p0, p1, p2, i as f32 / segments as f32))
        .collect()
}

/// Points around an axis-aligned ellipse, not closed
pub fn ellipse_points(center: Pos2, radii: Vec2, segments: usize) -> Vec<Pos2> {
    let segments = segments.max(8);
    (0..segments)
        .map(|i| {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            pos2(center.x + radii.x * angle.cos(), center.y + radii.y * angle.sin())
        })
        .collect()
}

/// Even-odd ray casting over a closed polygon
pub fn point_in_polygon(point: Pos2, vertices: &[Pos2]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (vi, vj) = (vertices[i], vertices[j]);
        let crosses = (vi.y > point.y) != (vj.y > point.y)
            && point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Non-zero winding containment over a closed polygon
pub fn winding_contains(point: Pos2, vertices: &[Pos2]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut winding = 0i32;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        let side = (b.x - a.x) * (point.y - a.y) - (point.x - a.x) * (b.y - a.y);
        if a.y <= point.y {
            if b.y > point.y && side > 0.0 {
                winding += 1;
            }
        } else if b.y <= point.y && side < 0.0 {
            winding -= 1;
        }
    }
    winding != 0
}

/// Rounds each coordinate to the nearest multiple of `grid`
pub fn round_to_grid(point: Pos2, grid: f32) -> Pos2 {
    pos2((point.x / grid).round() * grid, (point.y / grid).round() * grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_point_on_segment_clamps() {
        let a = pos2(0.0, 0.0);
        let b = pos2(10.0, 0.0);
        assert_eq!(closest_point_on_segment(pos2(5.0, 4.0), a, b), pos2(5.0, 0.0));
        assert_eq!(closest_point_on_segment(pos2(-5.0, 4.0), a, b), a);
        assert_eq!(closest_point_on_segment(pos2(15.0, 4.0), a, b), b);
    }

    #[test]
    fn test_closest_point_on_ray_extends_past_endpoints() {
        let a = pos2(0.0, 0.0);
        let b = pos2(10.0, 10.0);
        let p = closest_point_on_ray(pos2(30.0, 10.0), a, b);
        assert!((p.x - 20.0).abs() < 0.001);
        assert!((p.y - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_degenerate_segment() {
        let a = pos2(3.0, 3.0);
        assert_eq!(closest_point_on_segment(pos2(7.0, 0.0), a, a), a);
        assert_eq!(closest_point_on_ray(pos2(7.0, 0.0), a, a), a);
    }

    #[test]
    fn test_bounds_of_points() {
        let rect = bounds_of(&[pos2(5.0, 1.0), pos2(-2.0, 8.0), pos2(3.0, 3.0)]);
        assert_eq!(rect.min, pos2(-2.0, 1.0));
        assert_eq!(rect.max, pos2(5.0, 8.0));
        assert_eq!(bounds_of(&[]), Rect::NOTHING);
    }

    #[test]
    fn test_polygon_containment_on_skewed_quad() {
        let quad = [pos2(0.0, 0.0), pos2(10.0, 2.0), pos2(12.0, 12.0), pos2(-2.0, 10.0)];
        assert!(point_in_polygon(pos2(5.0, 5.0), &quad));
        assert!(!point_in_polygon(pos2(20.0, 5.0), &quad));
        assert!(winding_contains(pos2(5.0, 5.0), &quad));
        assert!(!winding_contains(pos2(5.0, -3.0), &quad));
    }

    #[test]
    fn test_cubic_endpoints() {
        let p0 = pos2(0.0, 0.0);
        let p3 = pos2(10.0, 0.0);
        let curve = flatten_cubic(p0, pos2(2.0, 8.0), pos2(8.0, 8.0), p3, 10);
        assert_eq!(curve.len(), 11);
        assert_eq!(curve[0], p0);
        assert!((curve[10].x - p3.x).abs() < 0.001);
    }

    #[test]
    fn test_round_to_grid() {
        assert_eq!(round_to_grid(pos2(101.0, 199.0), GRID_SIZE), pos2(100.0, 200.0));
        assert_eq!(round_to_grid(pos2(-9.0, 11.0), GRID_SIZE), pos2(0.0, 20.0));
    }
}
