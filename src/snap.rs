use egui::{Pos2, pos2};
use serde::{Deserialize, Serialize};

use crate::geometry::{self, GRID_SIZE};
use crate::perspective::Perspective;
use crate::shape::{Shape, ShapeId};

/// Screen-pixel radius within which a point snaps to a handle or grid node
pub const SNAP_DISTANCE: f32 = 10.0;

/// Screen-pixel radius for snapping a line end onto a perspective direction
pub const PERSPECTIVE_SNAP_DISTANCE: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapSettings {
    pub to_grid: bool,
    pub to_objects: bool,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            to_grid: true,
            to_objects: true,
        }
    }
}

/// Adjusts a raw world point onto a nearby shape handle or grid node.
///
/// Handles of every shape except `exclude` are considered first; the grid is
/// only tried when no handle was close enough. At most one adjustment applies.
pub fn snapped_coords(
    raw: Pos2,
    shapes: &[Shape],
    exclude: Option<ShapeId>,
    scale: f32,
    settings: SnapSettings,
) -> Pos2 {
    let threshold = SNAP_DISTANCE / scale;
    let mut best_distance = threshold;
    let mut snapped = raw;

    if settings.to_objects {
        for shape in shapes.iter().filter(|shape| Some(shape.id) != exclude) {
            for (_, handle) in shape.handles() {
                let d = geometry::distance(raw, handle);
                if d < best_distance {
                    best_distance = d;
                    snapped = handle;
                }
            }
        }
    }

    if best_distance == threshold && settings.to_grid {
        let grid_point = geometry::round_to_grid(raw, GRID_SIZE);
        if geometry::distance(raw, grid_point) < best_distance {
            snapped = grid_point;
        }
    }

    snapped
}

/// Pulls the end of a straight line from `start` onto a perspective direction:
/// a ray toward any vanishing point, or the pure vertical / horizontal through
/// `start`. Returns `current` unchanged when nothing is within reach or no
/// perspective is configured.
pub fn line_snap_to_perspective(start: Pos2, current: Pos2, perspective: &Perspective, scale: f32) -> Pos2 {
    if !perspective.is_configured() || perspective.vanishing_points().is_empty() {
        return current;
    }

    let mut candidates: Vec<Pos2> = perspective
        .vanishing_points()
        .iter()
        .map(|vp| geometry::closest_point_on_ray(current, *vp, start))
        .collect();
    candidates.push(pos2(start.x, current.y));
    candidates.push(pos2(current.x, start.y));

    let threshold = PERSPECTIVE_SNAP_DISTANCE / scale;
    candidates
        .into_iter()
        .map(|candidate| (geometry::distance(current, candidate), candidate))
        .filter(|(d, _)| *d < threshold)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate)
        .unwrap_or(current)
}
