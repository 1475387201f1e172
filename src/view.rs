use egui::{Pos2, Rect, Vec2, pos2};

pub const MIN_SCALE: f32 = 0.2;
pub const MAX_SCALE: f32 = 10.0;

/// Zoom step for keyboard shortcuts
pub const KEYBOARD_ZOOM_FACTOR: f32 = 1.2;

/// Zoom step per mouse wheel notch
pub const WHEEL_ZOOM_FACTOR: f32 = 1.1;

/// Pan and zoom of the canvas. Screen positions are relative to the
/// top-left of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f32,
    pub offset: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        pos2(
            (screen.x - self.offset.x) / self.scale,
            (screen.y - self.offset.y) / self.scale,
        )
    }

    pub fn world_to_screen(&self, world: Pos2) -> Pos2 {
        pos2(
            world.x * self.scale + self.offset.x,
            world.y * self.scale + self.offset.y,
        )
    }

    /// Zooms to `new_scale` (clamped) keeping the world point under
    /// `screen_point` where it is
    pub fn zoom_at(&mut self, new_scale: f32, screen_point: Pos2) {
        let anchor = self.screen_to_world(screen_point);
        self.scale = new_scale.clamp(MIN_SCALE, MAX_SCALE);
        self.offset = screen_point.to_vec2() - anchor.to_vec2() * self.scale;
    }

    pub fn zoom_by(&mut self, factor: f32, screen_point: Pos2) {
        self.zoom_at(self.scale * factor, screen_point);
    }

    pub fn pan(&mut self, screen_delta: Vec2) {
        self.offset += screen_delta;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// World-space rectangle covered by a viewport of `size`
    pub fn visible_world_rect(&self, size: Vec2) -> Rect {
        Rect::from_min_max(
            self.screen_to_world(Pos2::ZERO),
            self.screen_to_world(size.to_pos2()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut view = ViewTransform::default();
        let anchor = pos2(120.0, 80.0);
        let before = view.screen_to_world(anchor);
        view.zoom_at(2.5, anchor);
        let after = view.screen_to_world(anchor);
        assert!((before.x - after.x).abs() < 0.001);
        assert!((before.y - after.y).abs() < 0.001);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = ViewTransform::default();
        view.zoom_at(50.0, Pos2::ZERO);
        assert_eq!(view.scale, MAX_SCALE);
        view.zoom_at(0.01, Pos2::ZERO);
        assert_eq!(view.scale, MIN_SCALE);
    }
}
