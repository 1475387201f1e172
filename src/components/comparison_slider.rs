use eframe::egui;

/// Sketch and generated image stacked, with a draggable divider. The
/// generated image shows left of the divider, the sketch right of it.
pub struct ComparisonSlider<'a> {
    pub before: &'a egui::TextureHandle,
    pub after: &'a egui::TextureHandle,
    /// Divider position as a fraction of the width
    pub split: &'a mut f32,
}

/// Divider fraction for a pointer at `x`, clamped to the image
pub fn split_at(x: f32, rect: egui::Rect) -> f32 {
    if rect.width() <= 0.0 {
        return 0.5;
    }
    ((x - rect.left()) / rect.width()).clamp(0.0, 1.0)
}

impl<'a> ComparisonSlider<'a> {
    pub fn new(before: &'a egui::TextureHandle, after: &'a egui::TextureHandle, split: &'a mut f32) -> Self {
        Self { before, after, split }
    }

    /// Fits the generated image's aspect ratio into `max_width`
    pub fn show(self, ui: &mut egui::Ui, max_width: f32) -> egui::Response {
        let image_size = self.after.size_vec2();
        let width = max_width.min(image_size.x).max(1.0);
        let size = image_size * (width / image_size.x.max(1.0));
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());

        if response.dragged() || response.clicked() {
            if let Some(pointer) = response.interact_pointer_pos() {
                *self.split = split_at(pointer.x, rect);
            }
        }

        if ui.is_rect_visible(rect) {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            let painter = ui.painter_at(rect);
            painter.image(self.before.id(), rect, uv, egui::Color32::WHITE);

            let divider = rect.left() + rect.width() * *self.split;
            let shown = egui::Rect::from_min_max(rect.min, egui::pos2(divider, rect.bottom()));
            painter
                .with_clip_rect(shown)
                .image(self.after.id(), rect, uv, egui::Color32::WHITE);

            let stroke = egui::Stroke::new(2.0, egui::Color32::WHITE);
            painter.vline(divider, rect.y_range(), stroke);
            let grabber = egui::pos2(divider, rect.center().y);
            painter.circle(grabber, 10.0, egui::Color32::from_gray(45), stroke);
            painter.text(
                grabber,
                egui::Align2::CENTER_CENTER,
                "↔",
                egui::FontId::proportional(12.0),
                egui::Color32::WHITE,
            );
        }

        if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_follows_pointer_within_image() {
        let rect = egui::Rect::from_min_size(egui::pos2(100.0, 0.0), egui::vec2(200.0, 150.0));
        assert_eq!(split_at(150.0, rect), 0.25);
        assert_eq!(split_at(40.0, rect), 0.0);
        assert_eq!(split_at(420.0, rect), 1.0);
        assert_eq!(split_at(10.0, egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::Vec2::ZERO)), 0.5);
    }
}
