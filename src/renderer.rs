use eframe::egui::{self, Align2, Color32, ColorImage, FontId, Pos2, Rect, Stroke, TextureHandle, TextureOptions};

use crate::editor::Editor;
use crate::geometry::{self, CURVE_FLATTEN_SEGMENTS, GRID_SIZE};
use crate::shape::{Shape, ShapeKind};

const SELECTION_COLOR: Color32 = Color32::from_rgb(0, 123, 255);
const GUIDE_COLOR: Color32 = Color32::from_rgba_premultiplied(0, 90, 200, 110);
const HANDLE_SIZE: f32 = 8.0;

/// Paints the editor into a canvas rect: the composed document as a
/// texture, then interactive overlays with the egui painter.
#[derive(Default)]
pub struct Renderer {
    texture: Option<TextureHandle>,
    /// Editor revision the texture was built from
    uploaded: Option<u64>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("has_texture", &self.texture.is_some())
            .field("uploaded", &self.uploaded)
            .finish()
    }
}

impl Renderer {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::default()
    }

    /// Forces the next frame to re-upload the composition
    pub fn invalidate(&mut self) {
        self.uploaded = None;
    }

    fn upload(&mut self, ctx: &egui::Context, editor: &Editor) {
        if self.uploaded == Some(editor.revision()) && self.texture.is_some() {
            return;
        }
        let surface = editor.compose();
        let size = [surface.width() as usize, surface.height() as usize];
        let image = ColorImage::from_rgba_unmultiplied(size, surface.image().as_raw());
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => self.texture = Some(ctx.load_texture("canvas", image, TextureOptions::LINEAR)),
        }
        self.uploaded = Some(editor.revision());
    }

    /// Renders the canvas into `rect` (screen space)
    pub fn render(&mut self, ctx: &egui::Context, painter: &egui::Painter, rect: Rect, editor: &Editor) {
        self.upload(ctx, editor);
        let painter = painter.with_clip_rect(rect);
        let to_screen = |world: Pos2| editor.view.world_to_screen(world) + rect.min.to_vec2();

        painter.rect_filled(rect, 0.0, Color32::from_gray(230));
        let canvas = Rect::from_min_max(
            to_screen(Pos2::ZERO),
            to_screen(Pos2::new(editor.doc.width() as f32, editor.doc.height() as f32)),
        );
        painter.rect_filled(canvas, 0.0, Color32::WHITE);
        if let Some(texture) = &self.texture {
            painter.image(
                texture.id(),
                canvas,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        if editor.snap.to_grid {
            self.draw_grid(&painter, rect, editor);
        }
        let boundary = [canvas.left_top(), canvas.right_top(), canvas.right_bottom(), canvas.left_bottom(), canvas.left_top()];
        painter.extend(egui::Shape::dashed_line(&boundary, Stroke::new(1.0, Color32::GRAY), 5.0, 5.0));

        self.draw_guides(&painter, rect, editor);
        if let Some(shape) = editor.selected_shape() {
            if editor.text_edit().is_none() {
                self.draw_selection(&painter, shape, editor, to_screen);
            }
        }

        if let Some(message) = editor.perspective.setup_message() {
            painter.text(
                rect.center_top() + egui::vec2(0.0, 16.0),
                Align2::CENTER_TOP,
                message,
                FontId::proportional(14.0),
                Color32::from_rgb(40, 40, 40),
            );
        }
    }

    fn draw_grid(&self, painter: &egui::Painter, rect: Rect, editor: &Editor) {
        let view = editor.view.visible_world_rect(rect.size());
        let stroke = Stroke::new(1.0, Color32::from_black_alpha(26));
        let offset = rect.min.to_vec2();

        let mut x = (view.min.x / GRID_SIZE).floor() * GRID_SIZE;
        while x <= view.max.x {
            let top = editor.view.world_to_screen(Pos2::new(x, view.min.y)) + offset;
            let bottom = editor.view.world_to_screen(Pos2::new(x, view.max.y)) + offset;
            painter.line_segment([top, bottom], stroke);
            x += GRID_SIZE;
        }
        let mut y = (view.min.y / GRID_SIZE).floor() * GRID_SIZE;
        while y <= view.max.y {
            let left = editor.view.world_to_screen(Pos2::new(view.min.x, y)) + offset;
            let right = editor.view.world_to_screen(Pos2::new(view.max.x, y)) + offset;
            painter.line_segment([left, right], stroke);
            y += GRID_SIZE;
        }
    }

    fn draw_guides(&self, painter: &egui::Painter, rect: Rect, editor: &Editor) {
        let view = editor.view.visible_world_rect(rect.size());
        let guides = editor.perspective.guide_geometry(view);
        let to_screen = |world: Pos2| editor.view.world_to_screen(world) + rect.min.to_vec2();

        let thin = Stroke::new(1.0, GUIDE_COLOR);
        for [a, b] in &guides.rays {
            painter.line_segment([to_screen(*a), to_screen(*b)], thin);
        }
        if let Some([a, b]) = guides.horizon {
            painter.line_segment([to_screen(a), to_screen(b)], Stroke::new(2.0, Color32::from_rgb(220, 60, 60)));
        }
        for vp in &guides.markers {
            let center = to_screen(*vp);
            painter.circle_filled(center, 6.0, Color32::from_rgb(220, 60, 60));
            painter.circle_stroke(center, 6.0, Stroke::new(1.5, Color32::WHITE));
        }
    }

    fn draw_selection(&self, painter: &egui::Painter, shape: &Shape, editor: &Editor, to_screen: impl Fn(Pos2) -> Pos2) {
        let stroke = Stroke::new(1.0, SELECTION_COLOR);
        match &shape.kind {
            ShapeKind::Rectangle | ShapeKind::Circle => {
                let mut outline: Vec<Pos2> = shape.points.iter().map(|p| to_screen(*p)).collect();
                if let Some(first) = outline.first().copied() {
                    outline.push(first);
                }
                painter.extend(egui::Shape::dashed_line(&outline, stroke, 4.0, 4.0));
            }
            ShapeKind::Curve => {
                if let [p0, p1, p2, p3] = shape.points[..] {
                    let path: Vec<Pos2> = geometry::flatten_cubic(p0, p1, p2, p3, CURVE_FLATTEN_SEGMENTS)
                        .into_iter()
                        .map(&to_screen)
                        .collect();
                    painter.add(egui::Shape::line(path, stroke));
                    let arm = Stroke::new(1.0, Color32::from_gray(150));
                    painter.line_segment([to_screen(p0), to_screen(p1)], arm);
                    painter.line_segment([to_screen(p3), to_screen(p2)], arm);
                }
            }
            ShapeKind::Text(_) => {
                let bounds = shape.bounds(editor.fonts());
                let screen = Rect::from_min_max(to_screen(bounds.min), to_screen(bounds.max)).expand(4.0);
                painter.rect_stroke(screen, 0.0, stroke);
            }
        }

        for (handle, point) in shape.handles() {
            let center = to_screen(point);
            if handle.is_control_point() {
                painter.circle_filled(center, HANDLE_SIZE / 2.0, SELECTION_COLOR);
                painter.circle_stroke(center, HANDLE_SIZE / 2.0, Stroke::new(1.0, Color32::WHITE));
            } else {
                let square = Rect::from_center_size(center, egui::vec2(HANDLE_SIZE, HANDLE_SIZE));
                painter.rect_filled(square, 0.0, Color32::WHITE);
                painter.rect_stroke(square, 0.0, stroke);
            }
        }
    }
}
