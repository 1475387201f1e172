//! Burns the prompt into the bottom of a generated image.

use egui::{Color32, pos2};
use image::RgbaImage;

use crate::raster::{BlendMode, Paint, Surface};
use crate::style::FontStyle;
use crate::text::FontBook;

pub const CAPTION_LABEL: &str = "PROMPT";

/// Sizes derived from the image height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionMetrics {
    pub base_font: f32,
    pub label_font: f32,
    pub padding: f32,
    pub label_margin: f32,
    pub line_height: f32,
}

impl CaptionMetrics {
    pub fn for_height(height: u32) -> Self {
        let base_font = (height as f32 / 55.0).round().max(14.0);
        let label_font = base_font * 0.75;
        Self {
            base_font,
            label_font,
            padding: base_font * 1.5,
            label_margin: label_font * 0.5,
            line_height: base_font * 1.35,
        }
    }
}

fn font(size: f32, bold: bool) -> FontStyle {
    FontStyle {
        font_size: size,
        bold,
        ..FontStyle::default()
    }
}

/// Copy of `image` with the prompt over a dark gradient band
pub fn caption_image(image: &RgbaImage, prompt: &str, fonts: &FontBook) -> RgbaImage {
    let (width, height) = image.dimensions();
    let metrics = CaptionMetrics::for_height(height);
    let prompt_font = font(metrics.base_font, false);
    let label_font = font(metrics.label_font, true);

    let max_width = width as f32 - metrics.padding * 2.0;
    let lines = fonts.wrap_words(prompt, max_width, &prompt_font);
    let text_height = metrics.label_font + metrics.label_margin + lines.len() as f32 * metrics.line_height;
    let band_height = text_height + metrics.padding * 2.0;
    let band_top = height as f32 - band_height;

    let mut surface = Surface::from_image(image.clone());
    let band = [
        pos2(0.0, band_top),
        pos2(width as f32, band_top),
        pos2(width as f32, height as f32),
        pos2(0.0, height as f32),
    ];
    let gradient = Paint::Linear {
        start: pos2(0.0, band_top),
        end: pos2(0.0, height as f32),
        stops: vec![
            (0.0, Color32::from_black_alpha(0)),
            (0.2, Color32::from_black_alpha(128)),
            (1.0, Color32::from_black_alpha(191)),
        ],
    };
    surface.fill_polygon(&band, &gradient, BlendMode::SourceOver);

    let x = metrics.padding;
    let mut y = band_top + metrics.padding;
    fonts.draw_text(
        &mut surface,
        CAPTION_LABEL,
        pos2(x, y),
        &label_font,
        Color32::from_white_alpha(179),
    );
    y += metrics.label_font + metrics.label_margin;

    for line in &lines {
        fonts.draw_text(
            &mut surface,
            line,
            pos2(x, y),
            &prompt_font,
            Color32::from_white_alpha(242),
        );
        y += metrics.line_height;
    }

    surface.into_image()
}
