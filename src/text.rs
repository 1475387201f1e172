use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use egui::{Color32, Pos2, Vec2, vec2};

use crate::raster::{BlendMode, Surface};
use crate::style::FontStyle;

/// Average advance, in ems, assumed when no font face is loaded
const FALLBACK_ADVANCE_EM: f32 = 0.6;

/// Horizontal shear applied to synthesized italics
const ITALIC_SHEAR: f32 = 0.2;

/// Font faces used for measuring and rasterizing text.
///
/// Without any face the book still measures text (with an estimated advance)
/// so layout stays deterministic in headless use, but draws nothing.
#[derive(Clone, Default)]
pub struct FontBook {
    regular: Option<FontArc>,
    bold: Option<FontArc>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("regular", &self.regular.is_some())
            .field("bold", &self.bold.is_some())
            .finish()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(regular: Vec<u8>, bold: Option<Vec<u8>>) -> Result<Self, ab_glyph::InvalidFont> {
        Ok(Self {
            regular: Some(FontArc::try_from_vec(regular)?),
            bold: bold.map(FontArc::try_from_vec).transpose()?,
        })
    }

    /// Uses the proportional face bundled with egui
    pub fn from_egui_defaults() -> Self {
        let definitions = egui::FontDefinitions::default();
        let face = definitions
            .families
            .get(&egui::FontFamily::Proportional)
            .and_then(|names| names.first())
            .and_then(|name| definitions.font_data.get(name))
            .map(|data| data.font.to_vec());

        match face.map(FontArc::try_from_vec) {
            Some(Ok(font)) => Self {
                regular: Some(font),
                bold: None,
            },
            Some(Err(err)) => {
                log::warn!("Bundled font could not be parsed: {err}");
                Self::default()
            }
            None => Self::default(),
        }
    }

    pub fn has_faces(&self) -> bool {
        self.regular.is_some()
    }

    fn face(&self, bold: bool) -> Option<&FontArc> {
        if bold {
            self.bold.as_ref().or(self.regular.as_ref())
        } else {
            self.regular.as_ref()
        }
    }

    /// Scale that makes one em equal `size` pixels
    fn px_scale(font: &FontArc, size: f32) -> PxScale {
        let units_per_em = font.units_per_em().unwrap_or(1000.0);
        PxScale::from(size * font.height_unscaled() / units_per_em)
    }

    pub fn measure_line(&self, line: &str, style: &FontStyle) -> f32 {
        let Some(font) = self.face(style.bold) else {
            return line.chars().count() as f32 * style.font_size * FALLBACK_ADVANCE_EM;
        };
        let scaled = font.as_scaled(Self::px_scale(font, style.font_size));

        let mut width = 0.0;
        let mut previous: Option<GlyphId> = None;
        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }

    /// Width of the widest line and the total height of a newline-separated block
    pub fn block_size(&self, text: &str, style: &FontStyle) -> Vec2 {
        let lines: Vec<&str> = text.split('\n').collect();
        let width = lines
            .iter()
            .map(|line| self.measure_line(line, style))
            .fold(0.0, f32::max);
        vec2(width, lines.len() as f32 * style.line_height())
    }

    /// Greedy word wrap; a single word wider than `max_width` keeps its own line
    pub fn wrap_words(&self, text: &str, max_width: f32, style: &FontStyle) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        for word in text.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if !current.is_empty() && self.measure_line(&candidate, style) > max_width {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            } else {
                current = candidate;
            }
        }
        lines.push(current);
        lines
    }

    /// Draws newline-separated text with the first line's top at `anchor.y`,
    /// aligned about `anchor.x`, lines spaced at `style.line_height()`
    pub fn draw_text(&self, surface: &mut Surface, text: &str, anchor: Pos2, style: &FontStyle, color: Color32) {
        let Some(font) = self.face(style.bold) else {
            return;
        };
        let synthetic_bold = style.bold && self.bold.is_none();
        let scale = Self::px_scale(font, style.font_size);
        let scaled = font.as_scaled(scale);
        let ascent = scaled.ascent();
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        let rgba = [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0];

        for (index, line) in text.split('\n').enumerate() {
            let width = self.measure_line(line, style);
            let origin_x = anchor.x + style.text_align.offset(width);
            let baseline = anchor.y + index as f32 * style.line_height() + ascent;

            let mut cursor = origin_x;
            let mut previous: Option<GlyphId> = None;
            for ch in line.chars() {
                let id = font.glyph_id(ch);
                if let Some(prev) = previous {
                    cursor += scaled.kern(prev, id);
                }
                let passes: &[f32] = if synthetic_bold { &[0.0, 1.0] } else { &[0.0] };
                for &dx in passes {
                    let glyph = id.with_scale_and_position(scale, point(cursor + dx, baseline));
                    let Some(outlined) = font.outline_glyph(glyph) else {
                        continue;
                    };
                    let bounds = outlined.px_bounds();
                    outlined.draw(|gx, gy, coverage| {
                        let py = bounds.min.y + gy as f32;
                        let mut px = bounds.min.x + gx as f32;
                        if style.italic {
                            px += (baseline - py) * ITALIC_SHEAR;
                        }
                        if px >= 0.0 && py >= 0.0 {
                            surface.blend_pixel(px as u32, py as u32, rgba, coverage, BlendMode::SourceOver);
                        }
                    });
                }
                cursor += scaled.h_advance(id);
                previous = Some(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(size: f32) -> FontStyle {
        FontStyle {
            font_size: size,
            ..FontStyle::default()
        }
    }

    #[test]
    fn test_fallback_measurement() {
        let book = FontBook::new();
        assert!((book.measure_line("abcd", &style(10.0)) - 24.0).abs() < 0.001);
    }

    #[test]
    fn test_block_size_uses_widest_line() {
        let book = FontBook::new();
        let size = book.block_size("ab\nabcd\n", &style(10.0));
        assert!((size.x - 24.0).abs() < 0.001);
        assert!((size.y - 36.0).abs() < 0.001);
    }

    #[test]
    fn test_wrap_words_breaks_on_width() {
        let book = FontBook::new();
        let lines = book.wrap_words("aa bb cc", 32.0, &style(10.0));
        assert_eq!(lines, vec!["aa bb".to_string(), "cc".to_string()]);
    }

    #[test]
    fn test_bundled_font_draws_pixels() {
        let book = FontBook::from_egui_defaults();
        if !book.has_faces() {
            return;
        }
        let mut surface = Surface::new(80, 30);
        book.draw_text(&mut surface, "Hi", egui::pos2(2.0, 2.0), &style(20.0), Color32::BLACK);
        assert!(!surface.is_blank());
    }
}
