use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use egui::{Color32, Pos2, Rect, pos2};
use image::{ImageFormat, Rgba, RgbaImage, imageops};

use crate::error::DataUrlError;

/// Vertical samples per pixel row when filling polygons
const FILL_SUBSAMPLES: usize = 4;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// How source pixels combine with what is already on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    SourceOver,
    /// Removes destination alpha in proportion to source coverage (eraser)
    DestinationOut,
}

/// Color source for fills and strokes
#[derive(Clone)]
pub enum Paint {
    Solid(Color32),
    Linear {
        start: Pos2,
        end: Pos2,
        stops: Vec<(f32, Color32)>,
    },
    Radial {
        center: Pos2,
        radius: f32,
        stops: Vec<(f32, Color32)>,
    },
    /// Repeating image anchored at the surface origin
    Pattern(Arc<RgbaImage>),
}

impl fmt::Debug for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Paint::Solid(color) => f.debug_tuple("Solid").field(color).finish(),
            Paint::Linear { start, end, .. } => f
                .debug_struct("Linear")
                .field("start", start)
                .field("end", end)
                .finish(),
            Paint::Radial { center, radius, .. } => f
                .debug_struct("Radial")
                .field("center", center)
                .field("radius", radius)
                .finish(),
            Paint::Pattern(image) => f
                .debug_tuple("Pattern")
                .field(&format_args!("{}x{}", image.width(), image.height()))
                .finish(),
        }
    }
}

fn unmultiplied(color: Color32) -> [f32; 4] {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0]
}

fn sample_stops(stops: &[(f32, Color32)], t: f32) -> [f32; 4] {
    let Some(first) = stops.first() else {
        return [0.0; 4];
    };
    if t <= first.0 {
        return unmultiplied(first.1);
    }
    for pair in stops.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let span = (t1 - t0).max(f32::EPSILON);
            let k = ((t - t0) / span).clamp(0.0, 1.0);
            let (a, b) = (unmultiplied(c0), unmultiplied(c1));
            return std::array::from_fn(|i| a[i] + (b[i] - a[i]) * k);
        }
    }
    stops.last().map(|(_, c)| unmultiplied(*c)).unwrap_or([0.0; 4])
}

impl Paint {
    /// Two-stop gradient helper
    pub fn two_stops(from: Color32, to: Color32) -> Vec<(f32, Color32)> {
        vec![(0.0, from), (1.0, to)]
    }

    /// Unmultiplied RGBA in `0.0..=1.0` at a surface position
    fn color_at(&self, p: Pos2) -> [f32; 4] {
        match self {
            Paint::Solid(color) => unmultiplied(*color),
            Paint::Linear { start, end, stops } => {
                let axis = *end - *start;
                let len_sq = axis.length_sq();
                let t = if len_sq == 0.0 { 0.0 } else { (p - *start).dot(axis) / len_sq };
                sample_stops(stops, t.clamp(0.0, 1.0))
            }
            Paint::Radial { center, radius, stops } => {
                let t = if *radius <= 0.0 { 1.0 } else { (p - *center).length() / radius };
                sample_stops(stops, t.clamp(0.0, 1.0))
            }
            Paint::Pattern(image) => {
                if image.width() == 0 || image.height() == 0 {
                    return [0.0; 4];
                }
                let x = (p.x.floor() as i64).rem_euclid(image.width() as i64) as u32;
                let y = (p.y.floor() as i64).rem_euclid(image.height() as i64) as u32;
                let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
                [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0]
            }
        }
    }
}

/// Per-pixel coverage over a clipped region of a surface
struct CoverageMask {
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl CoverageMask {
    /// Mask covering `bounds` clipped to a `surface_w` x `surface_h` surface
    fn new(bounds: Rect, surface_w: u32, surface_h: u32) -> Option<Self> {
        if !(bounds.width() >= 0.0 && bounds.height() >= 0.0) {
            return None;
        }
        let x0 = bounds.min.x.floor().max(0.0) as i64;
        let y0 = bounds.min.y.floor().max(0.0) as i64;
        let x1 = (bounds.max.x.ceil() as i64).min(surface_w as i64);
        let y1 = (bounds.max.y.ceil() as i64).min(surface_h as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let (width, height) = ((x1 - x0) as u32, (y1 - y0) as u32);
        Some(Self {
            x0: x0 as u32,
            y0: y0 as u32,
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y - self.y0) as usize * self.width as usize + (x - self.x0) as usize
    }
}

/// An RGBA raster with copy-on-write storage.
///
/// Cloning is cheap; pixels are only duplicated when a clone is written to,
/// which keeps history snapshots of untouched layers free.
#[derive(Clone)]
pub struct Surface {
    pixels: Arc<RgbaImage>,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl PartialEq for Surface {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels) || *self.pixels == *other.pixels
    }
}

impl Surface {
    /// Transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: Arc::new(RgbaImage::new(width, height)),
        }
    }

    pub fn filled(width: u32, height: u32, color: Color32) -> Self {
        let rgba = Rgba(color.to_srgba_unmultiplied());
        Self {
            pixels: Arc::new(RgbaImage::from_pixel(width, height, rgba)),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        Arc::try_unwrap(self.pixels).unwrap_or_else(|shared| (*shared).clone())
    }

    /// True when both handles point at the same pixel buffer
    pub fn shares_pixels_with(&self, other: &Surface) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    fn pixels_mut(&mut self) -> &mut RgbaImage {
        Arc::make_mut(&mut self.pixels)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.width() && y < self.height()).then(|| self.pixels.get_pixel(x, y).0)
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p.0[3] == 0)
    }

    pub fn clear(&mut self) {
        if self.is_blank() {
            return;
        }
        self.pixels = Arc::new(RgbaImage::new(self.width(), self.height()));
    }

    /// New dimensions with existing pixels kept at the origin, not rescaled
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width() && height == self.height() {
            return;
        }
        let mut resized = RgbaImage::new(width, height);
        imageops::replace(&mut resized, self.image(), 0, 0);
        self.pixels = Arc::new(resized);
    }

    /// Composites `src` at its own resolution with its top-left at (`x`, `y`)
    pub fn draw_image(&mut self, src: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(self.pixels_mut(), src, x, y);
    }

    pub fn draw_surface(&mut self, src: &Surface) {
        self.draw_image(src.image(), 0, 0);
    }

    /// Composites `src` stretched to `width` x `height` at the origin
    pub fn draw_image_scaled(&mut self, src: &RgbaImage, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if src.width() == width && src.height() == height {
            self.draw_image(src, 0, 0);
        } else {
            let scaled = imageops::resize(src, width, height, imageops::FilterType::Triangle);
            self.draw_image(&scaled, 0, 0);
        }
    }

    /// Blends one color sample into a pixel with the given coverage
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: [f32; 4], coverage: f32, mode: BlendMode) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        let pixel = self.pixels_mut().get_pixel_mut(x, y);
        blend_into(pixel, color, coverage, mode);
    }

    fn apply_mask(&mut self, mask: &CoverageMask, paint: &Paint, mode: BlendMode) {
        let pixels = self.pixels_mut();
        for y in mask.y0..mask.y0 + mask.height {
            for x in mask.x0..mask.x0 + mask.width {
                let coverage = mask.data[mask.index(x, y)];
                if coverage <= 0.0 {
                    continue;
                }
                let color = paint.color_at(pos2(x as f32 + 0.5, y as f32 + 0.5));
                blend_into(pixels.get_pixel_mut(x, y), color, coverage.min(1.0), mode);
            }
        }
    }

    /// Fills a closed polygon using the non-zero winding rule
    pub fn fill_polygon(&mut self, vertices: &[Pos2], paint: &Paint, mode: BlendMode) {
        if vertices.len() < 3 {
            return;
        }
        let bounds = crate::geometry::bounds_of(vertices);
        let Some(mut mask) = CoverageMask::new(bounds, self.width(), self.height()) else {
            return;
        };

        let edges: Vec<(Pos2, Pos2)> = vertices
            .iter()
            .zip(vertices.iter().cycle().skip(1))
            .map(|(a, b)| (*a, *b))
            .filter(|(a, b)| a.y != b.y)
            .collect();

        let mut crossings: Vec<(f32, i32)> = Vec::with_capacity(edges.len());
        let weight = 1.0 / FILL_SUBSAMPLES as f32;
        for y in mask.y0..mask.y0 + mask.height {
            for s in 0..FILL_SUBSAMPLES {
                let sy = y as f32 + (s as f32 + 0.5) * weight;
                crossings.clear();
                for &(a, b) in &edges {
                    let dir = if a.y <= sy && sy < b.y {
                        1
                    } else if b.y <= sy && sy < a.y {
                        -1
                    } else {
                        continue;
                    };
                    let x = a.x + (sy - a.y) * (b.x - a.x) / (b.y - a.y);
                    crossings.push((x, dir));
                }
                crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

                let mut winding = 0;
                for pair in crossings.windows(2) {
                    winding += pair[0].1;
                    if winding != 0 {
                        add_span(&mut mask, y, pair[0].0, pair[1].0, weight);
                    }
                }
            }
        }

        self.apply_mask(&mask, paint, mode);
    }

    /// Strokes a polyline with round joins and caps
    pub fn stroke_polyline(
        &mut self,
        points: &[Pos2],
        width: f32,
        paint: &Paint,
        closed: bool,
        mode: BlendMode,
    ) {
        let segments = polyline_segments(points, closed);
        self.stroke_segments(&segments, width, paint, mode);
    }

    /// Strokes a polyline broken into `dash` on / `gap` off runs
    pub fn stroke_dashed(
        &mut self,
        points: &[Pos2],
        width: f32,
        paint: &Paint,
        dash: f32,
        gap: f32,
        closed: bool,
    ) {
        let segments = dash_segments(&polyline_segments(points, closed), dash, gap);
        self.stroke_segments(&segments, width, paint, BlendMode::SourceOver);
    }

    fn stroke_segments(&mut self, segments: &[(Pos2, Pos2)], width: f32, paint: &Paint, mode: BlendMode) {
        if segments.is_empty() || width <= 0.0 {
            return;
        }
        let half = width.max(1.0) / 2.0;
        let alpha_scale = width.min(1.0);
        let endpoints: Vec<Pos2> = segments.iter().flat_map(|(a, b)| [*a, *b]).collect();
        let bounds = crate::geometry::bounds_of(&endpoints).expand(half + 1.0);
        let Some(mut mask) = CoverageMask::new(bounds, self.width(), self.height()) else {
            return;
        };

        for &(a, b) in segments {
            let seg_bounds = Rect::from_two_pos(a, b).expand(half + 1.0);
            let x0 = (seg_bounds.min.x.floor().max(mask.x0 as f32)) as u32;
            let y0 = (seg_bounds.min.y.floor().max(mask.y0 as f32)) as u32;
            let x1 = (seg_bounds.max.x.ceil() as i64).min((mask.x0 + mask.width) as i64);
            let y1 = (seg_bounds.max.y.ceil() as i64).min((mask.y0 + mask.height) as i64);
            for y in y0 as i64..y1 {
                for x in x0 as i64..x1 {
                    let center = pos2(x as f32 + 0.5, y as f32 + 0.5);
                    let d = crate::geometry::distance_to_segment(center, a, b);
                    let coverage = ((half + 0.5 - d).clamp(0.0, 1.0)) * alpha_scale;
                    if coverage > 0.0 {
                        let idx = mask.index(x as u32, y as u32);
                        mask.data[idx] = mask.data[idx].max(coverage);
                    }
                }
            }
        }

        self.apply_mask(&mask, paint, mode);
    }

    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        encode_png(self.image())
    }

    pub fn to_data_url(&self) -> Result<String, image::ImageError> {
        Ok(png_data_url(&self.to_png()?))
    }
}

fn blend_into(pixel: &mut Rgba<u8>, color: [f32; 4], coverage: f32, mode: BlendMode) {
    let sa = color[3] * coverage;
    if sa <= 0.0 {
        return;
    }
    let [dr, dg, db, da] = pixel.0.map(|c| c as f32 / 255.0);
    let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

    match mode {
        BlendMode::SourceOver => {
            let out_a = sa + da * (1.0 - sa);
            if out_a <= 0.0 {
                pixel.0 = [0, 0, 0, 0];
                return;
            }
            let mix = |s: f32, d: f32| (s * sa + d * da * (1.0 - sa)) / out_a;
            pixel.0 = [
                to_byte(mix(color[0], dr)),
                to_byte(mix(color[1], dg)),
                to_byte(mix(color[2], db)),
                to_byte(out_a),
            ];
        }
        BlendMode::DestinationOut => {
            pixel.0[3] = to_byte(da * (1.0 - sa));
        }
    }
}

/// Adds horizontal coverage for one sub-scanline between `left` and `right`
fn add_span(mask: &mut CoverageMask, y: u32, left: f32, right: f32, weight: f32) {
    let min_x = mask.x0 as f32;
    let max_x = (mask.x0 + mask.width) as f32;
    let left = left.clamp(min_x, max_x);
    let right = right.clamp(min_x, max_x);
    if right <= left {
        return;
    }

    let first = left.floor() as u32;
    let last = (right.ceil() as u32).min(mask.x0 + mask.width);
    for x in first..last {
        let px_left = (x as f32).max(left);
        let px_right = (x as f32 + 1.0).min(right);
        let covered = (px_right - px_left).max(0.0);
        if covered > 0.0 {
            let idx = mask.index(x, y);
            mask.data[idx] += covered * weight;
        }
    }
}

fn polyline_segments(points: &[Pos2], closed: bool) -> Vec<(Pos2, Pos2)> {
    match points {
        [] => Vec::new(),
        [only] => vec![(*only, *only)],
        _ => {
            let mut segments: Vec<(Pos2, Pos2)> = points.windows(2).map(|w| (w[0], w[1])).collect();
            if closed && points.len() > 2 {
                segments.push((points[points.len() - 1], points[0]));
            }
            segments
        }
    }
}

/// Splits segments into dash pieces, carrying the dash phase across joints
fn dash_segments(segments: &[(Pos2, Pos2)], dash: f32, gap: f32) -> Vec<(Pos2, Pos2)> {
    if dash <= 0.0 || gap <= 0.0 {
        return segments.to_vec();
    }
    let period = dash + gap;
    let mut phase = 0.0f32;
    let mut pieces = Vec::new();

    for &(a, b) in segments {
        let length = (b - a).length();
        if length == 0.0 {
            continue;
        }
        let dir = (b - a) / length;
        let mut travelled = 0.0f32;
        while travelled < length {
            let in_dash = phase < dash;
            let remaining_in_phase = if in_dash { dash - phase } else { period - phase };
            let step = remaining_in_phase.min(length - travelled);
            if in_dash {
                pieces.push((a + dir * travelled, a + dir * (travelled + step)));
            }
            travelled += step;
            phase = (phase + step) % period;
        }
    }
    pieces
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Decodes any supported image format into RGBA
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, image::ImageError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

pub fn png_data_url(png: &[u8]) -> String {
    format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png))
}

/// Raw bytes of a base64 `data:` URL of any image media type
pub fn data_url_bytes(url: &str) -> Result<Vec<u8>, DataUrlError> {
    let rest = url.strip_prefix("data:").ok_or(DataUrlError::NotADataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::NotADataUrl)?;
    if !header.ends_with(";base64") {
        return Err(DataUrlError::NotBase64);
    }
    Ok(STANDARD.decode(payload.trim())?)
}

pub fn decode_data_url(url: &str) -> Result<RgbaImage, DataUrlError> {
    Ok(decode_image(&data_url_bytes(url)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_polygon_covers_interior_only() {
        let mut surface = Surface::new(20, 20);
        let square = [pos2(5.0, 5.0), pos2(15.0, 5.0), pos2(15.0, 15.0), pos2(5.0, 15.0)];
        surface.fill_polygon(&square, &Paint::Solid(Color32::RED), BlendMode::SourceOver);

        assert_eq!(surface.pixel(10, 10), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(2, 2), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(16, 10), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_eraser_removes_alpha() {
        let mut surface = Surface::filled(10, 10, Color32::BLUE);
        let paint = Paint::Solid(Color32::BLACK);
        surface.stroke_polyline(&[pos2(0.0, 5.0), pos2(10.0, 5.0)], 4.0, &paint, false, BlendMode::DestinationOut);

        assert_eq!(surface.pixel(5, 5).map(|p| p[3]), Some(0));
        assert_eq!(surface.pixel(5, 0).map(|p| p[3]), Some(255));
    }

    #[test]
    fn test_dashes_leave_gaps() {
        let mut surface = Surface::new(60, 10);
        let paint = Paint::Solid(Color32::BLACK);
        surface.stroke_dashed(&[pos2(0.0, 5.0), pos2(60.0, 5.0)], 2.0, &paint, 10.0, 10.0, false);

        assert_eq!(surface.pixel(5, 5).map(|p| p[3]), Some(255));
        assert_eq!(surface.pixel(15, 5).map(|p| p[3]), Some(0));
        assert_eq!(surface.pixel(25, 5).map(|p| p[3]), Some(255));
    }

    #[test]
    fn test_resize_preserves_pixels() {
        let mut surface = Surface::new(4, 4);
        surface.blend_pixel(1, 1, [1.0, 0.0, 0.0, 1.0], 1.0, BlendMode::SourceOver);
        surface.resize(8, 2);

        assert_eq!(surface.width(), 8);
        assert_eq!(surface.height(), 2);
        assert_eq!(surface.pixel(1, 1), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_clones_share_until_written() {
        let original = Surface::new(4, 4);
        let mut copy = original.clone();
        assert!(copy.shares_pixels_with(&original));

        copy.blend_pixel(0, 0, [0.0, 0.0, 0.0, 1.0], 1.0, BlendMode::SourceOver);
        assert!(!copy.shares_pixels_with(&original));
        assert_eq!(original.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_linear_gradient_runs_between_endpoints() {
        let paint = Paint::Linear {
            start: pos2(0.0, 0.0),
            end: pos2(10.0, 0.0),
            stops: Paint::two_stops(Color32::WHITE, Color32::BLACK),
        };
        assert!(paint.color_at(pos2(0.0, 0.0))[0] > 0.99);
        assert!(paint.color_at(pos2(10.0, 0.0))[0] < 0.01);
        assert!((paint.color_at(pos2(5.0, 3.0))[0] - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_data_url_round_trip() {
        let surface = Surface::filled(3, 2, Color32::from_rgb(10, 20, 30));
        let url = surface.to_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let decoded = decode_data_url(&url).unwrap();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_rejects_non_data_url() {
        assert!(matches!(decode_data_url("http://example.com/a.png"), Err(DataUrlError::NotADataUrl)));
    }
}
