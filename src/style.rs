use egui::Color32;
use serde::{Deserialize, Serialize};

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional)
pub fn parse_hex(hex: &str) -> Option<Color32> {
    let digits = hex.trim().trim_start_matches('#');
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => digits.to_string(),
        _ => return None,
    };

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    let (r, g, b) = (channel(0)?, channel(2)?, channel(4)?);
    let a = if expanded.len() == 8 { channel(6)? } else { 255 };
    Some(Color32::from_rgba_unmultiplied(r, g, b, a))
}

/// Hex color with an explicit alpha in `0.0..=1.0`; invalid input gives black
pub fn hex_to_rgba(hex: &str, alpha: f32) -> Color32 {
    let [r, g, b, _] = parse_hex(hex)
        .unwrap_or(Color32::BLACK)
        .to_srgba_unmultiplied();
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// `#rrggbb` for opaque colors, `#rrggbbaa` otherwise
pub fn to_hex(color: Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    if a == 255 {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

/// Serde adapter storing colors as hex strings
pub mod hex_color {
    use egui::Color32;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_hex(*color))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color32, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_hex(&text).ok_or_else(|| D::Error::custom(format!("invalid color '{text}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillKind {
    #[default]
    Solid,
    Linear,
    Radial,
    Pattern,
}

impl FillKind {
    pub const ALL: [FillKind; 4] = [FillKind::Solid, FillKind::Linear, FillKind::Radial, FillKind::Pattern];

    pub fn as_str(&self) -> &'static str {
        match self {
            FillKind::Solid => "Solid",
            FillKind::Linear => "Linear",
            FillKind::Radial => "Radial",
            FillKind::Pattern => "Pattern",
        }
    }

    pub fn uses_gradient(&self) -> bool {
        matches!(self, FillKind::Linear | FillKind::Radial)
    }
}

/// Stroke and fill attributes carried by every shape.
///
/// This is self-contained: rendering a shape never consults editor-wide
/// defaults, only the shape's own style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    #[serde(with = "hex_color")]
    pub stroke_color: Color32,
    pub stroke_width: f32,
    #[serde(rename = "isFilled")]
    pub filled: bool,
    #[serde(rename = "fillType")]
    pub fill_kind: FillKind,
    #[serde(with = "hex_color")]
    pub fill_color: Color32,
    #[serde(with = "hex_color")]
    pub gradient_color_1: Color32,
    #[serde(with = "hex_color")]
    pub gradient_color_2: Color32,
    pub pattern_name: Option<String>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: Color32::BLACK,
            stroke_width: 5.0,
            filled: false,
            fill_kind: FillKind::Solid,
            fill_color: Color32::BLACK,
            gradient_color_1: Color32::WHITE,
            gradient_color_2: Color32::BLACK,
            pattern_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub const ALL: [TextAlign; 3] = [TextAlign::Left, TextAlign::Center, TextAlign::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "Left",
            TextAlign::Center => "Center",
            TextAlign::Right => "Right",
        }
    }

    /// Horizontal offset of a line of `width` relative to its anchor
    pub fn offset(&self, width: f32) -> f32 {
        match self {
            TextAlign::Left => 0.0,
            TextAlign::Center => -width / 2.0,
            TextAlign::Right => -width,
        }
    }
}

pub const DEFAULT_TEXT: &str = "Your Text Here";
pub const DEFAULT_FONT_FAMILY: &str = "Roboto";
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Boolean font flags stored as CSS keywords (`"bold"`/`"normal"`)
macro_rules! css_keyword {
    ($module:ident, $keyword:literal) => {
        mod $module {
            use serde::{Deserialize, Deserializer, Serializer};

            pub fn serialize<S: Serializer>(on: &bool, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(if *on { $keyword } else { "normal" })
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
                Ok(String::deserialize(deserializer)? == $keyword)
            }
        }
    };
}

css_keyword!(font_weight, "bold");
css_keyword!(font_slant, "italic");

/// Font attributes of a text shape. Missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontStyle {
    pub font_family: String,
    pub font_size: f32,
    #[serde(rename = "fontWeight", with = "font_weight")]
    pub bold: bool,
    #[serde(rename = "fontStyle", with = "font_slant")]
    pub italic: bool,
    pub text_align: TextAlign,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            bold: false,
            italic: false,
            text_align: TextAlign::Left,
        }
    }
}

impl FontStyle {
    pub fn line_height(&self) -> f32 {
        self.font_size * 1.2
    }
}
