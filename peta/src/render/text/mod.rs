//! Types for text rendering.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Color;

#[cfg(feature = "rustybuzz")]
mod font_provider;
#[cfg(feature = "rustybuzz")]
mod rustybuzz;

#[cfg(feature = "rustybuzz")]
pub use self::font_provider::FontProvider;
#[cfg(feature = "rustybuzz")]
pub use self::rustybuzz::RustybuzzRasterizer;

/// Style of a text label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextStyle {
    /// Preferred font families, in order. A generic sans-serif face is used if none of them is available.
    #[serde(default)]
    pub font_family: Vec<String>,
    /// Size of the font in pixels.
    pub font_size: f32,
    /// Color of the font.
    #[serde(default = "default_font_color")]
    pub font_color: Color,
    /// Alignment of label along horizontal axis.
    #[serde(default)]
    pub horizontal_alignment: HorizontalAlignment,
    /// Alignment of label along vertical axis.
    #[serde(default)]
    pub vertical_alignment: VerticalAlignment,
    /// Weight of the font.
    #[serde(default)]
    pub weight: FontWeight,
    /// Distance between baselines of consecutive lines, as a multiple of the font size.
    #[serde(default = "default_line_height")]
    pub line_height: f32,
}

fn default_font_color() -> Color {
    Color::BLACK
}

fn default_line_height() -> f32 {
    1.2
}

impl TextStyle {
    /// Creates a black, normal weight style of the given size, anchored at its bottom center.
    pub fn new(font_size: f32) -> Self {
        Self {
            font_family: vec![],
            font_size,
            font_color: default_font_color(),
            horizontal_alignment: HorizontalAlignment::default(),
            vertical_alignment: VerticalAlignment::default(),
            weight: FontWeight::default(),
            line_height: default_line_height(),
        }
    }

    /// Returns a copy of the style with bold weight.
    pub fn bold(&self) -> Self {
        Self {
            weight: FontWeight::BOLD,
            ..self.clone()
        }
    }

    /// Returns a copy of the style with the given alignment.
    pub fn aligned(&self, horizontal: HorizontalAlignment, vertical: VerticalAlignment) -> Self {
        Self {
            horizontal_alignment: horizontal,
            vertical_alignment: vertical,
            ..self.clone()
        }
    }

    /// Returns a copy of the style with the given color.
    pub fn with_color(&self, font_color: Color) -> Self {
        Self {
            font_color,
            ..self.clone()
        }
    }
}

/// Horizontal alignment.
#[derive(Default, Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub enum HorizontalAlignment {
    /// Align to left.
    Left,
    /// Align to center.
    #[default]
    Center,
    /// Align to right.
    Right,
}

/// Vertical alignment.
#[derive(Default, Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerticalAlignment {
    /// Align to top.
    Top,
    /// Align to middle.
    Middle,
    /// Align to bottom.
    #[default]
    Bottom,
}

/// Font weight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Normal font.
    pub const NORMAL: Self = FontWeight(400);
    /// Bold font.
    pub const BOLD: Self = FontWeight(700);
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Vector outline of a shaped text, in pixels relative to the anchor point.
#[derive(Debug, Clone)]
pub struct ShapedText {
    /// Glyph outlines, `None` if the text has no visible glyphs.
    pub path: Option<tiny_skia::Path>,
    /// Width of the widest line.
    pub width: f32,
    /// Height of all lines together.
    pub height: f32,
}

/// Error from text shaping.
#[derive(Debug, Error)]
pub enum TextError {
    /// No font face is available for the style.
    #[error("no font found")]
    FontNotFound,
    /// Font data could not be parsed.
    #[error("invalid font data")]
    InvalidFont,
}

/// Converts text into glyph outlines.
pub trait TextRasterizer {
    /// Shapes `text` with the given style. Lines are separated by `\n`.
    fn shape(&self, text: &str, style: &TextStyle) -> Result<ShapedText, TextError>;
}

/// Offset of the text block's top left corner from the anchor point.
pub(crate) fn block_offset(
    width: f32,
    height: f32,
    horizontal: HorizontalAlignment,
    vertical: VerticalAlignment,
) -> (f32, f32) {
    let dx = match horizontal {
        HorizontalAlignment::Left => 0.0,
        HorizontalAlignment::Center => -width / 2.0,
        HorizontalAlignment::Right => -width,
    };
    let dy = match vertical {
        VerticalAlignment::Top => 0.0,
        VerticalAlignment::Middle => -height / 2.0,
        VerticalAlignment::Bottom => -height,
    };

    (dx, dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets() {
        assert_eq!(
            block_offset(10.0, 4.0, HorizontalAlignment::Center, VerticalAlignment::Middle),
            (-5.0, -2.0)
        );
        assert_eq!(
            block_offset(10.0, 4.0, HorizontalAlignment::Right, VerticalAlignment::Bottom),
            (-10.0, -4.0)
        );
        assert_eq!(
            block_offset(10.0, 4.0, HorizontalAlignment::Left, VerticalAlignment::Top),
            (0.0, 0.0)
        );
    }

    #[test]
    fn style_from_json() {
        let style: TextStyle =
            serde_json::from_str(r##"{"font_size": 20.0, "font_color": "#FF0000"}"##).unwrap();
        assert_eq!(style.font_color, Color::RED);
        assert_eq!(style.weight, FontWeight::NORMAL);
        assert_eq!(style.line_height, 1.2);
    }
}
