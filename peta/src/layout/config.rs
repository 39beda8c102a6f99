use serde::{Deserialize, Serialize};

use crate::error::PetaError;
use crate::render::text::{HorizontalAlignment, VerticalAlignment};
use crate::render::ImageFormat;
use crate::scale_bar::ScaleBarRounding;
use crate::Color;

/// Paper size and resolution of the figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSetup {
    /// Width in inches.
    pub width_in: f64,
    /// Height in inches.
    pub height_in: f64,
    /// Dots per inch.
    pub dpi: f64,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::a4_landscape(150.0)
    }
}

impl PageSetup {
    /// A4 landscape (11.7 x 8.3 in) at the given resolution.
    pub fn a4_landscape(dpi: f64) -> Self {
        Self {
            width_in: 11.7,
            height_in: 8.3,
            dpi,
        }
    }

    /// Size of the figure in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi).round().max(0.0) as u32,
            (self.height_in * self.dpi).round().max(0.0) as u32,
        )
    }

    /// Converts typographic points (1/72 in) into pixels.
    pub fn pt_to_px(&self, points: f64) -> f64 {
        points * self.dpi / 72.0
    }
}

/// Text placed on the figure at a fractional position (`[x, y]`, origin in the bottom left corner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Text, lines separated by `\n`.
    pub text: String,
    /// Anchor position.
    pub position: [f64; 2],
    /// Font size in points.
    pub font_size_pt: f64,
    /// Bold font.
    #[serde(default)]
    pub bold: bool,
    /// Alignment of the text relative to the anchor.
    #[serde(default)]
    pub horizontal_alignment: HorizontalAlignment,
    /// Alignment of the text relative to the anchor.
    #[serde(default)]
    pub vertical_alignment: VerticalAlignment,
}

/// Dashed coordinate grid over the main map panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of lines along each axis, including the panel edges.
    pub lines: usize,
    /// Line color.
    pub color: Color,
    /// Line width in points.
    pub width_pt: f64,
    /// Length of dashes and gaps in points.
    pub dash_pt: f64,
    /// Font size of coordinate labels in points.
    pub label_size_pt: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            lines: 5,
            color: Color::GRAY.with_opacity(0.7),
            width_pt: 0.5,
            dash_pt: 3.0,
            label_size_pt: 6.0,
        }
    }
}

/// Scale bar in the main map panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleBarConfig {
    /// Start of the bar as a fraction of the panel (`[x, y]` from the bottom left corner).
    pub position: [f64; 2],
    /// Rounding of the bar length.
    pub rounding: ScaleBarRounding,
    /// Bar width in points.
    pub width_pt: f64,
    /// Font size of labels in points.
    pub label_size_pt: f64,
    /// Distance between the bar and its labels as a fraction of the panel height.
    pub label_offset: f64,
}

impl Default for ScaleBarConfig {
    fn default() -> Self {
        Self {
            position: [0.1, 0.05],
            rounding: ScaleBarRounding::default(),
            width_pt: 3.0,
            label_size_pt: 8.0,
            label_offset: 0.02,
        }
    }
}

/// How a legend entry draws its key.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegendKind {
    /// Filled rectangle.
    #[default]
    Fill,
    /// Horizontal line.
    Line,
    /// Circle.
    Point,
}

/// One entry of a legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    /// Text of the entry.
    pub label: String,
    /// Color of the key.
    pub color: Color,
    /// Shape of the key.
    #[serde(default)]
    pub kind: LegendKind,
}

impl LegendItem {
    /// Entry with a filled rectangle key.
    pub fn fill(label: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            color,
            kind: LegendKind::Fill,
        }
    }

    /// Entry with a line key.
    pub fn line(label: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            color,
            kind: LegendKind::Line,
        }
    }
}

/// Legend box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    /// Heading above the entries.
    pub title: Option<String>,
    /// Entries, top to bottom.
    pub items: Vec<LegendItem>,
    /// Font size in points.
    pub font_size_pt: f64,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            title: None,
            items: vec![
                LegendItem::fill("Rekomendasi KKPRL", Color::GREEN),
                LegendItem::fill("Area Pemanfaatan Lain", Color::ORANGE),
                LegendItem::fill("Rencana Terminal Khusus", Color::BLACK),
            ],
            font_size_pt: 8.0,
        }
    }
}

/// Locator map showing the data within its country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsetConfig {
    /// Panel as `[left, bottom, width, height]` figure fractions.
    pub panel: [f64; 4],
    /// Country name to look up in the boundary dataset.
    pub country: String,
    /// Fill of the country outline.
    pub country_color: Color,
    /// Color of the data layer.
    pub layer_color: Color,
}

impl Default for InsetConfig {
    fn default() -> Self {
        Self {
            panel: [0.75, 0.7, 0.2, 0.2],
            country: "Indonesia".into(),
            country_color: Color::LIGHT_GRAY,
            layer_color: Color::RED,
        }
    }
}

/// Layout of the official recommendation map.
///
/// All panels are given as `[left, bottom, width, height]` fractions of the figure, positions as `[x, y]` fractions,
/// both with the origin in the bottom left corner. Sizes of lines and fonts are in points and scale with the page DPI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Paper.
    pub page: PageSetup,
    /// Main map panel.
    pub main_panel: [f64; 4],
    /// Margin around the data in the main panel, as a fraction of the data extent.
    pub padding: f64,
    /// Opacity of the feature fill.
    pub feature_opacity: f32,
    /// Outline color of features.
    pub feature_stroke: Color,
    /// Coordinate grid, `None` to skip.
    pub grid: Option<GridConfig>,
    /// Scale bar, `None` to skip.
    pub scale_bar: Option<ScaleBarConfig>,
    /// Title.
    pub title: TextBlock,
    /// Legend panel.
    pub legend_panel: [f64; 4],
    /// Legend content.
    pub legend: LegendConfig,
    /// Locator map, `None` to skip.
    pub inset: Option<InsetConfig>,
    /// Whether the logo is drawn.
    pub include_logo: bool,
    /// Box the logo is fitted into.
    pub logo_panel: [f64; 4],
    /// Footer with data sources.
    pub footer: TextBlock,
    /// Width of the figure border in points.
    pub border_width_pt: f64,
    /// Preferred font families.
    pub font_family: Vec<String>,
    /// Output encoding.
    pub format: ImageFormat,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page: PageSetup::default(),
            main_panel: [0.05, 0.25, 0.65, 0.65],
            padding: 0.05,
            feature_opacity: 0.6,
            feature_stroke: Color::BLACK,
            grid: Some(GridConfig::default()),
            scale_bar: Some(ScaleBarConfig::default()),
            title: TextBlock {
                text: "REKOMENDASI PERSUTUJUAN\nKESESUAIAN KEGIATAN PEMANFAATAN RUANG LAUT".into(),
                position: [0.5, 0.93],
                font_size_pt: 14.0,
                bold: true,
                horizontal_alignment: HorizontalAlignment::Center,
                vertical_alignment: VerticalAlignment::Middle,
            },
            legend_panel: [0.75, 0.25, 0.2, 0.4],
            legend: LegendConfig::default(),
            inset: Some(InsetConfig::default()),
            include_logo: true,
            logo_panel: [0.01, 0.84, 0.08, 0.12],
            footer: TextBlock {
                text: "Sumber Data: Kementerian Kelautan dan Perikanan\nSistem Informasi KKPRL".into(),
                position: [0.05, 0.05],
                font_size_pt: 7.0,
                bold: false,
                horizontal_alignment: HorizontalAlignment::Left,
                vertical_alignment: VerticalAlignment::Bottom,
            },
            border_width_pt: 2.0,
            font_family: vec![
                "DejaVu Sans".into(),
                "Liberation Sans".into(),
                "Arial".into(),
            ],
            format: ImageFormat::default(),
        }
    }
}

impl LayoutConfig {
    /// Reads a configuration from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, PetaError> {
        Ok(serde_json::from_str(json)?)
    }
}
