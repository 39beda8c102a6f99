//! Composition of a printable map figure: panels, decorations and text on one page.
//!
//! A [`MapComposition`] owns the page canvas. Panels are placed by `[left, bottom, width, height]` fractions of the
//! page, the same way figure axes are placed in plotting libraries, and converted into pixel rectangles with the
//! origin in the top left corner.

use log::debug;
use peta_types::cartesian::{Point2d, Rect, Size};

use crate::error::PetaError;
use crate::layer::{Feature, VectorLayer};
use crate::render::text::{TextRasterizer, TextStyle};
use crate::render::{Canvas, ImageFormat, LinePaint, MapPainter};
use crate::symbol::Symbol;
use crate::view::MapView;
use crate::Color;

mod config;
pub mod decorations;

pub use config::{
    GridConfig, InsetConfig, LayoutConfig, LegendConfig, LegendItem, LegendKind, PageSetup,
    ScaleBarConfig, TextBlock,
};

/// Named rectangle of the page, in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    /// Name of the panel.
    pub name: String,
    /// Position on the page.
    pub rect: Rect,
}

/// Page being composed: the canvas and the panels laid out on it so far.
pub struct MapComposition {
    canvas: Canvas,
    page: PageSetup,
    font_family: Vec<String>,
    panels: Vec<Panel>,
}

impl MapComposition {
    /// Creates a white page.
    pub fn new(
        page: PageSetup,
        text_rasterizer: Option<Box<dyn TextRasterizer>>,
    ) -> Result<Self, PetaError> {
        let (width, height) = page.pixel_size();
        let mut canvas = Canvas::new(width, height)?;
        canvas.clear(Color::WHITE);
        if let Some(rasterizer) = text_rasterizer {
            canvas = canvas.with_text_rasterizer(rasterizer);
        }

        debug!("Created {width}x{height} page at {} dpi", page.dpi);

        Ok(Self {
            canvas,
            page,
            font_family: vec![],
            panels: vec![],
        })
    }

    /// Sets the preferred font families for all text of the page.
    pub fn with_font_family(mut self, font_family: Vec<String>) -> Self {
        self.font_family = font_family;
        self
    }

    /// Page setup.
    pub fn page(&self) -> &PageSetup {
        &self.page
    }

    /// Panels added so far.
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Pixel rectangle of the panel with the given name.
    pub fn panel(&self, name: &str) -> Option<Rect> {
        self.panels.iter().find(|p| p.name == name).map(|p| p.rect)
    }

    /// Canvas of the page.
    pub fn canvas(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Converts a `[left, bottom, width, height]` page fraction into a pixel rectangle.
    pub fn rect(&self, fraction: [f64; 4]) -> Rect {
        let [left, bottom, width, height] = fraction;
        let size = self.canvas.size();
        Rect::new(
            left * size.width(),
            (1.0 - bottom - height) * size.height(),
            (left + width) * size.width(),
            (1.0 - bottom) * size.height(),
        )
    }

    /// Converts an `[x, y]` page fraction into a pixel position.
    pub fn point(&self, fraction: [f64; 2]) -> Point2d {
        let size = self.canvas.size();
        Point2d::new(fraction[0] * size.width(), (1.0 - fraction[1]) * size.height())
    }

    /// Converts points into pixels.
    pub fn pt(&self, points: f64) -> f64 {
        self.page.pt_to_px(points)
    }

    /// Text style with the page fonts and the given size in points.
    pub fn text_style(&self, size_pt: f64) -> TextStyle {
        TextStyle {
            font_family: self.font_family.clone(),
            ..TextStyle::new(self.pt(size_pt) as f32)
        }
    }

    /// Registers a panel and returns its pixel rectangle.
    pub fn add_panel(&mut self, name: &str, fraction: [f64; 4]) -> Rect {
        let rect = self.rect(fraction);
        self.add_panel_rect(name, rect);
        rect
    }

    /// Registers a panel given in pixels.
    pub fn add_panel_rect(&mut self, name: &str, rect: Rect) {
        self.panels.push(Panel {
            name: name.to_string(),
            rect,
        });
    }

    /// Registers a map panel showing `extent` (map units) with the given padding and returns a painter for it.
    ///
    /// Fails with [`PetaError::Geometry`] if the extent cannot be shown (e.g. it is not finite).
    pub fn add_map_panel(
        &mut self,
        name: &str,
        fraction: [f64; 4],
        extent: Rect,
        padding: f64,
    ) -> Result<MapPainter<'_>, PetaError> {
        let rect = self.add_panel(name, fraction);
        let view = MapView::fit(extent, Size::new(rect.width(), rect.height()), padding)
            .ok_or_else(|| {
                PetaError::Geometry(format!(
                    "cannot fit map extent {extent:?} into panel '{name}'"
                ))
            })?;

        Ok(MapPainter::new(&mut self.canvas, view, rect))
    }

    /// Draws a text block.
    pub fn draw_text_block(&mut self, block: &TextBlock) -> Option<Rect> {
        let mut style = self.text_style(block.font_size_pt).aligned(
            block.horizontal_alignment,
            block.vertical_alignment,
        );
        if block.bold {
            style = style.bold();
        }

        let position = self.point(block.position);
        self.canvas.draw_text(&block.text, position, &style)
    }

    /// Draws a rectangle around the whole page, inside its edges.
    pub fn draw_border(&mut self, color: Color, width_pt: f64) {
        let width = self.pt(width_pt);
        let size = self.canvas.size();
        let half = width / 2.0;
        self.canvas.stroke_rect(
            Rect::new(half, half, size.width() - half, size.height() - half),
            &LinePaint::solid(color, width),
        );
    }

    /// Encodes the page.
    pub fn encode(&self, format: ImageFormat) -> Result<Vec<u8>, PetaError> {
        self.canvas.encode(format)
    }
}

/// Draws all features of the layer with the symbol. The painter view must be in the layer CRS.
pub fn draw_features(painter: &mut MapPainter, layer: &VectorLayer, symbol: &impl Symbol<Feature>) {
    for (index, feature) in layer.features().iter().enumerate() {
        symbol.render(index, feature, &feature.geometry, painter);
    }
}

/// Creates the text rasterizer for a page: system fonts plus the given font files.
#[cfg(feature = "rustybuzz")]
pub fn text_rasterizer(
    fonts: &[Vec<u8>],
    system_fonts: bool,
) -> Option<Box<dyn TextRasterizer>> {
    use crate::render::text::{FontProvider, RustybuzzRasterizer};

    let mut provider = if system_fonts {
        FontProvider::system()
    } else {
        FontProvider::empty()
    };
    for font in fonts {
        provider.load_font_data(font.clone());
    }

    Some(Box::new(RustybuzzRasterizer::new(provider)))
}

/// Text rendering is not available without the `rustybuzz` feature.
#[cfg(not(feature = "rustybuzz"))]
pub fn text_rasterizer(
    _fonts: &[Vec<u8>],
    _system_fonts: bool,
) -> Option<Box<dyn TextRasterizer>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SimplePolygonSymbol;
    use approx::assert_abs_diff_eq;
    use peta_types::{ClosedContour, Polygon};

    fn small_page() -> PageSetup {
        PageSetup {
            width_in: 2.0,
            height_in: 1.0,
            dpi: 100.0,
        }
    }

    #[test]
    fn fractions_to_pixels() {
        let composition = MapComposition::new(small_page(), None).unwrap();

        let rect = composition.rect([0.05, 0.25, 0.65, 0.65]);
        assert_abs_diff_eq!(rect.x_min(), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rect.y_min(), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rect.x_max(), 140.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rect.y_max(), 75.0, epsilon = 1e-9);

        let point = composition.point([0.5, 0.93]);
        assert_abs_diff_eq!(point.x, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(point.y, 7.0, epsilon = 1e-9);

        assert_abs_diff_eq!(composition.pt(7.2), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn map_panel_draws_features() {
        let mut composition = MapComposition::new(small_page(), None).unwrap();
        let polygon = Polygon::new(
            ClosedContour::new(vec![
                Point2d::new(0.0, 0.0),
                Point2d::new(10.0, 0.0),
                Point2d::new(10.0, 10.0),
                Point2d::new(0.0, 10.0),
            ]),
            vec![],
        );
        let layer = VectorLayer::new(
            vec![Feature::new(polygon.into(), Default::default())],
            None,
        );

        let extent = layer.extent().unwrap();
        let mut painter = composition
            .add_map_panel("main", [0.0, 0.0, 0.5, 1.0], extent, 0.05)
            .unwrap();
        draw_features(&mut painter, &layer, &SimplePolygonSymbol::new(Color::BLUE));

        assert_eq!(composition.canvas().pixel(50, 50), Some(Color::BLUE));
        assert_eq!(composition.canvas().pixel(150, 50), Some(Color::WHITE));
        assert_eq!(
            composition.panel("main"),
            Some(Rect::new(0.0, 0.0, 100.0, 100.0))
        );

        assert!(composition
            .add_map_panel("empty", [0.5, 0.0, 0.0, 0.0], extent, 0.05)
            .is_err());
    }

    #[test]
    fn border_is_inside_the_page() {
        let mut composition = MapComposition::new(small_page(), None).unwrap();
        composition.draw_border(Color::BLACK, 2.0);

        assert_eq!(composition.canvas().pixel(0, 50), Some(Color::BLACK));
        assert_eq!(composition.canvas().pixel(199, 50), Some(Color::BLACK));
        assert_eq!(composition.canvas().pixel(100, 50), Some(Color::WHITE));
    }
}
