//! Symbols define how features are drawn on a map panel.
//!
//! [`Symbol`] is easy to implement, so a caller may provide its own styling. A few simple implementations are
//! provided; [`CategorizedPolygonSymbol`] is the one used for uploaded layers.

use peta_types::cartesian::Point2d;
use peta_types::geometry::Geom;
use peta_types::Polygon;

use crate::color::categorical_color;
use crate::render::{LinePaint, MapPainter, PolygonPaint};
use crate::Color;

/// Symbol is used to draw a feature `F` to a map panel.
pub trait Symbol<F> {
    /// Draws the `index`-th feature of a layer with its `geometry` (in the CRS of the panel view).
    fn render(
        &self,
        index: usize,
        feature: &F,
        geometry: &Geom<Point2d>,
        painter: &mut MapPainter,
    );
}

/// Renders a polygon geometry as a filled polygon with an outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplePolygonSymbol {
    /// Color of the inner area of the polygon.
    pub fill_color: Color,
    /// Color of the outline.
    pub stroke_color: Color,
    /// Width of the outline in pixels.
    pub stroke_width: f64,
}

impl SimplePolygonSymbol {
    /// Creates a new instance without outline.
    pub fn new(fill_color: Color) -> Self {
        Self {
            fill_color,
            stroke_color: Color::TRANSPARENT,
            stroke_width: 0.0,
        }
    }

    /// Creates a new instance from a copy of the current, but with the given stroke color.
    pub fn with_stroke_color(&self, stroke_color: Color) -> Self {
        Self {
            stroke_color,
            ..*self
        }
    }

    /// Creates a new instance from a copy of the current, but with the given stroke width.
    pub fn with_stroke_width(&self, stroke_width: f64) -> Self {
        Self {
            stroke_width,
            ..*self
        }
    }

    fn render_poly(&self, polygon: &Polygon<Point2d>, painter: &mut MapPainter) {
        painter.polygon(
            polygon,
            &PolygonPaint {
                color: self.fill_color,
            },
        );

        if !self.stroke_color.is_transparent() && self.stroke_width > 0.0 {
            let paint = LinePaint::solid(self.stroke_color, self.stroke_width);
            for contour in polygon.iter_contours() {
                painter.line(contour.iter_points(), true, &paint);
            }
        }
    }
}

impl<F> Symbol<F> for SimplePolygonSymbol {
    fn render(
        &self,
        _index: usize,
        _feature: &F,
        geometry: &Geom<Point2d>,
        painter: &mut MapPainter,
    ) {
        match geometry {
            Geom::Polygon(polygon) => self.render_poly(polygon, painter),
            Geom::MultiPolygon(polygons) => polygons
                .parts
                .iter()
                .for_each(|polygon| self.render_poly(polygon, painter)),
            _ => {}
        }
    }
}

/// Renders lines.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleContourSymbol {
    /// Line paint.
    pub paint: LinePaint,
}

impl SimpleContourSymbol {
    /// Creates a solid line symbol.
    pub fn new(color: Color, width: f64) -> Self {
        Self {
            paint: LinePaint::solid(color, width),
        }
    }
}

impl<F> Symbol<F> for SimpleContourSymbol {
    fn render(
        &self,
        _index: usize,
        _feature: &F,
        geometry: &Geom<Point2d>,
        painter: &mut MapPainter,
    ) {
        match geometry {
            Geom::Contour(contour) => {
                painter.line(contour.iter_points(), contour.is_closed(), &self.paint)
            }
            Geom::MultiContour(contours) => {
                for contour in &contours.parts {
                    painter.line(contour.iter_points(), contour.is_closed(), &self.paint);
                }
            }
            _ => {}
        }
    }
}

/// Renders points as filled circles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePointSymbol {
    /// Color of the circle.
    pub color: Color,
    /// Diameter of the circle in pixels.
    pub size: f64,
}

impl CirclePointSymbol {
    /// Creates a new instance.
    pub fn new(color: Color, size: f64) -> Self {
        Self { color, size }
    }
}

impl<F> Symbol<F> for CirclePointSymbol {
    fn render(
        &self,
        _index: usize,
        _feature: &F,
        geometry: &Geom<Point2d>,
        painter: &mut MapPainter,
    ) {
        match geometry {
            Geom::Point(point) => painter.point(point, self.size / 2.0, self.color),
            Geom::MultiPoint(points) => {
                for point in &points.parts {
                    painter.point(point, self.size / 2.0, self.color);
                }
            }
            _ => {}
        }
    }
}

/// Renders any geometry: polygons, lines and points each with its own symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitraryGeometrySymbol {
    /// Symbol for polygons.
    pub polygon: SimplePolygonSymbol,
    /// Symbol for lines.
    pub contour: SimpleContourSymbol,
    /// Symbol for points.
    pub point: CirclePointSymbol,
}

impl ArbitraryGeometrySymbol {
    /// Draws every kind of geometry in one color: polygons with a translucent fill.
    pub fn single_color(color: Color) -> Self {
        Self {
            polygon: SimplePolygonSymbol::new(color.with_opacity(0.5))
                .with_stroke_color(color)
                .with_stroke_width(1.5),
            contour: SimpleContourSymbol::new(color, 2.0),
            point: CirclePointSymbol::new(color, 6.0),
        }
    }
}

impl<F> Symbol<F> for ArbitraryGeometrySymbol {
    fn render(
        &self,
        index: usize,
        feature: &F,
        geometry: &Geom<Point2d>,
        painter: &mut MapPainter,
    ) {
        match geometry {
            Geom::Polygon(_) | Geom::MultiPolygon(_) => {
                self.polygon.render(index, feature, geometry, painter)
            }
            Geom::Contour(_) | Geom::MultiContour(_) => {
                self.contour.render(index, feature, geometry, painter)
            }
            Geom::Point(_) | Geom::MultiPoint(_) => {
                self.point.render(index, feature, geometry, painter)
            }
        }
    }
}

/// Gives every feature a color from a qualitative palette by its position in the layer, drawn with a common opacity
/// and outline. Non-polygon features are drawn as lines and points in the same color.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedPolygonSymbol {
    /// Opacity of the fill, `0.0..=1.0`.
    pub opacity: f32,
    /// Color of the outline.
    pub stroke_color: Color,
    /// Width of the outline in pixels.
    pub stroke_width: f64,
}

impl Default for CategorizedPolygonSymbol {
    fn default() -> Self {
        Self {
            opacity: 0.6,
            stroke_color: Color::BLACK,
            stroke_width: 1.0,
        }
    }
}

impl CategorizedPolygonSymbol {
    /// Color of the feature with the given index.
    pub fn color(&self, index: usize) -> Color {
        categorical_color(index).with_opacity(self.opacity)
    }
}

impl<F> Symbol<F> for CategorizedPolygonSymbol {
    fn render(
        &self,
        index: usize,
        feature: &F,
        geometry: &Geom<Point2d>,
        painter: &mut MapPainter,
    ) {
        let color = self.color(index);
        let symbol = ArbitraryGeometrySymbol {
            polygon: SimplePolygonSymbol::new(color)
                .with_stroke_color(self.stroke_color)
                .with_stroke_width(self.stroke_width),
            contour: SimpleContourSymbol::new(color.with_alpha(255), 2.0),
            point: CirclePointSymbol::new(color.with_alpha(255), 6.0),
        };
        symbol.render(index, feature, geometry, painter);
    }
}
