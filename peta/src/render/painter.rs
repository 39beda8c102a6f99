use peta_types::cartesian::{Point2d, Rect, Size};
use peta_types::Polygon;

use super::{Canvas, ClipMask, LinePaint, PolygonPaint};
use crate::decoded_image::DecodedImage;
use crate::view::MapView;
use crate::Color;

/// Draws map geometries into one panel of a canvas.
///
/// Map coordinates are converted with the panel's [`MapView`], offset to the panel position on the canvas and
/// clipped to the panel rectangle.
pub struct MapPainter<'a> {
    canvas: &'a mut Canvas,
    view: MapView,
    panel: Rect,
    clip: Option<ClipMask>,
}

impl<'a> MapPainter<'a> {
    /// Creates a painter for the panel occupying `panel` (canvas pixels). The view size is set to the panel size.
    pub fn new(canvas: &'a mut Canvas, view: MapView, panel: Rect) -> Self {
        let clip = canvas.clip_mask(panel);
        Self {
            canvas,
            view: view.with_size(Size::new(panel.width(), panel.height())),
            panel,
            clip,
        }
    }

    /// View of the panel.
    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Panel rectangle in canvas pixels.
    pub fn panel(&self) -> Rect {
        self.panel
    }

    /// Canvas the painter draws to. Drawing directly on it is not clipped.
    pub fn canvas(&mut self) -> &mut Canvas {
        &mut *self.canvas
    }

    /// Canvas pixel position of a point in map coordinates.
    pub fn to_screen(&self, point: &Point2d) -> Point2d {
        let local = self.view.map_to_screen(point);
        Point2d::new(local.x + self.panel.x_min(), local.y + self.panel.y_min())
    }

    /// Fills a polygon given in map coordinates.
    pub fn polygon(&mut self, polygon: &Polygon<Point2d>, paint: &PolygonPaint) {
        let rings: Vec<Vec<Point2d>> = polygon
            .iter_contours()
            .map(|contour| contour.iter_points().map(|p| self.to_screen(p)).collect())
            .collect();
        self.canvas.draw_polygon(&rings, paint, self.clip.as_ref());
    }

    /// Draws a line given in map coordinates.
    pub fn line<'p>(
        &mut self,
        points: impl IntoIterator<Item = &'p Point2d>,
        closed: bool,
        paint: &LinePaint,
    ) {
        let points: Vec<Point2d> = points.into_iter().map(|p| self.to_screen(p)).collect();
        self.canvas
            .draw_line(&points, closed, paint, self.clip.as_ref());
    }

    /// Draws a circle of `radius` pixels around a point given in map coordinates.
    pub fn point(&mut self, point: &Point2d, radius: f64, color: Color) {
        let center = self.to_screen(point);
        self.canvas
            .draw_circle(center, radius, color, self.clip.as_ref());
    }

    /// Draws an image covering `bbox` (map coordinates).
    pub fn image(&mut self, image: &DecodedImage, bbox: Rect) {
        let top_left = self.to_screen(&Point2d::new(bbox.x_min(), bbox.y_max()));
        let bottom_right = self.to_screen(&Point2d::new(bbox.x_max(), bbox.y_min()));
        self.canvas.draw_image(
            image,
            Rect::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y),
            self.clip.as_ref(),
        );
    }
}
