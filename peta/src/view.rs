use nalgebra::{Matrix3, Point2, Scale2, Translation2};
use peta_types::cartesian::{CartesianPoint2d, Point2d, Rect, Size};

/// Part of the map shown in a map panel.
///
/// The view is given by the map coordinates of the panel center, the resolution (map units per pixel) and the panel
/// size in pixels. Screen coordinates are relative to the top left corner of the panel with `y` pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    position: Point2d,
    resolution: f64,
    size: Size,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            position: Point2d::origin(),
            resolution: 1.0,
            size: Size::new(0.0, 0.0),
        }
    }
}

impl MapView {
    /// Creates a view centered at `position` with the given resolution.
    pub fn new(position: impl CartesianPoint2d<Num = f64>, resolution: f64) -> Self {
        Self {
            position: Point2d::new(position.x(), position.y()),
            resolution,
            ..Default::default()
        }
    }

    /// Creates a view of the given size that shows the whole `extent` with a margin of `padding` (fraction of the
    /// extent size) on every side.
    ///
    /// A degenerate extent (single point) gets a one unit wide neighborhood. Returns `None` for an empty panel or a
    /// non-finite extent.
    pub fn fit(extent: Rect, size: Size, padding: f64) -> Option<Self> {
        if size.is_zero() || size.width() < 0.0 || size.height() < 0.0 {
            return None;
        }

        let aspect = size.width() / size.height();
        let padded = extent.magnify(1.0 + 2.0 * padding.max(0.0));
        let fitted = padded.fit_aspect(aspect);
        let resolution = fitted.width() / size.width();

        if !resolution.is_finite() || resolution <= 0.0 {
            return None;
        }

        Some(Self {
            position: fitted.center(),
            resolution,
            size,
        })
    }

    /// Map coordinates of the panel center.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// Map units per pixel.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Panel size in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns a copy of the view with the given panel size.
    pub fn with_size(&self, new_size: Size) -> Self {
        Self {
            size: new_size,
            ..*self
        }
    }

    /// Returns a copy of the view with the given resolution.
    pub fn with_resolution(&self, resolution: f64) -> Self {
        Self {
            resolution,
            ..*self
        }
    }

    /// Map area visible in the panel.
    pub fn get_bbox(&self) -> Rect {
        let half_width = self.size.width() / 2.0 * self.resolution;
        let half_height = self.size.height() / 2.0 * self.resolution;
        Rect::new(
            self.position.x - half_width,
            self.position.y - half_height,
            self.position.x + half_width,
            self.position.y + half_height,
        )
    }

    fn map_to_screen_transform(&self) -> Matrix3<f64> {
        let to_center = Translation2::new(-self.position.x, -self.position.y).to_homogeneous();
        let scale = Scale2::new(1.0 / self.resolution, -1.0 / self.resolution).to_homogeneous();
        let to_corner =
            Translation2::new(self.size.width() / 2.0, self.size.height() / 2.0).to_homogeneous();

        to_corner * scale * to_center
    }

    /// Converts a point in map coordinates into panel pixel coordinates.
    pub fn map_to_screen(&self, point: &impl CartesianPoint2d<Num = f64>) -> Point2d {
        let transformed = self
            .map_to_screen_transform()
            .transform_point(&Point2::new(point.x(), point.y()));
        Point2d::new(transformed.x, transformed.y)
    }

    /// Converts a point in panel pixel coordinates into map coordinates.
    pub fn screen_to_map(&self, px_position: Point2d) -> Point2d {
        let x = self.position.x + (px_position.x - self.size.width() / 2.0) * self.resolution;
        let y = self.position.y + (self.size.height() / 2.0 - px_position.y) * self.resolution;
        Point2d::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn screen_to_map_size() {
        let view = MapView::default().with_size(Size::new(200.0, 50.0));

        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(0.0, 0.0)),
            Point2d::new(-100.0, 25.0),
            epsilon = 0.0001,
        );
        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(25.0, 49.0)),
            Point2d::new(-75.0, -24.0),
            epsilon = 0.0001,
        );
    }

    #[test]
    fn map_to_screen_is_inverse() {
        let view = MapView::new(Point2d::new(1000.0, -500.0), 2.5).with_size(Size::new(300.0, 200.0));
        let screen = Point2d::new(12.0, 150.0);
        let map = view.screen_to_map(screen);

        assert_abs_diff_eq!(view.map_to_screen(&map), screen, epsilon = 1e-9);
        assert_abs_diff_eq!(
            view.map_to_screen(&view.position()),
            Point2d::new(150.0, 100.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn fit_keeps_aspect() {
        let extent = Rect::new(0.0, 0.0, 100.0, 10.0);
        let view = MapView::fit(extent, Size::new(200.0, 100.0), 0.05).unwrap();

        assert_abs_diff_eq!(view.resolution(), 110.0 / 200.0, epsilon = 1e-9);
        let bbox = view.get_bbox();
        assert_abs_diff_eq!(bbox.width(), 110.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bbox.height(), 55.0, epsilon = 1e-9);
        assert!(bbox.contains(&Point2d::new(0.0, 0.0)));
        assert!(bbox.contains(&Point2d::new(100.0, 10.0)));
    }

    #[test]
    fn fit_point_extent() {
        let extent = Rect::new(5.0, 5.0, 5.0, 5.0);
        let view = MapView::fit(extent, Size::new(100.0, 100.0), 0.05).unwrap();
        assert!(view.resolution() > 0.0);
        assert_abs_diff_eq!(view.position(), Point2d::new(5.0, 5.0), epsilon = 1e-9);

        assert!(MapView::fit(extent, Size::new(0.0, 100.0), 0.05).is_none());
    }
}
