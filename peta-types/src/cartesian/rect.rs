use serde::{Deserialize, Serialize};

use super::point::{CartesianPoint2d, Point2d};

/// Axis-aligned rectangle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
}

impl Rect {
    /// Creates a new rectangle. Coordinates are reordered if the minimum is larger than the maximum.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min: x_min.min(x_max),
            y_min: y_min.min(y_max),
            x_max: x_max.max(x_min),
            y_max: y_max.max(y_min),
        }
    }

    /// Minimum X.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Minimum Y.
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Maximum X.
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Maximum Y.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Horizontal extent.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Vertical extent.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> Point2d {
        Point2d::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn merge(&self, other: Rect) -> Self {
        Self {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Bounding rectangle of the given points. Returns `None` for an empty iterator.
    pub fn from_points<'a, P: CartesianPoint2d<Num = f64> + 'a>(
        mut points: impl Iterator<Item = &'a P>,
    ) -> Option<Self> {
        let first = points.next()?;
        let mut rect = Self {
            x_min: first.x(),
            y_min: first.y(),
            x_max: first.x(),
            y_max: first.y(),
        };

        for p in points {
            rect.x_min = rect.x_min.min(p.x());
            rect.y_min = rect.y_min.min(p.y());
            rect.x_max = rect.x_max.max(p.x());
            rect.y_max = rect.y_max.max(p.y());
        }

        Some(rect)
    }

    /// Returns true if the point is inside the rectangle or on its border.
    pub fn contains(&self, point: &impl CartesianPoint2d<Num = f64>) -> bool {
        point.x() >= self.x_min
            && point.x() <= self.x_max
            && point.y() >= self.y_min
            && point.y() <= self.y_max
    }

    /// Returns true if two rectangles have at least one common point.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x_min <= other.x_max
            && other.x_min <= self.x_max
            && self.y_min <= other.y_max
            && other.y_min <= self.y_max
    }

    /// Scales the rectangle around its center by `factor`.
    pub fn magnify(&self, factor: f64) -> Self {
        let center = self.center();
        let half_width = self.width() * factor / 2.0;
        let half_height = self.height() * factor / 2.0;
        Self::new(
            center.x - half_width,
            center.y - half_height,
            center.x + half_width,
            center.y + half_height,
        )
    }

    /// Grows the shorter side of the rectangle (around the center) so that `width / height == aspect`.
    ///
    /// Degenerate rectangles (zero width or height) get the missing side from the other one.
    pub fn fit_aspect(&self, aspect: f64) -> Self {
        let center = self.center();
        let mut width = self.width();
        let mut height = self.height();

        if width <= 0.0 && height <= 0.0 {
            width = 1.0;
            height = 1.0;
        }

        if height <= 0.0 || width / height > aspect {
            height = width / aspect;
        } else {
            width = height * aspect;
        }

        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            center.x + width / 2.0,
            center.y + height / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalizes_bounds() {
        let rect = Rect::new(10.0, 5.0, 0.0, 0.0);
        assert_eq!(rect.x_min(), 0.0);
        assert_eq!(rect.x_max(), 10.0);
        assert_eq!(rect.width(), 10.0);
        assert_eq!(rect.height(), 5.0);
    }

    #[test]
    fn from_points() {
        let points = [
            Point2d::new(1.0, 2.0),
            Point2d::new(-1.0, 5.0),
            Point2d::new(3.0, 0.0),
        ];
        let rect = Rect::from_points(points.iter()).unwrap();
        assert_eq!(rect, Rect::new(-1.0, 0.0, 3.0, 5.0));
        assert!(Rect::from_points(Vec::<Point2d>::new().iter()).is_none());
    }

    #[test]
    fn fit_aspect_keeps_center() {
        let rect = Rect::new(0.0, 0.0, 10.0, 2.0).fit_aspect(2.0);
        assert_relative_eq!(rect.width(), 10.0);
        assert_relative_eq!(rect.height(), 5.0);
        assert_relative_eq!(rect.center().y, 1.0);

        let rect = Rect::new(0.0, 0.0, 2.0, 10.0).fit_aspect(2.0);
        assert_relative_eq!(rect.width(), 20.0);
        assert_relative_eq!(rect.height(), 10.0);

        let point = Rect::new(3.0, 3.0, 3.0, 3.0).fit_aspect(1.0);
        assert!(point.width() > 0.0);
    }

    #[test]
    fn contains_and_intersects() {
        let rect = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert!(rect.contains(&Point2d::new(1.0, 0.5)));
        assert!(!rect.contains(&Point2d::new(1.1, 0.5)));
        assert!(rect.intersects(&Rect::new(1.0, 1.0, 2.0, 2.0)));
        assert!(!rect.intersects(&Rect::new(1.5, 1.0, 2.0, 2.0)));
    }
}
