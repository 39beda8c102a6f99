use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Rect};
use crate::contour::ClosedContour;
use crate::geo::Projection;
use crate::segment::Segment;

/// Polygon geometry: one outer ring and zero or more holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon<P> {
    /// Outer ring.
    pub outer_contour: ClosedContour<P>,
    /// Holes.
    pub inner_contours: Vec<ClosedContour<P>>,
}

impl<P> Polygon<P> {
    /// Creates a new polygon.
    pub fn new(outer_contour: ClosedContour<P>, inner_contours: Vec<ClosedContour<P>>) -> Self {
        Self {
            outer_contour,
            inner_contours,
        }
    }

    /// Iterates over all rings, the outer one first.
    pub fn iter_contours(&self) -> impl Iterator<Item = &ClosedContour<P>> {
        std::iter::once(&self.outer_contour).chain(self.inner_contours.iter())
    }

    /// Iterates over segments of all rings.
    pub fn iter_segments(&self) -> impl Iterator<Item = Segment<'_, P>> {
        self.iter_contours().flat_map(|c| c.iter_segments())
    }

    /// Projects every ring with the given `projection`.
    pub fn project<Proj>(&self, projection: &Proj) -> Option<Polygon<Proj::OutPoint>>
    where
        Proj: Projection<InPoint = P> + ?Sized,
    {
        Some(Polygon {
            outer_contour: self.outer_contour.project(projection)?,
            inner_contours: self
                .inner_contours
                .iter()
                .map(|c| c.project(projection))
                .collect::<Option<Vec<_>>>()?,
        })
    }
}

impl<P: CartesianPoint2d<Num = f64>> Polygon<P> {
    /// Returns true if the `point` lies inside the polygon or on any of its rings.
    ///
    /// Points on the boundary (outer ring or hole ring, vertices included) are considered inside. Points strictly
    /// inside a hole are outside. The interior test is even-odd ray casting over all rings.
    pub fn contains_point(&self, point: &impl CartesianPoint2d<Num = f64>) -> bool {
        if self.iter_segments().any(|s| s.contains_point(point)) {
            return true;
        }

        let x = point.x();
        let y = point.y();
        let mut inside = false;

        for Segment(a, b) in self.iter_segments() {
            if (a.y() > y) != (b.y() > y) {
                let x_cross = a.x() + (y - a.y()) * (b.x() - a.x()) / (b.y() - a.y());
                if x < x_cross {
                    inside = !inside;
                }
            }
        }

        inside
    }

    /// Bounding rectangle of the outer ring.
    pub fn bounding_rect(&self) -> Option<Rect> {
        self.outer_contour.bounding_rect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point2d;

    fn square(x0: f64, y0: f64, size: f64) -> ClosedContour<Point2d> {
        ClosedContour::new(vec![
            Point2d::new(x0, y0),
            Point2d::new(x0 + size, y0),
            Point2d::new(x0 + size, y0 + size),
            Point2d::new(x0, y0 + size),
        ])
    }

    #[test]
    fn contains_point_triangle() {
        let polygon = Polygon::new(
            ClosedContour::new(vec![
                Point2d::new(0.0, 0.0),
                Point2d::new(1.0, 1.0),
                Point2d::new(1.0, 0.0),
            ]),
            vec![],
        );

        assert!(polygon.contains_point(&Point2d::new(0.0, 0.0)));
        assert!(polygon.contains_point(&Point2d::new(1.0, 1.0)));
        assert!(polygon.contains_point(&Point2d::new(0.5, 0.0)));
        assert!(polygon.contains_point(&Point2d::new(0.5, 0.5)));
        assert!(polygon.contains_point(&Point2d::new(0.2, 0.1)));
        assert!(!polygon.contains_point(&Point2d::new(0.2, 0.3)));
        assert!(!polygon.contains_point(&Point2d::new(0.2, -0.3)));
        assert!(!polygon.contains_point(&Point2d::new(1.1, 0.0)));
    }

    #[test]
    fn contains_point_boundary_is_inclusive_on_every_side() {
        let polygon = Polygon::new(square(0.0, 0.0, 2.0), vec![]);

        for p in [
            Point2d::new(0.0, 1.0),
            Point2d::new(2.0, 1.0),
            Point2d::new(1.0, 0.0),
            Point2d::new(1.0, 2.0),
            Point2d::new(2.0, 2.0),
        ] {
            assert!(polygon.contains_point(&p), "{p:?} must be inside");
        }
    }

    #[test]
    fn contains_point_with_hole() {
        let polygon = Polygon::new(square(0.0, 0.0, 10.0), vec![square(4.0, 4.0, 2.0)]);

        assert!(polygon.contains_point(&Point2d::new(1.0, 1.0)));
        assert!(!polygon.contains_point(&Point2d::new(5.0, 5.0)));
        assert!(polygon.contains_point(&Point2d::new(4.0, 5.0)));
        assert!(!polygon.contains_point(&Point2d::new(11.0, 5.0)));
    }
}
