//! [`Geom`] enum that can hold any of the supported geometry kinds.

use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Rect};
use crate::contour::Contour;
use crate::geo::Projection;
use crate::multi::{MultiContour, MultiPoint, MultiPolygon};
use crate::polygon::Polygon;

/// Any geometry of a vector feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geom<P> {
    /// Single point.
    Point(P),
    /// Set of points.
    MultiPoint(MultiPoint<P>),
    /// Line (open contour) or ring.
    Contour(Contour<P>),
    /// Set of lines.
    MultiContour(MultiContour<P>),
    /// Polygon.
    Polygon(Polygon<P>),
    /// Set of polygons.
    MultiPolygon(MultiPolygon<P>),
}

impl<P> Geom<P> {
    /// Projects all points of the geometry. Returns `None` if any of the points cannot be projected.
    pub fn project<Proj>(&self, projection: &Proj) -> Option<Geom<Proj::OutPoint>>
    where
        Proj: Projection<InPoint = P> + ?Sized,
    {
        Some(match self {
            Geom::Point(p) => Geom::Point(projection.project(p)?),
            Geom::MultiPoint(v) => Geom::MultiPoint(v.project(projection)?),
            Geom::Contour(v) => Geom::Contour(v.project(projection)?),
            Geom::MultiContour(v) => Geom::MultiContour(v.project(projection)?),
            Geom::Polygon(v) => Geom::Polygon(v.project(projection)?),
            Geom::MultiPolygon(v) => Geom::MultiPolygon(v.project(projection)?),
        })
    }

    /// Returns true for polygons and multipolygons.
    pub fn is_polygonal(&self) -> bool {
        matches!(self, Geom::Polygon(_) | Geom::MultiPolygon(_))
    }

    /// Short name of the geometry kind, used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Geom::Point(_) => "Point",
            Geom::MultiPoint(_) => "MultiPoint",
            Geom::Contour(_) => "LineString",
            Geom::MultiContour(_) => "MultiLineString",
            Geom::Polygon(_) => "Polygon",
            Geom::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

impl<P: CartesianPoint2d<Num = f64>> Geom<P> {
    /// Bounding rectangle of the geometry. `None` for empty geometries.
    pub fn bounding_rect(&self) -> Option<Rect> {
        match self {
            Geom::Point(p) => Rect::from_points(std::iter::once(p)),
            Geom::MultiPoint(v) => v.bounding_rect(),
            Geom::Contour(v) => v.bounding_rect(),
            Geom::MultiContour(v) => v.bounding_rect(),
            Geom::Polygon(v) => v.bounding_rect(),
            Geom::MultiPolygon(v) => v.bounding_rect(),
        }
    }

    /// Returns true if the geometry is polygonal and contains the point (boundary inclusive). Always false for
    /// points and lines.
    pub fn contains_point(&self, point: &impl CartesianPoint2d<Num = f64>) -> bool {
        match self {
            Geom::Polygon(v) => v.contains_point(point),
            Geom::MultiPolygon(v) => v.contains_point(point),
            _ => false,
        }
    }
}

impl<P> From<Polygon<P>> for Geom<P> {
    fn from(value: Polygon<P>) -> Self {
        Self::Polygon(value)
    }
}

impl<P> From<MultiPolygon<P>> for Geom<P> {
    fn from(value: MultiPolygon<P>) -> Self {
        Self::MultiPolygon(value)
    }
}

impl<P> From<Contour<P>> for Geom<P> {
    fn from(value: Contour<P>) -> Self {
        Self::Contour(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point2d;
    use crate::contour::ClosedContour;

    #[test]
    fn bounding_rect_of_multipolygon() {
        let a = Polygon::new(
            ClosedContour::new(vec![
                Point2d::new(0.0, 0.0),
                Point2d::new(1.0, 0.0),
                Point2d::new(1.0, 1.0),
            ]),
            vec![],
        );
        let b = Polygon::new(
            ClosedContour::new(vec![
                Point2d::new(5.0, 5.0),
                Point2d::new(6.0, 5.0),
                Point2d::new(6.0, 7.0),
            ]),
            vec![],
        );
        let geom: Geom<Point2d> = MultiPolygon::from(vec![a, b]).into();

        assert_eq!(geom.bounding_rect(), Some(Rect::new(0.0, 0.0, 6.0, 7.0)));
        assert!(geom.is_polygonal());
        assert!(geom.contains_point(&Point2d::new(5.5, 5.5)));
        assert!(!geom.contains_point(&Point2d::new(3.0, 3.0)));
    }

    #[test]
    fn lines_contain_nothing() {
        let geom: Geom<Point2d> =
            Contour::open(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0)]).into();
        assert!(!geom.contains_point(&Point2d::new(0.5, 0.5)));
    }
}
