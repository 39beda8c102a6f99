use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Rect};
use crate::contour::{project_points, Contour};
use crate::geo::Projection;
use crate::polygon::Polygon;

/// Set of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPoint<P> {
    /// Points of the set.
    pub parts: Vec<P>,
}

/// Set of contours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiContour<P> {
    /// Contours of the set.
    pub parts: Vec<Contour<P>>,
}

/// Set of polygons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygon<P> {
    /// Polygons of the set.
    pub parts: Vec<Polygon<P>>,
}

impl<P> From<Vec<P>> for MultiPoint<P> {
    fn from(parts: Vec<P>) -> Self {
        Self { parts }
    }
}

impl<P> From<Vec<Contour<P>>> for MultiContour<P> {
    fn from(parts: Vec<Contour<P>>) -> Self {
        Self { parts }
    }
}

impl<P> From<Vec<Polygon<P>>> for MultiPolygon<P> {
    fn from(parts: Vec<Polygon<P>>) -> Self {
        Self { parts }
    }
}

impl<P> MultiPoint<P> {
    /// Projects every point with the given `projection`.
    pub fn project<Proj>(&self, projection: &Proj) -> Option<MultiPoint<Proj::OutPoint>>
    where
        Proj: Projection<InPoint = P> + ?Sized,
    {
        Some(MultiPoint {
            parts: project_points(&self.parts, projection)?,
        })
    }
}

impl<P> MultiContour<P> {
    /// Projects every contour with the given `projection`.
    pub fn project<Proj>(&self, projection: &Proj) -> Option<MultiContour<Proj::OutPoint>>
    where
        Proj: Projection<InPoint = P> + ?Sized,
    {
        Some(MultiContour {
            parts: self
                .parts
                .iter()
                .map(|c| c.project(projection))
                .collect::<Option<Vec<_>>>()?,
        })
    }
}

impl<P> MultiPolygon<P> {
    /// Projects every polygon with the given `projection`.
    pub fn project<Proj>(&self, projection: &Proj) -> Option<MultiPolygon<Proj::OutPoint>>
    where
        Proj: Projection<InPoint = P> + ?Sized,
    {
        Some(MultiPolygon {
            parts: self
                .parts
                .iter()
                .map(|p| p.project(projection))
                .collect::<Option<Vec<_>>>()?,
        })
    }
}

impl<P: CartesianPoint2d<Num = f64>> MultiPolygon<P> {
    /// Returns true if any of the polygons contains the point (boundary inclusive).
    pub fn contains_point(&self, point: &impl CartesianPoint2d<Num = f64>) -> bool {
        self.parts.iter().any(|p| p.contains_point(point))
    }

    /// Bounding rectangle of all polygons.
    pub fn bounding_rect(&self) -> Option<Rect> {
        merge_rects(self.parts.iter().map(|p| p.bounding_rect()))
    }
}

impl<P: CartesianPoint2d<Num = f64>> MultiContour<P> {
    /// Bounding rectangle of all contours.
    pub fn bounding_rect(&self) -> Option<Rect> {
        merge_rects(self.parts.iter().map(|c| c.bounding_rect()))
    }
}

impl<P: CartesianPoint2d<Num = f64>> MultiPoint<P> {
    /// Bounding rectangle of all points.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::from_points(self.parts.iter())
    }
}

pub(crate) fn merge_rects(rects: impl Iterator<Item = Option<Rect>>) -> Option<Rect> {
    rects
        .flatten()
        .fold(None, |acc: Option<Rect>, r| match acc {
            Some(acc) => Some(acc.merge(r)),
            None => Some(r),
        })
}
