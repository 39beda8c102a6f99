//! Contour is a sequence of points.
//!
//! A contour is **open** when its first and last points are not connected (a road, a coastline segment) and
//! **closed** otherwise (a polygon ring). Unlike an OGC `LineString`, a closed contour does not repeat its first
//! point at the end: the closing segment is produced by [`Contour::iter_segments`] instead.

use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Rect};
use crate::geo::Projection;
use crate::segment::Segment;

/// Sequence of points, open or closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour<P> {
    points: Vec<P>,
    is_closed: bool,
}

/// Closed sequence of points, used as polygon rings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedContour<P> {
    points: Vec<P>,
}

impl<P> Contour<P> {
    /// Creates a new contour.
    pub fn new(points: Vec<P>, is_closed: bool) -> Self {
        Self { points, is_closed }
    }

    /// Creates an open contour.
    pub fn open(points: Vec<P>) -> Self {
        Self::new(points, false)
    }

    /// Whether the last point is connected to the first one.
    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    /// Iterates over the points of the contour, without repeating the first point for closed contours.
    pub fn iter_points(&self) -> impl Iterator<Item = &P> {
        self.points.iter()
    }

    /// Same as [`Contour::iter_points`], but repeats the first point at the end for closed contours.
    pub fn iter_points_closing(&self) -> impl Iterator<Item = &P> {
        let closing = if self.is_closed {
            self.points.first()
        } else {
            None
        };
        self.points.iter().chain(closing)
    }

    /// Iterates over the segments of the contour, including the closing one for closed contours.
    pub fn iter_segments(&self) -> impl Iterator<Item = Segment<'_, P>> {
        self.iter_points_closing()
            .zip(self.iter_points_closing().skip(1))
            .map(|(a, b)| Segment(a, b))
    }

    /// Number of points in the contour.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the contour has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Converts the contour into a closed one. Returns `None` if the contour is open.
    pub fn into_closed(self) -> Option<ClosedContour<P>> {
        if self.is_closed {
            Some(ClosedContour {
                points: self.points,
            })
        } else {
            None
        }
    }

    /// Projects every point with the given `projection`.
    pub fn project<Proj>(&self, projection: &Proj) -> Option<Contour<Proj::OutPoint>>
    where
        Proj: Projection<InPoint = P> + ?Sized,
    {
        Some(Contour {
            points: project_points(&self.points, projection)?,
            is_closed: self.is_closed,
        })
    }
}

impl<P: PartialEq> Contour<P> {
    /// Creates a contour from an OGC-style point list: the contour is closed if the first and the last points are
    /// equal, in which case the duplicated last point is dropped.
    pub fn from_line_string(mut points: Vec<P>) -> Self {
        let is_closed = points.len() > 2 && points.first() == points.last();
        if is_closed {
            points.pop();
        }

        Self { points, is_closed }
    }
}

impl<P: CartesianPoint2d<Num = f64>> Contour<P> {
    /// Bounding rectangle of the contour.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::from_points(self.points.iter())
    }
}

impl<P> ClosedContour<P> {
    /// Creates a new closed contour. The first point must not be repeated at the end.
    pub fn new(points: Vec<P>) -> Self {
        Self { points }
    }

    /// Iterates over the points of the ring, without repeating the first one.
    pub fn iter_points(&self) -> impl Iterator<Item = &P> {
        self.points.iter()
    }

    /// Iterates over the points of the ring, repeating the first point at the end.
    pub fn iter_points_closing(&self) -> impl Iterator<Item = &P> {
        self.points.iter().chain(self.points.first())
    }

    /// Iterates over all segments of the ring, including the closing one.
    pub fn iter_segments(&self) -> impl Iterator<Item = Segment<'_, P>> {
        self.iter_points_closing()
            .zip(self.iter_points_closing().skip(1))
            .map(|(a, b)| Segment(a, b))
    }

    /// Number of distinct points of the ring.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the ring has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Projects every point with the given `projection`.
    pub fn project<Proj>(&self, projection: &Proj) -> Option<ClosedContour<Proj::OutPoint>>
    where
        Proj: Projection<InPoint = P> + ?Sized,
    {
        Some(ClosedContour {
            points: project_points(&self.points, projection)?,
        })
    }
}

impl<P: PartialEq> ClosedContour<P> {
    /// Creates a ring from an OGC-style point list, dropping the repeated closing point if present.
    pub fn from_ring(mut points: Vec<P>) -> Self {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }

        Self { points }
    }
}

impl<P: CartesianPoint2d<Num = f64>> ClosedContour<P> {
    /// Bounding rectangle of the ring.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::from_points(self.points.iter())
    }
}

impl<P> From<ClosedContour<P>> for Contour<P> {
    fn from(value: ClosedContour<P>) -> Self {
        Self {
            points: value.points,
            is_closed: true,
        }
    }
}

pub(crate) fn project_points<P, Proj>(
    points: &[P],
    projection: &Proj,
) -> Option<Vec<Proj::OutPoint>>
where
    Proj: Projection<InPoint = P> + ?Sized,
{
    points.iter().map(|p| projection.project(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point2d;

    #[test]
    fn iter_points_closing() {
        let contour = Contour::open(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0)]);
        assert_eq!(contour.iter_points_closing().count(), 2);

        let contour = ClosedContour::new(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0)]);
        assert_eq!(contour.iter_points_closing().count(), 3);
        assert_eq!(
            *contour.iter_points_closing().last().unwrap(),
            Point2d::new(0.0, 0.0)
        );
    }

    #[test]
    fn iter_segments() {
        let contour = Contour::open(vec![Point2d::new(0.0, 0.0)]);
        assert_eq!(contour.iter_segments().count(), 0);

        let contour = Contour::open(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0)]);
        assert_eq!(contour.iter_segments().count(), 1);

        let ring = ClosedContour::new(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0)]);
        assert_eq!(ring.iter_segments().count(), 2);
        assert_eq!(
            ring.iter_segments().last().unwrap(),
            Segment(&Point2d::new(1.0, 1.0), &Point2d::new(0.0, 0.0))
        );
    }

    #[test]
    fn from_line_string_detects_closed() {
        let contour = Contour::from_line_string(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(1.0, 0.0),
            Point2d::new(1.0, 1.0),
            Point2d::new(0.0, 0.0),
        ]);
        assert!(contour.is_closed());
        assert_eq!(contour.len(), 3);

        let contour =
            Contour::from_line_string(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 0.0)]);
        assert!(!contour.is_closed());
    }

    #[test]
    fn from_ring_drops_closing_point() {
        let ring = ClosedContour::from_ring(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(1.0, 0.0),
            Point2d::new(0.0, 1.0),
            Point2d::new(0.0, 0.0),
        ]);
        assert_eq!(ring.len(), 3);
    }
}
