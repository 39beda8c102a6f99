use std::marker::PhantomData;

use crate::cartesian::NewCartesianPoint2d;
use crate::geo::point::NewGeoPoint;
use crate::geo::projection::Projection;

/// Plate carrée in degrees: `x = longitude`, `y = latitude`.
///
/// This is how geographic layers store their coordinates, so this projection is used whenever a geographic CRS
/// takes part in a reprojection.
#[derive(Debug, Copy, Clone, Default)]
pub struct GeographicProjection<In, Out> {
    phantom_in: PhantomData<In>,
    phantom_out: PhantomData<Out>,
}

impl<In, Out> GeographicProjection<In, Out> {
    /// Creates a new instance.
    pub fn new() -> Self {
        Self {
            phantom_in: Default::default(),
            phantom_out: Default::default(),
        }
    }
}

impl<In: NewGeoPoint, Out: NewCartesianPoint2d<f64>> Projection for GeographicProjection<In, Out> {
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &In) -> Option<Out> {
        Some(Out::new(input.lon(), input.lat()))
    }

    fn unproject(&self, input: &Out) -> Option<In> {
        let (lon, lat) = (input.x(), input.y());
        if lon.is_finite() && (-90.0..=90.0).contains(&lat) {
            Some(In::latlon(lat, lon))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point2d;
    use crate::geo::point::{GeoPoint, GeoPoint2d};

    #[test]
    fn swaps_axes() {
        let projection: GeographicProjection<GeoPoint2d, Point2d> = GeographicProjection::new();
        let projected = projection.project(&GeoPoint2d::latlon(-6.0, 106.0)).unwrap();
        assert_eq!(projected, Point2d::new(106.0, -6.0));

        let back = projection.unproject(&projected).unwrap();
        assert_eq!(back.lat(), -6.0);
        assert_eq!(back.lon(), 106.0);

        assert!(projection.unproject(&Point2d::new(10.0, 95.0)).is_none());
    }
}
