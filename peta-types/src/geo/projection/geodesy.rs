use std::marker::PhantomData;

use geodesy::prelude::*;

use crate::cartesian::NewCartesianPoint2d;
use crate::geo::point::NewGeoPoint;
use crate::geo::projection::Projection;

/// Projection backed by a `geodesy` operator definition, e.g. `utm zone=49 south ellps=WGS84`.
pub struct GeodesyProjection<In, Out> {
    context: Minimal,
    op: OpHandle,
    phantom_in: PhantomData<In>,
    phantom_out: PhantomData<Out>,
}

impl<In, Out> GeodesyProjection<In, Out> {
    /// Creates the projection. Returns `None` if `geodesy` cannot parse the definition.
    pub fn new(definition: &str) -> Option<Self> {
        let mut context = Minimal::new();
        let op = context.op(definition).ok()?;
        Some(Self {
            context,
            op,
            phantom_in: Default::default(),
            phantom_out: Default::default(),
        })
    }
}

impl<In: NewGeoPoint, Out: NewCartesianPoint2d<f64>> Projection for GeodesyProjection<In, Out> {
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &In) -> Option<Out> {
        let mut data = [Coor2D::geo(input.lat(), input.lon())];
        self.context.apply(self.op, Fwd, &mut data).ok()?;

        let [x, y] = data[0].0;
        if x.is_finite() && y.is_finite() {
            Some(Out::new(x, y))
        } else {
            None
        }
    }

    fn unproject(&self, input: &Out) -> Option<In> {
        let mut data = [Coor2D([input.x(), input.y()])];
        self.context.apply(self.op, Inv, &mut data).ok()?;

        let [lon, lat] = data[0].0;
        if lon.is_finite() && lat.is_finite() {
            Some(In::latlon(lat.to_degrees(), lon.to_degrees()))
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
    use approx::assert_abs_diff_eq;

    #[test]
    fn utm_round_trip() {
        let projection: GeodesyProjection<GeoPoint2d, Point2d> =
            GeodesyProjection::new("utm zone=49 south ellps=WGS84").unwrap();
        let point = GeoPoint2d::latlon(-7.25, 112.75);

        let projected = projection.project(&point).unwrap();
        let back = projection.unproject(&projected).unwrap();

        assert_abs_diff_eq!(back.lat(), point.lat(), epsilon = 1e-7);
        assert_abs_diff_eq!(back.lon(), point.lon(), epsilon = 1e-7);
    }
}
