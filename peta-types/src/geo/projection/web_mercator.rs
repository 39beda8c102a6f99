use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::marker::PhantomData;

use crate::cartesian::NewCartesianPoint2d;
use crate::geo::datum::Datum;
use crate::geo::point::NewGeoPoint;
use crate::geo::projection::Projection;

/// Latitude limit of the Web Mercator square.
pub(crate) const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Spherical ("pseudo") Mercator used by web tile services, EPSG:3857.
#[derive(Debug, Copy, Clone)]
pub struct WebMercator<In, Out> {
    datum: Datum,
    phantom_in: PhantomData<In>,
    phantom_out: PhantomData<Out>,
}

impl<In, Out> WebMercator<In, Out> {
    /// Creates a projection on the given datum. Only the semimajor axis of the datum is used.
    pub fn new(datum: Datum) -> Self {
        Self {
            datum,
            phantom_in: Default::default(),
            phantom_out: Default::default(),
        }
    }
}

impl<In, Out> Default for WebMercator<In, Out> {
    fn default() -> Self {
        Self::new(Datum::WGS84)
    }
}

impl<In: NewGeoPoint, Out: NewCartesianPoint2d<f64>> Projection for WebMercator<In, Out> {
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &In) -> Option<Out> {
        let lat = input.lat().clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = self.datum.semimajor() * input.lon_rad();
        let y = self.datum.semimajor() * (FRAC_PI_4 + lat / 2.0).tan().ln();

        if x.is_finite() && y.is_finite() {
            Some(Out::new(x, y))
        } else {
            None
        }
    }

    fn unproject(&self, input: &Out) -> Option<In> {
        let r = self.datum.semimajor();
        let lat = 2.0 * (input.y() / r).exp().atan() - FRAC_PI_2;
        let lon = input.x() / r;

        if lat.is_finite() && lon.is_finite() {
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
    use crate::latlon;
    use approx::assert_abs_diff_eq;

    #[test]
    fn project_known_points() {
        let projection: WebMercator<GeoPoint2d, Point2d> = WebMercator::default();

        let origin = projection.project(&latlon!(0.0, 0.0)).unwrap();
        assert_abs_diff_eq!(origin.x, 0.0);
        assert_abs_diff_eq!(origin.y, 0.0);

        let corner = projection.project(&latlon!(MAX_LATITUDE, 180.0)).unwrap();
        assert_abs_diff_eq!(corner.x, 20_037_508.342789244, epsilon = 1e-6);
        assert_abs_diff_eq!(corner.y, 20_037_508.342789244, epsilon = 1e-3);

        let jakarta = projection.project(&latlon!(-6.2, 106.8)).unwrap();
        assert_abs_diff_eq!(jakarta.x, 11_888_921.62, epsilon = 0.01);
        assert_abs_diff_eq!(jakarta.y, -691_531.74, epsilon = 0.01);
    }

    #[test]
    fn unproject_round_trip() {
        let projection: WebMercator<GeoPoint2d, Point2d> = WebMercator::default();
        let point = latlon!(-8.65, 115.21);
        let projected = projection.project(&point).unwrap();
        let back = projection.unproject(&projected).unwrap();

        assert_abs_diff_eq!(back.lat(), point.lat(), epsilon = 1e-9);
        assert_abs_diff_eq!(back.lon(), point.lon(), epsilon = 1e-9);
    }

    #[test]
    fn poles_are_clamped() {
        let projection: WebMercator<GeoPoint2d, Point2d> = WebMercator::default();
        let pole = projection.project(&latlon!(90.0, 0.0)).unwrap();
        assert!(pole.y.is_finite());
    }
}
