use serde::{Deserialize, Serialize};

/// Point on the surface of the Earth given by latitude and longitude in degrees.
pub trait GeoPoint {
    /// Latitude in degrees.
    fn lat(&self) -> f64;
    /// Longitude in degrees.
    fn lon(&self) -> f64;

    /// Latitude in radians.
    fn lat_rad(&self) -> f64 {
        self.lat().to_radians()
    }

    /// Longitude in radians.
    fn lon_rad(&self) -> f64 {
        self.lon().to_radians()
    }
}

/// Geographic point that can be constructed from its coordinates.
pub trait NewGeoPoint: GeoPoint + Sized {
    /// Creates a point from latitude and longitude (degrees).
    fn latlon(lat: f64, lon: f64) -> Self;

    /// Creates a point from longitude and latitude (degrees).
    fn lonlat(lon: f64, lat: f64) -> Self {
        Self::latlon(lat, lon)
    }
}

/// 2d geographic point.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct GeoPoint2d {
    lat: f64,
    lon: f64,
}

impl GeoPoint for GeoPoint2d {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

impl NewGeoPoint for GeoPoint2d {
    fn latlon(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Creates a new [`GeoPoint2d`] from latitude and longitude values (in degrees).
///
/// ```
/// use peta_types::geo::GeoPoint;
/// use peta_types::latlon;
///
/// let point = latlon!(-6.2, 106.8);
/// assert_eq!(point.lat(), -6.2);
/// ```
#[macro_export]
macro_rules! latlon {
    ($lat:expr, $lon:expr) => {
        <$crate::geo::GeoPoint2d as $crate::geo::NewGeoPoint>::latlon($lat, $lon)
    };
}
