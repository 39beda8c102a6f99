use serde::{Deserialize, Serialize};

use crate::cartesian::{NewCartesianPoint2d, Point2d};
use crate::error::PetaTypesError;
use crate::geo::datum::Datum;
use crate::geo::point::{GeoPoint2d, NewGeoPoint};
use crate::geo::projection::{
    ChainProjection, GeographicProjection, InvertedProjection, Projection, WebMercator,
};

/// Coordinate reference system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crs {
    datum: Datum,
    projection_type: ProjectionType,
}

/// Method of projecting geographic coordinates into the plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ProjectionType {
    /// Geographic coordinates (longitude, latitude in degrees).
    None,
    /// Spherical Mercator, EPSG:3857.
    WebMercator,
    /// Universal Transverse Mercator zone.
    Utm {
        /// Zone number, 1..=60.
        zone: u8,
        /// Southern hemisphere (false northing of 10 000 km).
        south: bool,
    },
    /// Any other projection, given as a `geodesy` operator definition.
    Other(String),
}

impl Crs {
    /// Geographic WGS84, EPSG:4326.
    pub const WGS84: Crs = Crs {
        datum: Datum::WGS84,
        projection_type: ProjectionType::None,
    };

    /// Web Mercator, EPSG:3857.
    pub const EPSG3857: Crs = Crs {
        datum: Datum::WGS84,
        projection_type: ProjectionType::WebMercator,
    };

    /// Creates a new CRS.
    pub fn new(datum: Datum, projection_type: ProjectionType) -> Self {
        Self {
            datum,
            projection_type,
        }
    }

    /// WGS84 / UTM zone. Returns `None` if the zone number is out of range.
    pub fn utm(zone: u8, south: bool) -> Option<Self> {
        if (1..=60).contains(&zone) {
            Some(Self::new(Datum::WGS84, ProjectionType::Utm { zone, south }))
        } else {
            None
        }
    }

    /// Type of the projection.
    pub fn projection_type(&self) -> &ProjectionType {
        &self.projection_type
    }

    /// Datum of the CRS.
    pub fn datum(&self) -> Datum {
        self.datum
    }

    /// Returns true for geographic (unprojected) systems.
    pub fn is_geographic(&self) -> bool {
        matches!(self.projection_type, ProjectionType::None)
    }

    /// EPSG code of the system, if it has one.
    pub fn epsg_code(&self) -> Option<u32> {
        match self.projection_type {
            ProjectionType::None => Some(4326),
            ProjectionType::WebMercator => Some(3857),
            ProjectionType::Utm { zone, south } => {
                let base = if south { 32700 } else { 32600 };
                Some(base + zone as u32)
            }
            ProjectionType::Other(_) => None,
        }
    }

    /// Looks up a CRS by its EPSG code.
    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            4326 => Some(Self::WGS84),
            3857 | 3785 | 900913 | 102100 | 102113 => Some(Self::EPSG3857),
            32601..=32660 => Self::utm((code - 32600) as u8, false),
            32701..=32760 => Self::utm((code - 32700) as u8, true),
            _ => None,
        }
    }

    /// Parses a CRS name as used in GeoJSON `crs` members and OGC services: `EPSG:4326`,
    /// `urn:ogc:def:crs:EPSG::3857`, `urn:ogc:def:crs:OGC:1.3:CRS84`.
    pub fn from_name(name: &str) -> Result<Self, PetaTypesError> {
        let trimmed = name.trim();
        if trimmed.to_ascii_uppercase().ends_with("CRS84") {
            return Ok(Self::WGS84);
        }

        trimmed
            .rsplit(':')
            .next()
            .and_then(|code| code.trim().parse::<u32>().ok())
            .and_then(Self::from_epsg)
            .ok_or_else(|| PetaTypesError::UnknownCrs(trimmed.to_string()))
    }

    /// Recognizes a CRS from ESRI/OGC WKT, as found in shapefile `.prj` files.
    ///
    /// Geographic systems are accepted on the WGS84 datum and on DGN95, which is aligned with WGS84 to below
    /// rendering precision. Projected systems are recognized if they are Web Mercator, or UTM on one of those
    /// datums. Any other datum (Batavia, Tokyo, ...) is [`PetaTypesError::UnknownCrs`].
    pub fn from_wkt(wkt: &str) -> Result<Self, PetaTypesError> {
        let upper = wkt.trim().to_ascii_uppercase();
        let unknown = || PetaTypesError::UnknownCrs(wkt.chars().take(80).collect());

        if upper.starts_with("GEOGCS") || upper.starts_with("GEOGCRS") {
            return has_wgs84_datum(&upper)
                .then_some(Self::WGS84)
                .ok_or_else(unknown);
        }

        if !upper.starts_with("PROJCS") && !upper.starts_with("PROJCRS") {
            return Err(unknown());
        }

        const MERCATOR_NAMES: [&str; 4] = [
            "MERCATOR_AUXILIARY_SPHERE",
            "POPULAR_VISUALISATION",
            "PSEUDO-MERCATOR",
            "WEB_MERCATOR",
        ];
        if MERCATOR_NAMES.iter().any(|name| upper.contains(name)) {
            return Ok(Self::EPSG3857);
        }

        parse_utm_zone(&upper)
            .filter(|_| has_wgs84_datum(&upper))
            .and_then(|(zone, south)| Self::utm(zone, south))
            .ok_or_else(unknown)
    }

    /// Returns a projection from geographic coordinates into this CRS.
    pub fn get_projection<In, Out>(
        &self,
    ) -> Option<Box<dyn Projection<InPoint = In, OutPoint = Out>>>
    where
        In: NewGeoPoint + 'static,
        Out: NewCartesianPoint2d + 'static,
    {
        match &self.projection_type {
            ProjectionType::None => Some(Box::new(GeographicProjection::new())),
            ProjectionType::WebMercator => Some(Box::new(WebMercator::new(self.datum))),
            #[cfg(feature = "geodesy")]
            ProjectionType::Utm { zone, south } => {
                let definition = format!(
                    "utm zone={zone}{} ellps=WGS84",
                    if *south { " south" } else { "" }
                );
                Some(Box::new(
                    crate::geo::projection::GeodesyProjection::new(&definition)?,
                ))
            }
            #[cfg(feature = "geodesy")]
            ProjectionType::Other(definition) => Some(Box::new(
                crate::geo::projection::GeodesyProjection::new(definition)?,
            )),
            #[cfg(not(feature = "geodesy"))]
            _ => None,
        }
    }

    /// Returns a projection converting coordinates stored in this CRS into the `target` CRS.
    pub fn reprojection_to(
        &self,
        target: &Crs,
    ) -> Result<ChainProjection<Point2d, GeoPoint2d, Point2d>, PetaTypesError> {
        let source = self
            .get_projection::<GeoPoint2d, Point2d>()
            .ok_or_else(|| PetaTypesError::UnknownCrs(format!("{self}")))?;
        let target = target
            .get_projection::<GeoPoint2d, Point2d>()
            .ok_or_else(|| PetaTypesError::UnknownCrs(format!("{target}")))?;

        Ok(ChainProjection::new(
            Box::new(InvertedProjection::new(source)),
            target,
        ))
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.projection_type, self.epsg_code()) {
            (ProjectionType::Other(definition), _) => write!(f, "{definition}"),
            (_, Some(code)) => write!(f, "EPSG:{code}"),
            (_, None) => write!(f, "unknown"),
        }
    }
}

const WGS84_COMPATIBLE_DATUMS: [&str; 4] = ["WGS84", "WGS1984", "DGN95", "DGN1995"];

/// Looks at the names of the geographic systems and datums in the WKT, ignoring punctuation.
fn has_wgs84_datum(upper_wkt: &str) -> bool {
    ["GEOGCS[\"", "GEOGCRS[\"", "DATUM[\""]
        .iter()
        .flat_map(|marker| {
            upper_wkt
                .match_indices(*marker)
                .map(move |(i, _)| i + marker.len())
        })
        .filter_map(|start| upper_wkt[start..].split('"').next())
        .map(|name| {
            name.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
        })
        .any(|name| WGS84_COMPATIBLE_DATUMS.iter().any(|datum| name.contains(datum)))
}

fn parse_utm_zone(upper_wkt: &str) -> Option<(u8, bool)> {
    let start = ["UTM_ZONE_", "UTM ZONE "]
        .iter()
        .find_map(|marker| upper_wkt.find(marker).map(|i| i + marker.len()))?;
    let rest = &upper_wkt[start..];

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let zone = digits.parse::<u8>().ok()?;

    let south = match rest[digits.len()..].chars().next() {
        Some('S') => true,
        Some('N') => false,
        _ => upper_wkt.contains("\"FALSE_NORTHING\",10000000"),
    };

    Some((zone, south))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn from_epsg() {
        assert_eq!(Crs::from_epsg(4326), Some(Crs::WGS84));
        assert_eq!(Crs::from_epsg(900913), Some(Crs::EPSG3857));
        assert_eq!(Crs::from_epsg(32749), Crs::utm(49, true));
        assert_eq!(Crs::from_epsg(32650), Crs::utm(50, false));
        assert_eq!(Crs::from_epsg(2154), None);
    }

    #[test]
    fn from_name() {
        assert_eq!(
            Crs::from_name("urn:ogc:def:crs:OGC:1.3:CRS84").unwrap(),
            Crs::WGS84
        );
        assert_eq!(
            Crs::from_name("urn:ogc:def:crs:EPSG::3857").unwrap(),
            Crs::EPSG3857
        );
        assert_eq!(Crs::from_name("EPSG:4326").unwrap(), Crs::WGS84);
        assert_matches!(Crs::from_name("foo"), Err(PetaTypesError::UnknownCrs(_)));
    }

    #[test]
    fn from_wkt() {
        let geographic = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;
        assert_eq!(Crs::from_wkt(geographic).unwrap(), Crs::WGS84);

        let mercator = r#"PROJCS["WGS_1984_Web_Mercator_Auxiliary_Sphere",GEOGCS["GCS_WGS_1984"],PROJECTION["Mercator_Auxiliary_Sphere"]]"#;
        assert_eq!(Crs::from_wkt(mercator).unwrap(), Crs::EPSG3857);

        let utm = r#"PROJCS["WGS_1984_UTM_Zone_49S",GEOGCS["GCS_WGS_1984"],PROJECTION["Transverse_Mercator"],PARAMETER["False_Northing",10000000.0]]"#;
        assert_eq!(Crs::from_wkt(utm).unwrap(), Crs::utm(49, true).unwrap());

        let utm_north = r#"PROJCS["DGN95 / UTM zone 51N",GEOGCS["DGN95"]]"#;
        assert_eq!(Crs::from_wkt(utm_north).unwrap(), Crs::utm(51, false).unwrap());

        let dgn95 = r#"GEOGCS["DGN95",DATUM["Datum_Geodesi_Nasional_1995",SPHEROID["WGS 84",6378137,298.257223563]]]"#;
        assert_eq!(Crs::from_wkt(dgn95).unwrap(), Crs::WGS84);

        let lambert = r#"PROJCS["RGF93_Lambert_93",PROJECTION["Lambert_Conformal_Conic"]]"#;
        assert_matches!(Crs::from_wkt(lambert), Err(PetaTypesError::UnknownCrs(_)));
    }

    #[test]
    fn other_datums_are_not_guessed() {
        let batavia = r#"GEOGCS["GCS_Batavia",DATUM["D_Batavia",SPHEROID["Bessel_1841",6377397.155,299.1528128]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;
        assert_matches!(Crs::from_wkt(batavia), Err(PetaTypesError::UnknownCrs(_)));

        let tokyo_utm = r#"PROJCS["Tokyo / UTM zone 54N",GEOGCS["Tokyo",DATUM["Tokyo",SPHEROID["Bessel 1841",6377397.155,299.1528128]]],PROJECTION["Transverse_Mercator"]]"#;
        assert_matches!(Crs::from_wkt(tokyo_utm), Err(PetaTypesError::UnknownCrs(_)));

        let batavia_utm = r#"PROJCS["Batavia_UTM_Zone_48S",GEOGCS["GCS_Batavia",DATUM["D_Batavia"]],PARAMETER["False_Northing",10000000.0]]"#;
        assert_matches!(Crs::from_wkt(batavia_utm), Err(PetaTypesError::UnknownCrs(_)));
    }

    #[test]
    fn display() {
        assert_eq!(Crs::WGS84.to_string(), "EPSG:4326");
        assert_eq!(Crs::utm(49, true).unwrap().to_string(), "EPSG:32749");
    }

    #[test]
    fn reprojection_between_geographic_and_mercator() {
        let reprojection = Crs::WGS84.reprojection_to(&Crs::EPSG3857).unwrap();
        let projected = reprojection.project(&Point2d::new(180.0, 0.0)).unwrap();
        approx::assert_abs_diff_eq!(projected.x, 20_037_508.342789244, epsilon = 1e-6);

        let back = reprojection.unproject(&projected).unwrap();
        approx::assert_abs_diff_eq!(back.x, 180.0, epsilon = 1e-9);
    }
}
