//! Geometry types and algorithms used by `peta`.
//!
//! Geometries are stored as plain coordinate pairs in the units of their coordinate system. For geographic
//! systems this means `x = longitude` and `y = latitude` in degrees, for projected systems it means easting and
//! northing in meters. Conversion between systems goes through the [`geo::Projection`] trait.
//!
//! * [`cartesian`] - points, rectangles and sizes in 2d cartesian space.
//! * [`Contour`], [`Polygon`] and the other geometry structs, with point-in-polygon test in [`Polygon::contains_point`].
//! * [`geometry::Geom`] - enum over all supported geometry kinds.
//! * [`geo`] - coordinate reference systems and projections.

pub mod cartesian;
pub mod error;
pub mod geo;
pub mod geometry;
pub mod segment;

mod contour;
mod multi;
mod polygon;

#[cfg(feature = "geojson")]
pub mod geojson;

pub use contour::{ClosedContour, Contour};
pub use multi::{MultiContour, MultiPoint, MultiPolygon};
pub use polygon::Polygon;
