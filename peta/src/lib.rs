//! Peta turns uploaded vector data into printable map figures and joins point tables with zoning polygons.
//!
//! # Quick start
//!
//! Render the recommendation map of an uploaded GeoJSON file:
//!
//! ```no_run
//! use peta::layout::LayoutConfig;
//! use peta::pipeline::{render_layout, LayoutRequest};
//!
//! let data = std::fs::read("zona.geojson").unwrap();
//! let map = render_layout(&LayoutRequest::new("zona.geojson", &data), &LayoutConfig::default())
//!     .unwrap();
//! std::fs::write(map.file_name("peta_rekomendasi"), &map.bytes).unwrap();
//! ```
//!
//! # Main components
//!
//! The [`pipeline`] module has the three complete runs: the layout map, the map annex and the point overlay. They
//! are built from
//!
//! * [`io`] readers for zipped shapefiles, GeoJSON and point tables, producing a [`VectorLayer`];
//! * [`VectorLayer::reproject`] for coordinate system conversion, using [`peta_types::geo::Crs`];
//! * [`join::spatial_join`], the point-in-polygon attribute join, and [`export`] for its CSV table;
//! * [`layout`], which places map panels, a legend, an inset, a grid and a scale bar on a page drawn by [`render`];
//! * [`basemap`] tiles under the main map panel, loaded through the [`basemap::TileSource`] trait;
//! * [`webmap`], the GeoJSON feed shown by an interactive web map.
//!
//! Every failure is reported as a [`PetaError`]; [`PetaError::user_message`] gives the text shown to the user.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod attributes;
pub mod basemap;
mod color;
pub mod countries;
pub mod decoded_image;
pub mod error;
pub mod export;
pub mod io;
pub mod join;
pub mod layer;
pub mod layout;
pub mod pipeline;
pub mod render;
pub mod scale_bar;
pub mod session;
pub mod symbol;
pub mod view;
pub mod webmap;

pub use color::{categorical_color, Color, SET2};
pub use error::PetaError;
pub use layer::{Feature, VectorLayer};
pub use session::Session;

pub use peta_types;
