//! End-to-end runs over uploaded files.
//!
//! * [`render_layout`] - official recommendation map with basemap, grid, scale bar, legend, inset and logo.
//! * [`render_annex`] - two-panel map annex of a zipped shapefile with a route line and a planned area.
//! * [`load_zoning`] and [`run_overlay`] - point-in-polygon join of a point table with a zoning layer.
//!
//! Every run goes through input validation, CRS normalization, computation or rendering and export, in that order.
//! A run either returns its complete output or a single [`PetaError`]; nothing partial is produced.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::PetaError;
use crate::io::load_vector;
use crate::layer::VectorLayer;
use crate::render::ImageFormat;

mod annex;
mod layout;
mod overlay;

pub use annex::{render_annex, AnnexConfig, AnnexRequest};
pub use layout::{render_layout, LayoutRequest};
pub use overlay::{load_zoning, run_overlay, OverlayConfig, OverlayOutput};

/// Encoded map figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedMap {
    /// Encoded image.
    pub bytes: Vec<u8>,
    /// Encoding of `bytes`.
    pub format: ImageFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl RenderedMap {
    /// MIME type of the image.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// File name for downloading the image: the stem with the extension of the format.
    pub fn file_name(&self, stem: &str) -> String {
        let extension = match self.format {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg { .. } => "jpg",
        };
        format!("{stem}.{extension}")
    }
}

/// Loads an uploaded dataset and assigns WGS84 if it does not declare a CRS. Fails if the dataset has no features.
fn load_layer(file_name: &str, bytes: &[u8]) -> Result<VectorLayer, PetaError> {
    let layer = load_vector(file_name, bytes)?.normalize_crs();
    if layer.is_empty() {
        return Err(PetaError::Geometry(format!(
            "'{file_name}' contains no features"
        )));
    }

    debug!("Layer '{file_name}' is in {}", layer.effective_crs());
    Ok(layer)
}
