//! Readers for the uploaded inputs: vector datasets and point tables.

use log::info;

use crate::error::PetaError;
use crate::layer::VectorLayer;

mod json;
mod points;
mod shp;

pub use json::read_geojson;
pub use points::{read_points_csv, PointRecord};
pub use shp::{read_shapefile_parts, read_shapefile_zip};

/// Loads a vector dataset from the bytes of an uploaded file.
///
/// The format is chosen by the file extension: `.zip` is read as a zipped shapefile bundle, `.json` and `.geojson`
/// as GeoJSON. The returned layer keeps the CRS declared by the file, or `None` if the file does not declare one.
pub fn load_vector(file_name: &str, bytes: &[u8]) -> Result<VectorLayer, PetaError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let layer = match extension.as_str() {
        "zip" => read_shapefile_zip(bytes)?,
        "json" | "geojson" => read_geojson(bytes)?,
        _ => {
            return Err(PetaError::Input(format!(
                "unsupported file type '{file_name}', expected .zip, .json or .geojson"
            )))
        }
    };

    info!(
        "Loaded {} features from '{file_name}' ({})",
        layer.len(),
        layer
            .crs()
            .map(|crs| crs.to_string())
            .unwrap_or_else(|| "no CRS".to_string())
    );

    Ok(layer)
}
