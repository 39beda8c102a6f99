//! Error types used by the crate.

use image::ImageError;
use peta_types::error::PetaTypesError;
use thiserror::Error;

/// Peta error type.
///
/// The first three variants are the failure classes a pipeline reports to the user: bad input files, bad geometry and
/// an unresolved coordinate system mismatch in the join. The remaining variants wrap errors of the underlying
/// readers and encoders.
#[derive(Debug, Error)]
pub enum PetaError {
    /// Malformed or missing input: required columns or files are absent, an archive has no shapefile, etc.
    #[error("invalid input: {0}")]
    Input(String),
    /// Geometry cannot be parsed, is empty or cannot be projected.
    #[error("invalid geometry: {0}")]
    Geometry(String),
    /// Join cannot be performed, e.g. the layers are in different coordinate systems.
    #[error("join failed: {0}")]
    Join(String),
    /// Rendering surface could not be created or drawn to.
    #[error("rendering failed: {0}")]
    Render(String),
    /// Basemap tile could not be loaded.
    #[error("failed to load tile: {0}")]
    Tile(String),
    /// Error reading a file or stream.
    #[error("failed to read data: {0}")]
    Io(#[from] std::io::Error),
    /// Error reading or writing delimited text.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// Error reading a zip archive.
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    /// Error reading shapefile geometry or attributes.
    #[error("shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),
    /// Error parsing GeoJSON.
    #[error("geojson error: {0}")]
    GeoJson(#[from] geojson::Error),
    /// Error parsing JSON configuration.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Image decoding or encoding error.
    #[error("image error: {0}")]
    Image(#[from] ImageError),
}

impl From<PetaTypesError> for PetaError {
    fn from(value: PetaTypesError) -> Self {
        match value {
            PetaTypesError::UnknownCrs(_) => Self::Input(value.to_string()),
            _ => Self::Geometry(value.to_string()),
        }
    }
}

impl PetaError {
    /// Single human-readable message shown to the user when a pipeline run fails.
    pub fn user_message(&self) -> String {
        format!("Gagal memproses file: {self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn types_errors_are_classified() {
        let err: PetaError = PetaTypesError::UnknownCrs("EPSG:2154".into()).into();
        assert_matches!(err, PetaError::Input(_));

        let err: PetaError = PetaTypesError::Conversion("empty ring".into()).into();
        assert_matches!(err, PetaError::Geometry(_));
    }

    #[test]
    fn user_message() {
        let err = PetaError::Input("missing column 'bujur'".into());
        assert_eq!(
            err.user_message(),
            "Gagal memproses file: invalid input: missing column 'bujur'"
        );
    }
}
