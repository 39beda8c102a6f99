//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error)]
pub enum PetaTypesError {
    /// Geometry conversion error.
    #[error("invalid input geometry: {0}")]
    Conversion(String),
    /// The coordinate system description is not recognized.
    #[error("unknown coordinate reference system: {0}")]
    UnknownCrs(String),
    /// A coordinate could not be transformed into the target system.
    #[error("failed to project coordinate ({x}, {y})")]
    Projection {
        /// X (or longitude) of the failed coordinate.
        x: f64,
        /// Y (or latitude) of the failed coordinate.
        y: f64,
    },
}
