use roundtrip_providers::geocoder::GeocodingError;
use thiserror::Error;

use crate::matrix::CostMatrixError;

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("Could not geocode every address: {0}")]
    Geocoding(#[from] GeocodingError),

    #[error("At least two addresses are needed, found {found}")]
    InsufficientData { found: usize },

    #[error("Got {addresses} addresses for a matrix of {locations} locations")]
    AddressCountMismatch { addresses: usize, locations: usize },

    #[error(transparent)]
    Matrix(#[from] CostMatrixError),

    #[error("Tour construction task failed: {0}")]
    Task(String),
}
