use std::{future::Future, sync::Arc};

use thiserror::Error;

use crate::location::Location;

#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("Geocoding failed for address: {address}")]
    NotFound { address: String },

    #[error("Geocoding request failed for address {address}: {source}")]
    Request {
        address: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Geocoding API error for address {address}: {status} - {message}")]
    Api {
        address: String,
        status: u16,
        message: String,
    },

    #[error("Geocoding timed out for address: {address}")]
    Timeout { address: String },
}

impl GeocodingError {
    pub fn address(&self) -> &str {
        match self {
            GeocodingError::NotFound { address }
            | GeocodingError::Request { address, .. }
            | GeocodingError::Api { address, .. }
            | GeocodingError::Timeout { address } => address,
        }
    }
}

/// Resolves a free-text address to a location.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> impl Future<Output = Result<Location, GeocodingError>> + Send;
}

impl<T: Geocoder> Geocoder for Arc<T> {
    fn geocode(&self, address: &str) -> impl Future<Output = Result<Location, GeocodingError>> + Send {
        (**self).geocode(address)
    }
}
