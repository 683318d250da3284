use std::{fmt::Display, future::Future, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{cost::Cost, location::Location};

/// Which quantity a routing provider reports as the cost of a trip.
#[derive(Debug, Deserialize, Serialize, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum CostMetric {
    /// Travel time in seconds
    #[default]
    Duration,
    /// Travel distance in meters
    Distance,
}

impl Display for CostMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CostMetric::Duration => "duration",
                CostMetric::Distance => "distance",
            }
        )
    }
}

#[derive(Debug, Error)]
pub enum CostLookupError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Cost lookup timed out after {0:?}")]
    Timeout(Duration),
}

/// Returns the cost of travelling from `origin` to `destination`.
///
/// `Ok(Cost::Unreachable)` is an answer: the provider knows there is no
/// route. `Err` means the provider could not answer at all.
pub trait CostProvider: Send + Sync {
    fn cost(
        &self,
        origin: &Location,
        destination: &Location,
    ) -> impl Future<Output = Result<Cost, CostLookupError>> + Send;
}

impl<T: CostProvider> CostProvider for Arc<T> {
    fn cost(
        &self,
        origin: &Location,
        destination: &Location,
    ) -> impl Future<Output = Result<Cost, CostLookupError>> + Send {
        (**self).cost(origin, destination)
    }
}

impl<T: CostProvider> CostProvider for &T {
    fn cost(
        &self,
        origin: &Location,
        destination: &Location,
    ) -> impl Future<Output = Result<Cost, CostLookupError>> + Send {
        (**self).cost(origin, destination)
    }
}
