use thiserror::Error;

use crate::matrix::CostMatrix;

use super::{Tour, TourError};

#[derive(Debug, Error, PartialEq)]
pub enum TourConstructionError {
    #[error("No feasible tour found: {reason}")]
    NoFeasibleTour { reason: String },

    #[error("Constructor produced an invalid tour: {0}")]
    InvalidTour(#[from] TourError),
}

/// A strategy that turns a cost matrix into a closed tour starting at
/// [`Tour::START`].
///
/// Constructors only read the matrix, so several of them can run against the
/// same matrix concurrently.
pub trait TourConstructor: Send + Sync {
    /// Stable identifier used to key results, e.g. `"nearest-neighbor"`.
    fn name(&self) -> &str;

    fn construct(&self, matrix: &CostMatrix) -> Result<Tour, TourConstructionError>;
}
