use roundtrip_providers::cost::Cost;

use crate::matrix::CostMatrix;

use super::Tour;

/// Sums the cost of every edge of `tour`, closing edge included.
///
/// A single unreachable edge makes the whole tour [`Cost::Unreachable`]; it
/// is never replaced by a large finite number.
///
/// # Panics
///
/// Panics if the tour visits a location outside of the matrix.
pub fn total_cost(matrix: &CostMatrix, tour: &Tour) -> Cost {
    tour.edges().map(|(from, to)| matrix.get(from, to)).sum()
}
