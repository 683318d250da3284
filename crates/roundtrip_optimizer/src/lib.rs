//! Visiting-order optimization over a set of locations.
//!
//! The pipeline is: geocode addresses, build a [`matrix::CostMatrix`] once,
//! run every configured [`tour::TourConstructor`] against it, and compare the
//! resulting tours with [`tour::evaluator::total_cost`].

pub mod matrix;
pub mod service;
pub mod solver;
pub mod tour;
mod utils;

#[cfg(test)]
pub(crate) mod test_utils;
