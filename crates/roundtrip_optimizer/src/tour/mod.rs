pub mod evaluator;
pub mod nearest_neighbor;
pub mod solver_backend;
mod tour;
mod tour_constructor;

pub use tour::{Tour, TourError};
pub use tour_constructor::{TourConstructionError, TourConstructor};
