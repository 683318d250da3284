use tracing::debug;

use crate::{
    matrix::CostMatrix,
    solver::{
        circuit_solver::CircuitSolver, index_manager::NodeIndexManager,
        local_search_solver::LocalSearchSolver,
    },
};

use super::{Tour, TourConstructionError, TourConstructor};

pub const SOLVER_BACKEND: &str = "solver-backend";

/// Arc cost handed to the solver for unreachable cells. Large enough that no
/// sum of real costs competes with it, small enough to keep the arithmetic
/// finite.
pub const UNREACHABLE_PENALTY: f64 = 1e12;

/// Delegates tour construction to a [`CircuitSolver`].
///
/// Unreachable cells are priced at [`UNREACHABLE_PENALTY`] so the solver
/// avoids them whenever a reachable alternative exists. The returned tour is
/// evaluated on the real matrix, a forced unreachable edge shows up there.
#[derive(Debug, Clone, Default)]
pub struct SolverBackend<S = LocalSearchSolver> {
    solver: S,
}

impl<S: CircuitSolver> SolverBackend<S> {
    pub fn new(solver: S) -> Self {
        Self { solver }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }
}

impl<S: CircuitSolver> TourConstructor for SolverBackend<S> {
    fn name(&self) -> &str {
        SOLVER_BACKEND
    }

    fn construct(&self, matrix: &CostMatrix) -> Result<Tour, TourConstructionError> {
        let num_locations = matrix.num_locations();
        let manager = NodeIndexManager::new(num_locations, Tour::START);

        let cost = |from: usize, to: usize| {
            matrix
                .get(manager.node_to_location(from), manager.node_to_location(to))
                .value_or(UNREACHABLE_PENALTY)
        };

        let circuit = self
            .solver
            .solve(manager.num_nodes(), manager.start_node(), &cost)
            .ok_or_else(|| TourConstructionError::NoFeasibleTour {
                reason: "solver found no solution within its limits".to_string(),
            })?;

        debug!(nodes = manager.num_nodes(), "SolverBackend: solution found");

        let stops = circuit
            .into_iter()
            .map(|node| manager.node_to_location(node))
            .collect();

        Ok(Tour::new(stops, num_locations)?)
    }
}
