use jiff::SignedDuration;

pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FirstSolutionStrategy {
    /// Extend the path from its last node along the cheapest arc
    #[default]
    PathCheapestArc,
    /// Insert nodes in index order at the position that adds the least cost
    CheapestInsertion,
}

#[derive(Clone, Debug)]
pub enum Termination {
    /// Wall-clock budget for the whole search, first solution included
    Duration(SignedDuration),
    /// Maximum number of applied improving moves
    Iterations(usize),
}

#[derive(Clone, Debug)]
pub struct SolverParams {
    pub first_solution_strategy: FirstSolutionStrategy,
    pub terminations: Vec<Termination>,
    pub run_local_search: bool,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            first_solution_strategy: FirstSolutionStrategy::PathCheapestArc,
            terminations: vec![
                Termination::Duration(SignedDuration::from_secs(2)),
                Termination::Iterations(DEFAULT_MAX_ITERATIONS),
            ],
            run_local_search: true,
        }
    }
}
