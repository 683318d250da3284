/// A combinatorial backend that finds a Hamiltonian circuit over
/// `num_nodes` nodes, minimizing the sum of directed arc costs.
///
/// Nodes are the solver's own ids in `0..num_nodes`. `cost(from, to)` must be
/// finite. The returned circuit starts and ends at `start` and visits every
/// other node exactly once; `None` means no circuit was found within the
/// solver's limits.
pub trait CircuitSolver: Send + Sync {
    fn solve(
        &self,
        num_nodes: usize,
        start: usize,
        cost: &dyn Fn(usize, usize) -> f64,
    ) -> Option<Vec<usize>>;
}
