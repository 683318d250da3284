use tracing::debug;

use super::{
    circuit_solver::CircuitSolver,
    search_budget::SearchBudget,
    solver_params::{FirstSolutionStrategy, SolverParams},
};

/// Improvements smaller than this are treated as noise.
const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Longest chain of consecutive nodes moved by or-opt.
const OR_OPT_MAX_SEGMENT: usize = 3;

/// Builds a first circuit with a constructive strategy, then improves it with
/// first-improvement local search (2-opt and or-opt) until no improving
/// move exists or the budget runs out.
///
/// Every move is evaluated with directed costs, so asymmetric matrices are
/// handled correctly. The result is a local optimum, not a proven optimum.
#[derive(Debug, Clone, Default)]
pub struct LocalSearchSolver {
    params: SolverParams,
}

impl LocalSearchSolver {
    pub fn new(params: SolverParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }
}

impl CircuitSolver for LocalSearchSolver {
    fn solve(
        &self,
        num_nodes: usize,
        start: usize,
        cost: &dyn Fn(usize, usize) -> f64,
    ) -> Option<Vec<usize>> {
        if start >= num_nodes {
            return None;
        }

        let mut budget = SearchBudget::new(&self.params.terminations);

        let circuit = match self.params.first_solution_strategy {
            FirstSolutionStrategy::PathCheapestArc => {
                path_cheapest_arc(num_nodes, start, cost, &budget)
            }
            FirstSolutionStrategy::CheapestInsertion => {
                cheapest_insertion(num_nodes, start, cost, &budget)
            }
        };

        let Some(mut circuit) = circuit else {
            debug!(
                elapsed = ?budget.elapsed(),
                "LocalSearchSolver: ran out of time before a first solution was found"
            );
            return None;
        };

        if self.params.run_local_search {
            improve(&mut circuit, cost, &mut budget);
        }

        debug!(
            iterations = budget.iterations(),
            elapsed = ?budget.elapsed(),
            cost = circuit_cost(&circuit, cost),
            "LocalSearchSolver: finished"
        );

        Some(circuit)
    }
}

fn circuit_cost(circuit: &[usize], cost: &dyn Fn(usize, usize) -> f64) -> f64 {
    circuit.windows(2).map(|arc| cost(arc[0], arc[1])).sum()
}

/// Grows a path from `start`, always along the cheapest arc leaving its last
/// node. Ties go to the lowest node id.
fn path_cheapest_arc(
    num_nodes: usize,
    start: usize,
    cost: &dyn Fn(usize, usize) -> f64,
    budget: &SearchBudget,
) -> Option<Vec<usize>> {
    let mut visited = vec![false; num_nodes];
    let mut circuit = Vec::with_capacity(num_nodes + 1);

    visited[start] = true;
    circuit.push(start);

    while circuit.len() < num_nodes {
        if budget.is_out_of_time() {
            return None;
        }

        let last = circuit[circuit.len() - 1];
        let next = (0..num_nodes)
            .filter(|&node| !visited[node])
            .min_by(|&a, &b| cost(last, a).total_cmp(&cost(last, b)))?;

        visited[next] = true;
        circuit.push(next);
    }

    circuit.push(start);
    Some(circuit)
}

/// Starts from the empty circuit `start -> start` and inserts every other
/// node, in id order, where it increases the circuit cost the least.
fn cheapest_insertion(
    num_nodes: usize,
    start: usize,
    cost: &dyn Fn(usize, usize) -> f64,
    budget: &SearchBudget,
) -> Option<Vec<usize>> {
    let mut circuit = Vec::with_capacity(num_nodes + 1);
    circuit.push(start);
    circuit.push(start);

    for node in (0..num_nodes).filter(|&node| node != start) {
        if budget.is_out_of_time() {
            return None;
        }

        let position = (0..circuit.len() - 1)
            .min_by(|&a, &b| {
                insertion_delta(&circuit, a, node, cost)
                    .total_cmp(&insertion_delta(&circuit, b, node, cost))
            })
            .unwrap_or(0);

        circuit.insert(position + 1, node);
    }

    Some(circuit)
}

fn insertion_delta(
    circuit: &[usize],
    position: usize,
    node: usize,
    cost: &dyn Fn(usize, usize) -> f64,
) -> f64 {
    let (a, b) = (circuit[position], circuit[position + 1]);
    cost(a, node) + cost(node, b) - cost(a, b)
}

/// Applies improving moves until a local optimum or the budget is reached.
fn improve(
    circuit: &mut Vec<usize>,
    cost: &dyn Fn(usize, usize) -> f64,
    budget: &mut SearchBudget,
) {
    // 2-opt needs two non-adjacent inner arcs
    if circuit.len() < 4 {
        return;
    }

    while !budget.is_exhausted() {
        let improved = apply_two_opt(circuit, cost) || apply_or_opt(circuit, cost);

        if !improved {
            break;
        }

        budget.record_iteration();
    }
}

/// **2-Opt**
///
/// Removes arcs `(a -> b)` and `(c -> d)` and reconnects as `(a -> c)` and
/// `(b -> d)`, which reverses the path `b .. c`.
///
/// ```text
/// BEFORE: a -> [b -> ... -> c] -> d
/// AFTER:  a -> [c -> ... -> b] -> d
/// ```
///
/// With asymmetric costs the reversed path is re-costed, using prefix sums
/// over forward and backward arc costs.
fn apply_two_opt(circuit: &mut [usize], cost: &dyn Fn(usize, usize) -> f64) -> bool {
    let len = circuit.len();

    // forward[k]: cost of circuit[0..=k] travelled forward
    // backward[k]: same arcs travelled in reverse
    let mut forward = vec![0.0; len];
    let mut backward = vec![0.0; len];
    for k in 1..len {
        forward[k] = forward[k - 1] + cost(circuit[k - 1], circuit[k]);
        backward[k] = backward[k - 1] + cost(circuit[k], circuit[k - 1]);
    }

    for i in 0..len - 3 {
        for j in (i + 2)..len - 1 {
            let (a, b) = (circuit[i], circuit[i + 1]);
            let (c, d) = (circuit[j], circuit[j + 1]);

            let inner_forward = forward[j] - forward[i + 1];
            let inner_backward = backward[j] - backward[i + 1];

            let delta = cost(a, c) + cost(b, d) + inner_backward
                - cost(a, b)
                - cost(c, d)
                - inner_forward;

            if delta < -IMPROVEMENT_EPSILON {
                circuit[i + 1..=j].reverse();
                return true;
            }
        }
    }

    false
}

/// **Or-Opt**
///
/// Moves a chain of up to [`OR_OPT_MAX_SEGMENT`] consecutive nodes between
/// two other adjacent nodes, keeping the chain's direction.
///
/// ```text
/// BEFORE: p -> [s .. e] -> n   ...   x -> y
/// AFTER:  p -> n   ...   x -> [s .. e] -> y
/// ```
fn apply_or_opt(circuit: &mut Vec<usize>, cost: &dyn Fn(usize, usize) -> f64) -> bool {
    let len = circuit.len();

    for segment_len in 1..=OR_OPT_MAX_SEGMENT {
        // the start node at both ends never moves
        for first in 1..len - segment_len {
            let last = first + segment_len - 1;

            let (prev, next) = (circuit[first - 1], circuit[last + 1]);
            let (s, e) = (circuit[first], circuit[last]);

            let removal_gain = cost(prev, s) + cost(e, next) - cost(prev, next);

            for position in 0..len - 1 {
                // arcs touching the chain are not insertion points
                if position + 1 >= first && position <= last {
                    continue;
                }

                let (x, y) = (circuit[position], circuit[position + 1]);
                let delta = cost(x, s) + cost(e, y) - cost(x, y) - removal_gain;

                if delta < -IMPROVEMENT_EPSILON {
                    let segment: Vec<usize> = circuit.drain(first..=last).collect();
                    let insert_at = if position > last {
                        position + 1 - segment_len
                    } else {
                        position + 1
                    };
                    circuit.splice(insert_at..insert_at, segment);
                    return true;
                }
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;
    use crate::solver::solver_params::Termination;

    fn matrix_cost(matrix: &[Vec<f64>]) -> impl Fn(usize, usize) -> f64 + '_ {
        move |from, to| matrix[from][to]
    }

    fn assert_valid_circuit(circuit: &[usize], num_nodes: usize, start: usize) {
        assert_eq!(circuit.len(), num_nodes + 1);
        assert_eq!(circuit[0], start);
        assert_eq!(circuit[num_nodes], start);

        let mut sorted = circuit[..num_nodes].to_vec();
        sorted.sort();
        assert_eq!(sorted, (0..num_nodes).collect::<Vec<_>>());
    }

    /// Points on a line at x = 0, 3, 1, 2: the optimal circuit walks out and
    /// back, with cost 6.
    fn line_matrix() -> Vec<Vec<f64>> {
        let xs = [0.0_f64, 3.0, 1.0, 2.0];
        xs.iter()
            .map(|a| xs.iter().map(|b| (a - b).abs()).collect())
            .collect()
    }

    #[test]
    fn test_finds_optimum_on_a_line() {
        let matrix = line_matrix();
        let cost = matrix_cost(&matrix);

        let circuit = LocalSearchSolver::default().solve(4, 0, &cost).unwrap();

        assert_valid_circuit(&circuit, 4, 0);
        assert_eq!(circuit_cost(&circuit, &cost), 6.0);
    }

    #[test]
    fn test_path_cheapest_arc_without_local_search() {
        let matrix = vec![
            vec![0.0, 2.0, 9.0],
            vec![1.0, 0.0, 6.0],
            vec![4.0, 3.0, 0.0],
        ];
        let cost = matrix_cost(&matrix);

        let solver = LocalSearchSolver::new(SolverParams {
            run_local_search: false,
            ..SolverParams::default()
        });

        assert_eq!(solver.solve(3, 0, &cost), Some(vec![0, 1, 2, 0]));
    }

    #[test]
    fn test_two_opt_uncrosses() {
        // square corners 0 (0,0), 1 (1,1), 2 (1,0), 3 (0,1): 0-1-2-3 crosses
        let d = std::f64::consts::SQRT_2;
        let matrix = vec![
            vec![0.0, d, 1.0, 1.0],
            vec![d, 0.0, 1.0, 1.0],
            vec![1.0, 1.0, 0.0, d],
            vec![1.0, 1.0, d, 0.0],
        ];
        let cost = matrix_cost(&matrix);
        let mut circuit = vec![0, 1, 2, 3, 0];

        assert!(apply_two_opt(&mut circuit, &cost));
        assert_valid_circuit(&circuit, 4, 0);
        assert!((circuit_cost(&circuit, &cost) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_opt_accounts_for_direction() {
        // going "up" the index order is cheap, going down is expensive
        let mut matrix = vec![vec![0.0; 5]; 5];
        for (from, row) in matrix.iter_mut().enumerate() {
            for (to, value) in row.iter_mut().enumerate() {
                if from != to {
                    *value = if to == (from + 1) % 5 { 1.0 } else { 10.0 };
                }
            }
        }
        let cost = matrix_cost(&matrix);

        let mut circuit = vec![0, 1, 2, 3, 4, 0];
        // already optimal, reversing any inner path only adds cost
        assert!(!apply_two_opt(&mut circuit, &cost));

        let circuit = LocalSearchSolver::new(SolverParams {
            first_solution_strategy: FirstSolutionStrategy::CheapestInsertion,
            ..SolverParams::default()
        })
        .solve(5, 0, &cost)
        .unwrap();
        assert_eq!(circuit, vec![0, 1, 2, 3, 4, 0]);
    }

    #[test]
    fn test_or_opt_moves_a_node() {
        // node 1 belongs between 3 and 4
        let xs = [0.0_f64, 3.5, 2.0, 3.0, 4.0];
        let matrix: Vec<Vec<f64>> = xs
            .iter()
            .map(|a| xs.iter().map(|b| (a - b).abs()).collect())
            .collect();
        let cost = matrix_cost(&matrix);

        let mut circuit = vec![0, 1, 2, 3, 4, 0];
        let before = circuit_cost(&circuit, &cost);

        assert!(apply_or_opt(&mut circuit, &cost));
        assert_valid_circuit(&circuit, 5, 0);
        assert!(circuit_cost(&circuit, &cost) < before);
    }

    #[test]
    fn test_cheapest_insertion() {
        let matrix = line_matrix();
        let cost = matrix_cost(&matrix);

        let solver = LocalSearchSolver::new(SolverParams {
            first_solution_strategy: FirstSolutionStrategy::CheapestInsertion,
            run_local_search: false,
            ..SolverParams::default()
        });

        let circuit = solver.solve(4, 0, &cost).unwrap();
        assert_valid_circuit(&circuit, 4, 0);
        assert_eq!(circuit_cost(&circuit, &cost), 6.0);
    }

    #[test]
    fn test_never_worse_than_first_solution() {
        let matrix = vec![
            vec![0.0, 3.0, 3.0, 7.0, 2.0, 5.0],
            vec![3.0, 0.0, 2.0, 2.0, 3.0, 4.0],
            vec![3.0, 2.0, 0.0, 2.0, 3.0, 8.0],
            vec![7.0, 2.0, 2.0, 0.0, 3.0, 1.0],
            vec![2.0, 3.0, 3.0, 3.0, 0.0, 6.0],
            vec![5.0, 4.0, 8.0, 1.0, 6.0, 0.0],
        ];
        let cost = matrix_cost(&matrix);

        let first = LocalSearchSolver::new(SolverParams {
            run_local_search: false,
            ..SolverParams::default()
        })
        .solve(6, 0, &cost)
        .unwrap();
        let improved = LocalSearchSolver::default().solve(6, 0, &cost).unwrap();

        assert_valid_circuit(&improved, 6, 0);
        assert!(circuit_cost(&improved, &cost) <= circuit_cost(&first, &cost));
    }

    #[test]
    fn test_small_instances() {
        let matrix = vec![vec![0.0]];
        let cost = matrix_cost(&matrix);
        assert_eq!(LocalSearchSolver::default().solve(1, 0, &cost), Some(vec![0, 0]));

        let matrix = vec![vec![0.0, 4.0], vec![2.0, 0.0]];
        let cost = matrix_cost(&matrix);
        assert_eq!(
            LocalSearchSolver::default().solve(2, 0, &cost),
            Some(vec![0, 1, 0])
        );
    }

    #[test]
    fn test_no_time_means_no_solution() {
        let matrix = line_matrix();
        let cost = matrix_cost(&matrix);

        let solver = LocalSearchSolver::new(SolverParams {
            terminations: vec![Termination::Duration(SignedDuration::ZERO)],
            ..SolverParams::default()
        });

        assert_eq!(solver.solve(4, 0, &cost), None);
    }

    #[test]
    fn test_invalid_start() {
        let matrix = line_matrix();
        let cost = matrix_cost(&matrix);

        assert_eq!(LocalSearchSolver::default().solve(4, 4, &cost), None);
        assert_eq!(LocalSearchSolver::default().solve(0, 0, &cost), None);
    }
}
