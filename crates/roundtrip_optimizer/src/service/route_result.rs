use std::collections::BTreeMap;

use roundtrip_providers::cost::Cost;
use serde::Serialize;

use crate::{
    matrix::CostMatrix,
    tour::{Tour, TourConstructionError, evaluator::total_cost},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Feasible,
    /// The tour is complete but its total cost is meaningless
    ContainsUnreachableEdge,
}

/// One constructor's tour, with the addresses in visiting order and the
/// tour's total cost on the shared matrix.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteResult {
    pub tour: Tour,
    /// One entry per stop, the start address appears first and last
    pub addresses: Vec<String>,
    pub total_cost: Cost,
}

impl RouteResult {
    /// # Panics
    ///
    /// Panics if the tour visits a location without an address.
    pub fn new(tour: Tour, addresses: &[String], matrix: &CostMatrix) -> Self {
        let total_cost = total_cost(matrix, &tour);
        let addresses = tour
            .stops()
            .iter()
            .map(|&stop| addresses[stop].clone())
            .collect();

        Self {
            tour,
            addresses,
            total_cost,
        }
    }

    pub fn status(&self) -> RouteStatus {
        if self.total_cost.is_unreachable() {
            RouteStatus::ContainsUnreachableEdge
        } else {
            RouteStatus::Feasible
        }
    }
}

pub type VariantOutcome = Result<RouteResult, TourConstructionError>;

#[derive(Debug)]
pub struct OptimizationReport {
    /// Matrix cells recorded as unreachable because their lookup failed
    pub matrix_failures: usize,
    /// Keyed by constructor name
    pub variants: BTreeMap<String, VariantOutcome>,
}

impl OptimizationReport {
    pub fn get(&self, variant: &str) -> Option<&VariantOutcome> {
        self.variants.get(variant)
    }

    /// The feasible result with the lowest total cost. Ties go to the first
    /// variant by name.
    pub fn best(&self) -> Option<(&str, &RouteResult)> {
        self.variants
            .iter()
            .filter_map(|(name, outcome)| outcome.as_ref().ok().map(|result| (name, result)))
            .filter(|(_, result)| result.status() == RouteStatus::Feasible)
            .min_by(|(_, a), (_, b)| a.total_cost.total_cmp(&b.total_cost))
            .map(|(name, result)| (name.as_str(), result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    fn matrix() -> CostMatrix {
        CostMatrix::from_values(vec![
            vec![0.0, 2.0, f64::INFINITY],
            vec![1.0, 0.0, 6.0],
            vec![4.0, 3.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_addresses_follow_the_tour() {
        let addresses = test_utils::addresses(&["A", "B", "C"]);
        let tour = Tour::from_indices(vec![0, 1, 2, 0], 3).unwrap();

        let result = RouteResult::new(tour, &addresses, &matrix());

        assert_eq!(result.addresses, vec!["A", "B", "C", "A"]);
        assert_eq!(result.total_cost, Cost::Finite(12.0));
        assert_eq!(result.status(), RouteStatus::Feasible);
    }

    #[test]
    fn test_unreachable_edge_status() {
        let addresses = test_utils::addresses(&["A", "B", "C"]);
        let tour = Tour::from_indices(vec![0, 2, 1, 0], 3).unwrap();

        let result = RouteResult::new(tour, &addresses, &matrix());

        assert_eq!(result.addresses, vec!["A", "C", "B", "A"]);
        assert_eq!(result.status(), RouteStatus::ContainsUnreachableEdge);
    }

    #[test]
    fn test_best_skips_infeasible_variants() {
        let addresses = test_utils::addresses(&["A", "B", "C"]);
        let matrix = matrix();

        let report = OptimizationReport {
            matrix_failures: 0,
            variants: BTreeMap::from([
                (
                    "a".to_string(),
                    Ok(RouteResult::new(
                        Tour::from_indices(vec![0, 2, 1, 0], 3).unwrap(),
                        &addresses,
                        &matrix,
                    )),
                ),
                (
                    "b".to_string(),
                    Err(TourConstructionError::NoFeasibleTour {
                        reason: "none".to_string(),
                    }),
                ),
                (
                    "c".to_string(),
                    Ok(RouteResult::new(
                        Tour::from_indices(vec![0, 1, 2, 0], 3).unwrap(),
                        &addresses,
                        &matrix,
                    )),
                ),
            ]),
        };

        let (name, best) = report.best().unwrap();
        assert_eq!(name, "c");
        assert_eq!(best.total_cost, Cost::Finite(12.0));
        assert!(report.get("b").unwrap().is_err());
    }
}
