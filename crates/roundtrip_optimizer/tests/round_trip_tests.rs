use std::{sync::Arc, time::Duration};

use roundtrip_optimizer::{
    matrix::CostMatrixBuilderParams,
    service::{OptimizeError, RouteOptimizer, RouteOptimizerParams, RouteStatus},
    solver::local_search_solver::LocalSearchSolver,
    tour::{
        Tour, TourConstructor,
        evaluator::total_cost,
        nearest_neighbor::{NEAREST_NEIGHBOR, NearestNeighbor},
        solver_backend::{SOLVER_BACKEND, SolverBackend},
    },
};
use roundtrip_providers::{
    as_the_crow_flies::AsTheCrowFlies, cost::Cost, cost_provider::CostMetric,
};

mod test_utils;

fn constructors() -> Vec<Arc<dyn TourConstructor>> {
    vec![
        Arc::new(SolverBackend::<LocalSearchSolver>::default()),
        Arc::new(NearestNeighbor),
    ]
}

fn assert_valid_tour(tour: &Tour, num_locations: usize) {
    let indices = tour.indices();

    assert_eq!(indices.len(), num_locations + 1);
    assert_eq!(indices[0], 0);
    assert_eq!(indices[num_locations], 0);

    let mut visited = indices[..num_locations].to_vec();
    visited.sort();
    assert_eq!(visited, (0..num_locations).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_grid_round_trip() {
    let (geocoder, addresses) = test_utils::create_grid_geocoder(3, 3);
    let optimizer = RouteOptimizer::new(geocoder, AsTheCrowFlies::new(30.0, CostMetric::Distance));

    let report = optimizer.optimize(&addresses).await.unwrap();

    assert_eq!(report.matrix_failures, 0);
    assert_eq!(report.variants.len(), 2);

    let greedy = report.get(NEAREST_NEIGHBOR).unwrap().as_ref().unwrap();
    let solved = report.get(SOLVER_BACKEND).unwrap().as_ref().unwrap();

    for result in [greedy, solved] {
        assert_valid_tour(&result.tour, 9);
        assert_eq!(result.status(), RouteStatus::Feasible);
        assert_eq!(result.addresses.first(), Some(&addresses[0]));
        assert_eq!(result.addresses.last(), Some(&addresses[0]));
        assert_eq!(result.addresses.len(), 10);
    }

    assert!(solved.total_cost <= greedy.total_cost);
}

#[tokio::test]
async fn test_address_order_is_kept() {
    let (geocoder, addresses) = test_utils::create_grid_geocoder(4, 1);
    let reversed: Vec<String> = addresses.iter().rev().cloned().collect();

    let optimizer = RouteOptimizer::new(geocoder, AsTheCrowFlies::new(30.0, CostMetric::Distance))
        .with_params(RouteOptimizerParams {
            geocoding_concurrency: 3,
            ..RouteOptimizerParams::default()
        });

    let locations = optimizer.geocode(&reversed).await.unwrap();

    assert_eq!(locations.len(), 4);
    for pair in locations.windows(2) {
        assert!(pair[0].lon() > pair[1].lon());
    }

    let report = optimizer.optimize(&reversed).await.unwrap();
    let greedy = report.get(NEAREST_NEIGHBOR).unwrap().as_ref().unwrap();
    assert_eq!(greedy.addresses[0], "Stop 3");
}

#[tokio::test(start_paused = true)]
async fn test_geocoding_timeout_aborts() {
    let optimizer = RouteOptimizer::new(
        test_utils::SlowGeocoder,
        AsTheCrowFlies::new(30.0, CostMetric::Distance),
    )
    .with_params(RouteOptimizerParams {
        matrix: CostMatrixBuilderParams::default(),
        geocoding_concurrency: 2,
        geocoding_timeout: Duration::from_secs(1),
    });

    let result = optimizer
        .optimize(&["A".to_string(), "B".to_string()])
        .await;

    match result {
        Err(OptimizeError::Geocoding(err)) => assert_eq!(err.address(), "A"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_every_constructor_builds_a_valid_tour() {
    for size in 1..=9 {
        for seed in 0..5 {
            let matrix = test_utils::pseudo_random_matrix(size, seed, None);

            for constructor in constructors() {
                let tour = constructor.construct(&matrix).unwrap();
                assert_valid_tour(&tour, size);
                assert!(!total_cost(&matrix, &tour).is_unreachable());
            }
        }
    }
}

#[test]
fn test_solver_never_loses_to_nearest_neighbor() {
    let solver = SolverBackend::<LocalSearchSolver>::default();

    for seed in 0..10 {
        let matrix = test_utils::pseudo_random_matrix(8, seed, None);

        let greedy = total_cost(&matrix, &NearestNeighbor.construct(&matrix).unwrap());
        let solved = total_cost(&matrix, &solver.construct(&matrix).unwrap());

        assert!(solved <= greedy, "seed {seed}: {solved} > {greedy}");
    }
}

#[test]
fn test_unreachable_cells_never_break_construction() {
    for seed in 0..5 {
        let matrix = test_utils::pseudo_random_matrix(7, seed, Some(3));

        for constructor in constructors() {
            let tour = constructor.construct(&matrix).unwrap();
            assert_valid_tour(&tour, 7);

            let cost = total_cost(&matrix, &tour);
            let crosses_unreachable = tour
                .edges()
                .any(|(from, to)| matrix.get(from, to).is_unreachable());
            assert_eq!(cost.is_unreachable(), crosses_unreachable);
        }
    }
}

#[test]
fn test_nearest_neighbor_is_deterministic() {
    let matrix = test_utils::pseudo_random_matrix(9, 7, Some(5));

    let first = NearestNeighbor.construct(&matrix).unwrap();
    for _ in 0..10 {
        assert_eq!(NearestNeighbor.construct(&matrix).unwrap(), first);
    }
}

#[test]
fn test_trivial_tour_costs_nothing() {
    let matrix = test_utils::pseudo_random_matrix(1, 0, None);

    for constructor in constructors() {
        let tour = constructor.construct(&matrix).unwrap();
        assert_eq!(tour.indices(), vec![0, 0]);
        assert_eq!(total_cost(&matrix, &tour), Cost::ZERO);
    }
}
