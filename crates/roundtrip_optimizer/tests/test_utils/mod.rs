use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use roundtrip_optimizer::matrix::CostMatrix;
use roundtrip_providers::{
    geocoder::{Geocoder, GeocodingError},
    location::Location,
    static_geocoder::StaticGeocoder,
};

//
//  Stops on a grid, 0.01 degree apart, numbered row by row:
//
//  (6) (7) (8)
//  (3) (4) (5)
//  (0) (1) (2)
//
pub fn create_grid_geocoder(columns: usize, rows: usize) -> (StaticGeocoder, Vec<String>) {
    let mut geocoder = StaticGeocoder::new();
    let mut addresses = Vec::with_capacity(columns * rows);

    for row in 0..rows {
        for column in 0..columns {
            let address = format!("Stop {}", row * columns + column);
            geocoder.insert(
                address.clone(),
                Location::from_lat_lon(50.0 + row as f64 * 0.01, 4.0 + column as f64 * 0.01),
            );
            addresses.push(address);
        }
    }

    (geocoder, addresses)
}

/// Never answers within a reasonable time.
pub struct SlowGeocoder;

impl Geocoder for SlowGeocoder {
    async fn geocode(&self, address: &str) -> Result<Location, GeocodingError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(GeocodingError::NotFound {
            address: address.to_string(),
        })
    }
}

/// Asymmetric matrix with costs in `1..=100`, reproducible from `seed`.
/// Every `unreachable_every`-th off-diagonal cell is unreachable when set.
pub fn pseudo_random_matrix(size: usize, seed: u64, unreachable_every: Option<usize>) -> CostMatrix {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut cell = 0;

    let rows: Vec<Vec<f64>> = (0..size)
        .map(|from| {
            (0..size)
                .map(|to| {
                    if from == to {
                        return 0.0;
                    }

                    cell += 1;
                    if unreachable_every.is_some_and(|every| cell % every == 0) {
                        return f64::INFINITY;
                    }

                    rng.random_range(1..=100) as f64
                })
                .collect()
        })
        .collect();

    CostMatrix::from_values(rows).unwrap()
}
