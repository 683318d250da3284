use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use roundtrip_providers::{
    cost::Cost,
    cost_provider::{CostLookupError, CostProvider},
    geocoder::{Geocoder, GeocodingError},
    location::Location,
};

/// Location `i` sits at latitude `i`, which lets the table provider find its
/// row and column back.
pub fn create_location(index: usize) -> Location {
    Location::from_lat_lon(index as f64, 0.0)
}

pub fn create_locations(count: usize) -> Vec<Location> {
    (0..count).map(create_location).collect()
}

fn location_index(location: &Location) -> usize {
    location.lat() as usize
}

/// Answers cost lookups from a fixed table. Infinite entries are reported as
/// "no route".
pub struct TableCostProvider {
    rows: Vec<Vec<f64>>,
    failing: Vec<(usize, usize)>,
    slow: Vec<(usize, usize)>,
    pub calls: AtomicUsize,
}

impl TableCostProvider {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self {
            rows,
            failing: Vec::new(),
            slow: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(mut self, from: usize, to: usize) -> Self {
        self.failing.push((from, to));
        self
    }

    pub fn slow(mut self, from: usize, to: usize) -> Self {
        self.slow.push((from, to));
        self
    }
}

impl CostProvider for TableCostProvider {
    async fn cost(&self, origin: &Location, destination: &Location) -> Result<Cost, CostLookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let pair = (location_index(origin), location_index(destination));

        if self.slow.contains(&pair) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }

        if self.failing.contains(&pair) {
            return Err(CostLookupError::Api {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }

        Ok(Cost::new(self.rows[pair.0][pair.1]))
    }
}

/// Resolves `address` to the location registered under that name.
#[derive(Default)]
pub struct TableGeocoder {
    entries: HashMap<String, Location>,
}

impl TableGeocoder {
    pub fn new(addresses: &[&str]) -> Self {
        Self {
            entries: addresses
                .iter()
                .enumerate()
                .map(|(index, address)| (address.to_string(), create_location(index)))
                .collect(),
        }
    }
}

impl Geocoder for TableGeocoder {
    async fn geocode(&self, address: &str) -> Result<Location, GeocodingError> {
        self.entries
            .get(address)
            .copied()
            .ok_or_else(|| GeocodingError::NotFound {
                address: address.to_string(),
            })
    }
}

pub fn addresses(addresses: &[&str]) -> Vec<String> {
    addresses.iter().map(|address| address.to_string()).collect()
}
