use crate::{
    cost::Cost,
    cost_provider::{CostLookupError, CostMetric, CostProvider},
    location::Location,
};

/// Straight-line provider: haversine distance, or haversine distance driven
/// at a constant speed. Needs no network and never fails.
#[derive(Debug, Clone, Copy)]
pub struct AsTheCrowFlies {
    speed_kmh: f64,
    metric: CostMetric,
}

impl AsTheCrowFlies {
    pub fn new(speed_kmh: f64, metric: CostMetric) -> Self {
        Self { speed_kmh, metric }
    }

    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    pub fn cost_between(&self, from: &Location, to: &Location) -> Cost {
        let distance = from.haversine_distance(to);

        match self.metric {
            CostMetric::Distance => Cost::new(distance),
            CostMetric::Duration => {
                let speed_ms = self.speed_kmh / 3.6;
                Cost::new(distance / speed_ms)
            }
        }
    }
}

impl CostProvider for AsTheCrowFlies {
    async fn cost(&self, origin: &Location, destination: &Location) -> Result<Cost, CostLookupError> {
        Ok(self.cost_between(origin, destination))
    }
}
