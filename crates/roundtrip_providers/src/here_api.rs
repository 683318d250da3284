use serde::Deserialize;
use tracing::debug;

use crate::{
    cost::Cost,
    cost_provider::{CostLookupError, CostMetric, CostProvider},
    location::Location,
};

pub const HERE_ROUTES_API_URL: &str = "https://router.hereapi.com/v8/routes";

#[derive(Deserialize)]
struct HereRoutesResponse {
    #[serde(default)]
    routes: Vec<HereRoute>,
}

#[derive(Deserialize)]
struct HereRoute {
    sections: Vec<HereSection>,
}

#[derive(Deserialize)]
struct HereSection {
    summary: HereSummary,
}

#[derive(Deserialize)]
struct HereSummary {
    /// Travel time in seconds, including live traffic
    duration: f64,

    /// Distance in meters
    length: f64,
}

#[derive(Debug, Clone)]
pub struct HereCostProviderParams {
    pub url: String,
    pub api_key: String,
    pub transport_mode: String,
    pub metric: CostMetric,
}

/// Traffic-aware costs from the HERE Routing v8 API.
pub struct HereCostProvider {
    params: HereCostProviderParams,
    client: reqwest::Client,
}

impl HereCostProvider {
    pub fn new(params: HereCostProviderParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }
}

impl CostProvider for HereCostProvider {
    async fn cost(&self, origin: &Location, destination: &Location) -> Result<Cost, CostLookupError> {
        let origin = format!("{},{}", origin.lat(), origin.lon());
        let destination = format!("{},{}", destination.lat(), destination.lon());
        debug!("HereApi: route {} -> {}", origin, destination);

        let response = self
            .client
            .get(&self.params.url)
            .query(&[
                ("transportMode", self.params.transport_mode.as_str()),
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("return", "summary"),
                ("apikey", self.params.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(without_api_key)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(CostLookupError::Api { status, message });
        }

        let body = response.text().await.map_err(without_api_key)?;
        cost_from_body(&body, self.params.metric)
    }
}

/// The request URL carries the API key, reqwest errors print it.
fn without_api_key(err: reqwest::Error) -> CostLookupError {
    CostLookupError::Request(err.without_url())
}

/// An empty `routes` array is HERE's way of saying there is no route. Only
/// the first section of the first route is priced.
fn cost_from_body(body: &str, metric: CostMetric) -> Result<Cost, CostLookupError> {
    let response: HereRoutesResponse = serde_json::from_str(body)?;

    let Some(section) = response
        .routes
        .first()
        .and_then(|route| route.sections.first())
    else {
        return Ok(Cost::Unreachable);
    };

    Ok(match metric {
        CostMetric::Duration => Cost::new(section.summary.duration),
        CostMetric::Distance => Cost::new(section.summary.length),
    })
}
