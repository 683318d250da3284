use serde::Deserialize;
use tracing::debug;

use crate::{
    cost::Cost,
    cost_provider::{CostLookupError, CostMetric, CostProvider},
    location::Location,
};

pub const OSRM_ROUTE_API_PATH: &str = "/route/v1/";
pub const OSRM_PUBLIC_URL: &str = "https://router.project-osrm.org";

#[derive(Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    /// Travel time in seconds
    duration: f64,

    /// Distance in meters
    distance: f64,
}

#[derive(Debug, Clone)]
pub struct OsrmCostProviderParams {
    pub osrm_url: String,
    pub profile: String,
    pub metric: CostMetric,
}

/// Road-network costs from an OSRM `route` service, one request per pair.
pub struct OsrmCostProvider {
    params: OsrmCostProviderParams,
    client: reqwest::Client,
}

impl OsrmCostProvider {
    pub fn new(params: OsrmCostProviderParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    fn route_url(&self, origin: &Location, destination: &Location) -> String {
        let mut url = self.params.osrm_url.trim_end_matches('/').to_string();
        url.push_str(OSRM_ROUTE_API_PATH);
        url.push_str(&self.params.profile);
        url.push('/');
        url.push_str(&format!(
            "{},{};{},{}",
            origin.lon(),
            origin.lat(),
            destination.lon(),
            destination.lat()
        ));

        url
    }
}

impl CostProvider for OsrmCostProvider {
    async fn cost(&self, origin: &Location, destination: &Location) -> Result<Cost, CostLookupError> {
        let url = self.route_url(origin, destination);
        debug!("OsrmApi: GET {}", url);

        let response = self
            .client
            .get(url)
            .query(&[("overview", "false"), ("steps", "false")])
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        cost_from_response(status, &body, self.params.metric)
    }
}

/// OSRM answers "no route" with a 400 and `code: "NoRoute"`, so the body is
/// inspected before the status.
fn cost_from_response(status: u16, body: &str, metric: CostMetric) -> Result<Cost, CostLookupError> {
    let response: OsrmRouteResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(_) if !(200..300).contains(&status) => {
            return Err(CostLookupError::Api {
                status,
                message: body.to_string(),
            });
        }
        Err(err) => return Err(CostLookupError::Deserialize(err)),
    };

    match response.code.as_str() {
        "Ok" => Ok(response
            .routes
            .first()
            .map_or(Cost::Unreachable, |route| match metric {
                CostMetric::Duration => Cost::new(route.duration),
                CostMetric::Distance => Cost::new(route.distance),
            })),
        "NoRoute" => Ok(Cost::Unreachable),
        code => Err(CostLookupError::Api {
            status,
            message: response.message.unwrap_or_else(|| code.to_string()),
        }),
    }
}
