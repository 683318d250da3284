use serde::Deserialize;
use tracing::debug;

use crate::{
    geocoder::{Geocoder, GeocodingError},
    location::Location,
};

pub const NOMINATIM_PUBLIC_URL: &str = "https://nominatim.openstreetmap.org";
pub const NOMINATIM_SEARCH_API_PATH: &str = "/search";

/// Nominatim returns coordinates as strings.
#[derive(Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoderParams {
    pub nominatim_url: String,
    /// Nominatim's usage policy requires an identifying user agent
    pub user_agent: String,
}

pub struct NominatimGeocoder {
    params: NominatimGeocoderParams,
    client: reqwest::Client,
}

impl NominatimGeocoder {
    pub fn new(params: NominatimGeocoderParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    fn search_url(&self) -> String {
        format!(
            "{}{}",
            self.params.nominatim_url.trim_end_matches('/'),
            NOMINATIM_SEARCH_API_PATH
        )
    }
}

impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Location, GeocodingError> {
        debug!("NominatimApi: search {:?}", address);

        let response = self
            .client
            .get(self.search_url())
            .header(reqwest::header::USER_AGENT, &self.params.user_agent)
            .query(&[("q", address), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await
            .map_err(|source| GeocodingError::Request {
                address: address.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GeocodingError::Api {
                address: address.to_string(),
                status,
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| GeocodingError::Request {
                address: address.to_string(),
                source,
            })?;

        location_from_body(address, &body)
    }
}

fn location_from_body(address: &str, body: &str) -> Result<Location, GeocodingError> {
    let invalid = |message: String| GeocodingError::Api {
        address: address.to_string(),
        status: 200,
        message,
    };

    let places: Vec<NominatimPlace> =
        serde_json::from_str(body).map_err(|err| invalid(err.to_string()))?;

    let place = places.first().ok_or_else(|| GeocodingError::NotFound {
        address: address.to_string(),
    })?;

    let lat = place
        .lat
        .parse::<f64>()
        .map_err(|err| invalid(format!("invalid latitude {:?}: {err}", place.lat)))?;
    let lon = place
        .lon
        .parse::<f64>()
        .map_err(|err| invalid(format!("invalid longitude {:?}: {err}", place.lon)))?;

    Ok(Location::from_lat_lon(lat, lon))
}
