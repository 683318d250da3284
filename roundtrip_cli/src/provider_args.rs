use std::{path::PathBuf, time::Duration};

use anyhow::anyhow;
use clap::{Args, ValueEnum};
use roundtrip_optimizer::{matrix::CostMatrixBuilderParams, service::RouteOptimizerParams};
use roundtrip_providers::{
    cache::{CACHE_FOLDER_ENV_VAR, FileCache},
    cost_provider::CostMetric,
    cost_provider_client::{CostProviderClient, CostProviderKind, ProviderCredentials},
    geocoder_client::GeocoderClient,
    nominatim_api::{NOMINATIM_PUBLIC_URL, NominatimGeocoder, NominatimGeocoderParams},
    osrm_api::OSRM_PUBLIC_URL,
    static_geocoder::StaticGeocoder,
};
use tracing::{info, warn};

use crate::parsers;

const HERE_API_KEY_ENV_VAR: &str = "HERE_API_KEY";
const OSRM_URL_ENV_VAR: &str = "OSRM_URL";
const NOMINATIM_URL_ENV_VAR: &str = "NOMINATIM_URL";

const USER_AGENT: &str = concat!("roundtrip/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProviderChoice {
    /// Straight-line distance at a constant speed
    Crow,
    Osrm,
    Here,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MetricChoice {
    Duration,
    Distance,
}

impl From<MetricChoice> for CostMetric {
    fn from(metric: MetricChoice) -> Self {
        match metric {
            MetricChoice::Duration => CostMetric::Duration,
            MetricChoice::Distance => CostMetric::Distance,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GeocoderChoice {
    Nominatim,
    /// Coordinates read from the `--coordinates` file
    Static,
}

/// How addresses are located and how travel costs are looked up.
#[derive(Args)]
pub struct ProviderArgs {
    #[arg(long, value_enum, default_value_t = ProviderChoice::Crow)]
    provider: ProviderChoice,

    #[arg(long, value_enum, default_value_t = MetricChoice::Duration)]
    metric: MetricChoice,

    /// Average speed in km/h for the crow provider
    #[arg(long, default_value_t = 50.0)]
    speed: f64,

    #[arg(long, default_value = "driving")]
    osrm_profile: String,

    #[arg(long, default_value = "car")]
    here_transport_mode: String,

    /// Use straight-line estimates for pairs the provider fails on
    #[arg(long)]
    fallback_crow: bool,

    #[arg(long, value_enum, default_value_t = GeocoderChoice::Nominatim)]
    geocoder: GeocoderChoice,

    /// File of `address;lat;lon` lines for the static geocoder
    #[arg(long)]
    coordinates: Option<PathBuf>,

    /// Timeout of a single geocoding or cost lookup
    #[arg(long, value_parser = parsers::parse_duration, default_value = "10s")]
    timeout: jiff::SignedDuration,

    /// Cost lookups in flight
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Geocoding requests in flight, public Nominatim allows one
    #[arg(long, default_value_t = 1)]
    geocoding_concurrency: usize,

    /// Ignore the matrix cache folder
    #[arg(long)]
    no_cache: bool,
}

impl ProviderArgs {
    pub fn metric(&self) -> CostMetric {
        self.metric.into()
    }

    fn crow_kind(&self) -> CostProviderKind {
        CostProviderKind::AsTheCrowFlies {
            speed_kmh: self.speed,
            metric: self.metric(),
        }
    }

    fn provider_kind(&self) -> CostProviderKind {
        match self.provider {
            ProviderChoice::Crow => self.crow_kind(),
            ProviderChoice::Osrm => CostProviderKind::Osrm {
                url: std::env::var(OSRM_URL_ENV_VAR).unwrap_or_else(|_| OSRM_PUBLIC_URL.to_string()),
                profile: self.osrm_profile.clone(),
                metric: self.metric(),
            },
            ProviderChoice::Here => CostProviderKind::Here {
                transport_mode: self.here_transport_mode.clone(),
                metric: self.metric(),
            },
        }
    }

    pub fn cost_provider(&self) -> anyhow::Result<CostProviderClient> {
        let credentials = ProviderCredentials {
            here_api_key: std::env::var(HERE_API_KEY_ENV_VAR).ok(),
        };

        let client = CostProviderClient::new(self.provider_kind(), &credentials)?;

        if self.fallback_crow && self.provider != ProviderChoice::Crow {
            Ok(client.with_fallback(self.crow_kind(), &credentials)?)
        } else {
            Ok(client)
        }
    }

    pub fn geocoder(&self) -> anyhow::Result<GeocoderClient> {
        match self.geocoder {
            GeocoderChoice::Nominatim => Ok(GeocoderClient::Nominatim(NominatimGeocoder::new(
                NominatimGeocoderParams {
                    nominatim_url: std::env::var(NOMINATIM_URL_ENV_VAR)
                        .unwrap_or_else(|_| NOMINATIM_PUBLIC_URL.to_string()),
                    user_agent: USER_AGENT.to_string(),
                },
            ))),
            GeocoderChoice::Static => {
                let path = self
                    .coordinates
                    .as_ref()
                    .ok_or_else(|| anyhow!("--coordinates is required with --geocoder static"))?;

                Ok(GeocoderClient::Static(StaticGeocoder::from_file(path)?))
            }
        }
    }

    /// The cache folder comes from `ROUNDTRIP_CACHE_FOLDER`, caching is off
    /// when it is not set.
    pub fn cache(&self) -> Option<FileCache> {
        if self.no_cache || std::env::var_os(CACHE_FOLDER_ENV_VAR).is_none() {
            return None;
        }

        match FileCache::from_env() {
            Ok(cache) => {
                info!("Caching matrices in {}", cache.folder().display());
                Some(cache)
            }
            Err(err) => {
                warn!("Matrix cache disabled: {err}");
                None
            }
        }
    }

    pub fn optimizer_params(&self) -> anyhow::Result<RouteOptimizerParams> {
        let timeout = Duration::try_from(self.timeout)?;

        Ok(RouteOptimizerParams {
            matrix: CostMatrixBuilderParams {
                concurrency: self.concurrency,
                call_timeout: timeout,
            },
            geocoding_concurrency: self.geocoding_concurrency,
            geocoding_timeout: timeout,
        })
    }
}
