use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    as_the_crow_flies::AsTheCrowFlies,
    cost::Cost,
    cost_provider::{CostLookupError, CostMetric, CostProvider},
    here_api::{HERE_ROUTES_API_URL, HereCostProvider, HereCostProviderParams},
    location::Location,
    osrm_api::{OsrmCostProvider, OsrmCostProviderParams},
};

/// Which cost provider to use. Secrets are not part of the kind so that it
/// can be hashed into cache keys and written to logs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CostProviderKind {
    AsTheCrowFlies {
        speed_kmh: f64,
        #[serde(default)]
        metric: CostMetric,
    },
    /// http://project-osrm.org/docs/v5.24.0/api/#route-service
    Osrm {
        url: String,
        profile: String,
        #[serde(default)]
        metric: CostMetric,
    },
    /// https://www.here.com/docs/bundle/routing-api-v8-api-reference
    Here {
        transport_mode: String,
        #[serde(default)]
        metric: CostMetric,
    },
}

impl std::hash::Hash for CostProviderKind {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            CostProviderKind::AsTheCrowFlies { speed_kmh, metric } => {
                state.write_u8(0);
                state.write_u64(speed_kmh.to_bits());
                metric.hash(state);
            }
            CostProviderKind::Osrm {
                url,
                profile,
                metric,
            } => {
                state.write_u8(1);
                url.hash(state);
                profile.hash(state);
                metric.hash(state);
            }
            CostProviderKind::Here {
                transport_mode,
                metric,
            } => {
                state.write_u8(2);
                transport_mode.hash(state);
                metric.hash(state);
            }
        }
    }
}

/// Credentials handed to providers at construction time.
#[derive(Default, Clone)]
pub struct ProviderCredentials {
    pub here_api_key: Option<String>,
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("here_api_key", &self.here_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ProviderConfigError {
    #[error("Missing API key for provider {0}")]
    MissingApiKey(&'static str),

    #[error("Speed must be a positive number of km/h, got {0}")]
    InvalidSpeed(f64),
}

enum Provider {
    AsTheCrowFlies(AsTheCrowFlies),
    Osrm(OsrmCostProvider),
    Here(HereCostProvider),
}

impl Provider {
    fn from_kind(
        kind: &CostProviderKind,
        credentials: &ProviderCredentials,
    ) -> Result<Self, ProviderConfigError> {
        match kind {
            CostProviderKind::AsTheCrowFlies { speed_kmh, metric } => {
                if !(speed_kmh.is_finite() && *speed_kmh > 0.0) {
                    return Err(ProviderConfigError::InvalidSpeed(*speed_kmh));
                }
                Ok(Provider::AsTheCrowFlies(AsTheCrowFlies::new(
                    *speed_kmh, *metric,
                )))
            }
            CostProviderKind::Osrm {
                url,
                profile,
                metric,
            } => Ok(Provider::Osrm(OsrmCostProvider::new(OsrmCostProviderParams {
                osrm_url: url.clone(),
                profile: profile.clone(),
                metric: *metric,
            }))),
            CostProviderKind::Here {
                transport_mode,
                metric,
            } => {
                let api_key = credentials
                    .here_api_key
                    .clone()
                    .ok_or(ProviderConfigError::MissingApiKey("here"))?;

                Ok(Provider::Here(HereCostProvider::new(HereCostProviderParams {
                    url: HERE_ROUTES_API_URL.to_string(),
                    api_key,
                    transport_mode: transport_mode.clone(),
                    metric: *metric,
                })))
            }
        }
    }

    async fn cost(&self, origin: &Location, destination: &Location) -> Result<Cost, CostLookupError> {
        match self {
            Provider::AsTheCrowFlies(provider) => provider.cost(origin, destination).await,
            Provider::Osrm(provider) => provider.cost(origin, destination).await,
            Provider::Here(provider) => provider.cost(origin, destination).await,
        }
    }
}

/// Dispatches cost lookups to the configured provider, optionally falling
/// back to a second provider when the first one fails.
///
/// The fallback is only consulted on errors. A primary that answers
/// "unreachable" is trusted.
pub struct CostProviderClient {
    kind: CostProviderKind,
    provider: Provider,
    fallback: Option<(CostProviderKind, Provider)>,
}

impl CostProviderClient {
    pub fn new(
        kind: CostProviderKind,
        credentials: &ProviderCredentials,
    ) -> Result<Self, ProviderConfigError> {
        let provider = Provider::from_kind(&kind, credentials)?;

        Ok(Self {
            kind,
            provider,
            fallback: None,
        })
    }

    pub fn with_fallback(
        mut self,
        kind: CostProviderKind,
        credentials: &ProviderCredentials,
    ) -> Result<Self, ProviderConfigError> {
        let provider = Provider::from_kind(&kind, credentials)?;
        self.fallback = Some((kind, provider));
        Ok(self)
    }

    pub fn kind(&self) -> &CostProviderKind {
        &self.kind
    }

    pub fn fallback_kind(&self) -> Option<&CostProviderKind> {
        self.fallback.as_ref().map(|(kind, _)| kind)
    }

    /// Identifies the configuration for matrix caching.
    pub fn fingerprint(&self) -> u64 {
        fxhash::hash64(&(&self.kind, self.fallback_kind()))
    }
}

impl CostProvider for CostProviderClient {
    async fn cost(&self, origin: &Location, destination: &Location) -> Result<Cost, CostLookupError> {
        match self.provider.cost(origin, destination).await {
            Ok(cost) => Ok(cost),
            Err(err) => match &self.fallback {
                Some((kind, fallback)) => {
                    warn!(error = %err, fallback = ?kind, "Cost lookup failed, using fallback provider");
                    fallback.cost(origin, destination).await
                }
                None => Err(err),
            },
        }
    }
}
