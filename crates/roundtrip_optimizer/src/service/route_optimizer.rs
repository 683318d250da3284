use std::{collections::BTreeMap, sync::Arc, time::Duration};

use futures::{StreamExt, TryStreamExt};
use rayon::prelude::*;
use roundtrip_providers::{
    cache::{MatricesCache, MatrixCacheKey, NoCache},
    cost_provider::CostProvider,
    geocoder::{Geocoder, GeocodingError},
    location::Location,
};
use tracing::{info, instrument, warn};

use crate::{
    matrix::{
        CostMatrix, CostMatrixBuilder, CostMatrixBuilderParams, CostMatrixError, MatrixBuildReport,
    },
    solver::local_search_solver::LocalSearchSolver,
    timer_debug,
    tour::{TourConstructor, nearest_neighbor::NearestNeighbor, solver_backend::SolverBackend},
};

use super::{OptimizeError, OptimizationReport, RouteResult, VariantOutcome};

/// Called with `(done, total)` after every cost lookup.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RouteOptimizerParams {
    pub matrix: CostMatrixBuilderParams,
    /// Maximum number of geocoding requests in flight
    pub geocoding_concurrency: usize,
    pub geocoding_timeout: Duration,
}

impl Default for RouteOptimizerParams {
    fn default() -> Self {
        Self {
            matrix: CostMatrixBuilderParams::default(),
            geocoding_concurrency: 4,
            geocoding_timeout: Duration::from_secs(10),
        }
    }
}

/// Turns an ordered list of addresses into one tour per configured
/// constructor.
///
/// Addresses are geocoded, the cost matrix is built once, then every
/// constructor runs against that same matrix so their costs compare
/// directly. A failing constructor only loses its own entry in the report.
pub struct RouteOptimizer<G, P, C = NoCache> {
    geocoder: G,
    provider: P,
    cache: C,
    cache_fingerprint: u64,
    constructors: Vec<Arc<dyn TourConstructor>>,
    params: RouteOptimizerParams,
    progress: Option<ProgressCallback>,
}

impl<G, P> RouteOptimizer<G, P, NoCache>
where
    G: Geocoder,
    P: CostProvider,
{
    /// Runs the solver backend and nearest neighbor, without caching.
    pub fn new(geocoder: G, provider: P) -> Self {
        Self {
            geocoder,
            provider,
            cache: NoCache,
            cache_fingerprint: 0,
            constructors: vec![
                Arc::new(SolverBackend::<LocalSearchSolver>::default()),
                Arc::new(NearestNeighbor),
            ],
            params: RouteOptimizerParams::default(),
            progress: None,
        }
    }
}

impl<G, P, C> RouteOptimizer<G, P, C>
where
    G: Geocoder,
    P: CostProvider,
    C: MatricesCache,
{
    pub fn with_constructors(mut self, constructors: Vec<Arc<dyn TourConstructor>>) -> Self {
        self.constructors = constructors;
        self
    }

    pub fn with_params(mut self, params: RouteOptimizerParams) -> Self {
        self.params = params;
        self
    }

    /// Reuses matrices across runs. `provider_fingerprint` must change
    /// whenever the provider would answer differently.
    pub fn with_cache<C2: MatricesCache>(
        self,
        cache: C2,
        provider_fingerprint: u64,
    ) -> RouteOptimizer<G, P, C2> {
        RouteOptimizer {
            geocoder: self.geocoder,
            provider: self.provider,
            cache,
            cache_fingerprint: provider_fingerprint,
            constructors: self.constructors,
            params: self.params,
            progress: self.progress,
        }
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn params(&self) -> &RouteOptimizerParams {
        &self.params
    }

    pub fn constructor_names(&self) -> Vec<&str> {
        self.constructors
            .iter()
            .map(|constructor| constructor.name())
            .collect()
    }

    #[instrument(skip_all, level = "debug")]
    pub async fn optimize(&self, addresses: &[String]) -> Result<OptimizationReport, OptimizeError> {
        let addresses: Vec<String> = addresses
            .iter()
            .map(|address| address.trim())
            .filter(|address| !address.is_empty())
            .map(str::to_string)
            .collect();

        if addresses.len() < 2 {
            return Err(OptimizeError::InsufficientData {
                found: addresses.len(),
            });
        }

        let locations = timer_debug!("Geocoding", self.geocode(&addresses).await)?;
        let report = self.cost_matrix(&locations).await?;

        let matrix = Arc::new(report.matrix);
        let constructors = self.constructors.clone();

        let variants = tokio::task::spawn_blocking(move || {
            run_constructors(&constructors, &matrix, &addresses)
        })
        .await
        .map_err(|err| OptimizeError::Task(err.to_string()))?;

        Ok(OptimizationReport {
            matrix_failures: report.failed_lookups,
            variants,
        })
    }

    /// Runs every constructor against an existing matrix, on the calling
    /// thread.
    pub fn optimize_matrix(
        &self,
        addresses: &[String],
        matrix: &CostMatrix,
    ) -> Result<OptimizationReport, OptimizeError> {
        if addresses.len() != matrix.num_locations() {
            return Err(OptimizeError::AddressCountMismatch {
                addresses: addresses.len(),
                locations: matrix.num_locations(),
            });
        }

        if addresses.len() < 2 {
            return Err(OptimizeError::InsufficientData {
                found: addresses.len(),
            });
        }

        Ok(OptimizationReport {
            matrix_failures: 0,
            variants: run_constructors(&self.constructors, matrix, addresses),
        })
    }

    /// Resolves every address, keeping the input order. The first failure
    /// aborts the whole batch.
    pub async fn geocode(&self, addresses: &[String]) -> Result<Vec<Location>, GeocodingError> {
        let timeout = self.params.geocoding_timeout;

        futures::stream::iter(addresses)
            .map(|address| async move {
                tokio::time::timeout(timeout, self.geocoder.geocode(address))
                    .await
                    .unwrap_or_else(|_| {
                        Err(GeocodingError::Timeout {
                            address: address.clone(),
                        })
                    })
            })
            .buffered(self.params.geocoding_concurrency.max(1))
            .try_collect()
            .await
    }

    /// Builds the matrix for `locations`, or reads it back from the cache.
    ///
    /// Only complete matrices are cached, a matrix with failed lookups is
    /// rebuilt on the next run. Cache errors are logged and otherwise ignored.
    pub async fn cost_matrix(&self, locations: &[Location]) -> Result<MatrixBuildReport, CostMatrixError> {
        let key = MatrixCacheKey::new(locations, self.cache_fingerprint);

        match self.cache.get_cached(&key) {
            Ok(Some(cached)) => match CostMatrix::from_cached(cached) {
                Ok(matrix) if matrix.num_locations() == locations.len() => {
                    info!(file = %key.filename(), "Using cached cost matrix");
                    return Ok(MatrixBuildReport {
                        matrix,
                        failed_lookups: 0,
                    });
                }
                Ok(matrix) => warn!(
                    cached = matrix.num_locations(),
                    expected = locations.len(),
                    "Ignoring cached matrix of the wrong size"
                ),
                Err(err) => warn!(error = %err, "Ignoring invalid cached matrix"),
            },
            Ok(None) => {}
            Err(err) => warn!(error = %err, "Failed to read matrix cache"),
        }

        let builder = CostMatrixBuilder::new(self.params.matrix.clone());
        let report = match &self.progress {
            Some(progress) => {
                builder
                    .build_with_progress(locations, &self.provider, |done, total| {
                        progress(done, total)
                    })
                    .await?
            }
            None => builder.build(locations, &self.provider).await?,
        };

        if report.failed_lookups == 0 {
            if let Err(err) = self.cache.cache(&key, &report.matrix.to_cached()) {
                warn!(error = %err, "Failed to cache cost matrix");
            }
        }

        Ok(report)
    }
}

fn run_constructors(
    constructors: &[Arc<dyn TourConstructor>],
    matrix: &CostMatrix,
    addresses: &[String],
) -> BTreeMap<String, VariantOutcome> {
    constructors
        .par_iter()
        .map(|constructor| {
            let name = constructor.name().to_string();

            let outcome = timer_debug!(
                format!("Constructor {name}"),
                constructor.construct(matrix)
            )
            .map(|tour| RouteResult::new(tour, addresses, matrix));

            match &outcome {
                Ok(result) => info!(variant = %name, total_cost = %result.total_cost, "Tour constructed"),
                Err(err) => warn!(variant = %name, error = %err, "No tour constructed"),
            }

            (name, outcome)
        })
        .collect()
}
