use std::time::Duration;

use futures::StreamExt;
use roundtrip_providers::{
    cost::Cost,
    cost_provider::{CostLookupError, CostProvider},
    location::Location,
};
use tracing::{debug, info, warn};

use super::{CostMatrix, CostMatrixError, LocationIdx};

#[derive(Debug, Clone)]
pub struct CostMatrixBuilderParams {
    /// Maximum number of cost lookups in flight
    pub concurrency: usize,
    /// Lookups slower than this are treated as unreachable
    pub call_timeout: Duration,
}

impl Default for CostMatrixBuilderParams {
    fn default() -> Self {
        Self {
            concurrency: 8,
            call_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatrixBuildReport {
    pub matrix: CostMatrix,
    /// Cells that failed or timed out and were recorded as unreachable
    pub failed_lookups: usize,
}

/// Fills a [`CostMatrix`] by asking a [`CostProvider`] for every ordered
/// pair of distinct locations.
///
/// Every off-diagonal cell costs exactly one provider call, nothing is
/// deduplicated since costs may differ by direction. A call that fails or
/// exceeds the timeout leaves its cell unreachable instead of failing the
/// build.
#[derive(Debug, Clone, Default)]
pub struct CostMatrixBuilder {
    params: CostMatrixBuilderParams,
}

impl CostMatrixBuilder {
    pub fn new(params: CostMatrixBuilderParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CostMatrixBuilderParams {
        &self.params
    }

    pub async fn build<P>(
        &self,
        locations: &[Location],
        provider: &P,
    ) -> Result<MatrixBuildReport, CostMatrixError>
    where
        P: CostProvider,
    {
        self.build_with_progress(locations, provider, |_, _| {})
            .await
    }

    /// Same as [`CostMatrixBuilder::build`], calling `on_progress(done, total)`
    /// after each completed lookup.
    pub async fn build_with_progress<P, F>(
        &self,
        locations: &[Location],
        provider: &P,
        mut on_progress: F,
    ) -> Result<MatrixBuildReport, CostMatrixError>
    where
        P: CostProvider,
        F: FnMut(usize, usize),
    {
        let num_locations = locations.len();
        if num_locations == 0 {
            return Err(CostMatrixError::Empty);
        }

        let total = num_locations * (num_locations - 1);
        info!(
            locations = num_locations,
            lookups = total,
            concurrency = self.params.concurrency,
            "Building cost matrix"
        );

        let mut costs = vec![Cost::ZERO; num_locations * num_locations];
        let call_timeout = self.params.call_timeout;

        let pairs = (0..num_locations).flat_map(|from| {
            (0..num_locations)
                .filter(move |&to| to != from)
                .map(move |to| (LocationIdx::new(from), LocationIdx::new(to)))
        });

        let mut lookups = futures::stream::iter(pairs)
            .map(|(from, to)| async move {
                let result = tokio::time::timeout(
                    call_timeout,
                    provider.cost(&locations[from], &locations[to]),
                )
                .await
                .unwrap_or_else(|_| Err(CostLookupError::Timeout(call_timeout)));

                (from, to, result)
            })
            .buffer_unordered(self.params.concurrency.max(1));

        let mut done = 0;
        let mut failed_lookups = 0;

        while let Some((from, to, result)) = lookups.next().await {
            let cost = match result {
                Ok(cost) => {
                    debug!(%from, %to, %cost, "Cost lookup");
                    cost
                }
                Err(err) => {
                    warn!(%from, %to, error = %err, "Cost lookup failed, cell marked unreachable");
                    failed_lookups += 1;
                    Cost::Unreachable
                }
            };

            costs[from.get() * num_locations + to.get()] = cost;

            done += 1;
            on_progress(done, total);
        }

        if failed_lookups > 0 {
            warn!(failed_lookups, "Cost matrix built with failed lookups");
        }

        Ok(MatrixBuildReport {
            matrix: CostMatrix::from_flat(costs, num_locations)?,
            failed_lookups,
        })
    }
}
