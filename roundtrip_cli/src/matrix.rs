use std::{path::PathBuf, sync::Arc};

use clap::Args;
use roundtrip_optimizer::service::RouteOptimizer;
use tracing::info;

use crate::{
    file_utils::read_addresses, optimize::lookup_progress_bar, output,
    provider_args::ProviderArgs,
};

#[derive(Args)]
pub struct MatrixArgs {
    /// File with one address per line
    #[arg(short = 'i', long)]
    input: PathBuf,

    #[command(flatten)]
    providers: ProviderArgs,

    /// Print the matrix as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: MatrixArgs) -> anyhow::Result<()> {
    let addresses = read_addresses(&args.input)?;

    let provider = args.providers.cost_provider()?;
    let fingerprint = provider.fingerprint();

    let bar = lookup_progress_bar();
    let progress_bar = bar.clone();

    let optimizer = RouteOptimizer::new(args.providers.geocoder()?, provider)
        .with_params(args.providers.optimizer_params()?)
        .with_cache(args.providers.cache(), fingerprint)
        .with_progress(Arc::new(move |done: usize, total: usize| {
            progress_bar.set_length(total as u64);
            progress_bar.set_position(done as u64);
        }));

    let locations = optimizer.geocode(&addresses).await?;
    let report = optimizer.cost_matrix(&locations).await;
    bar.finish_and_clear();
    let report = report?;

    info!(
        "Cost matrix for {} addresses, {} failed lookups, {} unreachable cells",
        addresses.len(),
        report.failed_lookups,
        report.matrix.unreachable_cells()
    );

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::matrix_json(&addresses, &report.matrix))?
        );
    } else {
        println!(
            "{}",
            output::matrix_table(&addresses, &report.matrix, args.providers.metric())
        );
    }

    Ok(())
}
