use std::{path::PathBuf, sync::Arc};

use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use roundtrip_optimizer::{
    service::RouteOptimizer,
    solver::{
        local_search_solver::LocalSearchSolver,
        solver_params::{DEFAULT_MAX_ITERATIONS, FirstSolutionStrategy, SolverParams, Termination},
    },
    tour::{nearest_neighbor::NearestNeighbor, solver_backend::SolverBackend},
};
use tracing::info;

use crate::{file_utils::read_addresses, output, parsers, provider_args::ProviderArgs};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FirstSolution {
    PathCheapestArc,
    CheapestInsertion,
}

impl From<FirstSolution> for FirstSolutionStrategy {
    fn from(strategy: FirstSolution) -> Self {
        match strategy {
            FirstSolution::PathCheapestArc => FirstSolutionStrategy::PathCheapestArc,
            FirstSolution::CheapestInsertion => FirstSolutionStrategy::CheapestInsertion,
        }
    }
}

#[derive(Args)]
pub struct OptimizeArgs {
    /// File with one address per line, the first one is where the trip starts
    #[arg(short = 'i', long)]
    input: PathBuf,

    #[command(flatten)]
    providers: ProviderArgs,

    /// Time budget of the solver backend (e.g., "2s", "PT1M")
    #[arg(long, value_parser = parsers::parse_duration, default_value = "2s")]
    solver_timeout: jiff::SignedDuration,

    /// Maximum number of improving moves of the solver backend
    #[arg(long, short = 'n', default_value_t = DEFAULT_MAX_ITERATIONS)]
    iterations: usize,

    #[arg(long, value_enum, default_value_t = FirstSolution::PathCheapestArc)]
    first_solution: FirstSolution,

    /// Print the results as JSON
    #[arg(long)]
    json: bool,
}

impl OptimizeArgs {
    fn solver_params(&self) -> SolverParams {
        SolverParams {
            first_solution_strategy: self.first_solution.into(),
            terminations: vec![
                Termination::Duration(self.solver_timeout),
                Termination::Iterations(self.iterations),
            ],
            ..SolverParams::default()
        }
    }
}

pub fn lookup_progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} cost lookups ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

pub async fn run(args: OptimizeArgs) -> anyhow::Result<()> {
    let addresses = read_addresses(&args.input)?;
    info!("Optimizing {} addresses from {:?}", addresses.len(), args.input);

    let provider = args.providers.cost_provider()?;
    let fingerprint = provider.fingerprint();
    info!("Cost provider: {:?}", provider.kind());

    let solver = LocalSearchSolver::new(args.solver_params());

    let bar = lookup_progress_bar();
    let progress_bar = bar.clone();

    let optimizer = RouteOptimizer::new(args.providers.geocoder()?, provider)
        .with_params(args.providers.optimizer_params()?)
        .with_constructors(vec![
            Arc::new(SolverBackend::new(solver)),
            Arc::new(NearestNeighbor),
        ])
        .with_cache(args.providers.cache(), fingerprint)
        .with_progress(Arc::new(move |done: usize, total: usize| {
            progress_bar.set_length(total as u64);
            progress_bar.set_position(done as u64);
        }));

    let report = optimizer.optimize(&addresses).await;
    bar.finish_and_clear();
    let report = report?;

    if report.matrix_failures > 0 {
        info!(
            "{} cost lookups failed and were treated as unreachable",
            report.matrix_failures
        );
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::report_json(&report))?
        );
    } else {
        println!("{}", output::report_table(&report, args.providers.metric()));
    }

    Ok(())
}
