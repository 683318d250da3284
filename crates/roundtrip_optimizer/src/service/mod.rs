mod optimize_error;
mod route_optimizer;
mod route_result;

pub use optimize_error::OptimizeError;
pub use route_optimizer::{ProgressCallback, RouteOptimizer, RouteOptimizerParams};
pub use route_result::{OptimizationReport, RouteResult, RouteStatus, VariantOutcome};
