//! Route transfer optimization.
//!
//! This module implements the engine that answers: "which underutilized
//! bus routes could be emptied by moving their riders onto other routes
//! that share a usable boarding point?"
//!
//! The planner runs as one synchronous pass per invocation over two
//! read-only seams (the route/booking catalog and the stop directory),
//! consults a per-run capacity ledger, and emits an immutable run record.

mod config;
mod ledger;
mod optimize;
mod report;

pub use config::OptimizerConfig;
pub use ledger::CapacityLedger;
pub use optimize::{
    potential_savings, CompletedPlan, OptimizeError, Optimizer, RouteAnalysis, RouteCatalog,
    RoutePlan, RunOutcome, RunRequest, StopDirectory,
};
pub use report::{OptimizationRun, RunArchive, RunId, RunSummary};
