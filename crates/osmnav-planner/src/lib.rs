//! `osmnav-planner`: route orchestration over the road graph.
//!
//! Decides when graph planning is needed at all, runs the path finder,
//! expands node sequences into pose routes, and performs incremental
//! edge-cancellation replanning.
//!
//! # Crate layout
//!
//! | Module      | Contents                                               |
//! |-------------|--------------------------------------------------------|
//! | [`planner`] | `RouteOrchestrator`, `Target`                          |
//! | [`route`]   | `Route`: ordered pose sequence                         |
//! | [`sink`]    | `RouteSink` observer trait, `NoopSink`                 |
//! | [`error`]   | `PlanError`, `PlanResult<T>`, `PlanOutcome`            |
//!
//! # Locking
//!
//! One mutex guards a whole planning-or-cancellation operation (graph,
//! finder, stored target and route together); a second guards the shared
//! position estimator. When both are needed the orchestrator takes them in
//! that order, so callbacks can hammer the estimator while a plan runs.

pub mod error;
pub mod planner;
pub mod route;
pub mod sink;

#[cfg(test)]
mod tests;

pub use error::{PlanError, PlanOutcome, PlanResult};
pub use planner::{RouteOrchestrator, Target};
pub use route::Route;
pub use sink::{NoopSink, RouteSink};
