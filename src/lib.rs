//! Pickup Planner - forecast-driven pickup scheduling
//!
//! Turns predicted vessel-volume curves into a feasible, minimum-fleet
//! pickup schedule: shortest travel times across the facility network,
//! pickup jobs with time windows synthesized from threshold crossings,
//! window repair, pre-search diagnostics, and an incremental search for the
//! smallest vehicle count with a feasible time- and capacity-constrained
//! routing plan.

pub mod error;
pub mod pipeline;
pub mod services;
pub mod sources;
pub mod types;

pub use error::PlanError;
pub use pipeline::{PlanOutcome, PlanSnapshot, Planner};
pub use services::diagnostics::{run_diagnostics, Diagnostics, TightWindow};
pub use services::job_builder::{build_pickup_jobs, JobBuilderConfig};
pub use services::router::{FleetPlan, FleetRouter, RouterConfig, RoutingModel};
pub use services::travel_time::{build_travel_time_matrix, TravelTimeMatrix};
pub use services::window_repair::{repair_windows, WindowRepairConfig};
