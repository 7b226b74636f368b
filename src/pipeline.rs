//! Pipeline orchestration.
//!
//! Wires the stages in strict dependency order: travel-time matrix, job
//! synthesis, diagnostics, window repair, fleet search. Every stage is a
//! blocking, pure transformation over an immutable snapshot; the async
//! surface only exists to pull that snapshot from the injected providers.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PlanError;
use crate::services::diagnostics::{run_diagnostics, Diagnostics};
use crate::services::job_builder::{build_pickup_jobs, JobBuilderConfig};
use crate::services::router::{FleetRouter, RouterConfig};
use crate::services::travel_time::build_travel_time_matrix;
use crate::services::window_repair::{repair_windows, WindowRepairConfig};
use crate::sources::{ForecastSource, NetworkSource, RosterSource};
use crate::types::{ForecastCurve, NetworkEdge, Node, PickupJob, Schedule, VehicleClass};

/// Read-only inputs for one planning run.
#[derive(Debug, Clone)]
pub struct PlanSnapshot {
    pub edges: Vec<NetworkEdge>,
    pub collection_points: Vec<Node>,
    pub depot: Node,
    pub curves: Vec<ForecastCurve>,
}

/// Everything a planning run produces for its collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutcome {
    /// Repaired pickup jobs the schedule was built from.
    pub jobs: Vec<PickupJob>,
    /// Pre-search warnings; never fatal by themselves.
    pub diagnostics: Diagnostics,
    /// Smallest fleet size found feasible (0 when no pickups were needed).
    pub vehicle_count: usize,
    pub schedule: Schedule,
}

/// The pickup planner.
#[derive(Debug, Clone)]
pub struct Planner {
    pub jobs: JobBuilderConfig,
    pub windows: WindowRepairConfig,
    pub router: RouterConfig,
    /// Treat recorded edges as bidirectional, taking the optimistic time
    /// when both directions are present.
    pub undirected_travel: bool,
}

impl Planner {
    pub fn new(router: RouterConfig) -> Self {
        Self {
            jobs: JobBuilderConfig::default(),
            windows: WindowRepairConfig::default(),
            router,
            undirected_travel: true,
        }
    }

    /// Run the full pipeline over an in-memory snapshot.
    pub fn plan_from_snapshot(&self, snapshot: &PlanSnapshot) -> Result<PlanOutcome, PlanError> {
        let mut node_ids: Vec<String> = Vec::with_capacity(snapshot.collection_points.len() + 1);
        node_ids.push(snapshot.depot.id.clone());
        node_ids.extend(snapshot.collection_points.iter().map(|n| n.id.clone()));

        let matrix =
            build_travel_time_matrix(&snapshot.edges, &node_ids, !self.undirected_travel)?;

        let jobs = build_pickup_jobs(&snapshot.curves, &snapshot.collection_points, &self.jobs);
        if jobs.is_empty() {
            info!("no vessel is predicted to overflow in the horizon");
        }

        let diagnostics = run_diagnostics(
            &jobs,
            &matrix,
            &snapshot.depot.id,
            self.router.vehicle_capacity,
        )?;
        debug!(
            "diagnostics: capacity lower bound {}, {} unreachable, {} tight",
            diagnostics.capacity_lower_bound,
            diagnostics.unreachable_nodes.len(),
            diagnostics.tight_windows.len()
        );

        let jobs = repair_windows(jobs, &matrix, &snapshot.depot.id, &self.windows);

        let plan = FleetRouter::new(self.router.clone()).solve(&matrix, &jobs, &snapshot.depot.id)?;

        Ok(PlanOutcome {
            jobs,
            diagnostics,
            vehicle_count: plan.vehicle_count,
            schedule: plan.schedule,
        })
    }

    /// Fetch a snapshot from the injected providers, collapse the roster to
    /// its conservative capacity, and plan.
    pub async fn plan(
        &self,
        network: &dyn NetworkSource,
        forecast: &dyn ForecastSource,
        roster: &dyn RosterSource,
    ) -> Result<PlanOutcome> {
        info!(
            "planning from sources: network={} forecast={} roster={}",
            network.name(),
            forecast.name(),
            roster.name()
        );

        let edges = network.edges().await.context("fetching network edges")?;
        let collection_points = network
            .collection_points()
            .await
            .context("fetching collection points")?;
        let depot = network.depot().await.context("fetching depot")?;
        let curves = forecast.curves().await.context("fetching forecast curves")?;
        let vehicles = roster.vehicles().await.context("fetching vehicle roster")?;

        let class = VehicleClass::from_roster(&vehicles, self.router.shift_length_minutes)
            .context("vehicle roster is empty")?;

        let mut router = self.router.clone();
        router.vehicle_capacity = class.capacity;
        let mut jobs = self.jobs.clone();
        // A single job must never exceed what one vehicle can carry.
        if jobs.max_job_split_capacity.is_none() {
            jobs.max_job_split_capacity = Some(class.capacity);
        }
        let planner = Planner {
            jobs,
            windows: self.windows.clone(),
            router,
            undirected_travel: self.undirected_travel,
        };

        let snapshot = PlanSnapshot {
            edges,
            collection_points,
            depot,
            curves,
        };
        Ok(planner.plan_from_snapshot(&snapshot)?)
    }
}
