//! Fleet-minimizing router.
//!
//! Incrementally searches vehicle counts, building a fresh time- and
//! capacity-constrained routing model per candidate count, and returns the
//! first feasible schedule. The default range starts at the capacity lower
//! bound and extends ten counts above it.

mod config;
mod extract;
mod model;
mod search;

pub use config::RouterConfig;
pub use extract::extract_schedule;
pub use model::{RouteEval, RouteNode, RouteNodeKind, RoutingModel, TimedVisit, UNREACHABLE_ARC_MINUTES};
pub use search::{solve_model, SearchOutcome};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::PlanError;
use crate::services::diagnostics::capacity_lower_bound;
use crate::services::travel_time::TravelTimeMatrix;
use crate::types::{PickupJob, Schedule};

/// How far past the lower bound the default search extends.
const DEFAULT_SEARCH_SPAN: usize = 10;

/// A feasible plan at the smallest discovered fleet size.
#[derive(Debug, Clone)]
pub struct FleetPlan {
    pub vehicle_count: usize,
    pub schedule: Schedule,
}

/// Minimum-fleet router over repaired pickup jobs.
pub struct FleetRouter {
    config: RouterConfig,
}

impl FleetRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    /// Search for the smallest vehicle count with a feasible plan.
    ///
    /// An empty job list short-circuits to an empty schedule with zero
    /// vehicles. Exhausting the count range yields
    /// `PlanError::SearchExhausted` — expected, not a crash; callers relax
    /// buffers, windows, or capacity and retry.
    pub fn solve(
        &self,
        matrix: &TravelTimeMatrix,
        jobs: &[PickupJob],
        depot_id: &str,
    ) -> Result<FleetPlan, PlanError> {
        let capacity = self.config.vehicle_capacity;
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(PlanError::InvalidCapacity(capacity));
        }
        if !matrix.contains(depot_id) {
            return Err(PlanError::DepotMissing(depot_id.to_string()));
        }
        if jobs.is_empty() {
            debug!("no pickup jobs in horizon, returning empty schedule");
            return Ok(FleetPlan {
                vehicle_count: 0,
                schedule: Schedule::empty(),
            });
        }

        let (start, max) = match self.config.search_range {
            Some((start, max)) => (start.max(1), max),
            None => {
                let lb = capacity_lower_bound(jobs, capacity);
                (lb, lb + DEFAULT_SEARCH_SPAN)
            }
        };

        info!(
            "fleet search over {} jobs, {}..={} vehicles, {}s budget per attempt",
            jobs.len(),
            start,
            max,
            self.config.time_budget_seconds
        );

        if self.config.parallel {
            self.solve_parallel(matrix, jobs, depot_id, start, max)
        } else {
            self.solve_sequential(matrix, jobs, depot_id, start, max)
        }
    }

    fn attempt_seed(&self, k: usize) -> u64 {
        self.config.seed.unwrap_or(0x5eed).wrapping_add(k as u64)
    }

    fn solve_sequential(
        &self,
        matrix: &TravelTimeMatrix,
        jobs: &[PickupJob],
        depot_id: &str,
        start: usize,
        max: usize,
    ) -> Result<FleetPlan, PlanError> {
        let budget = Duration::from_secs(self.config.time_budget_seconds);

        for k in start..=max {
            let model = RoutingModel::build(matrix, jobs, depot_id, k, &self.config)?;
            let attempt_started = Instant::now();
            let outcome = solve_model(&model, budget, self.attempt_seed(k), &|| false);
            debug!(
                "attempt with {} vehicles: feasible={} iterations={} elapsed={:?}",
                k,
                outcome.feasible,
                outcome.iterations,
                attempt_started.elapsed()
            );

            if outcome.feasible {
                info!("feasible plan found with {} vehicles", k);
                return Ok(FleetPlan {
                    vehicle_count: k,
                    schedule: extract_schedule(&model, &outcome.routes, jobs),
                });
            }
        }

        Err(PlanError::SearchExhausted { start, max })
    }

    /// Independent attempts on scoped worker threads. An attempt at K stops
    /// cooperatively once some smaller-or-equal K has already proven
    /// feasible; the smallest feasible count wins.
    fn solve_parallel(
        &self,
        matrix: &TravelTimeMatrix,
        jobs: &[PickupJob],
        depot_id: &str,
        start: usize,
        max: usize,
    ) -> Result<FleetPlan, PlanError> {
        let budget = Duration::from_secs(self.config.time_budget_seconds);

        let mut models = Vec::with_capacity(max - start + 1);
        for k in start..=max {
            models.push(RoutingModel::build(matrix, jobs, depot_id, k, &self.config)?);
        }

        let best_feasible = AtomicUsize::new(usize::MAX);
        let plans: Mutex<Vec<FleetPlan>> = Mutex::new(Vec::new());

        std::thread::scope(|scope| {
            for (i, model) in models.iter().enumerate() {
                let k = start + i;
                let best_feasible = &best_feasible;
                let plans = &plans;
                let seed = self.attempt_seed(k);
                scope.spawn(move || {
                    let stop = move || best_feasible.load(Ordering::Relaxed) <= k;
                    if stop() {
                        return;
                    }
                    let outcome = solve_model(model, budget, seed, &stop);
                    if outcome.feasible {
                        best_feasible.fetch_min(k, Ordering::Relaxed);
                        plans.lock().push(FleetPlan {
                            vehicle_count: k,
                            schedule: extract_schedule(model, &outcome.routes, jobs),
                        });
                    }
                });
            }
        });

        let mut plans = plans.into_inner();
        plans.sort_by_key(|p| p.vehicle_count);
        match plans.into_iter().next() {
            Some(plan) => {
                info!("feasible plan found with {} vehicles", plan.vehicle_count);
                Ok(plan)
            }
            None => Err(PlanError::SearchExhausted { start, max }),
        }
    }
}
