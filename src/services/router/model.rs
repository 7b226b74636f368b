//! Explicit in-memory routing model.
//!
//! The model holds everything a candidate fleet attempt needs: one synthetic
//! node per job plus the depot, integer-minute arc times, and the two
//! cumulative dimensions (clock and load). Representing it as plain data
//! keeps the search backend swappable without touching the router's public
//! contract.

use chrono::NaiveDateTime;

use crate::error::PlanError;
use crate::services::travel_time::TravelTimeMatrix;
use crate::types::PickupJob;

use super::config::RouterConfig;

/// Arc cost standing in for an unreachable facility pair. Large enough that
/// the search deprioritizes such arcs, without rejecting disconnected
/// inputs outright.
pub const UNREACHABLE_ARC_MINUTES: i64 = 1_000_000;

/// What a synthetic routing node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteNodeKind {
    Depot,
    /// Index into the job slice the model was built from.
    Job(usize),
}

/// One synthetic node of the routing model.
#[derive(Debug, Clone)]
pub struct RouteNode {
    pub kind: RouteNodeKind,
    /// `[earliest, latest]` service-start window in minutes from the model
    /// origin.
    pub window: (i64, i64),
    /// Minutes consumed at the node: departure = arrival + service.
    pub service_minutes: i64,
    /// Whole demand units consumed from vehicle capacity.
    pub demand_units: i64,
}

/// Timed visit produced by walking a route through the model.
#[derive(Debug, Clone, Copy)]
pub struct TimedVisit {
    /// Index into `RoutingModel::nodes`.
    pub node: usize,
    pub arrival_minute: i64,
    pub departure_minute: i64,
    /// Cumulative load after this visit.
    pub load_units: i64,
}

/// Evaluation of a single route: its timeline plus constraint violations.
/// A route is feasible when every violation is zero.
#[derive(Debug, Clone, Default)]
pub struct RouteEval {
    pub visits: Vec<TimedVisit>,
    pub travel_minutes: i64,
    pub window_violation: i64,
    pub capacity_violation: i64,
    pub shift_violation: i64,
}

impl RouteEval {
    pub fn is_feasible(&self) -> bool {
        self.window_violation == 0 && self.capacity_violation == 0 && self.shift_violation == 0
    }

    pub fn total_violation(&self) -> i64 {
        self.window_violation + self.capacity_violation + self.shift_violation
    }
}

/// A time- and capacity-constrained routing model for one candidate fleet
/// size. Built from scratch per attempt; immutable once built.
#[derive(Debug, Clone)]
pub struct RoutingModel {
    /// Node 0 is the depot; nodes 1.. are jobs in input order.
    pub nodes: Vec<RouteNode>,
    travel: Vec<Vec<i64>>,
    pub vehicles: usize,
    pub capacity_units: i64,
    pub shift_length_minutes: i64,
    /// Absolute timestamp that minute offset 0 maps to.
    pub origin: NaiveDateTime,
    pub depot_id: String,
}

impl RoutingModel {
    /// Build the model for `vehicles` identical vehicles.
    ///
    /// Jobs sharing a collection point stay distinct synthetic nodes so
    /// each can be visited and serviced independently.
    pub fn build(
        matrix: &TravelTimeMatrix,
        jobs: &[PickupJob],
        depot_id: &str,
        vehicles: usize,
        config: &RouterConfig,
    ) -> Result<Self, PlanError> {
        if !matrix.contains(depot_id) {
            return Err(PlanError::DepotMissing(depot_id.to_string()));
        }
        debug_assert!(!jobs.is_empty(), "router handles the empty job list before building");

        let origin = jobs.iter().map(|j| j.earliest).min().expect("non-empty jobs");
        let horizon_end = jobs.iter().map(|j| j.latest).max().expect("non-empty jobs");
        let depot_close = (horizon_end - origin).num_minutes() + config.horizon_pad_minutes;

        let mut nodes = Vec::with_capacity(jobs.len() + 1);
        nodes.push(RouteNode {
            kind: RouteNodeKind::Depot,
            window: (0, depot_close),
            service_minutes: config.unload_minutes,
            demand_units: 0,
        });
        for (i, job) in jobs.iter().enumerate() {
            nodes.push(RouteNode {
                kind: RouteNodeKind::Job(i),
                window: (
                    (job.earliest - origin).num_minutes(),
                    (job.latest - origin).num_minutes(),
                ),
                service_minutes: job.service_minutes,
                demand_units: job.demand.ceil() as i64,
            });
        }

        let facilities: Vec<&str> = nodes
            .iter()
            .map(|node| match node.kind {
                RouteNodeKind::Depot => depot_id,
                RouteNodeKind::Job(i) => jobs[i].node_id.as_str(),
            })
            .collect();
        let n = nodes.len();
        let mut travel = vec![vec![0i64; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let minutes = matrix.minutes(facilities[i], facilities[j]);
                travel[i][j] = if minutes.is_finite() {
                    minutes.round() as i64
                } else {
                    UNREACHABLE_ARC_MINUTES
                };
            }
        }

        Ok(Self {
            nodes,
            travel,
            vehicles,
            capacity_units: config.vehicle_capacity.floor() as i64,
            shift_length_minutes: config.shift_length_minutes,
            origin,
            depot_id: depot_id.to_string(),
        })
    }

    /// Arc time in minutes between two synthetic nodes.
    pub fn arc(&self, from: usize, to: usize) -> i64 {
        self.travel[from][to]
    }

    /// Number of job nodes (synthetic nodes excluding the depot).
    pub fn job_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Walk a route (job-node indices, depot legs implied) and produce its
    /// timeline and violations.
    ///
    /// Arrivals before a window open wait; arrivals past a window close are
    /// counted as violation minutes rather than rejected. The vehicle
    /// leaves the depot as late as possible for its first stop, and the
    /// shift-length bound applies to the span from that departure to the
    /// end of unloading back at the depot.
    pub fn evaluate_route(&self, route: &[usize]) -> RouteEval {
        let mut eval = RouteEval::default();
        if route.is_empty() {
            return eval;
        }

        let depot = &self.nodes[0];

        // Depart so the first stop is reached at its window open, never
        // before the depot opens.
        let first = route[0];
        let leg_out = self.arc(0, first);
        let first_arrival = (depot.window.0 + leg_out).max(self.nodes[first].window.0);
        let depot_departure = first_arrival - leg_out;

        eval.visits.push(TimedVisit {
            node: 0,
            arrival_minute: depot_departure,
            departure_minute: depot_departure,
            load_units: 0,
        });

        let mut load = 0i64;
        let mut cursor = depot_departure;
        let mut prev = 0usize;

        for &idx in route {
            let node = &self.nodes[idx];
            let leg = self.arc(prev, idx);
            eval.travel_minutes += leg;

            let arrival = (cursor + leg).max(node.window.0);
            if arrival > node.window.1 {
                eval.window_violation += arrival - node.window.1;
            }
            load += node.demand_units;
            let departure = arrival + node.service_minutes;

            eval.visits.push(TimedVisit {
                node: idx,
                arrival_minute: arrival,
                departure_minute: departure,
                load_units: load,
            });

            cursor = departure;
            prev = idx;
        }

        // Return leg plus unloading at the depot.
        let leg_back = self.arc(prev, 0);
        eval.travel_minutes += leg_back;
        let back_arrival = cursor + leg_back;
        if back_arrival > depot.window.1 {
            eval.window_violation += back_arrival - depot.window.1;
        }
        let back_departure = back_arrival + depot.service_minutes;
        eval.visits.push(TimedVisit {
            node: 0,
            arrival_minute: back_arrival,
            departure_minute: back_departure,
            load_units: load,
        });

        if load > self.capacity_units {
            eval.capacity_violation = load - self.capacity_units;
        }
        let span = back_departure - depot_departure;
        if span > self.shift_length_minutes {
            eval.shift_violation = span - self.shift_length_minutes;
        }

        eval
    }
}
