//! Pre-search diagnostics.
//!
//! Pure, read-only checks surfaced to the caller before the fleet search
//! begins. None of them is fatal by itself: unreachable nodes and tight
//! windows are warnings the caller may choose to proceed past.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PlanError;
use crate::services::travel_time::TravelTimeMatrix;
use crate::types::PickupJob;

/// A job cannot be serviced even by a dedicated vehicle when its window is
/// shorter than travel and service need, padded by this floor.
const MIN_SERVICE_PAD_MINUTES: f64 = 10.0;

/// A job whose window is too short for its physical minimum requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TightWindow {
    pub job_id: String,
    pub node_id: String,
    pub window_minutes: f64,
    pub required_minutes: f64,
}

/// Result of the pre-search checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// Minimum feasible fleet size ignoring time constraints.
    pub capacity_lower_bound: usize,
    /// Job nodes with no finite depot round trip.
    pub unreachable_nodes: Vec<String>,
    /// Jobs that cannot be serviced even by a dedicated vehicle.
    pub tight_windows: Vec<TightWindow>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.unreachable_nodes.is_empty() && self.tight_windows.is_empty()
    }
}

/// Capacity-only lower bound on the fleet size:
/// `max(1, ceil(total_demand / vehicle_capacity))`.
pub fn capacity_lower_bound(jobs: &[PickupJob], vehicle_capacity: f64) -> usize {
    let total_demand: f64 = jobs.iter().map(|j| j.demand).sum();
    ((total_demand / vehicle_capacity).ceil() as usize).max(1)
}

/// Run all pre-search checks.
///
/// Fails fast on structural input problems (non-positive capacity, depot
/// missing from the matrix); everything else is reported, not raised.
pub fn run_diagnostics(
    jobs: &[PickupJob],
    matrix: &TravelTimeMatrix,
    depot_id: &str,
    vehicle_capacity: f64,
) -> Result<Diagnostics, PlanError> {
    if !vehicle_capacity.is_finite() || vehicle_capacity <= 0.0 {
        return Err(PlanError::InvalidCapacity(vehicle_capacity));
    }
    if !matrix.contains(depot_id) {
        return Err(PlanError::DepotMissing(depot_id.to_string()));
    }

    let mut unreachable_nodes: Vec<String> = Vec::new();
    for job in jobs {
        if unreachable_nodes.iter().any(|n| n == &job.node_id) {
            continue;
        }
        let out = matrix.minutes(depot_id, &job.node_id);
        let back = matrix.minutes(&job.node_id, depot_id);
        if out.is_infinite() || back.is_infinite() {
            unreachable_nodes.push(job.node_id.clone());
        }
    }

    let mut tight_windows: Vec<TightWindow> = Vec::new();
    for job in jobs {
        let t_dep = matrix.minutes(depot_id, &job.node_id);
        if t_dep.is_infinite() {
            // Already reported as unreachable.
            continue;
        }
        let window = (job.latest - job.earliest).num_seconds() as f64 / 60.0;
        let required = t_dep
            .max(job.service_minutes as f64)
            .max(MIN_SERVICE_PAD_MINUTES);
        if window < required {
            tight_windows.push(TightWindow {
                job_id: job.job_id.clone(),
                node_id: job.node_id.clone(),
                window_minutes: window,
                required_minutes: required,
            });
        }
    }

    if !unreachable_nodes.is_empty() {
        warn!("{} job nodes unreachable from depot", unreachable_nodes.len());
    }
    if !tight_windows.is_empty() {
        warn!("{} jobs have infeasibly tight windows", tight_windows.len());
    }

    Ok(Diagnostics {
        capacity_lower_bound: capacity_lower_bound(jobs, vehicle_capacity),
        unreachable_nodes,
        tight_windows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::travel_time::build_travel_time_matrix;
    use crate::types::NetworkEdge;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn job(node_id: &str, demand: f64, window_minutes: i64) -> PickupJob {
        PickupJob {
            job_id: format!("{node_id}-0-0"),
            node_id: node_id.to_string(),
            earliest: at(10, 0),
            latest: at(10, 0) + Duration::minutes(window_minutes),
            demand,
            service_minutes: 8,
            target_level: 20.0,
            threshold: 90.0,
            max_volume: 100.0,
        }
    }

    fn matrix() -> TravelTimeMatrix {
        let edges = vec![
            NetworkEdge::new("depot", "near", 10.0),
            NetworkEdge::new("depot", "far", 40.0),
        ];
        build_travel_time_matrix(
            &edges,
            &[
                "depot".to_string(),
                "near".to_string(),
                "far".to_string(),
                "island".to_string(),
            ],
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_capacity_lower_bound_example() {
        // Total demand 230 with capacity 100 needs at least 3 vehicles.
        let jobs = vec![job("near", 100.0, 120), job("near", 80.0, 120), job("far", 50.0, 120)];
        assert_eq!(capacity_lower_bound(&jobs, 100.0), 3);
    }

    #[test]
    fn test_capacity_lower_bound_is_at_least_one() {
        assert_eq!(capacity_lower_bound(&[], 100.0), 1);
    }

    #[test]
    fn test_unreachable_node_flagged_once() {
        let jobs = vec![job("island", 10.0, 120), job("island", 10.0, 120), job("near", 10.0, 120)];
        let diagnostics = run_diagnostics(&jobs, &matrix(), "depot", 100.0).unwrap();

        assert_eq!(diagnostics.unreachable_nodes, vec!["island".to_string()]);
    }

    #[test]
    fn test_tight_window_flagged() {
        // Window 10 min < max(40 travel, 8 service, 10 pad) = 40.
        let jobs = vec![job("far", 10.0, 10)];
        let diagnostics = run_diagnostics(&jobs, &matrix(), "depot", 100.0).unwrap();

        assert_eq!(diagnostics.tight_windows.len(), 1);
        let tight = &diagnostics.tight_windows[0];
        assert_eq!(tight.node_id, "far");
        assert_eq!(tight.window_minutes, 10.0);
        assert_eq!(tight.required_minutes, 40.0);
    }

    #[test]
    fn test_pad_floor_applies_to_close_nodes() {
        // Travel 10, service 8: the pad keeps the requirement at 10, so a
        // 9 minute window is still tight.
        let jobs = vec![job("near", 10.0, 9)];
        let diagnostics = run_diagnostics(&jobs, &matrix(), "depot", 100.0).unwrap();
        assert_eq!(diagnostics.tight_windows.len(), 1);

        let jobs = vec![job("near", 10.0, 11)];
        let diagnostics = run_diagnostics(&jobs, &matrix(), "depot", 100.0).unwrap();
        assert!(diagnostics.tight_windows.is_empty());
    }

    #[test]
    fn test_clean_diagnostics() {
        let jobs = vec![job("near", 30.0, 120)];
        let diagnostics = run_diagnostics(&jobs, &matrix(), "depot", 100.0).unwrap();

        assert!(diagnostics.is_clean());
        assert_eq!(diagnostics.capacity_lower_bound, 1);
    }

    #[test]
    fn test_invalid_capacity_fails_fast() {
        let err = run_diagnostics(&[], &matrix(), "depot", 0.0).unwrap_err();
        assert!(matches!(err, PlanError::InvalidCapacity(_)));
        let err = run_diagnostics(&[], &matrix(), "depot", -5.0).unwrap_err();
        assert!(matches!(err, PlanError::InvalidCapacity(_)));
    }

    #[test]
    fn test_missing_depot_fails_fast() {
        let err = run_diagnostics(&[], &matrix(), "nowhere", 100.0).unwrap_err();
        assert!(matches!(err, PlanError::DepotMissing(_)));
    }
}
