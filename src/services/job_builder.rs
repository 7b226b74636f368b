//! Pickup job synthesis from forecast curves.
//!
//! Scans each predicted volume curve for the first upward crossing of the
//! overflow threshold and turns it into a pickup job with a demand and a
//! provisional time window. Windows emitted here are deliberately narrow;
//! window repair re-derives the binding constraint afterwards.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::types::{ForecastCurve, ForecastSample, Node, NodeRole, PickupJob};

/// Demands below this are not worth dispatching a vehicle for.
const DEMAND_EPSILON: f64 = 1e-6;

/// Tunables for job synthesis.
#[derive(Debug, Clone)]
pub struct JobBuilderConfig {
    /// Fraction of max volume that triggers a pickup (θ).
    pub overflow_fraction: f64,
    /// Fraction of max volume a pickup aims to leave behind (τ).
    pub target_fraction: f64,
    /// Minutes before the predicted crossing to open the window.
    pub buffer_minutes: i64,
    /// Minutes spent at the vessel per pickup.
    pub service_minutes: i64,
    /// Split jobs whose demand exceeds this into equal-size siblings.
    pub max_job_split_capacity: Option<f64>,
}

impl Default for JobBuilderConfig {
    fn default() -> Self {
        Self {
            overflow_fraction: 0.90,
            target_fraction: 0.20,
            buffer_minutes: 45,
            service_minutes: 8,
            max_job_split_capacity: None,
        }
    }
}

/// First index pair where the curve crosses up through `threshold`
/// (`prev < threshold <= cur`), linearly interpolated to a sub-hour
/// timestamp. A curve that only grazes the threshold from above never
/// crosses and yields `None`.
fn first_upward_crossing(samples: &[ForecastSample], threshold: f64) -> Option<NaiveDateTime> {
    for pair in samples.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        if prev.volume < threshold && threshold <= cur.volume {
            let frac = (threshold - prev.volume) / (cur.volume - prev.volume);
            let span_seconds = (cur.at - prev.at).num_seconds() as f64;
            return Some(prev.at + Duration::seconds((span_seconds * frac).round() as i64));
        }
    }
    None
}

/// Predicted level at `instant`, linearly interpolated between the bounding
/// samples. Clamps to the first sample when `instant` falls outside the
/// horizon.
fn level_at(samples: &[ForecastSample], instant: NaiveDateTime) -> f64 {
    let before = samples.iter().filter(|s| s.at <= instant).next_back();
    let after = samples.iter().find(|s| s.at >= instant);
    match (before, after) {
        (Some(b), Some(a)) if b.at == a.at => b.volume,
        (Some(b), Some(a)) => {
            let span = (a.at - b.at).num_seconds() as f64;
            let frac = (instant - b.at).num_seconds() as f64 / span;
            b.volume + (a.volume - b.volume) * frac
        }
        _ => samples[0].volume,
    }
}

/// Convert predicted volume curves into pickup jobs.
///
/// Nodes without metadata (or with no vessel capacity) are skipped. Output
/// is sorted by `(earliest, node_id)` for deterministic downstream
/// processing.
pub fn build_pickup_jobs(
    curves: &[ForecastCurve],
    nodes: &[Node],
    config: &JobBuilderConfig,
) -> Vec<PickupJob> {
    let meta: HashMap<&str, &Node> = nodes
        .iter()
        .filter(|n| n.role == NodeRole::CollectionPoint)
        .map(|n| (n.id.as_str(), n))
        .collect();

    let mut jobs = Vec::new();

    for curve in curves {
        let Some(node) = meta.get(curve.node_id.as_str()) else {
            continue;
        };
        let Some(max_volume) = node.max_volume else {
            continue;
        };

        let threshold = config.overflow_fraction * max_volume;
        let target = config.target_fraction * max_volume;

        // Not predicted to overflow inside the horizon: no job.
        let Some(crossing) = first_upward_crossing(&curve.samples, threshold) else {
            continue;
        };

        let earliest = crossing - Duration::minutes(config.buffer_minutes);
        let latest = (crossing + Duration::minutes(15)).max(earliest + Duration::minutes(15));

        let level_at_earliest = level_at(&curve.samples, earliest);
        let demand = (level_at_earliest - target).max(0.0);
        if demand <= DEMAND_EPSILON {
            continue;
        }

        let emit = |demand: f64, k: usize| PickupJob {
            job_id: format!("{}-{}-{}", node.id, earliest.and_utc().timestamp(), k),
            node_id: node.id.clone(),
            earliest,
            latest,
            demand,
            service_minutes: config.service_minutes,
            target_level: target,
            threshold,
            max_volume,
        };

        match config.max_job_split_capacity {
            Some(cap) if cap > 0.0 && demand > cap => {
                let n = (demand / cap).ceil() as usize;
                let share = demand / n as f64;
                for k in 0..n {
                    jobs.push(emit(share, k));
                }
            }
            _ => jobs.push(emit(demand, 0)),
        }
    }

    jobs.sort_by(|a, b| {
        a.earliest
            .cmp(&b.earliest)
            .then_with(|| a.node_id.cmp(&b.node_id))
            .then_with(|| a.job_id.cmp(&b.job_id))
    });

    debug!("synthesized {} pickup jobs from {} curves", jobs.len(), curves.len());
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinates;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn vessel(id: &str, max_volume: f64) -> Node {
        Node::collection_point(id, Coordinates { lat: 50.0, lng: 14.0 }, max_volume).unwrap()
    }

    fn curve(id: &str, volumes: &[f64]) -> ForecastCurve {
        ForecastCurve::hourly(id, start(), volumes)
    }

    #[test]
    fn test_curve_below_threshold_emits_no_job() {
        let jobs = build_pickup_jobs(
            &[curve("c1", &[10.0, 40.0, 70.0, 85.0])],
            &[vessel("c1", 100.0)],
            &JobBuilderConfig::default(),
        );
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_crossing_time_is_interpolated() {
        // [50, 60, 95, 40] against threshold 90 crosses between samples 1
        // and 2, at (90-60)/(95-60) of the hour.
        let samples = curve("c1", &[50.0, 60.0, 95.0, 40.0]).samples;
        let crossing = first_upward_crossing(&samples, 90.0).unwrap();

        let frac: f64 = (90.0 - 60.0) / (95.0 - 60.0);
        let expected = start()
            + Duration::hours(1)
            + Duration::seconds((3600.0 * frac).round() as i64);
        assert_eq!(crossing, expected);
    }

    #[test]
    fn test_single_job_fields() {
        let config = JobBuilderConfig::default();
        let jobs = build_pickup_jobs(
            &[curve("c1", &[50.0, 60.0, 95.0, 40.0])],
            &[vessel("c1", 100.0)],
            &config,
        );
        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];

        assert_eq!(job.node_id, "c1");
        assert_eq!(job.threshold, 90.0);
        assert_eq!(job.target_level, 20.0);
        assert_eq!(job.service_minutes, 8);
        assert!(job.earliest <= job.latest);
        // Provisional window: 45 min buffer before the crossing, 15 past it.
        assert_eq!(job.latest - job.earliest, Duration::minutes(60));
        // Demand is level-at-earliest minus target, so strictly positive.
        assert!(job.demand > 0.0);
        assert!(job.demand < job.max_volume);
    }

    #[test]
    fn test_demand_uses_level_at_window_open() {
        // Steep rise: the level at (crossing - 45min) is well below the
        // threshold, so demand must be computed there, not at the crossing.
        let config = JobBuilderConfig::default();
        let jobs = build_pickup_jobs(
            &[curve("c1", &[40.0, 96.0])],
            &[vessel("c1", 100.0)],
            &config,
        );
        assert_eq!(jobs.len(), 1);
        let crossing_min = (90.0 - 40.0) / (96.0 - 40.0) * 60.0;
        let earliest_min = crossing_min - 45.0;
        let level = 40.0 + (96.0 - 40.0) * earliest_min / 60.0;
        let expected = level - 20.0;
        assert!((jobs[0].demand - expected).abs() < 0.5);
        assert!(jobs[0].demand < 90.0 - 20.0);
    }

    #[test]
    fn test_tiny_demand_is_skipped() {
        // Leave-behind target equal to the vessel: nothing to remove.
        let config = JobBuilderConfig {
            target_fraction: 1.0,
            ..Default::default()
        };
        let jobs = build_pickup_jobs(
            &[curve("c1", &[50.0, 95.0])],
            &[vessel("c1", 100.0)],
            &config,
        );
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_split_jobs_preserve_total_demand() {
        let config = JobBuilderConfig {
            buffer_minutes: 0,
            max_job_split_capacity: Some(100.0),
            ..Default::default()
        };
        let jobs = build_pickup_jobs(
            &[curve("c1", &[200.0, 500.0])],
            &[vessel("c1", 500.0)],
            &config,
        );
        assert!(jobs.len() > 1);

        let total: f64 = jobs.iter().map(|j| j.demand).sum();
        let reference = jobs[0].demand * jobs.len() as f64;
        assert!((total - reference).abs() < 1e-9);
        for job in &jobs {
            assert!(job.demand <= 100.0 + 1e-9);
            assert_eq!(job.node_id, "c1");
            assert_eq!(job.earliest, jobs[0].earliest);
            assert_eq!(job.latest, jobs[0].latest);
        }
        // Sibling ids are distinct.
        let mut ids: Vec<&str> = jobs.iter().map(|j| j.job_id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids.len(), jobs.len());
    }

    #[test]
    fn test_output_sorted_by_earliest_then_node() {
        let jobs = build_pickup_jobs(
            &[
                // Crosses in hour 2.
                curve("late", &[10.0, 20.0, 95.0]),
                // Crosses in hour 1.
                curve("soon", &[10.0, 95.0, 95.0]),
            ],
            &[vessel("late", 100.0), vessel("soon", 100.0)],
            &JobBuilderConfig::default(),
        );
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].node_id, "soon");
        assert_eq!(jobs[1].node_id, "late");
        assert!(jobs[0].earliest <= jobs[1].earliest);
    }

    #[test]
    fn test_curve_without_metadata_is_skipped() {
        let jobs = build_pickup_jobs(
            &[curve("ghost", &[10.0, 95.0])],
            &[vessel("c1", 100.0)],
            &JobBuilderConfig::default(),
        );
        assert!(jobs.is_empty());
    }

    // The crossing comparison is strict below, inclusive at the threshold.
    // Both edge behaviors below are intentional and load-bearing for curves
    // that sit exactly on the threshold.

    #[test]
    fn test_sample_exactly_at_threshold_counts_as_crossing() {
        let samples = curve("c1", &[50.0, 90.0, 40.0]).samples;
        let crossing = first_upward_crossing(&samples, 90.0).unwrap();
        // frac = (90-50)/(90-50) = 1: the crossing lands on the sample.
        assert_eq!(crossing, start() + Duration::hours(1));
    }

    #[test]
    fn test_curve_starting_at_threshold_never_crosses() {
        // First sample already at the threshold: `prev < threshold` never
        // holds, so no job is emitted even though the vessel is full.
        let samples = curve("c1", &[90.0, 100.0]).samples;
        assert!(first_upward_crossing(&samples, 90.0).is_none());
    }
}
