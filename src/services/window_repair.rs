//! Window repair: widen job windows until they are physically reachable.
//!
//! A synthesized window may be shorter than the depot travel plus service
//! time it actually requires. Repair grows such windows symmetrically,
//! pulling `earliest` earlier and pushing `latest` later, and then enforces
//! a global minimum window the same way. Windows are only ever widened.

use chrono::Duration;
use tracing::debug;

use crate::services::travel_time::TravelTimeMatrix;
use crate::types::PickupJob;

/// Tunables for window repair.
#[derive(Debug, Clone)]
pub struct WindowRepairConfig {
    /// Every window ends up at least this long.
    pub min_window_minutes: i64,
    /// Extra slack added on top of travel + service.
    pub slack_minutes: i64,
}

impl Default for WindowRepairConfig {
    fn default() -> Self {
        Self {
            min_window_minutes: 60,
            slack_minutes: 45,
        }
    }
}

/// Widen each job's window so it covers depot travel + service + slack.
///
/// Jobs whose node is unreachable from the depot are left untouched:
/// diagnostics owns flagging them, repair does not silently fix what cannot
/// be fixed.
pub fn repair_windows(
    mut jobs: Vec<PickupJob>,
    matrix: &TravelTimeMatrix,
    depot_id: &str,
    config: &WindowRepairConfig,
) -> Vec<PickupJob> {
    let mut widened = 0usize;

    for job in &mut jobs {
        let t_dep = matrix.minutes(depot_id, &job.node_id);
        if !t_dep.is_finite() {
            continue;
        }

        let need = (t_dep + job.service_minutes as f64 + config.slack_minutes as f64).round() as i64;
        let have = job.window_minutes();
        if have < need {
            let delta = need - have;
            let slack = config.slack_minutes;
            job.earliest = job.earliest - Duration::minutes(delta / 2 + slack / 2);
            job.latest = job.latest + Duration::minutes(delta - delta / 2 + slack - slack / 2);
            widened += 1;
        }

        let have = job.window_minutes();
        if have < config.min_window_minutes {
            let grow = config.min_window_minutes - have;
            job.earliest = job.earliest - Duration::minutes(grow / 2);
            job.latest = job.latest + Duration::minutes(grow - grow / 2);
        }
    }

    debug!("window repair widened {} of {} jobs", widened, jobs.len());
    jobs
}
