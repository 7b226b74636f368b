//! Pickup jobs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A discrete pickup job synthesized from a forecast curve.
///
/// Immutable once emitted, except for the window fields which window repair
/// may widen (never narrow). Invariants: `earliest <= latest`, `demand > 0`,
/// `service_minutes >= 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupJob {
    /// Unique id; siblings of a split job get distinct ids.
    pub job_id: String,
    /// The collection point to service.
    pub node_id: String,
    /// Earliest time the pickup may begin.
    pub earliest: NaiveDateTime,
    /// Latest time the pickup may begin.
    pub latest: NaiveDateTime,
    /// Volume to remove.
    pub demand: f64,
    /// Minutes spent at the vessel per pickup.
    pub service_minutes: i64,
    /// Level the pickup aims to leave behind (τ · max_volume).
    pub target_level: f64,
    /// Level that triggered the job (θ · max_volume).
    pub threshold: f64,
    /// Vessel capacity of the underlying node.
    pub max_volume: f64,
}

impl PickupJob {
    /// Window duration in whole minutes (floored).
    pub fn window_minutes(&self) -> i64 {
        (self.latest - self.earliest).num_minutes()
    }
}
