//! Schedule types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One visit on a vehicle's route, depot legs included.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStop {
    /// Underlying facility visited.
    pub node_id: String,
    /// Job serviced at this stop. `None` for depot legs.
    pub job_id: Option<String>,
    pub arrival: NaiveDateTime,
    pub departure: NaiveDateTime,
    /// Cumulative carried load in whole demand units after this stop.
    pub load: i64,
}

/// Ordered stop sequence for one vehicle, starting and ending at the depot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRoute {
    pub vehicle_id: String,
    pub stops: Vec<ScheduleStop>,
}

/// The full pickup schedule. Produced once per successful search and never
/// mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub routes: Vec<VehicleRoute>,
}

impl Schedule {
    /// Empty schedule, used when no pickups are needed in the horizon.
    pub fn empty() -> Self {
        Self { routes: vec![] }
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of serviced jobs across all routes.
    pub fn job_count(&self) -> usize {
        self.routes
            .iter()
            .flat_map(|r| r.stops.iter())
            .filter(|s| s.job_id.is_some())
            .count()
    }
}
