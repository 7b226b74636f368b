//! Vehicle roster types

use serde::{Deserialize, Serialize};

/// One roster entry as supplied by the fleet collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub max_carrying_capacity: f64,
}

/// Homogeneous fleet parameters used by the router.
///
/// Every vehicle in a candidate fleet shares one capacity and one shift
/// length. When built from a mixed roster the capacity is the minimum across
/// the roster, chosen conservatively.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleClass {
    pub capacity: f64,
    pub shift_length_minutes: i64,
}

impl VehicleClass {
    pub fn new(capacity: f64, shift_length_minutes: i64) -> Self {
        Self {
            capacity,
            shift_length_minutes,
        }
    }

    /// Collapse a roster to a single conservative class. Returns `None` for
    /// an empty roster.
    pub fn from_roster(roster: &[Vehicle], shift_length_minutes: i64) -> Option<Self> {
        roster
            .iter()
            .map(|v| v.max_carrying_capacity)
            .fold(None, |acc: Option<f64>, cap| {
                Some(acc.map_or(cap, |a| a.min(cap)))
            })
            .map(|capacity| Self {
                capacity,
                shift_length_minutes,
            })
    }
}
