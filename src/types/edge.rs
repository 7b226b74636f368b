//! Network edges

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// A directed travel-time edge between two facilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEdge {
    pub from: String,
    pub to: String,
    pub travel_time_minutes: f64,
}

impl NetworkEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, travel_time_minutes: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            travel_time_minutes,
        }
    }

    /// Reject malformed weights before any graph is built.
    pub fn validate(&self) -> Result<(), PlanError> {
        if !self.travel_time_minutes.is_finite() {
            return Err(PlanError::InvalidEdge {
                from: self.from.clone(),
                to: self.to.clone(),
                reason: format!("non-numeric travel time {}", self.travel_time_minutes),
            });
        }
        if self.travel_time_minutes < 0.0 {
            return Err(PlanError::InvalidEdge {
                from: self.from.clone(),
                to: self.to.clone(),
                reason: format!("negative travel time {}", self.travel_time_minutes),
            });
        }
        Ok(())
    }
}
