//! Error taxonomy for the planning pipeline.
//!
//! Structural input problems abort the run; reachability and window tightness
//! are surfaced as warnings through `Diagnostics` instead. Search exhaustion
//! is a terminal but expected outcome that callers handle by relaxing
//! parameters and retrying.

use thiserror::Error;

/// Errors produced by the planning pipeline.
#[derive(Debug, Error)]
pub enum PlanError {
    /// An edge carried a negative or non-numeric travel time.
    #[error("invalid edge {from} -> {to}: {reason}")]
    InvalidEdge {
        from: String,
        to: String,
        reason: String,
    },

    /// The depot id is not present in the travel-time matrix.
    #[error("depot '{0}' not found in travel-time matrix")]
    DepotMissing(String),

    /// Vehicle capacity must be strictly positive.
    #[error("vehicle capacity must be positive, got {0}")]
    InvalidCapacity(f64),

    /// No vehicle count in the attempted range produced a feasible plan.
    #[error("no feasible plan with {start}..={max} vehicles")]
    SearchExhausted { start: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PlanError::InvalidEdge {
            from: "a".to_string(),
            to: "b".to_string(),
            reason: "negative travel time -3".to_string(),
        };
        assert!(err.to_string().contains("a -> b"));

        let err = PlanError::DepotMissing("market".to_string());
        assert!(err.to_string().contains("market"));

        let err = PlanError::SearchExhausted { start: 2, max: 12 };
        assert!(err.to_string().contains("2..=12"));
    }
}
