//! Forecast curves

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One predicted volume sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSample {
    pub at: NaiveDateTime,
    pub volume: f64,
}

/// An ordered, hourly-sampled sequence of predicted volumes for one
/// collection node. Supplied by the forecasting collaborator; never mutated
/// by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastCurve {
    pub node_id: String,
    pub samples: Vec<ForecastSample>,
}

impl ForecastCurve {
    pub fn new(node_id: impl Into<String>, samples: Vec<ForecastSample>) -> Self {
        Self {
            node_id: node_id.into(),
            samples,
        }
    }

    /// Build a curve from hourly samples starting at `start`.
    pub fn hourly(node_id: impl Into<String>, start: NaiveDateTime, volumes: &[f64]) -> Self {
        let samples = volumes
            .iter()
            .enumerate()
            .map(|(i, &volume)| ForecastSample {
                at: start + chrono::Duration::hours(i as i64),
                volume,
            })
            .collect();
        Self::new(node_id, samples)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_hourly_spacing() {
        let curve = ForecastCurve::hourly("c1", start(), &[10.0, 20.0, 30.0]);
        assert_eq!(curve.len(), 3);
        assert_eq!(curve.samples[0].at, start());
        assert_eq!(
            curve.samples[2].at - curve.samples[1].at,
            chrono::Duration::hours(1)
        );
        assert_eq!(curve.samples[2].volume, 30.0);
    }

    #[test]
    fn test_empty_curve() {
        let curve = ForecastCurve::new("c1", vec![]);
        assert!(curve.is_empty());
    }
}
