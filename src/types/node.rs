//! Facility network nodes

use serde::{Deserialize, Serialize};

/// Coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Role of a node in the facility network
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Unique fixed node where vehicles start, end, and unload
    Depot,
    /// A vessel accumulating volume over time, subject to overflow
    CollectionPoint,
}

impl NodeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Depot => "depot",
            Self::CollectionPoint => "collection_point",
        }
    }
}

/// A node of the facility network.
///
/// Created once from facility metadata and immutable for the run. Collection
/// points carry a maximum vessel capacity; the depot has none.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub role: NodeRole,
    pub coordinates: Coordinates,
    /// Maximum vessel volume. Present for collection points only.
    pub max_volume: Option<f64>,
}

impl Node {
    /// Create the depot node.
    pub fn depot(id: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            id: id.into(),
            role: NodeRole::Depot,
            coordinates,
            max_volume: None,
        }
    }

    /// Create a collection point. `max_volume` must be positive; metadata
    /// rows with a non-positive capacity are rejected here rather than
    /// producing threshold garbage downstream.
    pub fn collection_point(
        id: impl Into<String>,
        coordinates: Coordinates,
        max_volume: f64,
    ) -> Option<Self> {
        if !max_volume.is_finite() || max_volume <= 0.0 {
            return None;
        }
        Some(Self {
            id: id.into(),
            role: NodeRole::CollectionPoint,
            coordinates,
            max_volume: Some(max_volume),
        })
    }

    pub fn is_depot(&self) -> bool {
        self.role == NodeRole::Depot
    }
}
