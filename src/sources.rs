//! Injected data providers.
//!
//! Every collaborator fetch is a narrow trait supplied to the pipeline, so
//! planning stays deterministic and network-free in tests. Real
//! implementations (HTTP clients, files) live with the callers; the
//! in-memory ones here are the reference implementations.

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{ForecastCurve, NetworkEdge, Node, Vehicle};

/// Source of the facility network: edges, collection points, and the depot.
#[async_trait]
pub trait NetworkSource: Send + Sync {
    async fn edges(&self) -> Result<Vec<NetworkEdge>>;
    async fn collection_points(&self) -> Result<Vec<Node>>;
    async fn depot(&self) -> Result<Node>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Source of predicted volume curves, one per collection node.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn curves(&self) -> Result<Vec<ForecastCurve>>;

    fn name(&self) -> &str;
}

/// Source of the vehicle roster.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn vehicles(&self) -> Result<Vec<Vehicle>>;

    fn name(&self) -> &str;
}

/// In-memory network source.
#[derive(Debug, Clone)]
pub struct InMemoryNetwork {
    pub edges: Vec<NetworkEdge>,
    pub collection_points: Vec<Node>,
    pub depot: Node,
}

#[async_trait]
impl NetworkSource for InMemoryNetwork {
    async fn edges(&self) -> Result<Vec<NetworkEdge>> {
        Ok(self.edges.clone())
    }

    async fn collection_points(&self) -> Result<Vec<Node>> {
        Ok(self.collection_points.clone())
    }

    async fn depot(&self) -> Result<Node> {
        Ok(self.depot.clone())
    }

    fn name(&self) -> &str {
        "InMemoryNetwork"
    }
}

/// In-memory forecast source.
#[derive(Debug, Clone)]
pub struct InMemoryForecast {
    pub curves: Vec<ForecastCurve>,
}

#[async_trait]
impl ForecastSource for InMemoryForecast {
    async fn curves(&self) -> Result<Vec<ForecastCurve>> {
        Ok(self.curves.clone())
    }

    fn name(&self) -> &str {
        "InMemoryForecast"
    }
}

/// In-memory roster source.
#[derive(Debug, Clone)]
pub struct InMemoryRoster {
    pub vehicles: Vec<Vehicle>,
}

#[async_trait]
impl RosterSource for InMemoryRoster {
    async fn vehicles(&self) -> Result<Vec<Vehicle>> {
        Ok(self.vehicles.clone())
    }

    fn name(&self) -> &str {
        "InMemoryRoster"
    }
}
