//! Fleet router configuration

/// Configuration for the fleet-minimizing router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Carrying capacity shared by every vehicle in a candidate fleet.
    pub vehicle_capacity: f64,
    /// Service time when a route ends at the depot (unloading).
    pub unload_minutes: i64,
    /// Maximum route duration per vehicle.
    pub shift_length_minutes: i64,
    /// Explicit `(start, max)` vehicle-count range. Defaults to the
    /// capacity lower bound and ten counts above it.
    pub search_range: Option<(usize, usize)>,
    /// Padding added to the depot's closing time past the latest window.
    pub horizon_pad_minutes: i64,
    /// Wall-clock search budget per vehicle-count attempt.
    pub time_budget_seconds: u64,
    /// Fixed seed for reproducible searches. Derived per attempt when unset.
    pub seed: Option<u64>,
    /// Run independent vehicle-count attempts on worker threads.
    pub parallel: bool,
}

impl RouterConfig {
    pub fn new(vehicle_capacity: f64) -> Self {
        Self {
            vehicle_capacity,
            unload_minutes: 15,
            shift_length_minutes: 8 * 60,
            search_range: None,
            horizon_pad_minutes: 60,
            time_budget_seconds: 15,
            seed: None,
            parallel: false,
        }
    }

    /// Quick configuration for interactive use and tests.
    pub fn fast(vehicle_capacity: f64) -> Self {
        Self {
            time_budget_seconds: 3,
            ..Self::new(vehicle_capacity)
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
