//! Optimizer configuration.

use std::time::Duration;

/// Configuration parameters for an optimization run.
///
/// All engine constants live here rather than inline in the planner, so
/// operations can tune thresholds without code changes.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Seat capacity assumed for routes without an explicit override.
    pub default_seat_capacity: u32,

    /// A route is underutilized iff `0 < passengers <= low_crowd_threshold`.
    pub low_crowd_threshold: u32,

    /// Estimated savings when a route can be emptied completely.
    pub full_transfer_savings: u64,

    /// Estimated savings per passenger when a route can only be
    /// partially emptied.
    pub per_passenger_savings: u64,

    /// Overall run deadline in seconds. Expiry is reported as a
    /// dependency failure.
    pub deadline_secs: u64,
}

impl OptimizerConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        default_seat_capacity: u32,
        low_crowd_threshold: u32,
        full_transfer_savings: u64,
        per_passenger_savings: u64,
        deadline_secs: u64,
    ) -> Self {
        Self {
            default_seat_capacity,
            low_crowd_threshold,
            full_transfer_savings,
            per_passenger_savings,
            deadline_secs,
        }
    }

    /// Returns the run deadline as a Duration.
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            default_seat_capacity: 60,
            low_crowd_threshold: 30,
            full_transfer_savings: 5000,
            per_passenger_savings: 50,
            deadline_secs: 30,
        }
    }
}
