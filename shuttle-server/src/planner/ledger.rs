//! Per-run capacity ledger.
//!
//! Computed once at the start of an optimization run from the active
//! routes and their confirmed passenger counts, then read-only for the
//! duration of the run. Capacity is not decremented as passengers are
//! tentatively assigned within the run; see DESIGN.md for the decision.

use std::collections::HashMap;

use crate::domain::{Route, RouteId};

use super::config::OptimizerConfig;

/// Spare-seat ledger for one optimization run.
#[derive(Debug, Clone, Default)]
pub struct CapacityLedger {
    /// Raw `capacity - passengers` per route; may be negative when a
    /// route is oversubscribed.
    available: HashMap<RouteId, i64>,
}

impl CapacityLedger {
    /// Build the ledger from routes and their confirmed passenger
    /// counts. Routes without a capacity override use the configured
    /// default.
    pub fn build<'a>(
        loads: impl IntoIterator<Item = (&'a Route, usize)>,
        config: &OptimizerConfig,
    ) -> Self {
        let available = loads
            .into_iter()
            .map(|(route, passengers)| {
                let capacity = route.capacity.unwrap_or(config.default_seat_capacity);
                (route.id.clone(), capacity as i64 - passengers as i64)
            })
            .collect();

        Self { available }
    }

    /// Spare seats on a route, floored at zero. Unknown routes report
    /// zero spare seats.
    pub fn remaining(&self, route: &RouteId) -> i64 {
        self.available.get(route).copied().unwrap_or(0).max(0)
    }

    /// Whether the route qualifies as a transfer target.
    pub fn is_target(&self, route: &RouteId) -> bool {
        self.available.get(route).copied().unwrap_or(0) > 0
    }

    /// Number of routes in the ledger.
    pub fn len(&self) -> usize {
        self.available.len()
    }

    /// Returns true if the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}
