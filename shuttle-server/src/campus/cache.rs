//! Caching layer for campus data service responses.
//!
//! The planner reads the route list once and bookings once per route per
//! run; two admins triggering runs close together should not hammer the
//! data service. TTL-bounded moka caches front the hot read paths.
//! Schedule fetches and analysis triggers bypass the cache: the former
//! run once a day, the latter must always reach the job.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{Booking, Route, RouteId, ServiceDate};
use crate::registry::ScheduleStop;

use super::client::{CampusClient, RouteSuggestions};
use super::error::CampusError;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CampusCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CampusCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// Campus data service client with caching.
pub struct CachedCampusClient {
    client: CampusClient,

    /// The full route list; a single entry.
    routes: MokaCache<(), Arc<Vec<Route>>>,

    /// Bookings keyed by (route, date).
    bookings: MokaCache<(RouteId, ServiceDate), Arc<Vec<Booking>>>,
}

impl CachedCampusClient {
    /// Create a new cached client.
    pub fn new(client: CampusClient, config: &CampusCacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(1)
            .build();
        let bookings = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            client,
            routes,
            bookings,
        }
    }

    /// Get all routes, using the cache if fresh.
    pub async fn get_routes(&self) -> Result<Arc<Vec<Route>>, CampusError> {
        if let Some(hit) = self.routes.get(&()).await {
            return Ok(hit);
        }

        let fresh = Arc::new(self.client.fetch_routes().await?);
        self.routes.insert((), fresh.clone()).await;
        Ok(fresh)
    }

    /// Get a route's bookings for a date, using the cache if fresh.
    pub async fn get_bookings(
        &self,
        route: &RouteId,
        date: ServiceDate,
    ) -> Result<Arc<Vec<Booking>>, CampusError> {
        let key = (route.clone(), date);
        if let Some(hit) = self.bookings.get(&key).await {
            return Ok(hit);
        }

        let fresh = Arc::new(self.client.fetch_bookings(route, date).await?);
        self.bookings.insert(key, fresh.clone()).await;
        Ok(fresh)
    }

    /// Fetch a route's schedule, bypassing the cache.
    pub async fn fetch_schedule(&self, route: &RouteId) -> Result<Vec<ScheduleStop>, CampusError> {
        self.client.fetch_schedule(route).await
    }

    /// Trigger the stop-analysis job, bypassing the cache.
    pub async fn fetch_possible_stop_suggestions(
        &self,
        date: ServiceDate,
    ) -> Result<Vec<RouteSuggestions>, CampusError> {
        self.client.fetch_possible_stop_suggestions(date).await
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.routes.invalidate_all();
        self.bookings.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_config_defaults() {
        let config = CampusCacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.max_capacity, 1000);
    }
}
