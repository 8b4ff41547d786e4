//! Campus transport data service integration.
//!
//! Routes, schedules and bookings live in the campus administration
//! system; this module provides the HTTP client, a TTL cache in front of
//! the hot read paths, and a fixture-backed mock for tests and
//! credential-less development.

mod cache;
mod client;
mod error;
mod mock;

pub use cache::{CachedCampusClient, CampusCacheConfig};
pub use client::{
    parse_stop_time, BookingDto, CampusClient, CampusClientConfig, RouteDto, RouteSuggestions,
    RouteSuggestionsDto, ScheduleStopDto, SuggestedStopDto,
};
pub use error::CampusError;
pub use mock::MockCampusClient;
