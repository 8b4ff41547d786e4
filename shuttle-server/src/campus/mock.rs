//! Mock campus data client for testing without the data service.
//!
//! Loads routes, schedules and bookings from a JSON fixture file and
//! serves them as if they were live API responses.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{Booking, Route, RouteId, ServiceDate};
use crate::registry::ScheduleStop;

use super::client::{BookingDto, RouteDto, RouteSuggestions, RouteSuggestionsDto, ScheduleStopDto};
use super::error::CampusError;

/// One route's fixture data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureRoute {
    #[serde(flatten)]
    route: RouteDto,

    #[serde(default)]
    stops: Vec<ScheduleStopDto>,

    /// Bookings keyed by `YYYY-MM-DD` date string.
    #[serde(default)]
    bookings: HashMap<String, Vec<BookingDto>>,
}

/// The fixture file layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureFile {
    routes: Vec<FixtureRoute>,

    /// Optional canned stop-analysis output.
    #[serde(default)]
    suggestions: Vec<RouteSuggestionsDto>,
}

/// Mock campus data client that serves data from a JSON fixture.
///
/// This is useful for development and testing without real data service
/// credentials. Mimics the `CampusClient` interface.
#[derive(Debug, Clone)]
pub struct MockCampusClient {
    fixture: FixtureFile,
}

impl MockCampusClient {
    /// Create a new mock client by loading a JSON fixture file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CampusError> {
        let path = path.as_ref();

        let json = std::fs::read_to_string(path).map_err(|e| CampusError::Api {
            status: 0,
            message: format!("Failed to read fixture {:?}: {}", path, e),
        })?;

        let fixture: FixtureFile = serde_json::from_str(&json).map_err(|e| CampusError::Json {
            message: format!("Failed to parse fixture {:?}: {}", path, e),
        })?;

        if fixture.routes.is_empty() {
            return Err(CampusError::Api {
                status: 0,
                message: format!("No routes in fixture {:?}", path),
            });
        }

        Ok(Self { fixture })
    }

    fn route_fixture(&self, route: &RouteId) -> Result<&FixtureRoute, CampusError> {
        self.fixture
            .routes
            .iter()
            .find(|f| f.route.route_id == route.as_str())
            .ok_or_else(|| CampusError::Api {
                status: 404,
                message: format!("No fixture data for route {route}"),
            })
    }

    /// Fetch all routes. Mimics `CampusClient::fetch_routes`.
    pub async fn fetch_routes(&self) -> Result<Vec<Route>, CampusError> {
        self.fixture
            .routes
            .iter()
            .map(|f| f.route.clone().into_domain())
            .collect()
    }

    /// Fetch a route's schedule. Mimics `CampusClient::fetch_schedule`.
    pub async fn fetch_schedule(&self, route: &RouteId) -> Result<Vec<ScheduleStop>, CampusError> {
        self.route_fixture(route)?
            .stops
            .iter()
            .cloned()
            .map(ScheduleStopDto::into_schedule_stop)
            .collect()
    }

    /// Fetch a route's bookings for a date. Mimics
    /// `CampusClient::fetch_bookings`. Dates absent from the fixture
    /// yield no bookings.
    pub async fn fetch_bookings(
        &self,
        route: &RouteId,
        date: ServiceDate,
    ) -> Result<Vec<Booking>, CampusError> {
        let fixture = self.route_fixture(route)?;
        Ok(fixture
            .bookings
            .get(&date.to_string())
            .into_iter()
            .flatten()
            .cloned()
            .map(|d| d.into_domain(route.clone(), date))
            .collect())
    }

    /// Return the fixture's canned stop-analysis output. Mimics
    /// `CampusClient::fetch_possible_stop_suggestions`.
    pub async fn fetch_possible_stop_suggestions(
        &self,
        _date: ServiceDate,
    ) -> Result<Vec<RouteSuggestions>, CampusError> {
        self.fixture
            .suggestions
            .iter()
            .cloned()
            .map(RouteSuggestionsDto::into_domain)
            .collect()
    }
}
