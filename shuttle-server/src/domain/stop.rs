//! Stop types.
//!
//! A route's stop list mixes two kinds of stop: *regular* stops defined by
//! the route's own schedule, and *possible* stops borrowed from another
//! route's schedule for transfer matching only. The borrowed kind never
//! feeds the route's own timetable.

use std::fmt;

use chrono::NaiveTime;

use super::RouteId;

/// Registry-allocated stop identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(pub u64);

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which kind of stop this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCategory {
    /// Native to the route's own published schedule.
    Regular,
    /// Borrowed from another route's schedule, usable only for
    /// transfer matching.
    Possible,
}

impl StopCategory {
    /// Wire-format token for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            StopCategory::Regular => "regular",
            StopCategory::Possible => "possible",
        }
    }
}

/// A boarding point on a route.
#[derive(Debug, Clone)]
pub struct Stop {
    /// Registry-allocated identifier.
    pub id: StopId,

    /// The route this stop belongs to.
    pub route: RouteId,

    /// Stop name as entered by route managers (free text).
    pub name: String,

    /// Scheduled time the bus reaches this stop.
    pub time: NaiveTime,

    /// Position in the route's stop ordering.
    pub sequence: u32,

    /// Regular or possible.
    pub category: StopCategory,

    /// For possible stops, the route the stop was borrowed from.
    pub source_route: Option<RouteId>,

    /// Display name of the source route, resolved at insertion time.
    pub source_route_name: Option<String>,

    /// Optional coordinates, carried through from the candidate payload.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Whether route managers flagged this as a major boarding point.
    pub is_major: bool,
}

impl Stop {
    /// Create a regular stop.
    pub fn regular(
        id: StopId,
        route: RouteId,
        name: impl Into<String>,
        time: NaiveTime,
        sequence: u32,
    ) -> Self {
        Self {
            id,
            route,
            name: name.into(),
            time,
            sequence,
            category: StopCategory::Regular,
            source_route: None,
            source_route_name: None,
            latitude: None,
            longitude: None,
            is_major: false,
        }
    }

    /// Create a possible stop borrowed from `source_route`.
    pub fn possible(
        id: StopId,
        route: RouteId,
        name: impl Into<String>,
        time: NaiveTime,
        sequence: u32,
        source_route: RouteId,
        source_route_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            route,
            name: name.into(),
            time,
            sequence,
            category: StopCategory::Possible,
            source_route: Some(source_route),
            source_route_name: Some(source_route_name.into()),
            latitude: None,
            longitude: None,
            is_major: false,
        }
    }

    /// Whether this is a borrowed (possible) stop.
    pub fn is_possible(&self) -> bool {
        matches!(self.category, StopCategory::Possible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(s: &str) -> RouteId {
        RouteId::parse(s).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn regular_stop_has_no_source() {
        let stop = Stop::regular(StopId(1), route("R1"), "Main Gate", time(7, 30), 1);
        assert_eq!(stop.category, StopCategory::Regular);
        assert!(!stop.is_possible());
        assert!(stop.source_route.is_none());
        assert!(stop.source_route_name.is_none());
    }

    #[test]
    fn possible_stop_carries_source() {
        let stop = Stop::possible(
            StopId(2),
            route("R1"),
            "Main Junction",
            time(7, 45),
            2,
            route("R3"),
            "Bhavani Link",
        );
        assert!(stop.is_possible());
        assert_eq!(stop.source_route, Some(route("R3")));
        assert_eq!(stop.source_route_name.as_deref(), Some("Bhavani Link"));
    }

    #[test]
    fn category_tokens() {
        assert_eq!(StopCategory::Regular.as_str(), "regular");
        assert_eq!(StopCategory::Possible.as_str(), "possible");
    }
}
