//! Route identifier and route metadata types.

use std::fmt;

/// Error returned when parsing an invalid route identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route id: {reason}")]
pub struct InvalidRouteId {
    reason: &'static str,
}

/// A validated route identifier.
///
/// Route ids come from the campus transport data service as opaque strings.
/// This type guarantees that any `RouteId` value is non-empty and contains
/// no whitespace or control characters.
///
/// # Examples
///
/// ```
/// use shuttle_server::domain::RouteId;
///
/// let route = RouteId::parse("R-12").unwrap();
/// assert_eq!(route.as_str(), "R-12");
///
/// // Empty and padded ids are rejected
/// assert!(RouteId::parse("").is_err());
/// assert!(RouteId::parse("R 12").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(String);

impl RouteId {
    /// Parse a route id from a string.
    ///
    /// The input must be non-empty after trimming and must not contain
    /// whitespace or control characters.
    pub fn parse(s: &str) -> Result<Self, InvalidRouteId> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidRouteId {
                reason: "must not be empty",
            });
        }

        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidRouteId {
                reason: "must not contain whitespace or control characters",
            });
        }

        Ok(RouteId(trimmed.to_string()))
    }

    /// Returns the route id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operating status of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStatus {
    /// The route is running and its bookings count.
    Active,
    /// The route is suspended; the engine never touches it.
    Inactive,
}

impl RouteStatus {
    /// Whether the route participates in optimization.
    pub fn is_active(&self) -> bool {
        matches!(self, RouteStatus::Active)
    }
}

/// A bus route as the engine sees it.
///
/// Routes are owned and mutated by the route-management subsystem; the
/// engine only ever reads them for the duration of one optimization run.
#[derive(Debug, Clone)]
pub struct Route {
    /// Route identifier.
    pub id: RouteId,

    /// Display name (e.g. "Perundurai Express").
    pub name: String,

    /// Display number (e.g. "7A").
    pub number: String,

    /// Operating status.
    pub status: RouteStatus,

    /// Nominal seat capacity override. `None` means the configured
    /// default applies.
    pub capacity: Option<u32>,
}

impl Route {
    /// Create an active route with the default seat capacity.
    pub fn new(id: RouteId, name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            number: number.into(),
            status: RouteStatus::Active,
            capacity: None,
        }
    }

    /// Set an explicit seat capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set the operating status.
    pub fn with_status(mut self, status: RouteStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_ids() {
        assert!(RouteId::parse("R1").is_ok());
        assert!(RouteId::parse("route-07").is_ok());
        assert!(RouteId::parse("64f1c0ffee").is_ok());
    }

    #[test]
    fn parse_trims_padding() {
        let id = RouteId::parse("  R1  ").unwrap();
        assert_eq!(id.as_str(), "R1");
    }

    #[test]
    fn reject_empty() {
        assert!(RouteId::parse("").is_err());
        assert!(RouteId::parse("   ").is_err());
    }

    #[test]
    fn reject_inner_whitespace() {
        assert!(RouteId::parse("R 1").is_err());
        assert!(RouteId::parse("R\t1").is_err());
        assert!(RouteId::parse("R\n1").is_err());
    }

    #[test]
    fn display_and_debug() {
        let id = RouteId::parse("R7").unwrap();
        assert_eq!(format!("{}", id), "R7");
        assert_eq!(format!("{:?}", id), "RouteId(R7)");
    }

    #[test]
    fn equality_and_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(RouteId::parse("R1").unwrap());
        assert!(set.contains(&RouteId::parse("R1").unwrap()));
        assert!(!set.contains(&RouteId::parse("R2").unwrap()));
    }

    #[test]
    fn status_is_active() {
        assert!(RouteStatus::Active.is_active());
        assert!(!RouteStatus::Inactive.is_active());
    }

    #[test]
    fn route_builder() {
        let route = Route::new(RouteId::parse("R1").unwrap(), "Town Loop", "7A")
            .with_capacity(48)
            .with_status(RouteStatus::Inactive);
        assert_eq!(route.capacity, Some(48));
        assert!(!route.status.is_active());
    }
}
