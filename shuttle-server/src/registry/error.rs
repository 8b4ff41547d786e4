//! Stop registry error types.

use crate::domain::{RouteId, StopId};

/// Errors from stop registry operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// The target route is not registered.
    #[error("route {0} is not registered")]
    UnknownRoute(RouteId),

    /// The stop does not exist on the given route.
    #[error("stop {stop} does not belong to route {route}")]
    StopNotFound { route: RouteId, stop: StopId },

    /// A candidate stop is missing a required field.
    #[error("candidate stop {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    /// A candidate references a source route the registry does not know.
    #[error("source route {0} is not registered")]
    UnknownSourceRoute(RouteId),

    /// A route cannot borrow a stop from itself.
    #[error("route {0} cannot borrow a stop from its own schedule")]
    SelfSource(RouteId),

    /// A concurrent identical insert won the race between the existence
    /// check and the batch insert. Callers treat this as "already
    /// present", not as a failure.
    #[error("possible stop \"{name}\" from route {source_route} was inserted concurrently")]
    DuplicateRace { name: String, source_route: RouteId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let route = RouteId::parse("R1").unwrap();

        let err = RegistryError::UnknownRoute(route.clone());
        assert_eq!(err.to_string(), "route R1 is not registered");

        let err = RegistryError::StopNotFound {
            route: route.clone(),
            stop: StopId(42),
        };
        assert_eq!(err.to_string(), "stop 42 does not belong to route R1");

        let err = RegistryError::MissingField {
            index: 2,
            field: "stop_time",
        };
        assert_eq!(
            err.to_string(),
            "candidate stop 2 is missing required field `stop_time`"
        );

        let err = RegistryError::DuplicateRace {
            name: "Main Junction".into(),
            source_route: route,
        };
        assert!(err.to_string().contains("inserted concurrently"));
    }
}
