//! Per-route stop lists: regular schedule stops plus possible stops
//! borrowed from other routes for transfer matching.

mod error;
mod stops;

pub use error::RegistryError;
pub use stops::{
    AddOutcome, PossibleStopCandidate, RouteStopsGroup, ScheduleStop, SkippedStop, StopRegistry,
};
