//! The transfer planner.
//!
//! One pass per invocation: select underutilized routes, evaluate every
//! other active route as a transfer target per passenger, record
//! transfers, classify each underutilized route, and aggregate totals.
//! The assignment is a first-match greedy procedure, not a global
//! optimum.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, warn};

use crate::domain::{
    Booking, PassengerTransfer, Route, RouteId, ServiceDate, Stop, StopCategory,
    TransferClassification,
};
use crate::matcher::StopMatcher;

use super::config::OptimizerConfig;
use super::ledger::CapacityLedger;

/// Error from an optimization run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OptimizeError {
    /// Invalid run request, rejected before any dependency call.
    #[error("invalid optimization request: {0}")]
    InvalidRequest(String),

    /// A required catalog failed to respond; the run is aborted and no
    /// result is persisted.
    #[error("failed to fetch {what}: {message}")]
    Dependency { what: &'static str, message: String },

    /// The run exceeded its overall deadline.
    #[error("optimization run exceeded its deadline")]
    Timeout,
}

/// Provider of routes and their bookings for a date.
///
/// This abstraction allows the planner to be tested with static data.
pub trait RouteCatalog {
    /// All routes currently in the active state.
    fn active_routes(&self) -> Result<Vec<Route>, OptimizeError>;

    /// Bookings for a route on a date. The planner itself filters to
    /// confirmed bookings.
    fn bookings(&self, route: &RouteId, date: ServiceDate) -> Result<Vec<Booking>, OptimizeError>;
}

/// Provider of per-route stop lists (regular + possible combined).
pub trait StopDirectory {
    /// The route's combined stop list in boarding order.
    fn stops_for(&self, route: &RouteId) -> Result<Vec<Stop>, OptimizeError>;
}

/// Request for one optimization run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// The service date to optimize.
    pub date: ServiceDate,

    /// Who asked for the run (recorded on the result).
    pub requested_by: String,

    /// Whether the upstream possible-stop population step was requested.
    pub use_enhanced_stops: bool,
}

impl RunRequest {
    /// Create a new run request.
    pub fn new(date: ServiceDate, requested_by: impl Into<String>, use_enhanced_stops: bool) -> Self {
        Self {
            date,
            requested_by: requested_by.into(),
            use_enhanced_stops,
        }
    }

    /// Validate the request. The date is validated by construction; the
    /// requester must be non-empty.
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.requested_by.trim().is_empty() {
            return Err(OptimizeError::InvalidRequest(
                "requester id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-route load analysis, reported when no route qualifies for
/// optimization.
#[derive(Debug, Clone)]
pub struct RouteAnalysis {
    pub route: Route,
    pub passenger_count: usize,
    pub seats_available: i64,
}

/// The optimization result for one underutilized route.
#[derive(Debug, Clone)]
pub struct RoutePlan {
    pub route: Route,
    pub current_passengers: usize,
    pub transfers: Vec<PassengerTransfer>,
    pub classification: TransferClassification,
    pub potential_savings: u64,
}

impl RoutePlan {
    /// Number of passengers that found a transfer.
    pub fn transferable(&self) -> usize {
        self.transfers.len()
    }

    /// Number of transfers that matched on a borrowed (possible) stop.
    pub fn enhanced_stops_used(&self) -> usize {
        self.transfers
            .iter()
            .filter(|t| matches!(t.matched_category, StopCategory::Possible))
            .count()
    }
}

/// A completed plan, ready to be archived as an optimization run.
#[derive(Debug, Clone)]
pub struct CompletedPlan {
    pub date: ServiceDate,
    pub requested_by: String,
    pub enhanced_stops_requested: bool,
    pub routes: Vec<RoutePlan>,
}

/// Outcome of one planner invocation.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// No route qualified as underutilized; nothing is persisted.
    NoCandidates {
        date: ServiceDate,
        analysis: Vec<RouteAnalysis>,
    },

    /// At least one underutilized route was analyzed.
    Optimized(CompletedPlan),
}

/// Savings estimate for a classified route.
pub fn potential_savings(
    classification: TransferClassification,
    transferable: usize,
    config: &OptimizerConfig,
) -> u64 {
    match classification {
        TransferClassification::FullTransfer => config.full_transfer_savings,
        TransferClassification::PartialTransfer => {
            config.per_passenger_savings * transferable as u64
        }
        TransferClassification::NoTransfer => 0,
    }
}

/// The transfer planner.
pub struct Optimizer<'a, C: RouteCatalog, S: StopDirectory> {
    catalog: &'a C,
    stops: &'a S,
    matcher: &'a StopMatcher,
    config: &'a OptimizerConfig,
}

impl<'a, C: RouteCatalog, S: StopDirectory> Optimizer<'a, C, S> {
    /// Create a new planner.
    pub fn new(
        catalog: &'a C,
        stops: &'a S,
        matcher: &'a StopMatcher,
        config: &'a OptimizerConfig,
    ) -> Self {
        Self {
            catalog,
            stops,
            matcher,
            config,
        }
    }

    /// Run one optimization pass for the request's date.
    pub fn run(&self, request: &RunRequest) -> Result<RunOutcome, OptimizeError> {
        request.validate()?;

        let started = Instant::now();
        let deadline = self.config.deadline();
        let check_deadline = |started: &Instant| {
            if started.elapsed() > deadline {
                Err(OptimizeError::Timeout)
            } else {
                Ok(())
            }
        };

        // A failure here aborts the entire run.
        let mut routes = self.catalog.active_routes()?;
        routes.retain(|r| r.status.is_active());

        // Confirmed loads per route, in catalog order. A booking-fetch
        // failure also aborts: without loads there is nothing to plan.
        let mut loads: Vec<(Route, Vec<Booking>)> = Vec::with_capacity(routes.len());
        for route in routes {
            check_deadline(&started)?;
            let mut bookings = self.catalog.bookings(&route.id, request.date)?;
            bookings.retain(|b| b.status.is_confirmed() && b.date == request.date);
            loads.push((route, bookings));
        }

        let ledger = CapacityLedger::build(
            loads.iter().map(|(route, bookings)| (route, bookings.len())),
            self.config,
        );

        let threshold = self.config.low_crowd_threshold as usize;
        let low_indices: Vec<usize> = loads
            .iter()
            .enumerate()
            .filter(|(_, (_, bookings))| {
                let n = bookings.len();
                n > 0 && n <= threshold
            })
            .map(|(i, _)| i)
            .collect();

        if low_indices.is_empty() {
            debug!(date = %request.date, "no underutilized routes for date");
            let analysis = loads
                .into_iter()
                .map(|(route, bookings)| {
                    let seats_available = ledger.remaining(&route.id);
                    RouteAnalysis {
                        route,
                        passenger_count: bookings.len(),
                        seats_available,
                    }
                })
                .collect();
            return Ok(RunOutcome::NoCandidates {
                date: request.date,
                analysis,
            });
        }

        // Precompute the stop index once per run rather than per
        // passenger. A failed stop lookup excludes that candidate only.
        let mut stop_index: HashMap<RouteId, Vec<Stop>> = HashMap::new();
        for (route, _) in &loads {
            check_deadline(&started)?;
            if !ledger.is_target(&route.id) {
                continue;
            }
            match self.stops.stops_for(&route.id) {
                Ok(stops) => {
                    stop_index.insert(route.id.clone(), stops);
                }
                Err(e) => {
                    warn!(route = %route.id, error = %e, "skipping transfer target: stop list unavailable");
                }
            }
        }

        let mut plans = Vec::with_capacity(low_indices.len());
        for idx in low_indices {
            check_deadline(&started)?;

            let (route, bookings) = &loads[idx];
            let targets: Vec<&Route> = loads
                .iter()
                .map(|(r, _)| r)
                .filter(|r| r.id != route.id && stop_index.contains_key(&r.id))
                .collect();

            let mut transfers = Vec::new();
            for booking in bookings {
                for target in &targets {
                    let stops = &stop_index[&target.id];
                    if let Some(m) = self.matcher.match_stop(&booking.boarding_stop, stops) {
                        transfers.push(PassengerTransfer {
                            student_id: booking.student_id.clone(),
                            student_name: booking.student_name.clone(),
                            roll_number: booking.roll_number.clone(),
                            from_stop: booking.boarding_stop.clone(),
                            to_route: target.id.clone(),
                            to_route_name: target.name.clone(),
                            matched_stop: m.stop_name,
                            confidence: m.confidence,
                            matched_category: m.category,
                            source_route_name: m.source_route_name,
                            seats_available: ledger.remaining(&target.id),
                        });
                        break;
                    }
                }
            }

            let classification =
                TransferClassification::for_counts(bookings.len(), transfers.len());
            let savings = potential_savings(classification, transfers.len(), self.config);

            debug!(
                route = %route.id,
                passengers = bookings.len(),
                transferable = transfers.len(),
                classification = classification.as_str(),
                "classified underutilized route"
            );

            plans.push(RoutePlan {
                route: route.clone(),
                current_passengers: bookings.len(),
                transfers,
                classification,
                potential_savings: savings,
            });
        }

        Ok(RunOutcome::Optimized(CompletedPlan {
            date: request.date,
            requested_by: request.requested_by.clone(),
            enhanced_stops_requested: request.use_enhanced_stops,
            routes: plans,
        }))
    }
}
