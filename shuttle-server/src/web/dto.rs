//! Data transfer objects for web requests and responses.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::domain::{PassengerTransfer, RouteId, ServiceDate, Stop};
use crate::planner::{OptimizationRun, RouteAnalysis, RoutePlan, RunSummary};
use crate::registry::{AddOutcome, PossibleStopCandidate, RouteStopsGroup, SkippedStop};

/// Request to run the transfer optimization for a date.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOptimizationRequest {
    /// Service date in YYYY-MM-DD format
    pub date: String,

    /// Who is asking (recorded on the run)
    pub requester_id: String,

    /// Whether to trigger the possible-stop population step first
    #[serde(default)]
    pub use_enhanced_stops: bool,
}

/// Aggregate totals for one optimization run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSummary {
    pub total_low_crowd_buses: usize,
    pub total_passengers_affected: usize,
    pub full_transfers: usize,
    pub partial_transfers: usize,
    pub no_transfers: usize,
    pub potential_savings: u64,
    pub enhanced_stops_used: usize,
}

/// One passenger's proposed transfer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerTransferResult {
    pub student_id: String,
    pub student_name: String,
    pub roll_number: String,

    /// Boarding stop on the underutilized route
    pub from_stop: String,

    /// The alternate route
    pub to_route_id: String,
    pub to_route_name: String,

    /// The stop on the target route that matched
    pub matched_stop: String,

    /// regular | possible
    pub match_category: String,

    /// Confidence tier of the match
    pub match_confidence: String,

    /// Source route of a borrowed stop
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_route_name: Option<String>,

    /// Spare seats on the target at match time
    pub seats_available: i64,
}

/// The optimization result for one underutilized route.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOptimizationResult {
    pub route_id: String,
    pub route_name: String,
    pub route_number: String,
    pub current_passengers: usize,
    pub transferable_passengers: usize,

    /// full_transfer | partial_transfer | no_transfer
    pub transfer_classification: String,

    pub potential_savings: u64,
    pub passenger_transfers: Vec<PassengerTransferResult>,

    /// Transfers that matched on a borrowed (possible) stop
    pub enhanced_stops_used: usize,
}

/// Response for a successful optimization run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResponse {
    pub optimization_id: String,
    pub optimization_date: String,
    pub summary: OptimizationSummary,
    pub low_crowd_routes: Vec<RouteOptimizationResult>,
}

/// Per-route load analysis in the degenerate response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAnalysisResult {
    pub route_id: String,
    pub route_name: String,
    pub route_number: String,
    pub passenger_count: usize,
    pub seats_available: i64,
}

/// Response when no route qualifies for optimization.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoOptimizationResponse {
    pub has_low_crowd_routes: bool,
    pub message: String,
    pub optimization_date: String,
    pub route_analysis: Vec<RouteAnalysisResult>,
}

/// One entry in the run history listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunHistoryEntry {
    pub optimization_id: String,
    pub optimization_date: String,
    pub requested_by: String,
    pub enhanced_stops_requested: bool,
    pub summary: OptimizationSummary,
}

/// Response for the run history listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunHistoryResponse {
    pub runs: Vec<RunHistoryEntry>,
}

/// A stop in API responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopResult {
    pub stop_id: u64,
    pub stop_name: String,

    /// HH:MM
    pub stop_time: String,

    pub sequence: u32,

    /// regular | possible
    pub category: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_route_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_route_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    pub is_major_stop: bool,
}

/// Response listing a route's stops.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStopsResponse {
    pub route_id: String,
    pub stops: Vec<StopResult>,
}

/// A candidate possible stop in an insertion request. Required fields
/// are optional here so validation can report exactly which one is
/// missing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateStop {
    pub stop_name: Option<String>,
    pub stop_time: Option<String>,
    pub sequence: Option<u32>,
    pub source_route_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_major_stop: bool,
}

impl CandidateStop {
    /// Convert to a registry candidate. Missing fields stay missing for
    /// the registry to report; malformed fields are rejected here.
    pub fn into_candidate(self) -> Result<PossibleStopCandidate, String> {
        let time = self
            .stop_time
            .as_deref()
            .map(parse_time_field)
            .transpose()?;

        let source_route = self
            .source_route_id
            .as_deref()
            .map(|s| RouteId::parse(s).map_err(|e| format!("Invalid source route id {s:?}: {e}")))
            .transpose()?;

        Ok(PossibleStopCandidate {
            name: self.stop_name,
            time,
            sequence: self.sequence,
            source_route,
            latitude: self.latitude,
            longitude: self.longitude,
            is_major: self.is_major_stop,
        })
    }
}

/// Request to insert possible stops.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPossibleStopsRequest {
    pub stops: Vec<CandidateStop>,
}

/// A skipped candidate in an insertion response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedStopResult {
    pub stop_name: String,
    pub source_route_id: String,
}

/// Response for a possible-stop insertion.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPossibleStopsResponse {
    pub added_count: usize,
    pub skipped_count: usize,
    pub skipped_stops: Vec<SkippedStopResult>,
    pub data: Vec<StopResult>,
}

/// Query parameters for stop search.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStopsParams {
    /// Search text
    pub q: String,

    /// Route to exclude (the route being borrowed for)
    pub exclude_route: Option<String>,

    /// Maximum number of stops to return
    pub limit: Option<usize>,
}

/// Search hits for one owning route.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteGroupResult {
    pub route_id: String,
    pub route_name: String,
    pub stops: Vec<StopResult>,
}

/// Response for stop search.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStopsResponse {
    pub query: String,
    pub groups: Vec<RouteGroupResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Parse an HH:MM (or HH:MM:SS) time field.
fn parse_time_field(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s.trim(), "%H:%M:%S"))
        .map_err(|_| format!("Invalid stop time {s:?}: must be HH:MM"))
}

// Conversion implementations

impl OptimizationSummary {
    /// Create from a run summary.
    pub fn from_summary(summary: &RunSummary) -> Self {
        Self {
            total_low_crowd_buses: summary.low_crowd_routes,
            total_passengers_affected: summary.transferable_passengers,
            full_transfers: summary.full_transfers,
            partial_transfers: summary.partial_transfers,
            no_transfers: summary.no_transfers,
            potential_savings: summary.potential_savings,
            enhanced_stops_used: summary.enhanced_stops_used,
        }
    }
}

impl PassengerTransferResult {
    /// Create from a domain transfer.
    pub fn from_transfer(transfer: &PassengerTransfer) -> Self {
        Self {
            student_id: transfer.student_id.clone(),
            student_name: transfer.student_name.clone(),
            roll_number: transfer.roll_number.clone(),
            from_stop: transfer.from_stop.clone(),
            to_route_id: transfer.to_route.as_str().to_string(),
            to_route_name: transfer.to_route_name.clone(),
            matched_stop: transfer.matched_stop.clone(),
            match_category: transfer.matched_category.as_str().to_string(),
            match_confidence: transfer.confidence.as_str().to_string(),
            source_route_name: transfer.source_route_name.clone(),
            seats_available: transfer.seats_available,
        }
    }
}

impl RouteOptimizationResult {
    /// Create from a per-route plan.
    pub fn from_plan(plan: &RoutePlan) -> Self {
        Self {
            route_id: plan.route.id.as_str().to_string(),
            route_name: plan.route.name.clone(),
            route_number: plan.route.number.clone(),
            current_passengers: plan.current_passengers,
            transferable_passengers: plan.transferable(),
            transfer_classification: plan.classification.as_str().to_string(),
            potential_savings: plan.potential_savings,
            passenger_transfers: plan
                .transfers
                .iter()
                .map(PassengerTransferResult::from_transfer)
                .collect(),
            enhanced_stops_used: plan.enhanced_stops_used(),
        }
    }
}

impl OptimizationResponse {
    /// Create from an archived run.
    pub fn from_run(run: &OptimizationRun) -> Self {
        Self {
            optimization_id: run.id.to_string(),
            optimization_date: run.date.to_string(),
            summary: OptimizationSummary::from_summary(&run.summary),
            low_crowd_routes: run
                .routes
                .iter()
                .map(RouteOptimizationResult::from_plan)
                .collect(),
        }
    }
}

impl RouteAnalysisResult {
    /// Create from a planner analysis row.
    pub fn from_analysis(analysis: &RouteAnalysis) -> Self {
        Self {
            route_id: analysis.route.id.as_str().to_string(),
            route_name: analysis.route.name.clone(),
            route_number: analysis.route.number.clone(),
            passenger_count: analysis.passenger_count,
            seats_available: analysis.seats_available,
        }
    }
}

impl NoOptimizationResponse {
    /// Create the degenerate response for a date.
    pub fn new(date: ServiceDate, analysis: &[RouteAnalysis]) -> Self {
        Self {
            has_low_crowd_routes: false,
            message: format!(
                "No underutilized routes found for {date}; every active route is either empty or sufficiently loaded"
            ),
            optimization_date: date.to_string(),
            route_analysis: analysis.iter().map(RouteAnalysisResult::from_analysis).collect(),
        }
    }
}

impl RunHistoryEntry {
    /// Create from an archived run.
    pub fn from_run(run: &OptimizationRun) -> Self {
        Self {
            optimization_id: run.id.to_string(),
            optimization_date: run.date.to_string(),
            requested_by: run.requested_by.clone(),
            enhanced_stops_requested: run.enhanced_stops_requested,
            summary: OptimizationSummary::from_summary(&run.summary),
        }
    }
}

impl StopResult {
    /// Create from a domain stop.
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            stop_id: stop.id.0,
            stop_name: stop.name.clone(),
            stop_time: stop.time.format("%H:%M").to_string(),
            sequence: stop.sequence,
            category: stop.category.as_str().to_string(),
            source_route_id: stop.source_route.as_ref().map(|r| r.as_str().to_string()),
            source_route_name: stop.source_route_name.clone(),
            latitude: stop.latitude,
            longitude: stop.longitude,
            is_major_stop: stop.is_major,
        }
    }
}

impl SkippedStopResult {
    /// Create from a registry skip record.
    pub fn from_skipped(skipped: &SkippedStop) -> Self {
        Self {
            stop_name: skipped.name.clone(),
            source_route_id: skipped.source_route.as_str().to_string(),
        }
    }
}

impl AddPossibleStopsResponse {
    /// Create from a registry insertion outcome.
    pub fn from_outcome(outcome: &AddOutcome) -> Self {
        Self {
            added_count: outcome.added.len(),
            skipped_count: outcome.skipped.len(),
            skipped_stops: outcome
                .skipped
                .iter()
                .map(SkippedStopResult::from_skipped)
                .collect(),
            data: outcome.added.iter().map(StopResult::from_stop).collect(),
        }
    }
}

impl RouteGroupResult {
    /// Create from a registry search group.
    pub fn from_group(group: &RouteStopsGroup) -> Self {
        Self {
            route_id: group.route.as_str().to_string(),
            route_name: group.route_name.clone(),
            stops: group.stops.iter().map(StopResult::from_stop).collect(),
        }
    }
}
