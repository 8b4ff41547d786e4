//! HTTP route handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use tracing::{debug, warn};

use crate::campus::{CachedCampusClient, CampusError};
use crate::domain::{Booking, Route, RouteId, ServiceDate, Stop, StopId};
use crate::planner::{
    OptimizeError, Optimizer, RouteCatalog, RunId, RunOutcome, RunRequest, StopDirectory,
};
use crate::registry::{RegistryError, StopRegistry};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/optimize/run", post(run_optimization))
        .route("/optimize/runs", get(list_runs))
        .route("/optimize/runs/:run_id", get(get_run))
        .route("/routes/:route_id/stops", get(list_route_stops))
        .route("/routes/:route_id/possible-stops", post(add_possible_stops))
        .route(
            "/routes/:route_id/possible-stops/:stop_id",
            delete(delete_possible_stop),
        )
        .route("/stops/search", get(search_stops))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Run the transfer optimization for a date.
async fn run_optimization(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    // Parse JSON manually so we can log the body on failure
    let req: RunOptimizationRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(&body), "rejecting malformed optimization request");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    // Validate everything before touching any dependency
    let date = ServiceDate::parse(&req.date).map_err(|e| AppError::BadRequest {
        message: format!("Invalid date {:?}: {e}", req.date),
    })?;

    let request = RunRequest::new(date, req.requester_id.clone(), req.use_enhanced_stops);
    request.validate()?;

    // The possible-stop population step is owned by the upstream
    // analysis job; a failure there leaves the registry as-is.
    if req.use_enhanced_stops {
        ingest_suggested_stops(&state, date).await;
    }

    let catalog = CampusCatalog {
        campus: state.campus.clone(),
    };
    let directory = RegistryDirectory {
        registry: state.registry.clone(),
    };

    let optimizer = Optimizer::new(&catalog, &directory, &state.matcher, &state.config);
    let outcome = optimizer.run(&request)?;

    match outcome {
        RunOutcome::NoCandidates { date, analysis } => {
            Ok(Json(NoOptimizationResponse::new(date, &analysis)).into_response())
        }
        RunOutcome::Optimized(plan) => {
            let run = state.archive.store(plan).await;
            Ok(Json(OptimizationResponse::from_run(&run)).into_response())
        }
    }
}

/// Pull the stop-analysis job's suggested possible stops into the
/// registry. Failures are absorbed: the run continues with whatever
/// stops are already registered.
async fn ingest_suggested_stops(state: &AppState, date: ServiceDate) {
    let suggestions = match state.campus.fetch_possible_stop_suggestions(date).await {
        Ok(suggestions) => suggestions,
        Err(e) => {
            warn!(error = %e, "stop analysis unavailable; continuing with registered stops");
            return;
        }
    };

    for suggestion in suggestions {
        match state
            .registry
            .add_possible_stops(&suggestion.route, suggestion.candidates)
            .await
        {
            Ok(outcome) => debug!(
                route = %suggestion.route,
                added = outcome.added.len(),
                skipped = outcome.skipped.len(),
                "ingested suggested possible stops"
            ),
            // A concurrent run ingested the same stops first; they are
            // present, which is all this step needs.
            Err(RegistryError::DuplicateRace { .. }) => {}
            Err(e) => warn!(
                route = %suggestion.route,
                error = %e,
                "failed to ingest suggested possible stops"
            ),
        }
    }
}

/// List archived optimization runs, newest first.
async fn list_runs(State(state): State<AppState>) -> Json<RunHistoryResponse> {
    let runs = state.archive.recent(20).await;
    Json(RunHistoryResponse {
        runs: runs.iter().map(|r| RunHistoryEntry::from_run(r)).collect(),
    })
}

/// Fetch one archived optimization run.
async fn get_run(
    State(state): State<AppState>,
    Path(run_id): Path<u64>,
) -> Result<Json<OptimizationResponse>, AppError> {
    let run = state
        .archive
        .get(RunId(run_id))
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("Optimization run {run_id} not found"),
        })?;

    Ok(Json(OptimizationResponse::from_run(&run)))
}

/// List a route's stops, regular and possible together.
async fn list_route_stops(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> Result<Json<ListStopsResponse>, AppError> {
    let route = parse_route_id(&route_id)?;
    let stops = state.registry.list_stops(&route).await?;

    Ok(Json(ListStopsResponse {
        route_id: route.as_str().to_string(),
        stops: stops.iter().map(StopResult::from_stop).collect(),
    }))
}

/// Insert possible stops for a route.
async fn add_possible_stops(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
    Json(req): Json<AddPossibleStopsRequest>,
) -> Result<Json<AddPossibleStopsResponse>, AppError> {
    let route = parse_route_id(&route_id)?;

    let candidates = req
        .stops
        .into_iter()
        .map(CandidateStop::into_candidate)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|message| AppError::BadRequest { message })?;

    let outcome = state.registry.add_possible_stops(&route, candidates).await?;

    Ok(Json(AddPossibleStopsResponse::from_outcome(&outcome)))
}

/// Delete a possible stop by id, scoped to its owning route.
async fn delete_possible_stop(
    State(state): State<AppState>,
    Path((route_id, stop_id)): Path<(String, u64)>,
) -> Result<StatusCode, AppError> {
    let route = parse_route_id(&route_id)?;
    state
        .registry
        .delete_possible_stop(&route, StopId(stop_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Search regular stops across routes, grouped by owning route.
async fn search_stops(
    State(state): State<AppState>,
    Query(params): Query<SearchStopsParams>,
) -> Result<Json<SearchStopsResponse>, AppError> {
    let exclude = params
        .exclude_route
        .as_deref()
        .map(parse_route_id)
        .transpose()?;
    let limit = params.limit.unwrap_or(20).min(100);

    let groups = state
        .registry
        .search_stops(&params.q, exclude.as_ref(), limit)
        .await;

    Ok(Json(SearchStopsResponse {
        query: params.q,
        groups: groups.iter().map(RouteGroupResult::from_group).collect(),
    }))
}

fn parse_route_id(s: &str) -> Result<RouteId, AppError> {
    RouteId::parse(s).map_err(|e| AppError::BadRequest {
        message: format!("Invalid route id {s:?}: {e}"),
    })
}

/// Route catalog backed by the cached campus client.
struct CampusCatalog {
    campus: Arc<CachedCampusClient>,
}

impl RouteCatalog for CampusCatalog {
    fn active_routes(&self) -> Result<Vec<Route>, OptimizeError> {
        block_on_current(async {
            let routes = self.campus.get_routes().await.map_err(|e| {
                OptimizeError::Dependency {
                    what: "route catalog",
                    message: e.to_string(),
                }
            })?;
            Ok(routes
                .iter()
                .filter(|r| r.status.is_active())
                .cloned()
                .collect())
        })
    }

    fn bookings(&self, route: &RouteId, date: ServiceDate) -> Result<Vec<Booking>, OptimizeError> {
        block_on_current(async {
            let bookings = self.campus.get_bookings(route, date).await.map_err(|e| {
                OptimizeError::Dependency {
                    what: "booking index",
                    message: e.to_string(),
                }
            })?;
            Ok(bookings.as_ref().clone())
        })
    }
}

/// Stop directory backed by the stop registry.
struct RegistryDirectory {
    registry: StopRegistry,
}

impl StopDirectory for RegistryDirectory {
    fn stops_for(&self, route: &RouteId) -> Result<Vec<Stop>, OptimizeError> {
        block_on_current(async {
            self.registry
                .list_stops(route)
                .await
                .map_err(|e| OptimizeError::Dependency {
                    what: "stop registry",
                    message: e.to_string(),
                })
        })
    }
}

/// Run async code from the planner's synchronous seams.
///
/// The planner traits are synchronous but the backing stores are async.
/// We use block_in_place so the current worker thread can drive the
/// future without starving the runtime.
fn block_on_current<T>(fut: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| {
        let rt = tokio::runtime::Handle::current();
        rt.block_on(fut)
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    FailedDependency { message: String },
    Internal { message: String },
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::UnknownRoute(_) | RegistryError::StopNotFound { .. } => {
                AppError::NotFound {
                    message: e.to_string(),
                }
            }
            RegistryError::MissingField { .. }
            | RegistryError::UnknownSourceRoute(_)
            | RegistryError::SelfSource(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            RegistryError::DuplicateRace { .. } => AppError::Conflict {
                message: e.to_string(),
            },
        }
    }
}

impl From<OptimizeError> for AppError {
    fn from(e: OptimizeError) -> Self {
        match e {
            OptimizeError::InvalidRequest(msg) => AppError::BadRequest { message: msg },
            OptimizeError::Dependency { .. } | OptimizeError::Timeout => {
                AppError::FailedDependency {
                    message: e.to_string(),
                }
            }
        }
    }
}

impl From<CampusError> for AppError {
    fn from(e: CampusError) -> Self {
        AppError::FailedDependency {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message.clone()),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message.clone()),
            AppError::FailedDependency { message } => (StatusCode::BAD_GATEWAY, message.clone()),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
        };

        warn!(status = %status, message = %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
