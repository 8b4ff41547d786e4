use std::net::SocketAddr;
use std::time::Duration;

use futures::future::join_all;
use tracing::{error, info, warn};

use shuttle_server::campus::{
    CachedCampusClient, CampusCacheConfig, CampusClient, CampusClientConfig, CampusError,
};
use shuttle_server::matcher::StopMatcher;
use shuttle_server::planner::{OptimizerConfig, RunArchive};
use shuttle_server::registry::StopRegistry;
use shuttle_server::web::{AppState, create_router};

/// How often to resync route schedules from the data service (24 hours).
const SCHEDULE_RESYNC_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Get credentials from environment
    let username = std::env::var("CAMPUS_API_USERNAME").unwrap_or_else(|_| {
        warn!("CAMPUS_API_USERNAME not set. Data service calls will fail.");
        String::new()
    });
    let password = std::env::var("CAMPUS_API_PASSWORD").unwrap_or_else(|_| {
        warn!("CAMPUS_API_PASSWORD not set. Data service calls will fail.");
        String::new()
    });

    // Create the campus data service client
    let mut config = CampusClientConfig::new(&username, &password);
    if let Ok(url) = std::env::var("CAMPUS_API_URL") {
        config = config.with_base_url(url);
    }
    let client = CampusClient::new(config).expect("Failed to create campus data client");
    let campus = CachedCampusClient::new(client, &CampusCacheConfig::default());

    // Seed the stop registry from the data service (fail fast if unavailable)
    info!("Seeding stop registry from the campus data service...");
    let registry = StopRegistry::new();
    seed_registry(&campus, &registry)
        .await
        .expect("Failed to seed stop registry");
    info!("Loaded {} routes into the stop registry", registry.route_count().await);

    // Build app state
    let state = AppState::new(
        campus,
        registry,
        RunArchive::new(),
        StopMatcher::default(),
        OptimizerConfig::default(),
    );

    // Spawn background task to resync schedules daily
    let resync_campus = state.campus.clone();
    let resync_registry = state.registry.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SCHEDULE_RESYNC_INTERVAL);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            match seed_registry(&resync_campus, &resync_registry).await {
                Ok(count) => info!(routes = count, "Resynced route schedules"),
                Err(e) => error!(error = %e, "Failed to resync route schedules"),
            }
        }
    });

    // Create router
    let app = create_router(state);

    // Bind and serve
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("Transfer optimization server listening on http://{addr}");
    info!("API Endpoints:");
    info!("  GET    /health                                  - Health check");
    info!("  POST   /optimize/run                            - Run transfer optimization");
    info!("  GET    /optimize/runs                           - Run history");
    info!("  GET    /routes/:route_id/stops                  - List a route's stops");
    info!("  POST   /routes/:route_id/possible-stops         - Add possible stops");
    info!("  DELETE /routes/:route_id/possible-stops/:stop   - Delete a possible stop");
    info!("  GET    /stops/search                            - Search stops across routes");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}

/// Register all routes and refresh their regular stop schedules.
///
/// A route whose schedule fetch fails keeps its existing stops; only a
/// failure to list routes at all is fatal to the seeding pass.
async fn seed_registry(
    campus: &CachedCampusClient,
    registry: &StopRegistry,
) -> Result<usize, CampusError> {
    let routes = campus.get_routes().await?;

    for route in routes.iter() {
        registry.register_route(route).await;
    }

    let fetches = routes.iter().map(|route| {
        let id = route.id.clone();
        async move { (id.clone(), campus.fetch_schedule(&id).await) }
    });

    for (route_id, result) in join_all(fetches).await {
        match result {
            Ok(schedule) => {
                if let Err(e) = registry.replace_schedule(&route_id, schedule).await {
                    warn!(route = %route_id, error = %e, "failed to store schedule");
                }
            }
            Err(e) => {
                warn!(route = %route_id, error = %e, "failed to fetch schedule; keeping existing stops");
            }
        }
    }

    Ok(routes.len())
}
