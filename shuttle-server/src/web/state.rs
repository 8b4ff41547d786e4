//! Application state for the web layer.

use std::sync::Arc;

use crate::campus::CachedCampusClient;
use crate::matcher::StopMatcher;
use crate::planner::{OptimizerConfig, RunArchive};
use crate::registry::StopRegistry;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Cached campus data service client
    pub campus: Arc<CachedCampusClient>,

    /// Per-route stop lists
    pub registry: StopRegistry,

    /// Archive of completed optimization runs
    pub archive: RunArchive,

    /// Stop matching rules
    pub matcher: Arc<StopMatcher>,

    /// Optimizer configuration
    pub config: Arc<OptimizerConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        campus: CachedCampusClient,
        registry: StopRegistry,
        archive: RunArchive,
        matcher: StopMatcher,
        config: OptimizerConfig,
    ) -> Self {
        Self {
            campus: Arc::new(campus),
            registry,
            archive,
            matcher: Arc::new(matcher),
            config: Arc::new(config),
        }
    }
}
