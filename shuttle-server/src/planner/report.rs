//! Optimization run records and the run archive.
//!
//! An [`OptimizationRun`] is created once at the end of a successful run
//! and never mutated afterwards; the archive keeps them for audit and
//! history.

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{ServiceDate, TransferClassification};

use super::optimize::{CompletedPlan, RoutePlan};

/// Archive-assigned run identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aggregate totals for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub low_crowd_routes: usize,
    pub transferable_passengers: usize,
    pub full_transfers: usize,
    pub partial_transfers: usize,
    pub no_transfers: usize,
    pub potential_savings: u64,
    pub enhanced_stops_used: usize,
}

impl RunSummary {
    /// Compute the summary from per-route results.
    pub fn from_routes(routes: &[RoutePlan]) -> Self {
        let mut summary = RunSummary {
            low_crowd_routes: routes.len(),
            transferable_passengers: 0,
            full_transfers: 0,
            partial_transfers: 0,
            no_transfers: 0,
            potential_savings: 0,
            enhanced_stops_used: 0,
        };

        for route in routes {
            summary.transferable_passengers += route.transferable();
            summary.potential_savings += route.potential_savings;
            summary.enhanced_stops_used += route.enhanced_stops_used();
            match route.classification {
                TransferClassification::FullTransfer => summary.full_transfers += 1,
                TransferClassification::PartialTransfer => summary.partial_transfers += 1,
                TransferClassification::NoTransfer => summary.no_transfers += 1,
            }
        }

        summary
    }
}

/// The persisted record of one optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationRun {
    pub id: RunId,
    pub date: ServiceDate,
    pub requested_by: String,
    pub enhanced_stops_requested: bool,
    pub summary: RunSummary,
    pub routes: Vec<RoutePlan>,
}

impl OptimizationRun {
    fn new(id: RunId, plan: CompletedPlan) -> Self {
        let summary = RunSummary::from_routes(&plan.routes);
        Self {
            id,
            date: plan.date,
            requested_by: plan.requested_by,
            enhanced_stops_requested: plan.enhanced_stops_requested,
            summary,
            routes: plan.routes,
        }
    }
}

#[derive(Default)]
struct ArchiveInner {
    runs: Vec<Arc<OptimizationRun>>,
    next_id: u64,
}

/// Thread-safe archive of completed optimization runs.
#[derive(Clone, Default)]
pub struct RunArchive {
    inner: Arc<RwLock<ArchiveInner>>,
}

impl RunArchive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a completed plan, assigning it the next run id.
    pub async fn store(&self, plan: CompletedPlan) -> Arc<OptimizationRun> {
        let mut guard = self.inner.write().await;
        guard.next_id += 1;
        let run = Arc::new(OptimizationRun::new(RunId(guard.next_id), plan));
        guard.runs.push(run.clone());
        run
    }

    /// Look up a run by id.
    pub async fn get(&self, id: RunId) -> Option<Arc<OptimizationRun>> {
        let guard = self.inner.read().await;
        guard.runs.iter().find(|r| r.id == id).cloned()
    }

    /// The most recent runs, newest first, bounded by `limit`.
    pub async fn recent(&self, limit: usize) -> Vec<Arc<OptimizationRun>> {
        let guard = self.inner.read().await;
        guard.runs.iter().rev().take(limit).cloned().collect()
    }

    /// Number of archived runs.
    pub async fn len(&self) -> usize {
        self.inner.read().await.runs.len()
    }

    /// Returns true if nothing has been archived yet.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.runs.is_empty()
    }
}
