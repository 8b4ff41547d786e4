//! The stop registry.
//!
//! Owns the per-route stop lists: regular stops seeded from the campus
//! data service's schedules, and possible stops borrowed from other
//! routes for transfer matching. Thread-safe and cheap to clone.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveTime;
use tokio::sync::RwLock;

use crate::domain::{Route, RouteId, Stop, StopCategory, StopId};

use super::error::RegistryError;

/// A regular stop as delivered by the campus data service's schedule
/// feed, before the registry assigns it an id.
#[derive(Debug, Clone)]
pub struct ScheduleStop {
    pub name: String,
    pub time: NaiveTime,
    pub sequence: u32,
}

/// A candidate possible stop as submitted by the admin tooling or the
/// upstream stop-analysis job. Required fields are optional here so the
/// registry can report exactly which one is missing.
#[derive(Debug, Clone, Default)]
pub struct PossibleStopCandidate {
    pub name: Option<String>,
    pub time: Option<NaiveTime>,
    pub sequence: Option<u32>,
    pub source_route: Option<RouteId>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_major: bool,
}

/// A candidate skipped because its (route, name, source route) triple
/// already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStop {
    pub name: String,
    pub source_route: RouteId,
}

/// Outcome of a batch possible-stop insertion.
#[derive(Debug, Clone)]
pub struct AddOutcome {
    /// Stops actually inserted, with their assigned ids.
    pub added: Vec<Stop>,

    /// Candidates skipped as already present.
    pub skipped: Vec<SkippedStop>,
}

/// Search hits for one owning route.
#[derive(Debug, Clone)]
pub struct RouteStopsGroup {
    pub route: RouteId,
    pub route_name: String,
    pub stops: Vec<Stop>,
}

#[derive(Debug)]
struct RouteEntry {
    name: String,
    stops: Vec<Stop>,
}

#[derive(Debug, Default)]
struct Inner {
    routes: HashMap<RouteId, RouteEntry>,
    next_stop_id: u64,
}

impl Inner {
    fn allocate_id(&mut self) -> StopId {
        self.next_stop_id += 1;
        StopId(self.next_stop_id)
    }

    fn entry(&self, route: &RouteId) -> Result<&RouteEntry, RegistryError> {
        self.routes
            .get(route)
            .ok_or_else(|| RegistryError::UnknownRoute(route.clone()))
    }

    fn has_possible(&self, route: &RouteId, name: &str, source: &RouteId) -> bool {
        let wanted = normalize_key(name);
        self.routes.get(route).is_some_and(|entry| {
            entry.stops.iter().any(|s| {
                s.category == StopCategory::Possible
                    && s.source_route.as_ref() == Some(source)
                    && normalize_key(&s.name) == wanted
            })
        })
    }
}

/// Uniqueness key for the (name, source route) part of the triple:
/// free-text names compare trimmed and case-insensitive.
fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Thread-safe registry of per-route stop lists.
#[derive(Clone, Default)]
pub struct StopRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl StopRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route so it can hold stops. Re-registering an existing
    /// route updates its display name and keeps its stops.
    pub async fn register_route(&self, route: &Route) {
        let mut guard = self.inner.write().await;
        guard
            .routes
            .entry(route.id.clone())
            .and_modify(|e| e.name = route.name.clone())
            .or_insert_with(|| RouteEntry {
                name: route.name.clone(),
                stops: Vec::new(),
            });
    }

    /// Number of registered routes.
    pub async fn route_count(&self) -> usize {
        self.inner.read().await.routes.len()
    }

    /// Replace a route's regular stops with a fresh schedule, preserving
    /// its possible stops. Used by startup seeding and the daily resync.
    pub async fn replace_schedule(
        &self,
        route: &RouteId,
        schedule: Vec<ScheduleStop>,
    ) -> Result<(), RegistryError> {
        let mut guard = self.inner.write().await;
        guard.entry(route)?;

        let regulars: Vec<Stop> = schedule
            .into_iter()
            .map(|s| {
                let id = guard.allocate_id();
                Stop::regular(id, route.clone(), s.name, s.time, s.sequence)
            })
            .collect();

        let entry = guard
            .routes
            .get_mut(route)
            .ok_or_else(|| RegistryError::UnknownRoute(route.clone()))?;
        entry.stops.retain(|s| s.category == StopCategory::Possible);
        entry.stops.extend(regulars);

        Ok(())
    }

    /// List a route's stops, regular and possible together, ordered by
    /// sequence position (name as tie-break).
    pub async fn list_stops(&self, route: &RouteId) -> Result<Vec<Stop>, RegistryError> {
        let guard = self.inner.read().await;
        let entry = guard.entry(route)?;

        let mut stops = entry.stops.clone();
        stops.sort_by(|a, b| {
            a.sequence
                .cmp(&b.sequence)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(stops)
    }

    /// Insert possible stops in one batch.
    ///
    /// Candidates are validated first (name, time and source route id are
    /// required; the source route must be registered and must differ from
    /// the target route) and nothing is inserted if any is invalid.
    /// Candidates whose (route, name, source route) triple already exists
    /// are skipped and reported, not treated as errors. The surviving
    /// candidates are inserted under the write lock; if an identical
    /// triple appears between the existence check and the insert, the
    /// batch fails with [`RegistryError::DuplicateRace`] so callers can
    /// treat it as "already present".
    pub async fn add_possible_stops(
        &self,
        route: &RouteId,
        candidates: Vec<PossibleStopCandidate>,
    ) -> Result<AddOutcome, RegistryError> {
        // Validate and split into survivors/skips under a read lock.
        let mut survivors: Vec<ValidCandidate> = Vec::new();
        let mut skipped: Vec<SkippedStop> = Vec::new();
        let mut batch_keys: std::collections::HashSet<(String, RouteId)> =
            std::collections::HashSet::new();
        {
            let guard = self.inner.read().await;
            guard.entry(route)?;

            for (index, candidate) in candidates.into_iter().enumerate() {
                let valid = validate_candidate(index, route, candidate)?;

                if guard.entry(&valid.source).is_err() {
                    return Err(RegistryError::UnknownSourceRoute(valid.source));
                }

                let key = (normalize_key(&valid.name), valid.source.clone());
                if guard.has_possible(route, &valid.name, &valid.source)
                    || !batch_keys.insert(key)
                {
                    skipped.push(SkippedStop {
                        name: valid.name,
                        source_route: valid.source,
                    });
                } else {
                    survivors.push(valid);
                }
            }
        }

        // Batch insert under the write lock, re-checking uniqueness.
        let mut guard = self.inner.write().await;
        for valid in &survivors {
            if guard.has_possible(route, &valid.name, &valid.source) {
                return Err(RegistryError::DuplicateRace {
                    name: valid.name.clone(),
                    source_route: valid.source.clone(),
                });
            }
        }

        let mut next_sequence = guard
            .entry(route)?
            .stops
            .iter()
            .map(|s| s.sequence)
            .max()
            .map_or(1, |max| max + 1);

        let mut added = Vec::with_capacity(survivors.len());
        for valid in survivors {
            let id = guard.allocate_id();
            let source_name = guard
                .entry(&valid.source)
                .map(|e| e.name.clone())
                .unwrap_or_default();

            let sequence = valid.sequence.unwrap_or_else(|| {
                let s = next_sequence;
                next_sequence += 1;
                s
            });

            let mut stop = Stop::possible(
                id,
                route.clone(),
                valid.name,
                valid.time,
                sequence,
                valid.source,
                source_name,
            );
            stop.latitude = valid.latitude;
            stop.longitude = valid.longitude;
            stop.is_major = valid.is_major;

            let entry = guard
                .routes
                .get_mut(route)
                .ok_or_else(|| RegistryError::UnknownRoute(route.clone()))?;
            entry.stops.push(stop.clone());
            added.push(stop);
        }

        Ok(AddOutcome { added, skipped })
    }

    /// Delete a possible stop by id, scoped to its owning route. A stop
    /// id that belongs to another route (or to a regular stop) is
    /// reported as not found and nothing is touched.
    pub async fn delete_possible_stop(
        &self,
        route: &RouteId,
        stop: StopId,
    ) -> Result<(), RegistryError> {
        let mut guard = self.inner.write().await;

        let entry = guard
            .routes
            .get_mut(route)
            .ok_or_else(|| RegistryError::UnknownRoute(route.clone()))?;

        let position = entry
            .stops
            .iter()
            .position(|s| s.id == stop && s.category == StopCategory::Possible);

        match position {
            Some(idx) => {
                entry.stops.remove(idx);
                Ok(())
            }
            None => Err(RegistryError::StopNotFound {
                route: route.clone(),
                stop,
            }),
        }
    }

    /// Case-insensitive substring search over regular stops, grouped by
    /// owning route. `exclude_route` drops the route the admin is
    /// borrowing *for*; `limit` bounds the total number of stops
    /// returned.
    pub async fn search_stops(
        &self,
        query: &str,
        exclude_route: Option<&RouteId>,
        limit: usize,
    ) -> Vec<RouteStopsGroup> {
        let wanted = normalize_key(query);
        if wanted.is_empty() || limit == 0 {
            return Vec::new();
        }

        let guard = self.inner.read().await;

        let mut route_ids: Vec<&RouteId> = guard.routes.keys().collect();
        route_ids.sort();

        let mut groups = Vec::new();
        let mut remaining = limit;

        for route_id in route_ids {
            if exclude_route == Some(route_id) {
                continue;
            }
            if remaining == 0 {
                break;
            }

            let entry = &guard.routes[route_id];
            let mut hits: Vec<Stop> = entry
                .stops
                .iter()
                .filter(|s| {
                    s.category == StopCategory::Regular
                        && normalize_key(&s.name).contains(&wanted)
                })
                .cloned()
                .collect();
            hits.sort_by_key(|s| s.sequence);
            hits.truncate(remaining);

            if !hits.is_empty() {
                remaining -= hits.len();
                groups.push(RouteStopsGroup {
                    route: route_id.clone(),
                    route_name: entry.name.clone(),
                    stops: hits,
                });
            }
        }

        groups
    }
}

struct ValidCandidate {
    name: String,
    time: NaiveTime,
    sequence: Option<u32>,
    source: RouteId,
    latitude: Option<f64>,
    longitude: Option<f64>,
    is_major: bool,
}

fn validate_candidate(
    index: usize,
    route: &RouteId,
    candidate: PossibleStopCandidate,
) -> Result<ValidCandidate, RegistryError> {
    let name = candidate
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(RegistryError::MissingField {
            index,
            field: "stop_name",
        })?
        .to_string();

    let time = candidate.time.ok_or(RegistryError::MissingField {
        index,
        field: "stop_time",
    })?;

    let source = candidate.source_route.ok_or(RegistryError::MissingField {
        index,
        field: "source_route_id",
    })?;

    if &source == route {
        return Err(RegistryError::SelfSource(route.clone()));
    }

    Ok(ValidCandidate {
        name,
        time,
        sequence: candidate.sequence,
        source,
        latitude: candidate.latitude,
        longitude: candidate.longitude,
        is_major: candidate.is_major,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Route;

    fn route_id(s: &str) -> RouteId {
        RouteId::parse(s).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn schedule(stops: &[(&str, u32)]) -> Vec<ScheduleStop> {
        stops
            .iter()
            .map(|(name, seq)| ScheduleStop {
                name: (*name).to_string(),
                time: time(7, *seq),
                sequence: *seq,
            })
            .collect()
    }

    fn candidate(name: &str, source: &str) -> PossibleStopCandidate {
        PossibleStopCandidate {
            name: Some(name.to_string()),
            time: Some(time(8, 0)),
            source_route: Some(route_id(source)),
            ..Default::default()
        }
    }

    async fn registry_with_routes(ids: &[&str]) -> StopRegistry {
        let registry = StopRegistry::new();
        for id in ids {
            let route = Route::new(route_id(id), format!("Route {id}"), *id);
            registry.register_route(&route).await;
        }
        registry
    }

    #[tokio::test]
    async fn list_stops_unknown_route() {
        let registry = StopRegistry::new();
        let err = registry.list_stops(&route_id("R9")).await.unwrap_err();
        assert!(matches!(err, RegistryError::UnknownRoute(_)));
    }

    #[tokio::test]
    async fn list_stops_ordered_by_sequence() {
        let registry = registry_with_routes(&["A", "B"]).await;
        registry
            .replace_schedule(&route_id("A"), schedule(&[("Third", 3), ("First", 1)]))
            .await
            .unwrap();
        registry
            .add_possible_stops(
                &route_id("A"),
                vec![PossibleStopCandidate {
                    sequence: Some(2),
                    ..candidate("Borrowed", "B")
                }],
            )
            .await
            .unwrap();

        let stops = registry.list_stops(&route_id("A")).await.unwrap();
        let names: Vec<&str> = stops.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Borrowed", "Third"]);
    }

    #[tokio::test]
    async fn add_possible_stops_is_idempotent() {
        let registry = registry_with_routes(&["A", "B"]).await;

        let first = registry
            .add_possible_stops(&route_id("A"), vec![candidate("Main Junction", "B")])
            .await
            .unwrap();
        assert_eq!(first.added.len(), 1);
        assert!(first.skipped.is_empty());

        let second = registry
            .add_possible_stops(&route_id("A"), vec![candidate("Main Junction", "B")])
            .await
            .unwrap();
        assert!(second.added.is_empty());
        assert_eq!(second.skipped.len(), 1);
        assert_eq!(second.skipped[0].name, "Main Junction");
        assert_eq!(second.skipped[0].source_route, route_id("B"));
    }

    #[tokio::test]
    async fn duplicate_detection_is_case_insensitive() {
        let registry = registry_with_routes(&["A", "B"]).await;
        registry
            .add_possible_stops(&route_id("A"), vec![candidate("Main Junction", "B")])
            .await
            .unwrap();

        let outcome = registry
            .add_possible_stops(&route_id("A"), vec![candidate("  MAIN JUNCTION ", "B")])
            .await
            .unwrap();
        assert!(outcome.added.is_empty());
        assert_eq!(outcome.skipped.len(), 1);
    }

    #[tokio::test]
    async fn same_name_different_source_is_not_a_duplicate() {
        let registry = registry_with_routes(&["A", "B", "C"]).await;
        registry
            .add_possible_stops(&route_id("A"), vec![candidate("Main Junction", "B")])
            .await
            .unwrap();

        let outcome = registry
            .add_possible_stops(&route_id("A"), vec![candidate("Main Junction", "C")])
            .await
            .unwrap();
        assert_eq!(outcome.added.len(), 1);
    }

    #[tokio::test]
    async fn missing_fields_reject_the_batch() {
        let registry = registry_with_routes(&["A", "B"]).await;

        let missing_name = PossibleStopCandidate {
            time: Some(time(8, 0)),
            source_route: Some(route_id("B")),
            ..Default::default()
        };
        let err = registry
            .add_possible_stops(&route_id("A"), vec![missing_name])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MissingField {
                field: "stop_name",
                ..
            }
        ));

        let missing_time = PossibleStopCandidate {
            name: Some("X".into()),
            source_route: Some(route_id("B")),
            ..Default::default()
        };
        let err = registry
            .add_possible_stops(&route_id("A"), vec![missing_time])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MissingField {
                field: "stop_time",
                ..
            }
        ));

        let missing_source = PossibleStopCandidate {
            name: Some("X".into()),
            time: Some(time(8, 0)),
            ..Default::default()
        };
        let err = registry
            .add_possible_stops(&route_id("A"), vec![missing_source])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MissingField {
                field: "source_route_id",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unknown_source_route_is_rejected() {
        let registry = registry_with_routes(&["A"]).await;
        let err = registry
            .add_possible_stops(&route_id("A"), vec![candidate("X", "ZZ")])
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownSourceRoute(_)));
    }

    #[tokio::test]
    async fn borrowing_from_self_is_rejected() {
        let registry = registry_with_routes(&["A"]).await;
        let err = registry
            .add_possible_stops(&route_id("A"), vec![candidate("X", "A")])
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::SelfSource(_)));
    }

    #[tokio::test]
    async fn possible_stop_resolves_source_route_name() {
        let registry = registry_with_routes(&["A", "B"]).await;
        let outcome = registry
            .add_possible_stops(&route_id("A"), vec![candidate("Main Junction", "B")])
            .await
            .unwrap();
        assert_eq!(
            outcome.added[0].source_route_name.as_deref(),
            Some("Route B")
        );
    }

    #[tokio::test]
    async fn delete_is_scoped_to_owning_route() {
        let registry = registry_with_routes(&["A", "B", "C"]).await;
        let outcome = registry
            .add_possible_stops(&route_id("A"), vec![candidate("Main Junction", "B")])
            .await
            .unwrap();
        let stop_id = outcome.added[0].id;

        // Deleting through the wrong route must not remove A's stop
        let err = registry
            .delete_possible_stop(&route_id("C"), stop_id)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::StopNotFound { .. }));
        assert_eq!(registry.list_stops(&route_id("A")).await.unwrap().len(), 1);

        registry
            .delete_possible_stop(&route_id("A"), stop_id)
            .await
            .unwrap();
        assert!(registry.list_stops(&route_id("A")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_ignores_regular_stops() {
        let registry = registry_with_routes(&["A"]).await;
        registry
            .replace_schedule(&route_id("A"), schedule(&[("First", 1)]))
            .await
            .unwrap();
        let regular_id = registry.list_stops(&route_id("A")).await.unwrap()[0].id;

        let err = registry
            .delete_possible_stop(&route_id("A"), regular_id)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::StopNotFound { .. }));
    }

    #[tokio::test]
    async fn replace_schedule_preserves_possible_stops() {
        let registry = registry_with_routes(&["A", "B"]).await;
        registry
            .replace_schedule(&route_id("A"), schedule(&[("Old Stop", 1)]))
            .await
            .unwrap();
        registry
            .add_possible_stops(&route_id("A"), vec![candidate("Borrowed", "B")])
            .await
            .unwrap();

        registry
            .replace_schedule(&route_id("A"), schedule(&[("New Stop", 1)]))
            .await
            .unwrap();

        let stops = registry.list_stops(&route_id("A")).await.unwrap();
        let names: Vec<&str> = stops.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"New Stop"));
        assert!(names.contains(&"Borrowed"));
        assert!(!names.contains(&"Old Stop"));
    }

    #[tokio::test]
    async fn search_groups_by_route_and_respects_exclusion() {
        let registry = registry_with_routes(&["A", "B", "C"]).await;
        registry
            .replace_schedule(&route_id("A"), schedule(&[("Erode Bus Stand", 1)]))
            .await
            .unwrap();
        registry
            .replace_schedule(&route_id("B"), schedule(&[("Bhavani Bus Stand", 1)]))
            .await
            .unwrap();
        registry
            .replace_schedule(&route_id("C"), schedule(&[("Hill View", 1)]))
            .await
            .unwrap();

        let groups = registry.search_stops("bus stand", None, 10).await;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].route, route_id("A"));
        assert_eq!(groups[1].route, route_id("B"));

        let excluded = registry
            .search_stops("bus stand", Some(&route_id("A")), 10)
            .await;
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded[0].route, route_id("B"));
    }

    #[tokio::test]
    async fn search_respects_limit_and_skips_possible_stops() {
        let registry = registry_with_routes(&["A", "B"]).await;
        registry
            .replace_schedule(
                &route_id("A"),
                schedule(&[("Stand One", 1), ("Stand Two", 2), ("Stand Three", 3)]),
            )
            .await
            .unwrap();
        registry
            .add_possible_stops(&route_id("A"), vec![candidate("Stand Borrowed", "B")])
            .await
            .unwrap();

        let groups = registry.search_stops("stand", None, 2).await;
        let total: usize = groups.iter().map(|g| g.stops.len()).sum();
        assert_eq!(total, 2);
        assert!(groups
            .iter()
            .flat_map(|g| &g.stops)
            .all(|s| s.category == StopCategory::Regular));
    }

    #[tokio::test]
    async fn empty_query_returns_nothing() {
        let registry = registry_with_routes(&["A"]).await;
        registry
            .replace_schedule(&route_id("A"), schedule(&[("Erode Bus Stand", 1)]))
            .await
            .unwrap();
        assert!(registry.search_stops("", None, 10).await.is_empty());
        assert!(registry.search_stops("   ", None, 10).await.is_empty());
    }
}
