//! Boarding-stop matching.
//!
//! Given a passenger's free-text boarding-stop name and a candidate
//! route's stop list, decides whether a usable match exists and with what
//! confidence. Rules are evaluated in fixed priority order and the first
//! hit wins; within a rule, candidates are scanned in list order. The
//! matcher never searches for a "best" match, only a first acceptable one.

mod keywords;
mod rules;

pub use keywords::{normalize, LANDMARK_KEYWORDS, MAIN_STOP_ALIAS, PLACE_TOKENS};
pub use rules::{default_rules, ExactName, MainStopAlias, MatchRule, PlaceToken, SharedKeyword};

use crate::domain::{MatchConfidence, Stop, StopCategory};

/// A successful match against one candidate stop.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Name of the candidate stop that matched.
    pub stop_name: String,

    /// Whether the matched stop is native to the candidate route or
    /// borrowed from another route.
    pub category: StopCategory,

    /// Display name of the borrowed stop's source route, when borrowed.
    pub source_route_name: Option<String>,

    /// Which tier of rule produced the match.
    pub confidence: MatchConfidence,
}

/// Ordered rule-based stop matcher.
pub struct StopMatcher {
    rules: Vec<Box<dyn MatchRule>>,
}

impl StopMatcher {
    /// Create a matcher with a custom rule list. Rules are tried in the
    /// given order.
    pub fn new(rules: Vec<Box<dyn MatchRule>>) -> Self {
        Self { rules }
    }

    /// Match a passenger's boarding stop against a candidate route's
    /// combined stop list.
    ///
    /// Returns the first acceptable match in (rule priority, stop list)
    /// order, or `None`.
    pub fn match_stop(&self, passenger_stop: &str, candidates: &[Stop]) -> Option<MatchResult> {
        let wanted = normalize(passenger_stop);
        if wanted.is_empty() {
            return None;
        }

        for rule in &self.rules {
            for stop in candidates {
                if rule.matches(&wanted, &normalize(&stop.name)) {
                    return Some(MatchResult {
                        stop_name: stop.name.clone(),
                        category: stop.category,
                        source_route_name: stop.source_route_name.clone(),
                        confidence: rule.confidence(),
                    });
                }
            }
        }

        None
    }
}

impl Default for StopMatcher {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RouteId, StopId};
    use chrono::NaiveTime;

    fn route(s: &str) -> RouteId {
        RouteId::parse(s).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn regular(id: u64, name: &str, seq: u32) -> Stop {
        Stop::regular(StopId(id), route("T"), name, time(7, 30), seq)
    }

    fn possible(id: u64, name: &str, seq: u32, source: &str, source_name: &str) -> Stop {
        Stop::possible(
            StopId(id),
            route("T"),
            name,
            time(7, 45),
            seq,
            route(source),
            source_name,
        )
    }

    #[test]
    fn exact_match_case_insensitive() {
        let stops = vec![regular(1, "Erode Bus Stand", 1)];
        let result = StopMatcher::default()
            .match_stop("erode bus stand", &stops)
            .unwrap();
        assert_eq!(result.confidence, MatchConfidence::Exact);
        assert_eq!(result.stop_name, "Erode Bus Stand");
        assert_eq!(result.category, StopCategory::Regular);
    }

    #[test]
    fn exact_beats_heuristic_on_a_different_candidate() {
        // "Erode Main" would partial-match the first stop, but the exact
        // candidate later in the list must win because rule priority
        // outranks list order.
        let stops = vec![regular(1, "Main Bazaar", 1), regular(2, "Erode Main", 2)];
        let result = StopMatcher::default().match_stop("Erode Main", &stops).unwrap();
        assert_eq!(result.confidence, MatchConfidence::Exact);
        assert_eq!(result.stop_name, "Erode Main");
    }

    #[test]
    fn main_stop_placeholder_matches_first_landmark_in_list_order() {
        let stops = vec![
            possible(1, "Main Junction", 1, "C", "Chithode Link"),
            regular(2, "Erode Bus Stand", 5),
        ];
        let result = StopMatcher::default().match_stop("Main Stop", &stops).unwrap();
        assert_eq!(result.confidence, MatchConfidence::Alias);
        assert_eq!(result.stop_name, "Main Junction");
        assert_eq!(result.category, StopCategory::Possible);
        assert_eq!(result.source_route_name.as_deref(), Some("Chithode Link"));
    }

    #[test]
    fn place_token_match() {
        let stops = vec![regular(1, "Perundurai Bypass", 1)];
        let result = StopMatcher::default()
            .match_stop("Perundurai Signal", &stops)
            .unwrap();
        assert_eq!(result.confidence, MatchConfidence::Landmark);
    }

    #[test]
    fn shared_keyword_match() {
        let stops = vec![regular(1, "Old Main Road", 1)];
        let result = StopMatcher::default()
            .match_stop("Main Gate West", &stops)
            .unwrap();
        assert_eq!(result.confidence, MatchConfidence::Partial);
    }

    #[test]
    fn no_match() {
        let stops = vec![regular(1, "Hill View", 1)];
        assert!(StopMatcher::default()
            .match_stop("Unknown Corner", &stops)
            .is_none());
    }

    #[test]
    fn empty_passenger_stop_never_matches() {
        let stops = vec![regular(1, "Main Bazaar", 1)];
        assert!(StopMatcher::default().match_stop("", &stops).is_none());
        assert!(StopMatcher::default().match_stop("   ", &stops).is_none());
    }

    #[test]
    fn empty_candidate_list() {
        assert!(StopMatcher::default().match_stop("Main Stop", &[]).is_none());
    }

    #[test]
    fn custom_rule_list_is_respected() {
        // A matcher with only the exact rule must not heuristic-match
        let matcher = StopMatcher::new(vec![Box::new(ExactName)]);
        let stops = vec![regular(1, "Main Junction", 1)];
        assert!(matcher.match_stop("Main Stop", &stops).is_none());
        assert!(matcher.match_stop("Main Junction", &stops).is_some());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{RouteId, StopId};
    use chrono::NaiveTime;
    use proptest::prelude::*;

    fn stop(name: &str, seq: u32) -> Stop {
        Stop::regular(
            StopId(seq as u64),
            RouteId::parse("T").unwrap(),
            name,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            seq,
        )
    }

    /// Strategy over plausible free-text stop names.
    fn name_strategy() -> impl Strategy<Value = String> {
        proptest::string::string_regex("[A-Za-z][A-Za-z ]{0,20}").unwrap()
    }

    proptest! {
        /// Whenever a candidate with the exact passenger name is present,
        /// the match is reported at Exact confidence, regardless of what
        /// other candidates precede it.
        #[test]
        fn exact_candidate_always_wins(
            name in name_strategy(),
            decoys in prop::collection::vec(name_strategy(), 0..5),
        ) {
            prop_assume!(!name.trim().is_empty());

            let mut stops: Vec<Stop> = decoys
                .iter()
                .enumerate()
                .map(|(i, d)| stop(d, i as u32))
                .collect();
            stops.push(stop(&name, 99));

            let result = StopMatcher::default().match_stop(&name, &stops).unwrap();
            prop_assert_eq!(result.confidence, MatchConfidence::Exact);
        }

        /// The matcher is deterministic: the same inputs produce the same
        /// outcome.
        #[test]
        fn matching_is_deterministic(
            name in name_strategy(),
            candidates in prop::collection::vec(name_strategy(), 0..6),
        ) {
            let stops: Vec<Stop> = candidates
                .iter()
                .enumerate()
                .map(|(i, c)| stop(c, i as u32))
                .collect();

            let matcher = StopMatcher::default();
            let first = matcher.match_stop(&name, &stops);
            let second = matcher.match_stop(&name, &stops);

            match (first, second) {
                (None, None) => {}
                (Some(a), Some(b)) => {
                    prop_assert_eq!(a.stop_name, b.stop_name);
                    prop_assert_eq!(a.confidence, b.confidence);
                }
                _ => prop_assert!(false, "nondeterministic match outcome"),
            }
        }
    }
}
