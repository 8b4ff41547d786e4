//! Matching rule strategies.
//!
//! Each rule answers one question: does this passenger stop name and this
//! candidate stop name refer to the same boarding point? Rules are held in
//! an ordered list by the matcher; order is the tie-break, so adding or
//! tuning a rule never touches orchestration logic.

use crate::domain::MatchConfidence;

use super::keywords::{LANDMARK_KEYWORDS, MAIN_STOP_ALIAS, PLACE_TOKENS};

/// A single matching strategy.
///
/// Both inputs arrive normalized (trimmed, lowercased); rules compare
/// content only.
pub trait MatchRule: Send + Sync {
    /// The confidence tier this rule awards on a hit.
    fn confidence(&self) -> MatchConfidence;

    /// Whether `passenger_stop` and `candidate_stop` refer to the same
    /// boarding point under this rule.
    fn matches(&self, passenger_stop: &str, candidate_stop: &str) -> bool;
}

/// Case-insensitive name equality.
pub struct ExactName;

impl MatchRule for ExactName {
    fn confidence(&self) -> MatchConfidence {
        MatchConfidence::Exact
    }

    fn matches(&self, passenger_stop: &str, candidate_stop: &str) -> bool {
        passenger_stop == candidate_stop
    }
}

/// The "main stop" placeholder matches any candidate containing a
/// landmark keyword.
pub struct MainStopAlias;

impl MatchRule for MainStopAlias {
    fn confidence(&self) -> MatchConfidence {
        MatchConfidence::Alias
    }

    fn matches(&self, passenger_stop: &str, candidate_stop: &str) -> bool {
        passenger_stop == MAIN_STOP_ALIAS
            && LANDMARK_KEYWORDS.iter().any(|k| candidate_stop.contains(k))
    }
}

/// Both names contain the same known place-name token.
pub struct PlaceToken;

impl MatchRule for PlaceToken {
    fn confidence(&self) -> MatchConfidence {
        MatchConfidence::Landmark
    }

    fn matches(&self, passenger_stop: &str, candidate_stop: &str) -> bool {
        PLACE_TOKENS
            .iter()
            .any(|t| passenger_stop.contains(t) && candidate_stop.contains(t))
    }
}

/// Both names contain "main", or both contain "center".
pub struct SharedKeyword;

impl MatchRule for SharedKeyword {
    fn confidence(&self) -> MatchConfidence {
        MatchConfidence::Partial
    }

    fn matches(&self, passenger_stop: &str, candidate_stop: &str) -> bool {
        ["main", "center"]
            .iter()
            .any(|k| passenger_stop.contains(k) && candidate_stop.contains(k))
    }
}

/// The default rule set in priority order. First rule hit wins.
pub fn default_rules() -> Vec<Box<dyn MatchRule>> {
    vec![
        Box::new(ExactName),
        Box::new(MainStopAlias),
        Box::new(PlaceToken),
        Box::new(SharedKeyword),
    ]
}
