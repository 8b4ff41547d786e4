//! Transfer result types.

use super::{RouteId, StopCategory};

/// How confidently a passenger's boarding stop was matched to a
/// candidate route's stop.
///
/// Tiers are ordered best-first: an exact name match always beats the
/// heuristic tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchConfidence {
    /// Case-insensitive name equality.
    Exact,
    /// The generic "main stop" placeholder matched a landmark keyword.
    Alias,
    /// Both names contain the same known place-name token.
    Landmark,
    /// Both names share a generic keyword ("main" or "center").
    Partial,
}

impl MatchConfidence {
    /// Wire-format token for this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchConfidence::Exact => "exact",
            MatchConfidence::Alias => "alias",
            MatchConfidence::Landmark => "landmark",
            MatchConfidence::Partial => "partial",
        }
    }

    /// Human-readable description of the tier.
    pub fn description(&self) -> &'static str {
        match self {
            MatchConfidence::Exact => "Stop names match exactly",
            MatchConfidence::Alias => "Generic main-stop placeholder matched a landmark",
            MatchConfidence::Landmark => "Stop names share a known place name",
            MatchConfidence::Partial => "Stop names share a generic keyword",
        }
    }
}

/// One passenger matched onto an alternate route.
///
/// Ephemeral: computed per optimization run and persisted only inside the
/// run's result record.
#[derive(Debug, Clone)]
pub struct PassengerTransfer {
    pub student_id: String,
    pub student_name: String,
    pub roll_number: String,

    /// The passenger's boarding stop on the underutilized route.
    pub from_stop: String,

    /// The alternate route the passenger can ride instead.
    pub to_route: RouteId,
    pub to_route_name: String,

    /// The stop on the target route that matched.
    pub matched_stop: String,

    /// Confidence tier of the match.
    pub confidence: MatchConfidence,

    /// Whether the matched stop is native to the target route or borrowed.
    pub matched_category: StopCategory,

    /// Display name of the borrowed stop's source route, when borrowed.
    pub source_route_name: Option<String>,

    /// The target route's spare seats at the time of the match.
    pub seats_available: i64,
}

/// How completely an underutilized route's riders can be reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferClassification {
    /// Every passenger matched (and there was at least one).
    FullTransfer,
    /// Some but not all passengers matched.
    PartialTransfer,
    /// No passenger matched.
    NoTransfer,
}

impl TransferClassification {
    /// Classify a route from its passenger count and the number of
    /// passengers that found a transfer.
    ///
    /// `transferable` must never exceed `current`; callers derive both
    /// from the same booking list.
    pub fn for_counts(current: usize, transferable: usize) -> Self {
        if transferable == 0 {
            TransferClassification::NoTransfer
        } else if transferable == current {
            TransferClassification::FullTransfer
        } else {
            TransferClassification::PartialTransfer
        }
    }

    /// Wire-format token for this classification.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferClassification::FullTransfer => "full_transfer",
            TransferClassification::PartialTransfer => "partial_transfer",
            TransferClassification::NoTransfer => "no_transfer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_full() {
        assert_eq!(
            TransferClassification::for_counts(3, 3),
            TransferClassification::FullTransfer
        );
        assert_eq!(
            TransferClassification::for_counts(1, 1),
            TransferClassification::FullTransfer
        );
    }

    #[test]
    fn classify_none() {
        assert_eq!(
            TransferClassification::for_counts(5, 0),
            TransferClassification::NoTransfer
        );
    }

    #[test]
    fn classify_partial() {
        assert_eq!(
            TransferClassification::for_counts(3, 2),
            TransferClassification::PartialTransfer
        );
        assert_eq!(
            TransferClassification::for_counts(30, 1),
            TransferClassification::PartialTransfer
        );
    }

    #[test]
    fn confidence_ordering() {
        // Exact is the best tier
        assert!(MatchConfidence::Exact < MatchConfidence::Alias);
        assert!(MatchConfidence::Alias < MatchConfidence::Landmark);
        assert!(MatchConfidence::Landmark < MatchConfidence::Partial);
    }

    #[test]
    fn wire_tokens() {
        assert_eq!(TransferClassification::FullTransfer.as_str(), "full_transfer");
        assert_eq!(
            TransferClassification::PartialTransfer.as_str(),
            "partial_transfer"
        );
        assert_eq!(TransferClassification::NoTransfer.as_str(), "no_transfer");
        assert_eq!(MatchConfidence::Exact.as_str(), "exact");
    }

    #[test]
    fn confidence_description() {
        assert!(!MatchConfidence::Exact.description().is_empty());
        assert!(!MatchConfidence::Partial.description().is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The three classification cases are exhaustive and mutually
        /// exclusive over valid (current, transferable) pairs.
        #[test]
        fn classification_law(current in 1usize..200, matched in 0usize..200) {
            let transferable = matched.min(current);
            let classification = TransferClassification::for_counts(current, transferable);

            if transferable == 0 {
                prop_assert_eq!(classification, TransferClassification::NoTransfer);
            } else if transferable == current {
                prop_assert_eq!(classification, TransferClassification::FullTransfer);
            } else {
                prop_assert_eq!(classification, TransferClassification::PartialTransfer);
            }
        }
    }
}
