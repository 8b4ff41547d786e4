//! Fixed keyword sets used by the matching rules.
//!
//! Boarding-stop names are free text entered independently per route, so
//! the rules lean on small curated vocabularies rather than general fuzzy
//! matching. The lists are deliberately short; growing them is a tuning
//! exercise, not a code change elsewhere.

/// The generic placeholder passengers pick when they don't know their
/// stop's real name.
pub const MAIN_STOP_ALIAS: &str = "main stop";

/// Landmark keywords that make a candidate stop an acceptable target for
/// the "main stop" placeholder.
pub const LANDMARK_KEYWORDS: [&str; 6] = [
    "bus stand",
    "main",
    "center",
    "corner",
    "colony",
    "junction",
];

/// Known place-name tokens around the campus. A passenger stop and a
/// candidate stop containing the same token are assumed to mean the same
/// locality.
pub const PLACE_TOKENS: [&str; 8] = [
    "erode",
    "perundurai",
    "bhavani",
    "chithode",
    "gobichettipalayam",
    "sathyamangalam",
    "kavindapadi",
    "college",
];

/// Normalize a stop name for comparison: trimmed, lowercased.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
