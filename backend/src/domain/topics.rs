//! Display titles for census topics.
//!
//! Titles are presentation strings; the lookup result carries only codes.

use super::CensusTopicCode;

/// Title shown for topics missing from [`TOPIC_TITLES`].
pub const UNKNOWN_TOPIC_TITLE: &str = "Unknown Census Data";

/// Known topic codes and their titles.
pub const TOPIC_TITLES: &[(&str, &str)] = &[
    (
        "TS001",
        "Number of usual residents in households and communal establishments",
    ),
    ("TS002", "Legal partnership status"),
    ("TS003", "Household composition"),
    ("TS004", "Country of birth"),
    ("TS005", "Passports held"),
    ("TS006", "Population density"),
    ("TS008", "Sex"),
];

/// Title for a topic, falling back to [`UNKNOWN_TOPIC_TITLE`].
///
/// # Examples
/// ```
/// use census_lookup::domain::{CensusTopicCode, topic_title};
///
/// let code = CensusTopicCode::new("TS002").expect("valid code");
/// assert_eq!(topic_title(&code), "Legal partnership status");
/// ```
pub fn topic_title(code: &CensusTopicCode) -> &'static str {
    TOPIC_TITLES
        .iter()
        .find(|(known, _)| *known == code.as_str())
        .map_or(UNKNOWN_TOPIC_TITLE, |(_, title)| title)
}
