//! Result of resolving a postcode to its neighbourhood.

use std::collections::BTreeMap;

use super::{CensusTable, CensusTopicCode, OutputArea, OutputAreaCode, PostcodeRecord};

/// A postcode's output area together with every area touching it.
///
/// Areas are unique by code and ordered by code. The origin area is always
/// present.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbourhood {
    origin: OutputAreaCode,
    areas: Vec<OutputArea>,
}

impl Neighbourhood {
    /// Build a neighbourhood, returning `None` when `areas` lacks the origin.
    pub fn new(origin: OutputAreaCode, mut areas: Vec<OutputArea>) -> Option<Self> {
        areas.sort_by(|left, right| left.code.cmp(&right.code));
        areas.dedup_by(|left, right| left.code == right.code);
        areas
            .iter()
            .any(|area| area.code == origin)
            .then_some(Self { origin, areas })
    }

    /// Code of the area containing the postcode.
    pub fn origin(&self) -> &OutputAreaCode {
        &self.origin
    }

    /// All member areas.
    pub fn areas(&self) -> &[OutputArea] {
        &self.areas
    }

    /// Member area codes in order.
    pub fn codes(&self) -> Vec<OutputAreaCode> {
        self.areas.iter().map(|area| area.code.clone()).collect()
    }

    /// True when `code` is a member.
    pub fn contains(&self, code: &OutputAreaCode) -> bool {
        self.areas.iter().any(|area| &area.code == code)
    }
}

/// Everything the presentation layer needs to show a postcode lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult {
    /// The postcode record that matched the input.
    pub matched_postcode: PostcodeRecord,
    /// The matched area and its touching neighbours.
    pub neighbourhood: Neighbourhood,
    /// One table per topic with at least one fact in the neighbourhood.
    pub tables: BTreeMap<CensusTopicCode, CensusTable>,
}
