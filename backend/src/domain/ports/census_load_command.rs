//! Driving port for loading datasets into the spatial store.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{CensusTopicCode, Error};

/// Dataset written by one load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "topic")]
pub enum Dataset {
    /// Postcode directory records.
    Postcodes,
    /// Output area boundaries.
    OutputAreas,
    /// Facts for one census topic.
    CensusTopic(CensusTopicCode),
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postcodes => f.write_str("postcodes"),
            Self::OutputAreas => f.write_str("output areas"),
            Self::CensusTopic(topic) => write!(f, "census topic {topic}"),
        }
    }
}

/// Result of one load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadOutcome {
    /// Dataset that was written.
    pub dataset: Dataset,
    /// Number of records written.
    pub records: u64,
}

/// Driving port for the loader.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CensusLoadCommand: Send + Sync {
    /// Replace all postcode records with those decoded from `path`.
    async fn load_postcodes(&self, path: &Path) -> Result<LoadOutcome, Error>;

    /// Replace all output areas with those decoded from `path`.
    async fn load_output_areas(&self, path: &Path) -> Result<LoadOutcome, Error>;

    /// Append the facts for `topic` decoded from `path`.
    async fn load_census_topic(
        &self,
        topic: &CensusTopicCode,
        path: &Path,
    ) -> Result<LoadOutcome, Error>;
}
