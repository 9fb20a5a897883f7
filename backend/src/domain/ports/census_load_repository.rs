//! Driven port for bulk-loading the spatial store.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{CensusFact, OutputArea, PostcodeRecord};

define_port_error! {
    /// Errors raised while writing loaded datasets.
    pub enum CensusLoadRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "census load connection failed: {message}",
        /// Write failed during execution.
        Query { message: String } =>
            "census load write failed: {message}",
    }
}

/// Port for transactional dataset writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CensusLoadRepository: Send + Sync {
    /// Replace every stored postcode with `records`.
    async fn replace_postcodes(
        &self,
        records: &[PostcodeRecord],
    ) -> Result<(), CensusLoadRepositoryError>;

    /// Replace every stored output area with `areas`.
    async fn replace_output_areas(
        &self,
        areas: &[OutputArea],
    ) -> Result<(), CensusLoadRepositoryError>;

    /// Append `facts` without deduplicating against stored rows.
    async fn append_census_facts(
        &self,
        facts: &[CensusFact],
    ) -> Result<(), CensusLoadRepositoryError>;
}
