//! Driven port for census facts keyed by output area.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{CensusFact, OutputAreaCode};

define_port_error! {
    /// Errors raised while reading census facts.
    pub enum CensusFactRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "census fact repository connection failed: {message}",
        /// Query failed or returned undecodable rows.
        Query { message: String } =>
            "census fact repository query failed: {message}",
    }
}

/// Port for batch census fact retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CensusFactRepository: Send + Sync {
    /// Return every fact recorded for any of `codes`, ordered by area code
    /// and then by load order.
    async fn find_by_output_areas(
        &self,
        codes: &[OutputAreaCode],
    ) -> Result<Vec<CensusFact>, CensusFactRepositoryError>;
}
