//! Driven port for reading loader input files.
//!
//! Adapters decode published ONS files into domain records so the load
//! service stays independent of file formats.

use std::path::Path;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{CensusFact, CensusTopicCode, OutputArea, PostcodeRecord};

define_port_error! {
    /// Errors raised while reading or decoding loader inputs.
    pub enum CensusSourceError {
        /// The file could not be opened or read.
        Read { message: String } =>
            "census source read failed: {message}",
        /// The file contents could not be decoded.
        Decode { message: String } =>
            "census source decode failed: {message}",
    }
}

/// Port for decoding postcode, boundary and topic files.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CensusSource: Send + Sync {
    /// Decode an ONS postcode directory CSV. Rows lacking an output area or
    /// coordinates are skipped.
    async fn read_postcodes(&self, path: &Path) -> Result<Vec<PostcodeRecord>, CensusSourceError>;

    /// Decode an output area boundary FeatureCollection.
    async fn read_output_areas(&self, path: &Path) -> Result<Vec<OutputArea>, CensusSourceError>;

    /// Decode one topic's census CSV.
    async fn read_census_facts(
        &self,
        topic: &CensusTopicCode,
        path: &Path,
    ) -> Result<Vec<CensusFact>, CensusSourceError>;
}
