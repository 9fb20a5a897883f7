//! Loader orchestration: decode a source file, then write it to the store.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    CensusLoadCommand, CensusLoadRepository, CensusLoadRepositoryError, CensusSource,
    CensusSourceError, Dataset, LoadOutcome,
};
use crate::domain::{CensusTopicCode, Error};

/// Domain service implementing [`CensusLoadCommand`].
#[derive(Clone)]
pub struct CensusLoadService<S, R> {
    source: Arc<S>,
    load_repo: Arc<R>,
}

impl<S, R> CensusLoadService<S, R> {
    /// Create a load service reading from `source` and writing to `load_repo`.
    pub fn new(source: Arc<S>, load_repo: Arc<R>) -> Self {
        Self { source, load_repo }
    }
}

#[async_trait]
impl<S, R> CensusLoadCommand for CensusLoadService<S, R>
where
    S: CensusSource,
    R: CensusLoadRepository,
{
    async fn load_postcodes(&self, path: &Path) -> Result<LoadOutcome, Error> {
        let records = self
            .source
            .read_postcodes(path)
            .await
            .map_err(|err| map_source_error(path, err))?;
        self.load_repo
            .replace_postcodes(&records)
            .await
            .map_err(map_load_error)?;
        outcome(Dataset::Postcodes, records.len())
    }

    async fn load_output_areas(&self, path: &Path) -> Result<LoadOutcome, Error> {
        let areas = self
            .source
            .read_output_areas(path)
            .await
            .map_err(|err| map_source_error(path, err))?;
        self.load_repo
            .replace_output_areas(&areas)
            .await
            .map_err(map_load_error)?;
        outcome(Dataset::OutputAreas, areas.len())
    }

    async fn load_census_topic(
        &self,
        topic: &CensusTopicCode,
        path: &Path,
    ) -> Result<LoadOutcome, Error> {
        let facts = self
            .source
            .read_census_facts(topic, path)
            .await
            .map_err(|err| map_source_error(path, err))?;
        self.load_repo
            .append_census_facts(&facts)
            .await
            .map_err(map_load_error)?;
        outcome(Dataset::CensusTopic(topic.clone()), facts.len())
    }
}

fn outcome(dataset: Dataset, count: usize) -> Result<LoadOutcome, Error> {
    let records = u64::try_from(count)
        .map_err(|_| Error::internal("loaded record count exceeds supported range"))?;
    info!(%dataset, records, "dataset loaded");
    Ok(LoadOutcome { dataset, records })
}

fn map_source_error(path: &Path, error: CensusSourceError) -> Error {
    match error {
        CensusSourceError::Read { message } | CensusSourceError::Decode { message } => {
            Error::invalid_request(format!("failed to load {}: {message}", path.display()))
        }
    }
}

fn map_load_error(error: CensusLoadRepositoryError) -> Error {
    match error {
        CensusLoadRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("census store unavailable: {message}"))
        }
        CensusLoadRepositoryError::Query { message } => {
            Error::internal(format!("census store write failed: {message}"))
        }
    }
}
