//! Postcode neighbourhood lookup service.
//!
//! Resolution runs as one sequential pipeline:
//! - normalise the postcode;
//! - find its output area;
//! - expand to the areas touching it;
//! - tabulate the census facts recorded across that neighbourhood.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{
    CensusFactRepository, CensusFactRepositoryError, OutputAreaRepository,
    OutputAreaRepositoryError, PostcodeLookupQuery, PostcodeRepository, PostcodeRepositoryError,
};
use crate::domain::{
    Error, LookupResult, Neighbourhood, Postcode, PostcodeValidationError, tabulate,
};

/// Domain service implementing [`PostcodeLookupQuery`].
#[derive(Clone)]
pub struct PostcodeLookupService<P, A, C> {
    postcode_repo: Arc<P>,
    output_area_repo: Arc<A>,
    census_fact_repo: Arc<C>,
}

impl<P, A, C> PostcodeLookupService<P, A, C> {
    /// Create a lookup service over the three read repositories.
    pub fn new(postcode_repo: Arc<P>, output_area_repo: Arc<A>, census_fact_repo: Arc<C>) -> Self {
        Self {
            postcode_repo,
            output_area_repo,
            census_fact_repo,
        }
    }
}

#[async_trait]
impl<P, A, C> PostcodeLookupQuery for PostcodeLookupService<P, A, C>
where
    P: PostcodeRepository,
    A: OutputAreaRepository,
    C: CensusFactRepository,
{
    async fn resolve(&self, postcode: &str) -> Result<LookupResult, Error> {
        let postcode = normalise(postcode)?;

        let matched_postcode = self
            .postcode_repo
            .find_by_postcode(&postcode)
            .await
            .map_err(map_postcode_error)?
            .ok_or_else(|| Error::not_found("postcode not found"))?;

        let origin = matched_postcode.output_area_code.clone();
        let areas = self
            .output_area_repo
            .find_with_touching(&origin)
            .await
            .map_err(map_output_area_error)?;
        let neighbourhood = Neighbourhood::new(origin, areas).ok_or_else(|| {
            Error::not_found(format!(
                "output area {} for postcode {postcode} not found",
                matched_postcode.output_area_code
            ))
        })?;

        let facts = self
            .census_fact_repo
            .find_by_output_areas(&neighbourhood.codes())
            .await
            .map_err(map_census_fact_error)?;
        let tables = tabulate(facts);

        debug!(
            %postcode,
            areas = neighbourhood.areas().len(),
            tables = tables.len(),
            "resolved postcode neighbourhood"
        );

        Ok(LookupResult {
            matched_postcode,
            neighbourhood,
            tables,
        })
    }
}

fn normalise(raw: &str) -> Result<Postcode, Error> {
    Postcode::parse(raw).map_err(|err| match err {
        PostcodeValidationError::Empty => Error::invalid_request(err.to_string()),
        PostcodeValidationError::Malformed { .. } => Error::not_found("postcode not found"),
    })
}

fn store_unavailable(store: &str, message: String) -> Error {
    warn!(store, %message, "census store unavailable");
    Error::service_unavailable(format!("{store} store unavailable: {message}"))
}

fn store_failed(store: &str, message: String) -> Error {
    warn!(store, %message, "census store query failed");
    Error::internal(format!("{store} store error: {message}"))
}

fn map_postcode_error(error: PostcodeRepositoryError) -> Error {
    match error {
        PostcodeRepositoryError::Connection { message } => store_unavailable("postcode", message),
        PostcodeRepositoryError::Query { message } => store_failed("postcode", message),
    }
}

fn map_output_area_error(error: OutputAreaRepositoryError) -> Error {
    match error {
        OutputAreaRepositoryError::Connection { message } => {
            store_unavailable("output area", message)
        }
        OutputAreaRepositoryError::Query { message } => store_failed("output area", message),
    }
}

fn map_census_fact_error(error: CensusFactRepositoryError) -> Error {
    match error {
        CensusFactRepositoryError::Connection { message } => {
            store_unavailable("census fact", message)
        }
        CensusFactRepositoryError::Query { message } => store_failed("census fact", message),
    }
}

#[cfg(test)]
#[path = "postcode_lookup_service_tests.rs"]
mod tests;
