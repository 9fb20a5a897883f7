//! PostgreSQL-backed census fact retrieval.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CensusFactRepository, CensusFactRepositoryError};
use crate::domain::{CensusFact, OutputAreaCode};

use super::diesel_helpers::{map_diesel_error, map_pool_error_message};
use super::models::CensusFactRow;
use super::pool::DbPool;
use super::schema::census_data;

/// Diesel-backed implementation of [`CensusFactRepository`].
#[derive(Clone)]
pub struct DieselCensusFactRepository {
    pool: DbPool,
}

impl DieselCensusFactRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CensusFactRepository for DieselCensusFactRepository {
    async fn find_by_output_areas(
        &self,
        codes: &[OutputAreaCode],
    ) -> Result<Vec<CensusFact>, CensusFactRepositoryError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| CensusFactRepositoryError::connection(map_pool_error_message(err)))?;

        // Bound as a single TEXT[] parameter (`= ANY($1)`).
        let keys: Vec<&str> = codes.iter().map(OutputAreaCode::as_str).collect();
        let rows = census_data::table
            .filter(census_data::geography_code.eq_any(keys))
            .order((census_data::geography_code.asc(), census_data::id.asc()))
            .select(CensusFactRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(
                    err,
                    "census facts by output area",
                    CensusFactRepositoryError::query,
                    CensusFactRepositoryError::connection,
                )
            })?;

        rows.into_iter()
            .map(CensusFactRow::into_fact)
            .collect::<Result<Vec<_>, _>>()
            .map_err(CensusFactRepositoryError::query)
    }
}
