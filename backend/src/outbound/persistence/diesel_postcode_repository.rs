//! PostgreSQL-backed postcode lookups.

use async_trait::async_trait;
use diesel::OptionalExtension;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PostcodeRepository, PostcodeRepositoryError};
use crate::domain::{Postcode, PostcodeRecord};

use super::diesel_helpers::{map_diesel_error, map_pool_error_message};
use super::models::PostcodeRow;
use super::pool::DbPool;
use super::schema::postcode_data;

/// Diesel-backed implementation of [`PostcodeRepository`].
#[derive(Clone)]
pub struct DieselPostcodeRepository {
    pool: DbPool,
}

impl DieselPostcodeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostcodeRepository for DieselPostcodeRepository {
    async fn find_by_postcode(
        &self,
        postcode: &Postcode,
    ) -> Result<Option<PostcodeRecord>, PostcodeRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| PostcodeRepositoryError::connection(map_pool_error_message(err)))?;

        let row = postcode_data::table
            .filter(postcode_data::pcd.eq(postcode.as_str()))
            .select(PostcodeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| {
                map_diesel_error(
                    err,
                    "postcode lookup",
                    PostcodeRepositoryError::query,
                    PostcodeRepositoryError::connection,
                )
            })?;

        row.map(PostcodeRow::into_record)
            .transpose()
            .map_err(PostcodeRepositoryError::query)
    }
}
