//! PostGIS-backed adjacency queries over output area boundaries.

use async_trait::async_trait;
use diesel::sql_query;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{OutputAreaRepository, OutputAreaRepositoryError};
use crate::domain::{OutputArea, OutputAreaCode};

use super::diesel_helpers::{map_diesel_error, map_pool_error_message};
use super::models::OutputAreaRow;
use super::pool::DbPool;

/// Origin plus every area whose boundary touches it, ordered by code.
const TOUCHING_AREAS_SQL: &str = r#"
SELECT
    area.oa21cd,
    area.lsoa21cd,
    area.lsoa21nm,
    ST_AsGeoJSON(area.geometry) AS geometry
FROM output_areas AS origin
JOIN output_areas AS area
    ON area.oa21cd = origin.oa21cd
    OR ST_Touches(origin.geometry, area.geometry)
WHERE origin.oa21cd = $1
ORDER BY area.oa21cd
"#;

/// Diesel-backed implementation of [`OutputAreaRepository`].
#[derive(Clone)]
pub struct DieselOutputAreaRepository {
    pool: DbPool,
}

impl DieselOutputAreaRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutputAreaRepository for DieselOutputAreaRepository {
    async fn find_with_touching(
        &self,
        code: &OutputAreaCode,
    ) -> Result<Vec<OutputArea>, OutputAreaRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| OutputAreaRepositoryError::connection(map_pool_error_message(err)))?;

        let rows: Vec<OutputAreaRow> = sql_query(TOUCHING_AREAS_SQL)
            .bind::<Text, _>(code.as_str())
            .load(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(
                    err,
                    "touching output areas",
                    OutputAreaRepositoryError::query,
                    OutputAreaRepositoryError::connection,
                )
            })?;

        rows.into_iter()
            .map(OutputAreaRow::into_output_area)
            .collect::<Result<Vec<_>, _>>()
            .map_err(OutputAreaRepositoryError::query)
    }
}
