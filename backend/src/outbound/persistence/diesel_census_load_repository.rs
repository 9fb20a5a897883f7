//! PostgreSQL-backed bulk writes for the loader.
//!
//! Each call runs in one transaction. Rows are sent in chunks, each chunk as
//! a single `UNNEST` insert with one array parameter per column. Repeated
//! postcodes or output area codes keep their last occurrence before
//! chunking, since one `ON CONFLICT DO UPDATE` statement cannot touch the
//! same row twice.

use std::collections::BTreeMap;

use async_trait::async_trait;
use diesel::sql_query;
use diesel::sql_types::{Array, Double, Jsonb, Text};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::ports::{CensusLoadRepository, CensusLoadRepositoryError};
use crate::domain::{CensusFact, OutputArea, PostcodeRecord};

use super::diesel_helpers::{map_diesel_error, map_pool_error_message};
use super::models::attributes_to_json;
use super::pool::DbPool;

const INSERT_CHUNK_SIZE: usize = 5_000;

const INSERT_POSTCODES_SQL: &str = r#"
INSERT INTO postcode_data (pcd, lat, long, oa21)
SELECT source.pcd, source.lat, source.long, source.oa21
FROM unnest($1::text[], $2::double precision[], $3::double precision[], $4::text[])
    AS source(pcd, lat, long, oa21)
ON CONFLICT (pcd) DO UPDATE SET
    lat = EXCLUDED.lat,
    long = EXCLUDED.long,
    oa21 = EXCLUDED.oa21
"#;

const INSERT_OUTPUT_AREAS_SQL: &str = r#"
INSERT INTO output_areas (oa21cd, lsoa21cd, lsoa21nm, geometry)
SELECT source.oa21cd, source.lsoa21cd, source.lsoa21nm, ST_GeomFromGeoJSON(source.geometry)
FROM unnest($1::text[], $2::text[], $3::text[], $4::text[])
    AS source(oa21cd, lsoa21cd, lsoa21nm, geometry)
ON CONFLICT (oa21cd) DO UPDATE SET
    lsoa21cd = EXCLUDED.lsoa21cd,
    lsoa21nm = EXCLUDED.lsoa21nm,
    geometry = EXCLUDED.geometry
"#;

const INSERT_CENSUS_FACTS_SQL: &str = r#"
INSERT INTO census_data (geography_code, census_code, data)
SELECT source.geography_code, source.census_code, source.data
FROM unnest($1::text[], $2::text[], $3::jsonb[]) WITH ORDINALITY
    AS source(geography_code, census_code, data, position)
ORDER BY source.position
"#;

/// Diesel-backed implementation of [`CensusLoadRepository`].
#[derive(Clone)]
pub struct DieselCensusLoadRepository {
    pool: DbPool,
}

impl DieselCensusLoadRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Keep the last item for each key, ordered by key.
fn last_wins<'a, T>(items: &'a [T], key: impl Fn(&T) -> &str) -> Vec<&'a T> {
    let mut latest: BTreeMap<&str, &'a T> = BTreeMap::new();
    for item in items {
        latest.insert(key(item), item);
    }
    latest.into_values().collect()
}

struct PostcodeBatch {
    codes: Vec<String>,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    output_areas: Vec<String>,
}

impl PostcodeBatch {
    fn from_records(records: &[&PostcodeRecord]) -> Self {
        Self {
            codes: records.iter().map(|r| r.code.as_str().to_owned()).collect(),
            latitudes: records.iter().map(|r| r.latitude).collect(),
            longitudes: records.iter().map(|r| r.longitude).collect(),
            output_areas: records
                .iter()
                .map(|r| r.output_area_code.as_str().to_owned())
                .collect(),
        }
    }
}

struct OutputAreaBatch {
    codes: Vec<String>,
    parent_codes: Vec<String>,
    parent_names: Vec<String>,
    geometries: Vec<String>,
}

impl OutputAreaBatch {
    fn from_areas(areas: &[&OutputArea]) -> Self {
        Self {
            codes: areas.iter().map(|a| a.code.as_str().to_owned()).collect(),
            parent_codes: areas.iter().map(|a| a.parent_area_code.clone()).collect(),
            parent_names: areas.iter().map(|a| a.parent_area_name.clone()).collect(),
            geometries: areas
                .iter()
                .map(|a| a.boundary.to_geojson().to_string())
                .collect(),
        }
    }
}

struct CensusFactBatch {
    geography_codes: Vec<String>,
    census_codes: Vec<String>,
    data: Vec<serde_json::Value>,
}

impl CensusFactBatch {
    fn from_facts(facts: &[CensusFact]) -> Self {
        Self {
            geography_codes: facts
                .iter()
                .map(|f| f.output_area_code.as_str().to_owned())
                .collect(),
            census_codes: facts.iter().map(|f| f.topic.as_str().to_owned()).collect(),
            data: facts
                .iter()
                .map(|f| attributes_to_json(&f.attributes))
                .collect(),
        }
    }
}

fn map_write_error(error: diesel::result::Error, operation: &str) -> CensusLoadRepositoryError {
    map_diesel_error(
        error,
        operation,
        CensusLoadRepositoryError::query,
        CensusLoadRepositoryError::connection,
    )
}

#[async_trait]
impl CensusLoadRepository for DieselCensusLoadRepository {
    async fn replace_postcodes(
        &self,
        records: &[PostcodeRecord],
    ) -> Result<(), CensusLoadRepositoryError> {
        let batches: Vec<PostcodeBatch> = last_wins(records, |r| r.code.as_str())
            .chunks(INSERT_CHUNK_SIZE)
            .map(PostcodeBatch::from_records)
            .collect();
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| CensusLoadRepositoryError::connection(map_pool_error_message(err)))?;

        conn.transaction(|conn| {
            async move {
                sql_query("DELETE FROM postcode_data").execute(conn).await?;
                for batch in &batches {
                    sql_query(INSERT_POSTCODES_SQL)
                        .bind::<Array<Text>, _>(&batch.codes)
                        .bind::<Array<Double>, _>(&batch.latitudes)
                        .bind::<Array<Double>, _>(&batch.longitudes)
                        .bind::<Array<Text>, _>(&batch.output_areas)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_write_error(err, "replace postcodes"))
    }

    async fn replace_output_areas(
        &self,
        areas: &[OutputArea],
    ) -> Result<(), CensusLoadRepositoryError> {
        let batches: Vec<OutputAreaBatch> = last_wins(areas, |a| a.code.as_str())
            .chunks(INSERT_CHUNK_SIZE)
            .map(OutputAreaBatch::from_areas)
            .collect();
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| CensusLoadRepositoryError::connection(map_pool_error_message(err)))?;

        conn.transaction(|conn| {
            async move {
                sql_query("DELETE FROM output_areas").execute(conn).await?;
                for batch in &batches {
                    sql_query(INSERT_OUTPUT_AREAS_SQL)
                        .bind::<Array<Text>, _>(&batch.codes)
                        .bind::<Array<Text>, _>(&batch.parent_codes)
                        .bind::<Array<Text>, _>(&batch.parent_names)
                        .bind::<Array<Text>, _>(&batch.geometries)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_write_error(err, "replace output areas"))
    }

    async fn append_census_facts(
        &self,
        facts: &[CensusFact],
    ) -> Result<(), CensusLoadRepositoryError> {
        let batches: Vec<CensusFactBatch> = facts
            .chunks(INSERT_CHUNK_SIZE)
            .map(CensusFactBatch::from_facts)
            .collect();
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| CensusLoadRepositoryError::connection(map_pool_error_message(err)))?;

        conn.transaction(|conn| {
            async move {
                for batch in &batches {
                    sql_query(INSERT_CENSUS_FACTS_SQL)
                        .bind::<Array<Text>, _>(&batch.geography_codes)
                        .bind::<Array<Text>, _>(&batch.census_codes)
                        .bind::<Array<Jsonb>, _>(&batch.data)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_write_error(err, "append census facts"))
    }
}
