//! PostgreSQL/PostGIS adapters for the census store.
//!
//! Repositories translate between Diesel rows and domain types and hold no
//! lookup logic. Row structs (`models.rs`) and table definitions
//! (`schema.rs`) stay private to this module.
//!
//! # Example
//!
//! ```ignore
//! use census_lookup::outbound::persistence::{DbPool, DieselPostcodeRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/census")).await?;
//! let postcodes = DieselPostcodeRepository::new(pool);
//! ```

mod diesel_census_fact_repository;
mod diesel_census_load_repository;
pub(crate) mod diesel_helpers;
mod diesel_output_area_repository;
mod diesel_postcode_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_census_fact_repository::DieselCensusFactRepository;
pub use diesel_census_load_repository::DieselCensusLoadRepository;
pub use diesel_output_area_repository::DieselOutputAreaRepository;
pub use diesel_postcode_repository::DieselPostcodeRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
