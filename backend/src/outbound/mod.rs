//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL/PostGIS repositories using Diesel
//! - **memory**: process-local store for database-less runs and tests
//! - **source**: loader inputs read from the filesystem
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no lookup logic.

pub mod memory;
pub mod persistence;
pub mod source;
