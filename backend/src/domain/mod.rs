//! Domain primitives, services and ports.
//!
//! Purpose: model postcodes, output areas and census facts, and resolve a
//! postcode to the census tables of its neighbourhood. Types are immutable
//! once constructed and validate their invariants at the boundary.
//!
//! Public surface:
//! - Error (alias to `error::Error`): error payload shared by all adapters.
//! - Postcode / PostcodeRecord: canonical postcode and its stored record.
//! - OutputArea / Boundary: census geography with its polygon boundary.
//! - CensusFact / CensusTable: schema-free facts and per-topic tables.
//! - LookupResult: output of [`PostcodeLookupService`].

pub mod census;
pub mod census_load_service;
pub mod error;
pub mod neighbourhood;
pub mod output_area;
pub mod ports;
pub mod postcode;
pub mod postcode_lookup_service;
pub mod topics;
pub mod trace_id;

pub use self::census::{
    AttributeValue, Attributes, CensusFact, CensusRow, CensusTable, CensusTopicCode,
    InvalidCensusTopicCode, tabulate,
};
pub use self::census_load_service::CensusLoadService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::neighbourhood::{LookupResult, Neighbourhood};
pub use self::output_area::{Boundary, BoundaryError, EmptyOutputAreaCode, OutputArea, OutputAreaCode};
pub use self::postcode::{Postcode, PostcodeRecord, PostcodeValidationError};
pub use self::postcode_lookup_service::PostcodeLookupService;
pub use self::topics::{UNKNOWN_TOPIC_TITLE, topic_title};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use census_lookup::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("postcode not found"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
