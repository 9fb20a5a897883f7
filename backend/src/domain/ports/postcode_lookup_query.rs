//! Driving port for postcode neighbourhood lookups.

use async_trait::async_trait;

use crate::domain::{Error, LookupResult};

/// Driving port resolving a raw postcode to its neighbourhood census data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostcodeLookupQuery: Send + Sync {
    /// Normalise `postcode` and resolve it.
    ///
    /// Unknown or implausible postcodes and postcodes whose output area is
    /// missing yield [`crate::domain::ErrorCode::NotFound`]; blank input yields
    /// [`crate::domain::ErrorCode::InvalidRequest`].
    async fn resolve(&self, postcode: &str) -> Result<LookupResult, Error>;
}
