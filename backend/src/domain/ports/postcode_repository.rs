//! Driven port for resolving postcodes to their records.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Postcode, PostcodeRecord};

define_port_error! {
    /// Errors raised while reading postcode records.
    pub enum PostcodeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "postcode repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "postcode repository query failed: {message}",
    }
}

/// Port for exact-match postcode lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostcodeRepository: Send + Sync {
    /// Fetch the record stored under the canonical `postcode`, if any.
    async fn find_by_postcode(
        &self,
        postcode: &Postcode,
    ) -> Result<Option<PostcodeRecord>, PostcodeRepositoryError>;
}
