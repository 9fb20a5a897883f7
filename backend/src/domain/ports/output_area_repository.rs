//! Driven port for output areas and their spatial neighbours.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{OutputArea, OutputAreaCode};

define_port_error! {
    /// Errors raised while reading output areas.
    pub enum OutputAreaRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "output area repository connection failed: {message}",
        /// Query failed or returned undecodable rows.
        Query { message: String } =>
            "output area repository query failed: {message}",
    }
}

/// Port for adjacency queries over output area boundaries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutputAreaRepository: Send + Sync {
    /// Return the area `code` together with every area whose boundary touches
    /// it. An empty result means the area is not stored.
    async fn find_with_touching(
        &self,
        code: &OutputAreaCode,
    ) -> Result<Vec<OutputArea>, OutputAreaRepositoryError>;
}
