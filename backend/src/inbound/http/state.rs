//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` and depend only on
//! driving ports, so they can be tested with mocks.

use std::sync::Arc;

use crate::domain::ports::PostcodeLookupQuery;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Postcode neighbourhood lookups.
    pub lookup: Arc<dyn PostcodeLookupQuery>,
}

impl HttpState {
    /// Bundle the lookup port.
    pub fn new(lookup: Arc<dyn PostcodeLookupQuery>) -> Self {
        Self { lookup }
    }
}
