//! Builders for the HTTP state from the configured store.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use census_lookup::domain::PostcodeLookupService;
use census_lookup::domain::ports::PostcodeLookupQuery;
use census_lookup::inbound::http::state::HttpState;
use census_lookup::outbound::memory::InMemoryCensusStore;
use census_lookup::outbound::persistence::{
    DbPool, DieselCensusFactRepository, DieselOutputAreaRepository, DieselPostcodeRepository,
};

use super::ServerConfig;

fn diesel_lookup(pool: &DbPool) -> Arc<dyn PostcodeLookupQuery> {
    Arc::new(PostcodeLookupService::new(
        Arc::new(DieselPostcodeRepository::new(pool.clone())),
        Arc::new(DieselOutputAreaRepository::new(pool.clone())),
        Arc::new(DieselCensusFactRepository::new(pool.clone())),
    ))
}

fn memory_lookup() -> Arc<dyn PostcodeLookupQuery> {
    let store = Arc::new(InMemoryCensusStore::new());
    Arc::new(PostcodeLookupService::new(
        store.clone(),
        store.clone(),
        store,
    ))
}

/// Build the HTTP state, using PostGIS when a pool is configured and an
/// empty in-memory store otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let lookup = match &config.db_pool {
        Some(pool) => diesel_lookup(pool),
        None => {
            warn!("no database configured; serving lookups from an empty in-memory store");
            memory_lookup()
        }
    };
    web::Data::new(HttpState::new(lookup))
}
