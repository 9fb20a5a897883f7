//! Backend entry-point: loads settings, prepares the census store and serves
//! the lookup API.

mod server;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use census_lookup::inbound::http::health::HealthState;
use census_lookup::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use ortho_config::OrthoConfig;

use server::{CensusSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = CensusSettings::load_from_iter(std::env::args_os())
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;
    let mut config = ServerConfig::new(settings.bind_addr()?);

    if let Some(database_url) = settings.database_url() {
        run_migrations(database_url)
            .await
            .map_err(|err| std::io::Error::other(format!("migration failed: {err}")))?;
        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(settings.pool_max_size()),
        )
        .await
        .map_err(|err| std::io::Error::other(format!("database pool failed: {err}")))?;
        config = config.with_db_pool(pool);
    }

    info!(bind_addr = %config.bind_addr, "starting census lookup server");
    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}
