//! Load postcode, boundary and census files into the PostGIS store.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use census_lookup::domain::ports::{CensusLoadCommand, LoadOutcome};
use census_lookup::domain::{CensusLoadService, CensusTopicCode};
use census_lookup::outbound::persistence::{
    DbPool, DieselCensusLoadRepository, PoolConfig, run_migrations,
};
use census_lookup::outbound::source::FileCensusSource;
use clap::{Parser, Subcommand};
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt};

/// `load-census` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "load-census",
    about = "Load postcodes, output area boundaries and census topics into PostGIS",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url", global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    dataset: DatasetArgs,
}

#[derive(Debug, Clone, Subcommand)]
enum DatasetArgs {
    /// Replace all postcodes with an ONS postcode directory CSV.
    Postcodes {
        /// Path to the postcode CSV.
        #[arg(long = "file", value_name = "path")]
        file: PathBuf,
    },
    /// Replace all output areas with a GeoJSON FeatureCollection.
    OutputAreas {
        /// Path to the boundary GeoJSON.
        #[arg(long = "file", value_name = "path")]
        file: PathBuf,
    },
    /// Append one census topic's CSV.
    Census {
        /// Topic code such as `TS001`.
        #[arg(long = "topic", value_name = "code", value_parser = parse_topic)]
        topic: CensusTopicCode,
        /// Path to the topic CSV at output area level.
        #[arg(long = "file", value_name = "path")]
        file: PathBuf,
    },
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {error}");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url)?;

    run_migrations(&database_url)
        .await
        .map_err(|error| io::Error::other(format!("apply migrations: {error}")))?;
    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let command = CensusLoadService::new(
        Arc::new(FileCensusSource),
        Arc::new(DieselCensusLoadRepository::new(pool)),
    );
    let outcome = run(&command, args.dataset)
        .await
        .map_err(|error| io::Error::other(format!("load failed: {error}")))?;

    let rendered = serde_json::to_string(&outcome)
        .map_err(|error| io::Error::other(format!("render outcome: {error}")))?;
    println!("{rendered}");
    Ok(())
}

async fn run(
    command: &dyn CensusLoadCommand,
    dataset: DatasetArgs,
) -> Result<LoadOutcome, census_lookup::domain::Error> {
    match dataset {
        DatasetArgs::Postcodes { file } => command.load_postcodes(&file).await,
        DatasetArgs::OutputAreas { file } => command.load_output_areas(&file).await,
        DatasetArgs::Census { topic, file } => command.load_census_topic(&topic, &file).await,
    }
}

fn parse_topic(raw: &str) -> Result<CensusTopicCode, String> {
    CensusTopicCode::new(raw).map_err(|error| error.to_string())
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    let from_env = env::var("DATABASE_URL").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL missing: set --database-url or DATABASE_URL",
        )
    })?;
    if from_env.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "DATABASE_URL must not be empty",
        ));
    }
    Ok(from_env)
}
