//! Mangrove membership server.
//!
//! Loads the mangrove polygon dataset once at startup and answers
//! `GET /check?lat=..&lon=..&buffer_km=..` with `0` or `1`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mangrove::dataset::load_or_empty;
use mangrove::http::{router, AppState};
use mangrove::pip::MembershipChecker;
use mangrove::projection::WebMercator;

#[derive(Parser, Debug)]
#[command(name = "mangrove-server")]
#[command(about = "Mangrove point-in-polygon server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8000")]
    listen: String,

    /// GeoJSON file with mangrove polygons (EPSG:4326)
    #[arg(short, long, default_value = "clipped_gmw.json")]
    dataset: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: Level,
}

/// RUST_LOG directives if present and parseable, else `fallback`.
fn log_filter(rust_log: Option<&str>, fallback: Level) -> EnvFilter {
    rust_log
        .and_then(|dirs| EnvFilter::try_new(dirs).ok())
        .unwrap_or_else(|| {
            EnvFilter::default().add_directive(LevelFilter::from_level(fallback).into())
        })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(rust_log.as_deref(), args.log_level))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Mangrove Server");

    let checker = match WebMercator::new() {
        Ok(projection) => {
            let polygons = load_or_empty(&args.dataset, &projection);
            if polygons.is_empty() {
                warn!("No mangrove polygons loaded; every check will return 0");
            }
            MembershipChecker::new(polygons, projection)
        }
        Err(e) => {
            error!("Error creating EPSG:4326 -> EPSG:3857 projection: {}", e);
            warn!("Dataset not loaded; every check will return 0");
            MembershipChecker::unavailable()
        }
    };

    let state = Arc::new(AppState::new(checker));
    let app = router(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
