//! Reach token gateway — entry point.
//!
//! Hosts one pricing and governance engine behind an Axum REST API. A
//! background recorder task persists every event the engine emits to SQLite.

mod api;
mod config;
mod db;
mod errors;
mod events;
mod oracle;
mod recorder;

use std::sync::Arc;

use reach_token::{MemoryHost, ReachToken};
use reqwest::Client;
use tokio::sync::{mpsc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use oracle::OracleSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    let pool = db::init_pool(&config.database_url).await?;

    let oracle = match &config.oracle_url {
        Some(url) => {
            let client = Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?;
            info!("Using price feed at {url}");
            OracleSource::Http {
                client,
                url: url.clone(),
                max_retries: config.oracle_max_retries,
            }
        }
        None => {
            info!("No ORACLE_URL set; serving static price {}", config.oracle_static_price);
            OracleSource::Static(config.oracle_static_price)
        }
    };

    // ─── Background recorder ──────────────────────────────
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    tokio::spawn(recorder::run(pool.clone(), events_rx));

    // ─── REST API ─────────────────────────────────────────
    let engine = ReachToken::new(MemoryHost::new(config.owner.clone()), config.curve);
    info!(owner = %config.owner, "Engine initialised");

    let api_state = Arc::new(api::ApiState {
        pool,
        engine: Mutex::new(engine),
        oracle,
        events_tx,
    });

    let app = api::router(api_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
