//! `resource-api` — CDR energy data holder resource API entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (tracing, optional OTLP).
//! 3. Validate the ID Permanence secret and construct the codec.
//! 4. Seed the in-memory resource repository.
//! 5. Build the Axum router and start the HTTP server.
//!
//! The OAuth/OIDC authorisation server and TLS termination live upstream;
//! this process trusts the claim headers forwarded by that gateway.

mod auth;
mod config;
mod permanence;
mod repository;
mod server;
mod telemetry;

use anyhow::{Context, Result};
use tracing::info;

use config::Config;
use permanence::{IdPermanenceCodec, ServerSecret};
use repository::ResourceRepository;
use server::state::{AppState, PageLimits};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "resource-api starting"
    );

    // -----------------------------------------------------------------------
    // 3. ID Permanence codec — bad key material fails fast here, never
    //    per-request.
    // -----------------------------------------------------------------------
    let secret = ServerSecret::from_config(&cfg.id_permanence_secret)
        .context("ID_PERMANENCE_SECRET is not valid hex or base64 key material")?;
    let codec = IdPermanenceCodec::new(secret);

    // -----------------------------------------------------------------------
    // 4. Resource repository
    // -----------------------------------------------------------------------
    let repository = ResourceRepository::seeded();
    info!(customers = repository.customer_count(), "repository seeded");

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(
        codec,
        repository,
        cfg.base_uri.clone(),
        PageLimits {
            default_page_size: cfg.default_page_size,
            max_page_size: cfg.max_page_size,
        },
    );
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
