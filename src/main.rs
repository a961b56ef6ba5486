//! Liquidation sentinel for the lending protocol.
//!
//! Polls the ledger for undercollateralized positions and liquidates them,
//! mirroring the protocol's fixed-point accounting exactly.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sentinel_core::{Engine, EngineConfig};
use sentinel_ledger::{HttpTransport, LedgerClient};

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sentinel_core=debug,sentinel_ledger=debug")),
        )
        .init();

    let config_path =
        std::env::var("SENTINEL_CONFIG").unwrap_or_else(|_| "sentinel.toml".to_string());
    let mut raw = EngineConfig::from_file(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;
    raw.apply_env();
    let config = Arc::new(raw.resolve()?);
    config.log_summary();

    let transport = Arc::new(HttpTransport::new(
        &config.endpoint,
        config.chain_id,
        config.request_timeout,
    )?);
    let ledger = Arc::new(LedgerClient::new(transport));

    let engine = Engine::new(ledger, config);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, finishing the current operation before stopping");
            let _ = shutdown_tx.send(true);
        }
    });

    engine.run(shutdown_rx).await
}

/// Print startup banner.
fn print_banner() {
    println!(
        r#"
    ╔═╗┌─┐┌┐┌┌┬┐┬┌┐┌┌─┐┬
    ╚═╗├┤ │││ │ ││││├┤ │
    ╚═╝└─┘┘└┘ ┴ ┴┘└┘└─┘┴─┘
    Liquidation Sentinel v0.1.0
    "#
    );
}
