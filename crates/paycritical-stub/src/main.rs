// SPDX-License-Identifier: BUSL-1.1
//! Paycritical gateway simulator -- standalone development server.
//!
//! Storage is in-memory (DashMap) with no persistence; data is lost on
//! restart.
//!
//! `PAYCRITICAL_STUB_PORT` selects the port (default 59605). When
//! `PAYCRITICAL_STUB_API_KEY` is set, only that exact `Authorization` value
//! is accepted; otherwise any `Basic` credential passes.

use std::net::SocketAddr;

use paycritical_stub::AppState;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 59605;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("PAYCRITICAL_STUB_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let api_key = std::env::var("PAYCRITICAL_STUB_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());

    if api_key.is_some() {
        tracing::info!("credential check enabled");
    }
    let state = AppState::new(api_key);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("paycritical-stub listening on {addr}");

    paycritical_stub::serve(listener, state).await
}
