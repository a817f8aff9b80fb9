//! Quote relay HTTP server.
//!
//! Serves `GET /cotacao` on `0.0.0.0:8080` (see `RELAY_PORT`). Each request
//! fetches the USD/BRL quote from the provider, stores it in `cotacoes.db` and
//! answers with the bid as a JSON string.
//!
//! Startup is permissive: if the quote table cannot be created the failure is
//! logged and the server still starts; subsequent inserts then fail and are
//! logged per request.
#![warn(missing_docs)]
use std::net::SocketAddr;
use std::sync::Arc;

use log::info;
use relay_common::{RelayError, Result};
use relay_common::net::{DATABASE_PATH, RELAY_PORT};
use relay_server::{QuoteRelay, SqliteSink, UpstreamGateway, prepare_store, routes};

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let sink = Arc::new(SqliteSink::new(DATABASE_PATH));
    prepare_store(sink.as_ref()).await;

    let gateway = Arc::new(UpstreamGateway::new()?);
    let relay = Arc::new(QuoteRelay::new(gateway, sink));

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], RELAY_PORT));
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received. Shutting down relay...");
        }
    };
    let (addr, server) = warp::serve(routes(relay))
        .try_bind_with_graceful_shutdown(bind_addr, shutdown)
        .map_err(|e| RelayError::transport(format!("Failed to bind {bind_addr}: {e}")))?;

    info!("Quote relay listening on {}", addr);
    server.await;
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
