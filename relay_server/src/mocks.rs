//! Stub collaborators for exercising the relay without the real provider or
//! a real store. Compiled for tests and behind the `mocks` feature.
use std::convert::Infallible;
use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use relay_common::deadline::INSERT_DEADLINE;
use relay_common::{FlatQuote, Hop, RelayError, Result};
use warp::Filter;

use crate::gateway::QuoteSource;
use crate::relay::{QuoteRelay, routes};
use crate::sink::QuoteSink;

/// Provider body for USD/BRL with the given bid.
pub fn sample_upstream_body(bid: &str) -> String {
    serde_json::json!({
        "USDBRL": {
            "code": "USD",
            "codein": "BRL",
            "name": "Dólar Americano/Real Brasileiro",
            "high": "5.4610",
            "low": "5.4102",
            "varBid": "-0.0121",
            "pctChange": "-0.22",
            "bid": bid,
            "ask": "5.4351",
            "timestamp": "1718920799",
            "create_date": "2024-06-20 18:59:59"
        }
    })
    .to_string()
}

/// The flattened form of [`sample_upstream_body`].
pub fn sample_quote(bid: &str) -> FlatQuote {
    FlatQuote {
        code: "USD".to_string(),
        codein: "BRL".to_string(),
        name: "Dólar Americano/Real Brasileiro".to_string(),
        high: "5.4610".to_string(),
        low: "5.4102".to_string(),
        var_bid: "-0.0121".to_string(),
        pct_change: "-0.22".to_string(),
        bid: bid.to_string(),
        ask: "5.4351".to_string(),
        timestamp: "1718920799".to_string(),
        create_date: "2024-06-20 18:59:59".to_string(),
    }
}

/// Serve `body` as JSON on every path after sleeping `delay`. Must be called
/// from within a tokio runtime.
pub fn spawn_upstream(body: String, delay: Duration) -> SocketAddr {
    let route = warp::any().and_then(move || {
        let body = body.clone();
        async move {
            tokio::time::sleep(delay).await;
            Ok::<_, Infallible>(warp::reply::with_header(body, "content-type", "application/json"))
        }
    });
    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

/// Serve the relay's routes on an ephemeral loopback port.
pub fn spawn_relay(relay: Arc<QuoteRelay>) -> SocketAddr {
    let (addr, server) = warp::serve(routes(relay)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

/// URL of a loopback port nothing listens on.
pub fn closed_port_url() -> String {
    let addr = TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .expect("bind loopback");
    format!("http://{addr}/")
}

/// Unique SQLite path under the system temp dir.
pub fn temp_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("relay-{}.db", uuid::Uuid::new_v4()))
}

/// Source that always returns the same quote.
pub struct StaticSource(pub FlatQuote);

#[async_trait]
impl QuoteSource for StaticSource {
    async fn fetch_quote(&self) -> Result<FlatQuote> {
        Ok(self.0.clone())
    }
}

/// Source whose provider is always unreachable.
pub struct FailingSource;

#[async_trait]
impl QuoteSource for FailingSource {
    async fn fetch_quote(&self) -> Result<FlatQuote> {
        Err(RelayError::transport("connection refused"))
    }
}

/// Sink that keeps every inserted quote in memory.
#[derive(Default)]
pub struct RecordingSink {
    rows: Mutex<Vec<FlatQuote>>,
}

impl RecordingSink {
    /// Quotes inserted so far, in order.
    pub fn rows(&self) -> Vec<FlatQuote> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl QuoteSink for RecordingSink {
    async fn insert(&self, quote: &FlatQuote) -> Result<()> {
        self.rows.lock().map_err(RelayError::storage)?.push(quote.clone());
        Ok(())
    }
}

/// Sink whose every insert fails, either on its deadline or otherwise.
pub struct FailingSink {
    timeout: bool,
}

impl FailingSink {
    /// Inserts fail with a storage timeout.
    pub fn timeout() -> Self {
        Self { timeout: true }
    }

    /// Inserts fail with a plain storage error.
    pub fn storage() -> Self {
        Self { timeout: false }
    }
}

#[async_trait]
impl QuoteSink for FailingSink {
    async fn ensure_schema(&self) -> Result<()> {
        Err(RelayError::storage("unable to open database file"))
    }

    async fn insert(&self, _quote: &FlatQuote) -> Result<()> {
        if self.timeout {
            Err(RelayError::Timeout { hop: Hop::Storage, budget: INSERT_DEADLINE })
        } else {
            Err(RelayError::storage("disk I/O error"))
        }
    }
}
