//! Persistence sink: best-effort storage of every fetched quote in SQLite.
//!
//! The connection is reopened for each insert and no lock is taken here; the
//! engine serializes concurrent writers itself. An insert gets its own budget
//! (10 ms by default), enforced twice: the caller stops waiting once it elapses
//! and SQLite itself is told to give up through a busy timeout and a progress
//! handler bound to the same instant.
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, error, info};
use relay_common::deadline::{INSERT_DEADLINE, with_deadline};
use relay_common::{FlatQuote, Hop, RelayError, Result};
use rusqlite::{Connection, ErrorCode, params};

/// Table holding one row per successful fetch.
const TABLE: &str = "quotes";

/// Quote columns in insert order; all stored as text.
const QUOTE_COLUMNS: [&str; 11] = [
    "code",
    "codein",
    "name",
    "high",
    "low",
    "var_bid",
    "pct_change",
    "bid",
    "ask",
    "timestamp",
    "create_date",
];

/// VM instructions between deadline checks inside SQLite.
const PROGRESS_CHECK_OPS: i32 = 8;

/// Destination for fetched quotes.
#[async_trait]
pub trait QuoteSink: Send + Sync {
    /// Create or migrate whatever the sink needs. Run once at startup.
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    /// Persist one quote.
    async fn insert(&self, quote: &FlatQuote) -> Result<()>;
}

/// Startup step: prepare the sink's schema without ever failing startup.
///
/// Returns whether the schema is ready. On failure the error is logged and the
/// relay is expected to keep serving; later inserts fail and are logged per
/// request.
pub async fn prepare_store(sink: &dyn QuoteSink) -> bool {
    match sink.ensure_schema().await {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to prepare quote table, continuing without it: {}", e);
            false
        }
    }
}

/// SQLite-backed quote sink.
#[derive(Debug, Clone)]
pub struct SqliteSink {
    path: PathBuf,
    deadline: Duration,
}

impl SqliteSink {
    /// Sink writing to `path` under the default insert deadline.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_deadline(path, INSERT_DEADLINE)
    }

    /// Sink writing to `path` under a custom insert deadline.
    pub fn with_deadline(path: impl Into<PathBuf>, deadline: Duration) -> Self {
        Self { path: path.into(), deadline }
    }
}

#[async_trait]
impl QuoteSink for SqliteSink {
    async fn ensure_schema(&self) -> Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || migrate(&path))
            .await
            .map_err(RelayError::storage)??;
        info!("Quote table ready in {}", self.path.display());
        Ok(())
    }

    async fn insert(&self, quote: &FlatQuote) -> Result<()> {
        let expires_at = Instant::now() + self.deadline;
        let path = self.path.clone();
        let row = quote.clone();
        let write = async move {
            tokio::task::spawn_blocking(move || insert_row(&path, &row, expires_at))
                .await
                .map_err(RelayError::storage)?
        };

        with_deadline(Hop::Storage, self.deadline, write).await?;
        debug!("Persisted quote {} {}/{} bid={}", quote.create_date, quote.code, quote.codein, quote.bid);
        Ok(())
    }
}

/// Create the quote table and add any quote column an older table lacks.
fn migrate(path: &Path) -> Result<()> {
    let conn = Connection::open(path).map_err(RelayError::storage)?;
    let columns = QUOTE_COLUMNS.map(|c| format!("{c} TEXT")).join(", ");
    conn.execute(
        &format!("CREATE TABLE IF NOT EXISTS {TABLE} (id INTEGER PRIMARY KEY AUTOINCREMENT, {columns})"),
        [],
    )
    .map_err(RelayError::storage)?;

    let existing = existing_columns(&conn)?;
    for column in QUOTE_COLUMNS.iter().filter(|c| !existing.iter().any(|e| e == *c)) {
        info!("Adding missing column {column} to {TABLE}");
        conn.execute(&format!("ALTER TABLE {TABLE} ADD COLUMN {column} TEXT"), [])
            .map_err(RelayError::storage)?;
    }
    Ok(())
}

fn existing_columns(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({TABLE})"))
        .map_err(RelayError::storage)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(RelayError::storage)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(RelayError::storage)?;
    Ok(names)
}

/// Blocking insert that SQLite abandons once `expires_at` passes.
fn insert_row(path: &Path, quote: &FlatQuote, expires_at: Instant) -> Result<()> {
    let conn = Connection::open(path).map_err(RelayError::storage)?;
    let budget = expires_at.saturating_duration_since(Instant::now());
    conn.busy_timeout(budget).map_err(RelayError::storage)?;
    conn.progress_handler(PROGRESS_CHECK_OPS, Some(move || Instant::now() >= expires_at));

    let placeholders = vec!["?"; QUOTE_COLUMNS.len()].join(", ");
    conn.execute(
        &format!("INSERT INTO {TABLE} ({}) VALUES ({placeholders})", QUOTE_COLUMNS.join(", ")),
        params![
            quote.code,
            quote.codein,
            quote.name,
            quote.high,
            quote.low,
            quote.var_bid,
            quote.pct_change,
            quote.bid,
            quote.ask,
            quote.timestamp,
            quote.create_date,
        ],
    )
    .map_err(|e| classify(e, budget))?;
    Ok(())
}

/// Busy and interrupted results mean the deadline ran out inside SQLite.
fn classify(err: rusqlite::Error, budget: Duration) -> RelayError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::OperationInterrupted) => {
            RelayError::Timeout { hop: Hop::Storage, budget }
        }
        _ => RelayError::storage(err),
    }
}
