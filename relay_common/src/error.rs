//! Error types shared between the relay server and the consumer.
//!
//! `RelayError` separates the four failure classes a hop can end in: its own
//! deadline elapsing, the transport failing, the payload not decoding, or the
//! store rejecting a write. Timeouts carry the `Hop` whose budget ran out so a
//! log line always says which clock fired.
use std::io;
use std::time::Duration;

use strum::Display;
use thiserror::Error;

/// One network or storage call bound to its own deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Hop {
    /// Relay server -> quote provider.
    #[strum(serialize = "upstream")]
    Upstream,
    /// Relay server -> SQLite.
    #[strum(serialize = "storage")]
    Storage,
    /// Consumer -> relay server.
    #[strum(serialize = "relay")]
    Relay,
}

/// Unified error type shared by server and consumer.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The hop's deadline elapsed before the operation completed.
    #[error("Timeout: {hop} deadline of {}ms elapsed", .budget.as_millis())]
    Timeout {
        /// Hop whose deadline elapsed.
        hop: Hop,
        /// Budget that was exceeded.
        budget: Duration,
    },

    /// Connection, DNS or protocol failure on an HTTP hop.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Payload did not decode into the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The relay answered with a non-success status.
    #[error("Unexpected status: {0}")]
    Status(u16),

    /// Insert or migration failure in the quote store.
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error from the local filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RelayError {
    /// Create a new `Storage` error
    #[allow(clippy::needless_pass_by_value)]
    pub fn storage<T: ToString>(msg: T) -> Self {
        Self::Storage(msg.to_string())
    }

    /// Create a new `Transport` error
    #[allow(clippy::needless_pass_by_value)]
    pub fn transport<T: ToString>(msg: T) -> Self {
        Self::Transport(msg.to_string())
    }

    /// Whether this error is a deadline expiry, on any hop.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RelayError::Decode(err.to_string())
        } else {
            RelayError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_names_its_hop() {
        let err = RelayError::Timeout { hop: Hop::Storage, budget: Duration::from_millis(10) };
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Timeout: storage deadline of 10ms elapsed");
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err: RelayError = serde_json::from_str::<String>("{").unwrap_err().into();
        assert!(matches!(err, RelayError::Decode(_)));
        assert!(!err.is_timeout());
    }
}
