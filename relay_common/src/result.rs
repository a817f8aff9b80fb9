//! `Result` alias for every fallible call along the relay chain.
use crate::error::RelayError;

/// `Result` defaulting its error to `RelayError`, so hops return `Result<T>`.
pub type Result<T, E = RelayError> = std::result::Result<T, E>;
