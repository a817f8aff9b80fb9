//!
//! Common types and utilities shared by the relay server and the consumer.
//!
//! This crate aggregates:
//! - `error` — unified error type `RelayError` and the `Hop` it is attributed to.
//! - `result` — handy `Result<T, RelayError>` alias.
//! - `quote` — upstream envelope, flattened quote record and the relayed `Bid`.
//! - `deadline` — per-hop budgets and the helper that enforces them.
//! - `net` — fixed endpoints, ports and file locations.
#![warn(missing_docs)]
pub mod deadline;
pub mod error;
pub mod net;
pub mod quote;
pub mod result;

pub use error::{Hop, RelayError};
pub use quote::{Bid, FlatQuote, RawQuote};
pub use result::Result;
