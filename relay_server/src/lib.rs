//! USD/BRL quote relay.
//!
//! The relay wires together three building blocks:
//!
//! - `gateway` — `UpstreamGateway` fetches the provider's envelope under the
//!   200 ms fetch deadline and flattens it into a `FlatQuote`.
//! - `sink` — `SqliteSink` migrates the quote table at startup and persists each
//!   fetched quote under the 10 ms insert deadline.
//! - `relay` — `QuoteRelay` and its warp routes: fetch, persist best-effort,
//!   answer with the bid.
//!
//! The source and sink are trait objects injected into the relay, so tests run
//! the same request path against stubs (see `mocks`).
#![warn(missing_docs)]
pub mod gateway;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod relay;
pub mod sink;

pub use gateway::{QuoteSource, UpstreamGateway};
pub use relay::{QuoteRelay, routes};
pub use sink::{QuoteSink, SqliteSink, prepare_store};
