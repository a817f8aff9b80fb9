//! Quote consumer: asks the relay for the current USD/BRL bid and writes it to
//! a local file.
#![warn(missing_docs)]
pub mod consumer;

pub use consumer::{QuoteConsumer, write_bid};
