//! Quote Client — asks the relay at `localhost:8080/cotacao` for the current
//! USD/BRL bid and writes it to `cotacao.txt` in the working directory.
//!
//! The whole exchange is bounded by a 300 ms deadline. On timeout, transport
//! failure or a file error the problem is logged and the process still exits
//! normally; on timeout the output file is left untouched.
//!
//! Usage example (CLI):
//! ```bash
//! RUST_LOG=debug relay_client
//! ```
#![warn(missing_docs)]
use std::path::Path;

use log::error;
use relay_client::QuoteConsumer;
use relay_common::RelayError;
use relay_common::net::{OUTPUT_FILE, RELAY_PORT, relay_url};

#[tokio::main]
async fn main() {
    init_logger();

    let consumer = match QuoteConsumer::new(&relay_url("localhost", RELAY_PORT)) {
        Ok(consumer) => consumer,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return;
        }
    };

    match consumer.run(Path::new(OUTPUT_FILE)).await {
        Ok(_) => {}
        Err(e @ RelayError::Timeout { .. }) => error!("Quote request failed, relay timeout: {}", e),
        Err(e @ RelayError::Io(_)) => error!("Failed to write {}: {}", OUTPUT_FILE, e),
        Err(e) => error!("Quote request failed: {}", e),
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
