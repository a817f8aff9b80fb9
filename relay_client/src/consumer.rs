//! One request to the relay under the consumer's outer deadline.
//!
//! The deadline covers sending the request, reading the body and decoding the
//! bid. It is the consumer's own clock: expiry abandons the local request only
//! and does not reach the relay's fetch or insert. The output file is touched
//! only after a bid has been decoded.
use std::fs;
use std::path::Path;
use std::time::Duration;

use log::{debug, info};
use relay_common::deadline::{CONSUMER_DEADLINE, with_deadline};
use relay_common::{Bid, Hop, RelayError, Result};
use reqwest::Client;

/// HTTP client for the relay's quote route.
#[derive(Debug, Clone)]
pub struct QuoteConsumer {
    http_client: Client,
    relay_url: String,
    deadline: Duration,
}

impl QuoteConsumer {
    /// Consumer for `relay_url` under the fixed outer deadline.
    pub fn new(relay_url: &str) -> Result<Self> {
        let http_client = Client::builder().build().map_err(RelayError::transport)?;
        Ok(Self { http_client, relay_url: relay_url.to_string(), deadline: CONSUMER_DEADLINE })
    }

    /// Replace the outer deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Fetch the bid from the relay. Exactly one attempt.
    pub async fn fetch_bid(&self) -> Result<Bid> {
        with_deadline(Hop::Relay, self.deadline, self.request_bid()).await
    }

    async fn request_bid(&self) -> Result<Bid> {
        let resp = self.http_client.get(&self.relay_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RelayError::Status(status.as_u16()));
        }
        let body = resp.bytes().await?;
        debug!("Relay answered {} with {} bytes", status, body.len());
        Ok(serde_json::from_slice(&body)?)
    }

    /// Fetch the bid and write it to `output`.
    ///
    /// Nothing is written unless a bid was fetched and decoded.
    pub async fn run(&self, output: &Path) -> Result<Bid> {
        let bid = self.fetch_bid().await?;
        write_bid(output, &bid)?;
        info!("Bid {} written to {}", bid.as_str(), output.display());
        Ok(bid)
    }
}

/// Write the bid verbatim, replacing any previous content.
pub fn write_bid(path: &Path, bid: &Bid) -> Result<()> {
    fs::write(path, bid.as_str())?;
    Ok(())
}
