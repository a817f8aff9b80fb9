//! Upstream gateway: one GET to the quote provider under the fetch deadline.
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use relay_common::deadline::{FETCH_DEADLINE, with_deadline};
use relay_common::net::UPSTREAM_URL;
use relay_common::{FlatQuote, Hop, RawQuote, RelayError, Result};
use reqwest::Client;

/// Source of fresh quotes for the relay.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current quote. Exactly one attempt.
    async fn fetch_quote(&self) -> Result<FlatQuote>;
}

/// HTTP client for the quote provider.
#[derive(Debug, Clone)]
pub struct UpstreamGateway {
    http_client: Client,
    url: String,
    deadline: Duration,
}

impl UpstreamGateway {
    /// Gateway for the fixed provider endpoint and fetch deadline.
    pub fn new() -> Result<Self> {
        Self::with_endpoint(UPSTREAM_URL, FETCH_DEADLINE)
    }

    /// Gateway for an arbitrary endpoint and deadline.
    pub fn with_endpoint(url: &str, deadline: Duration) -> Result<Self> {
        let http_client = Client::builder().build().map_err(RelayError::transport)?;
        Ok(Self { http_client, url: url.to_string(), deadline })
    }

    async fn fetch_raw(&self) -> Result<RawQuote> {
        let resp = self.http_client.get(&self.url).send().await?;
        debug!("Upstream answered {} from {}", resp.status(), self.url);
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl QuoteSource for UpstreamGateway {
    async fn fetch_quote(&self) -> Result<FlatQuote> {
        let raw = with_deadline(Hop::Upstream, self.deadline, self.fetch_raw()).await?;
        Ok(raw.into())
    }
}
