//! Quote relay: the single HTTP endpoint that fetches, persists and answers.
//!
//! Per request the relay runs three strictly ordered steps:
//! - fetch the quote from its `QuoteSource` (any error answers `500`),
//! - hand the quote to its `QuoteSink` (errors are logged and dropped),
//! - answer `200` with only the bid as a JSON string.
//!
//! Any other path answers `404`. Bodies never carry error details.
use std::convert::Infallible;
use std::sync::Arc;

use log::{error, warn};
use relay_common::net::QUOTE_ROUTE;
use relay_common::{Bid, FlatQuote, Result};
use warp::http::StatusCode;
use warp::reply::{Reply, Response};
use warp::filters::BoxedFilter;
use warp::filters::path::FullPath;
use warp::{Filter, Rejection};

use crate::gateway::QuoteSource;
use crate::sink::QuoteSink;

/// Orchestrates the gateway and the sink for one request at a time.
pub struct QuoteRelay {
    source: Arc<dyn QuoteSource>,
    sink: Arc<dyn QuoteSink>,
}

impl QuoteRelay {
    /// Create a relay over the given quote source and best-effort sink.
    pub fn new(source: Arc<dyn QuoteSource>, sink: Arc<dyn QuoteSink>) -> Self {
        Self { source, sink }
    }

    /// Fetch a quote, persist it best-effort and return its bid.
    ///
    /// Only a fetch failure is returned; the sink never changes the outcome.
    pub async fn relay(&self) -> Result<Bid> {
        let quote = self.source.fetch_quote().await?;
        self.persist(&quote).await;
        Ok(quote.bid())
    }

    /// Side channel: drain the sink's result into the log.
    async fn persist(&self, quote: &FlatQuote) {
        match self.sink.insert(quote).await {
            Ok(()) => {}
            Err(e) if e.is_timeout() => warn!("Quote not persisted, storage timeout: {}", e),
            Err(e) => warn!("Quote not persisted: {}", e),
        }
    }
}

/// Build the relay's routes: `/cotacao` and a `404` for everything else.
pub fn routes(relay: Arc<QuoteRelay>) -> BoxedFilter<(Response,)> {
    let quote_route = exact_quote_path()
        .and(with_relay(relay))
        .and_then(handle_quote);

    let not_found_fallback = warp::any().map(|| empty(StatusCode::NOT_FOUND));

    quote_route.or(not_found_fallback).unify().boxed()
}

/// Match the quote path exactly; a trailing slash or extra segment falls
/// through to the `404` fallback.
fn exact_quote_path() -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::path::full()
        .and_then(|full: FullPath| async move {
            if full.as_str().strip_prefix('/') == Some(QUOTE_ROUTE) {
                Ok(())
            } else {
                Err(warp::reject::not_found())
            }
        })
        .untuple_one()
}

/// Helper function to clone & pass the relay to filters
fn with_relay(relay: Arc<QuoteRelay>) -> impl Filter<Extract = (Arc<QuoteRelay>,), Error = Infallible> + Clone {
    warp::any().map(move || relay.clone())
}

/// Handle a request on the quote route
async fn handle_quote(relay: Arc<QuoteRelay>) -> std::result::Result<Response, Rejection> {
    match relay.relay().await {
        // `json` answers 500 on its own if the bid fails to encode.
        Ok(bid) => Ok(warp::reply::json(&bid).into_response()),
        Err(e) if e.is_timeout() => {
            error!("Quote fetch failed, upstream timeout: {}", e);
            Ok(empty(StatusCode::INTERNAL_SERVER_ERROR))
        }
        Err(e) => {
            error!("Quote fetch failed: {}", e);
            Ok(empty(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

fn empty(status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply(), status).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::UpstreamGateway;
    use crate::sink::prepare_store;
    use crate::mocks::{
        FailingSink, FailingSource, RecordingSink, StaticSource, sample_quote, sample_upstream_body,
        spawn_upstream,
    };
    use relay_common::deadline::FETCH_DEADLINE;
    use std::time::{Duration, Instant};

    fn relay_with(source: Arc<dyn QuoteSource>, sink: Arc<dyn QuoteSink>) -> Arc<QuoteRelay> {
        Arc::new(QuoteRelay::new(source, sink))
    }

    #[tokio::test]
    async fn answers_with_bid_only() {
        let sink = Arc::new(RecordingSink::default());
        let relay = relay_with(Arc::new(StaticSource(sample_quote("5.4321"))), sink.clone());

        let res = warp::test::request().path("/cotacao").reply(&routes(relay)).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["content-type"], "application/json");
        assert_eq!(&res.body()[..], br#""5.4321""#);
        assert_eq!(sink.rows(), vec![sample_quote("5.4321")]);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let sink = Arc::new(RecordingSink::default());
        let relay = relay_with(Arc::new(StaticSource(sample_quote("5.4321"))), sink.clone());
        let filter = routes(relay);

        for path in ["/", "/cotacoes", "/cotacao/", "/cotacao/extra", "/COTACAO", "/json/last/USD-BRL"] {
            let res = warp::test::request().path(path).reply(&filter).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
            assert!(res.body().is_empty());
        }
        assert!(sink.rows().is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_is_empty_500() {
        let sink = Arc::new(RecordingSink::default());
        let relay = relay_with(Arc::new(FailingSource), sink.clone());

        let res = warp::test::request().path("/cotacao").reply(&routes(relay)).await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(res.body().is_empty());
        assert!(sink.rows().is_empty());
    }

    #[tokio::test]
    async fn persistence_failure_still_answers_bid() {
        for sink in [FailingSink::timeout(), FailingSink::storage()] {
            let relay = relay_with(Arc::new(StaticSource(sample_quote("5.43"))), Arc::new(sink));

            let res = warp::test::request().path("/cotacao").reply(&routes(relay)).await;

            assert_eq!(res.status(), StatusCode::OK);
            assert_eq!(&res.body()[..], br#""5.43""#);
        }
    }

    #[tokio::test]
    async fn serves_bid_when_store_setup_failed() {
        let sink = Arc::new(FailingSink::storage());
        assert!(!prepare_store(sink.as_ref()).await);

        let relay = relay_with(Arc::new(StaticSource(sample_quote("5.43"))), sink);
        let res = warp::test::request().path("/cotacao").reply(&routes(relay)).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(&res.body()[..], br#""5.43""#);
    }

    #[tokio::test]
    async fn slow_upstream_answers_500_within_margin() {
        let addr = spawn_upstream(sample_upstream_body("5.43"), Duration::from_millis(1000));
        let gateway = UpstreamGateway::with_endpoint(&format!("http://{addr}/"), FETCH_DEADLINE).unwrap();
        let relay = relay_with(Arc::new(gateway), Arc::new(RecordingSink::default()));

        let started = Instant::now();
        let res = warp::test::request().path("/cotacao").reply(&routes(relay)).await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(started.elapsed() < FETCH_DEADLINE + Duration::from_millis(300));
    }

    #[tokio::test]
    async fn relays_upstream_bid_end_to_end() {
        let addr = spawn_upstream(sample_upstream_body("5.43"), Duration::ZERO);
        let gateway = UpstreamGateway::with_endpoint(&format!("http://{addr}/"), FETCH_DEADLINE).unwrap();
        let sink = Arc::new(RecordingSink::default());
        let relay = relay_with(Arc::new(gateway), sink.clone());

        let res = warp::test::request().path("/cotacao").reply(&routes(relay)).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(&res.body()[..], br#""5.43""#);
        assert_eq!(sink.rows().len(), 1);
        assert_eq!(sink.rows()[0].bid, "5.43");
    }
}
