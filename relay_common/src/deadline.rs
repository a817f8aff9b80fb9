//! Per-hop budgets and the helper that enforces them.
//!
//! The three budgets nest by intent only: the consumer's 300 ms covers the
//! relay's 200 ms fetch plus its 10 ms insert, but each clock is started and
//! enforced by the hop that owns it. Expiry of an outer budget never reaches
//! into an inner hop.
use std::future::Future;
use std::time::Duration;

use crate::error::{Hop, RelayError};
use crate::result::Result;

/// Budget for the relay's call to the quote provider.
pub const FETCH_DEADLINE: Duration = Duration::from_millis(200);
/// Budget for persisting one quote.
pub const INSERT_DEADLINE: Duration = Duration::from_millis(10);
/// Budget for the consumer's call to the relay.
pub const CONSUMER_DEADLINE: Duration = Duration::from_millis(300);

/// Drive `op` to completion or fail with `RelayError::Timeout` for `hop` once
/// `budget` has elapsed. The clock starts when this is awaited.
pub async fn with_deadline<F, T>(hop: Hop, budget: Duration, op: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(budget, op).await {
        Ok(res) => res,
        Err(_) => Err(RelayError::Timeout { hop, budget }),
    }
}
