//! Retry with exponential back-off and jitter for geocoder calls.
//!
//! Address lookups are interactive, so the budget is small: a single quick
//! retry on a flaky connection is worth it, a long back-off is not. Errors
//! that retrying cannot fix are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::GeocodeError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 5_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 429 and 5xx.
///
/// **Not retriable:** credential rejection, other 4xx, malformed bodies and
/// empty results.
pub(crate) fn is_retriable(err: &GeocodeError) -> bool {
    match err {
        GeocodeError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        GeocodeError::RateLimited { .. } => true,
        GeocodeError::UnexpectedStatus { status, .. } => *status >= 500,
        GeocodeError::Unauthorized { .. }
        | GeocodeError::Deserialize { .. }
        | GeocodeError::NoResult { .. }
        | GeocodeError::InvalidBaseUrl { .. } => false,
    }
}

/// How long to wait before retry number `attempt` (1-based) after `err`.
///
/// Exponential in `backoff_base_ms` with ±25 % jitter. A 429 waits at least
/// as long as the service's `Retry-After` asked for. Both are capped at
/// [`MAX_DELAY_MS`] so an interactive lookup never stalls for long.
fn retry_delay(attempt: u32, backoff_base_ms: u64, err: &GeocodeError) -> Duration {
    let exponential = backoff_base_ms
        .saturating_mul(1u64 << attempt.saturating_sub(1).min(10))
        .min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (exponential as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;

    let requested = match err {
        GeocodeError::RateLimited { retry_after_secs } => {
            retry_after_secs.saturating_mul(1_000).min(MAX_DELAY_MS)
        }
        _ => 0,
    };

    Duration::from_millis(jittered.max(requested))
}

/// Runs `operation`, retrying transient geocoder failures up to
/// `max_retries` times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, GeocodeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GeocodeError>>,
{
    let mut attempt = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if attempt >= max_retries || !is_retriable(&err) {
            return Err(err);
        }
        attempt += 1;
        let delay = retry_delay(attempt, backoff_base_ms, &err);
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "geocoder call failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
