//! Retry with exponential back-off and jitter for idempotent writer calls.
//!
//! Only the read-only catalogue endpoints go through [`retry_with_backoff`].
//! Generation is never retried since a repeated call produces a second post.

use std::future::Future;
use std::time::Duration;

use crate::error::WriterError;

/// Upper bound for a single back-off sleep.
const MAX_DELAY_MS: u64 = 30_000;

/// Network failures, timeouts, 429 and 5xx are worth another attempt.
pub(crate) fn is_retriable(err: &WriterError) -> bool {
    match err {
        WriterError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        WriterError::Api { status, .. } => *status == 429 || (500..600).contains(status),
        WriterError::Deserialize { .. }
        | WriterError::InvalidBaseUrl { .. }
        | WriterError::MissingTopic
        | WriterError::InvalidUpload(_) => false,
    }
}

/// Delay before retry number `attempt` (1-based), before jitter.
fn base_delay_ms(backoff_base_ms: u64, attempt: u32) -> u64 {
    backoff_base_ms
        .saturating_mul(1u64 << (attempt.saturating_sub(1)).min(10))
        .min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors. Each sleep is the doubled base delay ± 25 % jitter.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, WriterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, WriterError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let capped = base_delay_ms(backoff_base_ms, attempt);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "writer API transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
