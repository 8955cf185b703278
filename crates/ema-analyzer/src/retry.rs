//! Retry with exponential back-off for analysis requests.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, timeouts, 5xx, 429). Anything else is
//! returned on the first failure.

use std::future::Future;
use std::time::Duration;

use crate::error::AnalyzerError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** connect/timeout failures, a per-attempt [`AnalyzerError::Timeout`],
/// HTTP 5xx and HTTP 429.
///
/// **Not retriable:** every other status, unparseable replies, and request
/// or configuration errors.
pub(crate) fn is_retriable(err: &AnalyzerError) -> bool {
    match err {
        AnalyzerError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status()
                    .is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
        }
        AnalyzerError::Timeout { .. } => true,
        AnalyzerError::Status { status, .. } => *status >= 500 || *status == 429,
        AnalyzerError::InvalidRequest(_)
        | AnalyzerError::MissingApiKey
        | AnalyzerError::InvalidBaseUrl { .. }
        | AnalyzerError::EmptyReply
        | AnalyzerError::NoJson
        | AnalyzerError::Deserialize { .. } => false,
    }
}

/// Delay before attempt `attempt + 1`: `backoff_base_ms × 2^(attempt-1)`,
/// capped at 60 s.
pub(crate) fn backoff_delay(backoff_base_ms: u64, attempt: u32) -> Duration {
    const MAX_DELAY_MS: u64 = 60_000;
    let exponent = attempt.saturating_sub(1).min(10);
    let computed = backoff_base_ms.saturating_mul(1u64 << exponent);
    Duration::from_millis(computed.min(MAX_DELAY_MS))
}

/// Runs `operation` up to `max_attempts` times in total.
///
/// Back-off schedule with `backoff_base_ms = 1_000`:
///
/// | After attempt | Sleep    |
/// |---------------|----------|
/// | 1             | 1 000 ms |
/// | 2             | 2 000 ms |
/// | 3             | 4 000 ms |
///
/// Non-retriable errors and the last attempt's error are returned as-is.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, AnalyzerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AnalyzerError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_attempts {
                    return Err(err);
                }
                let delay = backoff_delay(backoff_base_ms, attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "analysis request failed, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
