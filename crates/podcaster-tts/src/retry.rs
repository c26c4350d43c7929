//! Retry helper for synthesis calls.
//!
//! Up to 3 attempts with exponential backoff (1 s → 2 s → 4 s, capped at
//! 10 s). Only errors tagged retryable (HTTP 429 and 5xx) are retried;
//! everything else aborts immediately. Cancellation is honored between
//! attempts.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use podcaster_core::SpeechError;

/// Maximum attempts per call.
const MAX_ATTEMPTS: u32 = 3;

/// First backoff delay.
const BASE_DELAY: Duration = Duration::from_secs(1);

/// Upper bound on any single backoff delay.
const MAX_DELAY: Duration = Duration::from_secs(10);

/// Backoff before attempt `n` (2-based).
fn backoff_delay(attempt: u32) -> Duration {
    let exp = BASE_DELAY * 2u32.pow(attempt.saturating_sub(2));
    exp.min(MAX_DELAY)
}

/// Run a synthesis thunk under the retry policy.
pub async fn with_retry<F, Fut, T>(
    label: &str,
    cancel: &CancellationToken,
    mut thunk: F,
) -> Result<T, SpeechError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SpeechError>>,
{
    let mut last = None;

    for attempt in 1..=MAX_ATTEMPTS {
        if cancel.is_cancelled() {
            return Err(SpeechError::Canceled);
        }
        if attempt > 1 {
            let delay = backoff_delay(attempt);
            tokio::select! {
                () = cancel.cancelled() => return Err(SpeechError::Canceled),
                () = tokio::time::sleep(delay) => {}
            }
        }

        match thunk().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                warn!(label, attempt, error = %e, "retryable synthesis failure");
                last = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    // Only reachable when the final attempt returned a retryable error,
    // which the match above surfaces directly; keep a defensible fallback.
    Err(last.unwrap_or(SpeechError::Canceled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use podcaster_core::ProviderKind;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn retryable() -> SpeechError {
        SpeechError::RateLimited {
            provider: ProviderKind::Gemini,
        }
    }

    fn fatal() -> SpeechError {
        SpeechError::Auth {
            provider: ProviderKind::Gemini,
            message: "bad key".into(),
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff_delay(2), Duration::from_secs(1));
        assert_eq!(backoff_delay(3), Duration::from_secs(2));
        assert_eq!(backoff_delay(4), Duration::from_secs(4));
        assert_eq!(backoff_delay(6), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_429_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in = Arc::clone(&calls);
        let started = Instant::now();

        let result = with_retry("test", &CancellationToken::new(), move || {
            let calls = Arc::clone(&calls_in);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(retryable())
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1 s + 2 s of backoff under virtual time.
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_errors_do_not_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in = Arc::clone(&calls);

        let result: Result<u32, _> = with_retry("test", &CancellationToken::new(), move || {
            let calls = Arc::clone(&calls_in);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(fatal())
            }
        })
        .await;

        assert!(matches!(result, Err(SpeechError::Auth { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_last_error() {
        let result: Result<u32, _> = with_retry("test", &CancellationToken::new(), || async {
            Err(retryable())
        })
        .await;
        assert!(matches!(result, Err(SpeechError::RateLimited { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_is_observed_between_attempts() {
        let cancel = CancellationToken::new();
        let cancel_in = cancel.clone();

        let result: Result<u32, _> = with_retry("test", &cancel, move || {
            cancel_in.cancel();
            async { Err(retryable()) }
        })
        .await;
        assert!(matches!(result, Err(SpeechError::Canceled)));
    }
}
