//! Retry with exponential backoff for provider fetches.
//!
//! [`retry_with_backoff`] wraps a fallible async fetch and retries on
//! transient errors ([`ScrapeError::is_retryable`]). Fatal errors are
//! returned immediately; exhausting the attempt budget returns
//! [`ScrapeError::Exhausted`] carrying the keyword, the attempt count, and
//! the last underlying cause so the pipeline can decide whether to fall back.

use std::future::Future;
use std::time::Duration;

use crate::error::ScrapeError;

/// Runs `operation` up to `max_attempts` times total (minimum 1).
///
/// Backoff schedule with `backoff_base_ms = 2_000`:
///
/// | Failed attempt | Sleep before next attempt |
/// |----------------|---------------------------|
/// | 1              | 2 000 ms × 2⁰             |
/// | 2              | 2 000 ms × 2¹             |
///
/// No sleep follows the final attempt.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    keyword: &str,
    max_attempts: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(keyword, attempt, "fetch succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if !err.is_retryable() {
                    tracing::warn!(keyword, attempt, error = %err, "fatal fetch error, not retrying");
                    return Err(err);
                }
                if attempt >= max_attempts {
                    tracing::error!(
                        keyword,
                        attempts = attempt,
                        error = %err,
                        "fetch attempts exhausted"
                    );
                    return Err(ScrapeError::Exhausted {
                        keyword: keyword.to_owned(),
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
                let delay_ms = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(20));
                tracing::warn!(
                    keyword,
                    attempt,
                    max_attempts,
                    delay_ms,
                    error = %err,
                    "transient fetch error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    fn transient() -> ScrapeError {
        ScrapeError::UnexpectedStatus {
            status: 502,
            url: "http://test/search".to_owned(),
        }
    }

    fn fatal() -> ScrapeError {
        ScrapeError::UnexpectedStatus {
            status: 404,
            url: "http://test/search".to_owned(),
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff("AI", 3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ScrapeError>(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff("AI", 3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(transient())
                } else {
                    Ok::<u32, ScrapeError>(9)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 9);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_wraps_last_error_with_attempt_count() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff("机器学习", 3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScrapeError>(transient())
            }
        })
        .await;
        assert_eq!(
            calls.load(Ordering::SeqCst),
            3,
            "must attempt exactly max_attempts times"
        );
        match result {
            Err(ScrapeError::Exhausted {
                keyword,
                attempts,
                source,
            }) => {
                assert_eq!(keyword, "机器学习");
                assert_eq!(attempts, 3);
                assert!(matches!(
                    *source,
                    ScrapeError::UnexpectedStatus { status: 502, .. }
                ));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_doubles_between_attempts() {
        let stamps = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&stamps);
        let result = retry_with_backoff("AI", 4, 1_000, || {
            let s = Arc::clone(&s);
            async move {
                s.lock().expect("stamps lock").push(tokio::time::Instant::now());
                Err::<u32, ScrapeError>(transient())
            }
        })
        .await;
        assert!(matches!(result, Err(ScrapeError::Exhausted { .. })));

        // Paused clock: elapsed virtual time between attempts is exactly the
        // backoff sleep, 1000 ms x 2^0, 2^1, 2^2.
        let stamps = stamps.lock().expect("stamps lock");
        assert_eq!(stamps.len(), 4);
        assert_eq!(stamps[1] - stamps[0], Duration::from_millis(1_000));
        assert_eq!(stamps[2] - stamps[1], Duration::from_millis(2_000));
        assert_eq!(stamps[3] - stamps[2], Duration::from_millis(4_000));
    }

    #[tokio::test]
    async fn fatal_error_is_attempted_exactly_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff("AI", 3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScrapeError>(fatal())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(ScrapeError::UnexpectedStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn zero_attempt_budget_still_tries_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff("AI", 0, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ScrapeError>(1)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
