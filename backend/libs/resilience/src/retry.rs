/// Retry policy for idempotent reads: exponential backoff with jitter
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct ReadRetryConfig {
    /// Maximum number of retry attempts after the initial try
    pub max_retries: u32,
    /// Initial backoff duration
    pub initial_backoff: Duration,
    /// Maximum backoff duration
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Add random jitter to backoff (±30%)
    pub jitter: bool,
}

impl Default for ReadRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    #[error("max retries ({retries}) exceeded: {last_error}")]
    MaxRetriesExceeded { retries: u32, last_error: E },
}

/// Execute an idempotent read with retry. The closure is re-invoked from
/// scratch on each attempt and therefore must not carry side effects; only
/// read paths are allowed to use it.
pub async fn with_read_retry<F, Fut, T, E>(
    config: &ReadRetryConfig,
    mut read: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    let mut backoff = config.initial_backoff;

    loop {
        match read().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempt += 1;
                if attempt > config.max_retries {
                    warn!("read retry budget ({}) exhausted: {}", config.max_retries, e);
                    return Err(RetryError::MaxRetriesExceeded {
                        retries: config.max_retries,
                        last_error: e,
                    });
                }

                let delay = apply_jitter(backoff, config.jitter);
                warn!(
                    "read failed ({}), retry {}/{} in {:?}",
                    e, attempt, config.max_retries, delay
                );
                tokio::time::sleep(delay).await;

                backoff = Duration::from_millis(
                    ((backoff.as_millis() as f64 * config.backoff_multiplier)
                        .min(config.max_backoff.as_millis() as f64)) as u64,
                );
            }
        }
    }
}

fn apply_jitter(base: Duration, jitter: bool) -> Duration {
    if jitter {
        let factor = rand::thread_rng().gen_range(0.7..1.3);
        Duration::from_millis((base.as_millis() as f64 * factor) as u64)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn no_jitter() -> ReadRetryConfig {
        ReadRetryConfig {
            jitter: false,
            initial_backoff: Duration::from_millis(1),
            ..ReadRetryConfig::default()
        }
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt_without_sleeping() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result = with_read_retry(&no_jitter(), move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_after_transient_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result = with_read_retry(&no_jitter(), move || {
            let n = calls_clone.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err("connection reset".to_string())
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let config = no_jitter();
        let result = with_read_retry(&config, || async { Err::<i32, _>("down".to_string()) }).await;

        match result {
            Err(RetryError::MaxRetriesExceeded { retries, .. }) => {
                assert_eq!(retries, config.max_retries)
            }
            Ok(_) => panic!("expected exhaustion"),
        }
    }

    #[test]
    fn jitter_stays_within_band() {
        let base = Duration::from_millis(1000);
        for _ in 0..100 {
            let d = apply_jitter(base, true);
            assert!(d >= Duration::from_millis(700) && d <= Duration::from_millis(1300));
        }
    }
}
