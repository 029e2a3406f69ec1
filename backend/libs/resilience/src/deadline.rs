/// Deadline wrapper for async operations
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Debug, Clone)]
pub struct DeadlineConfig {
    pub duration: Duration,
}

impl Default for DeadlineConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(30),
        }
    }
}

/// The time budget elapsed before the wrapped operation completed.
#[derive(Debug, thiserror::Error)]
#[error("operation deadline of {0:?} elapsed")]
pub struct DeadlineExceeded(pub Duration);

/// Run a future under a deadline. The future is dropped when the deadline
/// elapses, which aborts an in-flight sqlx call; an uncommitted transaction
/// rolls back when its handle is dropped.
pub async fn with_deadline<F, T>(duration: Duration, future: F) -> Result<T, DeadlineExceeded>
where
    F: Future<Output = T>,
{
    timeout(duration, future)
        .await
        .map_err(|_| DeadlineExceeded(duration))
}

/// Run a fallible future under a deadline, flattening the two error layers.
/// `on_deadline` maps the elapsed budget into the caller's error type.
pub async fn with_deadline_result<F, T, E>(
    duration: Duration,
    future: F,
    on_deadline: impl FnOnce(DeadlineExceeded) -> E,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(on_deadline(DeadlineExceeded(duration))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_within_budget() {
        let result = with_deadline(Duration::from_secs(1), async { 42 }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn reports_elapsed_budget() {
        let result = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            42
        })
        .await;
        assert!(matches!(result, Err(DeadlineExceeded(_))));
    }

    #[tokio::test]
    async fn result_variant_maps_deadline_into_caller_error() {
        let result: Result<i32, String> = with_deadline_result(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(42)
            },
            |e| e.to_string(),
        )
        .await;
        assert!(result.unwrap_err().contains("deadline"));
    }

    #[tokio::test]
    async fn result_variant_passes_inner_error_through() {
        let result: Result<i32, String> = with_deadline_result(
            Duration::from_secs(1),
            async { Err("query failed".to_string()) },
            |e| e.to_string(),
        )
        .await;
        assert_eq!(result.unwrap_err(), "query failed");
    }
}
