//! Database query timeout helpers
//!
//! Settlement commits must never hang indefinitely; a timed-out
//! transaction is dropped, which rolls it back, so no half-applied
//! mutation is ever visible.

use std::time::Duration;
use tokio::time::timeout;

/// Default timeout for single queries
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for settlement transactions
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for timeout operations
#[derive(Debug, thiserror::Error)]
pub enum TimeoutError {
    /// Operation timed out
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for timeout operations
pub type TimeoutResult<T> = Result<T, TimeoutError>;

/// Execute an operation with a bounded timeout.
pub async fn with_timeout<F, T, E>(duration: Duration, future: F) -> Result<T, TimeoutError>
where
    F: std::future::Future<Output = Result<T, E>>,
    E: Into<TimeoutError>,
{
    match timeout(duration, future).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(TimeoutError::Timeout(duration)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn timeout_fires_on_slow_operation() {
        let result: Result<(), TimeoutError> = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<(), sqlx::Error>(())
        })
        .await;
        assert!(matches!(result, Err(TimeoutError::Timeout(_))));
    }

    #[tokio::test]
    async fn fast_operation_passes_through() {
        let result = with_timeout(Duration::from_secs(1), async { Ok::<i32, sqlx::Error>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }
}
