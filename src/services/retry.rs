// src/services/retry.rs
//
// Bounded retry with exponential backoff
//
// Used wherever the core has to wait for a native capability to attach
// (e.g. the scanner plugin bridge right after app start).

use std::fmt::Display;
use std::future::Future;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::RetryPolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError<E> {
    #[error("retry cancelled")]
    Cancelled,

    /// Last error, after it was judged non-retryable or attempts ran out
    #[error("{0}")]
    Failed(E),
}

/// Run `op` until it succeeds, returns an error `retryable` rejects, or
/// `policy.max_attempts` is reached. `op` receives the 1-based attempt number.
///
/// Cancelling `cancel` aborts both an in-flight attempt and a pending delay.
pub async fn retry_with_backoff<T, E, Op, Fut, P>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    retryable: P,
    mut op: Op,
) -> Result<T, RetryError<E>>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            outcome = op(attempt) => outcome,
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && retryable(&e) => {
                let delay = policy.delay_for(attempt);
                log::debug!(
                    "Attempt {}/{} failed: {}; retrying in {:?}",
                    attempt,
                    max_attempts,
                    e,
                    delay
                );

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(RetryError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }

                attempt += 1;
            }
            Err(e) => return Err(RetryError::Failed(e)),
        }
    }
}
