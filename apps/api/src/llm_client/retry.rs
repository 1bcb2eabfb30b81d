//! Upstream retry orchestrator.
//!
//! `Attempting → Success | Retrying → Attempting | Exhausted`. Retryable
//! failures back off for `min(initial × 2^retry, max) + jitter`; fatal failures
//! stop immediately. The whole loop, sleeps included, runs under one overall
//! deadline.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Retryable,
    Fatal,
}

/// Decides whether a failure is worth another attempt.
pub trait Classify {
    fn classify(&self) -> ErrorClass;
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Upper bound of the random extra delay added to each backoff.
    pub jitter: Duration,
    /// Bound on the entire retry loop.
    pub deadline: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
            jitter: Duration::from_millis(250),
            deadline: Duration::from_secs(180),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `retry` (0-based), without jitter.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    fn delay(&self, retry: u32) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        };
        self.backoff(retry) + jitter
    }
}

#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("non-retryable failure on attempt {attempt}: {error}")]
    Fatal { attempt: u32, error: E },

    #[error("retries exhausted after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        delays: Vec<Duration>,
        last: E,
    },

    #[error("deadline exceeded after {attempts} attempts")]
    DeadlineExceeded { attempts: u32, last: Option<E> },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Fatal { attempt, .. } => *attempt,
            RetryError::Exhausted { attempts, .. } | RetryError::DeadlineExceeded { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Attempt counter and last failure. Outlives a cancelled loop so the
/// deadline error can report them.
struct Progress<E> {
    attempts: u32,
    delays: Vec<Duration>,
    last: Option<E>,
}

/// Runs `operation` until it succeeds, fails fatally, runs out of retries or
/// hits the policy deadline. The operation receives the 0-based attempt number.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Display,
{
    let deadline = Instant::now() + policy.deadline;
    let mut progress = Progress {
        attempts: 0,
        delays: Vec::new(),
        last: None,
    };

    let outcome = timeout_at(deadline, attempt_loop(policy, &mut operation, &mut progress)).await;
    match outcome {
        Ok(result) => result,
        Err(_) => {
            warn!(
                attempts = progress.attempts,
                deadline_ms = policy.deadline.as_millis() as u64,
                "Upstream retry loop hit its deadline"
            );
            Err(RetryError::DeadlineExceeded {
                attempts: progress.attempts,
                last: progress.last,
            })
        }
    }
}

async fn attempt_loop<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &mut F,
    progress: &mut Progress<E>,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Display,
{
    loop {
        let retry = progress.attempts;
        progress.attempts += 1;

        let error = match operation(retry).await {
            Ok(value) => {
                if retry > 0 {
                    info!(attempts = progress.attempts, "Upstream call succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        if error.classify() == ErrorClass::Fatal {
            warn!(attempt = progress.attempts, error = %error, "Fatal upstream failure; not retrying");
            return Err(RetryError::Fatal {
                attempt: progress.attempts,
                error,
            });
        }

        if retry >= policy.max_retries {
            warn!(attempts = progress.attempts, error = %error, "Upstream retries exhausted");
            return Err(RetryError::Exhausted {
                attempts: progress.attempts,
                delays: std::mem::take(&mut progress.delays),
                last: error,
            });
        }

        let delay = policy.delay(retry);
        warn!(
            attempt = progress.attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Retryable upstream failure; backing off"
        );
        progress.last = Some(error);
        progress.delays.push(delay);
        sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::llm_client::LlmError;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: Duration::ZERO,
            deadline: Duration::from_secs(600),
        }
    }

    fn unavailable() -> LlmError {
        LlmError::Api {
            status: 503,
            message: "Service Unavailable".to_string(),
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = policy(10);
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(3), Duration::from_secs(8));
        assert_eq!(policy.backoff(5), Duration::from_secs(30));
        assert_eq!(policy.backoff(40), Duration::from_secs(30));
    }

    #[test]
    fn test_jitter_stays_within_bound() {
        let policy = RetryPolicy {
            jitter: Duration::from_millis(250),
            ..policy(4)
        };
        for _ in 0..50 {
            let delay = policy.delay(1);
            assert!(delay >= Duration::from_secs(2));
            assert!(delay <= Duration::from_millis(2250));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_five_unavailable_responses_exhaust_after_four_retries() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();
        let policy = policy(4);

        let result: Result<(), _> = retry(&policy, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(unavailable()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        match result {
            Err(RetryError::Exhausted {
                attempts,
                delays,
                last,
            }) => {
                assert_eq!(attempts, 5);
                assert_eq!(
                    delays,
                    vec![
                        Duration::from_secs(1),
                        Duration::from_secs(2),
                        Duration::from_secs(4),
                        Duration::from_secs(8)
                    ]
                );
                assert!(delays.windows(2).all(|pair| pair[0] < pair[1]));
                assert!(delays.iter().all(|delay| *delay <= policy.max_delay));
                assert!(matches!(last, LlmError::Api { status: 503, .. }));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry(&policy(4), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(LlmError::Api {
                    status: 401,
                    message: "invalid x-api-key".to_string(),
                })
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(RetryError::Fatal { attempt: 1, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let result = retry(&policy(4), |attempt| async move {
            if attempt < 2 {
                Err(unavailable())
            } else {
                Ok(attempt)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_the_whole_loop() {
        let policy = RetryPolicy {
            deadline: Duration::from_secs(5),
            ..policy(10)
        };
        let started = Instant::now();
        let result: Result<(), _> = retry(&policy, |_| async { Err(unavailable()) }).await;

        // Attempts at 0s, 1s and 3s; the 4s sleep after the third crosses the deadline.
        match result {
            Err(RetryError::DeadlineExceeded { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(last.is_some());
            }
            other => panic!("expected deadline, got {other:?}"),
        }
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }
}
