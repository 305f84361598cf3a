use super::progress::ProgressReporter;
use crate::domain::outcome::PaymentProgress;
use crate::domain::ports::{SharedSubmitter, Signer};
use crate::domain::request::ValidatedRequest;
use crate::domain::transaction::TransactionHandle;
use crate::error::SubmissionError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Bounded, linearly backed-off retry policy for submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before the `retry`-th retry (1-based): `retry * base_delay`.
    pub fn delay_before(&self, retry: u32) -> Duration {
        self.base_delay * retry
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submitted {
    pub handle: TransactionHandle,
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionFailure {
    /// Permanent error, or the last transient one once attempts ran out.
    Failed {
        error: SubmissionError,
        attempts: u32,
    },
    Cancelled {
        attempts: u32,
    },
}

/// Wraps a [`crate::domain::ports::Submitter`] with the retry policy.
///
/// Only transient errors are retried. A permanent error stops the loop on the
/// attempt that produced it.
#[derive(Clone)]
pub struct RetryCoordinator {
    submitter: SharedSubmitter,
    policy: RetryPolicy,
}

impl RetryCoordinator {
    pub fn new(submitter: SharedSubmitter, policy: RetryPolicy) -> Self {
        Self { submitter, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn submit(
        &self,
        request: &ValidatedRequest,
        signer: &dyn Signer,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<Submitted, SubmissionFailure> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            progress.emit(PaymentProgress::Submitting { attempt });

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(SubmissionFailure::Cancelled { attempts: attempt });
                }
                result = self.submitter.submit(request, signer) => result,
            };

            let error = match result {
                Ok(handle) => {
                    if attempt > 1 {
                        info!(
                            "Submission succeeded on attempt {}/{}: {}",
                            attempt, max_attempts, handle
                        );
                    }
                    return Ok(Submitted {
                        handle,
                        attempts: attempt,
                    });
                }
                Err(error) => error,
            };

            if !error.is_transient() {
                warn!("Non-retryable submission error: {}", error);
                return Err(SubmissionFailure::Failed {
                    error,
                    attempts: attempt,
                });
            }

            if attempt >= max_attempts {
                warn!(
                    "Submission failed after {} attempts: {}",
                    attempt, error
                );
                return Err(SubmissionFailure::Failed {
                    error,
                    attempts: attempt,
                });
            }

            let delay = self.policy.delay_before(attempt);
            warn!(
                "Attempt {}/{} failed: {}; retrying in {:?}",
                attempt, max_attempts, error, delay
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(SubmissionFailure::Cancelled { attempts: attempt });
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
