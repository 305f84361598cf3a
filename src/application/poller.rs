use super::progress::ProgressReporter;
use crate::domain::outcome::PaymentProgress;
use crate::domain::ports::SharedSettlementClient;
use crate::domain::transaction::{Receipt, TransactionHandle};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Lower bound on the pause between status queries.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Pause between queries; raised to [`MIN_POLL_INTERVAL`] if smaller.
    pub interval: Duration,
    /// Wall-clock budget measured from the first status query.
    pub deadline: Duration,
    pub required_confirmations: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            deadline: Duration::from_secs(60),
            required_confirmations: 1,
        }
    }
}

/// Terminal state of one polling session.
#[derive(Debug, Clone, PartialEq)]
pub enum PollResult {
    Confirmed {
        receipt: Receipt,
        confirmations: u64,
    },
    TimedOut {
        elapsed: Duration,
        polls: u32,
    },
    /// The caller stopped waiting. Nothing is sent to the settlement service;
    /// the transaction may still confirm.
    Cancelled,
}

/// Watches one transaction until it confirms, the deadline passes, or the
/// caller cancels.
///
/// Failed status queries are logged and skipped: only the deadline ends an
/// unconfirmed session. The deadline also bounds a query still in flight; a
/// query issued on the deadline gets one interval to answer.
#[derive(Clone)]
pub struct ConfirmationPoller {
    client: SharedSettlementClient,
    config: PollerConfig,
}

impl ConfirmationPoller {
    pub fn new(client: SharedSettlementClient, mut config: PollerConfig) -> Self {
        config.interval = config.interval.max(MIN_POLL_INTERVAL);
        Self { client, config }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    pub async fn poll(
        &self,
        handle: &TransactionHandle,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> PollResult {
        let started = Instant::now();
        let deadline = started + self.config.deadline;
        let mut polls = 0u32;
        let mut last_count = None;

        loop {
            polls += 1;
            let answer_by = deadline.max(Instant::now() + self.config.interval);
            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Stopped polling {} after {} queries", handle, polls - 1);
                    return PollResult::Cancelled;
                }
                status = self.client.get_transaction_status(handle) => status,
                _ = tokio::time::sleep_until(answer_by) => {
                    let elapsed = started.elapsed();
                    warn!(
                        "Transaction {} not confirmed within {:?}; status query {} still pending",
                        handle, self.config.deadline, polls
                    );
                    return PollResult::TimedOut { elapsed, polls };
                }
            };

            match status {
                Ok(status) => {
                    if last_count != Some(status.confirmation_count) {
                        last_count = Some(status.confirmation_count);
                        progress.emit(PaymentProgress::Confirmations {
                            count: status.confirmation_count,
                        });
                    }

                    if status.is_final(self.config.required_confirmations) {
                        let confirmations = status.confirmation_count;
                        info!(
                            "Transaction {} confirmed with {} confirmations after {} polls",
                            handle, confirmations, polls
                        );
                        let receipt = status
                            .receipt
                            .unwrap_or_else(|| Receipt::synthesized(handle, confirmations));
                        return PollResult::Confirmed {
                            receipt,
                            confirmations,
                        };
                    }

                    debug!(
                        "Transaction {} pending ({} confirmations)",
                        handle, status.confirmation_count
                    );
                }
                Err(e) => warn!("Error checking status of {}: {}", handle, e),
            }

            let elapsed = started.elapsed();
            if elapsed >= self.config.deadline {
                warn!(
                    "Transaction {} not confirmed within {:?} ({} polls)",
                    handle, self.config.deadline, polls
                );
                return PollResult::TimedOut { elapsed, polls };
            }

            // Never sleep past the deadline; the last query lands right on it.
            let pause = self.config.interval.min(self.config.deadline - elapsed);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Stopped polling {} after {} queries", handle, polls);
                    return PollResult::Cancelled;
                }
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }
}
