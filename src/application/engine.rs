use super::poller::{ConfirmationPoller, PollResult};
use super::progress::ProgressReporter;
use super::retry::{RetryCoordinator, SubmissionFailure, Submitted};
use super::validator::validate;
use crate::config::EngineConfig;
use crate::domain::outcome::{FailureReason, PaymentOutcome, PaymentProgress};
use crate::domain::ports::{
    SharedPaymentLedger, SharedSettlementClient, SharedSigner, SharedSubmitter, Signer,
};
use crate::domain::record::{PaymentRecord, SettlementState};
use crate::domain::request::{PaymentRequest, ValidatedRequest};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{error, info, warn};

/// The entry point for paying for a feature.
///
/// `PaymentEngine` composes validation, retried submission and confirmation
/// polling into a single call that yields exactly one [`PaymentOutcome`].
/// It is cheap to clone; clones share the settlement client and ledger, and
/// any number of payments may run concurrently.
#[derive(Clone)]
pub struct PaymentEngine {
    retry: RetryCoordinator,
    poller: ConfirmationPoller,
    ledger: Option<SharedPaymentLedger>,
}

impl PaymentEngine {
    /// Creates a new `PaymentEngine`.
    ///
    /// # Arguments
    ///
    /// * `submitter` - The submission strategy (gateway or direct).
    /// * `client` - The settlement service, used for confirmation polling.
    /// * `config` - Retry and polling parameters.
    pub fn new(
        submitter: SharedSubmitter,
        client: SharedSettlementClient,
        config: EngineConfig,
    ) -> Self {
        Self {
            retry: RetryCoordinator::new(submitter, config.retry),
            poller: ConfirmationPoller::new(client, config.poller),
            ledger: None,
        }
    }

    /// Records every submitted payment in `ledger` for later reconciliation.
    pub fn with_ledger(mut self, ledger: SharedPaymentLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub async fn pay(&self, request: &PaymentRequest, signer: &dyn Signer) -> PaymentOutcome {
        self.pay_with(
            request,
            signer,
            &ProgressReporter::silent(),
            &CancellationToken::new(),
        )
        .await
    }

    /// Runs one payment to its terminal outcome.
    ///
    /// Progress is reported through `progress`. Cancelling `cancel` stops the
    /// payment at the next suspension point; a transfer that was already
    /// submitted is not revoked and the outcome is marked non-definitive.
    pub async fn pay_with(
        &self,
        request: &PaymentRequest,
        signer: &dyn Signer,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> PaymentOutcome {
        let validated = match validate(request) {
            Ok(validated) => validated,
            Err(error) => {
                warn!("Rejected payment request: {}", error);
                let outcome = PaymentOutcome::failure(FailureReason::Validation { error }, 0);
                return Self::finish(outcome, progress);
            }
        };

        info!(
            "Paying {} to {} for '{}'",
            validated.amount(),
            validated.recipient(),
            validated.description()
        );

        let Submitted { handle, attempts } =
            match self.retry.submit(&validated, signer, progress, cancel).await {
                Ok(submitted) => submitted,
                Err(SubmissionFailure::Failed { error, attempts }) => {
                    let reason = if error.is_transient() {
                        FailureReason::RetriesExhausted {
                            message: error.message,
                        }
                    } else {
                        FailureReason::Rejected {
                            message: error.message,
                        }
                    };
                    return Self::finish(PaymentOutcome::failure(reason, attempts), progress);
                }
                Err(SubmissionFailure::Cancelled { attempts }) => {
                    let reason = FailureReason::Cancelled {
                        transaction_handle: None,
                    };
                    return Self::finish(PaymentOutcome::failure(reason, attempts), progress);
                }
            };

        info!("Submitted {} after {} attempt(s)", handle, attempts);
        progress.emit(PaymentProgress::AwaitingConfirmation {
            transaction_handle: handle.clone(),
        });

        let outcome = match self.poller.poll(&handle, progress, cancel).await {
            PollResult::Confirmed { receipt, .. } => {
                progress.emit(PaymentProgress::Confirmed {
                    transaction_handle: handle.clone(),
                });
                PaymentOutcome::success(handle, receipt)
            }
            PollResult::TimedOut { .. } => PaymentOutcome::failure(
                FailureReason::ConfirmationTimeout {
                    transaction_handle: handle,
                },
                attempts,
            ),
            PollResult::Cancelled => PaymentOutcome::failure(
                FailureReason::Cancelled {
                    transaction_handle: Some(handle),
                },
                attempts,
            ),
        };

        self.record(&validated, &outcome).await;
        Self::finish(outcome, progress)
    }

    /// Runs a payment as a background task.
    pub fn spawn_payment(&self, request: PaymentRequest, signer: SharedSigner) -> PaymentTask {
        let (progress, events) = ProgressReporter::channel();
        let cancel = CancellationToken::new();
        let engine = self.clone();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            engine
                .pay_with(&request, signer.as_ref(), &progress, &token)
                .await
        });

        PaymentTask {
            events,
            abandon: cancel.clone().drop_guard(),
            cancel,
            handle,
        }
    }

    async fn record(&self, request: &ValidatedRequest, outcome: &PaymentOutcome) {
        let Some(ledger) = &self.ledger else {
            return;
        };
        let Some(handle) = outcome.transaction_handle() else {
            return;
        };

        let mut record = PaymentRecord::new(handle.clone(), request, SettlementState::Unconfirmed);
        if let PaymentOutcome::Success { receipt, .. } = outcome {
            record.confirm(receipt.clone());
        }

        if let Err(e) = ledger.record(record).await {
            error!("Failed to record payment {}: {}", handle, e);
        }
    }

    fn finish(outcome: PaymentOutcome, progress: &ProgressReporter) -> PaymentOutcome {
        match &outcome {
            PaymentOutcome::Success {
                transaction_handle, ..
            } => info!("Payment {} confirmed", transaction_handle),
            PaymentOutcome::Failure {
                reason,
                attempts_made,
                definitive,
            } => {
                warn!(
                    "Payment failed after {} attempt(s) (definitive: {}): {}",
                    attempts_made, definitive, reason
                );
                progress.emit(PaymentProgress::Failed {
                    reason: reason.to_string(),
                });
            }
        }
        outcome
    }
}

/// Handle to a payment running in the background.
///
/// Dropping it without awaiting [`PaymentTask::outcome`] cancels the payment.
pub struct PaymentTask {
    events: mpsc::UnboundedReceiver<PaymentProgress>,
    cancel: CancellationToken,
    abandon: DropGuard,
    handle: JoinHandle<PaymentOutcome>,
}

impl PaymentTask {
    /// Next progress notification; `None` once the payment has finished.
    pub async fn next_progress(&mut self) -> Option<PaymentProgress> {
        self.events.recv().await
    }

    /// Stops waiting for the payment. The outcome is still delivered.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn outcome(self) -> PaymentOutcome {
        let result = self.handle.await;
        self.abandon.disarm();
        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Payment task failed: {}", e);
                PaymentOutcome::failure(
                    FailureReason::Interrupted {
                        message: e.to_string(),
                    },
                    0,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::address::Address;
    use crate::domain::amount::Balance;
    use crate::domain::ports::{PaymentLedger, SettlementClient, Submitter};
    use crate::domain::transaction::{
        ConfirmationStatus, Receipt, TransactionHandle, TransferDescription, TransferInstruction,
    };
    use crate::error::{Result, SubmissionError};
    use crate::infrastructure::in_memory::InMemoryPaymentLedger;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    const RECIPIENT: &str = "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6";

    /// Submits instantly; confirms on the `confirm_on`-th status query.
    struct Settlement {
        confirm_on: u32,
        queries: AtomicU32,
    }

    impl Settlement {
        fn new(confirm_on: u32) -> Arc<Self> {
            Arc::new(Self {
                confirm_on,
                queries: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl SettlementClient for Settlement {
        async fn submit_transfer(
            &self,
            _transfer: &TransferDescription,
        ) -> std::result::Result<TransactionHandle, SubmissionError> {
            Ok("tx-1".into())
        }

        async fn get_transaction_status(
            &self,
            _handle: &TransactionHandle,
        ) -> Result<ConfirmationStatus> {
            let n = self.queries.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.confirm_on {
                Ok(ConfirmationStatus::confirmed(1, Receipt(json!({"block": 42}))))
            } else {
                Ok(ConfirmationStatus::pending(0))
            }
        }

        async fn get_balance(&self, _address: &Address) -> Result<Balance> {
            Ok(Balance::ZERO)
        }
    }

    struct Gateway(Arc<Settlement>);

    #[async_trait]
    impl Submitter for Gateway {
        async fn submit(
            &self,
            _request: &ValidatedRequest,
            _signer: &dyn Signer,
        ) -> std::result::Result<TransactionHandle, SubmissionError> {
            self.0
                .submit_transfer(&TransferDescription {
                    amount: String::new(),
                    recipient: Address::parse(RECIPIENT).unwrap(),
                    token: Address::parse(RECIPIENT).unwrap(),
                    chain: 0,
                    payer: Address::parse(RECIPIENT).unwrap(),
                    description: String::new(),
                    metadata: Default::default(),
                })
                .await
        }
    }

    struct Wallet(Address);

    #[async_trait]
    impl Signer for Wallet {
        fn address(&self) -> &Address {
            &self.0
        }

        async fn send_transaction(
            &self,
            _instruction: &TransferInstruction,
        ) -> std::result::Result<TransactionHandle, SubmissionError> {
            Err(SubmissionError::permanent("not used"))
        }
    }

    fn engine(settlement: Arc<Settlement>) -> PaymentEngine {
        PaymentEngine::new(
            Arc::new(Gateway(settlement.clone())),
            settlement,
            EngineConfig::default(),
        )
    }

    fn wallet() -> Arc<Wallet> {
        Arc::new(Wallet(Address::parse(RECIPIENT).unwrap()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_pay_reports_progress_in_order() {
        let engine = engine(Settlement::new(2));
        let mut task = engine.spawn_payment(
            PaymentRequest::new("2.99", RECIPIENT, "Unlock insights"),
            wallet(),
        );

        let mut events = Vec::new();
        while let Some(event) = task.next_progress().await {
            events.push(event);
        }
        let outcome = task.outcome().await;

        assert!(outcome.is_success());
        assert_eq!(
            events,
            vec![
                PaymentProgress::Submitting { attempt: 1 },
                PaymentProgress::AwaitingConfirmation {
                    transaction_handle: "tx-1".into()
                },
                PaymentProgress::Confirmations { count: 0 },
                PaymentProgress::Confirmations { count: 1 },
                PaymentProgress::Confirmed {
                    transaction_handle: "tx-1".into()
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_task_still_yields_one_outcome() {
        let engine = engine(Settlement::new(u32::MAX));
        let mut task = engine.spawn_payment(
            PaymentRequest::new("2.99", RECIPIENT, "Unlock insights"),
            wallet(),
        );

        // Wait until polling has started, then walk away.
        while let Some(event) = task.next_progress().await {
            if matches!(event, PaymentProgress::AwaitingConfirmation { .. }) {
                break;
            }
        }
        task.cancel();

        let outcome = task.outcome().await;
        assert_eq!(
            outcome,
            PaymentOutcome::Failure {
                reason: FailureReason::Cancelled {
                    transaction_handle: Some("tx-1".into())
                },
                attempts_made: 1,
                definitive: false,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_task_stops_polling() {
        let settlement = Settlement::new(u32::MAX);
        let engine = engine(settlement.clone());
        let task = engine.spawn_payment(
            PaymentRequest::new("2.99", RECIPIENT, "Unlock insights"),
            wallet(),
        );

        tokio::time::sleep(Duration::from_secs(3)).await;
        drop(task);
        let queries = settlement.queries.load(Ordering::SeqCst);
        assert!(queries >= 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(settlement.queries.load(Ordering::SeqCst), queries);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ledger_records_unconfirmed_payment() {
        let ledger = Arc::new(InMemoryPaymentLedger::new());
        let engine = engine(Settlement::new(u32::MAX)).with_ledger(ledger.clone());

        let outcome = engine
            .pay(
                &PaymentRequest::new("2.99", RECIPIENT, "Unlock insights"),
                wallet().as_ref(),
            )
            .await;
        assert!(!outcome.is_success());

        let record = ledger.get(&"tx-1".into()).await.unwrap().unwrap();
        assert_eq!(record.state, SettlementState::Unconfirmed);
        assert_eq!(ledger.unconfirmed().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_is_not_recorded() {
        let ledger = Arc::new(InMemoryPaymentLedger::new());
        let engine = engine(Settlement::new(1)).with_ledger(ledger.clone());

        let outcome = engine
            .pay(
                &PaymentRequest::new("2.99", RECIPIENT, ""),
                wallet().as_ref(),
            )
            .await;

        assert!(matches!(
            outcome,
            PaymentOutcome::Failure {
                attempts_made: 0,
                definitive: true,
                ..
            }
        ));
        assert!(ledger.unconfirmed().await.unwrap().is_empty());
    }
}
