use crate::domain::ports::{SharedPaymentLedger, SharedSettlementClient};
use crate::domain::transaction::Receipt;
use crate::error::Result;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub checked: usize,
    pub confirmed: usize,
    pub still_pending: usize,
}

/// Settles ledger entries whose confirmation arrived after the caller
/// stopped waiting.
///
/// Each unconfirmed record is queried once. Records that are now final are
/// promoted to confirmed; everything else, query errors included, is left
/// for the next run.
#[derive(Clone)]
pub struct Reconciler {
    client: SharedSettlementClient,
    ledger: SharedPaymentLedger,
    required_confirmations: u64,
}

impl Reconciler {
    pub fn new(client: SharedSettlementClient, ledger: SharedPaymentLedger) -> Self {
        Self {
            client,
            ledger,
            required_confirmations: 1,
        }
    }

    pub fn with_required_confirmations(mut self, required: u64) -> Self {
        self.required_confirmations = required;
        self
    }

    pub async fn reconcile(&self) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for mut record in self.ledger.unconfirmed().await? {
            report.checked += 1;
            let handle = record.transaction_handle.clone();

            let status = match self.client.get_transaction_status(&handle).await {
                Ok(status) => status,
                Err(e) => {
                    warn!("Error checking status of {}: {}", handle, e);
                    report.still_pending += 1;
                    continue;
                }
            };

            if !status.is_final(self.required_confirmations) {
                report.still_pending += 1;
                continue;
            }

            let confirmations = status.confirmation_count;
            let receipt = status
                .receipt
                .unwrap_or_else(|| Receipt::synthesized(&handle, confirmations));
            record.confirm(receipt);
            self.ledger.record(record).await?;
            info!("Payment {} settled with {} confirmations", handle, confirmations);
            report.confirmed += 1;
        }

        info!(
            "Reconciled {} payments: {} confirmed, {} still pending",
            report.checked, report.confirmed, report.still_pending
        );
        Ok(report)
    }
}
