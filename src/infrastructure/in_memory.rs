use crate::domain::ports::PaymentLedger;
use crate::domain::record::{PaymentRecord, SettlementState};
use crate::domain::transaction::TransactionHandle;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory payment ledger.
///
/// Uses `Arc<RwLock<HashMap<TransactionHandle, PaymentRecord>>>` to allow shared
/// concurrent access. Records live only as long as the process.
#[derive(Default, Clone)]
pub struct InMemoryPaymentLedger {
    records: Arc<RwLock<HashMap<TransactionHandle, PaymentRecord>>>,
}

impl InMemoryPaymentLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentLedger for InMemoryPaymentLedger {
    async fn record(&self, record: PaymentRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(record.transaction_handle.clone(), record);
        Ok(())
    }

    async fn get(&self, handle: &TransactionHandle) -> Result<Option<PaymentRecord>> {
        let records = self.records.read().await;
        Ok(records.get(handle).cloned())
    }

    async fn unconfirmed(&self) -> Result<Vec<PaymentRecord>> {
        let records = self.records.read().await;
        let mut pending: Vec<_> = records
            .values()
            .filter(|r| r.state == SettlementState::Unconfirmed)
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.updated_at);
        Ok(pending)
    }
}
