use crate::domain::ports::PaymentLedger;
use crate::domain::record::{PaymentRecord, SettlementState};
use crate::domain::transaction::TransactionHandle;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing payment records, keyed by transaction handle.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent payment ledger backed by RocksDB.
///
/// Records are stored as JSON under the UTF-8 bytes of their transaction
/// handle, so payments submitted by one run can be reconciled by the next.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbPaymentLedger {
    db: Arc<DB>,
}

impl RocksDbPaymentLedger {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn payments(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_PAYMENTS).ok_or_else(|| {
            PaymentError::InternalError("Payments column family not found".to_string())
        })
    }
}

#[async_trait]
impl PaymentLedger for RocksDbPaymentLedger {
    async fn record(&self, record: PaymentRecord) -> Result<()> {
        let cf = self.payments()?;
        let value = serde_json::to_vec(&record)?;
        self.db
            .put_cf(cf, record.transaction_handle.as_str().as_bytes(), value)?;
        Ok(())
    }

    async fn get(&self, handle: &TransactionHandle) -> Result<Option<PaymentRecord>> {
        let cf = self.payments()?;
        match self.db.get_pinned_cf(cf, handle.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn unconfirmed(&self) -> Result<Vec<PaymentRecord>> {
        let cf = self.payments()?;
        let mut pending = Vec::new();

        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let record: PaymentRecord = serde_json::from_slice(&value)?;
            if record.state == SettlementState::Unconfirmed {
                pending.push(record);
            }
        }

        pending.sort_by_key(|r| r.updated_at);
        Ok(pending)
    }
}
