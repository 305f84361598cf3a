use super::address::Address;
use super::request::ValidatedRequest;
use super::transaction::{Receipt, TransactionHandle};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum SettlementState {
    Confirmed,
    /// Submitted but not seen confirmed yet; may still settle.
    Unconfirmed,
}

/// Ledger entry for one submitted payment.
///
/// Keeps enough of the request to reconcile a payment whose confirmation
/// never arrived while the caller was waiting.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentRecord {
    pub transaction_handle: TransactionHandle,
    pub amount: Decimal,
    pub recipient: Address,
    pub description: String,
    pub state: SettlementState,
    pub receipt: Option<Receipt>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn new(
        transaction_handle: TransactionHandle,
        request: &ValidatedRequest,
        state: SettlementState,
    ) -> Self {
        Self {
            transaction_handle,
            amount: request.amount().value(),
            recipient: request.recipient().clone(),
            description: request.description().to_string(),
            state,
            receipt: None,
            updated_at: Utc::now(),
        }
    }

    pub fn confirm(&mut self, receipt: Receipt) {
        self.state = SettlementState::Confirmed;
        self.receipt = Some(receipt);
        self.updated_at = Utc::now();
    }
}
