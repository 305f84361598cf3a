use super::address::Address;
use super::amount::Balance;
use super::record::PaymentRecord;
use super::request::ValidatedRequest;
use super::transaction::{
    ConfirmationStatus, TransactionHandle, TransferDescription, TransferInstruction,
};
use crate::error::{Result, SubmissionError};
use async_trait::async_trait;
use std::sync::Arc;

/// Network transport to the settlement service.
///
/// Shared by every in-flight payment, so implementations must be safe for
/// concurrent use.
#[async_trait]
pub trait SettlementClient: Send + Sync {
    async fn submit_transfer(
        &self,
        transfer: &TransferDescription,
    ) -> std::result::Result<TransactionHandle, SubmissionError>;
    async fn get_transaction_status(&self, handle: &TransactionHandle)
    -> Result<ConfirmationStatus>;
    async fn get_balance(&self, address: &Address) -> Result<Balance>;
}

/// The payer's signing identity, supplied by the wallet connection.
#[async_trait]
pub trait Signer: Send + Sync {
    fn address(&self) -> &Address;
    async fn send_transaction(
        &self,
        instruction: &TransferInstruction,
    ) -> std::result::Result<TransactionHandle, SubmissionError>;
}

/// Turns a validated request into a submitted transfer.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(
        &self,
        request: &ValidatedRequest,
        signer: &dyn Signer,
    ) -> std::result::Result<TransactionHandle, SubmissionError>;
}

#[async_trait]
pub trait PaymentLedger: Send + Sync {
    async fn record(&self, record: PaymentRecord) -> Result<()>;
    async fn get(&self, handle: &TransactionHandle) -> Result<Option<PaymentRecord>>;
    async fn unconfirmed(&self) -> Result<Vec<PaymentRecord>>;
}

pub type SharedSettlementClient = Arc<dyn SettlementClient>;
pub type SharedSigner = Arc<dyn Signer>;
pub type SharedSubmitter = Arc<dyn Submitter>;
pub type SharedPaymentLedger = Arc<dyn PaymentLedger>;
