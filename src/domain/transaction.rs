use super::address::Address;
use super::request::Metadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier the settlement service hands back for a submitted transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionHandle(String);

impl TransactionHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TransactionHandle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TransactionHandle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque settlement-service payload proving a transfer was confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Receipt(pub Value);

impl Receipt {
    /// Minimal receipt for services that confirm without returning one.
    pub fn synthesized(handle: &TransactionHandle, confirmations: u64) -> Self {
        Self(serde_json::json!({
            "transactionHash": handle.as_str(),
            "confirmations": confirmations,
        }))
    }
}

/// One snapshot of a transaction's confirmation state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfirmationStatus {
    pub confirmed: bool,
    pub confirmation_count: u64,
    pub receipt: Option<Receipt>,
}

impl ConfirmationStatus {
    pub fn pending(confirmation_count: u64) -> Self {
        Self {
            confirmed: false,
            confirmation_count,
            receipt: None,
        }
    }

    pub fn confirmed(confirmation_count: u64, receipt: Receipt) -> Self {
        Self {
            confirmed: true,
            confirmation_count,
            receipt: Some(receipt),
        }
    }

    /// Whether this snapshot satisfies the confirmation threshold.
    pub fn is_final(&self, required_confirmations: u64) -> bool {
        self.confirmed && self.confirmation_count >= required_confirmations.max(1)
    }
}

/// Structured transfer handed to a payment-facilitation gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDescription {
    /// Integer amount in token base units, as a decimal string.
    pub amount: String,
    pub recipient: Address,
    pub token: Address,
    pub chain: u64,
    pub payer: Address,
    pub description: String,
    pub metadata: Metadata,
}

/// Raw token-transfer call, executed on-chain by the signer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInstruction {
    pub from: Address,
    /// The token contract being called.
    pub to: Address,
    /// `0x`-prefixed ABI-encoded call data.
    pub data: String,
    pub chain_id: u64,
}
