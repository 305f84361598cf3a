use super::address::Address;
use super::amount::Amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A scalar attached to a payment for audit and reconciliation.
///
/// The engine never interprets these; they are forwarded as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

pub type Metadata = BTreeMap<String, MetadataValue>;

/// A payment as described by the caller, before validation.
///
/// Fields hold raw caller input; nothing here is trusted until it has passed
/// through [`crate::application::validator::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Fixed-point decimal in whole stablecoin units, e.g. `"2.99"`.
    pub amount: String,
    pub recipient: String,
    pub description: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl PaymentRequest {
    pub fn new(
        amount: impl Into<String>,
        recipient: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            recipient: recipient.into(),
            description: description.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A request that passed validation. Only this form reaches a submitter.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    amount: Amount,
    recipient: Address,
    description: String,
    metadata: Metadata,
}

impl ValidatedRequest {
    pub(crate) fn new(
        amount: Amount,
        recipient: Address,
        description: String,
        metadata: Metadata,
    ) -> Self {
        Self {
            amount,
            recipient,
            description,
            metadata,
        }
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn recipient(&self) -> &Address {
        &self.recipient
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}
