use super::transaction::{Receipt, TransactionHandle};
use crate::error::ValidationError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why a payment ended in failure.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    #[error("{error}")]
    Validation { error: ValidationError },
    /// The settlement network or signer refused the transfer.
    #[error("payment rejected: {message}")]
    Rejected { message: String },
    /// Every attempt failed transiently; carries the last error.
    #[error("payment failed after retries: {message}")]
    RetriesExhausted { message: String },
    /// Submitted, but no confirmation arrived before the deadline.
    #[error("confirmation timeout")]
    ConfirmationTimeout { transaction_handle: TransactionHandle },
    /// The caller stopped waiting.
    #[error("payment cancelled")]
    Cancelled {
        transaction_handle: Option<TransactionHandle>,
    },
    /// The background task running the payment died.
    #[error("payment interrupted: {message}")]
    Interrupted { message: String },
}

impl FailureReason {
    /// `false` when the transfer may still land on-chain, so the charge has
    /// to be treated as "unknown, check later" rather than "never happened".
    pub fn is_definitive(&self) -> bool {
        !matches!(
            self,
            Self::ConfirmationTimeout { .. } | Self::Cancelled { .. } | Self::Interrupted { .. }
        )
    }

    /// The submitted transaction this failure refers to, if any.
    pub fn transaction_handle(&self) -> Option<&TransactionHandle> {
        match self {
            Self::ConfirmationTimeout { transaction_handle } => Some(transaction_handle),
            Self::Cancelled { transaction_handle } => transaction_handle.as_ref(),
            _ => None,
        }
    }
}

/// The single terminal result of one `pay()` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentOutcome {
    Success {
        transaction_handle: TransactionHandle,
        receipt: Receipt,
    },
    Failure {
        reason: FailureReason,
        attempts_made: u32,
        definitive: bool,
    },
}

impl PaymentOutcome {
    pub fn success(transaction_handle: TransactionHandle, receipt: Receipt) -> Self {
        Self::Success {
            transaction_handle,
            receipt,
        }
    }

    pub fn failure(reason: FailureReason, attempts_made: u32) -> Self {
        let definitive = reason.is_definitive();
        Self::Failure {
            reason,
            attempts_made,
            definitive,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn transaction_handle(&self) -> Option<&TransactionHandle> {
        match self {
            Self::Success {
                transaction_handle, ..
            } => Some(transaction_handle),
            Self::Failure { reason, .. } => reason.transaction_handle(),
        }
    }
}

/// Live notification emitted while a payment is in flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PaymentProgress {
    Submitting { attempt: u32 },
    AwaitingConfirmation { transaction_handle: TransactionHandle },
    Confirmations { count: u64 },
    Confirmed { transaction_handle: TransactionHandle },
    Failed { reason: String },
}

impl fmt::Display for PaymentProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitting { attempt: 1 } => f.write_str("processing..."),
            Self::Submitting { attempt } => write!(f, "processing... (attempt {attempt})"),
            Self::AwaitingConfirmation { transaction_handle } => {
                write!(f, "awaiting confirmation of {transaction_handle}")
            }
            Self::Confirmations { count } => write!(f, "{count} confirmations..."),
            Self::Confirmed { transaction_handle } => write!(f, "confirmed {transaction_handle}"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timeout_is_not_definitive() {
        let outcome = PaymentOutcome::failure(
            FailureReason::ConfirmationTimeout {
                transaction_handle: "tx-9".into(),
            },
            2,
        );
        assert!(matches!(
            outcome,
            PaymentOutcome::Failure {
                definitive: false,
                attempts_made: 2,
                ..
            }
        ));
        assert_eq!(outcome.transaction_handle(), Some(&"tx-9".into()));
    }

    #[test]
    fn test_rejection_is_definitive() {
        let outcome = PaymentOutcome::failure(
            FailureReason::Rejected {
                message: "insufficient funds".to_string(),
            },
            1,
        );
        assert!(matches!(
            outcome,
            PaymentOutcome::Failure {
                definitive: true,
                ..
            }
        ));
        assert_eq!(outcome.transaction_handle(), None);
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = PaymentOutcome::success("tx-1".into(), Receipt(json!({"block": 7})));
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"status": "success", "transaction_handle": "tx-1", "receipt": {"block": 7}})
        );

        let outcome = PaymentOutcome::failure(
            FailureReason::Validation {
                error: ValidationError::Description,
            },
            0,
        );
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "status": "failure",
                "reason": {"kind": "validation", "error": {"field": "description"}},
                "attempts_made": 0,
                "definitive": true
            })
        );
    }

    #[test]
    fn test_reason_display() {
        let reason = FailureReason::ConfirmationTimeout {
            transaction_handle: "tx-1".into(),
        };
        assert_eq!(reason.to_string(), "confirmation timeout");
        assert_eq!(
            PaymentProgress::Confirmations { count: 2 }.to_string(),
            "2 confirmations..."
        );
    }
}
