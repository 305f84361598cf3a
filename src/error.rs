use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

/// Why a payment request was refused before anything touched the network.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "field", content = "message", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("invalid payment amount: {0}")]
    Amount(String),
    #[error("invalid recipient address: {0}")]
    Recipient(String),
    #[error("payment description is required")]
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionErrorKind {
    /// Timeouts, rate limits, temporary unavailability. Safe to retry unchanged.
    Transient,
    /// Rejected outright. Retrying the same request fails the same way.
    Permanent,
}

impl fmt::Display for SubmissionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => f.write_str("transient"),
            Self::Permanent => f.write_str("permanent"),
        }
    }
}

/// Failure to hand a transfer to the settlement network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} submission error: {message}")]
pub struct SubmissionError {
    pub kind: SubmissionErrorKind,
    pub message: String,
}

impl SubmissionError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: SubmissionErrorKind::Transient,
            message: message.into(),
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: SubmissionErrorKind::Permanent,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == SubmissionErrorKind::Transient
    }
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),
    #[error("Submission error: {0}")]
    SubmissionError(#[from] SubmissionError),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Settlement service error: {0}")]
    ServiceError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_error_classification() {
        assert!(SubmissionError::transient("rate limited").is_transient());
        assert!(!SubmissionError::permanent("insufficient funds").is_transient());
    }

    #[test]
    fn test_submission_error_display() {
        let err = SubmissionError::permanent("signer refused");
        assert_eq!(err.to_string(), "permanent submission error: signer refused");
    }

    #[test]
    fn test_validation_error_wraps_into_payment_error() {
        let err: PaymentError = ValidationError::Description.into();
        assert_eq!(
            err.to_string(),
            "Validation error: payment description is required"
        );
    }
}
