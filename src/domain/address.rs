use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ADDRESS_LEN: usize = 20;

/// A settlement-network account address: `0x` followed by 20 hex-encoded bytes.
///
/// The textual form is kept as given (mixed-case checksummed addresses stay
/// intact); equality and hashing use the decoded bytes.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    text: String,
    bytes: [u8; ADDRESS_LEN],
}

impl Address {
    pub const LEN: usize = ADDRESS_LEN;

    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let text = text.trim();
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .ok_or_else(|| ValidationError::Recipient(format!("'{text}' must start with 0x")))?;

        if digits.len() != Self::LEN * 2 {
            return Err(ValidationError::Recipient(format!(
                "'{text}' must have {} hex digits",
                Self::LEN * 2
            )));
        }

        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| ValidationError::Recipient(format!("'{text}': {e}")))?;

        Ok(Self {
            text: format!("0x{digits}"),
            bytes,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.bytes
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl std::hash::Hash for Address {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.text
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
