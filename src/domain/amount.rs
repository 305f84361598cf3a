use crate::error::ValidationError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fractional digits of the settlement token (USDC).
pub const TOKEN_DECIMALS: u32 = 6;

/// A spendable stablecoin balance, expressed in whole token units.
///
/// This is a wrapper around `rust_decimal::Decimal`, always carrying at most
/// [`TOKEN_DECIMALS`] fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Converts an integer amount of the token's smallest unit into a balance.
    ///
    /// Returns `None` when the value does not fit a `Decimal`.
    pub fn from_base_units(units: i128) -> Option<Self> {
        Decimal::try_from_i128_with_scale(units, TOKEN_DECIMALS)
            .ok()
            .map(|value| Self(value.normalize()))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Whether this balance covers `amount`.
    pub fn covers(&self, amount: &Amount) -> bool {
        self.0 >= amount.value()
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A positive payment amount that is exactly representable in token base units.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount {
    value: Decimal,
    base_units: u128,
}

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value <= Decimal::ZERO {
            return Err(ValidationError::Amount(
                "amount must be positive".to_string(),
            ));
        }

        let value = value.normalize();
        if value.scale() > TOKEN_DECIMALS {
            return Err(ValidationError::Amount(format!(
                "at most {TOKEN_DECIMALS} decimal places are supported"
            )));
        }

        let base_units = value
            .checked_mul(Decimal::from(10u64.pow(TOKEN_DECIMALS)))
            .and_then(|units| units.to_u128())
            .ok_or_else(|| ValidationError::Amount("amount is too large".to_string()))?;

        Ok(Self { value, base_units })
    }

    /// Parses a plain fixed-point decimal such as `"2.99"`.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::Amount("amount is required".to_string()));
        }
        let value = Decimal::from_str(text)
            .map_err(|_| ValidationError::Amount(format!("'{text}' is not a decimal number")))?;
        Self::new(value)
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    /// The amount in the token's smallest unit (`value * 10^6`).
    pub fn to_base_units(&self) -> u128 {
        self.base_units
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
