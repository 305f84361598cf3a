use crate::domain::address::Address;
use crate::domain::amount::Amount;
use crate::domain::request::{PaymentRequest, ValidatedRequest};
use crate::error::ValidationError;

/// Checks that a request is well-formed and returns its typed form.
///
/// Pure and synchronous: rejects a non-positive or unparseable amount, a
/// recipient that is not a settlement-network address, and an empty
/// description.
pub fn validate(request: &PaymentRequest) -> Result<ValidatedRequest, ValidationError> {
    let amount = Amount::parse(&request.amount)?;
    let recipient = Address::parse(&request.recipient)?;

    let description = request.description.trim();
    if description.is_empty() {
        return Err(ValidationError::Description);
    }

    Ok(ValidatedRequest::new(
        amount,
        recipient,
        description.to_string(),
        request.metadata.clone(),
    ))
}
