use crate::config::SettlementConfig;
use crate::domain::address::Address;
use crate::domain::ports::{SharedSettlementClient, Signer, Submitter};
use crate::domain::request::ValidatedRequest;
use crate::domain::transaction::{TransactionHandle, TransferDescription, TransferInstruction};
use crate::error::SubmissionError;
use async_trait::async_trait;
use tracing::debug;

/// Function selector of ERC-20 `transfer(address,uint256)`.
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// ABI-encodes `transfer(to, amount)` as `0x`-prefixed hex call data.
pub fn encode_transfer_call(to: &Address, amount: u128) -> String {
    let mut data = Vec::with_capacity(4 + 32 + 32);
    data.extend_from_slice(&TRANSFER_SELECTOR);
    data.extend_from_slice(&[0u8; 32 - Address::LEN]);
    data.extend_from_slice(to.as_bytes());
    data.extend_from_slice(&[0u8; 16]);
    data.extend_from_slice(&amount.to_be_bytes());
    format!("0x{}", hex::encode(data))
}

/// Delegates the transfer to a payment-facilitation gateway.
pub struct GatewaySubmitter {
    client: SharedSettlementClient,
    token: Address,
    chain_id: u64,
}

impl GatewaySubmitter {
    pub fn new(client: SharedSettlementClient, config: &SettlementConfig) -> Self {
        Self {
            client,
            token: config.token_contract.clone(),
            chain_id: config.chain_id,
        }
    }
}

#[async_trait]
impl Submitter for GatewaySubmitter {
    async fn submit(
        &self,
        request: &ValidatedRequest,
        signer: &dyn Signer,
    ) -> Result<TransactionHandle, SubmissionError> {
        let transfer = TransferDescription {
            amount: request.amount().to_base_units().to_string(),
            recipient: request.recipient().clone(),
            token: self.token.clone(),
            chain: self.chain_id,
            payer: signer.address().clone(),
            description: request.description().to_string(),
            metadata: request.metadata().clone(),
        };
        debug!(
            "Submitting {} base units to {} via gateway",
            transfer.amount, transfer.recipient
        );
        self.client.submit_transfer(&transfer).await
    }
}

/// Builds the token-transfer call itself and has the signer execute it.
pub struct DirectSubmitter {
    token: Address,
    chain_id: u64,
}

impl DirectSubmitter {
    pub fn new(config: &SettlementConfig) -> Self {
        Self {
            token: config.token_contract.clone(),
            chain_id: config.chain_id,
        }
    }
}

#[async_trait]
impl Submitter for DirectSubmitter {
    async fn submit(
        &self,
        request: &ValidatedRequest,
        signer: &dyn Signer,
    ) -> Result<TransactionHandle, SubmissionError> {
        let instruction = TransferInstruction {
            from: signer.address().clone(),
            to: self.token.clone(),
            data: encode_transfer_call(request.recipient(), request.amount().to_base_units()),
            chain_id: self.chain_id,
        };
        debug!(
            "Sending token transfer from {} to contract {}",
            instruction.from, instruction.to
        );
        signer.send_transaction(&instruction).await
    }
}
