use crate::domain::address::Address;
use crate::domain::ports::Signer;
use crate::domain::transaction::{TransactionHandle, TransferInstruction};
use crate::error::{Result, SubmissionError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};

/// EIP-1193 "user rejected request".
pub const USER_REJECTED: i64 = 4001;

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Signs by delegating to a wallet node that holds the payer's key.
pub struct JsonRpcSigner {
    client: Client,
    endpoint: String,
    address: Address,
}

impl JsonRpcSigner {
    pub fn new(endpoint: impl Into<String>, address: Address) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            address,
        })
    }

    async fn rpc_call(
        &self,
        method: &str,
        params: Value,
    ) -> std::result::Result<Value, SubmissionError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        debug!("Wallet RPC call: {}", method);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| SubmissionError::transient(format!("Wallet RPC request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = format!("Wallet RPC returned status: {}", status);
            return Err(if status.is_server_error() {
                SubmissionError::transient(message)
            } else {
                SubmissionError::permanent(message)
            });
        }

        let body: JsonRpcResponse = response.json().await.map_err(|e| {
            SubmissionError::permanent(format!("Failed to parse wallet RPC response: {}", e))
        })?;

        if let Some(error) = body.error {
            warn!("Wallet RPC error {}: {}", error.code, error.message);
            let message = if error.code == USER_REJECTED {
                format!("signer refused: {}", error.message)
            } else {
                format!("wallet error {}: {}", error.code, error.message)
            };
            return Err(SubmissionError::permanent(message));
        }

        body.result
            .ok_or_else(|| SubmissionError::permanent("Wallet RPC returned no result"))
    }
}

#[async_trait]
impl Signer for JsonRpcSigner {
    fn address(&self) -> &Address {
        &self.address
    }

    async fn send_transaction(
        &self,
        instruction: &TransferInstruction,
    ) -> std::result::Result<TransactionHandle, SubmissionError> {
        let params = json!([{
            "from": instruction.from,
            "to": instruction.to,
            "data": instruction.data,
            "chainId": format!("0x{:x}", instruction.chain_id),
        }]);

        let result = self.rpc_call("eth_sendTransaction", params).await?;
        let hash = result.as_str().ok_or_else(|| {
            SubmissionError::permanent(format!("unexpected transaction hash: {}", result))
        })?;

        info!("Wallet sent transaction {}", hash);
        Ok(TransactionHandle::new(hash))
    }
}
