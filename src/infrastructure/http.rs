use crate::config::SettlementConfig;
use crate::domain::address::Address;
use crate::domain::amount::Balance;
use crate::domain::ports::SettlementClient;
use crate::domain::transaction::{
    ConfirmationStatus, Receipt, TransactionHandle, TransferDescription,
};
use crate::error::{PaymentError, Result, SubmissionError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

/// Header carrying the settlement chain id on every request.
pub const CHAIN_ID_HEADER: &str = "X-Chain-ID";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    #[serde(default)]
    success: bool,
    transaction_hash: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    confirmed: bool,
    #[serde(default)]
    confirmations: u64,
    receipt: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BaseUnits {
    Text(String),
    Number(i128),
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: BaseUnits,
}

/// Whether an HTTP status is worth retrying unchanged.
pub fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// Classifies a transport-level failure: anything that never produced a
/// response is transient, a malformed body is not.
fn classify_transport(error: reqwest::Error) -> SubmissionError {
    if error.is_timeout() || error.is_connect() || error.is_request() {
        SubmissionError::transient(format!("gateway unreachable: {}", error))
    } else {
        SubmissionError::permanent(format!("gateway request failed: {}", error))
    }
}

/// JSON-over-HTTP client for a payment-facilitation gateway.
#[derive(Clone)]
pub struct HttpSettlementClient {
    client: Client,
    base_url: Url,
    chain_id: u64,
}

impl HttpSettlementClient {
    pub fn new(config: &SettlementConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            PaymentError::ConfigError(format!("invalid gateway URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PaymentError::ConfigError(format!(
                "gateway URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url,
            chain_id: config.chain_id,
        })
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                PaymentError::ConfigError(format!("{} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn with_chain(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(CHAIN_ID_HEADER, self.chain_id.to_string())
    }
}

#[async_trait]
impl SettlementClient for HttpSettlementClient {
    async fn submit_transfer(
        &self,
        transfer: &TransferDescription,
    ) -> std::result::Result<TransactionHandle, SubmissionError> {
        debug!(
            "POST /payments/usdc: {} base units to {}",
            transfer.amount, transfer.recipient
        );

        let url = self
            .endpoint(&["payments", "usdc"])
            .map_err(|e| SubmissionError::permanent(e.to_string()))?;
        let response = self
            .with_chain(self.client.post(url))
            .json(transfer)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("gateway returned {}: {}", status, body.trim());
            return Err(if is_transient_status(status) {
                SubmissionError::transient(message)
            } else {
                SubmissionError::permanent(message)
            });
        }

        // The gateway may already have moved funds; an unreadable body must
        // not be retried.
        let body: SubmitResponse = response.json().await.map_err(|e| {
            SubmissionError::permanent(format!("unreadable gateway response: {}", e))
        })?;

        match body {
            SubmitResponse {
                success: true,
                transaction_hash: Some(hash),
                ..
            } => {
                info!("Gateway accepted transfer: {}", hash);
                Ok(TransactionHandle::new(hash))
            }
            SubmitResponse { error, .. } => Err(SubmissionError::permanent(
                error.unwrap_or_else(|| "payment failed".to_string()),
            )),
        }
    }

    async fn get_transaction_status(
        &self,
        handle: &TransactionHandle,
    ) -> Result<ConfirmationStatus> {
        let url = self.endpoint(&["payments", "status", handle.as_str()])?;
        let response = self.with_chain(self.client.get(url)).send().await?;

        if !response.status().is_success() {
            return Err(PaymentError::ServiceError(format!(
                "status query for {} returned {}",
                handle,
                response.status()
            )));
        }

        let body: StatusResponse = response.json().await?;
        Ok(ConfirmationStatus {
            confirmed: body.confirmed,
            confirmation_count: body.confirmations,
            receipt: body.receipt.filter(|r| !r.is_null()).map(Receipt),
        })
    }

    async fn get_balance(&self, address: &Address) -> Result<Balance> {
        let url = self.endpoint(&["balances", "usdc", address.as_str()])?;
        let response = self.with_chain(self.client.get(url)).send().await?;

        if !response.status().is_success() {
            return Err(PaymentError::ServiceError(format!(
                "balance query for {} returned {}",
                address,
                response.status()
            )));
        }

        let body: BalanceResponse = response.json().await?;
        let units = match body.balance {
            BaseUnits::Number(units) => units,
            BaseUnits::Text(text) => text.trim().parse::<i128>().map_err(|e| {
                PaymentError::ServiceError(format!("invalid balance '{}': {}", text, e))
            })?,
        };

        Balance::from_base_units(units)
            .ok_or_else(|| PaymentError::ServiceError(format!("balance {} out of range", units)))
    }
}
