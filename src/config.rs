use crate::application::poller::PollerConfig;
use crate::application::retry::RetryPolicy;
use crate::domain::address::Address;
use crate::error::Result;
use std::time::Duration;

/// Chain id of Base mainnet.
pub const BASE_CHAIN_ID: u64 = 8453;
/// USDC token contract on Base.
pub const USDC_CONTRACT_ADDRESS: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";
pub const DEFAULT_GATEWAY_URL: &str = "https://api.x402.com";

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub retry: RetryPolicy,
    pub poller: PollerConfig,
}

/// Where and how to reach the settlement service.
#[derive(Debug, Clone)]
pub struct SettlementConfig {
    pub base_url: String,
    pub chain_id: u64,
    pub token_contract: Address,
    pub request_timeout: Duration,
}

impl SettlementConfig {
    pub fn new(base_url: impl Into<String>, chain_id: u64) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            chain_id,
            token_contract: Address::parse(USDC_CONTRACT_ADDRESS)?,
            request_timeout: Duration::from_secs(30),
        })
    }
}
