use crate::domain::address::Address;
use crate::domain::amount::Balance;
use crate::domain::ports::SharedSettlementClient;
use tracing::warn;

/// Advisory balance lookup used to pre-display affordability.
///
/// Never fails: any error reads as a zero balance. Submission does not depend
/// on it since the settlement service re-checks funds itself.
#[derive(Clone)]
pub struct BalanceQuery {
    client: SharedSettlementClient,
}

impl BalanceQuery {
    pub fn new(client: SharedSettlementClient) -> Self {
        Self { client }
    }

    pub async fn get_balance(&self, address: &Address) -> Balance {
        match self.client.get_balance(address).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!("Failed to get balance for {}: {}", address, e);
                Balance::ZERO
            }
        }
    }
}
