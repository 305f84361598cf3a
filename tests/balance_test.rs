mod common;

use common::{PAYER, StubSettlement};
use rust_decimal_macros::dec;
use stablepay::application::balance::BalanceQuery;
use stablepay::domain::address::Address;
use stablepay::domain::amount::{Amount, Balance};

#[tokio::test]
async fn test_balance_is_zero_when_client_errors() {
    let query = BalanceQuery::new(StubSettlement::never_confirming());
    let balance = query.get_balance(&Address::parse(PAYER).unwrap()).await;
    assert_eq!(balance, Balance::ZERO);
}

#[tokio::test]
async fn test_balance_passes_through() {
    let settlement = StubSettlement::with_balance(Balance::new(dec!(10.5)));
    let query = BalanceQuery::new(settlement.clone());

    let balance = query.get_balance(&Address::parse(PAYER).unwrap()).await;
    assert_eq!(balance.value(), dec!(10.5));
    assert!(balance.covers(&Amount::new(dec!(9.99)).unwrap()));
    assert!(!balance.covers(&Amount::new(dec!(10.51)).unwrap()));
    assert_eq!(settlement.network_calls(), 1);
}
