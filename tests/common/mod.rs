#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use stablepay::application::engine::PaymentEngine;
use stablepay::config::EngineConfig;
use stablepay::domain::address::Address;
use stablepay::domain::amount::Balance;
use stablepay::domain::ports::{SettlementClient, Signer, Submitter};
use stablepay::domain::request::ValidatedRequest;
use stablepay::domain::transaction::{
    ConfirmationStatus, Receipt, TransactionHandle, TransferDescription, TransferInstruction,
};
use stablepay::error::{PaymentError, Result, SubmissionError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

pub const RECIPIENT: &str = "0xABC0000000000000000000000000000000000001";
pub const PAYER: &str = "0x1234567890123456789012345678901234567890";

/// Submitter that replays a fixed script of results, then fails transiently.
#[derive(Default)]
pub struct ScriptedSubmitter {
    results: Mutex<VecDeque<std::result::Result<TransactionHandle, SubmissionError>>>,
    calls: AtomicU32,
}

impl ScriptedSubmitter {
    pub fn new(
        results: Vec<std::result::Result<TransactionHandle, SubmissionError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(results.into()),
            calls: AtomicU32::new(0),
        })
    }

    pub fn always_transient() -> Arc<Self> {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Submitter for ScriptedSubmitter {
    async fn submit(
        &self,
        _request: &ValidatedRequest,
        _signer: &dyn Signer,
    ) -> std::result::Result<TransactionHandle, SubmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SubmissionError::transient("service unavailable")))
    }
}

/// Settlement service whose status and balance answers are scripted.
pub struct StubSettlement {
    statuses: Mutex<VecDeque<Result<ConfirmationStatus>>>,
    balance: Option<Balance>,
    status_calls: AtomicU32,
    balance_calls: AtomicU32,
    submit_calls: AtomicU32,
}

impl StubSettlement {
    /// Answers status queries from `statuses`, then "pending" forever.
    pub fn new(statuses: Vec<Result<ConfirmationStatus>>) -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(statuses.into()),
            balance: None,
            status_calls: AtomicU32::new(0),
            balance_calls: AtomicU32::new(0),
            submit_calls: AtomicU32::new(0),
        })
    }

    /// Pending `pending` times, then confirmed with one confirmation.
    pub fn confirming_after(pending: usize) -> Arc<Self> {
        let mut statuses: Vec<Result<ConfirmationStatus>> = (0..pending)
            .map(|_| Ok(ConfirmationStatus::pending(0)))
            .collect();
        statuses.push(Ok(ConfirmationStatus::confirmed(1, receipt())));
        Self::new(statuses)
    }

    pub fn never_confirming() -> Arc<Self> {
        Self::new(Vec::new())
    }

    pub fn with_balance(balance: Balance) -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(VecDeque::new()),
            balance: Some(balance),
            status_calls: AtomicU32::new(0),
            balance_calls: AtomicU32::new(0),
            submit_calls: AtomicU32::new(0),
        })
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn network_calls(&self) -> u32 {
        self.status_calls()
            + self.balance_calls.load(Ordering::SeqCst)
            + self.submit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettlementClient for StubSettlement {
    async fn submit_transfer(
        &self,
        _transfer: &TransferDescription,
    ) -> std::result::Result<TransactionHandle, SubmissionError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        Ok("tx-1".into())
    }

    async fn get_transaction_status(
        &self,
        _handle: &TransactionHandle,
    ) -> Result<ConfirmationStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ConfirmationStatus::pending(0)))
    }

    async fn get_balance(&self, _address: &Address) -> Result<Balance> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.balance
            .ok_or_else(|| PaymentError::ServiceError("balance unavailable".to_string()))
    }
}

/// Wallet with an address and no signing capability.
pub struct StubSigner(Address);

impl StubSigner {
    pub fn new() -> Self {
        Self(Address::parse(PAYER).unwrap())
    }
}

#[async_trait]
impl Signer for StubSigner {
    fn address(&self) -> &Address {
        &self.0
    }

    async fn send_transaction(
        &self,
        _instruction: &TransferInstruction,
    ) -> std::result::Result<TransactionHandle, SubmissionError> {
        Err(SubmissionError::permanent("signer refused"))
    }
}

pub fn receipt() -> Receipt {
    Receipt(json!({"status": "0x1", "blockNumber": "0x10"}))
}

pub fn engine(submitter: Arc<ScriptedSubmitter>, settlement: Arc<StubSettlement>) -> PaymentEngine {
    PaymentEngine::new(submitter, settlement, EngineConfig::default())
}
