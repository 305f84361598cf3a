//! Application layer orchestrating a payment from request to outcome.
//!
//! `PaymentEngine` is the entry point. It validates the request, drives the
//! `RetryCoordinator` around a `Submitter`, then waits on the
//! `ConfirmationPoller`. All collaborators are trait objects from
//! `crate::domain::ports`, so each can be swapped independently.

pub mod balance;
pub mod engine;
pub mod poller;
pub mod progress;
pub mod reconciler;
pub mod retry;
pub mod submitter;
pub mod validator;
