//! Adapters for the domain ports: settlement gateway over HTTP, a wallet
//! signer over JSON-RPC, and payment ledgers.

pub mod http;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod rpc_signer;
