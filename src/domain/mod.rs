//! Payment domain: value objects, outcomes and the ports the engine talks through.

pub mod address;
pub mod amount;
pub mod feature;
pub mod outcome;
pub mod ports;
pub mod record;
pub mod request;
pub mod transaction;
