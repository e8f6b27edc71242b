//! Execution forwarding seam
//!
//! The gate never moves value itself. Once an attempt is authorized it hands
//! the effect to the [`Host`] it runs on, which must apply the call fully or
//! not at all.

use crate::crypto::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a forwarded call fails
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForwardError {
    #[error("Out of gas: limit {limit}, needed {needed}")]
    OutOfGas { limit: u64, needed: u64 },
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u64, need: u64 },
    #[error("Balance overflow at {0}")]
    BalanceOverflow(Address),
    #[error("Call reverted: {0}")]
    Reverted(String),
}

/// A value transfer plus payload, bounded by a gas limit
#[derive(Clone, Copy, Debug)]
pub struct ForwardCall<'a> {
    pub from: Address,
    pub to: Address,
    pub value: u64,
    pub payload: &'a [u8],
    pub gas_limit: u64,
}

/// Outcome of a successful forwarded call
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutcome {
    pub gas_used: u64,
    #[serde(with = "hex")]
    pub return_data: Vec<u8>,
}

/// The execution environment a gate forwards effects through
pub trait Host {
    /// Apply `call` atomically: on error no balance or state may change
    fn forward(&mut self, call: ForwardCall<'_>) -> Result<CallOutcome, ForwardError>;
}

/// Record of one committed execution
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    pub gate: Address,
    /// Nonce value this execution consumed
    pub nonce: u64,
    pub signers: Vec<Address>,
    pub destination: Address,
    pub value: u64,
    pub gas_used: u64,
    #[serde(with = "hex")]
    pub return_data: Vec<u8>,
}
