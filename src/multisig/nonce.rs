//! Anti-replay sequence number

use crate::multisig::error::GateError;
use serde::{Deserialize, Serialize};

/// Monotonic counter bound into every action digest
///
/// Starts at zero and only ever moves forward by one, through
/// [`Nonce::consume`], which only the execution path calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(u64);

impl Nonce {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Advance by one, returning the value that was consumed
    pub(crate) fn consume(&mut self) -> Result<u64, GateError> {
        let consumed = self.0;
        self.0 = consumed.checked_add(1).ok_or(GateError::NonceExhausted)?;
        Ok(consumed)
    }

    /// Undo a consume whose forwarded call failed
    pub(crate) fn restore(&mut self, consumed: u64) {
        debug_assert_eq!(self.0, consumed + 1);
        self.0 = consumed;
    }
}
