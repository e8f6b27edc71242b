//! Gas metering for forwarded calls

use crate::multisig::ForwardError;

/// Flat cost of any forwarded call
pub const CALL_GAS: u64 = 21_000;

/// Cost per payload byte
pub const PAYLOAD_BYTE_GAS: u64 = 16;

/// Gas cost for storage write
pub const SSTORE_GAS: u64 = 5000;

/// Gas cost for storage read
pub const SLOAD_GAS: u64 = 200;

/// Tracks gas against the limit the caller supplied
#[derive(Debug, Clone)]
pub struct GasMeter {
    limit: u64,
    used: u64,
}

impl GasMeter {
    pub fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    /// Consume gas, failing once the limit would be exceeded
    pub fn charge(&mut self, amount: u64) -> Result<(), ForwardError> {
        let needed = self.used.saturating_add(amount);
        if needed > self.limit {
            return Err(ForwardError::OutOfGas {
                limit: self.limit,
                needed,
            });
        }
        self.used = needed;
        Ok(())
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    /// Intrinsic cost of forwarding `payload_len` bytes
    pub fn intrinsic(payload_len: usize) -> u64 {
        CALL_GAS.saturating_add(PAYLOAD_BYTE_GAS.saturating_mul(payload_len as u64))
    }
}
