//! Host execution environment
//!
//! An in-memory ledger standing in for the chain a gate is deployed on. It
//! supplies the "forward value and payload under a gas limit" primitive and
//! keeps every transition atomic.

pub mod gas;
pub mod ledger;
pub mod program;

pub use gas::{GasMeter, CALL_GAS, PAYLOAD_BYTE_GAS, SLOAD_GAS, SSTORE_GAS};
pub use ledger::{Ledger, LedgerError};
pub use program::{builtin, selector, CallContext, CallEnv, Program, ProgramStorage, Registry};
