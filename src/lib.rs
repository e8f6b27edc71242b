//! Simple-Multisig: a shared-custody authorization gate in Rust
//!
//! This crate provides:
//! - M-of-N owner quorums with an optional required-signer sub-quorum
//! - Recoverable ECDSA signatures (secp256k1) over a canonical action digest
//! - Strictly ascending signer order as the duplicate check
//! - Nonce-based replay protection
//! - Atomic forwarding of value and payload under a gas limit
//! - An in-memory host ledger with JSON persistence
//!
//! # Example
//!
//! ```rust
//! use simple_multisig::crypto::{Address, KeyPair};
//! use simple_multisig::host::{Ledger, Registry};
//! use simple_multisig::multisig::{ActionRequest, GateConfig};
//!
//! let mut keys: Vec<KeyPair> = (0..2).map(|_| KeyPair::generate()).collect();
//! keys.sort_by_key(|k| k.address());
//! let owners = keys.iter().map(|k| k.address()).collect();
//!
//! let mut ledger = Ledger::new();
//! let gate = ledger.deploy_gate(keys[0].address(), GateConfig::new(2, owners)).unwrap();
//! let registry = ledger.deploy_builtin(keys[0].address(), Registry::NAME).unwrap();
//!
//! // Both owners approve a call into the registry
//! let request = ActionRequest {
//!     destination: registry,
//!     value: 0,
//!     payload: Registry::register_call(12345),
//!     executor: Address::ZERO,
//!     gas_limit: 100_000,
//! };
//! let digest = ledger.gate(&gate).unwrap().digest(&request);
//! let sigs: Vec<_> = keys.iter().map(|k| k.sign_digest(&digest)).collect();
//! ledger.execute(keys[1].address(), gate, &request, &sigs).unwrap();
//!
//! let storage = ledger.program_storage(&registry).unwrap();
//! assert_eq!(Registry::registered(storage, &gate), Some(12345));
//! ```

pub mod cli;
pub mod crypto;
pub mod host;
pub mod multisig;
pub mod storage;

// Re-export commonly used types
pub use crypto::{Address, KeyPair, SignatureParts};
pub use host::{Ledger, LedgerError, Program, Registry};
pub use multisig::{
    ActionRequest, ExecutionReceipt, Gate, GateConfig, GateError, Host, NoncePolicy,
};
pub use storage::{Storage, StorageConfig};
