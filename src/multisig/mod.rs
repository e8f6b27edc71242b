//! Shared-custody authorization gate
//!
//! A fixed group of owners jointly controls an account. Any action on its
//! behalf needs a quorum of off-chain signatures over a canonical digest,
//! presented together in one call.
//!
//! # Example
//!
//! ```rust
//! use simple_multisig::crypto::{Address, KeyPair};
//! use simple_multisig::host::Ledger;
//! use simple_multisig::multisig::{ActionRequest, GateConfig};
//!
//! // Owners sign in ascending address order
//! let mut keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
//! keys.sort_by_key(|k| k.address());
//! let owners = keys.iter().map(|k| k.address()).collect();
//!
//! let mut ledger = Ledger::new();
//! let deployer = keys[0].address();
//! let gate = ledger.deploy_gate(deployer, GateConfig::new(2, owners)).unwrap();
//! ledger.credit(gate, 1_000).unwrap();
//!
//! // Collect a 2-of-3 quorum for a transfer
//! let recipient = Address::derive(b"recipient");
//! let request = ActionRequest::transfer(recipient, 100, Address::ZERO, 21_000);
//! let digest = ledger.gate(&gate).unwrap().digest(&request);
//! let sigs: Vec<_> = keys[..2].iter().map(|k| k.sign_digest(&digest)).collect();
//!
//! let receipt = ledger.execute(deployer, gate, &request, &sigs).unwrap();
//! assert_eq!(receipt.nonce, 0);
//! assert_eq!(ledger.balance(&recipient), 100);
//! ```

pub mod config;
pub mod error;
pub mod forwarder;
pub mod gate;
pub mod nonce;
pub mod owners;
pub mod policy;
pub mod verifier;

pub use config::{ConfigError, GateConfig, NoncePolicy};
pub use error::{GateError, Stage};
pub use forwarder::{CallOutcome, ExecutionReceipt, ForwardCall, ForwardError, Host};
pub use gate::Gate;
pub use nonce::Nonce;
pub use owners::OwnerRegistry;
pub use policy::QuorumPolicy;
pub use verifier::{verify_signatures, zip_components, ActionRequest};
