//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 and HASH160 hashing
//! - 20-byte account identities
//! - ECDSA key management with recoverable signatures (secp256k1)

pub mod address;
pub mod hash;
pub mod keys;

pub use address::{Address, AddressError};
pub use hash::{hash160, sha256, u256_word, Hash256};
pub use keys::{recover_signer, sign_digest, KeyError, KeyPair, SignatureParts};
