//! Cryptographic hashing utilities
//!
//! SHA-256 is the 256-bit hash behind the canonical action digest, payload
//! hashes and program selectors. HASH160 (RIPEMD160 over SHA-256) derives
//! 20-byte identities.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// A 256-bit hash value
pub type Hash256 = [u8; 32];

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256(data));
    ripemd.finalize().into()
}

/// Left-pads an integer to a 32-byte big-endian word
pub fn u256_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}
