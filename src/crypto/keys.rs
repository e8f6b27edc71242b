//! ECDSA key management and signer recovery
//!
//! Provides key pair generation, recoverable signing, and public-key
//! recovery using the secp256k1 elliptic curve.

use rand::rngs::OsRng;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::address::Address;
use super::hash::Hash256;

/// Offset added to the recovery id in the `v` component
pub const RECOVERY_ID_OFFSET: u8 = 27;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid recovery id: v = {0}")]
    InvalidRecoveryId(u8),
    #[error("Invalid signature encoding: {0}")]
    InvalidEncoding(String),
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// The `(v, r, s)` components of one recoverable signature
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureParts {
    pub v: u8,
    #[serde(with = "hex")]
    pub r: [u8; 32],
    #[serde(with = "hex")]
    pub s: [u8; 32],
}

impl SignatureParts {
    /// Parse the compact 65-byte `r || s || v` hex form
    pub fn from_hex(text: &str) -> Result<Self, KeyError> {
        let trimmed = text.strip_prefix("0x").unwrap_or(text);
        let bytes =
            hex::decode(trimmed).map_err(|e| KeyError::InvalidEncoding(e.to_string()))?;
        if bytes.len() != 65 {
            return Err(KeyError::InvalidEncoding(format!(
                "expected 65 bytes, got {}",
                bytes.len()
            )));
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { v: bytes[64], r, s })
    }

    /// Encode as compact 65-byte `r || s || v` hex
    pub fn to_hex(&self) -> String {
        let mut bytes = Vec::with_capacity(65);
        bytes.extend_from_slice(&self.r);
        bytes.extend_from_slice(&self.s);
        bytes.push(self.v);
        hex::encode(bytes)
    }

    fn to_recoverable(self) -> Result<RecoverableSignature, KeyError> {
        let recid = self
            .v
            .checked_sub(RECOVERY_ID_OFFSET)
            .filter(|id| *id <= 1)
            .ok_or(KeyError::InvalidRecoveryId(self.v))?;
        let recid = RecoveryId::from_i32(i32::from(recid))?;

        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(&self.r);
        compact[32..].copy_from_slice(&self.s);
        Ok(RecoverableSignature::from_compact(&compact, recid)?)
    }
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// The identity this key signs as
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }

    /// Sign a 32-byte digest, producing recoverable `(v, r, s)` components
    pub fn sign_digest(&self, digest: &Hash256) -> SignatureParts {
        sign_digest(&self.secret_key, digest)
    }
}

/// Sign a 32-byte digest with a secret key
pub fn sign_digest(secret_key: &SecretKey, digest: &Hash256) -> SignatureParts {
    let secp = Secp256k1::signing_only();
    let message = Message::from_digest(*digest);
    let (recid, compact) = secp
        .sign_ecdsa_recoverable(&message, secret_key)
        .serialize_compact();

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&compact[..32]);
    s.copy_from_slice(&compact[32..]);

    // recovery ids from signing are always 0 or 1
    let v = RECOVERY_ID_OFFSET + recid.to_i32() as u8;
    SignatureParts { v, r, s }
}

/// Recover the identity that produced `signature` over `digest`
pub fn recover_signer(digest: &Hash256, signature: &SignatureParts) -> Result<Address, KeyError> {
    let secp = Secp256k1::verification_only();
    let message = Message::from_digest(*digest);
    let recoverable = signature.to_recoverable()?;
    let public_key = secp.recover_ecdsa(&message, &recoverable)?;
    Ok(Address::from_public_key(&public_key))
}
