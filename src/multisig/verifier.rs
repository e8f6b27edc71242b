//! Canonical action digest and signature verification
//!
//! The digest binds every field of the action together with the gate's own
//! address and its current nonce, so a signature set authorizes exactly one
//! action on exactly one gate, once.

use crate::crypto::{recover_signer, sha256, u256_word, Address, Hash256, SignatureParts};
use crate::multisig::error::GateError;
use crate::multisig::owners::OwnerRegistry;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The action a signature set authorizes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Where the value and payload are forwarded
    pub destination: Address,
    /// Amount moved out of the gate
    pub value: u64,
    /// Call data handed to the destination
    #[serde(with = "hex")]
    pub payload: Vec<u8>,
    /// Who may submit; [`Address::ZERO`] lets anyone submit
    pub executor: Address,
    /// Gas made available to the forwarded call
    pub gas_limit: u64,
}

impl ActionRequest {
    /// A plain value transfer with no payload
    pub fn transfer(destination: Address, value: u64, executor: Address, gas_limit: u64) -> Self {
        Self {
            destination,
            value,
            payload: Vec::new(),
            executor,
            gas_limit,
        }
    }

    /// Canonical digest of this action for `gate` at `nonce`
    ///
    /// Layout: `gas_limit ‖ destination ‖ value ‖ sha256(payload) ‖ gate ‖
    /// executor ‖ nonce`, integers as 32-byte big-endian words, addresses as
    /// their raw 20 bytes.
    pub fn digest(&self, gate: &Address, nonce: u64) -> Hash256 {
        let mut hasher = Sha256::new();
        hasher.update(u256_word(self.gas_limit));
        hasher.update(self.destination.as_bytes());
        hasher.update(u256_word(self.value));
        hasher.update(sha256(&self.payload));
        hasher.update(gate.as_bytes());
        hasher.update(self.executor.as_bytes());
        hasher.update(u256_word(nonce));
        hasher.finalize().into()
    }
}

/// Zip separate `v`, `r`, `s` component arrays into signatures
pub fn zip_components(
    v: &[u8],
    r: &[[u8; 32]],
    s: &[[u8; 32]],
) -> Result<Vec<SignatureParts>, GateError> {
    if v.len() != r.len() || r.len() != s.len() {
        return Err(GateError::MalformedSignatures {
            v: v.len(),
            r: r.len(),
            s: s.len(),
        });
    }

    Ok(v.iter()
        .zip(r)
        .zip(s)
        .map(|((&v, &r), &s)| SignatureParts { v, r, s })
        .collect())
}

/// Recover and check every signer, in submission order
///
/// Each recovered identity must be strictly greater than the one before it
/// and must be an owner. Strict ordering is what rejects a repeated signer;
/// signatures are never re-sorted here.
pub fn verify_signatures(
    digest: &Hash256,
    signatures: &[SignatureParts],
    owners: &OwnerRegistry,
) -> Result<Vec<Address>, GateError> {
    let mut signers: Vec<Address> = Vec::with_capacity(signatures.len());
    let mut last = Address::ZERO;

    for (index, signature) in signatures.iter().enumerate() {
        let signer = recover_signer(digest, signature).map_err(|e| {
            log::debug!("Signature {} failed recovery: {}", index, e);
            GateError::InvalidSignature { index }
        })?;

        if signer <= last {
            return Err(GateError::UnsortedOrDuplicateSigner { index, signer });
        }
        if !owners.is_owner(&signer) {
            return Err(GateError::UnauthorizedSigner { index, signer });
        }

        signers.push(signer);
        last = signer;
    }

    Ok(signers)
}
