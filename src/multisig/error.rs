//! Rejection reasons for authorization attempts

use crate::crypto::Address;
use crate::multisig::forwarder::ForwardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stages an attempt passes through before it commits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Received,
    Verified,
    PolicyChecked,
    ExecutorChecked,
    Forwarded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Verified => "verified",
            Stage::PolicyChecked => "policy-checked",
            Stage::ExecutorChecked => "executor-checked",
            Stage::Forwarded => "forwarded",
        };
        f.write_str(name)
    }
}

/// Why an execution attempt was rejected
///
/// Every variant aborts the whole attempt. Nothing is retried.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("not enough signatures: have {have}, need {need}")]
    InsufficientSignatures { have: usize, need: usize },
    #[error("signature component arrays differ in length: v={v}, r={r}, s={s}")]
    MalformedSignatures { v: usize, r: usize, s: usize },
    #[error("signature {index} could not be recovered")]
    InvalidSignature { index: usize },
    #[error("signer not in increasing order: {signer} at index {index}")]
    UnsortedOrDuplicateSigner { index: usize, signer: Address },
    #[error("recovered signer is not an owner: {signer} at index {index}")]
    UnauthorizedSigner { index: usize, signer: Address },
    #[error("not enough final signers authorized the call: {have} of required set, need {need}")]
    PolicyNotSatisfied { have: usize, need: usize },
    #[error("caller {caller} is not the bound executor {executor}")]
    UnauthorizedExecutor { caller: Address, executor: Address },
    #[error("nonce exhausted")]
    NonceExhausted,
    #[error("forwarded call failed: {0}")]
    ForwardedEffectFailed(#[from] ForwardError),
}

impl GateError {
    /// The last stage the attempt reached before it was rolled back
    pub fn stage(&self) -> Stage {
        match self {
            GateError::InsufficientSignatures { .. }
            | GateError::MalformedSignatures { .. }
            | GateError::InvalidSignature { .. }
            | GateError::UnsortedOrDuplicateSigner { .. }
            | GateError::UnauthorizedSigner { .. } => Stage::Received,
            GateError::PolicyNotSatisfied { .. } => Stage::Verified,
            GateError::UnauthorizedExecutor { .. } => Stage::PolicyChecked,
            GateError::NonceExhausted => Stage::ExecutorChecked,
            GateError::ForwardedEffectFailed(_) => Stage::Forwarded,
        }
    }
}
