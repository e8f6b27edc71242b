//! Threshold and required-subset policy
//!
//! A flat T-of-N quorum, optionally layered with a second quorum over a
//! distinguished subset of owners: either every member of the subset must
//! sign, or at least Tr of them.

use crate::crypto::Address;
use crate::multisig::config::{ConfigError, GateConfig};
use crate::multisig::error::GateError;
use crate::multisig::owners::OwnerRegistry;
use std::collections::BTreeSet;

/// Quorum rules evaluated over an already verified signer list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuorumPolicy {
    threshold: usize,
    required_indices: Vec<usize>,
    required: BTreeSet<Address>,
    required_threshold: Option<usize>,
}

impl QuorumPolicy {
    /// Resolve the policy of `config` against its owner registry
    pub fn new(config: &GateConfig, owners: &OwnerRegistry) -> Result<Self, ConfigError> {
        config.validate()?;

        let required = config
            .required_signers
            .iter()
            .map(|&index| {
                owners.owner(index).ok_or(ConfigError::RequiredIndexOutOfRange {
                    index,
                    owners: owners.len(),
                })
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Self {
            threshold: config.threshold,
            required_indices: config.required_signers.clone(),
            required,
            required_threshold: config.required_threshold,
        })
    }

    /// Minimum number of signatures (T)
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Owner indices of the required subset (R)
    pub fn required_indices(&self) -> &[usize] {
        &self.required_indices
    }

    /// How many members of R must sign
    pub fn required_quorum(&self) -> usize {
        self.required_threshold.unwrap_or(self.required.len())
    }

    /// Reject submissions that cannot reach T no matter who signed them
    pub fn check_count(&self, submitted: usize) -> Result<(), GateError> {
        if submitted < self.threshold {
            return Err(GateError::InsufficientSignatures {
                have: submitted,
                need: self.threshold,
            });
        }
        Ok(())
    }

    /// Evaluate the policy over distinct, owner-verified signers
    pub fn evaluate(&self, signers: &[Address]) -> Result<(), GateError> {
        self.check_count(signers.len())?;

        if self.required.is_empty() {
            return Ok(());
        }

        let have = signers
            .iter()
            .filter(|signer| self.required.contains(signer))
            .count();
        let need = self.required_quorum();
        if have < need {
            return Err(GateError::PolicyNotSatisfied { have, need });
        }

        Ok(())
    }
}
