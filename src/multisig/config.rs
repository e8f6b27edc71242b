//! Gate construction parameters
//!
//! A [`GateConfig`] is plain data (built from CLI flags or loaded from a JSON
//! file). [`GateConfig::validate`] checks every construction rule before a
//! gate is created from it.

use crate::crypto::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors in gate construction parameters
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Owner list is empty")]
    NoOwners,
    #[error("The zero address cannot be an owner")]
    ZeroOwner,
    #[error("Duplicate owner: {0}")]
    DuplicateOwner(Address),
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),
    #[error("Required signer index {index} out of range for {owners} owners")]
    RequiredIndexOutOfRange { index: usize, owners: usize },
    #[error("Duplicate required signer index: {0}")]
    DuplicateRequiredIndex(usize),
    #[error("Invalid required threshold: {0}")]
    InvalidRequiredThreshold(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// What happens to the nonce when the forwarded call fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoncePolicy {
    /// The nonce advance is undone together with the failed call
    #[default]
    RollbackOnFailure,
    /// The nonce stays consumed; the signature set is burned
    ConsumeOnFailure,
}

/// Parameters a gate is constructed from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Minimum number of owner signatures (T)
    pub threshold: usize,
    /// Owner identities (N)
    pub owners: Vec<Address>,
    /// Indices into `owners` forming the required subset (R)
    #[serde(default)]
    pub required_signers: Vec<usize>,
    /// How many of R must sign; all of R when unset (Tr)
    #[serde(default)]
    pub required_threshold: Option<usize>,
    #[serde(default)]
    pub nonce_policy: NoncePolicy,
}

impl GateConfig {
    /// Plain T-of-N configuration without a required subset
    pub fn new(threshold: usize, owners: Vec<Address>) -> Self {
        Self {
            threshold,
            owners,
            required_signers: Vec::new(),
            required_threshold: None,
            nonce_policy: NoncePolicy::default(),
        }
    }

    /// Require signatures from the owners at `indices`
    pub fn with_required_signers(mut self, indices: Vec<usize>) -> Self {
        self.required_signers = indices;
        self
    }

    /// Require only `threshold` of the required subset
    pub fn with_required_threshold(mut self, threshold: usize) -> Self {
        self.required_threshold = Some(threshold);
        self
    }

    pub fn with_nonce_policy(mut self, policy: NoncePolicy) -> Self {
        self.nonce_policy = policy;
        self
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Check threshold and required-subset rules
    ///
    /// Owner list rules are enforced by the owner registry itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold == 0 {
            return Err(ConfigError::InvalidThreshold(
                "threshold must be at least 1".to_string(),
            ));
        }

        if self.threshold > self.owners.len() {
            return Err(ConfigError::InvalidThreshold(format!(
                "threshold {} exceeds owner count {}",
                self.threshold,
                self.owners.len()
            )));
        }

        let mut seen = BTreeSet::new();
        for &index in &self.required_signers {
            if index >= self.owners.len() {
                return Err(ConfigError::RequiredIndexOutOfRange {
                    index,
                    owners: self.owners.len(),
                });
            }
            if !seen.insert(index) {
                return Err(ConfigError::DuplicateRequiredIndex(index));
            }
        }

        if let Some(required) = self.required_threshold {
            if self.required_signers.is_empty() {
                return Err(ConfigError::InvalidRequiredThreshold(
                    "set without any required signers".to_string(),
                ));
            }
            if required == 0 || required > self.required_signers.len() {
                return Err(ConfigError::InvalidRequiredThreshold(format!(
                    "{} is outside 1..={}",
                    required,
                    self.required_signers.len()
                )));
            }
        }

        Ok(())
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        let base = format!("{}-of-{}", self.threshold, self.owners.len());
        if self.required_signers.is_empty() {
            return base;
        }
        let required = self
            .required_threshold
            .unwrap_or(self.required_signers.len());
        format!(
            "{} (+{}-of-{} required)",
            base,
            required,
            self.required_signers.len()
        )
    }
}
