//! Owner registry
//!
//! The fixed set of identities allowed to sign for a gate. Built once and
//! never mutated.

use crate::crypto::Address;
use crate::multisig::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Immutable, duplicate-free list of owners
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Address>", into = "Vec<Address>")]
pub struct OwnerRegistry {
    /// Owners in construction order, for indexed lookup
    owners: Vec<Address>,
    /// Same owners, for membership tests
    members: BTreeSet<Address>,
}

impl OwnerRegistry {
    /// Build a registry, rejecting empty lists, duplicates and the zero address
    pub fn new(owners: Vec<Address>) -> Result<Self, ConfigError> {
        if owners.is_empty() {
            return Err(ConfigError::NoOwners);
        }

        let mut members = BTreeSet::new();
        for owner in &owners {
            if owner.is_zero() {
                return Err(ConfigError::ZeroOwner);
            }
            if !members.insert(*owner) {
                return Err(ConfigError::DuplicateOwner(*owner));
            }
        }

        Ok(Self { owners, members })
    }

    /// Check if an identity is an owner
    pub fn is_owner(&self, address: &Address) -> bool {
        self.members.contains(address)
    }

    /// Owner at a construction index
    pub fn owner(&self, index: usize) -> Option<Address> {
        self.owners.get(index).copied()
    }

    /// Number of owners (N)
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.owners.iter()
    }
}

impl TryFrom<Vec<Address>> for OwnerRegistry {
    type Error = ConfigError;

    fn try_from(owners: Vec<Address>) -> Result<Self, Self::Error> {
        Self::new(owners)
    }
}

impl From<OwnerRegistry> for Vec<Address> {
    fn from(registry: OwnerRegistry) -> Self {
        registry.owners
    }
}
