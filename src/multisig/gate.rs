//! The authorization gate
//!
//! Ties the owner registry, quorum policy, nonce counter and signature
//! verifier together behind a single `execute` entry point.

use crate::crypto::{Address, Hash256, SignatureParts};
use crate::multisig::config::{ConfigError, GateConfig, NoncePolicy};
use crate::multisig::error::{GateError, Stage};
use crate::multisig::forwarder::{ExecutionReceipt, ForwardCall, Host};
use crate::multisig::nonce::Nonce;
use crate::multisig::owners::OwnerRegistry;
use crate::multisig::policy::QuorumPolicy;
use crate::multisig::verifier::{verify_signatures, ActionRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shared-custody account controlled by a quorum of owners
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "GateRecord", into = "GateRecord")]
pub struct Gate {
    address: Address,
    owners: OwnerRegistry,
    policy: QuorumPolicy,
    nonce: Nonce,
    nonce_policy: NoncePolicy,
    created_at: DateTime<Utc>,
}

/// Persisted form of a gate; validated again when loaded
#[derive(Clone, Debug, Serialize, Deserialize)]
struct GateRecord {
    address: Address,
    config: GateConfig,
    nonce: Nonce,
    created_at: DateTime<Utc>,
}

impl Gate {
    /// Create a gate at `address` from validated construction parameters
    pub fn new(address: Address, config: GateConfig) -> Result<Self, ConfigError> {
        let owners = OwnerRegistry::new(config.owners.clone())?;
        let policy = QuorumPolicy::new(&config, &owners)?;

        Ok(Self {
            address,
            owners,
            policy,
            nonce: Nonce::new(),
            nonce_policy: config.nonce_policy,
            created_at: Utc::now(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Current nonce; the next execution must be signed for this value
    pub fn nonce(&self) -> u64 {
        self.nonce.value()
    }

    /// Owner at a construction index
    pub fn owner(&self, index: usize) -> Option<Address> {
        self.owners.owner(index)
    }

    pub fn is_owner(&self, address: &Address) -> bool {
        self.owners.is_owner(address)
    }

    pub fn owners(&self) -> &OwnerRegistry {
        &self.owners
    }

    pub fn threshold(&self) -> usize {
        self.policy.threshold()
    }

    pub fn policy(&self) -> &QuorumPolicy {
        &self.policy
    }

    pub fn nonce_policy(&self) -> NoncePolicy {
        self.nonce_policy
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The construction parameters this gate was built from
    pub fn config(&self) -> GateConfig {
        GateConfig {
            threshold: self.policy.threshold(),
            owners: self.owners.iter().copied().collect(),
            required_signers: self.policy.required_indices().to_vec(),
            required_threshold: (!self.policy.required_indices().is_empty())
                .then(|| self.policy.required_quorum())
                .filter(|&quorum| quorum != self.policy.required_indices().len()),
            nonce_policy: self.nonce_policy,
        }
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        self.config().description()
    }

    /// Digest owners must sign for `request` at the current nonce
    pub fn digest(&self, request: &ActionRequest) -> Hash256 {
        request.digest(&self.address, self.nonce.value())
    }

    /// Run every check without side effects, returning the verified signers
    pub fn authorize(
        &self,
        caller: Address,
        request: &ActionRequest,
        signatures: &[SignatureParts],
    ) -> Result<Vec<Address>, GateError> {
        self.policy.check_count(signatures.len())?;

        let digest = self.digest(request);
        let signers = verify_signatures(&digest, signatures, &self.owners)?;
        log::debug!("Gate {} attempt {}", self.address, Stage::Verified);

        self.policy.evaluate(&signers)?;
        log::debug!("Gate {} attempt {}", self.address, Stage::PolicyChecked);

        if !request.executor.is_zero() && request.executor != caller {
            return Err(GateError::UnauthorizedExecutor {
                caller,
                executor: request.executor,
            });
        }
        log::debug!("Gate {} attempt {}", self.address, Stage::ExecutorChecked);

        Ok(signers)
    }

    /// Authorize and forward an action
    ///
    /// On success exactly one nonce is consumed. On any failure no value
    /// moves; whether the nonce stays consumed after a failed forward depends
    /// on the gate's [`NoncePolicy`].
    pub fn execute<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        caller: Address,
        request: &ActionRequest,
        signatures: &[SignatureParts],
    ) -> Result<ExecutionReceipt, GateError> {
        let signers = self
            .authorize(caller, request, signatures)
            .inspect_err(|e| self.log_rejection(e))?;

        let consumed = self.nonce.consume()?;
        let call = ForwardCall {
            from: self.address,
            to: request.destination,
            value: request.value,
            payload: &request.payload,
            gas_limit: request.gas_limit,
        };

        match host.forward(call) {
            Ok(outcome) => {
                log::info!(
                    "Gate {} executed nonce {}: {} to {} ({} gas, {} signers)",
                    self.address,
                    consumed,
                    request.value,
                    request.destination,
                    outcome.gas_used,
                    signers.len()
                );
                Ok(ExecutionReceipt {
                    gate: self.address,
                    nonce: consumed,
                    signers,
                    destination: request.destination,
                    value: request.value,
                    gas_used: outcome.gas_used,
                    return_data: outcome.return_data,
                })
            }
            Err(e) => {
                if self.nonce_policy == NoncePolicy::RollbackOnFailure {
                    self.nonce.restore(consumed);
                }
                let error = GateError::from(e);
                self.log_rejection(&error);
                Err(error)
            }
        }
    }

    fn log_rejection(&self, error: &GateError) {
        log::warn!(
            "Gate {} rejected attempt at stage {} (nonce {}): {}",
            self.address,
            error.stage(),
            self.nonce.value(),
            error
        );
    }
}

impl TryFrom<GateRecord> for Gate {
    type Error = ConfigError;

    fn try_from(record: GateRecord) -> Result<Self, Self::Error> {
        let mut gate = Gate::new(record.address, record.config)?;
        gate.nonce = record.nonce;
        gate.created_at = record.created_at;
        Ok(gate)
    }
}

impl From<Gate> for GateRecord {
    fn from(gate: Gate) -> Self {
        GateRecord {
            address: gate.address,
            config: gate.config(),
            nonce: gate.nonce,
            created_at: gate.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::multisig::forwarder::{CallOutcome, ForwardError};

    /// Records forwarded calls; optionally fails them
    #[derive(Default)]
    struct RecordingHost {
        calls: Vec<(Address, Address, u64, Vec<u8>, u64)>,
        fail_with: Option<ForwardError>,
    }

    impl Host for RecordingHost {
        fn forward(&mut self, call: ForwardCall<'_>) -> Result<CallOutcome, ForwardError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            self.calls.push((
                call.from,
                call.to,
                call.value,
                call.payload.to_vec(),
                call.gas_limit,
            ));
            Ok(CallOutcome {
                gas_used: 21_000,
                return_data: Vec::new(),
            })
        }
    }

    fn sorted_keys(n: usize) -> Vec<KeyPair> {
        let mut keys: Vec<KeyPair> = (0..n).map(|_| KeyPair::generate()).collect();
        keys.sort_by_key(|k| k.address());
        keys
    }

    fn gate_for(keys: &[KeyPair], config: impl FnOnce(Vec<Address>) -> GateConfig) -> Gate {
        let owners = keys.iter().map(|k| k.address()).collect();
        Gate::new(Address::derive(b"gate"), config(owners)).unwrap()
    }

    fn sign(gate: &Gate, request: &ActionRequest, signers: &[&KeyPair]) -> Vec<SignatureParts> {
        let digest = gate.digest(request);
        signers.iter().map(|k| k.sign_digest(&digest)).collect()
    }

    #[test]
    fn test_execute_forwards_and_consumes_nonce() {
        let keys = sorted_keys(3);
        let mut gate = gate_for(&keys, |owners| GateConfig::new(2, owners));
        let mut host = RecordingHost::default();
        let executor = keys[0].address();
        let request = ActionRequest {
            destination: Address::derive(b"x"),
            value: 5,
            payload: vec![1, 2, 3],
            executor,
            gas_limit: 50_000,
        };

        let sigs = sign(&gate, &request, &[&keys[0], &keys[1]]);
        let receipt = gate.execute(&mut host, executor, &request, &sigs).unwrap();

        assert_eq!(receipt.nonce, 0);
        assert_eq!(receipt.signers, vec![keys[0].address(), keys[1].address()]);
        assert_eq!(gate.nonce(), 1);
        assert_eq!(
            host.calls,
            vec![(gate.address(), request.destination, 5, vec![1, 2, 3], 50_000)]
        );

        // replaying the same set no longer matches the digest
        let replay = gate.execute(&mut host, executor, &request, &sigs);
        assert!(replay.is_err());
        assert_eq!(gate.nonce(), 1);
        assert_eq!(host.calls.len(), 1);
    }

    #[test]
    fn test_executor_binding() {
        let keys = sorted_keys(2);
        let mut gate = gate_for(&keys, |owners| GateConfig::new(2, owners));
        let mut host = RecordingHost::default();
        let bound = keys[1].address();
        let request = ActionRequest::transfer(Address::derive(b"x"), 1, bound, 21_000);
        let sigs = sign(&gate, &request, &[&keys[0], &keys[1]]);

        let stranger = Address::derive(b"stranger");
        let err = gate
            .execute(&mut host, stranger, &request, &sigs)
            .unwrap_err();
        assert!(matches!(err, GateError::UnauthorizedExecutor { .. }));
        assert_eq!(err.stage(), Stage::PolicyChecked);
        assert_eq!(gate.nonce(), 0);

        gate.execute(&mut host, bound, &request, &sigs).unwrap();
        assert_eq!(gate.nonce(), 1);
    }

    #[test]
    fn test_anyone_executor() {
        let keys = sorted_keys(2);
        let mut gate = gate_for(&keys, |owners| GateConfig::new(1, owners));
        let mut host = RecordingHost::default();
        let request = ActionRequest::transfer(Address::derive(b"x"), 1, Address::ZERO, 21_000);
        let sigs = sign(&gate, &request, &[&keys[1]]);

        gate.execute(&mut host, Address::derive(b"anyone"), &request, &sigs)
            .unwrap();
        assert_eq!(gate.nonce(), 1);
    }

    #[test]
    fn test_insufficient_signatures_before_recovery() {
        let keys = sorted_keys(3);
        let gate = gate_for(&keys, |owners| GateConfig::new(3, owners));
        let request = ActionRequest::transfer(Address::derive(b"x"), 1, Address::ZERO, 21_000);
        let mut sigs = sign(&gate, &request, &[&keys[0], &keys[1]]);
        sigs[0].v = 99;

        let err = gate
            .authorize(Address::ZERO, &request, &sigs)
            .unwrap_err();
        assert!(matches!(
            err,
            GateError::InsufficientSignatures { have: 2, need: 3 }
        ));
        assert_eq!(err.stage(), Stage::Received);
    }

    #[test]
    fn test_forward_failure_rolls_back_nonce() {
        let keys = sorted_keys(2);
        let mut gate = gate_for(&keys, |owners| GateConfig::new(2, owners));
        let mut host = RecordingHost {
            fail_with: Some(ForwardError::Reverted("boom".to_string())),
            ..Default::default()
        };
        let request = ActionRequest::transfer(Address::derive(b"x"), 1, Address::ZERO, 21_000);
        let sigs = sign(&gate, &request, &[&keys[0], &keys[1]]);

        let err = gate
            .execute(&mut host, Address::ZERO, &request, &sigs)
            .unwrap_err();
        assert!(matches!(err, GateError::ForwardedEffectFailed(_)));
        assert_eq!(err.stage(), Stage::Forwarded);
        assert_eq!(gate.nonce(), 0);

        // same signatures go through once the destination accepts
        host.fail_with = None;
        gate.execute(&mut host, Address::ZERO, &request, &sigs)
            .unwrap();
        assert_eq!(gate.nonce(), 1);
    }

    #[test]
    fn test_forward_failure_consumes_nonce_when_configured() {
        let keys = sorted_keys(2);
        let mut gate = gate_for(&keys, |owners| {
            GateConfig::new(2, owners).with_nonce_policy(NoncePolicy::ConsumeOnFailure)
        });
        let mut host = RecordingHost {
            fail_with: Some(ForwardError::Reverted("boom".to_string())),
            ..Default::default()
        };
        let request = ActionRequest::transfer(Address::derive(b"x"), 1, Address::ZERO, 21_000);
        let sigs = sign(&gate, &request, &[&keys[0], &keys[1]]);

        assert!(gate
            .execute(&mut host, Address::ZERO, &request, &sigs)
            .is_err());
        assert_eq!(gate.nonce(), 1);

        // the burned signature set cannot be reused
        host.fail_with = None;
        assert!(gate
            .execute(&mut host, Address::ZERO, &request, &sigs)
            .is_err());
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_config_round_trip_through_record() {
        let keys = sorted_keys(5);
        let mut gate = gate_for(&keys, |owners| {
            GateConfig::new(3, owners)
                .with_required_signers(vec![1, 2, 4])
                .with_required_threshold(2)
        });
        let mut host = RecordingHost::default();
        let request = ActionRequest::transfer(Address::derive(b"x"), 1, Address::ZERO, 21_000);
        let sigs = sign(&gate, &request, &[&keys[1], &keys[2], &keys[3]]);
        gate.execute(&mut host, Address::ZERO, &request, &sigs)
            .unwrap();

        let json = serde_json::to_string(&gate).unwrap();
        let loaded: Gate = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.config(), gate.config());
        assert_eq!(loaded.nonce(), 1);
        assert_eq!(loaded.address(), gate.address());
        assert_eq!(loaded.created_at(), gate.created_at());
        assert_eq!(gate.config().required_threshold, Some(2));
    }

    #[test]
    fn test_required_all_config_has_no_explicit_threshold() {
        let keys = sorted_keys(3);
        let gate = gate_for(&keys, |owners| {
            GateConfig::new(2, owners).with_required_signers(vec![0, 2])
        });
        assert_eq!(gate.config().required_threshold, None);
        assert_eq!(gate.policy().required_quorum(), 2);
    }
}
