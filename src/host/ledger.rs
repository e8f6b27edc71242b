//! In-memory host ledger
//!
//! Holds balances, deployed gates and programs, and implements the
//! forwarding primitive gates call into. Every state transition runs to
//! completion under `&mut self`, so attempts never interleave.

use crate::crypto::{Address, SignatureParts};
use crate::host::gas::GasMeter;
use crate::host::program::{builtin, CallContext, CallEnv, Program, ProgramStorage};
use crate::multisig::{
    zip_components, ActionRequest, CallOutcome, ConfigError, ExecutionReceipt, ForwardCall,
    ForwardError, Gate, GateConfig, GateError, Host,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

/// Ledger errors
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Gate not found: {0}")]
    GateNotFound(Address),
    #[error("Address already in use: {0}")]
    AddressInUse(Address),
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u64, need: u64 },
    #[error("Funds held by {0} only move through its own execution")]
    FundsLocked(Address),
    #[error("Balance overflow at {0}")]
    BalanceOverflow(Address),
    #[error("Unknown program: {0}")]
    UnknownProgram(String),
    #[error("Gate configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Execution rejected: {0}")]
    Rejected(#[from] GateError),
}

/// Balances, gates and programs of the host chain
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    balances: BTreeMap<Address, u64>,
    #[serde(deserialize_with = "deserialize_gates")]
    gates: BTreeMap<Address, Gate>,
    /// Program name deployed at each address
    code: BTreeMap<Address, String>,
    storage: BTreeMap<Address, ProgramStorage>,
    /// Deployment counter for address generation
    deploy_nonce: u64,
    /// Linked program code (rebuilt from `code` after load)
    #[serde(skip)]
    programs: HashMap<Address, Arc<dyn Program>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance held by an address
    pub fn balance(&self, address: &Address) -> u64 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Mint funds to an address
    pub fn credit(&mut self, to: Address, amount: u64) -> Result<u64, LedgerError> {
        let balance = self
            .balance(&to)
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow(to))?;
        self.balances.insert(to, balance);
        Ok(balance)
    }

    /// Move funds between plain accounts (e.g. funding a gate)
    ///
    /// Gates and programs may receive funds this way but never send them.
    pub fn transfer(&mut self, from: Address, to: Address, amount: u64) -> Result<(), LedgerError> {
        if self.gates.contains_key(&from) || self.code.contains_key(&from) {
            return Err(LedgerError::FundsLocked(from));
        }
        let have = self.balance(&from);
        if have < amount {
            return Err(LedgerError::InsufficientBalance { have, need: amount });
        }
        self.move_value(from, to, amount)
            .map_err(|_| LedgerError::BalanceOverflow(to))?;
        log::info!("Transferred {} from {} to {}", amount, from, to);
        Ok(())
    }

    /// Deploy a gate owned by the configured owners
    pub fn deploy_gate(
        &mut self,
        deployer: Address,
        config: GateConfig,
    ) -> Result<Address, LedgerError> {
        let address = self.next_address(&deployer)?;
        let gate = Gate::new(address, config)?;

        log::info!("Gate deployed at {} ({})", address, gate.description());
        self.gates.insert(address, gate);
        self.deploy_nonce += 1;
        Ok(address)
    }

    /// Deploy program code
    pub fn deploy_program(
        &mut self,
        deployer: Address,
        program: Arc<dyn Program>,
    ) -> Result<Address, LedgerError> {
        let address = self.next_address(&deployer)?;

        log::info!("Program '{}' deployed at {}", program.name(), address);
        self.code.insert(address, program.name().to_string());
        self.programs.insert(address, program);
        self.deploy_nonce += 1;
        Ok(address)
    }

    /// Deploy a built-in program by name
    pub fn deploy_builtin(&mut self, deployer: Address, name: &str) -> Result<Address, LedgerError> {
        let program = builtin(name).ok_or_else(|| LedgerError::UnknownProgram(name.to_string()))?;
        self.deploy_program(deployer, program)
    }

    /// Re-link program code after deserialization
    ///
    /// Addresses whose program is not built in stay unlinked and behave as
    /// plain accounts.
    pub fn relink(&mut self) {
        for (address, name) in &self.code {
            match builtin(name) {
                Some(program) => {
                    self.programs.insert(*address, program);
                }
                None => log::warn!("Program '{}' at {} is not built in", name, address),
            }
        }
    }

    pub fn gate(&self, address: &Address) -> Option<&Gate> {
        self.gates.get(address)
    }

    pub fn gates(&self) -> impl Iterator<Item = &Gate> {
        self.gates.values()
    }

    /// Name of the program deployed at an address
    pub fn program_name(&self, address: &Address) -> Option<&str> {
        self.code.get(address).map(String::as_str)
    }

    pub fn program_storage(&self, address: &Address) -> Option<&ProgramStorage> {
        self.storage.get(address)
    }

    /// Submit an authorized action to a gate on behalf of `caller`
    pub fn execute(
        &mut self,
        caller: Address,
        gate: Address,
        request: &ActionRequest,
        signatures: &[SignatureParts],
    ) -> Result<ExecutionReceipt, LedgerError> {
        // Taken out so the gate can forward through `self`; always put back
        let mut instance = self
            .gates
            .remove(&gate)
            .ok_or(LedgerError::GateNotFound(gate))?;
        let result = instance.execute(self, caller, request, signatures);
        self.gates.insert(gate, instance);
        Ok(result?)
    }

    /// Like [`Ledger::execute`], with signatures given as parallel `v`, `r`, `s` arrays
    pub fn execute_components(
        &mut self,
        caller: Address,
        gate: Address,
        request: &ActionRequest,
        v: &[u8],
        r: &[[u8; 32]],
        s: &[[u8; 32]],
    ) -> Result<ExecutionReceipt, LedgerError> {
        let signatures = zip_components(v, r, s)?;
        self.execute(caller, gate, request, &signatures)
    }

    fn next_address(&self, deployer: &Address) -> Result<Address, LedgerError> {
        let seed = format!("{}:{}", deployer, self.deploy_nonce);
        let address = Address::derive(seed.as_bytes());
        if self.gates.contains_key(&address) || self.code.contains_key(&address) {
            return Err(LedgerError::AddressInUse(address));
        }
        Ok(address)
    }

    fn move_value(&mut self, from: Address, to: Address, amount: u64) -> Result<(), ForwardError> {
        let have = self.balance(&from);
        if have < amount {
            return Err(ForwardError::InsufficientBalance { have, need: amount });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance(&to)
            .checked_add(amount)
            .ok_or(ForwardError::BalanceOverflow(to))?;

        self.balances.insert(from, have - amount);
        self.balances.insert(to, credited);
        Ok(())
    }
}

/// Reject state where a gate is filed under an address other than its own
fn deserialize_gates<'de, D>(deserializer: D) -> Result<BTreeMap<Address, Gate>, D::Error>
where
    D: Deserializer<'de>,
{
    let gates = BTreeMap::<Address, Gate>::deserialize(deserializer)?;
    if let Some((key, gate)) = gates.iter().find(|(key, gate)| gate.address() != **key) {
        return Err(serde::de::Error::custom(format!(
            "gate stored at {} claims address {}",
            key,
            gate.address()
        )));
    }
    Ok(gates)
}

impl Host for Ledger {
    fn forward(&mut self, call: ForwardCall<'_>) -> Result<CallOutcome, ForwardError> {
        let mut gas = GasMeter::new(call.gas_limit);
        gas.charge(GasMeter::intrinsic(call.payload.len()))?;

        let program = self.programs.get(&call.to).cloned();
        let mut storage = if program.is_some() {
            self.storage.get(&call.to).cloned().unwrap_or_default()
        } else {
            ProgramStorage::new()
        };

        // Run against scratch storage first; nothing is written until it succeeds
        let return_data = match &program {
            Some(program) => {
                let ctx = CallContext {
                    caller: call.from,
                    address: call.to,
                    value: call.value,
                };
                let mut env = CallEnv::new(&mut storage, &mut gas);
                program.call(&ctx, call.payload, &mut env)?
            }
            None => Vec::new(),
        };

        self.move_value(call.from, call.to, call.value)?;
        if program.is_some() {
            self.storage.insert(call.to, storage);
        }

        Ok(CallOutcome {
            gas_used: gas.used(),
            return_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::host::program::Registry;
    use crate::multisig::{NoncePolicy, Stage};

    const FUNDING: u64 = 100_000;
    const VALUE: u64 = 1_000;

    /// Always reverts
    struct Reverter;

    impl Program for Reverter {
        fn name(&self) -> &str {
            "reverter"
        }

        fn call(
            &self,
            _ctx: &CallContext,
            _payload: &[u8],
            env: &mut CallEnv<'_>,
        ) -> Result<Vec<u8>, ForwardError> {
            env.store("touched", 1)?;
            Err(ForwardError::Reverted("always".to_string()))
        }
    }

    fn sorted_keys(n: usize) -> Vec<KeyPair> {
        let mut keys: Vec<KeyPair> = (0..n).map(|_| KeyPair::generate()).collect();
        keys.sort_by_key(|k| k.address());
        keys
    }

    struct Fixture {
        ledger: Ledger,
        gate: Address,
        keys: Vec<KeyPair>,
    }

    impl Fixture {
        fn new(keys: Vec<KeyPair>, config: impl FnOnce(Vec<Address>) -> GateConfig) -> Self {
            let mut ledger = Ledger::new();
            let owners = keys.iter().map(|k| k.address()).collect();
            let gate = ledger.deploy_gate(keys[0].address(), config(owners)).unwrap();

            // receive funds the way any account would
            ledger.credit(keys[0].address(), FUNDING).unwrap();
            ledger.transfer(keys[0].address(), gate, FUNDING).unwrap();

            Self { ledger, gate, keys }
        }

        fn sign(&self, request: &ActionRequest, signers: &[usize]) -> Vec<SignatureParts> {
            let digest = self.ledger.gate(&self.gate).unwrap().digest(request);
            signers
                .iter()
                .map(|&i| self.keys[i].sign_digest(&digest))
                .collect()
        }

        fn nonce(&self) -> u64 {
            self.ledger.gate(&self.gate).unwrap().nonce()
        }
    }

    #[test]
    fn test_scenario_two_of_three_transfer() {
        let keys = sorted_keys(3);
        let mut fx = Fixture::new(keys, |owners| GateConfig::new(2, owners));
        let executor = fx.keys[0].address();
        let recipient = Address::derive(b"x");

        assert_eq!(fx.nonce(), 0);
        assert_eq!(fx.ledger.balance(&fx.gate), FUNDING);
        let gate = fx.ledger.gate(&fx.gate).unwrap();
        for (i, key) in fx.keys.iter().enumerate() {
            assert_eq!(gate.owner(i), Some(key.address()));
        }

        let request = ActionRequest::transfer(recipient, VALUE, executor, 21_000);
        let sigs = fx.sign(&request, &[0, 1]);
        let receipt = fx.ledger.execute(executor, fx.gate, &request, &sigs).unwrap();

        assert_eq!(receipt.nonce, 0);
        assert_eq!(receipt.gas_used, 21_000);
        assert_eq!(fx.ledger.balance(&recipient), VALUE);
        assert_eq!(fx.ledger.balance(&fx.gate), FUNDING - VALUE);
        assert_eq!(fx.nonce(), 1);

        // identical resubmission is bound to the consumed nonce
        let replay = fx.ledger.execute(executor, fx.gate, &request, &sigs);
        assert!(matches!(replay, Err(LedgerError::Rejected(_))));
        assert_eq!(fx.ledger.balance(&recipient), VALUE);
        assert_eq!(fx.nonce(), 1);

        // anyone may submit when the executor is the zero address
        let request = ActionRequest::transfer(recipient, VALUE, Address::ZERO, 21_000);
        let sigs = fx.sign(&request, &[0, 1]);
        fx.ledger
            .execute(Address::derive(b"relayer"), fx.gate, &request, &sigs)
            .unwrap();
        assert_eq!(fx.ledger.balance(&recipient), 2 * VALUE);
        assert_eq!(fx.ledger.balance(&fx.gate), FUNDING - 2 * VALUE);
        assert_eq!(fx.nonce(), 2);
    }

    #[test]
    fn test_every_two_of_three_combination_succeeds() {
        let keys = sorted_keys(4);
        for signers in [vec![0, 1], vec![0, 2], vec![1, 2], vec![0, 1, 2]] {
            let mut fx = Fixture::new(keys.clone(), |owners| GateConfig::new(2, owners[..3].to_vec()));
            let request = ActionRequest::transfer(Address::derive(b"x"), VALUE, Address::ZERO, 21_000);
            let sigs = fx.sign(&request, &signers);
            fx.ledger
                .execute(Address::ZERO, fx.gate, &request, &sigs)
                .unwrap();
            assert_eq!(fx.nonce(), 1);
        }
    }

    #[test]
    fn test_reference_failure_cases() {
        let keys = sorted_keys(4);
        let request = ActionRequest::transfer(Address::derive(b"x"), VALUE, Address::ZERO, 21_000);
        let fixture = || Fixture::new(keys.clone(), |owners| GateConfig::new(2, owners[..3].to_vec()));

        // non-owner signer
        let mut fx = fixture();
        let sigs = fx.sign(&request, &[0, 3]);
        let err = fx.ledger.execute(Address::ZERO, fx.gate, &request, &sigs).unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(GateError::UnauthorizedSigner { .. })));

        // fewer signers than the threshold
        let sigs = fx.sign(&request, &[0]);
        let err = fx.ledger.execute(Address::ZERO, fx.gate, &request, &sigs).unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(GateError::InsufficientSignatures { .. })));

        // one signer signing twice
        let sigs = fx.sign(&request, &[0, 0]);
        let err = fx.ledger.execute(Address::ZERO, fx.gate, &request, &sigs).unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(GateError::UnsortedOrDuplicateSigner { .. })));

        // decreasing order
        let sigs = fx.sign(&request, &[1, 0]);
        let err = fx.ledger.execute(Address::ZERO, fx.gate, &request, &sigs).unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(GateError::UnsortedOrDuplicateSigner { .. })));

        // signed for the wrong nonce: the first recovered identity is no owner
        let digest = request.digest(&fx.gate, 1);
        let sigs: Vec<_> = fx.keys[..2].iter().map(|k| k.sign_digest(&digest)).collect();
        let err = fx.ledger.execute(Address::ZERO, fx.gate, &request, &sigs).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Rejected(GateError::UnauthorizedSigner { index: 0, .. })
        ));

        assert_eq!(fx.nonce(), 0);
        assert_eq!(fx.ledger.balance(&fx.gate), FUNDING);
    }

    #[test]
    fn test_scenario_required_subset_threshold() {
        let keys = sorted_keys(5);
        let config = |owners: Vec<Address>| {
            GateConfig::new(3, owners)
                .with_required_signers(vec![1, 2, 4])
                .with_required_threshold(2)
        };
        let request = ActionRequest::transfer(Address::derive(b"x"), VALUE, Address::ZERO, 21_000);

        let mut fx = Fixture::new(keys.clone(), config);
        let sigs = fx.sign(&request, &[1, 2, 3]);
        fx.ledger
            .execute(Address::ZERO, fx.gate, &request, &sigs)
            .unwrap();
        assert_eq!(fx.nonce(), 1);

        let mut fx = Fixture::new(keys, config);
        let sigs = fx.sign(&request, &[0, 1, 3]);
        let err = fx.ledger.execute(Address::ZERO, fx.gate, &request, &sigs).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Rejected(GateError::PolicyNotSatisfied { have: 1, need: 2 })
        ));
        assert_eq!(fx.nonce(), 0);
    }

    #[test]
    fn test_required_subset_all() {
        let keys = sorted_keys(4);
        let config = |owners: Vec<Address>| GateConfig::new(2, owners).with_required_signers(vec![1, 3]);
        let request = ActionRequest::transfer(Address::derive(b"x"), VALUE, Address::ZERO, 21_000);

        let mut fx = Fixture::new(keys, config);
        let sigs = fx.sign(&request, &[0, 1, 2]);
        let err = fx.ledger.execute(Address::ZERO, fx.gate, &request, &sigs).unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(GateError::PolicyNotSatisfied { .. })));

        let sigs = fx.sign(&request, &[1, 3]);
        fx.ledger
            .execute(Address::ZERO, fx.gate, &request, &sigs)
            .unwrap();
        assert_eq!(fx.nonce(), 1);
    }

    #[test]
    fn test_contract_interaction_through_gate() {
        let keys = sorted_keys(3);
        let mut fx = Fixture::new(keys, |owners| GateConfig::new(2, owners));
        let registry = fx
            .ledger
            .deploy_builtin(fx.keys[0].address(), Registry::NAME)
            .unwrap();
        let executor = fx.keys[0].address();

        let request = ActionRequest {
            destination: registry,
            value: 0,
            payload: Registry::register_call(12345),
            executor,
            gas_limit: 100_000,
        };
        let sigs = fx.sign(&request, &[0, 1]);
        let receipt = fx.ledger.execute(executor, fx.gate, &request, &sigs).unwrap();

        let storage = fx.ledger.program_storage(&registry).unwrap();
        assert_eq!(Registry::registered(storage, &fx.gate), Some(12345));
        assert!(receipt.gas_used > 21_000);
        assert_eq!(fx.nonce(), 1);
    }

    #[test]
    fn test_out_of_gas_rolls_back_everything() {
        let keys = sorted_keys(2);
        let mut fx = Fixture::new(keys, |owners| GateConfig::new(2, owners));
        let registry = fx
            .ledger
            .deploy_builtin(fx.keys[0].address(), Registry::NAME)
            .unwrap();

        let request = ActionRequest {
            destination: registry,
            value: VALUE,
            payload: Registry::register_call(1),
            executor: Address::ZERO,
            gas_limit: 21_000,
        };
        let sigs = fx.sign(&request, &[0, 1]);
        let err = fx.ledger.execute(Address::ZERO, fx.gate, &request, &sigs).unwrap_err();

        match err {
            LedgerError::Rejected(e) => {
                assert_eq!(e.stage(), Stage::Forwarded);
                assert!(matches!(
                    e,
                    GateError::ForwardedEffectFailed(ForwardError::OutOfGas { .. })
                ));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(fx.nonce(), 0);
        assert_eq!(fx.ledger.balance(&fx.gate), FUNDING);
        assert_eq!(fx.ledger.balance(&registry), 0);
        assert!(fx.ledger.program_storage(&registry).is_none());
    }

    #[test]
    fn test_reverting_destination_rolls_back_by_policy() {
        for policy in [NoncePolicy::RollbackOnFailure, NoncePolicy::ConsumeOnFailure] {
            let keys = sorted_keys(2);
            let mut fx = Fixture::new(keys, |owners| {
                GateConfig::new(1, owners).with_nonce_policy(policy)
            });
            let reverter = fx
                .ledger
                .deploy_program(fx.keys[0].address(), Arc::new(Reverter))
                .unwrap();

            let request = ActionRequest::transfer(reverter, VALUE, Address::ZERO, 100_000);
            let sigs = fx.sign(&request, &[0]);
            assert!(fx
                .ledger
                .execute(Address::ZERO, fx.gate, &request, &sigs)
                .is_err());

            // value and downstream state never move
            assert_eq!(fx.ledger.balance(&fx.gate), FUNDING);
            assert_eq!(fx.ledger.balance(&reverter), 0);
            assert!(fx.ledger.program_storage(&reverter).is_none());

            let expected = match policy {
                NoncePolicy::RollbackOnFailure => 0,
                NoncePolicy::ConsumeOnFailure => 1,
            };
            assert_eq!(fx.nonce(), expected);
        }
    }

    #[test]
    fn test_overdraft_fails_forward() {
        let keys = sorted_keys(2);
        let mut fx = Fixture::new(keys, |owners| GateConfig::new(1, owners));
        let request = ActionRequest::transfer(Address::derive(b"x"), FUNDING + 1, Address::ZERO, 21_000);
        let sigs = fx.sign(&request, &[1]);

        let err = fx.ledger.execute(Address::ZERO, fx.gate, &request, &sigs).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Rejected(GateError::ForwardedEffectFailed(
                ForwardError::InsufficientBalance { .. }
            ))
        ));
        assert_eq!(fx.nonce(), 0);
    }

    #[test]
    fn test_unknown_gate_and_bad_config() {
        let mut ledger = Ledger::new();
        let err = ledger
            .execute(Address::ZERO, Address::derive(b"nope"), &ActionRequest::transfer(Address::ZERO, 0, Address::ZERO, 0), &[])
            .unwrap_err();
        assert!(matches!(err, LedgerError::GateNotFound(_)));

        let owner = Address::derive(b"owner");
        let err = ledger
            .deploy_gate(owner, GateConfig::new(1, vec![owner, owner]))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Config(ConfigError::DuplicateOwner(_))));
        assert!(ledger.deploy_builtin(owner, "nonexistent").is_err());
    }

    #[test]
    fn test_deploy_addresses_are_distinct() {
        let mut ledger = Ledger::new();
        let deployer = Address::derive(b"deployer");
        let owners = vec![Address::derive(b"o1")];
        let a = ledger.deploy_gate(deployer, GateConfig::new(1, owners.clone())).unwrap();
        let b = ledger.deploy_gate(deployer, GateConfig::new(1, owners)).unwrap();
        let c = ledger.deploy_builtin(deployer, Registry::NAME).unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(ledger.gates().count(), 2);
        assert_eq!(ledger.program_name(&c), Some("registry"));
    }

    #[test]
    fn test_serde_round_trip_relinks_programs() {
        let keys = sorted_keys(2);
        let mut fx = Fixture::new(keys, |owners| GateConfig::new(1, owners));
        let registry = fx
            .ledger
            .deploy_builtin(fx.keys[0].address(), Registry::NAME)
            .unwrap();

        let json = serde_json::to_string(&fx.ledger).unwrap();
        let mut loaded: Ledger = serde_json::from_str(&json).unwrap();
        loaded.relink();

        let request = ActionRequest {
            destination: registry,
            value: 0,
            payload: Registry::register_call(9),
            executor: Address::ZERO,
            gas_limit: 100_000,
        };
        let digest = loaded.gate(&fx.gate).unwrap().digest(&request);
        let sigs = vec![fx.keys[0].sign_digest(&digest)];
        loaded
            .execute(Address::ZERO, fx.gate, &request, &sigs)
            .unwrap();

        let storage = loaded.program_storage(&registry).unwrap();
        assert_eq!(Registry::registered(storage, &fx.gate), Some(9));
    }

    #[test]
    fn test_gate_funds_only_leave_through_execute() {
        let keys = sorted_keys(1);
        let mut fx = Fixture::new(keys, |owners| GateConfig::new(1, owners));
        let registry = fx
            .ledger
            .deploy_builtin(fx.keys[0].address(), Registry::NAME)
            .unwrap();
        let thief = Address::derive(b"thief");

        let err = fx.ledger.transfer(fx.gate, thief, FUNDING).unwrap_err();
        assert!(matches!(err, LedgerError::FundsLocked(addr) if addr == fx.gate));
        assert_eq!(fx.ledger.balance(&fx.gate), FUNDING);
        assert_eq!(fx.ledger.balance(&thief), 0);

        // programs are funded the same way and are just as locked
        fx.ledger.credit(thief, 10).unwrap();
        fx.ledger.transfer(thief, registry, 10).unwrap();
        assert!(matches!(
            fx.ledger.transfer(registry, thief, 10),
            Err(LedgerError::FundsLocked(_))
        ));
        assert_eq!(fx.ledger.balance(&registry), 10);
    }

    #[test]
    fn test_execute_with_component_arrays() {
        let keys = sorted_keys(3);
        let mut fx = Fixture::new(keys, |owners| GateConfig::new(2, owners));
        let request = ActionRequest::transfer(Address::derive(b"x"), VALUE, Address::ZERO, 21_000);
        let sigs = fx.sign(&request, &[0, 2]);
        let v: Vec<u8> = sigs.iter().map(|sig| sig.v).collect();
        let r: Vec<[u8; 32]> = sigs.iter().map(|sig| sig.r).collect();
        let s: Vec<[u8; 32]> = sigs.iter().map(|sig| sig.s).collect();

        let err = fx
            .ledger
            .execute_components(Address::ZERO, fx.gate, &request, &v, &r[..1], &s)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Rejected(GateError::MalformedSignatures { v: 2, r: 1, s: 2 })
        ));
        assert_eq!(fx.nonce(), 0);

        fx.ledger
            .execute_components(Address::ZERO, fx.gate, &request, &v, &r, &s)
            .unwrap();
        assert_eq!(fx.nonce(), 1);
        assert_eq!(fx.ledger.balance(&Address::derive(b"x")), VALUE);
    }

    #[test]
    fn test_load_rejects_gate_filed_under_other_address() {
        let keys = sorted_keys(1);
        let fx = Fixture::new(keys, |owners| GateConfig::new(1, owners));

        let mut value = serde_json::to_value(&fx.ledger).unwrap();
        let gates = value["gates"].as_object_mut().unwrap();
        let record = gates.remove(&fx.gate.to_string()).unwrap();
        gates.insert(Address::derive(b"elsewhere").to_string(), record);

        let err = serde_json::from_value::<Ledger>(value).err().unwrap();
        assert!(err.to_string().contains("claims address"));
    }
}
