//! Downstream programs a gate can call into
//!
//! Programs are stateless code; their state lives in a per-address key/value
//! store owned by the ledger, so the ledger can discard it when a call fails.

use crate::crypto::{sha256, Address};
use crate::host::gas::{GasMeter, SLOAD_GAS, SSTORE_GAS};
use crate::multisig::ForwardError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Key/value storage of one program
pub type ProgramStorage = BTreeMap<String, u64>;

/// Who is calling and with how much value
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    pub caller: Address,
    pub address: Address,
    pub value: u64,
}

/// Gas-metered view of a program's storage during one call
pub struct CallEnv<'a> {
    storage: &'a mut ProgramStorage,
    gas: &'a mut GasMeter,
}

impl<'a> CallEnv<'a> {
    pub fn new(storage: &'a mut ProgramStorage, gas: &'a mut GasMeter) -> Self {
        Self { storage, gas }
    }

    pub fn load(&mut self, key: &str) -> Result<Option<u64>, ForwardError> {
        self.gas.charge(SLOAD_GAS)?;
        Ok(self.storage.get(key).copied())
    }

    pub fn store(&mut self, key: &str, value: u64) -> Result<(), ForwardError> {
        self.gas.charge(SSTORE_GAS)?;
        self.storage.insert(key.to_string(), value);
        Ok(())
    }
}

/// Code deployed at an address on the ledger
pub trait Program: Send + Sync {
    /// Name used to re-link the program after the ledger is reloaded
    fn name(&self) -> &str;

    /// Handle a call; returning an error reverts everything the call did
    fn call(
        &self,
        ctx: &CallContext,
        payload: &[u8],
        env: &mut CallEnv<'_>,
    ) -> Result<Vec<u8>, ForwardError>;
}

/// Four-byte function selector: first bytes of SHA256 of the signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = sha256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Look up a built-in program by name
pub fn builtin(name: &str) -> Option<Arc<dyn Program>> {
    match name {
        Registry::NAME => Some(Arc::new(Registry)),
        _ => None,
    }
}

/// Stores one number per caller
///
/// `register(uint64)` records the caller's number; `lookup(address)`
/// returns it as 8 big-endian bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Registry;

impl Registry {
    pub const NAME: &'static str = "registry";

    /// Payload for `register(number)`
    pub fn register_call(number: u64) -> Vec<u8> {
        let mut payload = selector("register(uint64)").to_vec();
        payload.extend_from_slice(&number.to_be_bytes());
        payload
    }

    /// Payload for `lookup(address)`
    pub fn lookup_call(address: &Address) -> Vec<u8> {
        let mut payload = selector("lookup(address)").to_vec();
        payload.extend_from_slice(address.as_bytes());
        payload
    }

    /// Read a registered number straight from storage
    pub fn registered(storage: &ProgramStorage, address: &Address) -> Option<u64> {
        storage.get(&address.to_string()).copied()
    }
}

impl Program for Registry {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn call(
        &self,
        ctx: &CallContext,
        payload: &[u8],
        env: &mut CallEnv<'_>,
    ) -> Result<Vec<u8>, ForwardError> {
        if payload.len() < 4 {
            return Err(ForwardError::Reverted("missing selector".to_string()));
        }
        let (sel, args) = payload.split_at(4);

        if sel == selector("register(uint64)") {
            let number: [u8; 8] = args
                .try_into()
                .map_err(|_| ForwardError::Reverted("register expects 8 bytes".to_string()))?;
            env.store(&ctx.caller.to_string(), u64::from_be_bytes(number))?;
            Ok(Vec::new())
        } else if sel == selector("lookup(address)") {
            let raw: [u8; 20] = args
                .try_into()
                .map_err(|_| ForwardError::Reverted("lookup expects 20 bytes".to_string()))?;
            let number = env
                .load(&Address::new(raw).to_string())?
                .unwrap_or_default();
            Ok(number.to_be_bytes().to_vec())
        } else {
            Err(ForwardError::Reverted(format!(
                "unknown selector 0x{}",
                hex::encode(sel)
            )))
        }
    }
}
