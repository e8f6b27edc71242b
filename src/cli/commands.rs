//! CLI commands for the multisig gate
//!
//! Implements all command handlers for the CLI interface.

use crate::crypto::{Address, SignatureParts};
use crate::host::{Ledger, Registry};
use crate::multisig::{ActionRequest, GateConfig};
use crate::storage::{Storage, StorageConfig};
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub ledger: Ledger,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize application state
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage = Storage::new(StorageConfig {
            data_dir: data_dir.clone(),
            ..Default::default()
        })?;

        // Load or create ledger
        let ledger = if storage.exists() {
            log::debug!("Loading ledger from {:?}", data_dir);
            storage.load()?
        } else {
            println!("🆕 Creating new ledger...");
            let ledger = Ledger::new();
            storage.save(&ledger)?;
            ledger
        };

        Ok(Self {
            ledger,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.ledger)?;
        Ok(())
    }
}

/// Build an action request from raw CLI arguments
pub fn parse_request(
    destination: Address,
    value: u64,
    data: Option<&str>,
    executor: Option<Address>,
    gas_limit: u64,
) -> CliResult<ActionRequest> {
    let payload = match data {
        Some(hex_data) => hex::decode(hex_data.strip_prefix("0x").unwrap_or(hex_data))?,
        None => Vec::new(),
    };

    Ok(ActionRequest {
        destination,
        value,
        payload,
        executor: executor.unwrap_or(Address::ZERO),
        gas_limit,
    })
}

/// Initialize a new ledger
pub fn cmd_init(data_dir: &Path) -> CliResult<()> {
    let storage = Storage::new(StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    })?;

    if storage.exists() {
        println!("⚠️  Ledger already exists at {:?}", data_dir);
        return Ok(());
    }

    storage.save(&Ledger::new())?;

    println!("✅ Ledger initialized!");
    println!("   📁 Data directory: {:?}", data_dir);

    Ok(())
}

/// Mint funds to an address
pub fn cmd_credit(state: &mut AppState, to: Address, amount: u64) -> CliResult<()> {
    let balance = state.ledger.credit(to, amount)?;
    state.save()?;

    println!("💰 Credited {} to {}", amount, to);
    println!("   New balance: {}", balance);
    Ok(())
}

/// Move funds between accounts
pub fn cmd_transfer(state: &mut AppState, from: Address, to: Address, amount: u64) -> CliResult<()> {
    state.ledger.transfer(from, to, amount)?;
    state.save()?;

    println!("📤 Transferred {} from {} to {}", amount, from, to);
    Ok(())
}

/// Deploy a new gate
pub fn cmd_gate_create(state: &mut AppState, deployer: Address, config: GateConfig) -> CliResult<()> {
    let description = config.description();
    let address = state.ledger.deploy_gate(deployer, config)?;
    state.save()?;

    println!("🔐 Gate deployed!");
    println!("   📍 Address: {}", address);
    println!("   🔧 Policy: {}", description);
    Ok(())
}

/// Show gate details
pub fn cmd_gate_info(state: &AppState, address: Address) -> CliResult<()> {
    let gate = state
        .ledger
        .gate(&address)
        .ok_or_else(|| format!("gate not found: {}", address))?;

    println!("🔐 Gate {}", address);
    println!("   ├─ Policy: {}", gate.description());
    println!("   ├─ Nonce: {}", gate.nonce());
    println!("   ├─ Balance: {}", state.ledger.balance(&address));
    println!("   ├─ On failed call: {:?}", gate.nonce_policy());
    println!(
        "   ├─ Created: {}",
        gate.created_at().format("%Y-%m-%d %H:%M:%S")
    );
    println!("   └─ Owners:");
    let required = gate.policy().required_indices();
    for (i, owner) in gate.owners().iter().enumerate() {
        let marker = if required.contains(&i) { " (required)" } else { "" };
        println!("      [{}] {}{}", i, owner, marker);
    }

    Ok(())
}

/// Deploy the built-in registry program
pub fn cmd_registry_deploy(state: &mut AppState, deployer: Address) -> CliResult<()> {
    let address = state.ledger.deploy_builtin(deployer, Registry::NAME)?;
    state.save()?;

    println!("📜 Registry deployed at {}", address);
    println!(
        "   register payload for 42: 0x{}",
        hex::encode(Registry::register_call(42))
    );
    Ok(())
}

/// Print the digest owners must sign for an action
pub fn cmd_digest(state: &AppState, gate: Address, request: &ActionRequest) -> CliResult<()> {
    let instance = state
        .ledger
        .gate(&gate)
        .ok_or_else(|| format!("gate not found: {}", gate))?;

    println!("🧾 Digest for nonce {}:", instance.nonce());
    println!("   0x{}", hex::encode(instance.digest(request)));
    Ok(())
}

/// Submit signatures and execute an action
pub fn cmd_execute(
    state: &mut AppState,
    gate: Address,
    caller: Address,
    request: &ActionRequest,
    signatures: &[String],
) -> CliResult<()> {
    let signatures = signatures
        .iter()
        .map(|s| SignatureParts::from_hex(s))
        .collect::<Result<Vec<_>, _>>()?;

    let result = state.ledger.execute(caller, gate, request, &signatures);
    // a consumed nonce must be persisted even when the call failed
    state.save()?;
    let receipt = result?;

    println!("✅ Executed nonce {}", receipt.nonce);
    println!("   ├─ Destination: {}", receipt.destination);
    println!("   ├─ Value: {}", receipt.value);
    println!("   ├─ Gas used: {}", receipt.gas_used);
    if !receipt.return_data.is_empty() {
        println!("   ├─ Return data: 0x{}", hex::encode(&receipt.return_data));
    }
    println!("   └─ Signers:");
    for signer in &receipt.signers {
        println!("      {}", signer);
    }

    Ok(())
}

/// Show an address balance
pub fn cmd_balance(state: &AppState, address: Address) -> CliResult<()> {
    println!("💰 Balance for {}", address);
    println!("   Total: {}", state.ledger.balance(&address));

    if let Some(name) = state.ledger.program_name(&address) {
        println!("   Program: {}", name);
    }

    Ok(())
}
