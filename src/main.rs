//! Multisig gate CLI application
//!
//! A command-line interface for deploying and driving authorization gates on
//! a local ledger.

use clap::{Args, Parser, Subcommand};
use simple_multisig::cli::{self, AppState};
use simple_multisig::crypto::Address;
use simple_multisig::multisig::{GateConfig, NoncePolicy};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "multisig")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A shared-custody M-of-N authorization gate", long_about = None)]
struct Cli {
    /// Data directory for ledger storage
    #[arg(short, long, default_value = ".multisig_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new ledger
    Init,

    /// Mint funds to an address
    Credit {
        /// Recipient address
        #[arg(short, long)]
        to: Address,

        /// Amount to mint
        #[arg(short, long)]
        amount: u64,
    },

    /// Move funds between accounts (e.g. to fund a gate)
    Transfer {
        #[arg(short, long)]
        from: Address,

        #[arg(short, long)]
        to: Address,

        #[arg(short, long)]
        amount: u64,
    },

    /// Gate operations
    Gate {
        #[command(subcommand)]
        action: GateCommands,
    },

    /// Registry program operations
    Registry {
        #[command(subcommand)]
        action: RegistryCommands,
    },

    /// Print the digest owners must sign for an action
    Digest {
        /// Gate address
        #[arg(short, long)]
        gate: Address,

        #[command(flatten)]
        action: ActionArgs,
    },

    /// Execute an action with collected signatures
    Execute {
        /// Gate address
        #[arg(short, long)]
        gate: Address,

        /// Submitting account
        #[arg(short, long)]
        caller: Address,

        /// Signatures as 65-byte r||s||v hex, in ascending signer order
        #[arg(short, long = "sig", required = true)]
        sigs: Vec<String>,

        #[command(flatten)]
        action: ActionArgs,
    },

    /// Show an address balance
    Balance {
        #[arg(short, long)]
        address: Address,
    },
}

#[derive(Subcommand)]
enum GateCommands {
    /// Deploy a new gate
    Create {
        /// Deploying account
        #[arg(long)]
        deployer: Address,

        /// JSON configuration file (overrides the flags below)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Minimum number of signatures
        #[arg(short, long, required_unless_present = "config")]
        threshold: Option<usize>,

        /// Owner address (repeat for each owner)
        #[arg(short, long = "owner")]
        owners: Vec<Address>,

        /// Index of a required owner (repeatable)
        #[arg(long = "required")]
        required: Vec<usize>,

        /// How many required owners must sign (default: all)
        #[arg(long)]
        required_threshold: Option<usize>,

        /// Keep the nonce consumed when the forwarded call fails
        #[arg(long)]
        consume_on_failure: bool,
    },

    /// Show gate details
    Info {
        /// Gate address
        #[arg(short, long)]
        gate: Address,
    },
}

#[derive(Subcommand)]
enum RegistryCommands {
    /// Deploy the built-in registry program
    Deploy {
        #[arg(long)]
        deployer: Address,
    },
}

#[derive(Args)]
struct ActionArgs {
    /// Destination address
    #[arg(long)]
    destination: Address,

    /// Value to move out of the gate
    #[arg(long, default_value = "0")]
    value: u64,

    /// Call data as hex
    #[arg(long)]
    data: Option<String>,

    /// Bound executor (default: anyone)
    #[arg(long)]
    executor: Option<Address>,

    /// Gas made available to the forwarded call
    #[arg(long, default_value = "21000")]
    gas_limit: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Handle init command separately (doesn't need full state)
    if let Commands::Init = &cli.command {
        return cli::cmd_init(&cli.data_dir);
    }

    // Initialize application state
    let mut state = AppState::new(cli.data_dir.clone())?;

    // Process commands
    match cli.command {
        Commands::Init => unreachable!(),

        Commands::Credit { to, amount } => {
            cli::cmd_credit(&mut state, to, amount)?;
        }

        Commands::Transfer { from, to, amount } => {
            cli::cmd_transfer(&mut state, from, to, amount)?;
        }

        Commands::Gate { action } => match action {
            GateCommands::Create {
                deployer,
                config,
                threshold,
                owners,
                required,
                required_threshold,
                consume_on_failure,
            } => {
                let config = match config {
                    Some(path) => GateConfig::from_file(&path)?,
                    None => {
                        let mut config = GateConfig::new(threshold.unwrap_or_default(), owners)
                            .with_required_signers(required);
                        if let Some(required_threshold) = required_threshold {
                            config = config.with_required_threshold(required_threshold);
                        }
                        if consume_on_failure {
                            config = config.with_nonce_policy(NoncePolicy::ConsumeOnFailure);
                        }
                        config
                    }
                };
                cli::cmd_gate_create(&mut state, deployer, config)?;
            }
            GateCommands::Info { gate } => {
                cli::cmd_gate_info(&state, gate)?;
            }
        },

        Commands::Registry { action } => match action {
            RegistryCommands::Deploy { deployer } => {
                cli::cmd_registry_deploy(&mut state, deployer)?;
            }
        },

        Commands::Digest { gate, action } => {
            let request = request_from(&action)?;
            cli::cmd_digest(&state, gate, &request)?;
        }

        Commands::Execute {
            gate,
            caller,
            sigs,
            action,
        } => {
            let request = request_from(&action)?;
            cli::cmd_execute(&mut state, gate, caller, &request, &sigs)?;
        }

        Commands::Balance { address } => {
            cli::cmd_balance(&state, address)?;
        }
    }

    Ok(())
}

fn request_from(action: &ActionArgs) -> cli::CliResult<simple_multisig::multisig::ActionRequest> {
    cli::parse_request(
        action.destination,
        action.value,
        action.data.as_deref(),
        action.executor,
        action.gas_limit,
    )
}
