use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod config;
pub mod configure;
pub mod init;
pub mod inspect;
pub mod ledger_file;
pub mod proposal;
pub mod version;

use config::{default_config_path, GateConfig};

#[derive(Parser)]
#[command(name = "approval-gate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Operator CLI for the approval-gate threshold ledger", long_about = None)]
pub struct Cli {
    /// Path to config file (default: <data dir>/approval-gate/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a config file and an empty ledger
    Init {
        /// Admin allowed to configure call types (address or label, repeatable)
        #[arg(long = "admin")]
        admins: Vec<String>,

        /// Endpoint the journal dispatcher treats as callable (repeatable)
        #[arg(long = "callable")]
        callable: Vec<String>,

        /// Directory for the ledger snapshot and journal (default: next to the config)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Configure a call type (admin only)
    Configure {
        /// Acting principal (address or label)
        #[arg(long = "as")]
        caller: String,

        #[arg(long)]
        endpoint: String,

        /// 4-byte selector, e.g. 0xa9059cbb
        #[arg(long)]
        selector: String,

        #[arg(long)]
        threshold: u32,

        /// Maximum open proposals per approver
        #[arg(long)]
        open_cap: u32,

        /// Approver (address or label, repeatable)
        #[arg(long = "approver", required = true)]
        approvers: Vec<String>,

        /// Close executable proposals instead of refusing
        #[arg(long)]
        close_executable: bool,
    },

    /// Remove a call type's configuration (admin only)
    RemoveConfig {
        #[arg(long = "as")]
        caller: String,

        #[arg(long)]
        endpoint: String,

        #[arg(long)]
        selector: String,

        #[arg(long)]
        close_executable: bool,
    },

    /// Propose an invocation of a call type
    Propose {
        #[arg(long = "as")]
        caller: String,

        #[arg(long)]
        endpoint: String,

        #[arg(long)]
        selector: String,

        /// Hex-encoded argument payload
        #[arg(long, default_value = "")]
        payload: String,

        /// Approve and execute in the same step (needs threshold 1)
        #[arg(long)]
        execute: bool,

        /// Value forwarded with the execution
        #[arg(long, default_value_t = 0)]
        value: u128,
    },

    /// Approve a proposal
    Approve {
        #[arg(long = "as")]
        caller: String,

        id: u64,
    },

    /// Withdraw an approval
    Rescind {
        #[arg(long = "as")]
        caller: String,

        id: u64,
    },

    /// Close a proposal (proposer only)
    Close {
        #[arg(long = "as")]
        caller: String,

        id: u64,
    },

    /// Execute a proposal that met its threshold
    Execute {
        #[arg(long = "as")]
        caller: String,

        id: u64,

        /// Approve first, in the same step
        #[arg(long)]
        approve: bool,

        #[arg(long, default_value_t = 0)]
        value: u128,
    },

    /// Show one proposal
    Show {
        id: u64,

        #[arg(long)]
        json: bool,
    },

    /// List configured call types and their open proposals
    List {
        #[arg(long)]
        endpoint: Option<String>,

        #[arg(long)]
        selector: Option<String>,

        /// Only proposals that met their threshold
        #[arg(long)]
        executable: bool,

        #[arg(long)]
        json: bool,
    },

    /// Show the event trail, most recent first
    Audit {
        #[arg(long)]
        proposal: Option<u64>,

        /// Only events caused by this principal
        #[arg(long)]
        actor: Option<String>,

        #[arg(long)]
        endpoint: Option<String>,

        #[arg(long)]
        selector: Option<String>,

        #[arg(long, default_value_t = 50)]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Display version information
    Version,
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Already installed when called twice in one process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = cli.config.unwrap_or_else(default_config_path);

    let command = match cli.command {
        Commands::Version => {
            version::execute();
            return Ok(());
        }
        Commands::Init {
            admins,
            callable,
            data_dir,
            force,
        } => {
            init_logging("info");
            let data_dir = data_dir.unwrap_or_else(|| {
                config_path
                    .parent()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."))
            });
            return init::execute(&config_path, &data_dir, admins, callable, force).await;
        }
        command => command,
    };

    let config = GateConfig::load_or_create(&config_path)?;
    init_logging(&config.logging.level);

    match command {
        Commands::Configure {
            caller,
            endpoint,
            selector,
            threshold,
            open_cap,
            approvers,
            close_executable,
        } => {
            configure::configure(
                &config,
                configure::ConfigureArgs {
                    caller,
                    endpoint,
                    selector,
                    threshold,
                    open_cap,
                    approvers,
                    close_executable,
                },
            )
            .await
        }
        Commands::RemoveConfig {
            caller,
            endpoint,
            selector,
            close_executable,
        } => configure::remove(&config, caller, endpoint, selector, close_executable).await,
        Commands::Propose {
            caller,
            endpoint,
            selector,
            payload,
            execute,
            value,
        } => {
            proposal::propose(
                &config,
                proposal::ProposeArgs {
                    caller,
                    endpoint,
                    selector,
                    payload,
                    execute,
                    value,
                },
            )
            .await
        }
        Commands::Approve { caller, id } => proposal::approve(&config, caller, id).await,
        Commands::Rescind { caller, id } => proposal::rescind(&config, caller, id).await,
        Commands::Close { caller, id } => proposal::close(&config, caller, id).await,
        Commands::Execute {
            caller,
            id,
            approve,
            value,
        } => proposal::execute(&config, caller, id, value, approve).await,
        Commands::Show { id, json } => inspect::show(&config, id, json).await,
        Commands::List {
            endpoint,
            selector,
            executable,
            json,
        } => inspect::list(&config, endpoint, selector, executable, json).await,
        Commands::Audit {
            proposal,
            actor,
            endpoint,
            selector,
            limit,
            json,
        } => {
            inspect::audit(
                &config,
                inspect::AuditArgs {
                    proposal,
                    actor,
                    endpoint,
                    selector,
                    limit,
                    json,
                },
            )
            .await
        }
        Commands::Version | Commands::Init { .. } => Ok(()),
    }
}
