//! approval-gate configuration file handling
//!
//! Provides default configuration generation and loading for the operator CLI.
//! Configuration files are TOML and live under the platform data directory
//! unless `--config` points elsewhere.
//!
//! ## Operator vs Ledger Configuration
//!
//! This file holds OPERATOR settings only: where the ledger snapshot lives,
//! who the admins are, which endpoints the journal dispatcher treats as live,
//! and logging. Call-type configurations (thresholds, approvers, open caps)
//! live in the ledger itself and change only through `configure`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Operator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub access: AccessConfig,

    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ledger snapshot location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// CBOR snapshot, rewritten after every successful operation
    pub state_path: PathBuf,
}

/// Admin allow-list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// `0x`-prefixed addresses or labels
    #[serde(default)]
    pub admins: Vec<String>,
}

/// Journal dispatcher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Endpoints considered callable (addresses or labels)
    #[serde(default)]
    pub callable: Vec<String>,

    /// JSON-lines file receiving every dispatched invocation
    pub journal_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl GateConfig {
    /// Configuration keeping its state and journal in `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            ledger: LedgerConfig {
                state_path: data_dir.join("ledger.cbor"),
            },
            access: AccessConfig::default(),
            dispatch: DispatchConfig {
                callable: Vec::new(),
                journal_path: data_dir.join("journal.jsonl"),
            },
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: GateConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Load `path`, generating a default configuration there first if missing.
    pub fn load_or_create(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !path.exists() {
            let data_dir = path.parent().unwrap_or_else(|| Path::new("."));
            Self::create_default(path, data_dir)?;
        }
        Self::load(path)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, contents)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml(data_dir: &Path) -> String {
        format!(
            r#"# approval-gate Configuration (Operator Settings)
#
# Call-type configurations (thresholds, approvers, open caps) are NOT set
# here. They are stored in the ledger and changed with `approval-gate configure`
# by one of the admins listed below.

[ledger]
# CBOR snapshot of the ledger, rewritten after every successful operation
state_path = "{state_path}"

[access]
# Admins allowed to configure call types ("0x..." address or a label)
admins = []

[dispatch]
# Endpoints the journal dispatcher treats as callable
callable = []

# Every executed proposal is appended here as one JSON line
journal_path = "{journal_path}"

[logging]
# Log level: trace, debug, info, warn, error (RUST_LOG takes precedence)
level = "info"
"#,
            state_path = data_dir.join("ledger.cbor").display(),
            journal_path = data_dir.join("journal.jsonl").display(),
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(
        config_path: &Path,
        data_dir: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let contents = Self::generate_default_toml(data_dir);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, contents).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }
}

/// Default data directory: `<data_local_dir>/approval-gate`
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("approval-gate")
}

/// Default config file path: `<data_local_dir>/approval-gate/config.toml`
pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}
