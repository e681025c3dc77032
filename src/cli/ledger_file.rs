//! Loading and saving the ledger behind each CLI invocation.
//!
//! Each command loads the snapshot named by the config, runs one operation
//! and writes the snapshot back only if the operation succeeded. Invocations
//! staged by the journal dispatcher are appended only after the snapshot is
//! on disk.

use super::config::GateConfig;
use approval_gate::dispatch::JournalDispatcher;
use approval_gate::gatekeeper::StaticAdminList;
use approval_gate::ledger::{Ledger, LedgerState};
use approval_gate::serialization::{read_snapshot, write_snapshot};
use approval_gate::{Address, CallType, Selector};

/// Ledger as driven by the CLI.
pub type CliLedger = Ledger<StaticAdminList, JournalDispatcher>;

/// Parse a principal or endpoint: a `0x` address, or a label hashed into one.
pub fn parse_principal(text: &str) -> Result<Address, Box<dyn std::error::Error>> {
    if text.starts_with("0x") {
        return text
            .parse::<Address>()
            .map_err(|e| format!("Invalid address '{}': {}", text, e).into());
    }
    if text.is_empty() {
        return Err("Empty principal".into());
    }
    Ok(Address::from_label(text))
}

/// Parse an endpoint and a `0x` selector into a call type.
pub fn parse_call_type(
    endpoint: &str,
    selector: &str,
) -> Result<CallType, Box<dyn std::error::Error>> {
    let endpoint = parse_principal(endpoint)?;
    let selector = selector
        .parse::<Selector>()
        .map_err(|e| format!("Invalid selector '{}': {}", selector, e))?;
    Ok(CallType::new(endpoint, selector))
}

/// Open the ledger described by `config`. A missing snapshot yields an empty ledger.
pub async fn open_ledger(config: &GateConfig) -> Result<CliLedger, Box<dyn std::error::Error>> {
    let state: LedgerState = read_snapshot(&config.ledger.state_path)
        .await
        .map_err(|e| {
            format!(
                "Failed to load ledger '{}': {}",
                config.ledger.state_path.display(),
                e
            )
        })?
        .unwrap_or_default();

    let admins = config
        .access
        .admins
        .iter()
        .map(|a| parse_principal(a))
        .collect::<Result<Vec<_>, _>>()?;
    let callable = config
        .dispatch
        .callable
        .iter()
        .map(|c| parse_principal(c))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        state_path = %config.ledger.state_path.display(),
        next_id = state.next_proposal_id(),
        "Ledger loaded"
    );

    Ok(Ledger::from_state(
        state,
        StaticAdminList::new(admins),
        JournalDispatcher::new(callable, config.dispatch.journal_path.clone()),
    ))
}

/// Write the ledger's current state back to its snapshot file, then journal
/// any invocations the operation staged.
pub async fn save_ledger(
    config: &GateConfig,
    ledger: &CliLedger,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = ledger.snapshot().await;
    write_snapshot(&config.ledger.state_path, &state)
        .await
        .map_err(|e| {
            format!(
                "Failed to save ledger '{}': {}",
                config.ledger.state_path.display(),
                e
            )
        })?;

    ledger.dispatcher().commit().await.map_err(|e| {
        format!(
            "Ledger saved but journal '{}' not written: {}",
            ledger.dispatcher().journal_path().display(),
            e
        )
    })?;
    Ok(())
}
