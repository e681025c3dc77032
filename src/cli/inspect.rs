//! Read-only commands: `show`, `list`, `audit`.
//!
//! None of these write the ledger back. `--json` switches to machine-readable
//! output on stdout.

use super::config::GateConfig;
use super::ledger_file::{open_ledger, parse_call_type, parse_principal};
use approval_gate::gatekeeper::{format_events, EventQuery};
use approval_gate::ledger::ConfigurationView;
use approval_gate::{CallType, ProposalId};
use serde::Serialize;

pub async fn show(
    config: &GateConfig,
    id: ProposalId,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = open_ledger(config).await?;
    let Some(view) = ledger.proposal(id).await else {
        return Err(format!("Proposal {} does not exist", id).into());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("Proposal {}", view.id);
    println!("  State:     {}", view.state);
    println!("  Proposer:  {}", view.proposer);
    println!("  Target:    {}:{}", view.endpoint, view.selector);
    println!("  Payload:   0x{}", view.payload);
    println!(
        "  Approvals: {}/{}",
        view.approvals.len(),
        view.threshold
    );
    for approver in &view.approvals {
        println!("    - {}", approver);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ListEntry {
    #[serde(flatten)]
    configuration: ConfigurationView,
    executable: Vec<ProposalId>,
}

/// List configured call types with their open (or only executable) proposals.
pub async fn list(
    config: &GateConfig,
    endpoint: Option<String>,
    selector: Option<String>,
    executable_only: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = open_ledger(config).await?;

    let call_types: Vec<CallType> = match (endpoint, selector) {
        (Some(endpoint), Some(selector)) => vec![parse_call_type(&endpoint, &selector)?],
        (None, None) => ledger.configured_call_types().await,
        _ => return Err("--endpoint and --selector must be given together".into()),
    };

    let entries: Vec<ListEntry> = {
        let state = ledger.read().await;
        call_types
            .iter()
            .filter_map(|ct| {
                let configuration = state.configuration_view(ct)?;
                Some(ListEntry {
                    configuration,
                    executable: state.executable_proposals(ct),
                })
            })
            .collect()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No configured call types.");
        return Ok(());
    }

    for entry in &entries {
        let c = &entry.configuration;
        println!(
            "{} (threshold {}, cap {}, {} approvers)",
            c.call_type,
            c.threshold,
            c.open_cap,
            c.approvers.len()
        );
        let ids = if executable_only {
            &entry.executable
        } else {
            &c.open_proposals
        };
        if ids.is_empty() {
            println!("  (none)");
        }
        for id in ids {
            let marker = if entry.executable.contains(id) { " *" } else { "" };
            println!("  #{}{}", id, marker);
        }
    }
    Ok(())
}

/// Arguments of `audit`.
pub struct AuditArgs {
    pub proposal: Option<ProposalId>,
    pub actor: Option<String>,
    pub endpoint: Option<String>,
    pub selector: Option<String>,
    pub limit: usize,
    pub json: bool,
}

pub async fn audit(config: &GateConfig, args: AuditArgs) -> Result<(), Box<dyn std::error::Error>> {
    let call_type = match (&args.endpoint, &args.selector) {
        (Some(endpoint), Some(selector)) => Some(parse_call_type(endpoint, selector)?),
        (None, None) => None,
        _ => return Err("--endpoint and --selector must be given together".into()),
    };
    let actor = args.actor.as_deref().map(parse_principal).transpose()?;

    let query = EventQuery {
        call_type,
        proposal: args.proposal,
        actor,
        limit: Some(args.limit),
        ..EventQuery::default()
    };

    let ledger = open_ledger(config).await?;
    let records = ledger.events(&query).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", format_events(&records));
        if records.is_empty() {
            println!();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ledger_file::save_ledger;
    use approval_gate::Address;
    use tempfile::TempDir;

    async fn populated(dir: &TempDir) -> GateConfig {
        let mut config = GateConfig::new(dir.path());
        config.access.admins = vec!["root".to_string()];

        let ledger = open_ledger(&config).await.unwrap();
        let ct = parse_call_type("vault", "0x01020304").unwrap();
        ledger
            .configure(
                Address::from_label("root"),
                ct,
                1,
                3,
                &[Address::from_label("alice")],
                false,
            )
            .await
            .unwrap();
        ledger
            .propose(Address::from_label("alice"), ct, vec![1])
            .await
            .unwrap();
        save_ledger(&config, &ledger).await.unwrap();
        config
    }

    #[tokio::test]
    async fn test_show_existing_and_missing() {
        let dir = TempDir::new().unwrap();
        let config = populated(&dir).await;

        show(&config, 0, false).await.unwrap();
        show(&config, 0, true).await.unwrap();
        assert!(show(&config, 7, false).await.is_err());
    }

    #[tokio::test]
    async fn test_list_variants() {
        let dir = TempDir::new().unwrap();
        let config = populated(&dir).await;

        list(&config, None, None, false, false).await.unwrap();
        list(&config, None, None, true, true).await.unwrap();
        list(
            &config,
            Some("vault".to_string()),
            Some("0x01020304".to_string()),
            false,
            false,
        )
        .await
        .unwrap();
        assert!(list(&config, Some("vault".to_string()), None, false, false)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_audit_filters() {
        let dir = TempDir::new().unwrap();
        let config = populated(&dir).await;

        let args = AuditArgs {
            proposal: Some(0),
            actor: Some("alice".to_string()),
            endpoint: None,
            selector: None,
            limit: 10,
            json: true,
        };
        audit(&config, args).await.unwrap();
    }
}
