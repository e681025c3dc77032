//! Proposal commands: `propose`, `approve`, `rescind`, `close`, `execute`.

use super::config::GateConfig;
use super::ledger_file::{open_ledger, parse_call_type, parse_principal, save_ledger};
use approval_gate::primitives::decode_hex;
use approval_gate::ProposalId;

/// Arguments of `propose`.
pub struct ProposeArgs {
    pub caller: String,
    pub endpoint: String,
    pub selector: String,
    /// Hex-encoded argument payload (may be empty)
    pub payload: String,
    /// Approve and execute immediately (threshold-1 call types)
    pub execute: bool,
    pub value: u128,
}

pub async fn propose(
    config: &GateConfig,
    args: ProposeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let caller = parse_principal(&args.caller)?;
    let call_type = parse_call_type(&args.endpoint, &args.selector)?;
    let payload = decode_hex(&args.payload).map_err(|e| format!("Invalid payload: {}", e))?;

    let ledger = open_ledger(config).await?;
    if args.execute {
        let (id, data) = ledger
            .propose_and_execute(caller, call_type, payload, args.value)
            .await?;
        save_ledger(config, &ledger).await?;
        println!("Proposal {} created and executed", id);
        print_return_data(&data);
    } else {
        let id = ledger.propose(caller, call_type, payload).await?;
        save_ledger(config, &ledger).await?;
        println!("Proposal {} created for {}", id, call_type);
    }
    Ok(())
}

pub async fn approve(
    config: &GateConfig,
    caller: String,
    id: ProposalId,
) -> Result<(), Box<dyn std::error::Error>> {
    let caller = parse_principal(&caller)?;

    let ledger = open_ledger(config).await?;
    let state = ledger.approve(caller, id).await?;
    save_ledger(config, &ledger).await?;

    println!(
        "Approved proposal {} ({} approvals, {} remaining, state: {})",
        id,
        ledger.approval_count(id).await,
        ledger.remaining_approvals(id).await,
        state
    );
    Ok(())
}

pub async fn rescind(
    config: &GateConfig,
    caller: String,
    id: ProposalId,
) -> Result<(), Box<dyn std::error::Error>> {
    let caller = parse_principal(&caller)?;

    let ledger = open_ledger(config).await?;
    let state = ledger.rescind_approval(caller, id).await?;
    save_ledger(config, &ledger).await?;

    println!("Rescinded approval of proposal {} (state: {})", id, state);
    Ok(())
}

pub async fn close(
    config: &GateConfig,
    caller: String,
    id: ProposalId,
) -> Result<(), Box<dyn std::error::Error>> {
    let caller = parse_principal(&caller)?;

    let ledger = open_ledger(config).await?;
    ledger.close_proposal(caller, id).await?;
    save_ledger(config, &ledger).await?;

    println!("Closed proposal {}", id);
    Ok(())
}

pub async fn execute(
    config: &GateConfig,
    caller: String,
    id: ProposalId,
    value: u128,
    approve_first: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let caller = parse_principal(&caller)?;

    let ledger = open_ledger(config).await?;
    let data = if approve_first {
        ledger.approve_and_execute(caller, id, value).await?
    } else {
        ledger.execute(caller, id, value).await?
    };
    save_ledger(config, &ledger).await?;

    println!("Executed proposal {}", id);
    print_return_data(&data);
    Ok(())
}

fn print_return_data(data: &[u8]) {
    if !data.is_empty() {
        println!("  Return data: 0x{}", hex::encode(data));
    }
}
