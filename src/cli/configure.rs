//! `configure` and `remove-config`: admin-only call-type management.

use super::config::GateConfig;
use super::ledger_file::{open_ledger, parse_call_type, parse_principal, save_ledger};

/// Arguments of `configure`.
pub struct ConfigureArgs {
    pub caller: String,
    pub endpoint: String,
    pub selector: String,
    pub threshold: u32,
    pub open_cap: u32,
    pub approvers: Vec<String>,
    pub close_executable: bool,
}

pub async fn configure(
    config: &GateConfig,
    args: ConfigureArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let caller = parse_principal(&args.caller)?;
    let call_type = parse_call_type(&args.endpoint, &args.selector)?;
    let approvers = args
        .approvers
        .iter()
        .map(|a| parse_principal(a))
        .collect::<Result<Vec<_>, _>>()?;

    let ledger = open_ledger(config).await?;
    ledger
        .configure(
            caller,
            call_type,
            args.threshold,
            args.open_cap,
            &approvers,
            args.close_executable,
        )
        .await?;
    save_ledger(config, &ledger).await?;

    let stored = ledger.approvers(&call_type).await;
    println!("Configured {}", call_type);
    println!("  Threshold: {}", args.threshold);
    println!("  Open cap:  {}", args.open_cap);
    println!("  Approvers: {}", stored.len());
    Ok(())
}

pub async fn remove(
    config: &GateConfig,
    caller: String,
    endpoint: String,
    selector: String,
    close_executable: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let caller = parse_principal(&caller)?;
    let call_type = parse_call_type(&endpoint, &selector)?;

    let ledger = open_ledger(config).await?;
    let open_before = ledger.open_proposals(&call_type).await.len();
    ledger
        .remove_configuration(caller, call_type, close_executable)
        .await?;
    save_ledger(config, &ledger).await?;

    println!("Removed configuration of {}", call_type);
    println!("  Closed proposals: {}", open_before);
    Ok(())
}
