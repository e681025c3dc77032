//! `init`: write a configuration file and an empty ledger.

use super::config::GateConfig;
use super::ledger_file::{open_ledger, parse_principal, save_ledger};
use std::path::Path;

/// Create the config at `config_path` and an empty ledger snapshot.
///
/// Refuses to overwrite an existing config unless `force` is set.
pub async fn execute(
    config_path: &Path,
    data_dir: &Path,
    admins: Vec<String>,
    callable: Vec<String>,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if config_path.exists() && !force {
        return Err(format!(
            "Config '{}' already exists (use --force to overwrite)",
            config_path.display()
        )
        .into());
    }

    // Reject bad principals before anything is written
    for principal in admins.iter().chain(callable.iter()) {
        parse_principal(principal)?;
    }

    let mut config = GateConfig::new(data_dir);
    config.access.admins = admins;
    config.dispatch.callable = callable;
    config.save(config_path)?;

    let ledger = open_ledger(&config).await?;
    save_ledger(&config, &ledger).await?;

    println!("Initialized approval-gate");
    println!("  Config: {}", config_path.display());
    println!("  Ledger: {}", config.ledger.state_path.display());
    println!("  Admins: {}", config.access.admins.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_config_and_ledger() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        execute(
            &config_path,
            temp_dir.path(),
            vec!["root".to_string()],
            vec![],
            false,
        )
        .await
        .unwrap();

        let config = GateConfig::load(&config_path).unwrap();
        assert_eq!(config.access.admins, vec!["root".to_string()]);
        assert!(config.ledger.state_path.exists());
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        execute(&config_path, temp_dir.path(), vec![], vec![], false)
            .await
            .unwrap();
        let again = execute(&config_path, temp_dir.path(), vec![], vec![], false).await;
        assert!(again.is_err());

        execute(&config_path, temp_dir.path(), vec![], vec![], true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_init_rejects_bad_admin() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let result = execute(
            &config_path,
            temp_dir.path(),
            vec!["0xnothex".to_string()],
            vec![],
            false,
        )
        .await;
        assert!(result.is_err());
        assert!(!config_path.exists());
    }
}
