//! # Run
//!
//! One invocation: connect to Vault (unless dry run), decrypt the selected
//! key files, then dump or apply the resulting entries.

use crate::config::{KeyTarget, Settings, VaultConfig};
use crate::crypter::VaultCrypter;
use crate::parser::{KeyTreeParser, ParseError};
use crate::provider::VaultClient;
use crate::sync::{dump_keys, SyncEngine, SyncSummary};
use anyhow::{Context, Result};
use std::io::Write;
use tracing::{info, warn};

/// What a run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Dry run: number of entries printed
    Dumped(usize),
    /// Apply: per-entry counts
    Synced(SyncSummary),
}

/// Run with dry-run output going to stdout
pub async fn run(settings: &Settings, vault_config: &VaultConfig) -> Result<RunOutcome> {
    let stdout = std::io::stdout();
    run_with_output(settings, vault_config, &mut stdout.lock()).await
}

/// Run with dry-run output going to `out`
pub async fn run_with_output(
    settings: &Settings,
    vault_config: &VaultConfig,
    out: &mut impl Write,
) -> Result<RunOutcome> {
    let crypter = VaultCrypter::from_password_file(&settings.password_file)
        .inspect_err(|e| warn!("{}", e.remediation()))
        .context("Failed to load the vault password")?;

    let client = if settings.dry_run {
        info!("Dry run: Vault will not be contacted");
        None
    } else {
        let client = VaultClient::connect(vault_config)
            .await
            .context("Failed to connect to Vault")?;
        info!("Connected to Vault at {}", client.address());
        Some(client)
    };

    let mut parser = KeyTreeParser::new(crypter, &settings.base_dir);
    parse_target(&mut parser, &settings.target)
        .inspect_err(log_remediation)
        .context("Failed to read key definitions")?;
    let keys = parser.into_keys();

    match client {
        None => {
            dump_keys(&keys, out).context("Failed to write key dump")?;
            Ok(RunOutcome::Dumped(keys.len()))
        }
        Some(client) => {
            let summary = SyncEngine::new(&client)
                .apply_keys(&keys)
                .await
                .context("Failed to sync keys to Vault")?;
            Ok(RunOutcome::Synced(summary))
        }
    }
}

fn parse_target(parser: &mut KeyTreeParser, target: &KeyTarget) -> Result<usize, ParseError> {
    match target {
        KeyTarget::Tree => parser.parse_dirs(None),
        KeyTarget::Dir(dir) => parser.parse_dirs(Some(dir.as_path())),
        KeyTarget::File(file) => {
            let logical_path = parser.logical_path_of(file)?;
            parser.parse_key_file(file, &logical_path)
        }
    }
}

fn log_remediation(err: &ParseError) {
    if let ParseError::Decrypt(e) = err {
        warn!("{}", e.remediation());
    }
}
