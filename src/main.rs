//! # Vault Keys
//!
//! Syncs an Ansible Vault encrypted key tree into HashiCorp Vault KV v2.
//!
//! ## Overview
//!
//! 1. **Decrypt** - Every file under the key tree (default `./kv/`) is decrypted
//!    with the shared vault password
//! 2. **Map** - The first directory below the base is the KV mount, the rest of
//!    the directory path is the secret path; `__ALL__` manifests list many keys
//! 3. **Sync** - Each secret is read back first and only written when it differs
//!
//! ## Environment
//!
//! - `ANSIBLE_VAULT_PASSWORD_FILE` - vault password file (or script)
//! - `VAULT_ADDR`, `VAULT_TOKEN`, `VAULT_CACERT`, `VAULT_NAMESPACE` - Vault connection
//! - `VERBOSE`, `DRY_RUN` - force verbose output / dry run

use anyhow::Result;
use clap::{error::ErrorKind, CommandFactory, Parser};
use vault_keys::cli::Cli;
use vault_keys::config::{Settings, VaultConfig};
use vault_keys::runtime::{init_tracing, install_crypto_provider, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => Cli::command().error(ErrorKind::MissingRequiredArgument, e).exit(),
    };

    init_tracing(settings.verbose)?;
    install_crypto_provider();

    let vault_config = VaultConfig::from_env();
    run(&settings, &vault_config).await?;

    Ok(())
}
