//! # Command Line Interface
//!
//! Arguments accepted by the `vault-keys` binary.
//!
//! ## Usage
//!
//! ```bash
//! # Sync the whole ./kv/ tree
//! vault-keys
//!
//! # Print what would be written, without contacting Vault
//! vault-keys --dry-run
//!
//! # Sync a single key file or a sub-tree
//! vault-keys -k kv/secret/db/__ALL__
//! vault-keys -K kv/secret
//! ```

use crate::constants::DEFAULT_KV_BASE_DIR;
use clap::Parser;
use std::path::PathBuf;

/// Sync an Ansible Vault encrypted key tree into HashiCorp Vault
#[derive(Debug, Parser)]
#[command(name = "vault-keys", version)]
#[command(about = "Sync an Ansible Vault encrypted key tree into HashiCorp Vault", long_about = None)]
pub struct Cli {
    /// Increase output verbosity
    #[arg(short, long)]
    pub verbose: bool,

    /// Decrypt and print keys instead of writing them to Vault
    #[arg(short, long)]
    pub dry_run: bool,

    /// Run one key file
    #[arg(short = 'k', long, value_name = "FILE", conflicts_with = "key_dir")]
    pub key_file: Option<PathBuf>,

    /// Run one key directory
    #[arg(short = 'K', long, value_name = "DIR")]
    pub key_dir: Option<PathBuf>,

    /// Vault password file (defaults to $ANSIBLE_VAULT_PASSWORD_FILE)
    #[arg(short = 'p', long, value_name = "FILE")]
    pub vault_password_file: Option<PathBuf>,

    /// Root of the key tree; the first path segment below it is the KV mount
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_KV_BASE_DIR)]
    pub base_dir: PathBuf,
}
