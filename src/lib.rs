//! Vault Keys Library
//!
//! Core functionality for the `vault-keys` tool: decrypting an Ansible Vault
//! encrypted key tree and syncing it into HashiCorp Vault KV v2 mounts.
//! Tests are included in the module files and under `tests/`.

pub mod cli;
pub mod config;
pub mod constants;
pub mod crypter;
pub mod parser;
pub mod provider;
pub mod runtime;
pub mod sync;

pub use parser::{KeyEntry, KeyTreeParser, SecretPayload};
pub use sync::{dump_keys, SyncEngine, SyncSummary};
