//! # Ansible Vault Detection
//!
//! Detects whether content is an Ansible Vault envelope.

use super::envelope::VAULT_HEADER_PREFIX;

/// Check if content is a whole-file Ansible Vault envelope
pub fn is_vault_encrypted(content: &str) -> bool {
    content.trim_start().starts_with(VAULT_HEADER_PREFIX)
}
