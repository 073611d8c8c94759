//! # Vault Connection Configuration
//!
//! Secret store connection settings loaded from the standard Vault
//! environment variables.

use crate::constants::{ENV_VAULT_ADDR, ENV_VAULT_CACERT, ENV_VAULT_NAMESPACE, ENV_VAULT_TOKEN};
use std::fmt;
use std::path::PathBuf;

/// Address used when `VAULT_ADDR` is unset
pub const DEFAULT_VAULT_ADDR: &str = "http://localhost:8200";

/// Connection settings for the Vault HTTP API
#[derive(Clone, PartialEq, Eq)]
pub struct VaultConfig {
    /// Server address, e.g. `https://vault.example.com:8200`
    pub address: String,
    /// Token sent as `X-Vault-Token`
    pub token: Option<String>,
    /// PEM bundle trusted in addition to the built-in roots
    pub ca_cert: Option<PathBuf>,
    /// Vault Enterprise namespace sent as `X-Vault-Namespace`
    pub namespace: Option<String>,
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("address", &self.address)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("ca_cert", &self.ca_cert)
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl VaultConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            address: non_empty(ENV_VAULT_ADDR).unwrap_or_else(|| DEFAULT_VAULT_ADDR.to_string()),
            token: non_empty(ENV_VAULT_TOKEN),
            ca_cert: non_empty(ENV_VAULT_CACERT).map(PathBuf::from),
            namespace: non_empty(ENV_VAULT_NAMESPACE),
        }
    }
}
