//! # Secret Store Providers
//!
//! The `SecretStore` trait is the seam between the sync engine and the
//! remote store. `VaultClient` implements it against the HashiCorp Vault
//! KV version 2 HTTP API.

pub mod error;
pub mod vault;

pub use error::StoreError;
pub use vault::{VaultClient, WriteConfirmation};

use crate::parser::{SecretData, SecretPayload};
use async_trait::async_trait;

/// Read-one / write-one access to a mount-scoped key-value secret store
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Read the current data at `mount_point`/`path`
    ///
    /// Returns `Ok(None)` when nothing is stored there.
    async fn read_secret(&self, mount_point: &str, path: &str) -> Result<Option<SecretData>, StoreError>;

    /// Create or overwrite the secret at `mount_point`/`path` with a new version
    async fn write_secret(
        &self,
        mount_point: &str,
        path: &str,
        payload: &SecretPayload,
    ) -> Result<WriteConfirmation, StoreError>;
}
