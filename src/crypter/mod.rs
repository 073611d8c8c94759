//! # Ansible Vault Decryption
//!
//! Decrypts key definition files encrypted with a shared vault password.
//!
//! ## Module Structure
//!
//! - `envelope.rs` - `$ANSIBLE_VAULT` format, key derivation and AES-256-CTR
//! - `password.rs` - Password file and password script loading
//! - `detection.rs` - Whole-file envelope detection
//! - `yaml.rs` - Inline `!vault` scalar resolution
//! - `error.rs` - Error types and classification

pub mod detection;
pub mod envelope;
pub mod error;
pub mod password;
mod yaml;

pub use detection::is_vault_encrypted;
pub use envelope::Envelope;
pub use error::{CryptError, CryptFailureReason};
pub use password::VaultPassword;

use rand::RngCore;
use serde_yaml::Value;
use std::path::Path;
use tracing::debug;
use zeroize::Zeroizing;

/// Reusable decryption context bound to one vault password
#[derive(Debug, Clone)]
pub struct VaultCrypter {
    password: VaultPassword,
}

impl VaultCrypter {
    pub fn new(password: VaultPassword) -> Self {
        Self { password }
    }

    /// Create a crypter from a password file (or password script)
    pub fn from_password_file(path: impl AsRef<Path>) -> Result<Self, CryptError> {
        VaultPassword::from_file(path.as_ref()).map(Self::new)
    }

    /// Decrypt an `$ANSIBLE_VAULT` envelope
    pub fn decrypt(&self, vaulttext: &str) -> Result<Zeroizing<Vec<u8>>, CryptError> {
        Envelope::parse(vaulttext)?.open(self.password.as_bytes())
    }

    /// Decrypt an envelope whose plaintext is UTF-8 text
    pub fn decrypt_to_string(&self, vaulttext: &str) -> Result<String, CryptError> {
        let plaintext = self.decrypt(vaulttext)?;
        String::from_utf8(plaintext.to_vec()).map_err(|e| {
            CryptError::new(
                CryptFailureReason::CorruptedPayload,
                format!("decrypted payload is not UTF-8: {e}"),
            )
        })
    }

    /// Encrypt plaintext into a 1.1 envelope with a random salt
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, CryptError> {
        let mut salt = [0u8; envelope::SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        Envelope::seal(self.password.as_bytes(), plaintext, salt).map(|e| e.to_string())
    }

    /// Read a key definition file, decrypt it and parse it as YAML
    ///
    /// Whole-file envelopes are decrypted before parsing; inline `!vault`
    /// scalars are decrypted after parsing.
    pub fn load(&self, path: &Path) -> Result<Value, CryptError> {
        debug!("Loading key file: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            CryptError::new(
                CryptFailureReason::Io,
                format!("failed to read {}: {e}", path.display()),
            )
        })?;

        self.load_str(&content).map_err(|e| {
            CryptError::new(e.reason, format!("{}: {}", path.display(), e.message))
        })
    }

    /// Decrypt and parse YAML content already in memory
    pub fn load_str(&self, content: &str) -> Result<Value, CryptError> {
        let document = if is_vault_encrypted(content) {
            let plaintext = self.decrypt_to_string(content)?;
            parse_yaml(&plaintext)?
        } else {
            parse_yaml(content)?
        };
        yaml::resolve_vault_tags(document, self)
    }
}

fn parse_yaml(content: &str) -> Result<Value, CryptError> {
    serde_yaml::from_str(content).map_err(|e| {
        CryptError::new(
            CryptFailureReason::InvalidYaml,
            format!("invalid YAML: {e}"),
        )
    })
}
