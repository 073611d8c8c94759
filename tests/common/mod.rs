//! Shared test helpers
//!
//! - `KeyTree` - temporary encrypted key tree plus password file
//! - `mock_vault` - in-process mock of the Vault KV v2 HTTP API

#![allow(dead_code, reason = "each test binary uses a different subset")]

pub mod mock_vault;

use std::path::PathBuf;
use tempfile::TempDir;
use vault_keys::config::{KeyTarget, Settings, VaultConfig};
use vault_keys::crypter::{VaultCrypter, VaultPassword};
use vault_keys::KeyTreeParser;

pub const PASSWORD: &str = "correct horse";

/// Temporary `kv/` tree whose files are encrypted with `PASSWORD`
pub struct KeyTree {
    pub dir: TempDir,
    pub base: PathBuf,
    pub password_file: PathBuf,
    pub crypter: VaultCrypter,
}

impl KeyTree {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("kv");
        std::fs::create_dir_all(&base).unwrap();

        let password_file = dir.path().join("vault-pass");
        std::fs::write(&password_file, format!("{PASSWORD}\n")).unwrap();

        let crypter = VaultCrypter::new(VaultPassword::from_bytes(PASSWORD.as_bytes()).unwrap());
        Self {
            dir,
            base,
            password_file,
            crypter,
        }
    }

    /// Write a whole-file encrypted key definition under the base directory
    pub fn add_encrypted(&self, relative: &str, plaintext: &str) -> PathBuf {
        let vaulttext = self.crypter.encrypt(plaintext.as_bytes()).unwrap();
        self.add_raw(relative, &vaulttext)
    }

    /// Write a file verbatim under the base directory
    pub fn add_raw(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.base.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.base.join(relative)
    }

    pub fn parser(&self) -> KeyTreeParser {
        KeyTreeParser::new(self.crypter.clone(), &self.base)
    }

    pub fn settings(&self, dry_run: bool, target: KeyTarget) -> Settings {
        Settings {
            base_dir: self.base.clone(),
            password_file: self.password_file.clone(),
            dry_run,
            verbose: false,
            target,
        }
    }
}

/// Indent vault text so it can be embedded as a `!vault |` block scalar
pub fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines().map(|l| format!("{pad}{l}\n")).collect()
}

pub fn vault_config(address: &str, token: &str) -> VaultConfig {
    VaultConfig {
        address: address.to_string(),
        token: Some(token.to_string()),
        ca_cert: None,
        namespace: None,
    }
}
