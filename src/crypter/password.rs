//! # Vault Password Loading
//!
//! Loads the shared vault password from a file. An executable file is run as a
//! script and its standard output is used as the password, matching how
//! `ansible-vault` treats `--vault-password-file`.

use super::error::{CryptError, CryptFailureReason};
use std::fmt;
use std::path::Path;
use std::process::Command;
use tracing::debug;
use zeroize::Zeroizing;

/// Vault password bytes, wiped from memory on drop
#[derive(Clone)]
pub struct VaultPassword(Zeroizing<Vec<u8>>);

impl fmt::Debug for VaultPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultPassword(<redacted>)")
    }
}

impl VaultPassword {
    /// Build a password from raw bytes, stripping surrounding whitespace
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptError> {
        Self::from_stripped(bytes.trim_ascii())
    }

    /// Build a password from script output; only surrounding CR/LF is stripped
    pub fn from_script_output(stdout: &[u8]) -> Result<Self, CryptError> {
        let start = stdout
            .iter()
            .position(|b| !matches!(b, b'\r' | b'\n'))
            .unwrap_or(stdout.len());
        let end = stdout
            .iter()
            .rposition(|b| !matches!(b, b'\r' | b'\n'))
            .map_or(start, |i| i + 1);
        Self::from_stripped(&stdout[start..end])
    }

    fn from_stripped(stripped: &[u8]) -> Result<Self, CryptError> {
        if stripped.is_empty() {
            return Err(CryptError::new(
                CryptFailureReason::EmptyPassword,
                "vault password is empty",
            ));
        }
        Ok(Self(Zeroizing::new(stripped.to_vec())))
    }

    /// Load the password from a plain file or a password script
    pub fn from_file(path: &Path) -> Result<Self, CryptError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            let reason = if e.kind() == std::io::ErrorKind::NotFound {
                CryptFailureReason::PasswordFileNotFound
            } else {
                CryptFailureReason::PasswordFileUnreadable
            };
            CryptError::new(
                reason,
                format!("vault password file {}: {e}", path.display()),
            )
        })?;

        if !metadata.is_file() {
            return Err(CryptError::new(
                CryptFailureReason::PasswordFileUnreadable,
                format!("vault password file {} is not a regular file", path.display()),
            ));
        }

        if is_executable(&metadata) {
            debug!("Running vault password script: {}", path.display());
            return Self::from_script(path);
        }

        debug!("Reading vault password file: {}", path.display());
        let contents = Zeroizing::new(std::fs::read(path).map_err(|e| {
            CryptError::new(
                CryptFailureReason::PasswordFileUnreadable,
                format!("failed to read vault password file {}: {e}", path.display()),
            )
        })?);
        Self::from_bytes(&contents)
    }

    fn from_script(path: &Path) -> Result<Self, CryptError> {
        let output = Command::new(path).output().map_err(|e| {
            CryptError::new(
                CryptFailureReason::PasswordScriptFailed,
                format!("failed to run vault password script {}: {e}", path.display()),
            )
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CryptError::new(
                CryptFailureReason::PasswordScriptFailed,
                format!(
                    "vault password script {} exited with {}: {}",
                    path.display(),
                    output.status,
                    stderr.trim()
                ),
            ));
        }

        let stdout = Zeroizing::new(output.stdout);
        Self::from_script_output(&stdout)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    false
}
