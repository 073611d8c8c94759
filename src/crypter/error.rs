//! # Decryption Error Types
//!
//! Defines error types for Ansible Vault decryption with a classification of
//! the failure reason and remediation guidance.

use thiserror::Error;

/// Ansible Vault decryption error with classification
#[derive(Debug, Error)]
#[error("Ansible Vault decryption failed: {reason:?} - {message}")]
pub struct CryptError {
    pub reason: CryptFailureReason,
    pub message: String,
}

impl CryptError {
    pub fn new(reason: CryptFailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    /// Get remediation guidance for this error
    pub fn remediation(&self) -> &'static str {
        self.reason.remediation()
    }
}

/// Classification of decryption failure reasons
///
/// Every reason is fatal for a run: the read phase has no partial-success mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptFailureReason {
    /// Password file does not exist
    PasswordFileNotFound,
    /// Password file exists but could not be read
    PasswordFileUnreadable,
    /// Executable password file exited non-zero or could not be spawned
    PasswordScriptFailed,
    /// Password is empty after stripping whitespace
    EmptyPassword,
    /// Envelope header or hex body is malformed
    InvalidFormat,
    /// Envelope names a cipher other than AES256
    UnsupportedCipher,
    /// HMAC check failed (wrong password or tampered ciphertext)
    WrongPassword,
    /// Ciphertext decrypted but padding or encoding is invalid
    CorruptedPayload,
    /// Decrypted content is not valid YAML
    InvalidYaml,
    /// Key file could not be read
    Io,
}

impl CryptFailureReason {
    /// Get remediation guidance for this error type
    pub fn remediation(&self) -> &'static str {
        match self {
            CryptFailureReason::PasswordFileNotFound => {
                "Set ANSIBLE_VAULT_PASSWORD_FILE or pass --vault-password-file with the path of an existing file."
            }
            CryptFailureReason::PasswordFileUnreadable => {
                "Check the permissions of the vault password file."
            }
            CryptFailureReason::PasswordScriptFailed => {
                "The vault password file is executable and is run as a script. Make sure it prints the password and exits 0, or remove the executable bit."
            }
            CryptFailureReason::EmptyPassword => "The vault password file must not be empty.",
            CryptFailureReason::InvalidFormat => {
                "The file does not contain a valid $ANSIBLE_VAULT envelope. Re-encrypt it with ansible-vault."
            }
            CryptFailureReason::UnsupportedCipher => {
                "Only the AES256 Ansible Vault cipher is supported."
            }
            CryptFailureReason::WrongPassword => {
                "Verify the vault password matches the one used to encrypt the key tree."
            }
            CryptFailureReason::CorruptedPayload => {
                "The ciphertext decrypted to invalid data. Verify the file was not modified after encryption."
            }
            CryptFailureReason::InvalidYaml => {
                "The decrypted content is not valid YAML. Check the key definition with ansible-vault view."
            }
            CryptFailureReason::Io => "Check that the key file exists and is readable.",
        }
    }
}
