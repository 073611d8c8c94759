//! # Ansible Vault Envelope
//!
//! Parses, formats, seals and opens the `$ANSIBLE_VAULT` 1.1/1.2 `AES256` format.
//!
//! ## Format
//!
//! ```text
//! $ANSIBLE_VAULT;1.1;AES256
//! <hex(hex(salt) "\n" hex(hmac) "\n" hex(ciphertext)), wrapped at 80 columns>
//! ```
//!
//! Keys are derived with PBKDF2-HMAC-SHA256 (10000 iterations) into 80 bytes:
//! a 32-byte AES-256 key, a 32-byte HMAC-SHA256 key and a 16-byte CTR IV.
//! The HMAC covers the ciphertext; the plaintext is PKCS#7 padded to 16 bytes.

use super::error::{CryptError, CryptFailureReason};
use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use zeroize::Zeroizing;

type Aes256Ctr = ctr::Ctr128BE<Aes256>;
type HmacSha256 = Hmac<Sha256>;

pub(crate) const VAULT_HEADER_PREFIX: &str = "$ANSIBLE_VAULT;";
const VAULT_MAGIC: &str = "$ANSIBLE_VAULT";
const SUPPORTED_CIPHER: &str = "AES256";
const VERSION_1_1: &str = "1.1";
const VERSION_1_2: &str = "1.2";

const PBKDF2_ITERATIONS: u32 = 10_000;
pub const SALT_LEN: usize = 32;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;
const DERIVED_LEN: usize = 2 * KEY_LEN + IV_LEN;
const BLOCK_LEN: usize = 16;
const LINE_WIDTH: usize = 80;

/// A parsed Ansible Vault envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    version: String,
    vault_id: Option<String>,
    salt: Vec<u8>,
    hmac: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl Envelope {
    /// Parse vault text (header line plus hex body)
    pub fn parse(vaulttext: &str) -> Result<Self, CryptError> {
        let trimmed = vaulttext.trim();
        let (header, body) = trimmed
            .split_once('\n')
            .ok_or_else(|| invalid("envelope has a header but no body"))?;

        let mut fields = header.trim().split(';').map(str::trim);
        if fields.next() != Some(VAULT_MAGIC) {
            return Err(invalid(format!(
                "header does not start with {VAULT_HEADER_PREFIX}"
            )));
        }

        let version = fields
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| invalid("header is missing the format version"))?;
        if version != VERSION_1_1 && version != VERSION_1_2 {
            return Err(invalid(format!("unsupported format version '{version}'")));
        }

        let cipher = fields
            .next()
            .ok_or_else(|| invalid("header is missing the cipher name"))?;
        if cipher != SUPPORTED_CIPHER {
            return Err(CryptError::new(
                CryptFailureReason::UnsupportedCipher,
                format!("cipher '{cipher}' is not supported"),
            ));
        }

        let vault_id = fields
            .next()
            .filter(|id| !id.is_empty())
            .map(ToString::to_string);

        // YAML block scalars and hand-edited files may carry any whitespace
        let hex_body: String = body.split_whitespace().collect();
        let inner = hex::decode(&hex_body)
            .map_err(|e| invalid(format!("body is not valid hex: {e}")))?;
        let inner = String::from_utf8(inner)
            .map_err(|e| invalid(format!("decoded body is not text: {e}")))?;

        let mut parts = inner.splitn(3, '\n');
        let salt = decode_part(parts.next(), "salt")?;
        let hmac = decode_part(parts.next(), "hmac")?;
        let ciphertext = decode_part(parts.next(), "ciphertext")?;

        Ok(Self {
            version: version.to_string(),
            vault_id,
            salt,
            hmac,
            ciphertext,
        })
    }

    /// Encrypt plaintext into a 1.1 envelope with the given salt
    pub fn seal(password: &[u8], plaintext: &[u8], salt: [u8; SALT_LEN]) -> Result<Self, CryptError> {
        let keys = DerivedKeys::derive(password, &salt);

        let mut ciphertext = pkcs7_pad(plaintext);
        keys.cipher()?.apply_keystream(&mut ciphertext);

        let mut mac = keys.mac()?;
        mac.update(&ciphertext);
        let hmac = mac.finalize().into_bytes().to_vec();

        Ok(Self {
            version: VERSION_1_1.to_string(),
            vault_id: None,
            salt: salt.to_vec(),
            hmac,
            ciphertext,
        })
    }

    /// Verify the HMAC and decrypt the payload
    pub fn open(&self, password: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptError> {
        let keys = DerivedKeys::derive(password, &self.salt);

        let mut mac = keys.mac()?;
        mac.update(&self.ciphertext);
        mac.verify_slice(&self.hmac).map_err(|e| {
            CryptError::new(
                CryptFailureReason::WrongPassword,
                format!("HMAC verification failed ({e}); the password is wrong or the ciphertext was modified"),
            )
        })?;

        let mut plaintext = Zeroizing::new(self.ciphertext.clone());
        keys.cipher()?.apply_keystream(plaintext.as_mut_slice());
        pkcs7_unpad(plaintext)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn vault_id(&self) -> Option<&str> {
        self.vault_id.as_deref()
    }

    fn header(&self) -> String {
        match &self.vault_id {
            Some(id) => format!("{VAULT_MAGIC};{VERSION_1_2};{SUPPORTED_CIPHER};{id}"),
            None => format!("{VAULT_MAGIC};{};{SUPPORTED_CIPHER}", self.version),
        }
    }
}

impl fmt::Display for Envelope {
    /// Render the envelope exactly as `ansible-vault` writes it, trailing newline included
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = format!(
            "{}\n{}\n{}",
            hex::encode(&self.salt),
            hex::encode(&self.hmac),
            hex::encode(&self.ciphertext)
        );
        let body = hex::encode(inner.as_bytes());

        writeln!(f, "{}", self.header())?;
        for (i, c) in body.chars().enumerate() {
            if i > 0 && i % LINE_WIDTH == 0 {
                writeln!(f)?;
            }
            write!(f, "{c}")?;
        }
        writeln!(f)
    }
}

/// PBKDF2 output split into cipher key, HMAC key and IV
struct DerivedKeys(Zeroizing<[u8; DERIVED_LEN]>);

impl DerivedKeys {
    fn derive(password: &[u8], salt: &[u8]) -> Self {
        let mut derived = Zeroizing::new([0u8; DERIVED_LEN]);
        pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, derived.as_mut_slice());
        Self(derived)
    }

    fn cipher(&self) -> Result<Aes256Ctr, CryptError> {
        Aes256Ctr::new_from_slices(&self.0[..KEY_LEN], &self.0[2 * KEY_LEN..])
            .map_err(|e| invalid(format!("cannot initialise AES-256-CTR: {e}")))
    }

    fn mac(&self) -> Result<HmacSha256, CryptError> {
        HmacSha256::new_from_slice(&self.0[KEY_LEN..2 * KEY_LEN])
            .map_err(|e| invalid(format!("cannot initialise HMAC-SHA256: {e}")))
    }
}

fn decode_part(part: Option<&str>, name: &str) -> Result<Vec<u8>, CryptError> {
    let part = part
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| invalid(format!("envelope is missing the {name}")))?;
    hex::decode(part).map_err(|e| invalid(format!("{name} is not valid hex: {e}")))
}

fn pkcs7_pad(data: &[u8]) -> Vec<u8> {
    let pad = BLOCK_LEN - data.len() % BLOCK_LEN;
    let mut padded = Vec::with_capacity(data.len() + pad);
    padded.extend_from_slice(data);
    // pad is always in 1..=16
    padded.resize(data.len() + pad, pad as u8);
    padded
}

fn pkcs7_unpad(mut data: Zeroizing<Vec<u8>>) -> Result<Zeroizing<Vec<u8>>, CryptError> {
    let pad = data.last().copied().map_or(0, usize::from);
    let valid = pad > 0
        && pad <= BLOCK_LEN
        && pad <= data.len()
        && data[data.len() - pad..].iter().all(|&b| usize::from(b) == pad);
    if !valid {
        return Err(CryptError::new(
            CryptFailureReason::CorruptedPayload,
            "decrypted payload has invalid PKCS#7 padding",
        ));
    }
    let len = data.len() - pad;
    data.truncate(len);
    Ok(data)
}

fn invalid(message: impl Into<String>) -> CryptError {
    CryptError::new(CryptFailureReason::InvalidFormat, message)
}
