//! # Inline Vault Values
//!
//! Replaces `!vault` tagged YAML scalars with their decrypted text.

use super::error::{CryptError, CryptFailureReason};
use super::VaultCrypter;
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

const VAULT_TAG: &str = "vault";

/// Recursively decrypt every `!vault` scalar in a YAML document
pub(crate) fn resolve_vault_tags(value: Value, crypter: &VaultCrypter) -> Result<Value, CryptError> {
    match value {
        Value::Tagged(tagged) if tagged.tag == VAULT_TAG => {
            let vaulttext = tagged.value.as_str().ok_or_else(|| {
                CryptError::new(
                    CryptFailureReason::InvalidFormat,
                    "!vault tag must be applied to a string scalar",
                )
            })?;
            Ok(Value::String(crypter.decrypt_to_string(vaulttext)?))
        }
        Value::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            Ok(Value::Tagged(Box::new(TaggedValue {
                tag,
                value: resolve_vault_tags(value, crypter)?,
            })))
        }
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| resolve_vault_tags(item, crypter))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence),
        Value::Mapping(mapping) => mapping
            .into_iter()
            .map(|(k, v)| Ok((k, resolve_vault_tags(v, crypter)?)))
            .collect::<Result<Mapping, CryptError>>()
            .map(Value::Mapping),
        other => Ok(other),
    }
}
