//! # Key Data Model
//!
//! `KeyEntry` pairs a logical store path with a `SecretPayload`. Payloads are
//! built from decrypted YAML key data by field presence, first match wins:
//! `value`, then `token`, then the `tls.crt` + `tls.key` pair.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;
use thiserror::Error;

/// Secret data as stored in a KV v2 secret (the `data.data` object)
pub type SecretData = serde_json::Map<String, JsonValue>;

const FIELD_VALUE: &str = "value";
const FIELD_TOKEN: &str = "token";
const FIELD_TLS_CRT: &str = "tls.crt";
const FIELD_TLS_KEY: &str = "tls.key";
const FIELD_PATH: &str = "path";

/// Errors raised while turning YAML key data into entries
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyDataError {
    #[error("key data must be a mapping, found {0}")]
    NotAMapping(&'static str),

    #[error("manifest must be a sequence of records, found {0}")]
    NotASequence(&'static str),

    #[error("manifest record {0} is missing the 'path' field")]
    MissingPath(usize),

    #[error("key data has none of the fields value, token or tls.crt + tls.key (found: {})", .0.join(", "))]
    UnrecognizedShape(Vec<String>),

    #[error("field '{field}' must be a string, number or boolean, found {found}")]
    InvalidField { field: String, found: &'static str },

    #[error("key has no mount point: its logical path is empty")]
    MissingMount,
}

/// The secret written to a single store path
///
/// Serializes to the field-keyed object stored in Vault, e.g.
/// `{"value":"alice"}` or `{"tls.crt":"...","tls.key":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecretPayload {
    Value {
        value: String,
    },
    Token {
        token: String,
    },
    Tls {
        #[serde(rename = "tls.crt")]
        crt: String,
        #[serde(rename = "tls.key")]
        key: String,
    },
}

impl SecretPayload {
    /// Build a payload from a decrypted key-data mapping
    pub fn from_key_data(data: &YamlValue) -> Result<Self, KeyDataError> {
        let mapping = data
            .as_mapping()
            .ok_or_else(|| KeyDataError::NotAMapping(yaml_kind(data)))?;

        if let Some(value) = mapping.get(FIELD_VALUE) {
            return Ok(Self::Value {
                value: scalar_to_string(FIELD_VALUE, value)?,
            });
        }
        if let Some(token) = mapping.get(FIELD_TOKEN) {
            return Ok(Self::Token {
                token: scalar_to_string(FIELD_TOKEN, token)?,
            });
        }
        if let (Some(crt), Some(key)) = (mapping.get(FIELD_TLS_CRT), mapping.get(FIELD_TLS_KEY)) {
            return Ok(Self::Tls {
                crt: scalar_to_string(FIELD_TLS_CRT, crt)?,
                key: scalar_to_string(FIELD_TLS_KEY, key)?,
            });
        }

        let found = mapping
            .keys()
            .filter_map(|k| k.as_str())
            .filter(|k| *k != FIELD_PATH)
            .map(ToString::to_string)
            .collect();
        Err(KeyDataError::UnrecognizedShape(found))
    }

    /// Variant name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Value { .. } => FIELD_VALUE,
            Self::Token { .. } => FIELD_TOKEN,
            Self::Tls { .. } => "tls",
        }
    }

    /// The object written as the secret's data
    pub fn to_data(&self) -> SecretData {
        let mut data = SecretData::new();
        match self {
            Self::Value { value } => {
                data.insert(FIELD_VALUE.to_string(), JsonValue::String(value.clone()));
            }
            Self::Token { token } => {
                data.insert(FIELD_TOKEN.to_string(), JsonValue::String(token.clone()));
            }
            Self::Tls { crt, key } => {
                data.insert(FIELD_TLS_CRT.to_string(), JsonValue::String(crt.clone()));
                data.insert(FIELD_TLS_KEY.to_string(), JsonValue::String(key.clone()));
            }
        }
        data
    }

    /// Deep equality against data read back from the store
    pub fn matches(&self, stored: &SecretData) -> bool {
        self.to_data() == *stored
    }
}

/// One secret to sync: logical path plus payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    /// Slash-delimited path; first segment is the mount
    pub path: String,
    pub payload: SecretPayload,
}

impl KeyEntry {
    pub fn new(path: impl Into<String>, payload: SecretPayload) -> Self {
        Self {
            path: path.into(),
            payload,
        }
    }

    /// Split the logical path into mount point and in-mount path
    ///
    /// `secret/db/user` maps to (`secret`, `db/user`); a path with a single
    /// segment maps to an empty in-mount path.
    pub fn mount_and_path(&self) -> (&str, &str) {
        self.path.split_once('/').unwrap_or((self.path.as_str(), ""))
    }

    /// `<logical-path>=<json-payload>` line used by dry runs
    pub fn dump_line(&self) -> Result<String, serde_json::Error> {
        Ok(format!("{}={}", self.path, serde_json::to_string(&self.payload)?))
    }
}

/// Expand a manifest (sequence of records with their own `path`) into entries
pub fn read_all_keys(document: &YamlValue, base_path: &str) -> Result<Vec<KeyEntry>, KeyDataError> {
    let records: &[YamlValue] = match document {
        YamlValue::Sequence(records) => records.as_slice(),
        YamlValue::Null => &[],
        other => return Err(KeyDataError::NotASequence(yaml_kind(other))),
    };

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let relative = record
                .get(FIELD_PATH)
                .ok_or(KeyDataError::MissingPath(index))
                .and_then(|p| scalar_to_string(FIELD_PATH, p))?;
            let payload = SecretPayload::from_key_data(record)?;
            mounted_entry(join_logical(base_path, &relative), payload)
        })
        .collect()
}

/// A single-key file: the whole document is the key data
pub fn read_one_key(document: &YamlValue, path: &str) -> Result<KeyEntry, KeyDataError> {
    mounted_entry(path.to_string(), SecretPayload::from_key_data(document)?)
}

/// The first path segment is the mount and must not be empty
fn mounted_entry(path: String, payload: SecretPayload) -> Result<KeyEntry, KeyDataError> {
    let entry = KeyEntry::new(path, payload);
    if entry.mount_and_path().0.is_empty() {
        return Err(KeyDataError::MissingMount);
    }
    Ok(entry)
}

/// Join two logical path fragments with exactly one `/`
pub fn join_logical(base: &str, relative: &str) -> String {
    let base = base.trim_end_matches('/');
    let relative = relative.trim_matches('/');
    match (base.is_empty(), relative.is_empty()) {
        (true, _) => relative.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{relative}"),
    }
}

fn scalar_to_string(field: &str, value: &YamlValue) -> Result<String, KeyDataError> {
    match value {
        YamlValue::String(s) => Ok(s.clone()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Tagged(tagged) => scalar_to_string(field, &tagged.value),
        other => Err(KeyDataError::InvalidField {
            field: field.to_string(),
            found: yaml_kind(other),
        }),
    }
}

fn yaml_kind(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "boolean",
        YamlValue::Number(_) => "number",
        YamlValue::String(_) => "string",
        YamlValue::Sequence(_) => "sequence",
        YamlValue::Mapping(_) => "mapping",
        YamlValue::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(text: &str) -> YamlValue {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_value_wins_over_token() {
        let payload = SecretPayload::from_key_data(&yaml("token: t\nvalue: v\n")).unwrap();
        assert_eq!(payload, SecretPayload::Value { value: "v".into() });
    }

    #[test]
    fn test_token_wins_over_tls() {
        let payload =
            SecretPayload::from_key_data(&yaml("tls.crt: c\ntls.key: k\ntoken: t\n")).unwrap();
        assert_eq!(payload, SecretPayload::Token { token: "t".into() });
    }

    #[test]
    fn test_tls_pair() {
        let payload = SecretPayload::from_key_data(&yaml("tls.crt: CERT\ntls.key: KEY\n")).unwrap();
        assert_eq!(
            payload,
            SecretPayload::Tls {
                crt: "CERT".into(),
                key: "KEY".into()
            }
        );
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"tls.crt":"CERT","tls.key":"KEY"}"#
        );
    }

    #[test]
    fn test_half_tls_pair_is_unrecognized() {
        let err = SecretPayload::from_key_data(&yaml("path: x\ntls.crt: CERT\n")).unwrap_err();
        assert_eq!(err, KeyDataError::UnrecognizedShape(vec!["tls.crt".into()]));
    }

    #[test]
    fn test_scalars_are_rendered_as_strings() {
        let payload = SecretPayload::from_key_data(&yaml("value: 5432\n")).unwrap();
        assert_eq!(payload, SecretPayload::Value { value: "5432".into() });
        let payload = SecretPayload::from_key_data(&yaml("token: true\n")).unwrap();
        assert_eq!(payload, SecretPayload::Token { token: "true".into() });
    }

    #[test]
    fn test_null_and_nested_values_rejected() {
        let err = SecretPayload::from_key_data(&yaml("value:\n")).unwrap_err();
        assert_eq!(
            err,
            KeyDataError::InvalidField {
                field: "value".into(),
                found: "null"
            }
        );
        let err = SecretPayload::from_key_data(&yaml("value: [a, b]\n")).unwrap_err();
        assert!(matches!(err, KeyDataError::InvalidField { found: "sequence", .. }));
    }

    #[test]
    fn test_key_data_must_be_mapping() {
        let err = SecretPayload::from_key_data(&yaml("- value: a\n")).unwrap_err();
        assert_eq!(err, KeyDataError::NotAMapping("sequence"));
    }

    #[test]
    fn test_matches_stored_data() {
        let payload = SecretPayload::Value { value: "alice".into() };
        let same: SecretData = serde_json::from_str(r#"{"value":"alice"}"#).unwrap();
        let other: SecretData = serde_json::from_str(r#"{"value":"bob"}"#).unwrap();
        let extra: SecretData = serde_json::from_str(r#"{"value":"alice","note":"x"}"#).unwrap();
        assert!(payload.matches(&same));
        assert!(!payload.matches(&other));
        assert!(!payload.matches(&extra));
    }

    #[test]
    fn test_dump_line_decodes_back_to_payload() {
        for payload in [
            SecretPayload::Value { value: "alice".into() },
            SecretPayload::Token { token: "tok123".into() },
            SecretPayload::Tls {
                crt: "CERT".into(),
                key: "KEY".into(),
            },
        ] {
            let line = KeyEntry::new("secret/x", payload.clone()).dump_line().unwrap();
            let (path, json) = line.split_once('=').unwrap();
            assert_eq!(path, "secret/x");
            let decoded: SecretPayload = serde_json::from_str(json).unwrap();
            assert_eq!(decoded, payload);
        }
    }

    #[test]
    fn test_mount_and_path() {
        let payload = SecretPayload::Value { value: "v".into() };
        assert_eq!(
            KeyEntry::new("secret/db/user", payload.clone()).mount_and_path(),
            ("secret", "db/user")
        );
        assert_eq!(KeyEntry::new("secret", payload).mount_and_path(), ("secret", ""));
    }

    #[test]
    fn test_read_all_keys() {
        let doc = yaml("- path: user\n  value: alice\n- path: pass\n  value: s3cr3t\n");
        let keys = read_all_keys(&doc, "secret/db").unwrap();
        assert_eq!(
            keys,
            vec![
                KeyEntry::new("secret/db/user", SecretPayload::Value { value: "alice".into() }),
                KeyEntry::new("secret/db/pass", SecretPayload::Value { value: "s3cr3t".into() }),
            ]
        );
    }

    #[test]
    fn test_read_all_keys_requires_path() {
        let doc = yaml("- path: user\n  value: alice\n- value: orphan\n");
        assert_eq!(read_all_keys(&doc, "secret").unwrap_err(), KeyDataError::MissingPath(1));
    }

    #[test]
    fn test_read_all_keys_rejects_mapping() {
        let doc = yaml("value: alice\n");
        assert_eq!(
            read_all_keys(&doc, "secret").unwrap_err(),
            KeyDataError::NotASequence("mapping")
        );
    }

    #[test]
    fn test_entry_without_mount_rejected() {
        let doc = yaml("token: tok123\n");
        assert_eq!(read_one_key(&doc, "").unwrap_err(), KeyDataError::MissingMount);

        let doc = yaml("- path: ''\n  value: a\n");
        assert_eq!(read_all_keys(&doc, "").unwrap_err(), KeyDataError::MissingMount);

        let doc = yaml("- path: secret/app\n  value: a\n");
        assert_eq!(read_all_keys(&doc, "").unwrap()[0].path, "secret/app");
    }

    #[test]
    fn test_join_logical() {
        assert_eq!(join_logical("secret/db", "user"), "secret/db/user");
        assert_eq!(join_logical("", "secret/user"), "secret/user");
        assert_eq!(join_logical("secret/", "/user/"), "secret/user");
        assert_eq!(join_logical("secret", ""), "secret");
    }
}
