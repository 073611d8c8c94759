//! # Constants
//!
//! Defaults shared by the CLI, configuration and parser.

/// Base directory of the key tree when `--base-dir` is not given
pub const DEFAULT_KV_BASE_DIR: &str = "./kv/";

/// File name that marks a manifest holding many key records
pub const MANIFEST_FILE_NAME: &str = "__ALL__";

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "vault_keys=info";

/// Tracing filter used when verbose output is requested
pub const VERBOSE_LOG_FILTER: &str = "vault_keys=debug";

/// Environment variable naming the vault password file
pub const ENV_VAULT_PASSWORD_FILE: &str = "ANSIBLE_VAULT_PASSWORD_FILE";

/// Environment variable holding the Vault server address
pub const ENV_VAULT_ADDR: &str = "VAULT_ADDR";

/// Environment variable holding the Vault token
pub const ENV_VAULT_TOKEN: &str = "VAULT_TOKEN";

/// Environment variable pointing at a PEM CA bundle for the Vault server
pub const ENV_VAULT_CACERT: &str = "VAULT_CACERT";

/// Environment variable holding the Vault Enterprise namespace
pub const ENV_VAULT_NAMESPACE: &str = "VAULT_NAMESPACE";

/// Any value forces debug logging
pub const ENV_VERBOSE: &str = "VERBOSE";

/// Any value forces a dry run
pub const ENV_DRY_RUN: &str = "DRY_RUN";
