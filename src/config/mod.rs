//! # Configuration
//!
//! Run configuration is built once at start-up from the parsed command line and
//! the environment, then passed by reference to the parser and sync engine.
//!
//! - `Settings` - what to read and how to run (dry run, verbosity, target)
//! - `VaultConfig` - how to reach the secret store

mod vault;

pub use vault::{VaultConfig, DEFAULT_VAULT_ADDR};

use crate::cli::Cli;
use crate::constants::{ENV_DRY_RUN, ENV_VAULT_PASSWORD_FILE, ENV_VERBOSE};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration problems reported as usage errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no vault password file given; use --vault-password-file or set ANSIBLE_VAULT_PASSWORD_FILE")]
    MissingPasswordFile,

    #[error("vault password file {} does not exist", .0.display())]
    PasswordFileNotFound(PathBuf),
}

/// Which part of the key tree a run processes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyTarget {
    /// The whole base directory
    Tree,
    /// A sub-directory of the base directory
    Dir(PathBuf),
    /// A single key file
    File(PathBuf),
}

/// Run settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_dir: PathBuf,
    pub password_file: PathBuf,
    pub dry_run: bool,
    pub verbose: bool,
    pub target: KeyTarget,
}

impl Settings {
    /// Resolve settings from the command line and the process environment
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        Self::resolve(cli, |key| std::env::var(key).ok())
    }

    /// Resolve settings from the command line and an arbitrary variable lookup
    ///
    /// Flags win over environment variables. `VERBOSE` and `DRY_RUN` only need
    /// to be set (to any non-empty value) to take effect.
    pub fn resolve(cli: &Cli, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let is_set = |key: &str| lookup(key).is_some_and(|v| !v.is_empty());

        let password_file = cli
            .vault_password_file
            .clone()
            .or_else(|| lookup(ENV_VAULT_PASSWORD_FILE).filter(|v| !v.is_empty()).map(PathBuf::from))
            .ok_or(ConfigError::MissingPasswordFile)?;
        if !password_file.is_file() {
            return Err(ConfigError::PasswordFileNotFound(password_file));
        }

        let target = match (&cli.key_file, &cli.key_dir) {
            (Some(file), _) => KeyTarget::File(file.clone()),
            (None, Some(dir)) => KeyTarget::Dir(dir.clone()),
            (None, None) => KeyTarget::Tree,
        };

        Ok(Self {
            base_dir: cli.base_dir.clone(),
            password_file,
            dry_run: cli.dry_run || is_set(ENV_DRY_RUN),
            verbose: cli.verbose || is_set(ENV_VERBOSE),
            target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, String)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn password_file() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "pw\n").unwrap();
        file
    }

    #[test]
    fn test_password_file_from_env() {
        let file = password_file();
        let path = file.path().to_string_lossy().to_string();
        let cli = Cli::parse_from(["vault-keys"]);

        let settings =
            Settings::resolve(&cli, lookup(&[(ENV_VAULT_PASSWORD_FILE, path.clone())])).unwrap();
        assert_eq!(settings.password_file, PathBuf::from(path));
        assert_eq!(settings.target, KeyTarget::Tree);
        assert!(!settings.dry_run);
        assert!(!settings.verbose);
    }

    #[test]
    fn test_flag_overrides_env_password_file() {
        let file = password_file();
        let flag = file.path().to_string_lossy().to_string();
        let cli = Cli::parse_from(["vault-keys", "-p", flag.as_str()]);

        let settings = Settings::resolve(
            &cli,
            lookup(&[(ENV_VAULT_PASSWORD_FILE, "/does/not/exist".to_string())]),
        )
        .unwrap();
        assert_eq!(settings.password_file, PathBuf::from(flag));
    }

    #[test]
    fn test_missing_password_file() {
        let cli = Cli::parse_from(["vault-keys"]);
        assert_eq!(
            Settings::resolve(&cli, lookup(&[])).unwrap_err(),
            ConfigError::MissingPasswordFile
        );

        let cli = Cli::parse_from(["vault-keys", "-p", "/does/not/exist"]);
        assert_eq!(
            Settings::resolve(&cli, lookup(&[])).unwrap_err(),
            ConfigError::PasswordFileNotFound(PathBuf::from("/does/not/exist"))
        );
    }

    #[test]
    fn test_env_forces_dry_run_and_verbose() {
        let file = password_file();
        let path = file.path().to_string_lossy().to_string();
        let cli = Cli::parse_from(["vault-keys", "-p", path.as_str()]);

        let settings = Settings::resolve(
            &cli,
            lookup(&[(ENV_DRY_RUN, "1".to_string()), (ENV_VERBOSE, "yes".to_string())]),
        )
        .unwrap();
        assert!(settings.dry_run);
        assert!(settings.verbose);
    }

    #[test]
    fn test_key_target_selection() {
        let file = password_file();
        let path = file.path().to_string_lossy().to_string();

        let cli = Cli::parse_from(["vault-keys", "-p", path.as_str(), "-K", "kv/secret"]);
        let settings = Settings::resolve(&cli, lookup(&[])).unwrap();
        assert_eq!(settings.target, KeyTarget::Dir(PathBuf::from("kv/secret")));

        let cli = Cli::parse_from(["vault-keys", "-p", path.as_str(), "-k", "kv/secret/api/token"]);
        let settings = Settings::resolve(&cli, lookup(&[])).unwrap();
        assert_eq!(
            settings.target,
            KeyTarget::File(PathBuf::from("kv/secret/api/token"))
        );
    }
}
