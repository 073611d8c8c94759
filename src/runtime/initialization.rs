//! # Initialization
//!
//! Process-wide setup: tracing subscriber and rustls crypto provider.

use crate::constants::{DEFAULT_LOG_FILTER, VERBOSE_LOG_FILTER};
use anyhow::{anyhow, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber
///
/// Logs go to stderr so that dry-run output on stdout stays machine readable.
/// Verbose mode forces debug output; otherwise `RUST_LOG` is honoured and
/// falls back to `vault_keys=info`.
pub fn init_tracing(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize tracing: {e}"))
}

/// Install ring as the rustls crypto provider used by the Vault HTTP client
///
/// Required for rustls 0.23+ when no default provider is set via features.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}
