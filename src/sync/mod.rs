//! # Secret Syncing
//!
//! Reconciles parsed key entries against a `SecretStore`, or dumps them for a
//! dry run.
//!
//! Apply is idempotent: an entry whose stored data already equals its payload
//! is skipped, so re-running against an unchanged store creates no new secret
//! versions. A write rejected as an invalid request is logged and the run
//! continues; any other store failure aborts the run.

use crate::parser::KeyEntry;
use crate::provider::{SecretStore, StoreError, WriteConfirmation};
use std::io::Write;
use tracing::{debug, error, info};

/// Result of applying one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// A new version was written
    Written(WriteConfirmation),
    /// The stored data already matched
    Unchanged,
    /// The store rejected the write (message from the store)
    Rejected(String),
}

/// Per-run counts, logged when apply finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub written: usize,
    pub unchanged: usize,
    pub rejected: usize,
}

impl SyncSummary {
    fn record(&mut self, outcome: &EntryOutcome) {
        match outcome {
            EntryOutcome::Written(_) => self.written += 1,
            EntryOutcome::Unchanged => self.unchanged += 1,
            EntryOutcome::Rejected(_) => self.rejected += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.written + self.unchanged + self.rejected
    }
}

/// Applies key entries to a secret store, one at a time
pub struct SyncEngine<'a> {
    store: &'a dyn SecretStore,
}

impl std::fmt::Debug for SyncEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine").finish_non_exhaustive()
    }
}

impl<'a> SyncEngine<'a> {
    pub fn new(store: &'a dyn SecretStore) -> Self {
        Self { store }
    }

    /// Sync one entry: read, compare, write if different
    ///
    /// # Errors
    /// Returns the store error for every failure except a rejected write.
    pub async fn apply_key(&self, entry: &KeyEntry) -> Result<EntryOutcome, StoreError> {
        let (mount_point, path) = entry.mount_and_path();
        debug!("Syncing {} (mount={}, path={})", entry.path, mount_point, path);

        let current = self.store.read_secret(mount_point, path).await?;
        if current.as_ref().is_some_and(|data| entry.payload.matches(data)) {
            info!("{}: key data already exists", entry.path);
            return Ok(EntryOutcome::Unchanged);
        }

        match self.store.write_secret(mount_point, path, &entry.payload).await {
            Ok(confirmation) => {
                info!(
                    "{}: written version {} (created {})",
                    entry.path, confirmation.version, confirmation.created_time
                );
                Ok(EntryOutcome::Written(confirmation))
            }
            Err(e) if e.is_recoverable() => {
                error!("Error: InvalidRequest {} : {}", entry.path, e);
                Ok(EntryOutcome::Rejected(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Sync every entry in order
    ///
    /// # Errors
    /// Stops at the first non-recoverable store error.
    pub async fn apply_keys(&self, keys: &[KeyEntry]) -> Result<SyncSummary, StoreError> {
        let mut summary = SyncSummary::default();
        for entry in keys {
            let outcome = self.apply_key(entry).await?;
            summary.record(&outcome);
        }

        info!(
            "Sync finished: {} written, {} unchanged, {} rejected",
            summary.written, summary.unchanged, summary.rejected
        );
        Ok(summary)
    }
}

/// Write `<logical-path>=<json-payload>` for every entry, in order
pub fn dump_keys(keys: &[KeyEntry], out: &mut impl Write) -> std::io::Result<()> {
    for entry in keys {
        writeln!(out, "{}", entry.dump_line()?)?;
    }
    out.flush()
}
