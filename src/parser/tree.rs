//! # Key Tree Parser
//!
//! Walks the key base directory and accumulates `KeyEntry` records.
//!
//! A file named `__ALL__` is a manifest: a sequence of records each carrying
//! its own relative `path`. Any other file holds one key whose logical path is
//! the file's directory relative to the base directory (the file name is not
//! part of the store path).

use super::key_data::{read_all_keys, read_one_key, KeyDataError, KeyEntry};
use crate::constants::MANIFEST_FILE_NAME;
use crate::crypter::{CryptError, VaultCrypter};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Errors raised while reading the key tree
///
/// All of them abort the run: there is no partial-success read phase.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Decrypt(#[from] CryptError),

    #[error("{}: {source}", .path.display())]
    KeyData {
        path: PathBuf,
        #[source]
        source: KeyDataError,
    },

    #[error("failed to walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("{} is not inside the key base directory {}", .path.display(), .base_dir.display())]
    OutsideBaseDir { path: PathBuf, base_dir: PathBuf },
}

/// Parses encrypted key definitions into an in-memory entry list
#[derive(Debug)]
pub struct KeyTreeParser {
    crypter: VaultCrypter,
    base_dir: PathBuf,
    keys: Vec<KeyEntry>,
}

impl KeyTreeParser {
    pub fn new(crypter: VaultCrypter, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            crypter,
            base_dir: base_dir.into(),
            keys: Vec::new(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Entries accumulated so far, in walk order
    pub fn keys(&self) -> &[KeyEntry] {
        &self.keys
    }

    pub fn into_keys(self) -> Vec<KeyEntry> {
        self.keys
    }

    /// Recursively parse every key file under `dir` (the base directory when `None`)
    ///
    /// Files of a directory are parsed before its subdirectories, in name order.
    /// Hidden files and directories are skipped.
    /// Returns the number of entries added.
    pub fn parse_dirs(&mut self, dir: Option<&Path>) -> Result<usize, ParseError> {
        let root = dir.map_or_else(|| self.base_dir.clone(), Path::to_path_buf);
        info!("Parsing key tree: {}", root.display());

        let before = self.keys.len();
        let walker = WalkDir::new(&root)
            .follow_links(true)
            .sort_by(|a, b| {
                a.file_type()
                    .is_dir()
                    .cmp(&b.file_type().is_dir())
                    .then_with(|| a.file_name().cmp(b.file_name()))
            })
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = entry.map_err(|source| ParseError::Walk {
                path: root.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let logical_path = self.logical_path_of(entry.path())?;
            self.parse_key_file(entry.path(), &logical_path)?;
        }

        let added = self.keys.len() - before;
        info!("Parsed {} key(s) from {}", added, root.display());
        Ok(added)
    }

    /// Parse one key file using `logical_path` as its base path
    ///
    /// Returns the number of entries added.
    pub fn parse_key_file(&mut self, key_file: &Path, logical_path: &str) -> Result<usize, ParseError> {
        let document = self.crypter.load(key_file)?;

        let entries = if is_manifest(key_file) {
            read_all_keys(&document, logical_path)
        } else {
            read_one_key(&document, logical_path).map(|entry| vec![entry])
        }
        .map_err(|source| ParseError::KeyData {
            path: key_file.to_path_buf(),
            source,
        })?;

        for entry in &entries {
            debug!(
                "Parsed key {} ({}) from {}",
                entry.path,
                entry.payload.kind(),
                key_file.display()
            );
        }

        let added = entries.len();
        self.keys.extend(entries);
        Ok(added)
    }

    /// Logical path of a key file: its directory relative to the base directory
    ///
    /// Both paths are canonicalized first, so absolute and relative spellings
    /// of the same tree agree. The lexical comparison is kept for paths that
    /// do not exist or that reach the tree through a symlink.
    pub fn logical_path_of(&self, key_file: &Path) -> Result<String, ParseError> {
        let dir = key_file.parent().unwrap_or_else(|| Path::new(""));

        let relative = canonical_relative(dir, &self.base_dir).or_else(|| {
            normalize(dir)
                .strip_prefix(normalize(&self.base_dir))
                .ok()
                .map(Path::to_path_buf)
        });

        let Some(relative) = relative else {
            return Err(ParseError::OutsideBaseDir {
                path: key_file.to_path_buf(),
                base_dir: self.base_dir.clone(),
            });
        };

        Ok(relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(segment) => Some(segment.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"))
    }
}

/// A file named `__ALL__` holds many records
pub fn is_manifest(key_file: &Path) -> bool {
    key_file
        .file_name()
        .is_some_and(|name| name == MANIFEST_FILE_NAME)
}

fn is_hidden(entry: &DirEntry) -> bool {
    let hidden = entry.file_name().to_string_lossy().starts_with('.');
    if hidden {
        debug!("Skipping hidden path: {}", entry.path().display());
    }
    hidden
}

fn canonical_relative(dir: &Path, base_dir: &Path) -> Option<PathBuf> {
    let base_dir = std::fs::canonicalize(base_dir).ok()?;
    let dir = std::fs::canonicalize(dir).ok()?;
    dir.strip_prefix(&base_dir).ok().map(Path::to_path_buf)
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
