//! # Key Tree Parsing
//!
//! Turns a directory of encrypted key definitions into `KeyEntry` records.
//!
//! ## Module Structure
//!
//! - `key_data.rs` - `KeyEntry`, `SecretPayload` and key-data recognition
//! - `tree.rs` - Directory walk, file classification and logical paths

pub mod key_data;
pub mod tree;

pub use key_data::{
    join_logical, read_all_keys, read_one_key, KeyDataError, KeyEntry, SecretData, SecretPayload,
};
pub use tree::{is_manifest, KeyTreeParser, ParseError};
