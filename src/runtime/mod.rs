//! # Runtime Module
//!
//! Runtime components for `vault-keys`: process initialization and the
//! parse-then-sync workflow of one invocation.

pub mod initialization;
pub mod run;

pub use initialization::*;
pub use run::*;
