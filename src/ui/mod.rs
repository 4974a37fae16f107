//! ui
//!
//! User-facing output for the CLI.
//!
//! All command output goes through [`output`] so quiet and JSON modes are
//! honored consistently.

pub mod output;

pub use output::{Output, Verbosity};
