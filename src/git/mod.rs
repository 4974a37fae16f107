//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. No other module imports
//! `git2`. Everything uses the `git2` crate; nothing shells out to the git
//! CLI.
//!
//! # Responsibilities
//!
//! - Cloning a single branch and opening an existing checkout
//! - Fetching and fast-forwarding (never merging)
//! - Staging a directory, committing, and pushing without force
//! - Mixed reset to undo a commit that could not be pushed
//! - Classifying transport failures (auth, network, timeout, rejection)
//!
//! # Invariants
//!
//! - Local branches only ever move forward, or back to a commit they held
//! - Checkouts are safe: uncommitted edits are never silently overwritten
//! - All operations return strong types (Oid, BranchName)

mod interface;

pub use interface::{
    configure_network_timeouts, FastForward, Git, GitError, RemoteOptions, WorktreeStatus, REMOTE,
};
