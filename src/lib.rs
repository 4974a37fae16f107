//! pagewright - Git-backed content sync, build, and publish engine
//!
//! pagewright keeps a local working copy of a site repository, edits Markdown
//! content with frontmatter without disturbing the bytes it was not asked to
//! change, rebuilds the site with an external generator, and publishes
//! edits as commits pushed to a non-production branch.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - The operation contract: one [`engine::Repository`] per remote
//! - [`content`] - Frontmatter codec and field edits
//! - [`workspace`] - Working copy sync, path validation, document I/O
//! - [`build`] - External site generator with a hard timeout
//! - [`publish`] - Stage, commit, and push with rollback
//! - [`git`] - Single interface for all Git operations
//! - [`core`] - Domain types, configuration, and the operation lock
//! - [`secrets`] - Access token storage and resolution
//! - [`ui`] - Output formatting
//!
//! # Correctness Invariants
//!
//! 1. Operations on one working copy never interleave
//! 2. A save rewrites only the fields it names
//! 3. Paths are validated before any filesystem write
//! 4. The production branch is never pushed to
//! 5. A failed publish leaves edits pending, never half-committed

pub mod build;
pub mod cli;
pub mod content;
pub mod core;
pub mod engine;
pub mod git;
pub mod publish;
pub mod secrets;
pub mod ui;
pub mod workspace;
