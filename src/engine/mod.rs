//! engine
//!
//! The operation contract consumed by a routing layer or the CLI.
//!
//! # Architecture
//!
//! [`Repository`] is an explicit object, never a global. Every operation:
//!
//! 1. Validates its inputs (paths, edits) without touching the disk
//! 2. Acquires the repository's operation lock
//! 3. Brings the working copy to a consistent state
//! 4. Performs its action (read, edit, build, publish, reset)
//! 5. Releases the lock and returns a serializable outcome
//!
//! | Operation | Working copy | Rebuild |
//! |---|---|---|
//! | `get_content`, `resolve_url` | present | no |
//! | `save_content`, `create_content` | synced | when `rebuild_on_save` |
//! | `trigger_build` | present | yes |
//! | `publish`, `sync` | synced | no |
//! | `clear_cache` | re-cloned | yes |
//!
//! # Errors
//!
//! Every failure is an [`EngineError`] whose [`kind`](EngineError::kind)
//! tells callers whether to fix input, retry, or resync. A failed build is
//! not an error; it is reported inside [`BuildOutcome`].
//!
//! # Example
//!
//! ```ignore
//! use pagewright::engine::Repository;
//! use serde_json::json;
//!
//! let repo = Repository::open(config)?;
//! let mut edits = pagewright::content::FieldEdits::new();
//! edits.insert("title".into(), json!("Launch day"));
//! repo.save_content("news/launch", &edits, None)?;
//! repo.publish()?;
//! ```

mod error;
mod outcome;
mod repository;

pub use error::{EngineError, ErrorKind};
pub use outcome::{
    BuildOutcome, ClearOutcome, ContentView, CreateOutcome, PublishOutcome, SaveOutcome,
};
pub use repository::{Repository, SECURITY_TARGET};
