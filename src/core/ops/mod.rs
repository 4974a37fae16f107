//! core::ops
//!
//! Operation locking.
//!
//! # Architecture
//!
//! Every engine operation:
//! 1. Acquires the exclusive operation lock
//! 2. Brings the working copy to a consistent state
//! 3. Performs its action (edit, build, publish, reset)
//! 4. Releases the lock before returning its structured result
//!
//! No operation observes a partially applied predecessor.

pub mod lock;

pub use lock::{LockError, LockPolicy, OperationGuard, OperationLock};
