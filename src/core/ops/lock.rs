//! core::ops::lock
//!
//! Exclusive operation lock for the working copy.
//!
//! # Architecture
//!
//! Every operation that reads or writes the working copy runs inside
//! [`OperationLock::with_exclusive_access`]. The lock has two layers:
//!
//! - an in-process gate (`parking_lot::Mutex`) serializing threads that share
//!   one [`OperationLock`], e.g. request handlers of a server;
//! - an OS-level file lock (`fs2`) at `<working_dir>/.pagewright.lock`
//!   serializing separate processes pointed at the same working directory.
//!
//! The lock is repository-scoped, not file-scoped: a build reads the whole
//! tree and a publish commits the whole tree.
//!
//! # Invariants
//!
//! - At most one operation holds the lock at any instant
//! - The lock is released on drop (RAII), including on panic
//! - Waiting is never busy-polling within a process; only cross-process
//!   contention under a bounded policy polls the file lock
//!
//! # Example
//!
//! ```ignore
//! use pagewright::core::ops::lock::{LockPolicy, OperationLock};
//!
//! let lock = OperationLock::new(paths.lock_path(), LockPolicy::Block);
//! let value = lock.with_exclusive_access(|| -> Result<_, EngineError> {
//!     // touch the working copy
//!     Ok(42)
//! })?;
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use parking_lot::{Mutex, MutexGuard};
use thiserror::Error;

/// Interval between file-lock attempts under a bounded wait.
const FILE_LOCK_RETRY: Duration = Duration::from_millis(25);

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// The lock could not be acquired within the configured bound.
    #[error("working copy is busy (another operation is in progress)")]
    Busy,

    /// Failed to create lock file or directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),

    /// Failed to release the lock.
    #[error("failed to release lock: {0}")]
    ReleaseFailed(String),
}

/// How callers behave when the lock is already held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockPolicy {
    /// Wait until the lock is free.
    #[default]
    Block,
    /// Wait at most this long, then fail with [`LockError::Busy`].
    Wait(Duration),
    /// Fail immediately with [`LockError::Busy`].
    FailFast,
}

impl LockPolicy {
    /// Build a policy from an optional wait bound in seconds.
    ///
    /// `None` blocks, `Some(0)` fails fast.
    pub fn from_wait_secs(secs: Option<u64>) -> Self {
        match secs {
            None => LockPolicy::Block,
            Some(0) => LockPolicy::FailFast,
            Some(n) => LockPolicy::Wait(Duration::from_secs(n)),
        }
    }

    fn deadline(&self, start: Instant) -> Option<Instant> {
        match self {
            LockPolicy::Block => None,
            LockPolicy::Wait(bound) => Some(start + *bound),
            LockPolicy::FailFast => Some(start),
        }
    }
}

/// The single mutual-exclusion gate for one repository's working copy.
#[derive(Debug)]
pub struct OperationLock {
    path: PathBuf,
    policy: LockPolicy,
    gate: Mutex<()>,
}

impl OperationLock {
    /// Create a lock backed by the file at `path`.
    ///
    /// The file is created lazily on first acquisition.
    pub fn new(path: PathBuf, policy: LockPolicy) -> Self {
        Self {
            path,
            policy,
            gate: Mutex::new(()),
        }
    }

    /// Acquire the lock according to the policy.
    ///
    /// # Errors
    ///
    /// - [`LockError::Busy`] if the bound expires first
    /// - [`LockError::CreateFailed`] / [`LockError::AcquireFailed`] on OS errors
    pub fn acquire(&self) -> Result<OperationGuard<'_>, LockError> {
        let start = Instant::now();
        let deadline = self.policy.deadline(start);

        let gate = match deadline {
            None => self.gate.lock(),
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                self.gate.try_lock_for(remaining).ok_or(LockError::Busy)?
            }
        };

        let file = FileLock::acquire(&self.path, deadline)?;
        tracing::debug!(
            lock = %self.path.display(),
            waited_ms = start.elapsed().as_millis() as u64,
            "operation lock acquired"
        );

        Ok(OperationGuard { _gate: gate, file })
    }

    /// Run `op` while holding the lock.
    ///
    /// The lock is released when `op` returns, whatever its outcome.
    pub fn with_exclusive_access<T, E>(&self, op: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<LockError>,
    {
        let guard = self.acquire()?;
        let result = op();
        drop(guard);
        result
    }
}

/// Proof that the holder has exclusive access to the working copy.
///
/// Dropping the guard releases the file lock first, then the gate.
#[derive(Debug)]
pub struct OperationGuard<'a> {
    file: FileLock,
    _gate: MutexGuard<'a, ()>,
}

impl OperationGuard<'_> {
    /// Path of the held lock file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// OS-level exclusive lock on a file.
///
/// Released automatically on drop.
#[derive(Debug)]
struct FileLock {
    path: PathBuf,
    file: Option<File>,
}

impl FileLock {
    /// Acquire the file lock, waiting until `deadline` (or forever if `None`).
    fn acquire(path: &Path, deadline: Option<Instant>) -> Result<Self, LockError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LockError::CreateFailed(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        match deadline {
            None => FileExt::lock_exclusive(&file)
                .map_err(|e| LockError::AcquireFailed(e.to_string()))?,
            Some(deadline) => loop {
                match FileExt::try_lock_exclusive(&file) {
                    Ok(()) => break,
                    Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        if Instant::now() >= deadline {
                            return Err(LockError::Busy);
                        }
                        thread::sleep(FILE_LOCK_RETRY);
                    }
                    Err(e) => return Err(LockError::AcquireFailed(e.to_string())),
                }
            },
        }

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock explicitly.
    fn release(&mut self) -> Result<(), LockError> {
        if let Some(file) = self.file.take() {
            FileExt::unlock(&file).map_err(|e| LockError::ReleaseFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(lock = %self.path.display(), "{}", e);
        }
    }
}
