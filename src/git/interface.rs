//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to all Git operations in
//! pagewright. Every clone, fetch, checkout, commit, and push flows through
//! [`Git`], which returns strong types and normalizes libgit2 failures into
//! the categories callers act on.
//!
//! # Architecture
//!
//! Remote operations run inside a [`RemoteSession`] that owns the
//! credential callback, the deadline, and push rejection capture. A session
//! is created per network call so a deadline never outlives its operation.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::Auth`]: The remote rejected or demanded credentials
//! - [`GitError::Network`]: The remote could not be reached
//! - [`GitError::Timeout`]: The network deadline elapsed
//! - [`GitError::PushRejected`]: The remote refused a ref update
//! - [`GitError::Conflict`]: A checkout would overwrite local changes
//!
//! # Example
//!
//! ```ignore
//! use pagewright::git::{Git, RemoteOptions};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("/srv/site/repo"))?;
//! let remote_tip = git.fetch_branch(&branch, &RemoteOptions::default())?;
//! git.fast_forward(&branch, &remote_tip)?;
//! ```

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::core::config::{Credential, DEFAULT_NETWORK_TIMEOUT};
use crate::core::paths::is_temp_file;
use crate::core::types::{BranchName, Oid, TypeError};

/// Name of the only remote pagewright works with.
pub const REMOTE: &str = "origin";

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Invalid branch name.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// The remote rejected the credentials, or none were available.
    #[error("authentication failed: {message}")]
    Auth {
        /// Message from the transport
        message: String,
    },

    /// The remote could not be reached.
    #[error("network error: {message}")]
    Network {
        /// Message from the transport
        message: String,
    },

    /// A network operation ran past its deadline.
    #[error("network operation timed out after {}s", after.as_secs())]
    Timeout {
        /// The deadline that elapsed
        after: Duration,
    },

    /// The remote refused to update a ref.
    ///
    /// Usually means the remote branch moved and the push was not a
    /// fast-forward.
    #[error("push of {refname} rejected: {reason}")]
    PushRejected {
        /// The ref being pushed
        refname: String,
        /// Reason reported by the remote
        reason: String,
    },

    /// A checkout would overwrite uncommitted local changes.
    #[error("checkout conflict: {message}")]
    Conflict {
        /// Description of the conflict
        message: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") || context.contains("ref") || context == "HEAD" {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            git2::ErrorCode::Conflict => GitError::Conflict {
                message: format!("{}: {}", context, err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    /// Whether the failure happened while talking to the remote.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            GitError::Auth { .. }
                | GitError::Network { .. }
                | GitError::Timeout { .. }
                | GitError::PushRejected { .. }
        )
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidBranchName(msg) => GitError::InvalidRefName { message: msg },
            TypeError::InvalidContentPath(msg) => GitError::Internal { message: msg },
        }
    }
}

/// Settings for operations that talk to the remote.
#[derive(Debug, Clone)]
pub struct RemoteOptions {
    /// HTTPS username/token, if any
    pub credential: Option<Credential>,
    /// Deadline for the whole operation
    pub timeout: Duration,
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            credential: None,
            timeout: DEFAULT_NETWORK_TIMEOUT,
        }
    }
}

/// Outcome of bringing a local branch up to its remote tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FastForward {
    /// Local and remote already agree.
    UpToDate,
    /// The local branch moved forward.
    Advanced {
        /// Previous local tip
        from: Oid,
        /// New local tip
        to: Oid,
    },
    /// The local branch has commits the remote lacks.
    Ahead,
    /// Both sides have commits the other lacks.
    Diverged,
}

/// Summary of working tree status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Number of untracked files
    pub untracked: usize,
    /// Whether there are unresolved conflicts
    pub has_conflicts: bool,
}

impl WorktreeStatus {
    /// Check if the worktree is completely clean (no changes at all).
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && self.untracked == 0 && !self.has_conflicts
    }

    /// Total number of pending changes.
    pub fn pending(&self) -> usize {
        self.staged + self.unstaged + self.untracked
    }
}

/// Apply `timeout` to libgit2's socket connect and read calls.
///
/// The progress callbacks only fire while data flows, so a remote that
/// accepts the connection and then stays silent is bounded here instead.
/// The setting is process-wide.
pub fn configure_network_timeouts(timeout: Duration) -> Result<(), GitError> {
    let millis = std::os::raw::c_int::try_from(timeout.as_millis())
        .unwrap_or(std::os::raw::c_int::MAX)
        .max(1);
    // SAFETY: both calls only store an integer in libgit2's global options.
    unsafe {
        git2::opts::set_server_connect_timeout_in_milliseconds(millis)
            .map_err(|e| GitError::from_git2(e, "server connect timeout"))?;
        git2::opts::set_server_timeout_in_milliseconds(millis)
            .map_err(|e| GitError::from_git2(e, "server timeout"))?;
    }
    Ok(())
}

/// Per-call state for a network operation.
///
/// Owns the deadline, counts credential attempts so libgit2 does not loop
/// on a rejected token, and records ref updates the remote refused.
struct RemoteSession<'o> {
    options: &'o RemoteOptions,
    deadline: Instant,
    timed_out: Cell<bool>,
    auth_attempts: Cell<u32>,
    rejection: RefCell<Option<(String, String)>>,
}

impl<'o> RemoteSession<'o> {
    fn new(options: &'o RemoteOptions) -> Self {
        Self {
            options,
            deadline: Instant::now() + options.timeout,
            timed_out: Cell::new(false),
            auth_attempts: Cell::new(0),
            rejection: RefCell::new(None),
        }
    }

    fn within_deadline(&self) -> bool {
        if Instant::now() > self.deadline {
            self.timed_out.set(true);
            return false;
        }
        true
    }

    fn credentials(
        &self,
        username_from_url: Option<&str>,
        allowed: git2::CredentialType,
    ) -> Result<git2::Cred, git2::Error> {
        let attempts = self.auth_attempts.get() + 1;
        self.auth_attempts.set(attempts);
        if attempts > 1 {
            return Err(git2::Error::from_str(
                "authentication failed: the remote rejected the credentials",
            ));
        }

        match &self.options.credential {
            Some(cred) if allowed.contains(git2::CredentialType::USER_PASS_PLAINTEXT) => {
                git2::Cred::userpass_plaintext(&cred.username, &cred.token)
            }
            _ if allowed.contains(git2::CredentialType::SSH_KEY) => {
                git2::Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
            }
            _ if allowed.contains(git2::CredentialType::DEFAULT) => git2::Cred::default(),
            _ => Err(git2::Error::from_str(
                "authentication required but no credential is configured",
            )),
        }
    }

    fn callbacks(&self) -> git2::RemoteCallbacks<'_> {
        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(move |_url, username, allowed| self.credentials(username, allowed));
        callbacks.transfer_progress(move |_| self.within_deadline());
        callbacks.sideband_progress(move |_| self.within_deadline());
        callbacks.push_negotiation(move |_| {
            if self.within_deadline() {
                Ok(())
            } else {
                Err(git2::Error::from_str("network deadline elapsed"))
            }
        });
        callbacks.push_update_reference(move |refname, status| {
            if let Some(reason) = status {
                *self.rejection.borrow_mut() = Some((refname.to_string(), reason.to_string()));
            }
            Ok(())
        });
        callbacks
    }

    fn take_rejection(&self) -> Option<(String, String)> {
        self.rejection.borrow_mut().take()
    }

    /// Map a transport failure to the category callers act on.
    fn classify(&self, err: git2::Error, context: &str) -> GitError {
        if self.timed_out.get() {
            return GitError::Timeout {
                after: self.options.timeout,
            };
        }

        let message = err.message().to_string();
        let lower = message.to_ascii_lowercase();

        if lower.contains("timed out") || lower.contains("timeout") {
            return GitError::Timeout {
                after: self.options.timeout,
            };
        }

        if err.code() == git2::ErrorCode::Auth
            || lower.contains("authentication")
            || lower.contains("credential")
            || lower.contains("401")
            || lower.contains("403")
        {
            return GitError::Auth { message };
        }

        if err.code() == git2::ErrorCode::NotFastForward {
            return GitError::PushRejected {
                refname: context.to_string(),
                reason: message,
            };
        }

        if err.code() == git2::ErrorCode::NotFound && context.starts_with("refs/") {
            if lower.contains("refs/") || lower.contains("reference") {
                return GitError::RefNotFound {
                    refname: context.to_string(),
                };
            }
            return GitError::Network { message };
        }

        match err.class() {
            git2::ErrorClass::Net
            | git2::ErrorClass::Http
            | git2::ErrorClass::Ssh
            | git2::ErrorClass::Ssl
            | git2::ErrorClass::Os
            | git2::ErrorClass::Repository => GitError::Network { message },
            _ => GitError::from_git2(err, context),
        }
    }
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. No other module
/// imports `git2`.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening
    // =========================================================================

    /// Open the repository whose working directory is exactly `path`.
    ///
    /// Parent directories are not searched, so a working directory nested
    /// inside some other checkout is never mistaken for it.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if `path` is not a repository
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Clone `branch` of `url` into `dest`.
    ///
    /// The clone's `HEAD` is the local `branch`, tracking `origin/<branch>`.
    ///
    /// # Errors
    ///
    /// - [`GitError::Auth`], [`GitError::Network`], [`GitError::Timeout`]
    ///   for transport failures
    /// - [`GitError::RefNotFound`] if the remote has no such branch
    pub fn clone_branch(
        url: &str,
        branch: &BranchName,
        dest: &Path,
        options: &RemoteOptions,
    ) -> Result<Self, GitError> {
        let session = RemoteSession::new(options);
        let mut fetch = git2::FetchOptions::new();
        fetch.remote_callbacks(session.callbacks());

        let repo = git2::build::RepoBuilder::new()
            .branch(branch.as_str())
            .fetch_options(fetch)
            .clone(url, dest)
            .map_err(|e| session.classify(e, &branch.ref_name()))?;

        Ok(Self { repo })
    }

    /// Path to the working directory.
    pub fn work_dir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    /// URL of a named remote, if configured.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(|s| s.to_string())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::from_git2(e, name)),
        }
    }

    // =========================================================================
    // Working Tree Status
    // =========================================================================

    /// Get working tree status summary.
    pub fn worktree_status(&self) -> Result<WorktreeStatus, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::from_git2(e, "status"))?;

        let mut result = WorktreeStatus::default();

        for entry in statuses.iter() {
            let status = entry.status();

            if status.is_conflicted() {
                result.has_conflicts = true;
            }

            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                result.staged += 1;
            }

            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
            {
                result.unstaged += 1;
            }

            if status.is_wt_new() {
                result.untracked += 1;
            }
        }

        Ok(result)
    }

    // =========================================================================
    // Ref Resolution
    // =========================================================================

    /// Resolve a ref to the commit it points at.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if the ref doesn't exist
    pub fn resolve_ref(&self, refname: &str) -> Result<Oid, GitError> {
        let reference = self
            .repo
            .find_reference(refname)
            .map_err(|e| GitError::from_git2(e, refname))?;

        let oid = reference
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, refname))?
            .id();

        Ok(Oid::new(oid.to_string())?)
    }

    /// Get HEAD commit OID.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if HEAD is unborn
    pub fn head_oid(&self) -> Result<Oid, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        let oid = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?
            .id();

        Ok(Oid::new(oid.to_string())?)
    }

    /// Check if a ref exists.
    pub fn ref_exists(&self, refname: &str) -> bool {
        self.repo.find_reference(refname).is_ok()
    }

    /// Get the current branch name, if on a branch.
    ///
    /// Returns `None` if HEAD is detached or unborn.
    pub fn current_branch(&self) -> Result<Option<BranchName>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, "HEAD")),
        };

        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                return Ok(Some(BranchName::new(name)?));
            }
        }

        Ok(None)
    }

    /// Check if `ancestor` is an ancestor of `descendant`.
    ///
    /// Returns true if ancestor == descendant.
    pub fn is_ancestor(&self, ancestor: &Oid, descendant: &Oid) -> Result<bool, GitError> {
        if ancestor == descendant {
            return Ok(true);
        }

        let ancestor_oid = to_git2(ancestor)?;
        let descendant_oid = to_git2(descendant)?;

        self.repo
            .graph_descendant_of(descendant_oid, ancestor_oid)
            .map_err(|e| GitError::from_git2(e, descendant.as_str()))
    }

    // =========================================================================
    // Remote Operations
    // =========================================================================

    /// Fetch `branch` from origin and return the remote tip.
    ///
    /// Updates `refs/remotes/origin/<branch>`; local refs are untouched.
    pub fn fetch_branch(
        &self,
        branch: &BranchName,
        options: &RemoteOptions,
    ) -> Result<Oid, GitError> {
        let mut remote = self
            .repo
            .find_remote(REMOTE)
            .map_err(|e| GitError::from_git2(e, "remote origin"))?;

        let session = RemoteSession::new(options);
        let mut fetch = git2::FetchOptions::new();
        fetch.remote_callbacks(session.callbacks());

        let tracking = branch.remote_ref_name(REMOTE);
        let refspec = format!("+{}:{}", branch.ref_name(), tracking);
        remote
            .fetch(&[refspec.as_str()], Some(&mut fetch), None)
            .map_err(|e| session.classify(e, &branch.ref_name()))?;

        self.resolve_ref(&tracking)
    }

    /// Push the local `branch` to the same name on origin.
    ///
    /// Never forces. A non-fast-forward update is reported as
    /// [`GitError::PushRejected`].
    pub fn push_branch(&self, branch: &BranchName, options: &RemoteOptions) -> Result<(), GitError> {
        let mut remote = self
            .repo
            .find_remote(REMOTE)
            .map_err(|e| GitError::from_git2(e, "remote origin"))?;

        let session = RemoteSession::new(options);
        let mut push = git2::PushOptions::new();
        push.remote_callbacks(session.callbacks());

        let refname = branch.ref_name();
        let refspec = format!("{0}:{0}", refname);
        remote
            .push(&[refspec.as_str()], Some(&mut push))
            .map_err(|e| session.classify(e, &refname))?;

        if let Some((refname, reason)) = session.take_rejection() {
            return Err(GitError::PushRejected { refname, reason });
        }

        Ok(())
    }

    // =========================================================================
    // Branch Movement
    // =========================================================================

    /// Bring the local `branch` up to `target` without merging.
    ///
    /// Uses a safe checkout: uncommitted edits to files the update does not
    /// touch survive; edits that would be overwritten fail with
    /// [`GitError::Conflict`] and leave the branch where it was.
    pub fn fast_forward(&self, branch: &BranchName, target: &Oid) -> Result<FastForward, GitError> {
        let refname = branch.ref_name();
        let local = self.resolve_ref(&refname)?;

        if local == *target {
            return Ok(FastForward::UpToDate);
        }
        if self.is_ancestor(target, &local)? {
            return Ok(FastForward::Ahead);
        }
        if !self.is_ancestor(&local, target)? {
            return Ok(FastForward::Diverged);
        }

        let commit = self.find_commit(target)?;
        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.safe();
        self.repo
            .checkout_tree(commit.as_object(), Some(&mut checkout))
            .map_err(|e| GitError::from_git2(e, "fast-forward checkout"))?;

        self.repo
            .reference(&refname, commit.id(), true, "pagewright: fast-forward")
            .map_err(|e| GitError::from_git2(e, &refname))?;
        self.repo
            .set_head(&refname)
            .map_err(|e| GitError::from_git2(e, &refname))?;

        Ok(FastForward::Advanced {
            from: local,
            to: target.clone(),
        })
    }

    /// Switch `HEAD` to `branch`, creating it from origin if needed.
    pub fn checkout_branch(&self, branch: &BranchName) -> Result<(), GitError> {
        let refname = branch.ref_name();

        if !self.ref_exists(&refname) {
            let remote_tip = self.resolve_ref(&branch.remote_ref_name(REMOTE))?;
            let commit = self.find_commit(&remote_tip)?;
            self.repo
                .branch(branch.as_str(), &commit, false)
                .map_err(|e| GitError::from_git2(e, &refname))?;
        }

        let tip = self.resolve_ref(&refname)?;
        let commit = self.find_commit(&tip)?;
        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.safe();
        self.repo
            .checkout_tree(commit.as_object(), Some(&mut checkout))
            .map_err(|e| GitError::from_git2(e, "branch checkout"))?;
        self.repo
            .set_head(&refname)
            .map_err(|e| GitError::from_git2(e, &refname))
    }

    // =========================================================================
    // Index and Commits
    // =========================================================================

    /// Stage every addition, modification, and deletion under `dir`.
    ///
    /// `dir` is relative to the working directory root. Temporary files
    /// left by interrupted writes are skipped.
    pub fn stage_dir(&self, dir: &str) -> Result<(), GitError> {
        let mut index = self
            .repo
            .index()
            .map_err(|e| GitError::from_git2(e, "index"))?;

        let mut skip_temp = |path: &Path, _spec: &[u8]| -> i32 { i32::from(is_temp_file(path)) };
        index
            .add_all(
                [dir],
                git2::IndexAddOption::DEFAULT,
                Some(&mut skip_temp as &mut git2::IndexMatchedPath),
            )
            .map_err(|e| GitError::from_git2(e, "index add"))?;
        index
            .update_all([dir], None)
            .map_err(|e| GitError::from_git2(e, "index update"))?;
        index
            .write()
            .map_err(|e| GitError::from_git2(e, "index write"))
    }

    /// Paths whose staged content differs from `HEAD`.
    ///
    /// Empty when the index tree equals the `HEAD` tree.
    pub fn staged_paths(&self) -> Result<Vec<String>, GitError> {
        let head_tree = self
            .repo
            .head()
            .and_then(|h| h.peel_to_tree())
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        let index = self
            .repo
            .index()
            .map_err(|e| GitError::from_git2(e, "index"))?;

        let diff = self
            .repo
            .diff_tree_to_index(Some(&head_tree), Some(&index), None)
            .map_err(|e| GitError::from_git2(e, "diff"))?;

        let mut paths: Vec<String> = diff
            .deltas()
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
            })
            .collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }

    /// Identity from the repository's git configuration, if complete.
    pub fn configured_identity(&self) -> Option<(String, String)> {
        let signature = self.repo.signature().ok()?;
        let name = signature.name()?.to_string();
        let email = signature.email()?.to_string();
        Some((name, email))
    }

    /// Commit the index on top of `HEAD`.
    pub fn commit_index(&self, message: &str, name: &str, email: &str) -> Result<Oid, GitError> {
        let mut index = self
            .repo
            .index()
            .map_err(|e| GitError::from_git2(e, "index"))?;
        let tree_id = index
            .write_tree()
            .map_err(|e| GitError::from_git2(e, "write tree"))?;
        let tree = self
            .repo
            .find_tree(tree_id)
            .map_err(|e| GitError::from_git2(e, &tree_id.to_string()))?;
        let parent = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        let signature = git2::Signature::now(name, email)
            .map_err(|e| GitError::from_git2(e, "signature"))?;

        let oid = self
            .repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &[&parent],
            )
            .map_err(|e| GitError::from_git2(e, "commit"))?;

        Ok(Oid::new(oid.to_string())?)
    }

    /// Move `HEAD` back to `target`, keeping the working tree.
    ///
    /// The index is reset too, so the undone commit's changes reappear as
    /// unstaged edits.
    pub fn reset_mixed(&self, target: &Oid) -> Result<(), GitError> {
        let commit = self.find_commit(target)?;
        self.repo
            .reset(commit.as_object(), git2::ResetType::Mixed, None)
            .map_err(|e| GitError::from_git2(e, target.as_str()))
    }

    fn find_commit(&self, oid: &Oid) -> Result<git2::Commit<'_>, GitError> {
        self.repo
            .find_commit(to_git2(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))
    }
}

fn to_git2(oid: &Oid) -> Result<git2::Oid, GitError> {
    git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))
}
