//! publish
//!
//! Commit content changes and push them to the publish branch.
//!
//! # Architecture
//!
//! [`PublishPipeline::publish`] runs on an already synchronized checkout:
//!
//! 1. Refuse if the publish branch is the production branch
//! 2. Stage additions, edits, and deletions under the content directory
//! 3. Stop with a no-op result if the index matches `HEAD`
//! 4. Commit with a generated message
//! 5. Push without force; on any failure undo the commit (mixed reset)
//!
//! # Invariants
//!
//! - Only the content directory is ever staged
//! - Nothing is ever force-pushed
//! - After a failed push, `HEAD` is where it was before the operation and
//!   the edits remain in the working tree

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::core::config::{CommitAuthor, RepositoryConfig};
use crate::core::types::{BranchName, Oid};
use crate::git::{Git, GitError, RemoteOptions};

/// Identity used when neither configuration nor git supplies one.
pub const FALLBACK_AUTHOR_NAME: &str = "pagewright";
pub const FALLBACK_AUTHOR_EMAIL: &str = "pagewright@localhost";

/// Errors from publishing.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The publish branch is the production branch.
    #[error("refusing to publish to protected branch '{0}'")]
    ProtectedBranch(String),

    /// The checkout is not on the publish branch.
    #[error("working copy is on {found} instead of '{expected}'")]
    WrongBranch { expected: String, found: String },

    /// The remote refused the push.
    #[error("remote rejected the push to '{branch}': {reason}; sync the working copy and try again")]
    Conflict { branch: String, reason: String },

    /// The push could not be delivered.
    #[error("push failed: {0}")]
    Push(GitError),

    /// Local Git failure while staging or committing.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// What happened to the push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PushOutcome {
    Accepted,
    /// Nothing was committed, so nothing was pushed
    NotAttempted,
}

/// Result of one publish.
#[derive(Debug, Clone, Serialize)]
pub struct PublishResult {
    /// The new commit; absent for a no-op
    pub commit: Option<Oid>,
    /// Paths included in the commit, relative to the checkout root
    pub changed_paths: Vec<String>,
    pub push: PushOutcome,
    /// The commit message; absent for a no-op
    pub message: Option<String>,
}

impl PublishResult {
    fn noop() -> Self {
        Self {
            commit: None,
            changed_paths: Vec::new(),
            push: PushOutcome::NotAttempted,
            message: None,
        }
    }

    /// Whether there was nothing to publish.
    pub fn is_noop(&self) -> bool {
        self.commit.is_none()
    }
}

/// Everything the pipeline needs from the repository configuration.
#[derive(Debug, Clone)]
pub struct PublishSettings {
    pub branch: BranchName,
    pub production_branch: BranchName,
    /// Directory to stage, relative to the checkout root
    pub content_dir: String,
    pub author: Option<CommitAuthor>,
    pub remote: RemoteOptions,
}

impl PublishSettings {
    pub fn from_config(config: &RepositoryConfig) -> Self {
        Self {
            branch: config.branch.clone(),
            production_branch: config.production_branch.clone(),
            content_dir: config.content_dir.clone(),
            author: config.author.clone(),
            remote: RemoteOptions {
                credential: config.credential.clone(),
                timeout: config.network_timeout,
            },
        }
    }
}

/// Stages, commits, and pushes content changes.
#[derive(Debug, Clone)]
pub struct PublishPipeline {
    settings: PublishSettings,
}

impl PublishPipeline {
    pub fn new(settings: PublishSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PublishSettings {
        &self.settings
    }

    /// Publish pending content changes in `git`'s working tree.
    ///
    /// # Errors
    ///
    /// - [`PublishError::ProtectedBranch`] when targeting production
    /// - [`PublishError::Conflict`] when the remote rejects the push
    /// - [`PublishError::Push`] for auth, network, or timeout failures
    pub fn publish(&self, git: &Git) -> Result<PublishResult, PublishError> {
        let settings = &self.settings;
        if settings.branch == settings.production_branch {
            return Err(PublishError::ProtectedBranch(settings.branch.to_string()));
        }
        match git.current_branch()? {
            Some(current) if current == settings.branch => {}
            other => {
                return Err(PublishError::WrongBranch {
                    expected: settings.branch.to_string(),
                    found: other
                        .map(|b| format!("'{}'", b))
                        .unwrap_or_else(|| "a detached HEAD".to_string()),
                })
            }
        }

        git.stage_dir(&settings.content_dir)?;
        let changed_paths = git.staged_paths()?;
        if changed_paths.is_empty() {
            info!(branch = settings.branch.as_str(), "nothing to publish");
            return Ok(PublishResult::noop());
        }

        let before = git.head_oid()?;
        let message = commit_message(changed_paths.len(), Utc::now());
        let (name, email) = resolve_author(settings.author.as_ref(), git.configured_identity());
        let commit = git.commit_index(&message, &name, &email)?;
        debug!(
            commit = commit.short(7),
            files = changed_paths.len(),
            "committed content changes"
        );

        if let Err(err) = git.push_branch(&settings.branch, &settings.remote) {
            warn!(error = %err, "push failed, rolling back commit");
            if let Err(reset_err) = git.reset_mixed(&before) {
                error!(error = %reset_err, "rollback after failed push failed");
            }
            return Err(match err {
                GitError::PushRejected { reason, .. } => PublishError::Conflict {
                    branch: settings.branch.to_string(),
                    reason,
                },
                other => PublishError::Push(other),
            });
        }

        info!(
            target: "pagewright::security",
            event = "GIT_PUSH",
            branch = settings.branch.as_str(),
            commit = commit.as_str(),
            files = changed_paths.len(),
            "pushed content changes"
        );

        Ok(PublishResult {
            commit: Some(commit),
            changed_paths,
            push: PushOutcome::Accepted,
            message: Some(message),
        })
    }
}

/// Commit message for `count` changed files at `at`.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use pagewright::publish::commit_message;
///
/// let at = Utc.with_ymd_and_hms(2024, 1, 5, 10, 30, 0).unwrap();
/// assert_eq!(
///     commit_message(2, at),
///     "Update content via pagewright (2 files, 2024-01-05T10:30:00Z)"
/// );
/// ```
pub fn commit_message(count: usize, at: DateTime<Utc>) -> String {
    format!(
        "Update content via pagewright ({} {}, {})",
        count,
        if count == 1 { "file" } else { "files" },
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Pick the commit identity: configuration, then git, then the fallback.
fn resolve_author(
    configured: Option<&CommitAuthor>,
    from_git: Option<(String, String)>,
) -> (String, String) {
    if let Some(author) = configured {
        return (author.name.clone(), author.email.clone());
    }
    from_git.unwrap_or_else(|| {
        (
            FALLBACK_AUTHOR_NAME.to_string(),
            FALLBACK_AUTHOR_EMAIL.to_string(),
        )
    })
}
