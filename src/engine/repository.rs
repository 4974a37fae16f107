//! engine::repository
//!
//! The repository engine: one working copy, one lock, every operation.

use tracing::{debug, info};

use super::error::EngineError;
use super::outcome::{
    BuildOutcome, ClearOutcome, ContentView, CreateOutcome, PublishOutcome, SaveOutcome,
};
use crate::build::{CommandBuilder, SiteBuilder};
use crate::content::{apply_edits, new_document, FieldEdits};
use crate::core::config::{ConfigError, RepositoryConfig};
use crate::core::ops::OperationLock;
use crate::core::types::ContentPath;
use crate::git;
use crate::publish::{PublishPipeline, PublishSettings};
use crate::workspace::{SyncReport, WorkingCopy};

/// Target for security audit events.
pub const SECURITY_TARGET: &str = "pagewright::security";

/// The engine for one remote repository.
///
/// Owns the configuration, the operation lock, the working copy, the site
/// builder, and the publish pipeline. Every operation that touches the
/// working copy runs inside the lock, so operations on one `Repository`
/// (or on another `Repository` sharing its working directory) never
/// interleave.
///
/// `Repository` is `Send + Sync`; share it between request handlers with
/// an `Arc`.
pub struct Repository {
    config: RepositoryConfig,
    lock: OperationLock,
    working_copy: WorkingCopy,
    builder: Box<dyn SiteBuilder>,
    publisher: PublishPipeline,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("remote_url", &self.config.remote_url)
            .field("branch", &self.config.branch)
            .field("working_dir", &self.config.working_dir)
            .finish()
    }
}

impl Repository {
    /// Create an engine that builds with the configured command.
    ///
    /// Nothing touches the disk or network until the first operation.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] if the publish branch is the production branch.
    pub fn open(config: RepositoryConfig) -> Result<Self, EngineError> {
        let builder = CommandBuilder::new(config.build.clone());
        Self::with_builder(config, Box::new(builder))
    }

    /// Create an engine with a custom site builder.
    pub fn with_builder(
        config: RepositoryConfig,
        builder: Box<dyn SiteBuilder>,
    ) -> Result<Self, EngineError> {
        if config.branch == config.production_branch {
            return Err(ConfigError::InvalidValue(format!(
                "publish branch '{}' must differ from the production branch",
                config.branch
            ))
            .into());
        }

        git::configure_network_timeouts(config.network_timeout)
            .map_err(|e| EngineError::Storage(e.to_string()))?;

        let paths = config.paths();
        Ok(Self {
            lock: OperationLock::new(paths.lock_path(), config.lock_policy),
            working_copy: WorkingCopy::new(&config),
            publisher: PublishPipeline::new(PublishSettings::from_config(&config)),
            builder,
            config,
        })
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn working_copy(&self) -> &WorkingCopy {
        &self.working_copy
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Read a document.
    ///
    /// Clones the working copy if needed but does not fetch.
    pub fn get_content(&self, path: &str) -> Result<ContentView, EngineError> {
        let path = self.working_copy.content_path(path)?;
        self.exclusive(|| {
            self.working_copy.ensure_present()?;
            let doc = self.working_copy.read_document(&path)?;
            Ok(ContentView::new(path, &doc))
        })
    }

    /// Apply field edits and an optional new body to an existing document.
    ///
    /// Fields not named in `edits` keep their exact bytes. The document is
    /// rewritten atomically; on any error it is left untouched.
    pub fn save_content(
        &self,
        path: &str,
        edits: &FieldEdits,
        new_body: Option<&str>,
    ) -> Result<SaveOutcome, EngineError> {
        let path = self.working_copy.content_path(path)?;
        self.exclusive(|| {
            self.working_copy.ensure_ready()?;

            let doc = self.working_copy.read_document(&path)?;
            let updated = apply_edits(&doc, edits, new_body)?;
            if updated.to_text() == doc.to_text() {
                debug!(path = %path, "save changed nothing");
            } else {
                self.working_copy.write_document(&path, &updated)?;
            }

            info!(
                target: SECURITY_TARGET,
                event = "FILE_SAVE",
                path = %path,
                fields = edits.len(),
                body = new_body.is_some(),
                "document saved"
            );

            Ok(SaveOutcome {
                message: format!("Saved {}", path),
                build: self.rebuild_after_edit(),
                path,
            })
        })
    }

    /// Create a new document.
    ///
    /// The path is validated (including the configured location pattern)
    /// before anything is written. A `title` is derived from the path when
    /// `edits` has none.
    pub fn create_content(
        &self,
        candidate: &str,
        edits: &FieldEdits,
        body: &str,
    ) -> Result<CreateOutcome, EngineError> {
        let path = self.working_copy.validate_path(candidate)?;
        let doc = new_document(&path, edits, body)?;

        self.exclusive(|| {
            self.working_copy.ensure_ready()?;

            if self.working_copy.exists(&path) {
                return Err(EngineError::AlreadyExists(path.to_string()));
            }
            self.working_copy.write_document(&path, &doc)?;

            info!(
                target: SECURITY_TARGET,
                event = "FILE_CREATE",
                path = %path,
                "document created"
            );

            Ok(CreateOutcome {
                url: path.canonical_url(),
                message: format!("Created {}", path),
                build: self.rebuild_after_edit(),
                path,
            })
        })
    }

    /// Find the source document for a site URL.
    pub fn resolve_url(&self, url_path: &str) -> Result<Option<ContentPath>, EngineError> {
        self.exclusive(|| {
            self.working_copy.ensure_present()?;
            Ok(self.working_copy.resolve_url(url_path))
        })
    }

    /// Whether a request host may reach the editor.
    pub fn host_allowed(&self, host: &str) -> bool {
        self.config.allows_host(host)
    }

    // =========================================================================
    // Working Copy
    // =========================================================================

    /// Clone or fast-forward the working copy.
    pub fn sync(&self) -> Result<SyncReport, EngineError> {
        self.exclusive(|| {
            let (_, report) = self.working_copy.ensure_ready()?;
            info!(head = report.head.short(7), "working copy synchronized");
            Ok(report)
        })
    }

    /// Build the site from the working copy as it is.
    pub fn trigger_build(&self) -> Result<BuildOutcome, EngineError> {
        self.exclusive(|| {
            self.working_copy.ensure_present()?;
            Ok(self.run_build())
        })
    }

    /// Commit and push pending content changes.
    pub fn publish(&self) -> Result<PublishOutcome, EngineError> {
        self.exclusive(|| {
            let (git, _) = self.working_copy.ensure_ready()?;
            let result = self.publisher.publish(&git)?;
            Ok(PublishOutcome::new(self.config.branch.clone(), result))
        })
    }

    /// Discard the working copy, clone it again, and rebuild.
    ///
    /// Unpublished edits are lost.
    pub fn clear_cache(&self) -> Result<ClearOutcome, EngineError> {
        self.exclusive(|| {
            info!(
                target: SECURITY_TARGET,
                event = "CACHE_CLEAR",
                working_dir = %self.config.working_dir.display(),
                "clearing working copy"
            );
            let (_, report) = self.working_copy.reset_hard()?;
            Ok(ClearOutcome::new(report.head, self.run_build()))
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn exclusive<T>(
        &self,
        op: impl FnOnce() -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        self.lock.with_exclusive_access(op)
    }

    fn run_build(&self) -> BuildOutcome {
        let paths = self.working_copy.paths();
        let output_dir = paths.output_dir();
        let result = self.builder.build(&paths.checkout_dir(), &output_dir);
        BuildOutcome::new(result, output_dir)
    }

    fn rebuild_after_edit(&self) -> Option<BuildOutcome> {
        self.config
            .build
            .rebuild_on_save
            .then(|| self.run_build())
    }
}
