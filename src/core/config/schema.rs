//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Example
//!
//! ```toml
//! [repository]
//! url = "https://github.com/acme/site.git"
//! branch = "cms-beta"
//! production_branch = "main"
//! working_dir = "/var/lib/pagewright"
//!
//! [paths]
//! pattern = "^(news|pages)/[a-z0-9-]+$"
//! hint = "use news/<slug> or pages/<slug>"
//!
//! [access]
//! allowed_domains = ["cms.example.com"]
//!
//! [lock]
//! wait_secs = 30
//!
//! [build]
//! command = "hugo"
//! timeout_secs = 300
//! ```
//!
//! # Validation
//!
//! Values are validated after parsing: branch names must be valid, the
//! publish branch must differ from the production branch, the path pattern
//! must compile, and timeouts must be positive.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::BranchName;

/// Default publish branch.
pub const DEFAULT_BRANCH: &str = "cms-beta";

/// Default production branch (never pushed to).
pub const DEFAULT_PRODUCTION_BRANCH: &str = "main";

/// Default content directory inside the checkout.
pub const DEFAULT_CONTENT_DIR: &str = "content";

/// The whole configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Remote repository and checkout settings
    pub repository: RepositorySection,

    /// Restrictions on where new documents may be created
    pub paths: Option<PathsSection>,

    /// Access restrictions for the fronting HTTP layer
    pub access: Option<AccessSection>,

    /// Operation lock behavior
    pub lock: Option<LockSection>,

    /// Clone/fetch/push behavior
    pub network: Option<NetworkSection>,

    /// Site generator invocation
    pub build: Option<BuildSection>,

    /// Commit identity for published changes
    pub commit: Option<CommitSection>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.repository.validate()?;

        if let Some(paths) = &self.paths {
            paths.validate()?;
        }
        if let Some(network) = &self.network {
            if network.timeout_secs == Some(0) {
                return Err(ConfigError::InvalidValue(
                    "network.timeout_secs must be greater than zero".to_string(),
                ));
            }
        }
        if let Some(build) = &self.build {
            build.validate()?;
        }

        Ok(())
    }
}

/// `[repository]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepositorySection {
    /// Remote URL (https, ssh, or a local path)
    pub url: Option<String>,

    /// Branch the engine checks out and publishes to
    pub branch: Option<String>,

    /// Production branch the engine must never push to
    pub production_branch: Option<String>,

    /// Username paired with the access token (default: "x-access-token")
    pub username: Option<String>,

    /// Local working directory
    pub working_dir: Option<String>,

    /// Content directory inside the checkout (default: "content")
    pub content_dir: Option<String>,
}

impl RepositorySection {
    fn validate(&self) -> Result<(), ConfigError> {
        let branch = self.branch.as_deref().unwrap_or(DEFAULT_BRANCH);
        let production = self
            .production_branch
            .as_deref()
            .unwrap_or(DEFAULT_PRODUCTION_BRANCH);

        BranchName::new(branch)
            .map_err(|e| ConfigError::InvalidValue(format!("invalid branch: {}", e)))?;
        BranchName::new(production).map_err(|e| {
            ConfigError::InvalidValue(format!("invalid production_branch: {}", e))
        })?;

        if branch == production {
            return Err(ConfigError::InvalidValue(format!(
                "branch '{}' is the production branch; publishing must target a separate branch",
                branch
            )));
        }

        if let Some(url) = &self.url {
            if url.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "repository.url cannot be empty".to_string(),
                ));
            }
        }

        if let Some(dir) = &self.content_dir {
            let escapes = dir
                .split('/')
                .any(|segment| segment.is_empty() || segment == "." || segment == "..");
            if dir.starts_with('/') || escapes {
                return Err(ConfigError::InvalidValue(format!(
                    "content_dir '{}' must be a relative path inside the checkout",
                    dir
                )));
            }
        }

        Ok(())
    }
}

/// `[paths]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PathsSection {
    /// Regular expression new document paths (without `.md`) must match
    pub pattern: Option<String>,

    /// Human-readable explanation shown when a path is rejected
    pub hint: Option<String>,
}

impl PathsSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pattern) = &self.pattern {
            regex::Regex::new(pattern).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid paths.pattern: {}", e))
            })?;
        }
        Ok(())
    }
}

/// `[access]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AccessSection {
    /// Host names allowed to reach the editor directly (empty = any)
    pub allowed_domains: Option<Vec<String>>,
}

/// `[lock]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LockSection {
    /// Maximum seconds to wait for the lock; absent blocks, 0 fails fast
    pub wait_secs: Option<u64>,
}

/// `[network]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkSection {
    /// Deadline for a single clone, fetch, or push
    pub timeout_secs: Option<u64>,
}

/// `[build]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    /// Generator executable (default: "hugo")
    pub command: Option<String>,

    /// Arguments; `{source}` and `{output}` are substituted
    pub args: Option<Vec<String>>,

    /// Hard limit on build duration
    pub timeout_secs: Option<u64>,

    /// Rebuild after every save/create (default: true)
    pub rebuild_on_save: Option<bool>,
}

impl BuildSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(command) = &self.command {
            if command.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "build.command cannot be empty".to_string(),
                ));
            }
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "build.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// `[commit]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CommitSection {
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}
