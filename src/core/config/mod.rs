//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Environment variables (`PAGEWRIGHT_*`)
//!
//! # Config File Locations
//!
//! Searched in order:
//! 1. The path passed explicitly (`pw --config <path>`), which must exist
//! 2. `$PAGEWRIGHT_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/pagewright/config.toml`
//! 4. `~/.pagewright/config.toml` (canonical write location)
//!
//! # Environment Overrides
//!
//! | Variable | Overrides |
//! |---|---|
//! | `PAGEWRIGHT_REPO_URL` | `repository.url` |
//! | `PAGEWRIGHT_BRANCH` | `repository.branch` |
//! | `PAGEWRIGHT_WORKING_DIR` | `repository.working_dir` |
//! | `PAGEWRIGHT_ALLOWED_DOMAINS` | `access.allowed_domains` (comma separated) |
//!
//! The access token is not part of the file; see [`crate::secrets`].
//!
//! # Example
//!
//! ```no_run
//! use pagewright::core::config::Config;
//!
//! let loaded = Config::load(None).unwrap();
//! let repo = loaded.config.repository_config(None).unwrap();
//! println!("publishing to {}", repo.branch);
//! ```

pub mod schema;

pub use schema::ConfigFile;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

use crate::core::ops::LockPolicy;
use crate::core::paths::WorkspacePaths;
use crate::core::types::BranchName;
use schema::{
    AccessSection, DEFAULT_BRANCH, DEFAULT_CONTENT_DIR, DEFAULT_PRODUCTION_BRANCH,
};

/// Default username paired with an access token.
pub const DEFAULT_TOKEN_USERNAME: &str = "x-access-token";

/// Default deadline for a clone, fetch, or push.
pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(120);

/// Default hard limit on a site build.
pub const DEFAULT_BUILD_TIMEOUT: Duration = Duration::from_secs(300);

/// Default site generator.
pub const DEFAULT_BUILD_COMMAND: &str = "hugo";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from file and environment.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents with environment overrides applied
    pub file: ConfigFile,
    /// Path the file was loaded from (if any)
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// fails validation. A missing file is not an error.
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_with_env(explicit, &|key| std::env::var(key).ok())
    }

    /// Load configuration with an injectable environment lookup.
    pub fn load_with_env(
        explicit: Option<&Path>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let (mut file, loaded_from) = match Self::locate(explicit, env)? {
            Some(path) => (Self::read_config(&path)?, Some(path)),
            None => (ConfigFile::default(), None),
        };

        Self::apply_env(&mut file, env, &mut warnings);
        file.validate()?;

        Ok(ConfigLoadResult {
            config: Config { file, loaded_from },
            warnings,
        })
    }

    /// Find the config file to load.
    fn locate(
        explicit: Option<&Path>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Option<PathBuf>, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "config file does not exist",
                    ),
                });
            }
            return Ok(Some(path.to_path_buf()));
        }

        if let Some(path) = env("PAGEWRIGHT_CONFIG").map(PathBuf::from) {
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_home) = env("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("pagewright/config.toml");
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(home) = dirs::home_dir() {
            let path = home.join(".pagewright/config.toml");
            if path.exists() {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    /// Apply `PAGEWRIGHT_*` overrides on top of the file values.
    fn apply_env(
        file: &mut ConfigFile,
        env: &dyn Fn(&str) -> Option<String>,
        warnings: &mut Vec<ConfigWarning>,
    ) {
        let mut override_value = |var: &str, slot: &mut Option<String>, name: &str| {
            if let Some(value) = env(var).filter(|v| !v.trim().is_empty()) {
                if slot.as_deref().is_some_and(|current| current != value) {
                    warnings.push(ConfigWarning {
                        message: format!("{} overrides {} from the config file", var, name),
                    });
                }
                *slot = Some(value);
            }
        };

        let repo = &mut file.repository;
        override_value("PAGEWRIGHT_REPO_URL", &mut repo.url, "repository.url");
        override_value("PAGEWRIGHT_BRANCH", &mut repo.branch, "repository.branch");
        override_value(
            "PAGEWRIGHT_WORKING_DIR",
            &mut repo.working_dir,
            "repository.working_dir",
        );

        if let Some(domains) = env("PAGEWRIGHT_ALLOWED_DOMAINS") {
            let parsed: Vec<String> = domains
                .split(',')
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect();
            if !parsed.is_empty() {
                file.access = Some(AccessSection {
                    allowed_domains: Some(parsed),
                });
            }
        }
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for the config file.
    ///
    /// Returns `~/.pagewright/config.toml`.
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".pagewright/config.toml"))
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed. Writes to a temp file in the
    /// same directory and renames it over the target.
    pub fn write_atomic(path: &Path, file: &ConfigFile) -> Result<(), ConfigError> {
        file.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(file).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut temp = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        temp.write_all(contents.as_bytes())
            .and_then(|()| temp.sync_all())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Remote repository URL, if configured.
    pub fn remote_url(&self) -> Option<&str> {
        self.file.repository.url.as_deref()
    }

    /// Publish branch. Defaults to "cms-beta".
    pub fn branch(&self) -> &str {
        self.file
            .repository
            .branch
            .as_deref()
            .unwrap_or(DEFAULT_BRANCH)
    }

    /// Production branch. Defaults to "main".
    pub fn production_branch(&self) -> &str {
        self.file
            .repository
            .production_branch
            .as_deref()
            .unwrap_or(DEFAULT_PRODUCTION_BRANCH)
    }

    /// Working directory. Defaults to `$TMPDIR/pagewright-work`.
    pub fn working_dir(&self) -> PathBuf {
        self.file
            .repository
            .working_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("pagewright-work"))
    }

    /// Content directory inside the checkout. Defaults to "content".
    pub fn content_dir(&self) -> &str {
        self.file
            .repository
            .content_dir
            .as_deref()
            .unwrap_or(DEFAULT_CONTENT_DIR)
    }

    /// Username paired with the access token.
    pub fn token_username(&self) -> &str {
        self.file
            .repository
            .username
            .as_deref()
            .unwrap_or(DEFAULT_TOKEN_USERNAME)
    }

    /// Host names allowed to reach the editor directly.
    pub fn allowed_domains(&self) -> &[String] {
        self.file
            .access
            .as_ref()
            .and_then(|a| a.allowed_domains.as_deref())
            .unwrap_or(&[])
    }

    /// Lock wait policy. Defaults to blocking.
    pub fn lock_policy(&self) -> LockPolicy {
        LockPolicy::from_wait_secs(self.file.lock.as_ref().and_then(|l| l.wait_secs))
    }

    /// Deadline for network operations.
    pub fn network_timeout(&self) -> Duration {
        self.file
            .network
            .as_ref()
            .and_then(|n| n.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_NETWORK_TIMEOUT)
    }

    /// Resolved build settings.
    pub fn build_settings(&self) -> BuildSettings {
        let section = self.file.build.clone().unwrap_or_default();
        BuildSettings {
            command: section
                .command
                .unwrap_or_else(|| DEFAULT_BUILD_COMMAND.to_string()),
            args: section.args.unwrap_or_else(BuildSettings::default_args),
            timeout: section
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_BUILD_TIMEOUT),
            rebuild_on_save: section.rebuild_on_save.unwrap_or(true),
        }
    }

    /// Path the configuration was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }

    /// Resolve everything the engine needs into an immutable value.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Missing`] if no remote URL is configured
    /// - [`ConfigError::InvalidValue`] for invalid branch names or patterns
    pub fn repository_config(
        &self,
        credential: Option<Credential>,
    ) -> Result<RepositoryConfig, ConfigError> {
        let remote_url = self
            .remote_url()
            .ok_or(ConfigError::Missing("repository.url"))?
            .to_string();

        let branch = BranchName::new(self.branch())
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        let production_branch = BranchName::new(self.production_branch())
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let path_rule = match self.file.paths.as_ref() {
            Some(paths) => match &paths.pattern {
                Some(pattern) => Some(PathRule {
                    pattern: Regex::new(pattern)
                        .map_err(|e| ConfigError::InvalidValue(e.to_string()))?,
                    hint: paths.hint.clone(),
                }),
                None => None,
            },
            None => None,
        };

        let author = self.file.commit.as_ref().and_then(|c| {
            match (c.author_name.as_ref(), c.author_email.as_ref()) {
                (Some(name), Some(email)) => Some(CommitAuthor {
                    name: name.clone(),
                    email: email.clone(),
                }),
                _ => None,
            }
        });

        Ok(RepositoryConfig {
            remote_url,
            branch,
            production_branch,
            credential,
            working_dir: self.working_dir(),
            content_dir: self.content_dir().to_string(),
            path_rule,
            allowed_domains: self.allowed_domains().to_vec(),
            lock_policy: self.lock_policy(),
            network_timeout: self.network_timeout(),
            build: self.build_settings(),
            author,
        })
    }
}

/// Username/token pair used for HTTPS remotes.
///
/// `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub token: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Restriction on where new documents may be created.
#[derive(Debug, Clone)]
pub struct PathRule {
    /// Pattern the path (without `.md`) must match
    pub pattern: Regex,
    /// Explanation shown on rejection
    pub hint: Option<String>,
}

/// Commit identity for published changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

/// How the site generator is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    /// Executable name or path
    pub command: String,
    /// Arguments with `{source}` / `{output}` placeholders
    pub args: Vec<String>,
    /// Hard limit on build duration
    pub timeout: Duration,
    /// Rebuild after each save/create
    pub rebuild_on_save: bool,
}

impl BuildSettings {
    /// Default arguments: build the checkout into the output directory.
    pub fn default_args() -> Vec<String> {
        ["--source", "{source}", "--destination", "{output}"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            command: DEFAULT_BUILD_COMMAND.to_string(),
            args: Self::default_args(),
            timeout: DEFAULT_BUILD_TIMEOUT,
            rebuild_on_save: true,
        }
    }
}

/// Fully resolved, immutable settings for one repository.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Remote URL
    pub remote_url: String,
    /// Publish branch
    pub branch: BranchName,
    /// Production branch (never pushed to)
    pub production_branch: BranchName,
    /// Access credential, if any
    pub credential: Option<Credential>,
    /// Working directory root
    pub working_dir: PathBuf,
    /// Content directory inside the checkout
    pub content_dir: String,
    /// Where new documents may be created
    pub path_rule: Option<PathRule>,
    /// Host names allowed to reach the editor directly
    pub allowed_domains: Vec<String>,
    /// Lock wait policy
    pub lock_policy: LockPolicy,
    /// Deadline for network operations
    pub network_timeout: Duration,
    /// Site generator settings
    pub build: BuildSettings,
    /// Commit identity override
    pub author: Option<CommitAuthor>,
}

impl RepositoryConfig {
    /// Minimal configuration for a remote and working directory.
    ///
    /// Every other setting takes its default.
    pub fn new(
        remote_url: impl Into<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let invalid = |e: crate::core::types::TypeError| ConfigError::InvalidValue(e.to_string());
        Ok(Self {
            remote_url: remote_url.into(),
            branch: BranchName::new(DEFAULT_BRANCH).map_err(invalid)?,
            production_branch: BranchName::new(DEFAULT_PRODUCTION_BRANCH).map_err(invalid)?,
            credential: None,
            working_dir: working_dir.into(),
            content_dir: DEFAULT_CONTENT_DIR.to_string(),
            path_rule: None,
            allowed_domains: Vec::new(),
            lock_policy: LockPolicy::Block,
            network_timeout: DEFAULT_NETWORK_TIMEOUT,
            build: BuildSettings::default(),
            author: None,
        })
    }

    /// Path routing for this repository's working directory.
    pub fn paths(&self) -> WorkspacePaths {
        WorkspacePaths::new(self.working_dir.clone(), self.content_dir.clone())
    }

    /// Check a request host against the allowed domains.
    ///
    /// With no domains configured every host is allowed. Matching ignores
    /// case and an optional `:port` suffix.
    pub fn allows_host(&self, host: &str) -> bool {
        if self.allowed_domains.is_empty() {
            return true;
        }
        let host = host.trim().to_ascii_lowercase();
        let bare = host
            .rsplit_once(':')
            .filter(|(_, port)| port.chars().all(|c| c.is_ascii_digit()))
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|| host.clone());

        self.allowed_domains.iter().any(|domain| {
            let domain = domain.trim().to_ascii_lowercase();
            domain == host || domain == bare
        })
    }
}
