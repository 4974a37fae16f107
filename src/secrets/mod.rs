//! secrets
//!
//! Storage and resolution of the Git access token.
//!
//! # Resolution Order
//!
//! 1. `PAGEWRIGHT_GIT_TOKEN` in the environment
//! 2. Key `git.token` in the secret store (`~/.pagewright/secrets.toml`)
//!
//! The token is paired with the configured username and handed to the Git
//! layer as a [`Credential`]. It is never embedded in a remote URL.
//!
//! # Security
//!
//! - Secrets are **never** logged or included in error messages
//! - The file store uses 0600 permissions on Unix
//! - All writes are atomic (temp file + rename)

mod file_store;
mod traits;

pub use file_store::FileSecretStore;
pub use traits::{SecretError, SecretStore};

use serde::Serialize;

use crate::core::config::Credential;

/// Secret store key for the Git token.
pub const TOKEN_KEY: &str = "git.token";

/// Environment variable that overrides the stored token.
pub const TOKEN_ENV: &str = "PAGEWRIGHT_GIT_TOKEN";

/// Where a credential's token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenSource {
    Environment,
    Store,
}

/// Resolve the Git credential, if any token is available.
///
/// `env` looks up environment variables; an empty value counts as unset.
pub fn resolve_credential(
    username: &str,
    env: &dyn Fn(&str) -> Option<String>,
    store: &dyn SecretStore,
) -> Result<Option<(Credential, TokenSource)>, SecretError> {
    let credential = |token: String| Credential {
        username: username.to_string(),
        token,
    };

    if let Some(token) = env(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
        return Ok(Some((credential(token.trim().to_string()), TokenSource::Environment)));
    }

    Ok(store
        .get(TOKEN_KEY)?
        .filter(|t| !t.trim().is_empty())
        .map(|token| (credential(token.trim().to_string()), TokenSource::Store)))
}
