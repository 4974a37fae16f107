//! secrets::traits
//!
//! Secret storage trait definition.
//!
//! Keys are namespaced (`git.token`) so one store can hold several
//! credentials.
//!
//! # Security
//!
//! Implementations MUST:
//! - Never log, print, or include secrets in error messages
//! - Be thread-safe (Send + Sync)

use thiserror::Error;

/// Errors from secret storage operations.
///
/// Messages never include secret values.
#[derive(Debug, Error)]
pub enum SecretError {
    /// Failed to read from secret storage.
    #[error("failed to read secrets: {0}")]
    ReadError(String),

    /// Failed to write to secret storage.
    #[error("failed to write secrets: {0}")]
    WriteError(String),

    /// The home directory could not be determined.
    #[error("cannot determine home directory")]
    NoHomeDir,
}

/// Key-value storage for secrets.
pub trait SecretStore: Send + Sync {
    /// Get a secret by key; `Ok(None)` when absent.
    ///
    /// The returned value is the raw secret. Do not log or print it.
    fn get(&self, key: &str) -> Result<Option<String>, SecretError>;

    /// Set a secret, overwriting any existing value.
    fn set(&self, key: &str, value: &str) -> Result<(), SecretError>;

    /// Delete a secret. Deleting a missing key succeeds.
    fn delete(&self, key: &str) -> Result<(), SecretError>;

    /// Check if a secret exists.
    fn exists(&self, key: &str) -> Result<bool, SecretError> {
        Ok(self.get(key)?.is_some())
    }
}
