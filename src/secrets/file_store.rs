//! secrets::file_store
//!
//! File-based secret storage.
//!
//! # Security
//!
//! - Secrets are stored in `~/.pagewright/secrets.toml`
//! - File permissions are set to 0600 on Unix (owner read/write only)
//! - All writes are atomic (write to temp file, then rename)
//! - Secrets are NEVER logged, printed, or included in error messages

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::traits::{SecretError, SecretStore};

/// Secrets kept in a TOML table of `key = "value"` pairs.
#[derive(Debug)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Store at the default location, `~/.pagewright/secrets.toml`.
    pub fn new() -> Result<Self, SecretError> {
        Ok(Self {
            path: Self::default_path()?,
        })
    }

    /// The default secrets file location.
    pub fn default_path() -> Result<PathBuf, SecretError> {
        let home = dirs::home_dir().ok_or(SecretError::NoHomeDir)?;
        Ok(home.join(".pagewright").join("secrets.toml"))
    }

    /// Store at a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_secrets(&self) -> Result<BTreeMap<String, String>, SecretError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        if !self.verify_permissions()? {
            tracing::warn!(
                path = %self.path.display(),
                "secrets file is readable by other users; expected mode 0600"
            );
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| SecretError::ReadError(format!("cannot read secrets file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SecretError::ReadError(format!("cannot parse secrets file: {}", e)))
    }

    /// Write secrets atomically with owner-only permissions.
    fn write_secrets(&self, secrets: &BTreeMap<String, String>) -> Result<(), SecretError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SecretError::WriteError(format!("cannot create directory: {}", e)))?;
        }

        let content = toml::to_string(secrets)
            .map_err(|e| SecretError::WriteError(format!("cannot serialize secrets: {}", e)))?;

        let temp_path = self.path.with_extension("toml.tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| SecretError::WriteError(format!("cannot create temp file: {}", e)))?;

            // Restrict before any secret bytes land on disk.
            #[cfg(unix)]
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| SecretError::WriteError(format!("cannot set permissions: {}", e)))?;

            file.write_all(content.as_bytes())
                .and_then(|()| file.sync_all())
                .map_err(|e| SecretError::WriteError(format!("cannot write secrets: {}", e)))?;
        }

        fs::rename(&temp_path, &self.path)
            .map_err(|e| SecretError::WriteError(format!("cannot rename temp file: {}", e)))
    }

    /// Whether the file is absent or has 0600 permissions.
    #[cfg(unix)]
    pub fn verify_permissions(&self) -> Result<bool, SecretError> {
        if !self.path.exists() {
            return Ok(true);
        }
        let metadata = fs::metadata(&self.path)
            .map_err(|e| SecretError::ReadError(format!("cannot read file metadata: {}", e)))?;
        Ok(metadata.permissions().mode() & 0o777 == 0o600)
    }

    #[cfg(not(unix))]
    pub fn verify_permissions(&self) -> Result<bool, SecretError> {
        Ok(true)
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.read_secrets()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let mut secrets = self.read_secrets()?;
        secrets.insert(key.to_string(), value.to_string());
        self.write_secrets(&secrets)
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        let mut secrets = self.read_secrets()?;
        if secrets.remove(key).is_none() {
            return Ok(());
        }
        self.write_secrets(&secrets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FileSecretStore {
        FileSecretStore::with_path(dir.path().join("nested").join("secrets.toml"))
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).get("git.token").unwrap(), None);
    }

    #[test]
    fn set_get_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.set("git.token", "first").unwrap();
        store.set("git.token", "second").unwrap();
        assert_eq!(store.get("git.token").unwrap().as_deref(), Some("second"));
        assert!(store.exists("git.token").unwrap());
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.set("git.token", "t").unwrap();
        store.set("other", "o").unwrap();
        store.delete("git.token").unwrap();
        store.delete("git.token").unwrap();
        assert_eq!(store.get("git.token").unwrap(), None);
        assert_eq!(store.get("other").unwrap().as_deref(), Some("o"));
    }

    #[test]
    fn corrupt_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "not = [valid").unwrap();
        assert!(matches!(store.get("x"), Err(SecretError::ReadError(_))));
    }

    #[cfg(unix)]
    #[test]
    fn permissions_0600_on_unix() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.set("git.token", "t").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert!(store.verify_permissions().unwrap());
    }
}
