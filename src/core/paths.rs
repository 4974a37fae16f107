//! core::paths
//!
//! Centralized path routing for the working directory.
//!
//! # Storage Layout
//!
//! Everything the engine owns lives under the configured working directory:
//! - `repo/` - The Git checkout (the working copy)
//! - `repo/<content_dir>/` - The version-controlled content tree
//! - `public/` - Generated site output (outside the checkout)
//! - `.pagewright.lock` - Exclusive operation lock file
//!
//! No other module should compute `working_dir.join(..)` paths directly.
//!
//! # Example
//!
//! ```
//! use pagewright::core::paths::WorkspacePaths;
//! use std::path::PathBuf;
//!
//! let paths = WorkspacePaths::new(PathBuf::from("/srv/cms"), "content");
//!
//! assert_eq!(paths.checkout_dir(), PathBuf::from("/srv/cms/repo"));
//! assert_eq!(paths.content_dir(), PathBuf::from("/srv/cms/repo/content"));
//! assert_eq!(paths.lock_path(), PathBuf::from("/srv/cms/.pagewright.lock"));
//! ```

use std::path::{Path, PathBuf};

/// File name prefix of in-flight document writes. Such files are never
/// staged.
pub const TEMP_PREFIX: &str = ".pagewright-";

/// Whether a file name belongs to an in-flight (or abandoned) write.
pub fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(TEMP_PREFIX))
}

/// Centralized path routing for engine storage.
///
/// # Invariants
///
/// - The lock file and the build output never live inside the checkout,
///   so a reset never deletes the lock and a publish never stages output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    /// Root working directory.
    pub root: PathBuf,
    /// Content directory, relative to the checkout root.
    content_dir: String,
}

impl WorkspacePaths {
    /// Create paths rooted at `root` with the given content directory name.
    pub fn new(root: PathBuf, content_dir: impl Into<String>) -> Self {
        Self {
            root,
            content_dir: content_dir.into(),
        }
    }

    /// Directory holding the Git checkout.
    pub fn checkout_dir(&self) -> PathBuf {
        self.root.join("repo")
    }

    /// The `.git` directory of the checkout.
    pub fn git_dir(&self) -> PathBuf {
        self.checkout_dir().join(".git")
    }

    /// Content tree inside the checkout.
    pub fn content_dir(&self) -> PathBuf {
        self.checkout_dir().join(&self.content_dir)
    }

    /// Content directory name relative to the checkout (used as a pathspec).
    pub fn content_dir_name(&self) -> &str {
        &self.content_dir
    }

    /// Generated site output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join("public")
    }

    /// Exclusive lock file.
    pub fn lock_path(&self) -> PathBuf {
        self.root.join(".pagewright.lock")
    }

    /// Whether the checkout exists and is a Git repository.
    pub fn has_checkout(&self) -> bool {
        self.git_dir().exists()
    }

    /// Check whether a path lies inside the content tree.
    pub fn is_in_content(&self, path: &Path) -> bool {
        path.starts_with(self.content_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_files_recognized() {
        assert!(is_temp_file(Path::new("content/news/.pagewright-a1B2.tmp")));
        assert!(!is_temp_file(Path::new("content/news/launch.md")));
        assert!(!is_temp_file(Path::new("content/.pagewright-dir/launch.md")));
    }

    #[test]
    fn layout_is_rooted() {
        let paths = WorkspacePaths::new(PathBuf::from("/work"), "content");
        assert_eq!(paths.checkout_dir(), PathBuf::from("/work/repo"));
        assert_eq!(paths.git_dir(), PathBuf::from("/work/repo/.git"));
        assert_eq!(paths.content_dir(), PathBuf::from("/work/repo/content"));
        assert_eq!(paths.output_dir(), PathBuf::from("/work/public"));
        assert_eq!(paths.lock_path(), PathBuf::from("/work/.pagewright.lock"));
    }

    #[test]
    fn lock_and_output_live_outside_checkout() {
        let paths = WorkspacePaths::new(PathBuf::from("/work"), "content");
        assert!(!paths.lock_path().starts_with(paths.checkout_dir()));
        assert!(!paths.output_dir().starts_with(paths.checkout_dir()));
    }

    #[test]
    fn custom_content_dir() {
        let paths = WorkspacePaths::new(PathBuf::from("/work"), "site/content");
        assert_eq!(paths.content_dir_name(), "site/content");
        assert!(paths.is_in_content(Path::new("/work/repo/site/content/a.md")));
        assert!(!paths.is_in_content(Path::new("/work/repo/layouts/a.html")));
    }

    #[test]
    fn has_checkout_requires_git_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = WorkspacePaths::new(temp.path().to_path_buf(), "content");
        assert!(!paths.has_checkout());

        std::fs::create_dir_all(paths.git_dir()).unwrap();
        assert!(paths.has_checkout());
    }
}
