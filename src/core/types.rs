//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name
//! - [`Oid`] - Git object identifier (SHA)
//! - [`ContentPath`] - Normalized path of a document inside the content tree
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use pagewright::core::types::{BranchName, ContentPath, Oid};
//!
//! let branch = BranchName::new("cms-beta").unwrap();
//! assert_eq!(branch.ref_name(), "refs/heads/cms-beta");
//!
//! let path = ContentPath::new("news/launch").unwrap();
//! assert_eq!(path.as_str(), "news/launch.md");
//!
//! assert!(BranchName::new("invalid..name").is_err());
//! assert!(ContentPath::new("../etc/passwd").is_err());
//! assert!(Oid::new("not-a-sha").is_err());
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid content path: {0}")]
    InvalidContentPath(String),
}

/// A validated Git branch name.
///
/// Branch names must conform to Git's refname rules (see `git check-ref-format`):
/// - Cannot be empty or exactly `@`
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
///
/// # Example
///
/// ```
/// use pagewright::core::types::BranchName;
///
/// let name = BranchName::new("cms/beta").unwrap();
/// assert_eq!(name.as_str(), "cms/beta");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("has space").is_err());
/// assert!(BranchName::new("branch.lock").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let reject = |reason: &str| Err(TypeError::InvalidBranchName(reason.to_string()));

        if name.is_empty() {
            return reject("branch name cannot be empty");
        }
        if name == "@" {
            return reject("branch name cannot be '@' (reserved)");
        }
        if name.starts_with('.') || name.starts_with('-') {
            return reject("branch name cannot start with '.' or '-'");
        }
        if name.ends_with(".lock") || name.ends_with('/') {
            return reject("branch name cannot end with '.lock' or '/'");
        }
        for forbidden in ["..", "@{", "//"] {
            if name.contains(forbidden) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{forbidden}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(TypeError::InvalidBranchName(format!(
                "branch name cannot contain '{c}'"
            )));
        }
        if name.chars().any(|c| c.is_ascii_control()) {
            return reject("branch name cannot contain control characters");
        }
        if name
            .split('/')
            .any(|component| component.starts_with('.') || component.ends_with(".lock"))
        {
            return reject("path component cannot start with '.' or end with '.lock'");
        }

        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full local ref name (`refs/heads/<branch>`).
    pub fn ref_name(&self) -> String {
        format!("refs/heads/{}", self.0)
    }

    /// Remote-tracking ref name (`refs/remotes/<remote>/<branch>`).
    pub fn remote_ref_name(&self, remote: &str) -> String {
        format!("refs/remotes/{}/{}", remote, self.0)
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Git object identifier (SHA-1 or SHA-256), normalized to lowercase.
///
/// # Example
///
/// ```
/// use pagewright::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The extension every content document carries.
pub const CONTENT_EXTENSION: &str = ".md";

/// A normalized, relative path of a document inside the content tree.
///
/// Construction strips a leading `/`, appends `.md` when missing, and
/// rejects anything that could escape the content tree: `..` or `.`
/// segments, hidden segments, backslashes, empty segments and control
/// characters. The stored form always uses `/` separators.
///
/// # Example
///
/// ```
/// use pagewright::core::types::ContentPath;
///
/// let path = ContentPath::new("/news/launch").unwrap();
/// assert_eq!(path.as_str(), "news/launch.md");
/// assert_eq!(path.stem(), "news/launch");
/// assert_eq!(path.canonical_url(), "/news/launch");
///
/// let bundle = ContentPath::new("docs/_index.md").unwrap();
/// assert_eq!(bundle.canonical_url(), "/docs/");
///
/// assert!(ContentPath::new("news/../../secret").is_err());
/// assert!(ContentPath::new(".git/config").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentPath(String);

impl ContentPath {
    /// Normalize and validate a candidate document path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidContentPath` describing the first rule violated.
    pub fn new(candidate: impl AsRef<str>) -> Result<Self, TypeError> {
        let reject = |reason: &str| Err(TypeError::InvalidContentPath(reason.to_string()));

        let trimmed = candidate.as_ref().trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return reject("path cannot be empty");
        }
        if trimmed.contains('\\') {
            return reject("path cannot contain '\\'");
        }
        if trimmed.chars().any(|c| c.is_control()) {
            return reject("path cannot contain control characters");
        }

        let mut normalized = trimmed.to_string();
        if !normalized.ends_with(CONTENT_EXTENSION) {
            normalized.push_str(CONTENT_EXTENSION);
        }

        for segment in normalized.split('/') {
            if segment.is_empty() {
                return reject("path cannot contain empty segments");
            }
            if segment == "." || segment == ".." {
                return reject("path cannot contain '.' or '..' segments");
            }
            if segment.starts_with('.') {
                return reject("path segments cannot start with '.'");
            }
        }

        Ok(Self(normalized))
    }

    /// The normalized path (always ends with `.md`).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path without its `.md` extension.
    pub fn stem(&self) -> &str {
        self.0
            .strip_suffix(CONTENT_EXTENSION)
            .unwrap_or(&self.0)
    }

    /// Join this path onto a base directory.
    pub fn to_path(&self, base: &Path) -> PathBuf {
        self.0
            .split('/')
            .fold(base.to_path_buf(), |acc, segment| acc.join(segment))
    }

    /// The site URL this document is served at.
    ///
    /// Page bundles (`x/index.md`, `x/_index.md`) map to `/x/`; the root
    /// bundle maps to `/`; everything else drops the extension.
    pub fn canonical_url(&self) -> String {
        let stem = self.stem();
        for bundle in ["index", "_index"] {
            if stem == bundle {
                return "/".to_string();
            }
            if let Some(dir) = stem.strip_suffix(&format!("/{bundle}")) {
                return format!("/{dir}/");
            }
        }
        format!("/{stem}")
    }

    /// A human title derived from the last meaningful segment.
    ///
    /// `news/launch-day` becomes `Launch Day`; bundles use their directory name.
    pub fn derived_title(&self) -> String {
        let mut segments: Vec<&str> = self.stem().split('/').collect();
        if segments.len() > 1 && matches!(segments.last(), Some(&"index") | Some(&"_index")) {
            segments.pop();
        }
        let slug = segments.last().copied().unwrap_or_default();

        slug.split(['-', '_'])
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl TryFrom<String> for ContentPath {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContentPath> for String {
    fn from(path: ContentPath) -> Self {
        path.0
    }
}

impl AsRef<str> for ContentPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod branch_name {
        use super::*;

        #[test]
        fn valid_names() {
            assert!(BranchName::new("main").is_ok());
            assert!(BranchName::new("cms-beta").is_ok());
            assert!(BranchName::new("cms/preview").is_ok());
            assert!(BranchName::new("user@feature").is_ok());
        }

        #[test]
        fn invalid_names() {
            assert!(BranchName::new("").is_err());
            assert!(BranchName::new("@").is_err());
            assert!(BranchName::new(".hidden").is_err());
            assert!(BranchName::new("-flag").is_err());
            assert!(BranchName::new("a..b").is_err());
            assert!(BranchName::new("a//b").is_err());
            assert!(BranchName::new("trailing/").is_err());
            assert!(BranchName::new("x.lock").is_err());
            assert!(BranchName::new("a/.b").is_err());
            assert!(BranchName::new("has space").is_err());
            assert!(BranchName::new("ctl\x07").is_err());
        }

        #[test]
        fn ref_names() {
            let branch = BranchName::new("cms-beta").unwrap();
            assert_eq!(branch.ref_name(), "refs/heads/cms-beta");
            assert_eq!(
                branch.remote_ref_name("origin"),
                "refs/remotes/origin/cms-beta"
            );
        }

        #[test]
        fn serde_round_trip_validates() {
            let parsed: Result<BranchName, _> = serde_json::from_str("\"a..b\"");
            assert!(parsed.is_err());
            let parsed: BranchName = serde_json::from_str("\"main\"").unwrap();
            assert_eq!(parsed.as_str(), "main");
        }
    }

    mod oid {
        use super::*;

        #[test]
        fn normalizes_case() {
            let oid = Oid::new("ABCDEF0123456789ABCDEF0123456789ABCDEF01").unwrap();
            assert_eq!(oid.as_str(), "abcdef0123456789abcdef0123456789abcdef01");
        }

        #[test]
        fn rejects_bad_input() {
            assert!(Oid::new("abc").is_err());
            assert!(Oid::new("g".repeat(40)).is_err());
        }

        #[test]
        fn short_clamps() {
            let oid = Oid::new("abcdef0123456789abcdef0123456789abcdef01").unwrap();
            assert_eq!(oid.short(7), "abcdef0");
            assert_eq!(oid.short(100).len(), 40);
        }
    }

    mod content_path {
        use super::*;

        #[test]
        fn appends_extension_and_strips_leading_slash() {
            assert_eq!(
                ContentPath::new("/news/launch").unwrap().as_str(),
                "news/launch.md"
            );
            assert_eq!(
                ContentPath::new("about.md").unwrap().as_str(),
                "about.md"
            );
        }

        #[test]
        fn rejects_escapes() {
            assert!(ContentPath::new("").is_err());
            assert!(ContentPath::new("/").is_err());
            assert!(ContentPath::new("../x").is_err());
            assert!(ContentPath::new("a/./b").is_err());
            assert!(ContentPath::new("a//b").is_err());
            assert!(ContentPath::new("a\\b").is_err());
            assert!(ContentPath::new(".git/config").is_err());
            assert!(ContentPath::new("news/.hidden").is_err());
            assert!(ContentPath::new("bad\nname").is_err());
        }

        #[test]
        fn canonical_urls() {
            let url = |p: &str| ContentPath::new(p).unwrap().canonical_url();
            assert_eq!(url("news/launch"), "/news/launch");
            assert_eq!(url("about.md"), "/about");
            assert_eq!(url("docs/index.md"), "/docs/");
            assert_eq!(url("docs/_index.md"), "/docs/");
            assert_eq!(url("_index.md"), "/");
        }

        #[test]
        fn derived_titles() {
            let title = |p: &str| ContentPath::new(p).unwrap().derived_title();
            assert_eq!(title("news/launch"), "Launch");
            assert_eq!(title("news/launch-day"), "Launch Day");
            assert_eq!(title("guides/getting_started/index.md"), "Getting Started");
        }

        #[test]
        fn to_path_joins_segments() {
            let path = ContentPath::new("news/launch").unwrap();
            let joined = path.to_path(Path::new("/site/content"));
            assert_eq!(joined, PathBuf::from("/site/content/news/launch.md"));
        }
    }
}
