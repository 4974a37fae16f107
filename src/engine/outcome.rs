//! engine::outcome
//!
//! Structured results of engine operations.
//!
//! Every outcome serializes to JSON so a routing layer or `pw --json` can
//! return it unchanged.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::build::BuildResult;
use crate::content::{ContentDocument, FrontmatterFormat};
use crate::core::types::{BranchName, ContentPath, Oid};
use crate::publish::PublishResult;

/// A document as presented to an editor.
#[derive(Debug, Clone, Serialize)]
pub struct ContentView {
    pub path: ContentPath,
    /// Site URL the document is served at
    pub url: String,
    /// Absent for documents without frontmatter
    pub format: Option<FrontmatterFormat>,
    pub frontmatter: Map<String, Value>,
    pub body: String,
}

impl ContentView {
    pub(crate) fn new(path: ContentPath, doc: &ContentDocument) -> Self {
        Self {
            url: path.canonical_url(),
            format: doc.format(),
            frontmatter: doc.fields(),
            body: doc.body().to_string(),
            path,
        }
    }
}

/// Result of a site build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutcome {
    pub success: bool,
    pub message: String,
    /// Tail of the build output
    pub diagnostics: Vec<String>,
    pub output_dir: PathBuf,
    pub result: BuildResult,
}

impl BuildOutcome {
    pub(crate) fn new(result: BuildResult, output_dir: PathBuf) -> Self {
        Self {
            success: result.is_success(),
            message: result.summary(),
            diagnostics: if result.is_success() {
                Vec::new()
            } else {
                result.diagnostics()
            },
            output_dir,
            result,
        }
    }
}

/// Result of saving an existing document.
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub path: ContentPath,
    pub message: String,
    /// Present when the site was rebuilt after the save
    pub build: Option<BuildOutcome>,
}

/// Result of creating a document.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOutcome {
    pub path: ContentPath,
    pub url: String,
    pub message: String,
    pub build: Option<BuildOutcome>,
}

/// Result of publishing.
#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub success: bool,
    pub message: String,
    pub branch: BranchName,
    pub changed_paths: Vec<String>,
    pub commit: Option<Oid>,
}

impl PublishOutcome {
    pub(crate) fn new(branch: BranchName, result: PublishResult) -> Self {
        let message = match &result.commit {
            None => "No changes to publish".to_string(),
            Some(commit) => format!(
                "Published {} {} to {} ({})",
                result.changed_paths.len(),
                if result.changed_paths.len() == 1 {
                    "file"
                } else {
                    "files"
                },
                branch,
                commit.short(7)
            ),
        };
        Self {
            success: true,
            message,
            branch,
            changed_paths: result.changed_paths,
            commit: result.commit,
        }
    }
}

/// Result of discarding and re-cloning the working copy.
#[derive(Debug, Clone, Serialize)]
pub struct ClearOutcome {
    /// True when the re-clone and the rebuild both succeeded
    pub success: bool,
    pub message: String,
    pub head: Oid,
    pub build: BuildOutcome,
}

impl ClearOutcome {
    pub(crate) fn new(head: Oid, build: BuildOutcome) -> Self {
        let message = if build.success {
            "Cache cleared and site rebuilt".to_string()
        } else {
            format!("Cache cleared, but the rebuild failed: {}", build.message)
        };
        Self {
            success: build.success,
            message,
            head,
            build,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildStatus;
    use crate::content::parse;
    use crate::publish::PushOutcome;
    use std::time::Duration;

    fn build(status: BuildStatus, output: &str) -> BuildOutcome {
        BuildOutcome::new(
            BuildResult::new(status, output.to_string(), Duration::from_secs(1)),
            PathBuf::from("/w/public"),
        )
    }

    #[test]
    fn view_of_document() {
        let doc = parse("+++\ntitle = 'Hi'\n+++\nBody\n").unwrap();
        let view = ContentView::new(ContentPath::new("news/hi").unwrap(), &doc);
        assert_eq!(view.url, "/news/hi");
        assert_eq!(view.format, Some(FrontmatterFormat::Toml));
        assert_eq!(view.frontmatter["title"], "Hi");
        assert_eq!(view.body, "Body\n");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["format"], "toml");
        assert_eq!(json["path"], "news/hi.md");
    }

    #[test]
    fn successful_build_has_no_diagnostics() {
        let outcome = build(BuildStatus::Succeeded, "noise\n");
        assert!(outcome.success);
        assert!(outcome.diagnostics.is_empty());

        let outcome = build(BuildStatus::Failed { code: Some(1) }, "Error: bad\n");
        assert!(!outcome.success);
        assert_eq!(outcome.diagnostics, vec!["Error: bad"]);
    }

    #[test]
    fn publish_messages() {
        let branch = BranchName::new("cms-beta").unwrap();
        let noop = PublishOutcome::new(
            branch.clone(),
            PublishResult {
                commit: None,
                changed_paths: vec![],
                push: PushOutcome::NotAttempted,
                message: None,
            },
        );
        assert!(noop.success);
        assert_eq!(noop.message, "No changes to publish");

        let done = PublishOutcome::new(
            branch,
            PublishResult {
                commit: Some(Oid::new("a".repeat(40)).unwrap()),
                changed_paths: vec!["content/a.md".into()],
                push: PushOutcome::Accepted,
                message: Some("m".into()),
            },
        );
        assert_eq!(done.message, "Published 1 file to cms-beta (aaaaaaa)");
    }

    #[test]
    fn clear_reports_failed_rebuild() {
        let head = Oid::new("b".repeat(40)).unwrap();
        let outcome = ClearOutcome::new(head, build(BuildStatus::TimedOut { after_secs: 5 }, ""));
        assert!(!outcome.success);
        assert!(outcome.message.contains("timed out"));
    }
}
