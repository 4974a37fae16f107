//! build
//!
//! Site generation through an external program.
//!
//! # Architecture
//!
//! The engine depends on the [`SiteBuilder`] trait, not on a concrete
//! program. [`CommandBuilder`] is the production implementation; tests
//! substitute their own.
//!
//! A build never returns an error. Every outcome, including a program that
//! cannot be started, is a [`BuildResult`] the caller reports.
//!
//! # Example
//!
//! ```ignore
//! use pagewright::build::{CommandBuilder, SiteBuilder};
//! use pagewright::core::config::BuildSettings;
//!
//! let builder = CommandBuilder::new(BuildSettings::default());
//! let result = builder.build(site_dir, output_dir);
//! println!("{}", result.summary());
//! ```

mod command;

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

pub use command::CommandBuilder;

/// Number of output lines kept as diagnostics.
pub const DIAGNOSTIC_LINES: usize = 20;

/// Runs the site generator.
pub trait SiteBuilder: Send + Sync {
    /// Build the site rooted at `site_dir` into `output_dir`.
    fn build(&self, site_dir: &Path, output_dir: &Path) -> BuildResult;
}

/// How a build ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "status")]
pub enum BuildStatus {
    Succeeded,
    /// The program exited unsuccessfully; `code` is absent when killed by a signal
    Failed { code: Option<i32> },
    /// The program ran past its deadline and was killed
    TimedOut { after_secs: u64 },
    /// The program could not be started
    SpawnFailed { reason: String },
}

/// Result of one build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildResult {
    #[serde(flatten)]
    pub status: BuildStatus,
    /// Captured stdout followed by stderr
    pub output: String,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
    pub finished_at: DateTime<Utc>,
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl BuildResult {
    /// Result stamped with the current time.
    pub fn new(status: BuildStatus, output: String, duration: Duration) -> Self {
        Self {
            status,
            output,
            duration,
            finished_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == BuildStatus::Succeeded
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        match &self.status {
            BuildStatus::Succeeded => {
                format!("Site built in {:.1}s", self.duration.as_secs_f64())
            }
            BuildStatus::Failed { code: Some(code) } => {
                format!("Build failed (exit code {})", code)
            }
            BuildStatus::Failed { code: None } => "Build failed (terminated by signal)".to_string(),
            BuildStatus::TimedOut { after_secs } => {
                format!("Build timed out after {}s", after_secs)
            }
            BuildStatus::SpawnFailed { reason } => format!("Could not start build: {}", reason),
        }
    }

    /// The last few non-empty output lines.
    pub fn diagnostics(&self) -> Vec<String> {
        let lines: Vec<&str> = self
            .output
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let skip = lines.len().saturating_sub(DIAGNOSTIC_LINES);
        lines[skip..].iter().map(|line| line.to_string()).collect()
    }
}
