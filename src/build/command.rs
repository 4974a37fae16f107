//! build::command
//!
//! [`SiteBuilder`] backed by an external program.
//!
//! # Invariants
//!
//! - stdout and stderr are drained on reader threads, so a chatty build
//!   never blocks on a full pipe
//! - A build past its deadline is killed and reaped before returning
//! - Only the exit status decides success

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

use super::{BuildResult, BuildStatus, SiteBuilder};
use crate::core::config::BuildSettings;

/// How long to wait for pipe readers once the process has exited.
const OUTPUT_GRACE: Duration = Duration::from_secs(2);

/// Runs the configured site generator.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    settings: BuildSettings,
}

impl CommandBuilder {
    pub fn new(settings: BuildSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Arguments with `{source}` and `{output}` substituted.
    pub fn expand_args(&self, site_dir: &Path, output_dir: &Path) -> Vec<String> {
        let source = site_dir.to_string_lossy();
        let output = output_dir.to_string_lossy();
        self.settings
            .args
            .iter()
            .map(|arg| arg.replace("{source}", &source).replace("{output}", &output))
            .collect()
    }
}

impl SiteBuilder for CommandBuilder {
    fn build(&self, site_dir: &Path, output_dir: &Path) -> BuildResult {
        let started = Instant::now();
        let args = self.expand_args(site_dir, output_dir);
        debug!(command = %self.settings.command, ?args, "starting build");

        let spawned = Command::new(&self.settings.command)
            .args(&args)
            .current_dir(site_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!(command = %self.settings.command, error = %e, "build could not start");
                return BuildResult::new(
                    BuildStatus::SpawnFailed {
                        reason: format!("{}: {}", self.settings.command, e),
                    },
                    String::new(),
                    started.elapsed(),
                );
            }
        };

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match child.wait_timeout(self.settings.timeout) {
            Ok(Some(status)) if status.success() => BuildStatus::Succeeded,
            Ok(Some(status)) => BuildStatus::Failed {
                code: status.code(),
            },
            Ok(None) => {
                warn!(
                    timeout_secs = self.settings.timeout.as_secs(),
                    "build timed out, killing"
                );
                let _ = child.kill();
                let _ = child.wait();
                BuildStatus::TimedOut {
                    after_secs: self.settings.timeout.as_secs(),
                }
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                BuildStatus::SpawnFailed {
                    reason: format!("cannot wait for {}: {}", self.settings.command, e),
                }
            }
        };

        let mut output = String::new();
        for reader in [stdout, stderr].into_iter().flatten() {
            if let Ok(text) = reader.recv_timeout(OUTPUT_GRACE) {
                output.push_str(&text);
            }
        }

        let result = BuildResult::new(status, output, started.elapsed());
        info!(
            success = result.is_success(),
            duration_ms = result.duration.as_millis() as u64,
            "build finished"
        );
        result
    }
}

/// Read a pipe to the end on its own thread.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}
