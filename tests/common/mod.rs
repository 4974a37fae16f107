//! Shared fixtures for integration tests.
//!
//! A [`SiteRemote`] is a bare repository (the "remote") seeded with a small
//! Hugo-style site on `main` and `cms-beta`, created with the git CLI.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use pagewright::build::{BuildResult, BuildStatus, SiteBuilder};
use pagewright::core::config::RepositoryConfig;
use pagewright::engine::Repository;

pub const LAUNCH_MD: &str = "---\n\
title: \"Launch\"\n\
date: 2024-01-05\n\
tags: [news, launch]  # shown on the index\n\
draft: true\n\
---\n\
\n\
We are live.\n";

pub const ABOUT_MD: &str = "+++\n\
title = 'About us'\n\
weight = 2\n\
+++\n\
Who we are.\n";

/// A bare remote seeded with a site.
pub struct SiteRemote {
    dir: TempDir,
    pub url: String,
}

impl SiteRemote {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let seed = dir.path().join("seed");
        fs::create_dir_all(seed.join("content/news")).unwrap();

        run_git(&seed, &["init"]);
        configure_identity(&seed);
        fs::write(seed.join("hugo.toml"), "title = 'Test Site'\n").unwrap();
        fs::write(seed.join("content/_index.md"), "---\ntitle: Home\n---\n").unwrap();
        fs::write(seed.join("content/news/launch.md"), LAUNCH_MD).unwrap();
        fs::write(seed.join("content/about.md"), ABOUT_MD).unwrap();
        run_git(&seed, &["add", "."]);
        run_git(&seed, &["commit", "-m", "Initial site"]);
        run_git(&seed, &["branch", "-M", "main"]);
        run_git(&seed, &["branch", "cms-beta"]);

        run_git(dir.path(), &["clone", "--bare", "seed", "remote.git"]);
        let url = dir.path().join("remote.git").to_string_lossy().into_owned();

        Self { dir, url }
    }

    /// A fresh working directory inside the fixture.
    pub fn work_dir(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Engine configuration with rebuild-on-save off.
    pub fn config(&self, work_dir: &Path) -> RepositoryConfig {
        let mut config = RepositoryConfig::new(self.url.clone(), work_dir).unwrap();
        config.build.rebuild_on_save = false;
        config.network_timeout = Duration::from_secs(30);
        config
    }

    /// Open an engine with a recording builder.
    pub fn repository(&self, work_dir: &Path) -> (Repository, FakeBuilder) {
        let builder = FakeBuilder::new();
        let repo =
            Repository::with_builder(self.config(work_dir), Box::new(builder.clone())).unwrap();
        (repo, builder)
    }

    /// Commit a file to `cms-beta` from an independent clone, as another
    /// editor would.
    pub fn push_from_elsewhere(&self, path: &str, contents: &str, message: &str) {
        let other = TempDir::new().unwrap();
        let clone = other.path().join("clone");
        run_git(
            other.path(),
            &["clone", "--branch", "cms-beta", &self.url, "clone"],
        );
        configure_identity(&clone);
        let target = clone.join(path);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, contents).unwrap();
        run_git(&clone, &["add", "."]);
        run_git(&clone, &["commit", "-m", message]);
        run_git(&clone, &["push", "origin", "cms-beta"]);
    }

    /// Commit a symbolic link to `cms-beta` from an independent clone.
    #[cfg(unix)]
    pub fn push_symlink_from_elsewhere(&self, path: &str, target: &Path) {
        let other = TempDir::new().unwrap();
        let clone = other.path().join("clone");
        run_git(
            other.path(),
            &["clone", "--branch", "cms-beta", &self.url, "clone"],
        );
        configure_identity(&clone);
        let link = clone.join(path);
        fs::create_dir_all(link.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(target, &link).unwrap();
        run_git(&clone, &["add", "."]);
        run_git(&clone, &["commit", "-m", "Add link"]);
        run_git(&clone, &["push", "origin", "cms-beta"]);
    }

    /// File contents at the tip of `branch` on the remote.
    pub fn show(&self, branch: &str, path: &str) -> Option<String> {
        let output = Command::new("git")
            .args(["--git-dir", &self.url, "show", &format!("{}:{}", branch, path)])
            .output()
            .expect("git show failed");
        output
            .status
            .success()
            .then(|| String::from_utf8(output.stdout).unwrap())
    }

    /// Tip commit of `branch` on the remote.
    pub fn tip(&self, branch: &str) -> String {
        git_output(Path::new(&self.url), &["rev-parse", branch])
    }

    /// Number of commits on `branch` on the remote.
    pub fn commit_count(&self, branch: &str) -> usize {
        git_output(Path::new(&self.url), &["rev-list", "--count", branch])
            .parse()
            .unwrap()
    }
}

/// Site builder that records calls instead of running a generator.
#[derive(Clone, Default)]
pub struct FakeBuilder {
    inner: Arc<FakeBuilderState>,
}

#[derive(Default)]
struct FakeBuilderState {
    builds: AtomicUsize,
    check: Option<Box<dyn Fn(&Path) -> Result<(), String> + Send + Sync>>,
}

impl FakeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder that fails with the check's message when it returns `Err`.
    pub fn with_check(check: impl Fn(&Path) -> Result<(), String> + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(FakeBuilderState {
                builds: AtomicUsize::new(0),
                check: Some(Box::new(check)),
            }),
        }
    }

    pub fn builds(&self) -> usize {
        self.inner.builds.load(Ordering::SeqCst)
    }
}

impl SiteBuilder for FakeBuilder {
    fn build(&self, site_dir: &Path, output_dir: &Path) -> BuildResult {
        self.inner.builds.fetch_add(1, Ordering::SeqCst);
        let checked = match &self.inner.check {
            Some(check) => check(site_dir),
            None => Ok(()),
        };
        match checked {
            Ok(()) => {
                fs::create_dir_all(output_dir).unwrap();
                fs::write(output_dir.join("index.html"), "<html></html>").unwrap();
                BuildResult::new(BuildStatus::Succeeded, "built".into(), Duration::ZERO)
            }
            Err(message) => BuildResult::new(
                BuildStatus::Failed { code: Some(1) },
                message,
                Duration::ZERO,
            ),
        }
    }
}

/// Read a file in the working copy's checkout.
pub fn read_checkout(repo: &Repository, path: &str) -> String {
    let file = repo.working_copy().paths().checkout_dir().join(path);
    fs::read_to_string(file).unwrap()
}

/// Write a file in the working copy's checkout, bypassing the engine.
pub fn write_checkout(repo: &Repository, path: &str, contents: &str) {
    let file = repo.working_copy().paths().checkout_dir().join(path);
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, contents).unwrap();
}

/// `git status --porcelain` in the working copy's checkout.
pub fn checkout_status(repo: &Repository) -> String {
    git_output(
        &repo.working_copy().paths().checkout_dir(),
        &["status", "--porcelain"],
    )
}

pub fn configure_identity(dir: &Path) {
    run_git(dir, &["config", "user.email", "test@example.com"]);
    run_git(dir, &["config", "user.name", "Test User"]);
}

/// Run a git command in the given directory.
pub fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// Run a git command and return trimmed stdout.
pub fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}
