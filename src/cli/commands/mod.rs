//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Calls the engine to execute the command
//! 3. Renders the outcome through [`Output`]
//!
//! Handlers return `Ok(false)` when the operation ran but reported failure
//! (a failed build), so the process exits non-zero without an error line.

mod build;
mod completion;
mod config_cmd;
mod content;
mod publish;
mod sync;
mod token;

pub use completion::completion;
pub use content::parse_field;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::args::{Command, ConfigAction, TokenAction};
use crate::core::config::{Config, RepositoryConfig};
use crate::engine::Repository;
use crate::secrets::{self, FileSecretStore};
use crate::ui::Output;

/// Per-invocation state shared by handlers.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit `--config` path
    pub config_path: Option<PathBuf>,
    pub out: Output,
}

impl Context {
    /// Load configuration, surfacing warnings.
    pub fn load_config(&self) -> Result<Config> {
        let loaded = Config::load(self.config_path.as_deref()).context("Failed to load config")?;
        for warning in &loaded.warnings {
            self.out.warn(&warning.message);
        }
        if let Some(path) = loaded.config.loaded_from() {
            self.out.debug(format!("config loaded from {}", path.display()));
        }
        Ok(loaded.config)
    }

    /// Resolve the engine configuration, including the credential.
    pub fn repository_config(&self) -> Result<RepositoryConfig> {
        let config = self.load_config()?;
        let store = FileSecretStore::new().context("Failed to locate secret store")?;
        let credential = secrets::resolve_credential(
            config.token_username(),
            &|key| std::env::var(key).ok(),
            &store,
        )
        .context("Failed to read Git token")?;

        match &credential {
            Some((_, source)) => self.out.debug(format!("using Git token from {:?}", source)),
            None => self.out.debug("no Git token configured; using default credentials"),
        }

        config
            .repository_config(credential.map(|(cred, _)| cred))
            .context("Invalid configuration")
    }

    /// Open the engine.
    pub fn repository(&self) -> Result<Repository> {
        Ok(Repository::open(self.repository_config()?)?)
    }
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<bool> {
    match command {
        Command::Sync => sync::sync(ctx),
        Command::Get { path } => content::get(ctx, &path),
        Command::Save { path, edit } => content::save(ctx, &path, &edit),
        Command::Create { path, edit } => content::create(ctx, &path, &edit),
        Command::Resolve { url } => content::resolve(ctx, &url),
        Command::Build => build::build(ctx),
        Command::ClearCache => build::clear_cache(ctx),
        Command::Publish => publish::publish(ctx),
        Command::Token { action } => match action {
            TokenAction::Set { token } => token::set(ctx, token.as_deref()),
            TokenAction::Status => token::status(ctx),
            TokenAction::Clear => token::clear(ctx),
        },
        Command::Config { action } => match action {
            ConfigAction::Show => config_cmd::show(ctx),
            ConfigAction::Init {
                url,
                branch,
                path,
                force,
            } => config_cmd::init(ctx, &url, branch.as_deref(), path, force),
        },
        Command::Completion { shell } => {
            completion(shell)?;
            Ok(true)
        }
    }
}
