//! cli::commands::token
//!
//! Manage the stored Git access token.
//!
//! # Design
//!
//! - Tokens are stored via [`SecretStore`] under `git.token`
//! - Tokens are NEVER printed to stdout/stderr
//! - `PAGEWRIGHT_GIT_TOKEN` overrides the stored token; `status` says so
//!
//! # Example
//!
//! ```bash
//! # Prompt for the token (input is hidden)
//! pw token set
//!
//! # Check which token will be used
//! pw token status
//!
//! # Remove the stored token
//! pw token clear
//! ```

use std::io::{self, IsTerminal, Write};

use anyhow::{bail, Context as _, Result};
use serde_json::json;

use super::Context;
use crate::secrets::{self, FileSecretStore, SecretStore, TOKEN_ENV, TOKEN_KEY};

/// Store a token, prompting with hidden input when none is given.
pub fn set(ctx: &Context, token: Option<&str>) -> Result<bool> {
    let store = FileSecretStore::new().context("Failed to locate secret store")?;
    let value = match token {
        Some(t) => t.trim().to_string(),
        None => prompt_token()?,
    };
    validate_token(&value)?;

    store
        .set(TOKEN_KEY, &value)
        .context("Failed to store token")?;

    if std::env::var_os(TOKEN_ENV).is_some() {
        ctx.out
            .warn(format!("{} is set and takes precedence over the stored token", TOKEN_ENV));
    }
    ctx.out.report(
        &json!({ "stored": true, "path": store.path() }),
        format!("Token stored in {}", store.path().display()),
    )?;
    Ok(true)
}

/// Report whether a token is available, without revealing it.
pub fn status(ctx: &Context) -> Result<bool> {
    let config = ctx.load_config()?;
    let store = FileSecretStore::new().context("Failed to locate secret store")?;
    let resolved = secrets::resolve_credential(
        config.token_username(),
        &|key| std::env::var(key).ok(),
        &store,
    )
    .context("Failed to read Git token")?;

    let source = resolved.as_ref().map(|(_, source)| *source);
    let text = match source {
        Some(secrets::TokenSource::Environment) => format!("Token set via {}.", TOKEN_ENV),
        Some(secrets::TokenSource::Store) => {
            format!("Token stored in {}.", store.path().display())
        }
        None => "No token configured. Run 'pw token set'.".to_string(),
    };
    ctx.out.report(
        &json!({
            "configured": source.is_some(),
            "source": source,
            "username": config.token_username(),
        }),
        text,
    )?;
    Ok(true)
}

/// Remove the stored token.
pub fn clear(ctx: &Context) -> Result<bool> {
    let store = FileSecretStore::new().context("Failed to locate secret store")?;
    store
        .delete(TOKEN_KEY)
        .context("Failed to remove stored token")?;
    ctx.out
        .report(&json!({ "cleared": true }), "Stored token removed.")?;
    Ok(true)
}

fn prompt_token() -> Result<String> {
    if !io::stdin().is_terminal() {
        bail!("Token required. Use --token <TOKEN> or run in a terminal.");
    }
    eprint!("Git access token: ");
    io::stderr().flush()?;
    let token = rpassword::read_password().context("Failed to read token")?;
    Ok(token.trim().to_string())
}

/// Basic format checks; the token is not verified against the remote.
fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        bail!("Token cannot be empty.");
    }
    if token.chars().any(char::is_whitespace) {
        bail!("Token should not contain whitespace.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_validation() {
        assert!(validate_token("ghp_abcdef123456").is_ok());
        assert!(validate_token("").is_err());
        assert!(validate_token("two words").is_err());
        assert!(validate_token("line\nbreak").is_err());
    }
}
