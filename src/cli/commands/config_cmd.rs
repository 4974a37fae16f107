//! config command - Show or create the configuration file

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use serde_json::json;

use super::Context;
use crate::core::config::schema::RepositorySection;
use crate::core::config::{Config, ConfigFile};

/// Show the effective configuration, defaults included.
pub fn show(ctx: &Context) -> Result<bool> {
    let config = ctx.load_config()?;
    let build = config.build_settings();

    let effective = json!({
        "loaded_from": config.loaded_from(),
        "repository": {
            "url": config.remote_url(),
            "branch": config.branch(),
            "production_branch": config.production_branch(),
            "username": config.token_username(),
            "working_dir": config.working_dir(),
            "content_dir": config.content_dir(),
        },
        "access": { "allowed_domains": config.allowed_domains() },
        "lock": { "policy": format!("{:?}", config.lock_policy()) },
        "network": { "timeout_secs": config.network_timeout().as_secs() },
        "build": {
            "command": build.command,
            "args": build.args,
            "timeout_secs": build.timeout.as_secs(),
            "rebuild_on_save": build.rebuild_on_save,
        },
    });

    let mut text = match config.loaded_from() {
        Some(path) => format!("# loaded from {}\n", path.display()),
        None => "# no config file found; defaults and environment only\n".to_string(),
    };
    text.push_str(&format!(
        "repository.url = {}\n",
        config.remote_url().unwrap_or("(not set)")
    ));
    text.push_str(&format!("repository.branch = {}\n", config.branch()));
    text.push_str(&format!(
        "repository.production_branch = {}\n",
        config.production_branch()
    ));
    text.push_str(&format!(
        "repository.working_dir = {}\n",
        config.working_dir().display()
    ));
    text.push_str(&format!("repository.content_dir = {}\n", config.content_dir()));
    text.push_str(&format!(
        "access.allowed_domains = [{}]\n",
        config.allowed_domains().join(", ")
    ));
    text.push_str(&format!("lock = {:?}\n", config.lock_policy()));
    text.push_str(&format!(
        "network.timeout_secs = {}\n",
        config.network_timeout().as_secs()
    ));
    text.push_str(&format!(
        "build = {} {} (timeout {}s, rebuild_on_save {})",
        build.command,
        build.args.join(" "),
        build.timeout.as_secs(),
        build.rebuild_on_save
    ));

    ctx.out.report(&effective, text)?;
    Ok(true)
}

/// Write a starter config file.
pub fn init(
    ctx: &Context,
    url: &str,
    branch: Option<&str>,
    path: Option<PathBuf>,
    force: bool,
) -> Result<bool> {
    let path = match path.or_else(|| ctx.config_path.clone()) {
        Some(p) => p,
        None => Config::default_config_path()?,
    };
    if path.exists() && !force {
        bail!(
            "Config file {} already exists. Use --force to overwrite.",
            path.display()
        );
    }

    let file = ConfigFile {
        repository: RepositorySection {
            url: Some(url.to_string()),
            branch: branch.map(str::to_string),
            ..Default::default()
        },
        ..Default::default()
    };
    Config::write_atomic(&path, &file)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    ctx.out.report(
        &json!({ "path": path, "written": true }),
        format!("Wrote {}", path.display()),
    )?;
    Ok(true)
}
