//! cli
//!
//! Command-line interface layer for pagewright.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and resolve credentials
//! - Delegate to [`crate::engine::Repository`] and render its outcome
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, builds a
//! [`commands::Context`], and dispatches. Commands never touch the working
//! copy directly; every state change flows through the engine.
//!
//! # Exit Status
//!
//! `0` on success, `1` when the operation failed or reported failure (a
//! failed build, an unresolved URL), `2` for usage errors (clap).

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::process::ExitCode;

use serde_json::json;

use crate::engine::EngineError;
use crate::ui::output::{self, Verbosity};
use crate::ui::Output;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`, after logging is
/// initialized from the same parsed arguments.
pub fn run(cli: Cli) -> ExitCode {
    let out = Output::new(Verbosity::from_flags(cli.quiet, cli.debug), cli.json);
    let ctx = commands::Context {
        config_path: cli.config.clone(),
        out,
    };

    match commands::dispatch(cli.command, &ctx) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            report_error(&err, &out);
            ExitCode::FAILURE
        }
    }
}

/// Render a failure. In JSON mode stdout still receives one document.
fn report_error(err: &anyhow::Error, out: &Output) {
    if out.json {
        let kind = err
            .downcast_ref::<EngineError>()
            .map(|e| e.kind().as_str())
            .unwrap_or("error");
        let body = json!({
            "success": false,
            "kind": kind,
            "message": format!("{:#}", err),
        });
        println!("{}", body);
    } else {
        output::error(format!("{:#}", err));
    }
}
