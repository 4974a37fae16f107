//! pw - command-line entry point for pagewright

use std::process::ExitCode;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use pagewright::cli::{self, Cli};

const DEFAULT_FILTER: &str = "pagewright=info,git2=warn";

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(&cli);
    cli::run(cli)
}

/// Logs go to stderr so `--json` output stays parseable.
///
/// `--debug` and `--quiet` override `RUST_LOG`.
fn init_tracing(cli: &Cli) {
    let filter = if cli.quiet {
        EnvFilter::new("pagewright=warn,git2=error")
    } else if cli.debug {
        EnvFilter::new("pagewright=debug,git2=warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
