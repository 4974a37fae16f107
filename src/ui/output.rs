//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Human text respects the quiet flag. With `--json` every command prints
//! exactly one JSON document on stdout (the serialized outcome) and nothing
//! else; warnings and debug lines go to stderr.

use std::fmt::Display;

use serde::Serialize;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags. `--quiet` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Where command results go.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub verbosity: Verbosity,
    pub json: bool,
}

impl Output {
    pub fn new(verbosity: Verbosity, json: bool) -> Self {
        Self { verbosity, json }
    }

    /// Print a command result: JSON when requested, else the human text.
    ///
    /// JSON is printed even in quiet mode.
    pub fn report<T: Serialize>(&self, value: &T, human: impl Display) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            self.print(human);
        }
        Ok(())
    }

    /// Print a message (suppressed in quiet and JSON modes).
    pub fn print(&self, message: impl Display) {
        if !self.json && self.verbosity != Verbosity::Quiet {
            println!("{}", message);
        }
    }

    /// Print a debug message (only in debug mode).
    pub fn debug(&self, message: impl Display) {
        if self.verbosity == Verbosity::Debug {
            eprintln!("[debug] {}", message);
        }
    }

    /// Print a warning message (respects quiet mode).
    pub fn warn(&self, message: impl Display) {
        if self.verbosity != Verbosity::Quiet {
            eprintln!("warning: {}", message);
        }
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Format a list of items, one per line.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_beats_debug() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn list_formatting() {
        let items = ["content/a.md", "content/b.md"];
        assert_eq!(
            format_list(&items, "  "),
            "  content/a.md\n  content/b.md"
        );
        assert_eq!(format_list::<&str>(&[], "- "), "");
    }
}
