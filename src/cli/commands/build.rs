//! build commands - build and clear-cache

use anyhow::Result;

use super::Context;
use crate::engine::BuildOutcome;
use crate::ui::output::format_list;

/// Build the site from the current working copy.
pub fn build(ctx: &Context) -> Result<bool> {
    let repo = ctx.repository()?;
    let outcome = repo.trigger_build()?;
    ctx.out.report(&outcome, describe(&outcome))?;
    Ok(outcome.success)
}

/// Re-clone the working copy and rebuild.
pub fn clear_cache(ctx: &Context) -> Result<bool> {
    let repo = ctx.repository()?;
    let outcome = repo.clear_cache()?;
    let text = format!("{}\n{}", outcome.message, describe(&outcome.build));
    ctx.out.report(&outcome, text)?;
    Ok(outcome.success)
}

fn describe(outcome: &BuildOutcome) -> String {
    if outcome.diagnostics.is_empty() {
        outcome.message.clone()
    } else {
        format!(
            "{}\n{}",
            outcome.message,
            format_list(&outcome.diagnostics, "  ")
        )
    }
}
