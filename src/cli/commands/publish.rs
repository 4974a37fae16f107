//! publish command - Commit and push pending content changes

use anyhow::Result;

use super::Context;
use crate::ui::output::format_list;

/// Publish pending changes to the publish branch.
pub fn publish(ctx: &Context) -> Result<bool> {
    let repo = ctx.repository()?;
    let outcome = repo.publish()?;

    let text = if outcome.changed_paths.is_empty() {
        outcome.message.clone()
    } else {
        format!(
            "{}\n{}",
            outcome.message,
            format_list(&outcome.changed_paths, "  ")
        )
    };
    ctx.out.report(&outcome, text)?;
    Ok(outcome.success)
}
