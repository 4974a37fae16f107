//! sync command - Clone or fast-forward the working copy

use anyhow::Result;

use super::Context;
use crate::workspace::{SyncAction, SyncReport};

/// Bring the working copy up to date with the publish branch.
pub fn sync(ctx: &Context) -> Result<bool> {
    let repo = ctx.repository()?;
    let report = repo.sync()?;
    ctx.out.report(&report, describe(&report))?;
    Ok(true)
}

fn describe(report: &SyncReport) -> String {
    let head = report.head.short(7);
    let mut text = match &report.action {
        SyncAction::Cloned => format!("Cloned {} at {}", report.branch, head),
        SyncAction::Updated { from, to } => {
            format!("Updated {} {}..{}", report.branch, from.short(7), to.short(7))
        }
        SyncAction::UpToDate => format!("{} is up to date at {}", report.branch, head),
        SyncAction::Ahead => format!(
            "{} has local commits not on the remote ({}); run 'pw publish'",
            report.branch, head
        ),
    };
    if report.pending_changes > 0 {
        text.push_str(&format!(
            "\n{} unpublished change(s) in the working copy",
            report.pending_changes
        ));
    }
    text
}
