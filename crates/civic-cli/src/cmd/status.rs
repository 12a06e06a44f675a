//! `civic status`: move an issue to an explicit lifecycle stage.

use super::Ctx;
use crate::output::{fail, render_mode};
use civic_core::model::{Session, Status};
use civic_core::store::Applied;
use clap::Args;
use std::io::Write;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Issue ID.
    pub id: String,

    /// Target status; must be the stage right after the current one.
    pub status: Status,
}

pub fn run_status(args: &StatusArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let session = ctx.session(&store)?;
    let applied = store
        .change_status(&args.id, args.status, &session)
        .map_err(|e| fail(ctx.output, &e))?;
    render_status_change(ctx, &applied, &session)
}

/// Output shared by `status` and `advance`.
pub fn render_status_change(
    ctx: &Ctx,
    applied: &Applied,
    session: &Session,
) -> anyhow::Result<()> {
    render_mode(
        ctx.output,
        applied,
        |a: &Applied, w: &mut dyn Write| writeln!(w, "{}\t{}", a.issue.id, a.issue.status),
        |a: &Applied, w: &mut dyn Write| {
            writeln!(w, "{} is now {} ({})", a.issue.id, a.issue.status, session.name())?;
            if let Some(action) = a.issue.status.action_label() {
                writeln!(w, "  next: {action}")?;
            }
            Ok(())
        },
    )?;
    ctx.notices(&applied.notices)
}
