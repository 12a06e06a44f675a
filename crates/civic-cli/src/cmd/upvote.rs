//! `civic upvote`: endorse an issue once per user.

use super::Ctx;
use crate::output::{fail, render_mode};
use civic_core::store::Applied;
use clap::Args;
use std::io::Write;

#[derive(Args, Debug)]
pub struct UpvoteArgs {
    /// Issue ID to upvote.
    pub id: String,
}

pub fn run_upvote(args: &UpvoteArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let session = ctx.session(&store)?;
    let applied = store
        .upvote(&args.id, &session)
        .map_err(|e| fail(ctx.output, &e))?;
    render_mode(
        ctx.output,
        &applied,
        |a: &Applied, w: &mut dyn Write| writeln!(w, "{}\t{}", a.issue.id, a.issue.upvotes),
        |a: &Applied, w: &mut dyn Write| {
            writeln!(w, "▲ {} upvotes on \"{}\"", a.issue.upvotes, a.issue.title)
        },
    )?;
    ctx.notices(&applied.notices)
}
