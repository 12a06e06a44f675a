//! `civic advance`: move an issue one stage forward.

use super::Ctx;
use super::status::render_status_change;
use crate::output::fail;
use clap::Args;

#[derive(Args, Debug)]
pub struct AdvanceArgs {
    /// Issue ID.
    pub id: String,
}

pub fn run_advance(args: &AdvanceArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let session = ctx.session(&store)?;
    let applied = store
        .advance_status(&args.id, &session)
        .map_err(|e| fail(ctx.output, &e))?;
    render_status_change(ctx, &applied, &session)
}
