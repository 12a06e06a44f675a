//! `civic home`: headline counts and the latest reports.

use super::{Ctx, ISSUE_ROW_HEADER, issue_card, issue_row};
use crate::output::{pretty_kv, pretty_section, render_mode};
use civic_core::view::{self, HomeView};
use clap::Args;
use std::io::Write;

#[derive(Args, Debug)]
pub struct HomeArgs {}

pub fn run_home(_args: &HomeArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let home = view::home(store.issues());
    render_mode(ctx.output, &home, render_home_text, render_home_pretty)
}

fn render_home_pretty(home: &HomeView<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Your City, Your Voice")?;
    pretty_kv(w, "total", home.stats.total.to_string())?;
    pretty_kv(w, "resolved", home.stats.resolved.to_string())?;
    pretty_kv(w, "pending", home.stats.pending.to_string())?;
    pretty_kv(w, "in progress", home.stats.in_progress.to_string())?;
    writeln!(w)?;
    pretty_section(w, "Recent Issues")?;
    if home.recent.is_empty() {
        writeln!(w, "No issues reported yet. Run `civic report` to file one.")?;
    }
    for issue in &home.recent {
        issue_card(w, issue)?;
    }
    Ok(())
}

fn render_home_text(home: &HomeView<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "total={} resolved={} pending={} in_progress={}",
        home.stats.total, home.stats.resolved, home.stats.pending, home.stats.in_progress
    )?;
    writeln!(w, "{ISSUE_ROW_HEADER}")?;
    for issue in &home.recent {
        issue_row(w, issue)?;
    }
    Ok(())
}
