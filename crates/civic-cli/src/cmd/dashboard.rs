//! `civic dashboard`: filtered issue list with counts for the viewer's tab.

use super::{Ctx, FilterArgs, ISSUE_ROW_HEADER, issue_card, issue_row};
use crate::output::{CliError, pretty_kv, pretty_section, render_error, render_mode};
use civic_core::ErrorCode;
use civic_core::model::{Issue, Role};
use civic_core::view::{self, IssueFilter, IssueStats, ViewScope};
use clap::Args;
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// Tab: `all`, `mine` (citizens) or `municipal` (staff, admin).
    #[arg(long, default_value = "all")]
    pub scope: ViewScope,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Serialize)]
pub struct Dashboard<'a> {
    pub role: Role,
    pub scope: ViewScope,
    pub tabs: [ViewScope; 2],
    pub filter: IssueFilter,
    pub stats: IssueStats,
    pub issues: Vec<&'a Issue>,
}

pub fn run_dashboard(args: &DashboardArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let session = ctx.session(&store)?;
    let role = session.role();

    if !args.scope.is_available_for(role) {
        let tabs = ViewScope::available_for(role).map(ViewScope::as_str).join(", ");
        render_error(
            ctx.output,
            &CliError::with_details(
                format!("the {} tab is not available to {}", args.scope, role.label()),
                format!("Use one of: {tabs}"),
                ErrorCode::PermissionDenied.code(),
            ),
        )?;
        anyhow::bail!("scope {} not available for role {role}", args.scope);
    }

    let filter = args.filter.to_filter();
    let matched = view::filter(store.issues(), &filter);
    let issues = view::scope_by_viewer(&matched, args.scope, &session);
    let dashboard = Dashboard {
        role,
        scope: args.scope,
        tabs: ViewScope::available_for(role),
        filter,
        stats: view::aggregate(issues.iter().copied()),
        issues,
    };
    render_mode(ctx.output, &dashboard, render_dashboard_text, render_dashboard_pretty)
}

fn render_dashboard_pretty(d: &Dashboard<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    let title = match d.role {
        Role::Citizen => "Issue Dashboard",
        Role::Staff | Role::Admin => "Municipal Dashboard",
    };
    pretty_section(w, &format!("{title} ({})", d.scope))?;
    pretty_kv(w, "total", d.stats.total.to_string())?;
    pretty_kv(w, "pending", d.stats.pending.to_string())?;
    pretty_kv(w, "in progress", d.stats.in_progress.to_string())?;
    pretty_kv(w, "resolved", d.stats.resolved.to_string())?;
    pretty_kv(w, "high priority", d.stats.high_priority.to_string())?;
    writeln!(w)?;
    if d.issues.is_empty() {
        writeln!(w, "No issues match the current filters.")?;
        return Ok(());
    }
    pretty_section(w, &format!("Issues ({})", d.issues.len()))?;
    for issue in &d.issues {
        issue_card(w, issue)?;
    }
    Ok(())
}

fn render_dashboard_text(d: &Dashboard<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{ISSUE_ROW_HEADER}")?;
    for issue in &d.issues {
        issue_row(w, issue)?;
    }
    Ok(())
}
