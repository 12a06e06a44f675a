//! `civic analytics`: admin performance report.

use super::Ctx;
use crate::output::{fail, pretty_kv, pretty_section, render_mode};
use civic_core::CivicError;
use civic_core::seed;
use civic_core::view::{self, AnalyticsView};
use clap::Args;
use std::io::Write;

#[derive(Args, Debug)]
pub struct AnalyticsArgs {}

pub fn run_analytics(_args: &AnalyticsArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let session = ctx.session(&store)?;
    if !session.can_view_analytics() {
        return Err(fail(
            ctx.output,
            &CivicError::PermissionDenied {
                action: "viewing analytics",
            },
        ));
    }

    let departments = seed::departments();
    let report = view::analytics(store.issues(), &departments, seed::AVG_RESPONSE_DAYS);
    render_mode(ctx.output, &report, render_analytics_text, render_analytics_pretty)
}

fn render_analytics_pretty(r: &AnalyticsView<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Analytics Dashboard")?;
    pretty_kv(w, "total", r.stats.total.to_string())?;
    pretty_kv(w, "resolution", format!("{:.0}%", r.resolution_rate))?;
    pretty_kv(w, "avg response", format!("{} days", r.avg_response_days))?;
    pretty_kv(w, "high priority", r.stats.high_priority.to_string())?;

    writeln!(w)?;
    pretty_section(w, "Issues by Category")?;
    for (category, count) in &r.stats.by_category {
        writeln!(w, "{:<24} {count}", category.as_str())?;
    }

    writeln!(w)?;
    pretty_section(w, "Status Distribution")?;
    for (status, count) in &r.stats.by_status {
        writeln!(w, "{:<24} {count}", status.as_str())?;
    }

    writeln!(w)?;
    pretty_section(w, "Department Performance")?;
    for d in &r.departments {
        writeln!(
            w,
            "{:<24} {:>4}/{:<4} {:>5.1}%  {:>4.1}d  {}",
            d.name, d.resolved_issues, d.total_issues, d.resolution_rate, d.avg_response_time, d.rating
        )?;
    }

    writeln!(w)?;
    pretty_section(w, "Assigned Now")?;
    for (dept, count) in &r.assigned_by_department {
        writeln!(w, "{dept:<24} {count}")?;
    }
    if r.unassigned > 0 {
        writeln!(w, "{:<24} {}", "(unassigned)", r.unassigned)?;
    }

    writeln!(w)?;
    pretty_section(w, "High Priority Issues")?;
    if r.urgent.is_empty() {
        writeln!(w, "None outstanding.")?;
    }
    for issue in &r.urgent {
        writeln!(w, "{}  {}  [{}]  {}", issue.id, issue.title, issue.status, issue.location.address)?;
    }
    Ok(())
}

fn render_analytics_text(r: &AnalyticsView<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "total={} resolved={} resolution_rate={:.1} avg_response_days={}",
        r.stats.total, r.stats.resolved, r.resolution_rate, r.avg_response_days
    )?;
    for d in &r.departments {
        writeln!(
            w,
            "department\t{}\t{}\t{}\t{:.1}\t{}",
            d.id, d.resolved_issues, d.total_issues, d.resolution_rate, d.rating
        )?;
    }
    for issue in &r.urgent {
        writeln!(w, "urgent\t{}\t{}\t{}", issue.id, issue.status, issue.title)?;
    }
    Ok(())
}
