//! `civic show`: full details of a single issue.

use super::{Ctx, local_datetime};
use crate::output::{fail, pretty_kv, pretty_rule, pretty_section, render_mode};
use civic_core::CivicError;
use civic_core::model::Issue;
use clap::Args;
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Issue ID to display.
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ShowIssue<'a> {
    #[serde(flatten)]
    pub issue: &'a Issue,
    pub has_upvoted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action: Option<&'static str>,
}

pub fn run_show(args: &ShowArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let session = ctx.session(&store)?;
    let Some(issue) = store.issue(&args.id) else {
        return Err(fail(ctx.output, &CivicError::IssueNotFound(args.id.clone())));
    };

    let next_action = if session.can_change_status() {
        issue.status.action_label()
    } else {
        None
    };
    let show = ShowIssue {
        issue,
        has_upvoted: store.has_voted(session.user_id(), &issue.id),
        next_action,
    };
    render_mode(ctx.output, &show, render_show_text, render_show_pretty)
}

fn render_show_pretty(show: &ShowIssue<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    let issue = show.issue;
    pretty_section(w, &format!("Issue {}", issue.id))?;
    writeln!(w, "{}", issue.title)?;
    pretty_rule(w)?;
    pretty_kv(w, "status", issue.status.as_str())?;
    pretty_kv(w, "priority", issue.priority.as_str())?;
    pretty_kv(w, "category", issue.category.as_str())?;
    pretty_kv(w, "location", &issue.location.address)?;
    pretty_kv(
        w,
        "coordinates",
        format!("{:.4}, {:.4}", issue.location.lat, issue.location.lng),
    )?;
    let upvotes = if show.has_upvoted {
        format!("{} (you upvoted)", issue.upvotes)
    } else {
        issue.upvotes.to_string()
    };
    pretty_kv(w, "upvotes", upvotes)?;
    pretty_kv(
        w,
        "reporter",
        if issue.is_anonymous { "anonymous" } else { "citizen" },
    )?;
    if let Some(ref dept) = issue.assigned_department {
        pretty_kv(w, "department", dept)?;
    }
    if let Some(ref staff) = issue.assigned_staff {
        pretty_kv(w, "assigned to", staff)?;
    }
    pretty_kv(w, "reported", local_datetime(issue.created_at))?;
    pretty_kv(w, "updated", local_datetime(issue.updated_at))?;
    if !issue.photos.is_empty() {
        pretty_kv(w, "photos", issue.photos.len().to_string())?;
    }
    if let Some(action) = show.next_action {
        pretty_kv(w, "next step", format!("{action} (`civic advance {}`)", issue.id))?;
    }

    writeln!(w)?;
    pretty_section(w, "Description")?;
    for line in issue.description.lines() {
        writeln!(w, "{line}")?;
    }

    if !issue.public_comments.is_empty() {
        writeln!(w)?;
        pretty_section(w, &format!("Updates ({})", issue.public_comments.len()))?;
        for (i, comment) in issue.public_comments.iter().enumerate() {
            if i > 0 {
                writeln!(w)?;
            }
            let badge = if comment.is_official { " [official]" } else { "" };
            writeln!(
                w,
                "[{}] {}{}: {}",
                local_datetime(comment.created_at),
                comment.author,
                badge,
                comment.text
            )?;
        }
    }
    Ok(())
}

fn render_show_text(show: &ShowIssue<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    let issue = show.issue;
    writeln!(w, "Issue {}", issue.id)?;
    writeln!(w, "{:-<72}", "")?;
    writeln!(w, "{}", issue.title)?;
    writeln!(w, "status:      {}", issue.status)?;
    writeln!(w, "priority:    {}", issue.priority)?;
    writeln!(w, "category:    {}", issue.category)?;
    writeln!(w, "location:    {}", issue.location.address)?;
    writeln!(w, "upvotes:     {}", issue.upvotes)?;
    writeln!(w, "upvoted:     {}", show.has_upvoted)?;
    writeln!(w, "anonymous:   {}", issue.is_anonymous)?;
    if let Some(ref dept) = issue.assigned_department {
        writeln!(w, "department:  {dept}")?;
    }
    if let Some(ref staff) = issue.assigned_staff {
        writeln!(w, "staff:       {staff}")?;
    }
    writeln!(w, "created_at:  {}", issue.created_at.to_rfc3339())?;
    writeln!(w, "updated_at:  {}", issue.updated_at.to_rfc3339())?;
    writeln!(w)?;
    writeln!(w, "{}", issue.description)?;
    for comment in &issue.public_comments {
        writeln!(
            w,
            "comment\t{}\t{}\t{}",
            comment.created_at.to_rfc3339(),
            comment.author,
            comment.text
        )?;
    }
    Ok(())
}
