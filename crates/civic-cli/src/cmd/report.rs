//! `civic report`: file a new issue.

use super::Ctx;
use crate::output::{CliError, fail, pretty_kv, render_mode, render_warning};
use civic_core::capture::{
    Coordinates, FixedLocation, LocationProvider, NoLocation, SpeechSession, TranscriptFile,
};
use civic_core::model::{Category, IssueDraft, Location, Priority};
use civic_core::store::Applied;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Short summary of the problem.
    #[arg(short, long)]
    pub title: String,

    /// Longer description. Dictated text is appended to it.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Category (slug like `road-maintenance` or display name).
    #[arg(short, long)]
    pub category: Category,

    /// Priority. Defaults to `[report] default_priority` in config.toml.
    #[arg(short, long)]
    pub priority: Option<Priority>,

    /// Latitude of the problem. Falls back to `[location]` in config.toml.
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of the problem.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Street address. Derived from the coordinates when omitted.
    #[arg(long)]
    pub address: Option<String>,

    /// Photo URL or data URL (repeatable).
    #[arg(long = "photo")]
    pub photos: Vec<String>,

    /// Hide the reporter from the public record.
    #[arg(long)]
    pub anonymous: bool,

    /// Read a voice transcript from FILE and append it to the description.
    #[arg(long, value_name = "FILE")]
    pub dictate: Option<PathBuf>,

    /// Route straight to a department id (e.g. `roads`).
    #[arg(long)]
    pub department: Option<String>,

    /// Name of the staff member handling it.
    #[arg(long)]
    pub staff: Option<String>,
}

pub fn run_report(args: &ReportArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let session = ctx.session(&store)?;

    let mut description = args.description.clone().unwrap_or_default();
    if let Some(ref path) = args.dictate {
        let mut speech = SpeechSession::new(TranscriptFile::new(path), store.language());
        if let Err(e) = speech.dictate(&mut description) {
            render_warning(ctx.output, &CliError::from(&e))?;
        }
    }

    let location = capture_location(args, ctx)?;

    let mut draft = IssueDraft::new(&args.title, description, args.category, location);
    draft.photos.clone_from(&args.photos);
    draft.priority = args
        .priority
        .unwrap_or(ctx.config.project.report.default_priority);
    draft.is_anonymous = args.anonymous;
    draft.assigned_department.clone_from(&args.department);
    draft.assigned_staff.clone_from(&args.staff);

    let applied = store
        .submit_issue(draft, &session)
        .map_err(|e| fail(ctx.output, &e))?;

    render_mode(ctx.output, &applied, render_report_text, render_report_pretty)?;
    ctx.notices(&applied.notices)
}

/// Coordinates from flags, then config, else none. A failure is a warning;
/// the draft then carries an unknown location and validation reports it.
fn capture_location(args: &ReportArgs, ctx: &Ctx) -> anyhow::Result<Location> {
    let configured = &ctx.config.project.location;
    let (provider, address): (Box<dyn LocationProvider>, Option<String>) =
        match (args.lat, args.lng) {
            (Some(lat), Some(lng)) => (
                Box::new(FixedLocation(Coordinates { lat, lng })),
                args.address.clone(),
            ),
            _ => match configured.coordinates() {
                Some(coords) => (
                    Box::new(FixedLocation(coords)),
                    args.address.clone().or_else(|| configured.address.clone()),
                ),
                None => (Box::new(NoLocation), args.address.clone()),
            },
        };

    match provider.current_location() {
        Ok(coords) => Ok(coords.into_location(address)),
        Err(e) => {
            render_warning(ctx.output, &CliError::from(&e))?;
            Ok(Location {
                address: address.unwrap_or_default(),
                ..Location::default()
            })
        }
    }
}

fn render_report_pretty(applied: &Applied, w: &mut dyn Write) -> std::io::Result<()> {
    let issue = &applied.issue;
    writeln!(w, "Reported issue {}", issue.id)?;
    pretty_kv(w, "title", &issue.title)?;
    pretty_kv(w, "category", issue.category.as_str())?;
    pretty_kv(w, "priority", issue.priority.as_str())?;
    pretty_kv(w, "location", &issue.location.address)?;
    Ok(())
}

fn render_report_text(applied: &Applied, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}", applied.issue.id)
}
