pub mod advance;
pub mod analytics;
pub mod completions;
pub mod dashboard;
pub mod home;
pub mod lang;
pub mod login;
pub mod map;
pub mod report;
pub mod role;
pub mod show;
pub mod status;
pub mod upvote;
pub mod whoami;

use crate::output::{CliError, OutputMode, render_error, render_notices};
use crate::session;
use chrono::{DateTime, Local, Utc};
use civic_core::IssueStore;
use civic_core::config::EffectiveConfig;
use civic_core::model::{Category, Issue, Priority, Session, Status};
use civic_core::storage::FileKvStore;
use civic_core::store::Notice;
use civic_core::view::IssueFilter;
use clap::Args;
use std::io::{self, Write};

/// Everything a command needs besides its own arguments.
pub struct Ctx {
    pub output: OutputMode,
    pub quiet: bool,
    pub config: EffectiveConfig,
    pub as_user: Option<String>,
}

impl Ctx {
    /// Open the data directory, seeding it on first use.
    ///
    /// # Errors
    ///
    /// The data directory cannot be created.
    pub fn open_store(&self) -> anyhow::Result<IssueStore<FileKvStore>> {
        let backend = match FileKvStore::open(&self.config.data_dir) {
            Ok(backend) => backend,
            Err(e) => {
                render_error(
                    self.output,
                    &CliError::with_details(
                        e.to_string(),
                        "Pass --data-dir or set CIVIC_DIR to a writable directory.",
                        civic_core::ErrorCode::StorageWriteFailed.code(),
                    ),
                )?;
                anyhow::bail!("{e}");
            }
        };
        tracing::debug!(dir = %self.config.data_dir.display(), "opened data directory");
        Ok(IssueStore::initialize(backend))
    }

    /// The session this invocation acts under.
    ///
    /// # Errors
    ///
    /// `--as` or `CIVIC_USER` names an unknown user.
    pub fn session(&self, store: &IssueStore<FileKvStore>) -> anyhow::Result<Session> {
        match session::resolve_session(self.as_user.as_deref(), store.session()) {
            Ok(session) => Ok(session),
            Err(e) => {
                render_error(
                    self.output,
                    &CliError::with_details(
                        &e.message,
                        format!("Known users: {}", session::known_user_ids()),
                        e.code,
                    ),
                )?;
                anyhow::bail!("{}", e.message);
            }
        }
    }

    /// Print mutation notices, honouring `--quiet` and simulated delays.
    pub fn notices(&self, notices: &[Notice]) -> anyhow::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let notifications = &self.config.project.notifications;
        render_notices(self.output, notices, |n| notifications.wait_for(n.delay))?;
        Ok(())
    }
}

/// List predicates shared by `dashboard` and `map`.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Only this category (slug or display name).
    #[arg(short, long)]
    pub category: Option<Category>,

    /// Only this status.
    #[arg(short, long)]
    pub status: Option<Status>,

    /// Only this priority.
    #[arg(short, long)]
    pub priority: Option<Priority>,

    /// Case-insensitive text search over title and description.
    #[arg(long)]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> IssueFilter {
        IssueFilter {
            category: self.category,
            status: self.status,
            priority: self.priority,
            search: self.search.clone(),
        }
    }
}

pub fn local_datetime(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn local_date(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// One tab-separated row per issue for text output.
pub fn issue_row(w: &mut dyn Write, issue: &Issue) -> io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t{}\t{}\t{}",
        issue.id,
        issue.status,
        issue.priority,
        issue.category.slug(),
        issue.upvotes,
        issue.title
    )
}

/// Two-line summary card for pretty output.
pub fn issue_card(w: &mut dyn Write, issue: &Issue) -> io::Result<()> {
    writeln!(
        w,
        "[{}] {}  ({} · {} priority · ▲{})",
        issue.status, issue.title, issue.category, issue.priority, issue.upvotes
    )?;
    let reporter = if issue.is_anonymous { "anonymous" } else { "citizen" };
    writeln!(
        w,
        "    {}  {}  reported {} by {}",
        issue.id,
        issue.location.address,
        local_date(issue.created_at),
        reporter
    )
}

/// Header line for [`issue_row`] output.
pub const ISSUE_ROW_HEADER: &str = "id\tstatus\tpriority\tcategory\tupvotes\ttitle";
