#![forbid(unsafe_code)]

mod cmd;
mod output;
mod session;

use civic_core::{ErrorCode, config};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "civic: report and track municipal issues",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output (same as `--format json`).
    #[arg(long, global = true)]
    json: bool,

    /// Output format: pretty, text or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Data directory (default: `$CIVIC_DIR`, then `./.civic`).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Act as this user for one command (skips the stored session).
    #[arg(long = "as", global = true, value_name = "USER_ID")]
    as_user: Option<String>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Explicit format from flags; `--format` wins over `--json`.
    fn format_flag(&self) -> Option<&'static str> {
        self.format
            .map(OutputMode::as_str)
            .or_else(|| self.json.then_some("json"))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "Show headline counts and recent issues",
        after_help = "EXAMPLES:\n    civic home\n\n    # Emit machine-readable output\n    civic home --json"
    )]
    Home(cmd::home::HomeArgs),

    #[command(
        next_help_heading = "Report",
        about = "Report a new issue",
        long_about = "Report a new issue. Location comes from --lat/--lng, then from [location] in config.toml.",
        after_help = "EXAMPLES:\n    # Report a pothole at explicit coordinates\n    civic report --title \"Pothole\" --description \"Deep hole near bus stop\" \\\n        --category road-maintenance --lat 23.02 --lng 72.57\n\n    # Append a voice transcript to the description\n    civic report --title \"Leak\" --category water-leaks --dictate speech.txt"
    )]
    Report(cmd::report::ReportArgs),

    #[command(
        next_help_heading = "Read",
        about = "List map markers for filtered issues",
        after_help = "EXAMPLES:\n    civic map --status submitted\n\n    civic map --category street-lighting --json"
    )]
    Map(cmd::map::MapArgs),

    #[command(
        next_help_heading = "Read",
        about = "Filtered issue list with counts",
        after_help = "EXAMPLES:\n    # Your own reports\n    civic dashboard --scope mine\n\n    # High priority issues mentioning water\n    civic dashboard --priority high --search water"
    )]
    Dashboard(cmd::dashboard::DashboardArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one issue",
        after_help = "EXAMPLES:\n    civic show 1\n\n    civic show 1 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Engage",
        about = "Upvote an issue",
        after_help = "EXAMPLES:\n    civic upvote 3"
    )]
    Upvote(cmd::upvote::UpvoteArgs),

    #[command(
        next_help_heading = "Municipal",
        about = "Set an issue's status",
        long_about = "Set an issue's status. Only the next lifecycle stage is accepted; staff or admin only.",
        after_help = "EXAMPLES:\n    civic --as user2 status 3 assigned"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Municipal",
        about = "Move an issue to its next stage",
        after_help = "EXAMPLES:\n    civic role staff\n    civic advance 3"
    )]
    Advance(cmd::advance::AdvanceArgs),

    #[command(
        next_help_heading = "Municipal",
        about = "Department performance and priority report (admin)",
        after_help = "EXAMPLES:\n    civic --as admin1 analytics"
    )]
    Analytics(cmd::analytics::AnalyticsArgs),

    #[command(next_help_heading = "Session", about = "Show the acting user")]
    Whoami(cmd::whoami::WhoamiArgs),

    #[command(
        next_help_heading = "Session",
        about = "Sign in as a directory user",
        after_help = "EXAMPLES:\n    civic login user2"
    )]
    Login(cmd::login::LoginArgs),

    #[command(
        next_help_heading = "Session",
        about = "Switch the current user's role",
        after_help = "EXAMPLES:\n    civic role admin"
    )]
    Role(cmd::role::RoleArgs),

    #[command(
        next_help_heading = "Session",
        about = "Show or set the interface language",
        after_help = "EXAMPLES:\n    civic lang hi"
    )]
    Lang(cmd::lang::LangArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    civic completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CIVIC_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "civic=debug,info"
        } else {
            "civic=info,warn"
        })
    });

    let format = env::var("CIVIC_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Structured form of a rejected flag value. Other clap outcomes, help and
/// version included, keep clap's own rendering.
fn parse_error(err: &clap::Error) -> Option<CliError> {
    if !matches!(err.kind(), ErrorKind::InvalidValue | ErrorKind::ValueValidation) {
        return None;
    }
    let rendered = err.render().to_string();
    let message = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string();
    let code = ErrorCode::InvalidEnumValue;
    Some(CliError::with_details(
        message,
        code.hint().unwrap_or_default(),
        code.code(),
    ))
}

/// JSON output requested by raw args or `FORMAT`, before clap has parsed.
/// `--format` wins over `--json`.
fn json_requested(args: &[String], format_env: Option<&str>) -> bool {
    let mut json_flag = false;
    let mut format = None;
    let mut iter = args.iter().map(String::as_str);
    while let Some(arg) = iter.next() {
        match arg {
            "--" => break,
            "--json" => json_flag = true,
            "--format" => format = iter.next(),
            other => {
                if let Some(value) = other.strip_prefix("--format=") {
                    format = Some(value);
                }
            }
        }
    }
    match format {
        Some(value) => value == "json",
        None => json_flag || format_env.is_some_and(|f| f.eq_ignore_ascii_case("json")),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let args: Vec<String> = env::args().collect();
            let format_env = env::var("FORMAT").ok();
            match parse_error(&err) {
                Some(cli_err) if json_requested(&args, format_env.as_deref()) => {
                    render_error(OutputMode::Json, &cli_err)?;
                    std::process::exit(err.exit_code());
                }
                _ => err.exit(),
            }
        }
    };
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let fallback_output = OutputMode::from_resolved(cli.format_flag().unwrap_or("text"));
    let config = match config::resolve_config(cli.data_dir.as_deref(), cli.format_flag()) {
        Ok(config) => config,
        Err(e) => {
            render_error(
                fallback_output,
                &CliError::with_details(
                    format!("{e:#}"),
                    ErrorCode::ConfigParseError.hint().unwrap_or_default(),
                    ErrorCode::ConfigParseError.code(),
                ),
            )?;
            return Err(e);
        }
    };

    let ctx = cmd::Ctx {
        output: OutputMode::from_resolved(&config.resolved_output),
        quiet: cli.quiet,
        config,
        as_user: cli.as_user.clone(),
    };

    match cli.command {
        Commands::Home(ref args) => cmd::home::run_home(args, &ctx),
        Commands::Report(ref args) => cmd::report::run_report(args, &ctx),
        Commands::Map(ref args) => cmd::map::run_map(args, &ctx),
        Commands::Dashboard(ref args) => cmd::dashboard::run_dashboard(args, &ctx),
        Commands::Show(ref args) => cmd::show::run_show(args, &ctx),
        Commands::Upvote(ref args) => cmd::upvote::run_upvote(args, &ctx),
        Commands::Status(ref args) => cmd::status::run_status(args, &ctx),
        Commands::Advance(ref args) => cmd::advance::run_advance(args, &ctx),
        Commands::Analytics(ref args) => cmd::analytics::run_analytics(args, &ctx),
        Commands::Whoami(ref args) => cmd::whoami::run_whoami(args, &ctx),
        Commands::Login(ref args) => cmd::login::run_login(args, &ctx),
        Commands::Role(ref args) => cmd::role::run_role(args, &ctx),
        Commands::Lang(ref args) => cmd::lang::run_lang(args, &ctx),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command, &mut std::io::stdout())
        }
    }
}
