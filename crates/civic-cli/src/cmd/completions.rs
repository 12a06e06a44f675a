//! `civic completions`: shell completion scripts.

use clap::Args;
use clap_complete::{Shell, generate};
use std::io::Write;

pub const BIN_NAME: &str = "civic";

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script generation.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` to `out`.
pub fn run_completions(
    shell: Shell,
    command: &mut clap::Command,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    generate(shell, command, BIN_NAME, out);
    out.flush()?;
    Ok(())
}
