use anyhow::Result;
use clap::Args;
use clap_complete::{Shell, generate};
use std::io::Write;

/// Arguments for `tix completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script generation.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Generate shell completion script to stdout.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn run_completions(shell: Shell, command: &mut clap::Command) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_completions(shell, command, &mut out)?;
    Ok(())
}

fn write_completions(
    shell: Shell,
    command: &mut clap::Command,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    generate(shell, command, "tix", w);
    w.flush()
}
