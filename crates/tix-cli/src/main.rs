#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{OutputMode, cli_error_for, render_error, resolve_output_mode};
use std::env;
use std::process::ExitCode;
use tix_core::config::{self, EffectiveConfig};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tix: group, sort, and browse a ticket board",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (defaults to pretty on a terminal, text when piped).
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "Show the ticket board",
        long_about = "Fetch tickets once and show them grouped and sorted. The grouping \
                      choice is remembered between runs; the sort order is not.",
        after_help = "EXAMPLES:\n    # Board with the remembered grouping\n    tix board\n\n    # Group by assignee and sort by title\n    tix board --group user --sort title\n\n    # Read tickets from a local file\n    tix board --source fixtures/board.json\n\n    # Emit machine-readable output\n    tix board --format json"
    )]
    Board(cmd::board::BoardArgs),

    #[command(
        next_help_heading = "Preferences",
        about = "Show or set the remembered grouping",
        long_about = "Show the grouping dimension the board opens with, or set it to \
                      status, user, or priority.",
        after_help = "EXAMPLES:\n    # Show the current grouping\n    tix group\n\n    # Open the board grouped by priority from now on\n    tix group priority"
    )]
    Group(cmd::group::GroupArgs),

    #[command(
        next_help_heading = "Shell",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    tix completions bash\n\n    # Generate zsh completions\n    tix completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

impl Cli {
    fn source_override(&self) -> Option<&str> {
        match &self.command {
            Commands::Board(args) => args.source.as_deref(),
            Commands::Group(_) | Commands::Completions(_) => None,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TIX_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "tix=debug,info"
        } else {
            "tix=info,warn"
        })
    });

    let format = env::var("TIX_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

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

/// Run a command that needs the effective configuration. A config that
/// failed to resolve is reported in the flag/env output mode.
fn run_configured(
    cli: &Cli,
    resolved: anyhow::Result<EffectiveConfig>,
    run: impl FnOnce(&EffectiveConfig, OutputMode) -> anyhow::Result<()>,
) -> ExitCode {
    let config = match resolved {
        Ok(config) => config,
        Err(err) => return fail(resolve_output_mode(cli.format, cli.json, None), &err),
    };
    let output = resolve_output_mode(cli.format, cli.json, config.output.as_deref());
    debug!(
        source = %config.source,
        prefs = ?config.prefs_path,
        output = ?output,
        "configuration resolved"
    );
    finish(output, run(&config, output))
}

fn finish(output: OutputMode, result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(output, &err),
    }
}

fn fail(output: OutputMode, err: &anyhow::Error) -> ExitCode {
    debug!(error = %format!("{err:#}"), "command failed");
    if render_error(output, &cli_error_for(err)).is_err() {
        eprintln!("error: {err:#}");
    }
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match &cli.command {
        Commands::Board(args) => run_configured(
            &cli,
            config::resolve_config(cli.source_override()),
            |config, output| cmd::board::run_board(args, config, output),
        ),
        // Only preferences are touched; a broken config.toml is not fatal.
        Commands::Group(args) => run_configured(
            &cli,
            Ok(config::resolve_config_lenient(cli.source_override())),
            |config, output| cmd::group::run_group(args, config, output),
        ),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            finish(
                resolve_output_mode(cli.format, cli.json, None),
                cmd::completions::run_completions(args.shell, &mut command),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tix_core::model::{GroupingDimension, SortCriterion};

    #[test]
    fn board_flags_parse() {
        let cli = Cli::parse_from([
            "tix", "board", "--group", "user", "-s", "title", "--source", "b.json",
        ]);
        let Commands::Board(args) = &cli.command else {
            panic!("expected board");
        };
        assert_eq!(args.group, Some(GroupingDimension::ByUser));
        assert_eq!(args.sort, Some(SortCriterion::ByTitleAsc));
        assert_eq!(cli.source_override(), Some("b.json"));
    }

    #[test]
    fn board_rejects_unknown_grouping() {
        assert!(Cli::try_parse_from(["tix", "board", "--group", "team"]).is_err());
    }

    #[test]
    fn format_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["tix", "board", "--format", "json"]);
        assert_eq!(cli.format, Some(OutputMode::Json));
    }

    #[test]
    fn hidden_json_flag_is_global() {
        let cli = Cli::parse_from(["tix", "group", "--json"]);
        assert!(cli.json);
        assert!(cli.format.is_none());
    }

    #[test]
    fn group_dimension_is_optional() {
        let cli = Cli::parse_from(["tix", "group"]);
        assert!(matches!(&cli.command, Commands::Group(args) if args.dimension.is_none()));
        assert!(cli.source_override().is_none());
    }

    #[test]
    fn verbose_flag_parses_anywhere() {
        assert!(Cli::parse_from(["tix", "-v", "board"]).verbose);
        assert!(Cli::parse_from(["tix", "board", "--verbose"]).verbose);
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
