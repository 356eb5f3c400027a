#![forbid(unsafe_code)]

mod cmd;
mod input;
mod output;
mod registry;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Exit status for malformed input, unreadable files and bad arguments.
const EXIT_INPUT_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "blint",
    author,
    version,
    about = "branchlint: structural checks for branching dialogue graphs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (defaults to pretty on a terminal, text when piped).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Intentional-cycle registry file (default: .branchlint/intentional.json).
    #[arg(long, global = true, value_name = "PATH")]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Checks",
        about = "Validate a dialogue graph",
        long_about = "Check a dialogue graph for cycles, broken references, orphaned and \
                      unreachable nodes, empty nodes and tests without a skill.\n\n\
                      Exits 1 when the report has errors (or warnings with --strict).",
        after_help = "EXAMPLES:\n    # Validate a graph file\n    blint validate dialogue.json\n\n    # Read from stdin, fail on warnings too\n    cat dialogue.json | blint validate --strict\n\n    # Emit machine-readable output\n    blint validate dialogue.json --json"
    )]
    Validate(cmd::validate::ValidateArgs),

    #[command(
        next_help_heading = "Checks",
        about = "List dialogue cycles",
        long_about = "List every detected cycle with its stable ID, including cycles marked intentional.",
        after_help = "EXAMPLES:\n    # List cycles\n    blint cycles dialogue.json\n\n    # Emit machine-readable output\n    blint cycles dialogue.json --json"
    )]
    Cycles(cmd::cycles::CyclesArgs),

    #[command(
        next_help_heading = "Registry",
        about = "Manage intentional cycles",
        long_about = "Mark, unmark and list cycles that are deliberate loops. Marked cycles are \
                      left out of `validate` reports."
    )]
    Intentional {
        #[command(subcommand)]
        command: cmd::intentional::IntentionalCommand,
    },

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    blint completions bash\n\n    # Generate zsh completions\n    blint completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("BRANCHLINT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "branchlint_core=debug,blint=debug,info"
        } else {
            "warn"
        })
    });

    let format = env::var("BRANCHLINT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

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

fn run(cli: Cli, output: OutputMode) -> anyhow::Result<ExitCode> {
    let project_root = env::current_dir()?;
    let registry_path = cmd::registry_path(&project_root, cli.registry.as_deref());
    debug!(
        root = %project_root.display(),
        registry = %registry_path.display(),
        ?output,
        "resolved paths"
    );

    match cli.command {
        Commands::Validate(ref args) => {
            cmd::validate::run_validate(args, output, &project_root, &registry_path)
        }
        Commands::Cycles(ref args) => {
            cmd::cycles::run_cycles(args, output, &registry_path).map(|()| ExitCode::SUCCESS)
        }
        Commands::Intentional { ref command } => {
            cmd::intentional::run_intentional(command, output, &registry_path)
                .map(|()| ExitCode::SUCCESS)
        }
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args, &mut command, &mut std::io::stdout())
                .map(|()| ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    match run(cli, output) {
        Ok(code) => code,
        Err(err) => {
            let cli_error = CliError::from(&err);
            error!(code = ?cli_error.error_code, "{err:#}");
            if let Err(render_err) = render_error(output, &cli_error) {
                eprintln!("error: {err:#} (while rendering: {render_err})");
            }
            ExitCode::from(EXIT_INPUT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["blint", "validate", "graph.json", "--json"]);
        assert!(cli.json);
        assert_eq!(cli.output_mode(), OutputMode::Json);
    }

    #[test]
    fn format_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["blint", "--format", "text", "cycles"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
        assert!(matches!(cli.command, Commands::Cycles(_)));
    }

    #[test]
    fn registry_flag_is_global() {
        let cli = Cli::parse_from(["blint", "intentional", "list", "--registry", "loops.json"]);
        assert_eq!(cli.registry, Some(PathBuf::from("loops.json")));
        assert!(matches!(
            cli.command,
            Commands::Intentional {
                command: cmd::intentional::IntentionalCommand::List
            }
        ));
    }

    #[test]
    fn intentional_mark_takes_cycle_id() {
        let cli = Cli::parse_from(["blint", "intentional", "mark", "cycle_0123456789abcdef"]);
        let Commands::Intentional {
            command: cmd::intentional::IntentionalCommand::Mark(args),
        } = cli.command
        else {
            panic!("expected intentional mark");
        };
        assert_eq!(args.cycle_id, "cycle_0123456789abcdef");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
