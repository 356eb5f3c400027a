//! `blint completions`: Shell completion scripts.

use std::io::Write;

use clap::Args;
use clap_complete::{Shell, generate};

pub const BIN_NAME: &str = "blint";

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` to `out`.
pub fn run_completions(
    args: &CompletionsArgs,
    command: &mut clap::Command,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    generate(args.shell, command, BIN_NAME, out);
    out.flush()?;
    Ok(())
}
