//! `blint intentional`: Manage the intentional-cycle registry.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use branchlint_core::CycleId;
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::output::{OutputMode, render_mode};
use crate::registry::Registry;

#[derive(Subcommand, Debug)]
pub enum IntentionalCommand {
    #[command(
        about = "Mark a cycle as intentional",
        after_help = "EXAMPLES:\n    # Hide a deliberate \"ask again\" loop from validate\n    blint intentional mark cycle_3f1c9a0b5e7d2468"
    )]
    Mark(CycleIdArgs),

    #[command(
        about = "Stop treating a cycle as intentional",
        after_help = "EXAMPLES:\n    # Report the loop again\n    blint intentional unmark cycle_3f1c9a0b5e7d2468"
    )]
    Unmark(CycleIdArgs),

    #[command(
        about = "List intentional cycles",
        after_help = "EXAMPLES:\n    # Show every marked cycle\n    blint intentional list\n\n    # Emit machine-readable output\n    blint intentional list --json"
    )]
    List,
}

#[derive(Args, Debug)]
pub struct CycleIdArgs {
    /// Cycle ID as printed by `validate` or `cycles` (cycle_ + 16 hex digits).
    #[arg(value_name = "CYCLE_ID")]
    pub cycle_id: String,
}

#[derive(Debug, Serialize)]
struct ChangeOutput {
    cycle_id: CycleId,
    intentional: bool,
    changed: bool,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    registry: String,
    intentional: Vec<CycleId>,
}

/// Execute `blint intentional <command>`.
pub fn run_intentional(
    command: &IntentionalCommand,
    output: OutputMode,
    registry_path: &Path,
) -> anyhow::Result<()> {
    let mut registry = Registry::load(registry_path)?;

    match command {
        IntentionalCommand::Mark(args) => {
            let id = parse_cycle_id(&args.cycle_id)?;
            let changed = registry.mark(id.clone());
            if changed {
                registry.save()?;
            }
            info!(cycle_id = %id, changed, "marked cycle intentional");
            let payload = ChangeOutput {
                cycle_id: id,
                intentional: true,
                changed,
            };
            render_mode(output, &payload, render_change_text, render_change_pretty)
        }
        IntentionalCommand::Unmark(args) => {
            let id = parse_cycle_id(&args.cycle_id)?;
            let changed = registry.unmark(&id);
            if changed {
                registry.save()?;
            }
            info!(cycle_id = %id, changed, "unmarked cycle");
            let payload = ChangeOutput {
                cycle_id: id,
                intentional: false,
                changed,
            };
            render_mode(output, &payload, render_change_text, render_change_pretty)
        }
        IntentionalCommand::List => {
            let payload = ListOutput {
                registry: registry.path().display().to_string(),
                intentional: registry.marked().cloned().collect(),
            };
            render_mode(output, &payload, render_list_text, render_list_pretty)
        }
    }
}

fn parse_cycle_id(raw: &str) -> anyhow::Result<CycleId> {
    raw.trim()
        .parse::<CycleId>()
        .with_context(|| format!("Cannot use '{raw}' as a cycle ID"))
}

fn render_change_text(payload: &ChangeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let state = if payload.intentional { "intentional" } else { "reported" };
    writeln!(w, "{}\t{state}", payload.cycle_id)
}

fn render_change_pretty(payload: &ChangeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    match (payload.intentional, payload.changed) {
        (true, true) => writeln!(w, "✓ {} marked intentional", payload.cycle_id),
        (true, false) => writeln!(w, "{} was already intentional", payload.cycle_id),
        (false, true) => writeln!(w, "✓ {} will be reported again", payload.cycle_id),
        (false, false) => writeln!(w, "{} was not marked", payload.cycle_id),
    }
}

fn render_list_text(payload: &ListOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for id in &payload.intentional {
        writeln!(w, "{id}")?;
    }
    Ok(())
}

fn render_list_pretty(payload: &ListOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.intentional.is_empty() {
        writeln!(w, "No intentional cycles in {}.", payload.registry)?;
        return Ok(());
    }
    writeln!(
        w,
        "Intentional cycles ({}) in {}",
        payload.intentional.len(),
        payload.registry
    )?;
    for id in &payload.intentional {
        writeln!(w, "  - {id}")?;
    }
    Ok(())
}
