//! `blint cycles`: List every dialogue cycle with its stable ID.
//!
//! Unlike `validate`, nothing is suppressed: intentional cycles are listed
//! and flagged so they can be reviewed or un-marked.

use std::io::Write;
use std::path::{Path, PathBuf};

use branchlint_core::{CycleId, Graph, IntentionalCycles, find_cycles, identify};
use clap::Args;
use serde::Serialize;

use crate::input::read_request;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use crate::registry::Registry;

/// Arguments for `blint cycles`.
#[derive(Args, Debug, Default)]
pub struct CyclesArgs {
    /// Graph JSON file. Reads stdin when omitted or `-`.
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CycleEntry {
    cycle_id: CycleId,
    cycle_path: String,
    cycle_nodes: Vec<String>,
    intentional: bool,
}

#[derive(Debug, Serialize)]
struct CyclesOutput {
    content_hash: String,
    cycles: Vec<CycleEntry>,
    /// Strongly connected regions that contain loops, as sorted ID lists.
    regions: Vec<Vec<String>>,
}

/// Execute `blint cycles`.
pub fn run_cycles(
    args: &CyclesArgs,
    output: OutputMode,
    registry_path: &Path,
) -> anyhow::Result<()> {
    let request = read_request(args.input.as_deref())?;
    let registry = Registry::load(registry_path)?;
    let graph = Graph::build(&request.nodes);

    let payload = collect_cycles(&graph, &registry);
    render_mode(output, &payload, render_cycles_text, render_cycles_pretty)
}

fn collect_cycles(graph: &Graph, intentional: &dyn IntentionalCycles) -> CyclesOutput {
    let cycles = find_cycles(graph)
        .into_iter()
        .map(|cycle| {
            let cycle_id = identify(&cycle);
            CycleEntry {
                intentional: intentional.is_intentional(&cycle_id),
                cycle_path: cycle.render_path(),
                cycle_nodes: cycle.path,
                cycle_id,
            }
        })
        .collect();

    CyclesOutput {
        content_hash: graph.content_hash().to_string(),
        cycles,
        regions: graph.cyclic_components(),
    }
}

fn render_cycles_text(payload: &CyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for entry in &payload.cycles {
        let status = if entry.intentional { "intentional" } else { "-" };
        writeln!(w, "{}\t{status}\t{}", entry.cycle_id, entry.cycle_path)?;
    }
    Ok(())
}

fn render_cycles_pretty(payload: &CyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.cycles.is_empty() {
        writeln!(w, "No dialogue cycles found.")?;
        return Ok(());
    }

    pretty_section(w, &format!("Dialogue cycles ({})", payload.cycles.len()))?;
    pretty_kv(w, "graph", &payload.content_hash)?;
    pretty_kv(w, "regions", payload.regions.len().to_string())?;

    for (idx, entry) in payload.cycles.iter().enumerate() {
        let flag = if entry.intentional { " [intentional]" } else { "" };
        writeln!(w, "\nCycle {}: {}{flag}", idx + 1, entry.cycle_id)?;
        writeln!(w, "  {}", entry.cycle_path)?;
    }

    Ok(())
}
