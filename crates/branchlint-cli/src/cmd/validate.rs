//! `blint validate`: Run every check and print the report.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use branchlint_core::{
    Finding, Graph, ValidationReport, Validator, load_project_config,
};
use clap::Args;
use tracing::info;

use crate::input::read_request;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use crate::registry::Registry;

/// Arguments for `blint validate`.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Graph JSON file. Reads stdin when omitted or `-`.
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Root node for reachability checks (default from config, else START).
    #[arg(long, value_name = "ID")]
    pub root: Option<String>,

    /// Exit non-zero on warnings too.
    #[arg(long)]
    pub strict: bool,

    /// Report every cycle, ignoring the intentional-cycle registry.
    #[arg(long)]
    pub all_cycles: bool,
}

struct GraphInfo {
    content_hash: String,
    nodes: usize,
    edges: usize,
}

/// Execute `blint validate`.
pub fn run_validate(
    args: &ValidateArgs,
    output: OutputMode,
    project_root: &Path,
    registry_path: &Path,
) -> anyhow::Result<ExitCode> {
    let mut config = load_project_config(project_root)?.validation;
    if let Some(root) = &args.root {
        config.root.clone_from(root);
    }

    let request = read_request(args.input.as_deref())?;
    let registry = if args.all_cycles {
        Registry::default()
    } else {
        Registry::load(registry_path)?
    };

    let graph = Graph::build(&request.nodes);
    let report = Validator::new(config).validate_graph(&graph, &registry);
    let info = GraphInfo {
        content_hash: graph.content_hash().to_string(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
    };

    render_mode(output, &report, render_report_text, |report, w| {
        render_report_pretty(report, &info, w)
    })?;

    let failed = fails(&report, args.strict);
    info!(failed, strict = args.strict, "validate finished");
    Ok(if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn fails(report: &ValidationReport, strict: bool) -> bool {
    report.has_errors() || (strict && !report.warnings.is_empty())
}

fn render_report_text(report: &ValidationReport, w: &mut dyn Write) -> std::io::Result<()> {
    for finding in report.iter() {
        write!(
            w,
            "{}\t{}\t{}\t{}",
            finding.severity,
            finding.kind,
            finding.node_id.as_deref().unwrap_or("-"),
            finding.message
        )?;
        if let Some(id) = finding.cycle_id() {
            write!(w, "\t{id}")?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn render_report_pretty(
    report: &ValidationReport,
    info: &GraphInfo,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    pretty_section(w, "Dialogue validation")?;
    pretty_kv(w, "graph", &info.content_hash)?;
    pretty_kv(w, "nodes", format!("{} ({} edges)", info.nodes, info.edges))?;
    pretty_kv(w, "errors", report.errors.len().to_string())?;
    pretty_kv(w, "warnings", report.warnings.len().to_string())?;
    if report.suppressed > 0 {
        pretty_kv(w, "intentional", format!("{} cycle(s) hidden", report.suppressed))?;
    }

    if report.is_clean() {
        writeln!(w, "\n✓ No problems found.")?;
        return Ok(());
    }

    for (heading, marker, findings) in [
        ("Errors", "✗", &report.errors),
        ("Warnings", "!", &report.warnings),
    ] {
        if findings.is_empty() {
            continue;
        }
        writeln!(w)?;
        pretty_section(w, &format!("{heading} ({})", findings.len()))?;
        for finding in findings {
            render_finding_pretty(finding, marker, w)?;
        }
    }

    Ok(())
}

fn render_finding_pretty(finding: &Finding, marker: &str, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{marker} {:<17} {}", finding.kind.as_str(), finding.message)?;
    if let Some(id) = finding.cycle_id() {
        writeln!(w, "  {:<17} {id}", "")?;
    }
    Ok(())
}
