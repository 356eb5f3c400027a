//! The validation entry point.
//!
//! [`Validator::validate`] builds the graph, runs the reference resolver and
//! the cycle detector, identifies each cycle, drops cycles the caller marks
//! as intentional, and splits the result by severity.
//!
//! Findings keep a fixed order: exclusions, broken references, cycles,
//! orphans, unreachable nodes, empty nodes, missing tests.

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::ValidationConfig;
use crate::finding::{Finding, FindingKind, Severity};
use crate::graph::{Graph, find_cycles, identify, resolve};
use crate::intentional::IntentionalCycles;
use crate::model::Node;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    /// Cycles dropped because the caller marked them intentional.
    #[serde(skip_serializing)]
    pub suppressed: usize,
}

impl ValidationReport {
    fn from_findings(findings: Vec<Finding>, suppressed: usize) -> Self {
        let (errors, warnings): (Vec<Finding>, Vec<Finding>) = findings
            .into_iter()
            .partition(|finding| finding.severity == Severity::Error);
        Self {
            errors,
            warnings,
            suppressed,
        }
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Errors then warnings.
    pub fn iter(&self) -> impl Iterator<Item = &Finding> + '_ {
        self.errors.iter().chain(&self.warnings)
    }

    /// Number of findings of one type.
    #[must_use]
    pub fn count(&self, kind: FindingKind) -> usize {
        self.iter().filter(|finding| finding.kind == kind).count()
    }

    /// Findings of type `cycle_detected`, in discovery order.
    pub fn cycles(&self) -> impl Iterator<Item = &Finding> + '_ {
        self.warnings
            .iter()
            .filter(|finding| finding.kind == FindingKind::CycleDetected)
    }
}

/// Stateless validator; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    #[must_use]
    pub const fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a node list.
    pub fn validate<I>(&self, nodes: &[Node], intentional: &I) -> ValidationReport
    where
        I: IntentionalCycles + ?Sized,
    {
        let graph = Graph::build(nodes);
        self.validate_graph(&graph, intentional)
    }

    /// Validate an already built graph.
    #[instrument(skip_all, fields(nodes = graph.node_count(), hash = %graph.content_hash()))]
    pub fn validate_graph<I>(&self, graph: &Graph, intentional: &I) -> ValidationReport
    where
        I: IntentionalCycles + ?Sized,
    {
        let checks = self.config.checks;

        let mut findings = resolve::exclusions(graph);
        findings.extend(resolve::broken_references(graph));

        let mut suppressed = 0_usize;
        for cycle in find_cycles(graph) {
            let id = identify(&cycle);
            if intentional.is_intentional(&id) {
                debug!(cycle_id = %id, path = %cycle, "suppressed intentional cycle");
                suppressed += 1;
                continue;
            }
            findings.push(Finding::cycle(&cycle, id));
        }

        let (orphans, unreachable) = resolve::connectivity(graph, &self.config.root, checks);
        findings.extend(orphans);
        findings.extend(unreachable);

        let (empty, missing_test) = resolve::content(graph, checks);
        findings.extend(empty);
        findings.extend(missing_test);

        let report = ValidationReport::from_findings(findings, suppressed);
        info!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            suppressed,
            "validation complete"
        );
        report
    }
}

/// Validate with default configuration.
pub fn validate<I>(nodes: &[Node], intentional: &I) -> ValidationReport
where
    I: IntentionalCycles + ?Sized,
{
    Validator::default().validate(nodes, intentional)
}
