//! Reference and connectivity checks.
//!
//! Each check is a separate function so the aggregator can interleave cycle
//! findings in its fixed order. [`resolve`] runs them all in sequence.

use tracing::{debug, instrument};

use super::build::{Exclusion, Graph, Target};
use crate::config::{CheckConfig, ValidationConfig};
use crate::finding::Finding;
use crate::model::NodeKind;

/// Findings for nodes that were left out of the graph.
#[must_use]
pub fn exclusions(graph: &Graph) -> Vec<Finding> {
    graph
        .exclusions()
        .iter()
        .map(|exclusion| match exclusion {
            Exclusion::MissingId { position } => Finding::missing_id(*position),
            Exclusion::ReservedEnd { position } => Finding::reserved_end(*position),
            Exclusion::Duplicate {
                id,
                position,
                first_position,
            } => Finding::duplicate(id, *position, *first_position),
        })
        .collect()
}

/// One `broken_reference` per edge whose target is neither `END` nor a node.
#[must_use]
pub fn broken_references(graph: &Graph) -> Vec<Finding> {
    graph
        .edges()
        .filter(|edge| edge.target == Target::Missing)
        .map(|edge| Finding::broken_reference(graph.id(edge.source), edge))
        .collect()
}

/// Orphan and unreachable nodes relative to the configured root.
///
/// An orphan has no incoming edge other than from itself. An unreachable
/// node has incoming edges, but all of them come from nodes the root never
/// reaches.
#[must_use]
pub fn connectivity(graph: &Graph, root: &str, checks: CheckConfig) -> (Vec<Finding>, Vec<Finding>) {
    let mut orphans = Vec::new();
    let mut unreachable = Vec::new();

    let Some(root_idx) = graph.root(root) else {
        return (orphans, unreachable);
    };
    let root_id = graph.id(root_idx);
    let reachable = graph.reachable_from(root_idx);

    for idx in graph.node_indices() {
        if idx == root_idx {
            continue;
        }

        let has_incoming = graph.incoming(idx).iter().any(|edge| !edge.is_self_loop());
        if !has_incoming {
            if checks.orphans {
                orphans.push(Finding::orphan(graph.id(idx)));
            }
        } else if !reachable[idx.index()] && checks.unreachable {
            unreachable.push(Finding::unreachable(graph.id(idx), root_id));
        }
    }

    (orphans, unreachable)
}

/// Content checks: `empty_node` and `missing_test`.
#[must_use]
pub fn content(graph: &Graph, checks: CheckConfig) -> (Vec<Finding>, Vec<Finding>) {
    let mut empty = Vec::new();
    let mut missing_test = Vec::new();

    for idx in graph.node_indices() {
        let node = graph.node(idx);
        match node.kind() {
            NodeKind::End => {}
            NodeKind::Dialogue | NodeKind::Test => {
                if checks.empty_nodes && node.is_silent() && graph.outgoing(idx).is_empty() {
                    empty.push(Finding::empty(&node.id));
                }
            }
        }
        if checks.missing_tests && node.kind() == NodeKind::Test && node.skill().is_none() {
            missing_test.push(Finding::missing_test(&node.id));
        }
    }

    (empty, missing_test)
}

/// Run every non-cycle check in report order: exclusions, broken
/// references, orphans, unreachable nodes, empty nodes, missing tests.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.node_count(), root = %config.root))]
pub fn resolve(graph: &Graph, config: &ValidationConfig) -> Vec<Finding> {
    let mut findings = exclusions(graph);
    findings.extend(broken_references(graph));

    let (orphans, unreachable) = connectivity(graph, &config.root, config.checks);
    findings.extend(orphans);
    findings.extend(unreachable);

    let (empty, missing_test) = content(graph, config.checks);
    findings.extend(empty);
    findings.extend(missing_test);

    debug!(findings = findings.len(), "references resolved");
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::FindingKind;
    use crate::model::{DialogueSlots, Node, TestSlots};

    fn talk(id: &str, next: Option<&str>) -> Node {
        Node::dialogue(
            id,
            DialogueSlots {
                next: next.map(str::to_string),
                choices: Vec::new(),
            },
        )
        .with_line("...")
    }

    fn kinds(findings: &[Finding]) -> Vec<(FindingKind, Option<&str>)> {
        findings
            .iter()
            .map(|f| (f.kind, f.node_id.as_deref()))
            .collect()
    }

    fn run(nodes: &[Node]) -> Vec<Finding> {
        resolve(&Graph::build(nodes), &ValidationConfig::default())
    }

    #[test]
    fn end_target_is_never_broken() {
        let findings = run(&[talk("START", Some("END"))]);
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn missing_target_is_broken() {
        let findings = run(&[talk("START", Some("NODE_GHOST"))]);
        assert_eq!(kinds(&findings), vec![(FindingKind::BrokenReference, Some("START"))]);
        assert_eq!(findings[0].target(), Some("NODE_GHOST"));
    }

    #[test]
    fn orphan_versus_unreachable() {
        // ISLAND_A has no incoming edges (orphan); ISLAND_B is only fed by it.
        let findings = run(&[
            talk("START", Some("END")),
            talk("ISLAND_A", Some("ISLAND_B")),
            talk("ISLAND_B", Some("END")),
        ]);
        assert_eq!(
            kinds(&findings),
            vec![
                (FindingKind::OrphanNode, Some("ISLAND_A")),
                (FindingKind::UnreachableNode, Some("ISLAND_B")),
            ]
        );
    }

    #[test]
    fn detached_loop_is_unreachable_not_orphan() {
        let findings = run(&[
            talk("START", Some("END")),
            talk("LOOP_A", Some("LOOP_B")),
            talk("LOOP_B", Some("LOOP_A")),
        ]);
        assert_eq!(
            kinds(&findings),
            vec![
                (FindingKind::UnreachableNode, Some("LOOP_A")),
                (FindingKind::UnreachableNode, Some("LOOP_B")),
            ]
        );
    }

    #[test]
    fn self_loop_alone_does_not_count_as_incoming() {
        let findings = run(&[talk("START", Some("END")), talk("SPIN", Some("SPIN"))]);
        assert_eq!(kinds(&findings), vec![(FindingKind::OrphanNode, Some("SPIN"))]);
    }

    #[test]
    fn root_falls_back_to_first_node() {
        let findings = run(&[talk("INTRO", Some("MIDDLE")), talk("MIDDLE", Some("END"))]);
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn empty_node_needs_no_content_and_no_references() {
        let silent = Node::dialogue("SILENT", DialogueSlots::default());
        let silent_but_linked = Node::dialogue(
            "SILENT_LINKED",
            DialogueSlots {
                next: Some("END".into()),
                choices: Vec::new(),
            },
        );
        let findings = run(&[
            talk("START", Some("SILENT")),
            silent,
            talk("X", Some("SILENT_LINKED")),
            silent_but_linked,
            Node::end("FIN"),
        ]);

        let empty: Vec<_> = findings
            .iter()
            .filter(|f| f.kind == FindingKind::EmptyNode)
            .map(|f| f.node_id.as_deref())
            .collect();
        assert_eq!(empty, vec![Some("SILENT")]);
    }

    #[test]
    fn legacy_test_node_is_clean() {
        let legacy = Node::test(
            "CHECK",
            TestSlots {
                skill: Some("persuasion".into()),
                failure_node: Some("END".into()),
                success_node: Some("END".into()),
                ..TestSlots::default()
            },
        );
        let findings = run(&[talk("START", Some("CHECK")), legacy]);
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn test_without_skill_is_missing_test() {
        let untested = Node::test(
            "CHECK",
            TestSlots {
                success: Some("END".into()),
                ..TestSlots::default()
            },
        );
        let findings = run(&[talk("START", Some("CHECK")), untested]);
        assert_eq!(kinds(&findings), vec![(FindingKind::MissingTest, Some("CHECK"))]);
    }

    #[test]
    fn exclusions_come_first() {
        let findings = run(&[
            talk("START", Some("GONE")),
            talk("", None),
            talk("START", None),
        ]);
        assert_eq!(
            kinds(&findings),
            vec![
                (FindingKind::MissingId, None),
                (FindingKind::DuplicateNode, Some("START")),
                (FindingKind::BrokenReference, Some("START")),
            ]
        );
    }

    #[test]
    fn disabled_checks_are_skipped() {
        let config = ValidationConfig {
            checks: CheckConfig {
                orphans: false,
                unreachable: false,
                empty_nodes: false,
                missing_tests: false,
            },
            ..ValidationConfig::default()
        };
        let graph = Graph::build(&[
            talk("START", Some("END")),
            Node::dialogue("A", DialogueSlots::default()),
            Node::test("T", TestSlots::default()),
        ]);
        assert!(resolve(&graph, &config).is_empty());
    }
}
