//! Validation findings: what is wrong, where, and how bad.

use std::fmt;

use serde::Serialize;

use crate::graph::{Cycle, CycleId, Edge};
use crate::model::EdgeKind;

/// Finding type, serialized as the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    MissingId,
    ReservedId,
    DuplicateNode,
    BrokenReference,
    CycleDetected,
    OrphanNode,
    UnreachableNode,
    EmptyNode,
    MissingTest,
}

impl FindingKind {
    pub const ALL: [Self; 9] = [
        Self::MissingId,
        Self::ReservedId,
        Self::DuplicateNode,
        Self::BrokenReference,
        Self::CycleDetected,
        Self::OrphanNode,
        Self::UnreachableNode,
        Self::EmptyNode,
        Self::MissingTest,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingId => "missing_id",
            Self::ReservedId => "reserved_id",
            Self::DuplicateNode => "duplicate_node",
            Self::BrokenReference => "broken_reference",
            Self::CycleDetected => "cycle_detected",
            Self::OrphanNode => "orphan_node",
            Self::UnreachableNode => "unreachable_node",
            Self::EmptyNode => "empty_node",
            Self::MissingTest => "missing_test",
        }
    }

    /// Fixed severity of each finding type.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::MissingId | Self::ReservedId | Self::DuplicateNode | Self::BrokenReference => {
                Severity::Error
            }
            Self::CycleDetected
            | Self::OrphanNode
            | Self::UnreachableNode
            | Self::EmptyNode
            | Self::MissingTest => Severity::Warning,
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// Type-specific fields, flattened into the finding on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FindingDetail {
    Cycle {
        cycle_path: String,
        cycle_nodes: Vec<String>,
        cycle_id: CycleId,
    },
    Reference {
        target: String,
        edge_kind: EdgeKind,
    },
    Position {
        position: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        first_position: Option<usize>,
    },
}

/// One structural problem in a dialogue graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub message: String,
    #[serde(flatten)]
    pub detail: Option<FindingDetail>,
}

impl Finding {
    fn new(kind: FindingKind, node_id: Option<&str>, message: String) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            node_id: node_id.map(str::to_string),
            message,
            detail: None,
        }
    }

    fn with_detail(mut self, detail: FindingDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    #[must_use]
    pub fn cycle(cycle: &Cycle, id: CycleId) -> Self {
        let cycle_path = cycle.render_path();
        Self::new(
            FindingKind::CycleDetected,
            cycle.entry(),
            format!("Cycle detected: {cycle_path}"),
        )
        .with_detail(FindingDetail::Cycle {
            cycle_path,
            cycle_nodes: cycle.path.clone(),
            cycle_id: id,
        })
    }

    #[must_use]
    pub fn broken_reference(source: &str, edge: &Edge) -> Self {
        Self::new(
            FindingKind::BrokenReference,
            Some(source),
            format!(
                "Node '{source}' references missing node '{}' via {}",
                edge.target_id, edge.kind
            ),
        )
        .with_detail(FindingDetail::Reference {
            target: edge.target_id.clone(),
            edge_kind: edge.kind,
        })
    }

    #[must_use]
    pub fn orphan(id: &str) -> Self {
        Self::new(
            FindingKind::OrphanNode,
            Some(id),
            format!("Node '{id}' has no incoming edges and is never reached"),
        )
    }

    #[must_use]
    pub fn unreachable(id: &str, root: &str) -> Self {
        Self::new(
            FindingKind::UnreachableNode,
            Some(id),
            format!("Node '{id}' cannot be reached from '{root}'"),
        )
    }

    #[must_use]
    pub fn empty(id: &str) -> Self {
        Self::new(
            FindingKind::EmptyNode,
            Some(id),
            format!("Node '{id}' has no content and leads nowhere"),
        )
    }

    #[must_use]
    pub fn missing_test(id: &str) -> Self {
        Self::new(
            FindingKind::MissingTest,
            Some(id),
            format!("Test node '{id}' does not name a skill to test"),
        )
    }

    #[must_use]
    pub fn missing_id(position: usize) -> Self {
        Self::new(
            FindingKind::MissingId,
            None,
            format!("Node at position {position} has no ID and was skipped"),
        )
        .with_detail(FindingDetail::Position {
            position,
            first_position: None,
        })
    }

    #[must_use]
    pub fn reserved_end(position: usize) -> Self {
        Self::new(
            FindingKind::ReservedId,
            Some(crate::model::END),
            format!("Node at position {position} uses the reserved ID 'END' and was skipped"),
        )
        .with_detail(FindingDetail::Position {
            position,
            first_position: None,
        })
    }

    #[must_use]
    pub fn duplicate(id: &str, position: usize, first_position: usize) -> Self {
        Self::new(
            FindingKind::DuplicateNode,
            Some(id),
            format!(
                "Node ID '{id}' at position {position} repeats position {first_position}; only the first is validated"
            ),
        )
        .with_detail(FindingDetail::Position {
            position,
            first_position: Some(first_position),
        })
    }

    /// The cycle identity, for `cycle_detected` findings.
    #[must_use]
    pub fn cycle_id(&self) -> Option<&CycleId> {
        match &self.detail {
            Some(FindingDetail::Cycle { cycle_id, .. }) => Some(cycle_id),
            _ => None,
        }
    }

    /// The missing target, for `broken_reference` findings.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match &self.detail {
            Some(FindingDetail::Reference { target, .. }) => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.kind, self.message)
    }
}
