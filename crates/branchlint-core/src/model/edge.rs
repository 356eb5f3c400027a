//! Edge kinds and the slot table that derives them.
//!
//! Edges are never authored directly. Every node kind exposes a fixed set of
//! reference slots, and each populated slot synthesizes exactly one edge. The
//! order of [`Slot::ORDER`] is the traversal order used everywhere a node's
//! outgoing edges are walked (graph construction, cycle search, reporting).

use serde::{Serialize, Serializer};
use std::fmt;

use super::node::NodeKind;

/// The label carried by a synthesized edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {
    Next,
    /// Choice at the given zero-based position in the node's choice list.
    Choice(usize),
    Success,
    Failure,
    TestCriticalFailure,
    TestFailure,
    TestSuccess,
    TestCriticalSuccess,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => f.write_str("next"),
            Self::Choice(index) => write!(f, "choice[{index}]"),
            Self::Success => f.write_str("success"),
            Self::Failure => f.write_str("failure"),
            Self::TestCriticalFailure => f.write_str("test_critical_failure"),
            Self::TestFailure => f.write_str("test_failure"),
            Self::TestSuccess => f.write_str("test_success"),
            Self::TestCriticalSuccess => f.write_str("test_critical_success"),
        }
    }
}

impl Serialize for EdgeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A named reference slot on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Next,
    Choices,
    Success,
    Failure,
    CriticalFailureNode,
    FailureNode,
    SuccessNode,
    CriticalSuccessNode,
}

impl Slot {
    /// Traversal order of slots. Choices expand in list order at their position.
    pub const ORDER: [Self; 8] = [
        Self::Next,
        Self::Choices,
        Self::Success,
        Self::Failure,
        Self::CriticalFailureNode,
        Self::FailureNode,
        Self::SuccessNode,
        Self::CriticalSuccessNode,
    ];

    /// Whether a node of `kind` carries this slot.
    #[must_use]
    pub const fn applies_to(self, kind: NodeKind) -> bool {
        match (kind, self) {
            (NodeKind::Dialogue, Self::Next | Self::Choices) => true,
            (
                NodeKind::Test,
                Self::Next
                | Self::Success
                | Self::Failure
                | Self::CriticalFailureNode
                | Self::FailureNode
                | Self::SuccessNode
                | Self::CriticalSuccessNode,
            ) => true,
            _ => false,
        }
    }

    /// Edge kind synthesized for the `ordinal`-th reference held by this slot.
    ///
    /// `ordinal` is only meaningful for [`Slot::Choices`]; every other slot
    /// holds at most one reference.
    #[must_use]
    pub const fn edge_kind(self, ordinal: usize) -> EdgeKind {
        match self {
            Self::Next => EdgeKind::Next,
            Self::Choices => EdgeKind::Choice(ordinal),
            Self::Success => EdgeKind::Success,
            Self::Failure => EdgeKind::Failure,
            Self::CriticalFailureNode => EdgeKind::TestCriticalFailure,
            Self::FailureNode => EdgeKind::TestFailure,
            Self::SuccessNode => EdgeKind::TestSuccess,
            Self::CriticalSuccessNode => EdgeKind::TestCriticalSuccess,
        }
    }
}
