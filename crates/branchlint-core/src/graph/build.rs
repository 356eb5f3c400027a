//! Graph construction from authored nodes.
//!
//! # Overview
//!
//! [`Graph::build`] normalizes a node list into a directed graph. Edges are
//! synthesized from node slots (see [`crate::model::Slot`]), never read from
//! a separately maintained edge list.
//!
//! ## Node admission
//!
//! A node takes part in the graph only if it has a non-blank ID, that ID is
//! not the reserved [`END`] target, and it is the first node with that ID.
//! Everything else is recorded as an [`Exclusion`] so the aggregator can
//! report it; excluded nodes contribute no edges.
//!
//! ## Edge resolution
//!
//! Every synthesized edge keeps its raw target string and a resolved
//! [`Target`]. Edges to [`END`] and to missing nodes stay in the outgoing
//! lists (the reference resolver needs them) but only edges between admitted
//! nodes appear in the incoming lists and in the `petgraph` mirror.
//!
//! ## Content Hash
//!
//! The graph carries a SHA-256 hash over its sorted node IDs and edge set, so
//! two reports can be matched to the same graph regardless of input order.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use crate::model::{END, EdgeKind, Node};

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

/// Where a synthesized edge points after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The reserved terminal; always satisfied.
    End,
    /// An admitted node of this graph.
    Node(NodeIndex),
    /// An ID that no admitted node carries.
    Missing,
}

/// A directed, labeled edge derived from one populated slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: NodeIndex,
    pub kind: EdgeKind,
    /// Target ID exactly as authored.
    pub target_id: String,
    pub target: Target,
}

impl Edge {
    /// `true` for an edge from a node to itself.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.target == Target::Node(self.source)
    }
}

/// A node that was left out of the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// The node at `position` (zero-based input order) has a blank ID.
    MissingId { position: usize },
    /// The node at `position` uses the reserved `END` ID.
    ReservedEnd { position: usize },
    /// A later node reuses an ID first seen at `first_position`.
    Duplicate {
        id: String,
        position: usize,
        first_position: usize,
    },
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// Canonical directed graph over admitted nodes.
///
/// Node indices follow input order: the `n`-th admitted node is
/// `NodeIndex::new(n)` in both this structure and the `petgraph` mirror.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    positions: Vec<usize>,
    node_map: HashMap<String, NodeIndex>,
    outgoing: Vec<Vec<Edge>>,
    incoming: Vec<Vec<Edge>>,
    digraph: DiGraph<String, EdgeKind>,
    exclusions: Vec<Exclusion>,
    content_hash: String,
}

impl Graph {
    /// Build a graph from authored nodes. Never fails: malformed nodes are
    /// recorded as exclusions.
    #[instrument(skip_all, fields(input_nodes = input.len()))]
    pub fn build(input: &[Node]) -> Self {
        let mut nodes: Vec<Node> = Vec::with_capacity(input.len());
        let mut positions: Vec<usize> = Vec::with_capacity(input.len());
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(input.len());
        let mut exclusions = Vec::new();
        let mut digraph = DiGraph::<String, EdgeKind>::with_capacity(input.len(), input.len());

        // Step 1: admit nodes in input order.
        for (position, node) in input.iter().enumerate() {
            if !node.has_id() {
                exclusions.push(Exclusion::MissingId { position });
                continue;
            }
            if node.id == END {
                exclusions.push(Exclusion::ReservedEnd { position });
                continue;
            }
            if let Some(&existing) = node_map.get(&node.id) {
                exclusions.push(Exclusion::Duplicate {
                    id: node.id.clone(),
                    position,
                    first_position: positions[existing.index()],
                });
                continue;
            }

            let idx = digraph.add_node(node.id.clone());
            node_map.insert(node.id.clone(), idx);
            nodes.push(node.clone());
            positions.push(position);
        }

        // Step 2: synthesize and resolve edges in slot order.
        let mut outgoing: Vec<Vec<Edge>> = vec![Vec::new(); nodes.len()];
        let mut incoming: Vec<Vec<Edge>> = vec![Vec::new(); nodes.len()];

        for (i, node) in nodes.iter().enumerate() {
            let source = NodeIndex::new(i);
            for reference in node.references() {
                let target = if reference.target == END {
                    Target::End
                } else {
                    node_map
                        .get(reference.target)
                        .map_or(Target::Missing, |&idx| Target::Node(idx))
                };

                let edge = Edge {
                    source,
                    kind: reference.kind,
                    target_id: reference.target.to_string(),
                    target,
                };

                if let Target::Node(to) = target {
                    incoming[to.index()].push(edge.clone());
                    if !digraph.contains_edge(source, to) {
                        digraph.add_edge(source, to, reference.kind);
                    }
                }
                outgoing[i].push(edge);
            }
        }

        let content_hash = compute_content_hash(&nodes, &outgoing);

        debug!(
            nodes = nodes.len(),
            edges = outgoing.iter().map(Vec::len).sum::<usize>(),
            excluded = exclusions.len(),
            %content_hash,
            "built dialogue graph"
        );

        Self {
            nodes,
            positions,
            node_map,
            outgoing,
            incoming,
            digraph,
            exclusions,
            content_hash,
        }
    }

    /// Number of admitted nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of synthesized edges, including edges to `END` and to missing
    /// targets.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.outgoing.iter().map(Vec::len).sum()
    }

    /// `true` when no node was admitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Admitted node indices in input order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        (0..self.nodes.len()).map(NodeIndex::new)
    }

    /// Look up the index for a node ID.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// The authored node behind an index.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not belong to this graph.
    #[must_use]
    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.index()]
    }

    /// The ID of the node behind an index.
    #[must_use]
    pub fn id(&self, idx: NodeIndex) -> &str {
        &self.node(idx).id
    }

    /// Zero-based position of the node in the original input list.
    #[must_use]
    pub fn input_position(&self, idx: NodeIndex) -> usize {
        self.positions[idx.index()]
    }

    /// Outgoing edges of a node in slot order.
    #[must_use]
    pub fn outgoing(&self, idx: NodeIndex) -> &[Edge] {
        &self.outgoing[idx.index()]
    }

    /// Incoming edges of a node, from admitted sources only.
    #[must_use]
    pub fn incoming(&self, idx: NodeIndex) -> &[Edge] {
        &self.incoming[idx.index()]
    }

    /// All synthesized edges, grouped by source in input order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.outgoing.iter().flatten()
    }

    /// Nodes that were left out of the graph.
    #[must_use]
    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    /// `sha256:<hex>` over sorted node IDs and sorted edges.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Read-only `petgraph` view (admitted nodes, resolved edges).
    #[must_use]
    pub fn digraph(&self) -> &DiGraph<String, EdgeKind> {
        &self.digraph
    }

    /// The designated root: `preferred` if present, else the first node.
    #[must_use]
    pub fn root(&self, preferred: &str) -> Option<NodeIndex> {
        self.index_of(preferred)
            .or_else(|| self.node_indices().next())
    }

    /// Reachability bitmap from `root`, indexed by node index.
    #[must_use]
    pub fn reachable_from(&self, root: NodeIndex) -> Vec<bool> {
        let mut reachable = vec![false; self.nodes.len()];
        let mut bfs = Bfs::new(&self.digraph, root);
        while let Some(idx) = bfs.next(&self.digraph) {
            reachable[idx.index()] = true;
        }
        reachable
    }

    /// Strongly connected regions that contain at least one cycle.
    ///
    /// Each entry is a sorted list of node IDs; self-loop singletons are
    /// included. Entries are sorted for determinism.
    #[must_use]
    pub fn cyclic_components(&self) -> Vec<Vec<String>> {
        let mut components: Vec<Vec<String>> = tarjan_scc(&self.digraph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&idx| self.digraph.contains_edge(idx, idx))
            })
            .map(|component| {
                let mut ids: Vec<String> = component
                    .into_iter()
                    .map(|idx| self.id(idx).to_string())
                    .collect();
                ids.sort_unstable();
                ids
            })
            .collect();

        components.sort_unstable();
        components
    }
}

fn compute_content_hash(nodes: &[Node], outgoing: &[Vec<Edge>]) -> String {
    let mut ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    ids.sort_unstable();

    let mut edges: Vec<(&str, String, &str)> = outgoing
        .iter()
        .flatten()
        .map(|edge| {
            (
                nodes[edge.source.index()].id.as_str(),
                edge.kind.to_string(),
                edge.target_id.as_str(),
            )
        })
        .collect();
    edges.sort_unstable();

    let mut hasher = Sha256::new();
    for id in ids {
        hasher.update(id.as_bytes());
        hasher.update(b"\x00");
    }
    hasher.update(b"\x01");
    for (source, kind, target) in edges {
        hasher.update(source.as_bytes());
        hasher.update(b"\x00");
        hasher.update(kind.as_bytes());
        hasher.update(b"\x00");
        hasher.update(target.as_bytes());
        hasher.update(b"\x00");
    }

    format!("sha256:{:x}", hasher.finalize())
}
