//! Elementary cycle enumeration over a dialogue graph.
//!
//! # Traversal
//!
//! Depth-first search with three colors, run from every still-unvisited node
//! in input order. Each node's outgoing edges are walked in slot order. An
//! edge into a node that is on the current path (gray) closes a cycle: the
//! path suffix from that node to the top of the stack is recorded and the
//! edge is not followed. The search keeps going after every hit, so disjoint
//! and overlapping cycles are all reported.
//!
//! The stack is explicit. Authored graphs are small, but a long linear
//! conversation must not turn into a stack overflow.
//!
//! # Deduplication
//!
//! Two hits with the same node set are the same cycle. Only the first path
//! discovered for a set is kept; later paths over the same set are dropped.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashSet;
use std::fmt;

use petgraph::graph::NodeIndex;
use tracing::{debug, instrument};

use super::build::{Graph, Target};

/// Separator used when rendering a cycle path.
pub const PATH_ARROW: &str = " → ";

/// One detected cycle.
///
/// `path` lists each member once, in traversal order starting at the node
/// where the cycle was entered. The closing edge from the last element back
/// to the first is implied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    pub path: Vec<String>,
}

impl Cycle {
    /// Member IDs, sorted and deduplicated.
    #[must_use]
    pub fn node_set(&self) -> Vec<&str> {
        let mut nodes: Vec<&str> = self.path.iter().map(String::as_str).collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }

    /// The node the path starts (and ends) at.
    #[must_use]
    pub fn entry(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.path.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.path.len() == 1
    }

    /// `A → B → C → A`; a self-loop renders as `A → A`.
    #[must_use]
    pub fn render_path(&self) -> String {
        let mut rendered = self.path.join(PATH_ARROW);
        if let Some(first) = self.path.first() {
            rendered.push_str(PATH_ARROW);
            rendered.push_str(first);
        }
        rendered
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

struct Frame {
    node: NodeIndex,
    next_edge: usize,
}

/// Enumerate distinct elementary cycles in discovery order.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.node_count()))]
pub fn find_cycles(graph: &Graph) -> Vec<Cycle> {
    let n = graph.node_count();
    let mut color = vec![Color::White; n];
    // Position of a gray node in `frames`.
    let mut stack_pos: Vec<Option<usize>> = vec![None; n];
    let mut frames: Vec<Frame> = Vec::new();

    let mut seen_sets: HashSet<Vec<usize>> = HashSet::new();
    let mut cycles: Vec<Cycle> = Vec::new();
    let mut duplicates = 0_usize;

    for root in graph.node_indices() {
        if color[root.index()] != Color::White {
            continue;
        }

        color[root.index()] = Color::Gray;
        stack_pos[root.index()] = Some(0);
        frames.push(Frame {
            node: root,
            next_edge: 0,
        });

        while let Some(top) = frames.last_mut() {
            let node = top.node;
            let edges = graph.outgoing(node);

            let Some(edge) = edges.get(top.next_edge) else {
                color[node.index()] = Color::Black;
                stack_pos[node.index()] = None;
                frames.pop();
                continue;
            };
            top.next_edge += 1;

            let Target::Node(target) = edge.target else {
                continue;
            };

            match color[target.index()] {
                Color::White => {
                    color[target.index()] = Color::Gray;
                    stack_pos[target.index()] = Some(frames.len());
                    frames.push(Frame {
                        node: target,
                        next_edge: 0,
                    });
                }
                Color::Gray => {
                    let Some(start) = stack_pos[target.index()] else {
                        continue;
                    };
                    let members: Vec<NodeIndex> = frames[start..].iter().map(|f| f.node).collect();

                    let mut key: Vec<usize> = members.iter().map(|idx| idx.index()).collect();
                    key.sort_unstable();

                    if seen_sets.insert(key) {
                        cycles.push(Cycle {
                            path: members
                                .iter()
                                .map(|&idx| graph.id(idx).to_string())
                                .collect(),
                        });
                    } else {
                        duplicates += 1;
                    }
                }
                Color::Black => {}
            }
        }
    }

    debug!(cycles = cycles.len(), duplicates, "cycle search complete");
    cycles
}
