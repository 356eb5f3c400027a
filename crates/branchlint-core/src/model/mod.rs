//! Input schema: authored nodes and the slot table that turns them into edges.
//!
//! - [`node`]: the tagged node variants accepted at the JSON boundary.
//! - [`edge`]: edge kinds and the fixed slot traversal order.

pub mod edge;
pub mod node;

pub use edge::{EdgeKind, Slot};
pub use node::{Choice, DialogueSlots, END, Node, NodeBody, NodeKind, Reference, TestSlots};
