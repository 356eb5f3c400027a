//! Dialogue graph construction and structural analysis.
//!
//! ```text
//!   &[Node] ──build──▶ Graph ──┬──▶ resolve      (references, connectivity, content)
//!                              └──▶ find_cycles ──▶ identify (CycleId)
//! ```
//!
//! Both analyses read the same [`Graph`] and walk outgoing edges in slot
//! order, so reports are deterministic for a given input.

pub mod build;
pub mod cycles;
pub mod identity;
pub mod resolve;

pub use build::{Edge, Exclusion, Graph, Target};
pub use cycles::{Cycle, find_cycles};
pub use identity::{CycleId, identify, identify_nodes};
pub use resolve::resolve;
