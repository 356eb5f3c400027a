//! branchlint-core: structural validation for branching dialogue graphs.
//!
//! Feed it the nodes of a dialogue and it reports cycles, dangling
//! references, orphaned and unreachable nodes, and empty content. Cycles get
//! stable content-derived IDs so callers can mark deliberate loops.
//!
//! ```
//! use branchlint_core::{NoIntentionalCycles, ValidationRequest, validate};
//!
//! let request = ValidationRequest::from_json(
//!     r#"{"nodes":[{"id":"START","type":"dialogue","line":"Hi","next":"END"}]}"#,
//! )?;
//! let report = validate(&request.nodes, &NoIntentionalCycles);
//! assert!(report.is_clean());
//! # Ok::<(), branchlint_core::InputError>(())
//! ```

pub mod config;
pub mod error;
pub mod finding;
pub mod graph;
pub mod intentional;
pub mod model;
pub mod request;
pub mod validate;

/// # Conventions
///
/// - **Errors**: `thiserror` enums at the transport boundary, `anyhow::Result`
///   for file-backed helpers. Graph defects are findings, never errors.
/// - **Logging**: Use `tracing` macros (`info!`, `debug!`, `trace!`).
pub use config::{CheckConfig, ProjectConfig, ValidationConfig, load_project_config};
pub use error::{CycleIdError, ErrorCode, InputError};
pub use finding::{Finding, FindingDetail, FindingKind, Severity};
pub use graph::{Cycle, CycleId, Graph, find_cycles, identify};
pub use intentional::{IntentionalCycles, NoIntentionalCycles};
pub use model::{EdgeKind, Node, NodeKind};
pub use request::ValidationRequest;
pub use validate::{ValidationReport, Validator, validate};
