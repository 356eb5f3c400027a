use std::fmt;

/// Machine-readable error codes for callers that branch on failures.
///
/// Structural problems in a dialogue graph are never errors: they are
/// reported as findings. These codes cover the transport boundary and the
/// tooling around the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidRequest,
    ConfigParseError,
    InputReadFailed,
    InvalidCycleId,
    RegistryReadFailed,
    RegistryWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidRequest => "E1001",
            Self::ConfigParseError => "E1002",
            Self::InputReadFailed => "E1003",
            Self::InvalidCycleId => "E2001",
            Self::RegistryReadFailed => "E3001",
            Self::RegistryWriteFailed => "E3002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Malformed validation request",
            Self::ConfigParseError => "Config file parse error",
            Self::InputReadFailed => "Could not read graph input",
            Self::InvalidCycleId => "Invalid cycle ID",
            Self::RegistryReadFailed => "Intentional-cycle registry unreadable",
            Self::RegistryWriteFailed => "Intentional-cycle registry write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidRequest => {
                Some("Send a JSON object with a `nodes` array, or a bare array of nodes.")
            }
            Self::ConfigParseError => Some("Fix syntax in .branchlint/config.toml and retry."),
            Self::InputReadFailed => Some("Check the file path, or pipe the graph on stdin."),
            Self::InvalidCycleId => Some("Cycle IDs look like cycle_0123456789abcdef."),
            Self::RegistryReadFailed => {
                Some("Fix or delete .branchlint/intentional.json and mark cycles again.")
            }
            Self::RegistryWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A request payload that could not be turned into nodes.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("request is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("request does not match the node schema: {0}")]
    Schema(#[source] serde_json::Error),

    #[error("request must be a JSON object with `nodes` or an array of nodes, found {found}")]
    UnexpectedShape { found: &'static str },
}

impl InputError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidRequest
    }
}

/// A string that is not a well-formed cycle identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cycle id '{value}': expected `cycle_` followed by 16 lowercase hex digits")]
pub struct CycleIdError {
    pub value: String,
}

impl CycleIdError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidCycleId
    }
}
