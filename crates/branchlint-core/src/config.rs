use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory (under a project root) holding branchlint state.
pub const STATE_DIR: &str = ".branchlint";

/// Conventional root node of a dialogue.
pub const DEFAULT_ROOT: &str = "START";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Preferred root node ID. Falls back to the first node when absent.
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default)]
    pub checks: CheckConfig,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            checks: CheckConfig::default(),
        }
    }
}

impl ValidationConfig {
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }
}

/// Toggles for the warning-level checks. Error-level checks and cycle
/// detection always run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    #[serde(default = "default_true")]
    pub orphans: bool,
    #[serde(default = "default_true")]
    pub unreachable: bool,
    #[serde(default = "default_true")]
    pub empty_nodes: bool,
    #[serde(default = "default_true")]
    pub missing_tests: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            orphans: default_true(),
            unreachable: default_true(),
            empty_nodes: default_true(),
            missing_tests: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_root() -> String {
    DEFAULT_ROOT.to_string()
}

#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(STATE_DIR).join("config.toml")
}

/// Load `.branchlint/config.toml`, or defaults when the file is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_config_path(project_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}
