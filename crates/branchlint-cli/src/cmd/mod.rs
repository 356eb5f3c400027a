pub mod completions;
pub mod cycles;
pub mod intentional;
pub mod validate;

use std::path::{Path, PathBuf};

use crate::registry::Registry;

/// The registry file to use: `--registry` if given, else the project default.
pub fn registry_path(project_root: &Path, flag: Option<&Path>) -> PathBuf {
    flag.map_or_else(|| Registry::default_path(project_root), Path::to_path_buf)
}
