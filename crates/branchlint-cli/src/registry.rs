//! On-disk intentional-cycle registry.
//!
//! A JSON object mapping cycle IDs to `true`, stored at
//! `.branchlint/intentional.json` under the project root. The engine only
//! ever sees it through [`IntentionalCycles`]; reading and writing the file is
//! the CLI's job.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use branchlint_core::config::STATE_DIR;
use branchlint_core::error::ErrorCode;
use branchlint_core::{CycleId, IntentionalCycles};
use tracing::debug;

pub const REGISTRY_FILE: &str = "intentional.json";

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RegistryError {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::Parse { .. } => ErrorCode::RegistryReadFailed,
            Self::Write { .. } => ErrorCode::RegistryWriteFailed,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    path: PathBuf,
    entries: BTreeMap<CycleId, bool>,
}

impl Registry {
    pub fn default_path(project_root: &Path) -> PathBuf {
        project_root.join(STATE_DIR).join(REGISTRY_FILE)
    }

    /// Load the registry at `path`. A missing file is an empty registry.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let entries = match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => {
                serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(RegistryError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        debug!(path = %path.display(), entries = entries.len(), "loaded intentional registry");
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Write the registry back, via a temp file and rename.
    pub fn save(&self) -> Result<(), RegistryError> {
        let write_err = |source: io::Error| RegistryError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut content = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| write_err(io::Error::other(e)))?;
        content.push('\n');

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "saved intentional registry");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mark a cycle intentional. Returns `false` if it already was.
    pub fn mark(&mut self, id: CycleId) -> bool {
        self.entries.insert(id, true) != Some(true)
    }

    /// Forget a cycle. Returns `false` if it was not marked.
    pub fn unmark(&mut self, id: &CycleId) -> bool {
        self.entries.remove(id) == Some(true)
    }

    /// Marked cycle IDs in sorted order.
    pub fn marked(&self) -> impl Iterator<Item = &CycleId> + '_ {
        self.entries
            .iter()
            .filter(|(_, intentional)| **intentional)
            .map(|(id, _)| id)
    }
}

impl IntentionalCycles for Registry {
    fn is_intentional(&self, id: &CycleId) -> bool {
        self.entries.is_intentional(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchlint_core::graph::identify_nodes;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = Registry::load(&Registry::default_path(dir.path())).expect("load");
        assert_eq!(registry.marked().count(), 0);
    }

    #[test]
    fn mark_save_load_unmark() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = Registry::default_path(dir.path());
        let id = identify_nodes(["A", "B"]);

        let mut registry = Registry::load(&path).expect("load");
        assert!(registry.mark(id.clone()));
        assert!(!registry.mark(id.clone()));
        registry.save().expect("save");

        let mut reloaded = Registry::load(&path).expect("reload");
        assert!(reloaded.is_intentional(&id));
        assert_eq!(reloaded.marked().collect::<Vec<_>>(), vec![&id]);

        assert!(reloaded.unmark(&id));
        assert!(!reloaded.unmark(&id));
        assert!(!reloaded.is_intentional(&id));
    }

    #[test]
    fn false_entries_are_not_marked() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("intentional.json");
        let id = identify_nodes(["LOOP"]);
        fs::write(&path, format!(r#"{{"{id}": false}}"#)).expect("write");

        let registry = Registry::load(&path).expect("load");
        assert!(!registry.is_intentional(&id));
        assert_eq!(registry.marked().count(), 0);
    }

    #[test]
    fn malformed_ids_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("intentional.json");
        fs::write(&path, r#"{"not-a-cycle": true}"#).expect("write");

        let err = Registry::load(&path).expect_err("should fail");
        assert_eq!(err.code(), ErrorCode::RegistryReadFailed);
    }
}
