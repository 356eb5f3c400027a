//! Reading graph requests from files or stdin.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use branchlint_core::ValidationRequest;
use tracing::debug;

/// Read a request from `path`, or from stdin when `path` is `None` or `-`.
pub fn read_request(path: Option<&Path>) -> Result<ValidationRequest> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file =
                File::open(path).with_context(|| format!("Failed to read {}", path.display()))?;
            debug!(path = %path.display(), "reading graph from file");
            ValidationRequest::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse {}", path.display()))
        }
        _ => {
            debug!("reading graph from stdin");
            ValidationRequest::from_reader(io::stdin().lock())
                .context("Failed to parse graph from stdin")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("graph.json");
        std::fs::write(&path, r#"[{"id":"START","type":"end"}]"#).expect("write");

        let request = read_request(Some(&path)).expect("read");
        assert_eq!(request.nodes.len(), 1);
    }

    #[test]
    fn missing_file_names_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.json");
        let err = read_request(Some(&path)).expect_err("should fail");
        assert!(format!("{err}").contains("absent.json"));
    }
}
