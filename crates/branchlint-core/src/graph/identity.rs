//! Content-addressed cycle identifiers.
//!
//! A cycle ID depends only on the cycle's node set: the member IDs are
//! sorted, joined with [`SEPARATOR`], hashed with SHA-256, and the first
//! 16 hex digits are prefixed with `cycle_`. Rotation, discovery order and
//! the input order of nodes never change the result.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::cycles::Cycle;
use crate::error::CycleIdError;

pub const PREFIX: &str = "cycle_";
pub const SEPARATOR: &str = "|";
const HEX_DIGITS: usize = 16;

/// A validated `cycle_<16 hex>` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CycleId(String);

impl CycleId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_well_formed(value: &str) -> bool {
        value.strip_prefix(PREFIX).is_some_and(|hex| {
            hex.len() == HEX_DIGITS
                && hex
                    .bytes()
                    .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        })
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CycleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CycleId {
    type Err = CycleIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl TryFrom<String> for CycleId {
    type Error = CycleIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Self::is_well_formed(&value) {
            Ok(Self(value))
        } else {
            Err(CycleIdError { value })
        }
    }
}

impl From<CycleId> for String {
    fn from(id: CycleId) -> Self {
        id.0
    }
}

/// Identity of a detected cycle.
#[must_use]
pub fn identify(cycle: &Cycle) -> CycleId {
    identify_nodes(cycle.path.iter().map(String::as_str))
}

/// Identity of an arbitrary node set. Order and repeats are irrelevant.
#[must_use]
pub fn identify_nodes<'a>(nodes: impl IntoIterator<Item = &'a str>) -> CycleId {
    let mut ids: Vec<&str> = nodes.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let canonical = ids.join(SEPARATOR);
    let digest = format!("{:x}", Sha256::digest(canonical.as_bytes()));

    CycleId(format!("{PREFIX}{}", &digest[..HEX_DIGITS]))
}
