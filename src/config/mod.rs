//! Declarative tree descriptions.
//!
//! A description is a small JSON document naming the variant, the hash
//! backend, the level count, the sort-hash flag, and an ordered list of
//! leaves to replay:
//!
//! ```json
//! {
//!   "type": "single_leaf_ex",
//!   "hash": "keccak256",
//!   "level": 4,
//!   "sortHash": false,
//!   "leaves": [
//!     { "address": 2, "value": "2" },
//!     { "address": 10, "value": "a" }
//!   ]
//! }
//! ```
//!
//! Leaf order matters: the non-pruning variant produces history-dependent
//! roots, so the leaves are replayed exactly as listed, never sorted.

use std::fs;
use std::path::Path;

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::Keccak256Hasher;
use crate::params::{TreeParamsBuilder, Variant};
use crate::tree::{LeafAddress, LeafValue, SparseTree};
use crate::{SmtError, SmtResult};

/// Hash backends a description may name.
///
/// Only keccak256 ships with the crate; the other names are recognised so a
/// description written for an external backend fails with a precise error
/// instead of a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashSelection {
    Keccak256,
    Poseidon,
}

impl fmt::Display for HashSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashSelection::Keccak256 => f.write_str("keccak256"),
            HashSelection::Poseidon => f.write_str("poseidon"),
        }
    }
}

/// One leaf to replay: an address and the value to store there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafEntry {
    pub address: LeafAddress,
    pub value: LeafValue,
}

/// A parsed tree description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDescription {
    /// Variant to instantiate.
    #[serde(rename = "type")]
    pub variant: Variant,
    /// Hash backend the description was written for.
    pub hash: HashSelection,
    /// Tree depth.
    #[serde(rename = "level")]
    pub levels: u16,
    /// Sort sibling pairs numerically before hashing.
    #[serde(rename = "sortHash", default)]
    pub sort_hash: bool,
    /// Leaves to replay, in order.
    #[serde(default)]
    pub leaves: Vec<LeafEntry>,
}

impl TreeDescription {
    /// Parses a description from JSON text.
    pub fn from_json(text: &str) -> SmtResult<Self> {
        serde_json::from_str(text).map_err(|e| SmtError::Config {
            reason: e.to_string(),
        })
    }

    /// Reads and parses a description file.
    pub fn from_path(path: &Path) -> SmtResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| SmtError::Config {
            reason: format!("{}: {}", path.display(), e),
        })?;
        Self::from_json(&text)
    }

    /// Instantiates the described tree and replays its leaves.
    pub fn build(&self) -> SmtResult<SparseTree<Keccak256Hasher>> {
        if self.hash != HashSelection::Keccak256 {
            return Err(SmtError::UnsupportedHash {
                name: self.hash.to_string(),
            });
        }
        let params = TreeParamsBuilder::new()
            .variant(self.variant)
            .levels(self.levels)
            .sort_hash(self.sort_hash)
            .build()?;
        let mut tree = SparseTree::keccak(params)?;
        for entry in &self.leaves {
            tree.add_leaf(entry.address, &entry.value)?;
        }
        Ok(tree)
    }
}
