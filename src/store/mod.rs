//! Hash-keyed node storage.
//!
//! Every stored node is keyed by its own hash (or, for short-circuit nodes,
//! by the hash standing in for its subtree), so nodes are immutable once
//! inserted: an update never rewrites a node in place, it deletes the stale
//! chain and inserts a fresh one.
//!
//! Keys are content derived, so identical subtree content occurring under
//! several parents maps to one entry. Entries are therefore reference
//! counted: every insert of an existing key adds a reference, and a remove
//! drops the entry only when the last reference goes. Without the count, one
//! branch's update would delete a node another branch still hangs off.
//!
//! Two encodings coexist, discriminated by a tagged union rather than by
//! entry count. On the wire a pair node serialises as two hex strings and a
//! short-circuit node as three, the trailing `"1"` being the domain
//! separation tag of the original format.

use std::cell::Cell;
use std::collections::HashMap;

use core::fmt;

use serde::de::{Error as DeError, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hash::Digest;
use crate::tree::LeafAddress;

/// Tag appended to the wire encoding of a short-circuit node.
const LEAF_NODE_TAG: &str = "1";

/// A stored tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Interior node holding the hashes of its two children.
    Pair {
        /// Hash of the left child subtree.
        left: Digest,
        /// Hash of the right child subtree.
        right: Digest,
    },
    /// Short-circuit node standing in for a whole subtree that contains
    /// exactly one non-zero leaf.
    Leaf {
        /// Full address of the single leaf.
        address: LeafAddress,
        /// The leaf hash.
        leaf: Digest,
    },
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Pair { left, right } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(&left.to_hex())?;
                seq.serialize_element(&right.to_hex())?;
                seq.end()
            }
            Node::Leaf { address, leaf } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element(&address.to_hex())?;
                seq.serialize_element(&leaf.to_hex())?;
                seq.serialize_element(LEAF_NODE_TAG)?;
                seq.end()
            }
        }
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a node encoded as two or three hex strings")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut entries: Vec<String> = Vec::with_capacity(3);
        while let Some(entry) = seq.next_element::<String>()? {
            if entries.len() == 3 {
                return Err(A::Error::custom("node encoding has more than three entries"));
            }
            entries.push(entry);
        }
        match entries.len() {
            2 => {
                let left = Digest::from_hex(&entries[0])
                    .map_err(|e| A::Error::custom(e.to_string()))?;
                let right = Digest::from_hex(&entries[1])
                    .map_err(|e| A::Error::custom(e.to_string()))?;
                Ok(Node::Pair { left, right })
            }
            3 => {
                if entries[2] != LEAF_NODE_TAG {
                    return Err(A::Error::custom("short-circuit node missing its tag"));
                }
                let address = LeafAddress::from_hex(&entries[0])
                    .map_err(|e| A::Error::custom(e.to_string()))?;
                let leaf = Digest::from_hex(&entries[1])
                    .map_err(|e| A::Error::custom(e.to_string()))?;
                Ok(Node::Leaf { address, leaf })
            }
            n => Err(A::Error::custom(format!(
                "node encoding has {} entries, expected 2 or 3",
                n
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(NodeVisitor)
    }
}

/// Deterministic operation counters collected by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreMetrics {
    /// Number of lookups, hits and misses alike.
    pub reads: u64,
    /// Number of inserted entries (ZERO-keyed skips not counted).
    pub writes: u64,
    /// Number of removed entries.
    pub deletes: u64,
}

#[derive(Debug, Clone)]
struct StoreEntry {
    node: Node,
    refs: u64,
}

/// In-memory node store mapping node hashes to their encodings.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    nodes: HashMap<Digest, StoreEntry>,
    reads: Cell<u64>,
    writes: u64,
    deletes: u64,
}

impl NodeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a node by its hash.
    pub fn get(&self, key: &Digest) -> Option<&Node> {
        self.reads.set(self.reads.get() + 1);
        self.nodes.get(key).map(|entry| &entry.node)
    }

    /// Inserts a node under its hash, or adds a reference when the key is
    /// already present.
    ///
    /// An all-zero key is silently skipped: the zero digest marks an absent
    /// subtree, so an entry under it would be indistinguishable from absence
    /// and would only waste space. On a key collision the existing content
    /// is kept; the key binds everything a reader is allowed to consult, so
    /// colliding contents are interchangeable.
    pub(crate) fn insert(&mut self, key: Digest, node: Node) {
        if key.is_zero() {
            return;
        }
        self.writes += 1;
        self.nodes
            .entry(key)
            .and_modify(|entry| entry.refs += 1)
            .or_insert(StoreEntry { node, refs: 1 });
    }

    /// Drops one reference to a node, returning its content. The entry
    /// itself disappears only when no references remain.
    pub(crate) fn remove(&mut self, key: &Digest) -> Option<Node> {
        match self.nodes.get_mut(key) {
            None => return None,
            Some(entry) if entry.refs > 1 => {
                entry.refs -= 1;
                self.deletes += 1;
                return Some(entry.node.clone());
            }
            Some(_) => {}
        }
        self.deletes += 1;
        self.nodes.remove(key).map(|entry| entry.node)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when an entry exists for `key` (counted as a read).
    pub fn contains(&self, key: &Digest) -> bool {
        self.get(key).is_some()
    }

    /// Returns the operation counters accumulated so far.
    pub fn metrics(&self) -> StoreMetrics {
        StoreMetrics {
            reads: self.reads.get(),
            writes: self.writes,
            deletes: self.deletes,
        }
    }
}
