use core::fmt;
use core::str::FromStr;

use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hash::Digest;
use crate::utils::hex::ensure_hex;
use crate::{SmtError, SmtResult};

/// Hex encoding of the ASCII string `"null"` — the sentinel leaf value that
/// removes a leaf when passed to `add_leaf`. The empty string is treated the
/// same way.
pub const EMPTY_LEAF_VALUE: &str = "6e756c6c";

/// A leaf address: an unsigned 256-bit integer, stored big-endian.
///
/// Every address must fit into the tree's `[0, 2^levels)` range; the engine
/// validates this before touching any state.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LeafAddress([u8; 32]);

impl LeafAddress {
    /// Wraps raw big-endian bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the big-endian bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parses an address from up to 64 hex characters.
    pub fn from_hex(input: &str) -> SmtResult<Self> {
        Ok(Self(*Digest::from_hex(input)?.as_bytes()))
    }

    /// Lowercase 64-character hex encoding, as used in hash preimages and in
    /// the short-circuit node encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Tests the bit at `position`, where position 0 is the least
    /// significant bit.
    pub fn bit(&self, position: usize) -> bool {
        debug_assert!(position < 256);
        let byte = self.0[31 - position / 8];
        (byte >> (position % 8)) & 1 == 1
    }

    /// True iff the address lies in `[0, 2^levels)`.
    pub fn fits(&self, levels: u16) -> bool {
        (levels as usize..256).all(|position| !self.bit(position))
    }
}

impl From<u64> for LeafAddress {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl fmt::Display for LeafAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        let trimmed = hex.trim_start_matches('0');
        write!(f, "0x{}", if trimmed.is_empty() { "0" } else { trimmed })
    }
}

impl fmt::Debug for LeafAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LeafAddress({})", self)
    }
}

impl FromStr for LeafAddress {
    type Err = SmtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for LeafAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

struct AddressVisitor;

impl Visitor<'_> for AddressVisitor {
    type Value = LeafAddress;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a hex-encoded 256-bit address")
    }

    fn visit_str<E: DeError>(self, value: &str) -> Result<LeafAddress, E> {
        LeafAddress::from_hex(value).map_err(|e| E::custom(e.to_string()))
    }

    fn visit_u64<E: DeError>(self, value: u64) -> Result<LeafAddress, E> {
        Ok(LeafAddress::from(value))
    }
}

impl<'de> Deserialize<'de> for LeafAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AddressVisitor)
    }
}

/// A leaf value: an arbitrary-length hex string.
///
/// Values are canonicalized to lowercase on construction and left-padded to
/// a 32-byte boundary only when they enter a hash preimage, so `"2"` and
/// `"02"` denote different strings but hash identically.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LeafValue(String);

impl LeafValue {
    /// Validates and canonicalizes a hex value. A leading `0x` is accepted
    /// and stripped.
    pub fn new(input: &str) -> SmtResult<Self> {
        let body = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .unwrap_or(input);
        ensure_hex(body)?;
        Ok(Self(body.to_ascii_lowercase()))
    }

    /// The empty value, representing "no value".
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Returns the canonical hex text.
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// True when adding this value removes the leaf: either the empty
    /// string or the `"null"` sentinel.
    pub fn removes_leaf(&self) -> bool {
        self.0.is_empty() || self.0 == EMPTY_LEAF_VALUE
    }
}

impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LeafValue({:?})", self.0)
    }
}

impl Serialize for LeafValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct ValueVisitor;

impl Visitor<'_> for ValueVisitor {
    type Value = LeafValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a hex-encoded leaf value")
    }

    fn visit_str<E: DeError>(self, value: &str) -> Result<LeafValue, E> {
        LeafValue::new(value).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for LeafValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(ValueVisitor)
    }
}

/// Auxiliary subtree produced when a short-circuit node splits: the leaf
/// that was already present gets rehashed into its own single-leaf subtree
/// at the divergence level, and that node must be stored alongside the new
/// chain so the displaced leaf stays provable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AuxNode {
    /// Subtree hash the auxiliary node is keyed by.
    pub digest: Digest,
    /// Full address of the displaced leaf.
    pub address: LeafAddress,
    /// Leaf hash of the displaced leaf.
    pub leaf: Digest,
}

/// Result of a root-to-leaf walk.
#[derive(Debug, Clone)]
pub(crate) struct PathWalk {
    /// Sibling hashes from level 1 (child of root) downwards. Exactly
    /// `levels` entries for the full-chain variants; possibly fewer when a
    /// short-circuit truncated the walk.
    pub siblings: Vec<Digest>,
    /// Leaf hash found at the queried address (ZERO when absent).
    pub leaf: Digest,
    /// Auxiliary node produced by a short-circuit split, if any.
    pub aux: Option<AuxNode>,
    /// Keys of every pair/short-circuit node traversed, in visit order.
    /// These become stale the moment an ancestor hash changes and are
    /// removed by `add_leaf` before the new chain is inserted.
    pub visited: Vec<Digest>,
}
