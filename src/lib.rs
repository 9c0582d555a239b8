//! Sparse Merkle tree engines over a fixed-depth binary address space.
//!
//! The crate implements a family of four SMT variants that trade storage
//! compactness against hash-function compatibility:
//!
//! * **Naive** — canonical pair nodes with a precomputed per-level table of
//!   zero-subtree hashes.
//! * **HashZero** — defines `Hash(0, 0) = 0`, collapsing every zero-subtree
//!   hash to a single constant and eliminating the per-level table.
//! * **SingleLeaf** — additionally stores any subtree holding exactly one
//!   non-zero leaf as a single short-circuit node.
//! * **SingleLeafEx** — further uses the leaf hash itself as the hash of a
//!   single-leaf subtree, skipping the intermediate hashing entirely, at the
//!   cost of a known non-pruning gap on removal and an LSB-first traversal.
//!
//! All traversal is iterative: writes and proofs walk the tree with an
//! explicit bit cursor over the leaf address, never with recursion, so the
//! same algorithms stay portable to environments with shallow call stacks.
//!
//! The hashing backend is injected through [`hash::TreeHasher`]; a Keccak-256
//! implementation ships with the crate. Preimages follow a bit-exact
//! normalization rule: every hex component is left-padded with `'0'` to the
//! next 64-character (32-byte) boundary before hashing.

pub mod config;
pub mod hash;
pub mod params;
pub mod proof;
pub mod store;
pub mod tree;
pub mod utils;

pub use hash::{Digest, Keccak256Hasher, Preimage, TreeHasher};
pub use params::{BitOrder, LeafBinding, TreeParams, TreeParamsBuilder, Variant};
pub use proof::{MembershipProof, SiblingMask};
pub use store::{Node, NodeStore, StoreMetrics};
pub use tree::{LeafAddress, LeafValue, SparseTree, EMPTY_LEAF_VALUE};

use core::fmt;

/// Result type used throughout the library to surface deterministic errors.
pub type SmtResult<T> = core::result::Result<T, SmtError>;

/// Error enumeration for the SMT engines.
///
/// Every failure is a deterministic function of the inputs; nothing here is
/// transient and nothing is retried. No operation partially commits: a failed
/// [`tree::SparseTree::add_leaf`] leaves the node store untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtError {
    /// Tree construction was attempted with a level count outside `[2, 256]`.
    LevelsOutOfRange { levels: u16 },
    /// A leaf address does not fit into the tree's `2^levels` address space.
    InvalidAddress { address: String, levels: u16 },
    /// The node store is missing an entry the walker expected to find. This
    /// signals a broken invariant (corruption or a bug), never a caller
    /// error, and must not be caught and retried.
    NodeNotFound { digest: String },
    /// A hash function received a preimage not aligned to 32-byte multiples.
    InvalidPreimageLength { len: usize },
    /// `compress_proof` was called on an already compressed proof.
    AlreadyCompressed,
    /// `decompress_proof` was called on a proof without a compression mask.
    AlreadyDecompressed,
    /// The compression mask population count disagrees with the number of
    /// retained siblings.
    InconsistentEncoding { mask_bits: usize, siblings: usize },
    /// An input string contained non-hexadecimal characters.
    InvalidHex { input: String },
    /// A tree description named a hash backend the crate does not ship.
    UnsupportedHash { name: String },
    /// A tree description file could not be read or parsed.
    Config { reason: String },
}

impl fmt::Display for SmtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmtError::LevelsOutOfRange { levels } => {
                write!(f, "tree level count {} outside [2, 256]", levels)
            }
            SmtError::InvalidAddress { address, levels } => {
                write!(
                    f,
                    "address {} outside the {}-level address space",
                    address, levels
                )
            }
            SmtError::NodeNotFound { digest } => {
                write!(f, "node store has no entry for {}", digest)
            }
            SmtError::InvalidPreimageLength { len } => {
                write!(f, "preimage length {} is not a multiple of 32 bytes", len)
            }
            SmtError::AlreadyCompressed => write!(f, "proof is already compressed"),
            SmtError::AlreadyDecompressed => write!(f, "proof is already decompressed"),
            SmtError::InconsistentEncoding { mask_bits, siblings } => {
                write!(
                    f,
                    "compression mask names {} siblings but {} are present",
                    mask_bits, siblings
                )
            }
            SmtError::InvalidHex { input } => write!(f, "invalid hex input {:?}", input),
            SmtError::UnsupportedHash { name } => {
                write!(f, "unsupported hash backend {:?}", name)
            }
            SmtError::Config { reason } => write!(f, "tree description error: {}", reason),
        }
    }
}

impl std::error::Error for SmtError {}
