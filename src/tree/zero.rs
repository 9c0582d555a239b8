//! Zero-subtree detection.
//!
//! The naive variant gives every level its own all-zero-subtree hash,
//! derived by repeated self-hashing of the empty leaf; matching a digest
//! against "zero at level `i`" therefore needs the level. The other variants
//! declare `Hash(0, 0) = 0`, collapsing the whole table into the single
//! all-zero constant and making the check level independent — the
//! simplification that makes short-circuit storage tractable.

use crate::hash::{Digest, Preimage, TreeHasher};
use crate::params::TreeParams;
use crate::SmtResult;

/// Per-variant zero-subtree hashes, indexed root (0) to leaf (`levels`).
#[derive(Debug, Clone)]
pub(crate) enum ZeroHashes {
    /// One constant for every level.
    Constant,
    /// One digest per level, root first.
    PerLevel(Vec<Digest>),
}

impl ZeroHashes {
    /// Builds the table for the given parameters. For the constant-zero
    /// variants this allocates nothing.
    pub(crate) fn build<H: TreeHasher>(params: &TreeParams, hasher: &H) -> SmtResult<Self> {
        if params.variant().constant_zero() {
            return Ok(ZeroHashes::Constant);
        }
        let levels = params.levels() as usize;
        let mut table = Vec::with_capacity(levels + 1);
        let mut current = Digest::ZERO;
        table.push(current);
        for _ in 0..levels {
            let mut preimage = Preimage::new();
            preimage.push_digest(&current);
            preimage.push_digest(&current);
            current = hasher.hash(preimage.as_bytes())?;
            table.push(current);
        }
        table.reverse();
        Ok(ZeroHashes::PerLevel(table))
    }

    /// The zero-subtree hash at `level` (0 = root).
    pub(crate) fn at(&self, level: u16) -> Digest {
        match self {
            ZeroHashes::Constant => Digest::ZERO,
            ZeroHashes::PerLevel(table) => {
                debug_assert!((level as usize) < table.len());
                table[level as usize]
            }
        }
    }

    /// True iff `digest` marks an all-zero subtree at `level`.
    pub(crate) fn is_zero(&self, digest: &Digest, level: u16) -> bool {
        *digest == self.at(level)
    }
}
