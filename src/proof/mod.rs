//! Membership proofs and their compressed encoding.
//!
//! A proof carries the root it was generated against, the leaf hash at the
//! queried address (zero for an absent leaf), and one sibling per level,
//! root first. Sparse paths make most siblings zero-subtree hashes, so the
//! compressed encoding drops them and records their positions in a bitmask;
//! see [`codec`] for the exact rules.

pub(crate) mod codec;

use serde::{Deserialize, Serialize};

use crate::hash::Digest;

/// A (possibly compressed) membership proof.
///
/// `mask` is `None` for the uncompressed form. In the compressed form
/// `siblings` holds only the retained digests, in level order, and `mask`
/// records which levels they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipProof {
    /// Root the proof was generated against.
    pub root: Digest,
    /// Leaf hash at the proven address, zero when the slot is empty.
    pub leaf: Digest,
    /// Sibling hashes from level 1 downwards. May be shorter than the tree
    /// depth when a short-circuit variant truncated the path.
    pub siblings: Vec<Digest>,
    /// Present iff the proof is compressed.
    pub mask: Option<SiblingMask>,
}

impl MembershipProof {
    /// True iff the proof is in compressed form.
    pub fn is_compressed(&self) -> bool {
        self.mask.is_some()
    }
}

/// Bitmask over proof levels: bit `i` is set iff the sibling at level
/// `i + 1` was retained by compression. Bits are packed least significant
/// first within each byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiblingMask {
    bits: Vec<u8>,
    levels: u16,
}

impl SiblingMask {
    pub(crate) fn with_levels(levels: u16) -> Self {
        Self {
            bits: vec![0u8; (levels as usize).div_ceil(8)],
            levels,
        }
    }

    /// Number of levels the mask covers.
    pub fn levels(&self) -> u16 {
        self.levels
    }

    /// Tests the bit for level `index + 1`.
    pub fn is_set(&self, index: u16) -> bool {
        debug_assert!(index < self.levels);
        let index = index as usize;
        (self.bits[index / 8] >> (index % 8)) & 1 == 1
    }

    pub(crate) fn set(&mut self, index: u16) {
        debug_assert!(index < self.levels);
        let index = index as usize;
        self.bits[index / 8] |= 1 << (index % 8);
    }

    /// Number of set bits, which must equal the retained sibling count.
    pub fn population(&self) -> usize {
        (0..self.levels).filter(|&i| self.is_set(i)).count()
    }

    /// The packed mask bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_bit_packing_is_lsb_first() {
        let mut mask = SiblingMask::with_levels(12);
        mask.set(0);
        mask.set(3);
        mask.set(9);
        assert_eq!(mask.as_bytes(), &[0b0000_1001, 0b0000_0010]);
        assert!(mask.is_set(0));
        assert!(!mask.is_set(1));
        assert!(mask.is_set(9));
        assert_eq!(mask.population(), 3);
    }

    #[test]
    fn proof_serde_round_trip() {
        let proof = MembershipProof {
            root: Digest::ZERO,
            leaf: Digest::ZERO,
            siblings: vec![Digest::ZERO],
            mask: None,
        };
        let json = serde_json::to_string(&proof).unwrap();
        let back: MembershipProof = serde_json::from_str(&json).unwrap();
        assert_eq!(back, proof);
    }
}
