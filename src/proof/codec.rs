//! Proof compression.
//!
//! Compression is lossless because the dropped siblings are exactly the
//! zero-subtree hashes, which the tree parameters determine: the verifier
//! can regenerate them from the level alone. The mask length is taken from
//! the sibling count at compression time, so truncated short-circuit proofs
//! compress just as well as full-depth ones.

use crate::proof::{MembershipProof, SiblingMask};
use crate::tree::zero::ZeroHashes;
use crate::{SmtError, SmtResult};

/// Drops zero-subtree siblings and records the retained levels in a mask.
pub(crate) fn compress(
    zero: &ZeroHashes,
    proof: &MembershipProof,
) -> SmtResult<MembershipProof> {
    if proof.mask.is_some() {
        return Err(SmtError::AlreadyCompressed);
    }
    let mut mask = SiblingMask::with_levels(proof.siblings.len() as u16);
    let mut kept = Vec::new();
    for (index, sibling) in proof.siblings.iter().enumerate() {
        let level = (index + 1) as u16;
        if !zero.is_zero(sibling, level) {
            mask.set(index as u16);
            kept.push(*sibling);
        }
    }
    Ok(MembershipProof {
        root: proof.root,
        leaf: proof.leaf,
        siblings: kept,
        mask: Some(mask),
    })
}

/// Reinserts the zero-subtree siblings a compressed proof dropped.
pub(crate) fn decompress(
    zero: &ZeroHashes,
    proof: &MembershipProof,
) -> SmtResult<MembershipProof> {
    let mask = proof.mask.as_ref().ok_or(SmtError::AlreadyDecompressed)?;
    if mask.population() != proof.siblings.len() {
        return Err(SmtError::InconsistentEncoding {
            mask_bits: mask.population(),
            siblings: proof.siblings.len(),
        });
    }
    let mut retained = proof.siblings.iter();
    let mut siblings = Vec::with_capacity(mask.levels() as usize);
    for index in 0..mask.levels() {
        if mask.is_set(index) {
            // population() == len() was checked above.
            match retained.next() {
                Some(sibling) => siblings.push(*sibling),
                None => {
                    return Err(SmtError::InconsistentEncoding {
                        mask_bits: mask.population(),
                        siblings: proof.siblings.len(),
                    })
                }
            }
        } else {
            siblings.push(zero.at(index + 1));
        }
    }
    Ok(MembershipProof {
        root: proof.root,
        leaf: proof.leaf,
        siblings,
        mask: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{Digest, Keccak256Hasher};
    use crate::params::{TreeParamsBuilder, Variant};

    fn digest(byte: u8) -> Digest {
        let mut bytes = [0u8; 32];
        bytes[31] = byte;
        Digest::new(bytes)
    }

    fn constant_zero() -> ZeroHashes {
        let params = TreeParamsBuilder::new()
            .variant(Variant::HashZero)
            .levels(4)
            .build()
            .unwrap();
        ZeroHashes::build(&params, &Keccak256Hasher).unwrap()
    }

    fn proof(siblings: Vec<Digest>) -> MembershipProof {
        MembershipProof {
            root: digest(9),
            leaf: digest(8),
            siblings,
            mask: None,
        }
    }

    #[test]
    fn round_trip_restores_zero_siblings() {
        let zero = constant_zero();
        let original = proof(vec![digest(1), Digest::ZERO, digest(3), Digest::ZERO]);
        let compressed = compress(&zero, &original).unwrap();
        assert_eq!(compressed.siblings.len(), 2);
        let mask = compressed.mask.as_ref().unwrap();
        assert!(mask.is_set(0));
        assert!(!mask.is_set(1));
        assert!(mask.is_set(2));
        let back = decompress(&zero, &compressed).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn per_level_zero_hashes_are_recognised() {
        let params = TreeParamsBuilder::new()
            .variant(Variant::Naive)
            .levels(4)
            .build()
            .unwrap();
        let zero = ZeroHashes::build(&params, &Keccak256Hasher).unwrap();
        let original = proof(vec![zero.at(1), digest(2), zero.at(3), zero.at(4)]);
        let compressed = compress(&zero, &original).unwrap();
        assert_eq!(compressed.siblings, vec![digest(2)]);
        assert_eq!(decompress(&zero, &compressed).unwrap(), original);
    }

    #[test]
    fn double_compress_rejected() {
        let zero = constant_zero();
        let compressed = compress(&zero, &proof(vec![digest(1)])).unwrap();
        assert_eq!(
            compress(&zero, &compressed).unwrap_err(),
            SmtError::AlreadyCompressed
        );
    }

    #[test]
    fn double_decompress_rejected() {
        let zero = constant_zero();
        let plain = proof(vec![digest(1)]);
        assert_eq!(
            decompress(&zero, &plain).unwrap_err(),
            SmtError::AlreadyDecompressed
        );
    }

    #[test]
    fn population_mismatch_rejected() {
        let zero = constant_zero();
        let mut compressed = compress(&zero, &proof(vec![digest(1), digest(2)])).unwrap();
        compressed.siblings.pop();
        assert!(matches!(
            decompress(&zero, &compressed).unwrap_err(),
            SmtError::InconsistentEncoding { .. }
        ));
    }
}
