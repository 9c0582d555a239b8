//! Keccak-256 backend.

use tiny_keccak::{Hasher, Keccak};

use super::{ensure_aligned, Digest, TreeHasher};
use crate::SmtResult;

/// Keccak-256 hasher matching the Ethereum flavour of SHA-3.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256Hasher;

impl TreeHasher for Keccak256Hasher {
    fn hash(&self, preimage: &[u8]) -> SmtResult<Digest> {
        ensure_aligned(preimage)?;
        let mut keccak = Keccak::v256();
        keccak.update(preimage);
        let mut output = [0u8; 32];
        keccak.finalize(&mut output);
        Ok(Digest::new(output))
    }
}
