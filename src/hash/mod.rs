//! Hashing seam for the SMT engines.
//!
//! The engines never hash directly; they assemble a [`Preimage`] out of hex
//! components (each left-padded to a 32-byte boundary) and hand the resulting
//! bytes to an injected [`TreeHasher`]. The crate ships a Keccak-256 backend;
//! anything else (for example a Poseidon implementation) is supplied by the
//! caller through the same trait.

mod keccak;

pub use keccak::Keccak256Hasher;

use core::fmt;
use core::str::FromStr;

use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::utils::hex::{ensure_hex, normalize};
use crate::{SmtError, SmtResult};

/// Canonical 32-byte digest used for node hashes, roots and leaf hashes.
///
/// Ordering is numeric big-endian, which is what sort-hash mode compares
/// before concatenating a sibling pair.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// The all-zero digest. Doubles as the empty-leaf marker and, for the
    /// constant-zero variants, as the hash of any all-zero subtree.
    pub const ZERO: Digest = Digest([0u8; 32]);

    /// Wraps raw digest bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// True iff every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Lowercase 64-character hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a digest from up to 64 hex characters, left-padding short
    /// input with zeros.
    pub fn from_hex(input: &str) -> SmtResult<Self> {
        ensure_hex(input)?;
        if input.len() > 64 {
            return Err(SmtError::InvalidHex {
                input: input.to_string(),
            });
        }
        let padded = format!("{:0>64}", input.to_ascii_lowercase());
        let raw = hex::decode(&padded).map_err(|_| SmtError::InvalidHex {
            input: input.to_string(),
        })?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest(0x{})", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = SmtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

struct DigestVisitor;

impl Visitor<'_> for DigestVisitor {
    type Value = Digest;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a hex-encoded 32-byte digest")
    }

    fn visit_str<E: DeError>(self, value: &str) -> Result<Digest, E> {
        Digest::from_hex(value).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(DigestVisitor)
    }
}

/// Incremental preimage builder enforcing the normalization rule.
///
/// Components are appended as hex strings; each is left-padded with `'0'` to
/// the next 64-character boundary before being decoded into bytes. The empty
/// string contributes nothing. The accumulated byte string is therefore
/// always a whole number of 32-byte blocks.
#[derive(Debug, Clone, Default)]
pub struct Preimage {
    bytes: Vec<u8>,
}

impl Preimage {
    /// Starts an empty preimage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hex component, padding it to the next 32-byte boundary.
    pub fn push_hex(&mut self, component: &str) -> SmtResult<()> {
        ensure_hex(component)?;
        let padded = normalize(component);
        let raw = hex::decode(&padded).map_err(|_| SmtError::InvalidHex {
            input: component.to_string(),
        })?;
        self.bytes.extend_from_slice(&raw);
        Ok(())
    }

    /// Appends a digest as one 32-byte block.
    pub fn push_digest(&mut self, digest: &Digest) {
        self.bytes.extend_from_slice(digest.as_bytes());
    }

    /// Returns the accumulated bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Hash abstraction injected into every tree engine.
///
/// Implementations must reject preimages whose length is not a multiple of
/// 32 bytes (see [`ensure_aligned`]); the empty preimage is legal and hashes
/// like any other input.
pub trait TreeHasher {
    /// Computes the digest of an already normalized preimage.
    fn hash(&self, preimage: &[u8]) -> SmtResult<Digest>;
}

/// Checks the 32-byte alignment rule shared by all backends.
pub fn ensure_aligned(preimage: &[u8]) -> SmtResult<()> {
    if preimage.len() % 32 == 0 {
        Ok(())
    } else {
        Err(SmtError::InvalidPreimageLength {
            len: preimage.len(),
        })
    }
}
