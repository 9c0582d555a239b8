//! The sparse Merkle tree engine.
//!
//! One engine drives all four variants; the behavioural differences are
//! captured entirely by [`Variant`](crate::params::Variant) knobs consulted
//! at the few points where the variants disagree (zero-subtree marking,
//! short-circuit storage, bit order, leaf binding). Storage layout,
//! traversal, and proof generation are otherwise shared.
//!
//! # Update protocol
//!
//! `add_leaf` runs in three phases:
//!
//! 1. walk from the current root to the address, collecting siblings and
//!    the keys of every traversed node;
//! 2. recompute the node chain bottom-up with the new leaf hash;
//! 3. delete the traversed chain, then insert the recomputed one (plus the
//!    auxiliary node when an existing single-leaf subtree was split).
//!
//! Store entries are content keyed and reference counted, so a node whose
//! content recurs under several parents (equal values at mirror positions
//! produce this readily) is shared, and deleting one branch's traversed
//! chain leaves the other branch intact.
//!
//! Writing a leaf's current value back is a no-op on both the root and the
//! store, since the recomputed chain is byte-identical to the deleted one.
//!
//! # Removal asymmetry
//!
//! Removing a leaf writes the zero leaf hash through the same machinery.
//! For the variant where the leaf hash stands in for its whole subtree this
//! does **not** re-collapse a two-leaf subtree back into a short-circuit
//! node: the remaining leaf stays wrapped in pair nodes, and the root after
//! `add(a); add(b); remove(b)` differs from the root after `add(a)` alone
//! even though both trees hold the same data. Callers diffing roots across
//! histories must replay operations, not compare roots. The other variants
//! derive node placement from content alone and do not exhibit this.

mod types;
mod update;
mod walk;
pub(crate) mod zero;

pub use types::{LeafAddress, LeafValue, EMPTY_LEAF_VALUE};

use crate::hash::{Digest, Keccak256Hasher, Preimage, TreeHasher};
use crate::params::{LeafBinding, TreeParams, TreeParamsBuilder, Variant};
use crate::proof::{codec, MembershipProof};
use crate::store::{Node, NodeStore};
use crate::{SmtError, SmtResult};

use update::{combine, compute_updated_nodes, single_leaf_subtree_hash};
use walk::extract_siblings;
use zero::ZeroHashes;

/// Tag hashed into a leaf preimage when the leaf binds its address,
/// domain-separating leaf hashes from pair-node hashes.
const LEAF_HASH_TAG: &str = "1";

/// A sparse Merkle tree over an injected hash function.
#[derive(Debug, Clone)]
pub struct SparseTree<H: TreeHasher> {
    params: TreeParams,
    hasher: H,
    zero: ZeroHashes,
    store: NodeStore,
    root: Digest,
}

impl SparseTree<Keccak256Hasher> {
    /// An empty keccak256 tree with the given parameters.
    pub fn keccak(params: TreeParams) -> SmtResult<Self> {
        Self::with_params(params, Keccak256Hasher)
    }
}

impl<H: TreeHasher> SparseTree<H> {
    /// An empty tree with the given parameters and hasher.
    pub fn with_params(params: TreeParams, hasher: H) -> SmtResult<Self> {
        let zero = ZeroHashes::build(&params, &hasher)?;
        let root = zero.at(0);
        Ok(Self {
            params,
            hasher,
            zero,
            store: NodeStore::new(),
            root,
        })
    }

    /// An empty [`Variant::Naive`] tree.
    pub fn naive(hasher: H, levels: u16, sort_hash: bool) -> SmtResult<Self> {
        Self::of_variant(Variant::Naive, hasher, levels, sort_hash)
    }

    /// An empty [`Variant::HashZero`] tree.
    pub fn hash_zero(hasher: H, levels: u16, sort_hash: bool) -> SmtResult<Self> {
        Self::of_variant(Variant::HashZero, hasher, levels, sort_hash)
    }

    /// An empty [`Variant::SingleLeaf`] tree.
    pub fn single_leaf(hasher: H, levels: u16, sort_hash: bool) -> SmtResult<Self> {
        Self::of_variant(Variant::SingleLeaf, hasher, levels, sort_hash)
    }

    /// An empty [`Variant::SingleLeafEx`] tree.
    pub fn single_leaf_ex(hasher: H, levels: u16, sort_hash: bool) -> SmtResult<Self> {
        Self::of_variant(Variant::SingleLeafEx, hasher, levels, sort_hash)
    }

    fn of_variant(variant: Variant, hasher: H, levels: u16, sort_hash: bool) -> SmtResult<Self> {
        let params = TreeParamsBuilder::new()
            .variant(variant)
            .levels(levels)
            .sort_hash(sort_hash)
            .build()?;
        Self::with_params(params, hasher)
    }

    /// The parameters this tree was built with.
    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    /// The current root hash.
    pub fn root(&self) -> Digest {
        self.root
    }

    /// Read access to the node store, mainly for inspecting metrics and
    /// entry counts.
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// True iff `digest` marks an all-zero subtree at `level` (0 = root).
    pub fn is_zero_tree(&self, digest: &Digest, level: u16) -> bool {
        self.zero.is_zero(digest, level)
    }

    fn ensure_address(&self, address: LeafAddress) -> SmtResult<()> {
        if address.fits(self.params.levels()) {
            Ok(())
        } else {
            Err(SmtError::InvalidAddress {
                address: address.to_string(),
                levels: self.params.levels(),
            })
        }
    }

    /// Leaf hash for `value` stored at `address` under this tree's variant.
    /// The removal sentinels map to the zero digest.
    pub fn leaf_digest(&self, address: LeafAddress, value: &LeafValue) -> SmtResult<Digest> {
        if value.removes_leaf() {
            return Ok(Digest::ZERO);
        }
        let mut preimage = Preimage::new();
        match self.params.variant().leaf_binding() {
            LeafBinding::ValueOnly => {
                preimage.push_hex(value.as_hex())?;
            }
            LeafBinding::AddressValue => {
                preimage.push_hex(&address.to_hex())?;
                preimage.push_hex(value.as_hex())?;
                preimage.push_hex(LEAF_HASH_TAG)?;
            }
        }
        self.hasher.hash(preimage.as_bytes())
    }

    /// Writes `value` at `address` and returns the new leaf hash.
    ///
    /// Passing the empty string or the `"null"` sentinel removes the leaf.
    /// On any error the tree is left untouched: the address is validated and
    /// the whole walk completes before the store is modified.
    pub fn add_leaf(&mut self, address: LeafAddress, value: &LeafValue) -> SmtResult<Digest> {
        self.ensure_address(address)?;
        let leaf = self.leaf_digest(address, value)?;
        let walk = extract_siblings(
            &self.params,
            &self.zero,
            &self.hasher,
            &self.store,
            self.root,
            address,
        )?;
        let chain = compute_updated_nodes(&self.params, &self.hasher, address, leaf, &walk.siblings)?;

        for stale in &walk.visited {
            self.store.remove(stale);
        }

        let paired = walk.siblings.len();
        for (index, sibling) in walk.siblings.iter().enumerate() {
            let level = (index + 1) as u16;
            let child = chain[index + 1];
            let node = if address.bit(self.params.bit_position(level)) {
                Node::Pair {
                    left: *sibling,
                    right: child,
                }
            } else {
                Node::Pair {
                    left: child,
                    right: *sibling,
                }
            };
            self.store.insert(chain[index], node);
        }

        // A split at the very last bit produces no short-circuit records:
        // nothing ever dereferences a key at the leaf level, so entries
        // there would only accumulate as later rewrites orphan them.
        let truncated = self.params.variant().short_circuit()
            && (paired as u16) < self.params.levels();
        if truncated {
            if !leaf.is_zero() {
                self.store.insert(chain[paired], Node::Leaf { address, leaf });
            }
            if let Some(aux) = walk.aux {
                self.store.insert(
                    aux.digest,
                    Node::Leaf {
                        address: aux.address,
                        leaf: aux.leaf,
                    },
                );
            }
        }

        self.root = chain[0];
        Ok(leaf)
    }

    /// Removes the leaf at `address`. Equivalent to adding the empty value.
    pub fn remove_leaf(&mut self, address: LeafAddress) -> SmtResult<Digest> {
        self.add_leaf(address, &LeafValue::empty())
    }

    /// The leaf hash currently stored at `address`, zero when absent.
    pub fn leaf(&self, address: LeafAddress) -> SmtResult<Digest> {
        self.ensure_address(address)?;
        let walk = extract_siblings(
            &self.params,
            &self.zero,
            &self.hasher,
            &self.store,
            self.root,
            address,
        )?;
        Ok(walk.leaf)
    }

    /// Builds an uncompressed membership proof for `address` against the
    /// current root. The proof also covers absence: the leaf hash is zero
    /// for an empty slot.
    pub fn get_proof(&self, address: LeafAddress) -> SmtResult<MembershipProof> {
        self.ensure_address(address)?;
        let walk = extract_siblings(
            &self.params,
            &self.zero,
            &self.hasher,
            &self.store,
            self.root,
            address,
        )?;
        Ok(MembershipProof {
            root: self.root,
            leaf: walk.leaf,
            siblings: walk.siblings,
            mask: None,
        })
    }

    /// Checks an uncompressed proof for `address` against its embedded root.
    ///
    /// Returns `Ok(false)` for a well-formed proof that does not hash up to
    /// the root; malformed proofs (compressed, or with more siblings than
    /// the tree has levels) are errors.
    pub fn verify_proof(&self, address: LeafAddress, proof: &MembershipProof) -> SmtResult<bool> {
        self.ensure_address(address)?;
        if proof.mask.is_some() {
            return Err(SmtError::AlreadyCompressed);
        }
        let paired = proof.siblings.len() as u16;
        if paired > self.params.levels() {
            return Err(SmtError::InconsistentEncoding {
                mask_bits: self.params.levels() as usize,
                siblings: proof.siblings.len(),
            });
        }
        let mut current = proof.leaf;
        if paired < self.params.levels() {
            current =
                single_leaf_subtree_hash(&self.params, &self.hasher, address, proof.leaf, paired)?;
        }
        for level in (1..=paired).rev() {
            let sibling = &proof.siblings[(level - 1) as usize];
            current = if address.bit(self.params.bit_position(level)) {
                combine(&self.params, &self.hasher, sibling, &current)?
            } else {
                combine(&self.params, &self.hasher, &current, sibling)?
            };
        }
        Ok(current == proof.root)
    }

    /// Drops zero-subtree siblings from a proof, recording their positions
    /// in a bitmask.
    pub fn compress_proof(&self, proof: &MembershipProof) -> SmtResult<MembershipProof> {
        codec::compress(&self.zero, proof)
    }

    /// Restores the zero-subtree siblings dropped by
    /// [`SparseTree::compress_proof`].
    pub fn decompress_proof(&self, proof: &MembershipProof) -> SmtResult<MembershipProof> {
        if let Some(mask) = &proof.mask {
            if mask.levels() > self.params.levels() {
                return Err(SmtError::InconsistentEncoding {
                    mask_bits: mask.levels() as usize,
                    siblings: proof.siblings.len(),
                });
            }
        }
        codec::decompress(&self.zero, proof)
    }
}
