//! Hash recomputation along an updated path.
//!
//! Given the siblings collected by a walk and the new leaf hash, these
//! routines rebuild the node chain from the leaf back up to the root. The
//! same combining rules drive proof verification, so the two can never
//! drift apart.

use crate::hash::{Digest, Preimage, TreeHasher};
use crate::params::TreeParams;
use crate::tree::types::LeafAddress;
use crate::SmtResult;

/// Hashes a `(left, right)` child pair into the parent digest.
///
/// In sort-hash mode the numerically smaller digest always goes first. For
/// the constant-zero variants a pair of empty subtrees collapses to the zero
/// digest without invoking the hash at all.
pub(crate) fn combine<H: TreeHasher>(
    params: &TreeParams,
    hasher: &H,
    left: &Digest,
    right: &Digest,
) -> SmtResult<Digest> {
    let (first, second) = if params.sort_hash() && right < left {
        (right, left)
    } else {
        (left, right)
    };
    if params.variant().constant_zero() && first.is_zero() && second.is_zero() {
        return Ok(Digest::ZERO);
    }
    let mut preimage = Preimage::new();
    preimage.push_digest(first);
    preimage.push_digest(second);
    hasher.hash(preimage.as_bytes())
}

/// Hash of the subtree rooted at `target_level` that contains `leaf` at
/// `address` and nothing else.
///
/// Computed bottom-up by pairing the leaf with empty siblings, except for
/// the variant where the leaf hash already stands in for the whole subtree.
pub(crate) fn single_leaf_subtree_hash<H: TreeHasher>(
    params: &TreeParams,
    hasher: &H,
    address: LeafAddress,
    leaf: Digest,
    target_level: u16,
) -> SmtResult<Digest> {
    if params.variant().leaf_is_subtree_hash() {
        return Ok(leaf);
    }
    let mut current = leaf;
    let mut level = params.levels();
    while level > target_level {
        current = if address.bit(params.bit_position(level)) {
            combine(params, hasher, &Digest::ZERO, &current)?
        } else {
            combine(params, hasher, &current, &Digest::ZERO)?
        };
        level -= 1;
    }
    Ok(current)
}

/// Recomputes the node chain for a path whose leaf hash changed.
///
/// `siblings` is the (possibly truncated) list collected by the walk. The
/// result is ordered root first: entry `i` is the new node hash at level `i`,
/// ending with the leaf hash itself. When the walk was truncated the chain
/// first climbs through the single-leaf subtree before pairing with the
/// collected siblings.
pub(crate) fn compute_updated_nodes<H: TreeHasher>(
    params: &TreeParams,
    hasher: &H,
    address: LeafAddress,
    leaf: Digest,
    siblings: &[Digest],
) -> SmtResult<Vec<Digest>> {
    let paired_levels = siblings.len() as u16;
    let mut chain = Vec::with_capacity(siblings.len() + 2);
    chain.push(leaf);
    let mut current = leaf;
    if paired_levels < params.levels() {
        current = single_leaf_subtree_hash(params, hasher, address, leaf, paired_levels)?;
        if current != leaf {
            chain.push(current);
        }
    }
    for level in (1..=paired_levels).rev() {
        let sibling = &siblings[(level - 1) as usize];
        current = if address.bit(params.bit_position(level)) {
            combine(params, hasher, sibling, &current)?
        } else {
            combine(params, hasher, &current, sibling)?
        };
        chain.push(current);
    }
    chain.reverse();
    Ok(chain)
}
