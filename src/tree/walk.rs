//! Iterative root-to-leaf traversal.
//!
//! The walk is read only. It collects the sibling hash at every level on the
//! way down, the leaf hash at the destination, and the keys of every node it
//! traversed; the caller decides what to do with them (a proof keeps the
//! siblings, an update additionally deletes the visited chain before writing
//! the replacement).

use crate::hash::{Digest, TreeHasher};
use crate::params::TreeParams;
use crate::store::{Node, NodeStore};
use crate::tree::types::{AuxNode, LeafAddress, PathWalk};
use crate::tree::update::single_leaf_subtree_hash;
use crate::tree::zero::ZeroHashes;
use crate::{SmtError, SmtResult};

/// Walks from `root` towards `address`, collecting siblings level by level.
///
/// Levels are numbered from the root: the sibling at index `i` of the result
/// sits at level `i + 1`. Variants without short-circuit storage always
/// produce exactly `levels` siblings, padding with zero-subtree hashes once
/// an empty subtree is reached; short-circuit variants stop early and return
/// a truncated list.
pub(crate) fn extract_siblings<H: TreeHasher>(
    params: &TreeParams,
    zero: &ZeroHashes,
    hasher: &H,
    store: &NodeStore,
    root: Digest,
    address: LeafAddress,
) -> SmtResult<PathWalk> {
    let levels = params.levels();
    let short_circuit = params.variant().short_circuit();
    let mut siblings = Vec::with_capacity(levels as usize);
    let mut visited = Vec::new();
    let mut current = root;

    let mut level: u16 = 1;
    while level <= levels {
        if zero.is_zero(&current, level - 1) {
            if !short_circuit {
                for below in level..=levels {
                    siblings.push(zero.at(below));
                }
            }
            return Ok(PathWalk {
                siblings,
                leaf: Digest::ZERO,
                aux: None,
                visited,
            });
        }
        let node = store
            .get(&current)
            .cloned()
            .ok_or_else(|| SmtError::NodeNotFound {
                digest: current.to_hex(),
            })?;
        visited.push(current);
        match node {
            Node::Pair { left, right } => {
                if address.bit(params.bit_position(level)) {
                    siblings.push(left);
                    current = right;
                } else {
                    siblings.push(right);
                    current = left;
                }
                level += 1;
            }
            Node::Leaf {
                address: other,
                leaf,
            } => {
                // The node's key binds only the address bits consumed below
                // this level; the prefix bits stored in `other` may have
                // been written from another position whose subtree hash
                // coincides. Only the bound bits may be compared — the
                // prefix of whatever leaf sits here is fixed by the path
                // taken to reach it.
                if suffix_matches(params, address, other, level) {
                    return Ok(PathWalk {
                        siblings,
                        leaf,
                        aux: None,
                        visited,
                    });
                }
                return split_single_leaf(
                    params, hasher, address, other, leaf, level, siblings, visited,
                );
            }
        }
    }

    Ok(PathWalk {
        siblings,
        leaf: current,
        aux: None,
        visited,
    })
}

/// True iff `a` and `b` agree on every address bit consumed at `level` and
/// below — the bits a subtree hash at level `level - 1` binds.
fn suffix_matches(params: &TreeParams, a: LeafAddress, b: LeafAddress, level: u16) -> bool {
    (level..=params.levels()).all(|below| {
        let position = params.bit_position(below);
        a.bit(position) == b.bit(position)
    })
}

/// Continues a walk that ran into a short-circuit node for a different
/// address. The two addresses share a bit prefix down to some level; below
/// the shared prefix all siblings are empty, and at the first divergent bit
/// the stored leaf's whole subtree becomes the sibling. That subtree hash is
/// returned as an auxiliary node so the caller can re-key the displaced leaf
/// under it.
#[allow(clippy::too_many_arguments)]
fn split_single_leaf<H: TreeHasher>(
    params: &TreeParams,
    hasher: &H,
    address: LeafAddress,
    other: LeafAddress,
    other_leaf: Digest,
    start_level: u16,
    mut siblings: Vec<Digest>,
    visited: Vec<Digest>,
) -> SmtResult<PathWalk> {
    for level in start_level..=params.levels() {
        let position = params.bit_position(level);
        if address.bit(position) == other.bit(position) {
            siblings.push(Digest::ZERO);
            continue;
        }
        let digest = single_leaf_subtree_hash(params, hasher, other, other_leaf, level)?;
        siblings.push(digest);
        return Ok(PathWalk {
            siblings,
            leaf: Digest::ZERO,
            aux: Some(AuxNode {
                digest,
                address: other,
                leaf: other_leaf,
            }),
            visited,
        });
    }
    // The caller only splits after a suffix mismatch, so some bit in this
    // range must diverge; reaching this point means the store entry is
    // corrupt.
    Err(SmtError::NodeNotFound {
        digest: other_leaf.to_hex(),
    })
}
