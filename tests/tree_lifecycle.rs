//! End-to-end engine behaviour: construction bounds, zero-tree queries,
//! store bookkeeping and dense population.

use smtree::{
    Digest, Keccak256Hasher, LeafAddress, LeafValue, SmtError, SparseTree, TreeParamsBuilder,
    Variant,
};

fn value(hex: &str) -> LeafValue {
    LeafValue::new(hex).unwrap()
}

#[test]
fn construction_rejects_out_of_range_depths() {
    for levels in [0u16, 1, 257] {
        assert_eq!(
            SparseTree::hash_zero(Keccak256Hasher, levels, false).unwrap_err(),
            SmtError::LevelsOutOfRange { levels }
        );
    }
    assert!(SparseTree::hash_zero(Keccak256Hasher, 2, false).is_ok());
    assert!(SparseTree::hash_zero(Keccak256Hasher, 256, false).is_ok());
}

#[test]
fn max_depth_tree_accepts_full_width_addresses() {
    let mut tree = SparseTree::single_leaf_ex(Keccak256Hasher, 256, false).unwrap();
    let address = LeafAddress::new([0xffu8; 32]);
    assert!(address.fits(256));
    let leaf = tree.add_leaf(address, &value("aa")).unwrap();
    assert_eq!(tree.leaf(address).unwrap(), leaf);
}

#[test]
fn zero_tree_query_tracks_levels_for_naive() {
    let tree = SparseTree::naive(Keccak256Hasher, 6, false).unwrap();
    assert!(tree.is_zero_tree(&tree.root(), 0));
    assert!(!tree.is_zero_tree(&tree.root(), 1));
    assert!(tree.is_zero_tree(&Digest::ZERO, 6));
    assert!(!tree.is_zero_tree(&Digest::ZERO, 0));
}

#[test]
fn zero_tree_query_is_level_independent_for_hash_zero() {
    let mut tree = SparseTree::hash_zero(Keccak256Hasher, 6, false).unwrap();
    for level in 0..=6 {
        assert!(tree.is_zero_tree(&Digest::ZERO, level));
    }
    tree.add_leaf(LeafAddress::from(1u64), &value("11")).unwrap();
    assert!(!tree.is_zero_tree(&tree.root(), 0));
}

#[test]
fn store_metrics_accumulate() {
    let mut tree = SparseTree::single_leaf(Keccak256Hasher, 8, false).unwrap();
    tree.add_leaf(LeafAddress::from(3u64), &value("11")).unwrap();
    tree.add_leaf(LeafAddress::from(200u64), &value("22"))
        .unwrap();
    let metrics = tree.store().metrics();
    assert!(metrics.writes >= tree.store().len() as u64);
    assert!(metrics.reads >= 1);
    tree.remove_leaf(LeafAddress::from(3u64)).unwrap();
    assert!(tree.store().metrics().deletes >= 1);
}

#[test]
fn densely_populated_tree_proves_every_slot() {
    for variant in [
        Variant::Naive,
        Variant::HashZero,
        Variant::SingleLeaf,
        Variant::SingleLeafEx,
    ] {
        let params = TreeParamsBuilder::new()
            .variant(variant)
            .levels(4)
            .build()
            .unwrap();
        let mut tree = SparseTree::keccak(params).unwrap();
        for address in 0u64..16 {
            let v = value(&format!("{:02x}", address + 1));
            tree.add_leaf(LeafAddress::from(address), &v).unwrap();
        }
        for address in 0u64..16 {
            let address = LeafAddress::from(address);
            let proof = tree.get_proof(address).unwrap();
            assert_eq!(proof.siblings.len(), 4);
            assert!(tree.verify_proof(address, &proof).unwrap());
        }
    }
}

#[test]
fn last_bit_split_leaves_no_unreachable_records() {
    // Addresses diverging only at the leaf level split without producing
    // short-circuit records; rewriting either leaf afterwards must keep the
    // store at exactly one pair node per level.
    let cases = [
        // LSB-first traversal: 2 and 10 differ only in bit 3.
        (
            SparseTree::single_leaf_ex(Keccak256Hasher, 4, false).unwrap(),
            2u64,
            10u64,
        ),
        // MSB-first traversal: 4 and 5 differ only in bit 0.
        (
            SparseTree::single_leaf(Keccak256Hasher, 4, false).unwrap(),
            4u64,
            5u64,
        ),
    ];
    for (mut tree, first, second) in cases {
        let first = LeafAddress::from(first);
        let second = LeafAddress::from(second);
        tree.add_leaf(first, &value("aa")).unwrap();
        tree.add_leaf(second, &value("bb")).unwrap();
        assert_eq!(tree.store().len(), 4);

        let rewritten = tree.add_leaf(second, &value("cc")).unwrap();
        assert_eq!(tree.store().len(), 4);
        assert_eq!(tree.leaf(second).unwrap(), rewritten);
        assert_eq!(
            tree.leaf(first).unwrap(),
            tree.leaf_digest(first, &value("aa")).unwrap()
        );
        let proof = tree.get_proof(first).unwrap();
        assert!(tree.verify_proof(first, &proof).unwrap());
    }
}

#[test]
fn failed_update_leaves_no_trace() {
    let mut tree = SparseTree::single_leaf_ex(Keccak256Hasher, 4, false).unwrap();
    tree.add_leaf(LeafAddress::from(3u64), &value("33")).unwrap();
    let root = tree.root();
    let entries = tree.store().len();

    assert!(tree
        .add_leaf(LeafAddress::from(99u64), &value("aa"))
        .is_err());
    assert_eq!(tree.root(), root);
    assert_eq!(tree.store().len(), entries);
}

#[test]
fn sort_hash_changes_roots_but_not_membership() {
    let mut plain = SparseTree::hash_zero(Keccak256Hasher, 5, false).unwrap();
    let mut sorted = SparseTree::hash_zero(Keccak256Hasher, 5, true).unwrap();
    for (address, v) in [(3u64, "11"), (17, "22"), (9, "33")] {
        plain.add_leaf(LeafAddress::from(address), &value(v)).unwrap();
        sorted
            .add_leaf(LeafAddress::from(address), &value(v))
            .unwrap();
    }
    assert_ne!(plain.root(), sorted.root());
    for address in [3u64, 17, 9] {
        let address = LeafAddress::from(address);
        assert_eq!(plain.leaf(address).unwrap(), sorted.leaf(address).unwrap());
        let proof = sorted.get_proof(address).unwrap();
        assert!(sorted.verify_proof(address, &proof).unwrap());
    }
}
