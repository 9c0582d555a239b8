//! Proof generation, verification and compression against live trees.

use proptest::prelude::*;

use smtree::{Keccak256Hasher, LeafAddress, LeafValue, SmtError, SparseTree};

fn value(hex: &str) -> LeafValue {
    LeafValue::new(hex).unwrap()
}

fn populated(levels: u16) -> SparseTree<Keccak256Hasher> {
    let mut tree = SparseTree::single_leaf(Keccak256Hasher, levels, false).unwrap();
    for (address, v) in [(1u64, "11"), (6, "66"), (200, "aa")] {
        if LeafAddress::from(address).fits(levels) {
            tree.add_leaf(LeafAddress::from(address), &value(v)).unwrap();
        }
    }
    tree
}

#[test]
fn compression_round_trips_through_the_tree() {
    let tree = populated(16);
    let address = LeafAddress::from(6u64);
    let proof = tree.get_proof(address).unwrap();
    assert!(tree.verify_proof(address, &proof).unwrap());

    let compressed = tree.compress_proof(&proof).unwrap();
    assert!(compressed.is_compressed());
    assert!(compressed.siblings.len() < proof.siblings.len());

    let restored = tree.decompress_proof(&compressed).unwrap();
    assert_eq!(restored, proof);
    assert!(tree.verify_proof(address, &restored).unwrap());
}

#[test]
fn verifying_a_compressed_proof_is_an_error() {
    let tree = populated(16);
    let address = LeafAddress::from(6u64);
    let compressed = tree
        .compress_proof(&tree.get_proof(address).unwrap())
        .unwrap();
    assert_eq!(
        tree.verify_proof(address, &compressed).unwrap_err(),
        SmtError::AlreadyCompressed
    );
}

#[test]
fn codec_misuse_is_rejected() {
    let tree = populated(16);
    let proof = tree.get_proof(LeafAddress::from(1u64)).unwrap();
    let compressed = tree.compress_proof(&proof).unwrap();
    assert_eq!(
        tree.compress_proof(&compressed).unwrap_err(),
        SmtError::AlreadyCompressed
    );
    assert_eq!(
        tree.decompress_proof(&proof).unwrap_err(),
        SmtError::AlreadyDecompressed
    );
}

#[test]
fn foreign_mask_is_rejected_on_decompress() {
    let deep = populated(16);
    let shallow = populated(4);
    let compressed = deep
        .compress_proof(&deep.get_proof(LeafAddress::from(6u64)).unwrap())
        .unwrap();
    assert!(matches!(
        shallow.decompress_proof(&compressed),
        Err(SmtError::InconsistentEncoding { .. })
    ));
}

#[test]
fn tampered_proofs_fail_verification() {
    let tree = populated(16);
    let address = LeafAddress::from(6u64);
    let honest = tree.get_proof(address).unwrap();

    let mut wrong_leaf = honest.clone();
    wrong_leaf.leaf = tree.leaf_digest(address, &value("dead")).unwrap();
    assert!(!tree.verify_proof(address, &wrong_leaf).unwrap());

    let mut wrong_sibling = honest.clone();
    if let Some(first) = wrong_sibling.siblings.first_mut() {
        *first = tree.leaf_digest(address, &value("beef")).unwrap();
    }
    assert!(!tree.verify_proof(address, &wrong_sibling).unwrap());

    // A proof for one address does not transfer to a sibling address.
    assert!(!tree
        .verify_proof(LeafAddress::from(7u64), &honest)
        .unwrap());
}

#[test]
fn oversized_sibling_list_is_an_error() {
    let tree = populated(4);
    let mut proof = tree.get_proof(LeafAddress::from(1u64)).unwrap();
    proof.siblings.push(proof.root);
    while proof.siblings.len() <= 4 {
        proof.siblings.push(proof.root);
    }
    assert!(matches!(
        tree.verify_proof(LeafAddress::from(1u64), &proof),
        Err(SmtError::InconsistentEncoding { .. })
    ));
}

proptest! {
    #[test]
    fn compression_round_trips_for_random_trees(
        entries in prop::collection::btree_map(0u64..64, any::<u8>(), 1..20),
    ) {
        for variant_tree in [
            SparseTree::naive(Keccak256Hasher, 6, false),
            SparseTree::hash_zero(Keccak256Hasher, 6, false),
            SparseTree::single_leaf(Keccak256Hasher, 6, false),
            SparseTree::single_leaf_ex(Keccak256Hasher, 6, false),
        ] {
            let mut tree = variant_tree.unwrap();
            for (address, v) in &entries {
                let v = LeafValue::new(&format!("{:02x}", v)).unwrap();
                tree.add_leaf(LeafAddress::from(*address), &v).unwrap();
            }
            for address in entries.keys() {
                let address = LeafAddress::from(*address);
                let proof = tree.get_proof(address).unwrap();
                let compressed = tree.compress_proof(&proof).unwrap();
                let restored = tree.decompress_proof(&compressed).unwrap();
                prop_assert_eq!(&restored, &proof);
                prop_assert!(tree.verify_proof(address, &restored).unwrap());
            }
        }
    }
}
