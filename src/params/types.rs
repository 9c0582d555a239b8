use serde::{Deserialize, Serialize};

/// The four storage/hashing strategies implemented by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Canonical pair nodes; every level has a distinct zero-subtree hash,
    /// precomputed once at construction.
    Naive,
    /// Declares `Hash(0, 0) = 0`, so a single all-zero constant marks an
    /// empty subtree at any level.
    HashZero,
    /// Like [`Variant::HashZero`], but a subtree holding exactly one
    /// non-zero leaf is stored as a single short-circuit node instead of a
    /// chain of pair nodes. Intermediate levels are still hashed.
    SingleLeaf,
    /// Like [`Variant::SingleLeaf`], but the leaf hash itself stands in for
    /// the hash of the whole single-leaf subtree, the leaf hash binds the
    /// address (`Hash(address, value, 1)`), and traversal consumes address
    /// bits LSB-first. Removal does not prune single-leaf subtrees; see the
    /// engine documentation for the resulting order dependence.
    SingleLeafEx,
}

/// Direction in which address bits drive the root-to-leaf descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitOrder {
    /// Bit `levels - 1` selects the root's child, bit `0` the leaf.
    MsbFirst,
    /// Bit `0` selects the root's child, bit `levels - 1` the leaf.
    LsbFirst,
}

/// How a leaf value is bound into its leaf hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafBinding {
    /// `Hash(value)`.
    ValueOnly,
    /// `Hash(address, value, 1)` — the trailing `1` domain-separates leaf
    /// hashes from pair-node hashes.
    AddressValue,
}

impl Variant {
    /// True for variants where one constant digest marks an empty subtree at
    /// every level; false for [`Variant::Naive`] with its per-level table.
    pub const fn constant_zero(self) -> bool {
        !matches!(self, Variant::Naive)
    }

    /// True for variants that store single-leaf subtrees as one node.
    pub const fn short_circuit(self) -> bool {
        matches!(self, Variant::SingleLeaf | Variant::SingleLeafEx)
    }

    /// Traversal direction for this variant.
    pub const fn bit_order(self) -> BitOrder {
        match self {
            Variant::SingleLeafEx => BitOrder::LsbFirst,
            _ => BitOrder::MsbFirst,
        }
    }

    /// Leaf-hash formula for this variant.
    pub const fn leaf_binding(self) -> LeafBinding {
        match self {
            Variant::SingleLeafEx => LeafBinding::AddressValue,
            _ => LeafBinding::ValueOnly,
        }
    }

    /// True when the hash of a single-leaf subtree equals the leaf hash
    /// itself, skipping the intermediate per-level hashing.
    pub const fn leaf_is_subtree_hash(self) -> bool {
        matches!(self, Variant::SingleLeafEx)
    }
}

/// Immutable parameter set fixed at tree construction.
///
/// | Field | Description |
/// |-------|-------------|
/// | `variant` | Storage/hashing strategy. |
/// | `levels` | Tree depth in `[2, 256]`; addresses live in `[0, 2^levels)`. |
/// | `sort_hash` | Order sibling pairs numerically before hashing. |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    pub(crate) variant: Variant,
    pub(crate) levels: u16,
    pub(crate) sort_hash: bool,
}

impl TreeParams {
    /// Returns the variant.
    pub const fn variant(&self) -> Variant {
        self.variant
    }

    /// Returns the level count.
    pub const fn levels(&self) -> u16 {
        self.levels
    }

    /// Returns whether sibling pairs are sorted numerically before hashing.
    ///
    /// Sort-hash mode exists for compatibility with verifiers that hash
    /// sorted pairs; it discards positional information and is off by
    /// default.
    pub const fn sort_hash(&self) -> bool {
        self.sort_hash
    }

    /// Index of the address bit that selects the child when stepping from
    /// level `level - 1` down to `level`. Bit 0 is the least significant bit
    /// of the address.
    pub(crate) fn bit_position(&self, level: u16) -> usize {
        match self.variant.bit_order() {
            BitOrder::MsbFirst => (self.levels - level) as usize,
            BitOrder::LsbFirst => (level - 1) as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_knobs() {
        assert!(!Variant::Naive.constant_zero());
        assert!(Variant::HashZero.constant_zero());
        assert!(!Variant::HashZero.short_circuit());
        assert!(Variant::SingleLeaf.short_circuit());
        assert_eq!(Variant::SingleLeaf.bit_order(), BitOrder::MsbFirst);
        assert_eq!(Variant::SingleLeafEx.bit_order(), BitOrder::LsbFirst);
        assert_eq!(Variant::SingleLeafEx.leaf_binding(), LeafBinding::AddressValue);
        assert!(Variant::SingleLeafEx.leaf_is_subtree_hash());
    }

    #[test]
    fn bit_positions_follow_traversal_direction() {
        let msb = TreeParams {
            variant: Variant::HashZero,
            levels: 4,
            sort_hash: false,
        };
        assert_eq!(msb.bit_position(1), 3);
        assert_eq!(msb.bit_position(4), 0);

        let lsb = TreeParams {
            variant: Variant::SingleLeafEx,
            levels: 4,
            sort_hash: false,
        };
        assert_eq!(lsb.bit_position(1), 0);
        assert_eq!(lsb.bit_position(4), 3);
    }

    #[test]
    fn variant_names_serialize_snake_case() {
        let json = serde_json::to_string(&Variant::SingleLeafEx).unwrap();
        assert_eq!(json, "\"single_leaf_ex\"");
        let back: Variant = serde_json::from_str("\"hash_zero\"").unwrap();
        assert_eq!(back, Variant::HashZero);
    }
}
