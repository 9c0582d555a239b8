//! Parameter registry for the SMT engines.
//!
//! [`TreeParams`] is the single source of truth for everything that shapes a
//! tree's hashing and storage behaviour: the [`Variant`], the fixed level
//! count and the sort-hash flag. The four variants differ only in four knobs
//! — zero-subtree detection, leaf-hash binding, short-circuit storage and
//! traversal bit order — and all four are exposed as methods on [`Variant`]
//! so that a single engine can serve every variant.
//!
//! Parameters are immutable for the lifetime of a tree; in particular the
//! level count can never change once a tree has been constructed.

mod builder;
mod types;

pub use builder::TreeParamsBuilder;
pub use types::{BitOrder, LeafBinding, TreeParams, Variant};
