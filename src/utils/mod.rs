//! Utility helpers for the `smtree` engines.
//! Currently limited to the hex normalization rules shared by hashing,
//! storage and the config layer.

pub mod hex;

pub use hex::{ensure_hex, normalize};
