//! Hex normalization primitives.
//!
//! Every value that enters a hash preimage does so as a hex string that is
//! left-padded with `'0'` to the next 64-character (32-byte) boundary. The
//! empty string normalizes to itself; it encodes "no value" and contributes
//! nothing to a preimage.

use crate::{SmtError, SmtResult};

/// Width of one normalized block in hex characters (32 bytes).
pub const BLOCK_HEX_CHARS: usize = 64;

/// Validates that `input` consists solely of hexadecimal digits.
///
/// The empty string is accepted. Case is not constrained here; callers that
/// need a canonical form lower-case after validation.
pub fn ensure_hex(input: &str) -> SmtResult<()> {
    if input.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(SmtError::InvalidHex {
            input: input.to_string(),
        })
    }
}

/// Left-pads `input` with `'0'` to the next multiple of 64 hex characters.
///
/// `""` stays `""`; `"2"` becomes 63 zeros followed by `2`; a 65-character
/// string is padded to 128. The output is lower-cased so that equal byte
/// strings compare equal as text.
pub fn normalize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let target = input.len().div_ceil(BLOCK_HEX_CHARS) * BLOCK_HEX_CHARS;
    let mut out = String::with_capacity(target);
    for _ in input.len()..target {
        out.push('0');
    }
    for c in input.chars() {
        out.push(c.to_ascii_lowercase());
    }
    out
}
