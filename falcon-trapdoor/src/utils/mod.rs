//! Utilities used in this crate which can also be generally useful downstream.

use alloc::{string::String, vec::Vec};
use core::fmt::Write;

use thiserror::Error;

// UTILITY FUNCTIONS
// ================================================================================================

/// Renders a byte slice as lowercase hex, two digits per byte and no prefix.
pub fn bytes_to_hex(data: &[u8]) -> String {
    let mut s = String::with_capacity(2 * data.len());
    for byte in data {
        // writing into a String cannot fail
        let _ = write!(s, "{byte:02x}");
    }
    s
}

/// Defines errors which can occur during parsing of hexadecimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexParseError {
    #[error("hex encoded data must have an even number of characters")]
    OddLength,
    #[error("hex encoded data must contain only characters [0-9a-fA-F], found another at {index}")]
    InvalidChar { index: usize },
}

/// Parses a hex string without prefix into bytes; both letter cases are accepted.
pub fn hex_to_bytes(value: &str) -> Result<Vec<u8>, HexParseError> {
    if value.len() % 2 != 0 {
        return Err(HexParseError::OddLength);
    }

    let nibble = |index: usize, v: u8| match v {
        b'0'..=b'9' => Ok(v - b'0'),
        b'a'..=b'f' => Ok(v - b'a' + 10),
        b'A'..=b'F' => Ok(v - b'A' + 10),
        _ => Err(HexParseError::InvalidChar { index }),
    };

    value
        .as_bytes()
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| Ok((nibble(2 * i, pair[0])? << 4) | nibble(2 * i + 1, pair[1])?))
        .collect()
}

/// Computes the binary logarithm of `n`, which must be a power of two.
pub const fn bin_log(n: usize) -> u32 {
    debug_assert!(n.is_power_of_two());
    n.ilog2()
}

// TESTS
// ================================================================================================
