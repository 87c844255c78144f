//! Falcon key material and its fixed-size byte encodings.
//!
//! A public key is encoded as a header byte `log2(N)` followed by the N coefficients of `h`,
//! 14 bits each. A secret key is encoded as a header byte `0x50 | log2(N)` followed by `f` and
//! `g` (6 bits per coefficient for N = 512, 5 bits for N = 1024) and `F` (8 bits per
//! coefficient). All fields are packed least-significant bit first.

use thiserror::Error;

pub mod codec;

mod public_key;
pub use public_key::PublicKey;

mod secret_key;
pub use secret_key::SecretKey;

// ERRORS
// ================================================================================================

/// Errors raised while encoding or decoding key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyCodecError {
    #[error("expected an encoding of {expected} bytes, found {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("expected header byte {expected:#04x}, found {found:#04x}")]
    InvalidHeader { expected: u8, found: u8 },
    #[error("coefficient {index} has value {value} which is not a canonical field element")]
    NonCanonicalCoefficient { index: usize, value: u16 },
    #[error("coefficient {index} has value {value} which does not fit in {bits} signed bits")]
    CoefficientOutOfRange { index: usize, value: i16, bits: u32 },
    #[error("expected a polynomial with {expected} coefficients, found {actual}")]
    WrongDegree { expected: usize, actual: usize },
}

/// Errors raised by operations on typed keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid key encoding")]
    Codec(#[from] KeyCodecError),
    #[error("polynomial f is not invertible modulo q")]
    NonInvertible,
}
