//! Key-generation core of the Falcon lattice signature scheme.
//!
//! The crate covers three tightly coupled pieces:
//!
//! 1. The bit-exact [key codec](keys) which packs public keys (14-bit field elements) and secret
//!    keys (small signed integers) into fixed-size byte strings.
//! 2. The [NTRU trapdoor generator](ntru) which samples candidate polynomials `f, g`, rejects the
//!    ones which are not invertible modulo `q` and computes the Gram-Schmidt norm statistic used
//!    to accept or resample a candidate basis.
//! 3. A data-parallel [Karatsuba multiplier](math::karatsuba) with negacyclic reduction modulo
//!    `x^N + 1`.
//!
//! Both Falcon parameter sets are supported; the degree `N` is a compile-time choice made through
//! the [`Falcon512`] and [`Falcon1024`] marker types.
#![no_std]

#[macro_use]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod keys;
pub mod math;
pub mod ntru;
pub mod rand;
pub mod utils;

// RE-EXPORTS
// ================================================================================================

pub use keys::{KeyCodecError, KeyError, PublicKey, SecretKey};
pub use math::{FalconFelt, Polynomial};
pub use ntru::{KeygenConfig, KeygenError, NtruCandidate, NtruGenerator};

// CONSTANTS
// ================================================================================================

/// The Falcon modulus q.
pub const MODULUS: i16 = 12289;

/// Number of bits needed to encode an element of the Falcon field.
pub const FALCON_ENCODING_BITS: u32 = 14;

/// Tag OR-ed with `log2(N)` to form the header byte of an encoded secret key.
pub const SK_HEADER_TAG: u8 = 0x50;

/// Length in bytes of an encoded public key for degree `2^log_n`.
pub const fn pkey_len(log_n: u8) -> usize {
    1 + ((FALCON_ENCODING_BITS as usize) << log_n) / 8
}

/// Length in bytes of an encoded secret key for degree `2^log_n`.
///
/// f and g are packed with [`fg_bits`] bits per coefficient, F with 8 bits per coefficient.
pub const fn skey_len(log_n: u8) -> usize {
    let n = 1usize << log_n;
    1 + 2 * ((fg_bits(log_n) as usize * n) / 8) + n
}

/// Length in bytes of a padded signature for degree `2^log_n`.
pub const fn sig_len(log_n: u8) -> usize {
    match log_n {
        9 => 666,
        10 => 1280,
        _ => panic!("unsupported Falcon degree"),
    }
}

/// Number of bits used to encode a single coefficient of f or g for degree `2^log_n`.
pub const fn fg_bits(log_n: u8) -> u32 {
    match log_n {
        9 => 6,
        10 => 5,
        _ => panic!("unsupported Falcon degree"),
    }
}

// PARAMETER SETS
// ================================================================================================

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Falcon512 {}
    impl Sealed for super::Falcon1024 {}
}

/// Compile-time description of a Falcon parameter set.
///
/// The trait is sealed: the only implementors are [`Falcon512`] and [`Falcon1024`].
pub trait FalconParameters:
    sealed::Sealed + Copy + Clone + core::fmt::Debug + Default + Eq + Send + Sync + 'static
{
    /// Binary logarithm of the ring degree.
    const LOG_N: u8;

    /// Degree of `phi = x^N + 1`.
    const N: usize = 1 << Self::LOG_N;

    /// Lower bound on the standard deviation handed to the base sampler.
    const SIGMA_MIN: f64;

    /// Bits per coefficient used when packing f and g.
    const FG_BITS: u32 = fg_bits(Self::LOG_N);

    /// Header byte of an encoded public key.
    const PK_HEADER: u8 = utils::bin_log(Self::N) as u8;

    /// Header byte of an encoded secret key.
    const SK_HEADER: u8 = SK_HEADER_TAG | Self::PK_HEADER;

    /// Length of an encoded public key.
    const PK_LEN: usize = pkey_len(Self::LOG_N);

    /// Length of an encoded secret key.
    const SK_LEN: usize = skey_len(Self::LOG_N);

    /// Length of a padded signature.
    const SIG_LEN: usize = sig_len(Self::LOG_N);
}

/// Falcon-512 (NIST level I).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Falcon512;

impl FalconParameters for Falcon512 {
    const LOG_N: u8 = 9;
    const SIGMA_MIN: f64 = 1.2778336969128337;
}

/// Falcon-1024 (NIST level V).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Falcon1024;

impl FalconParameters for Falcon1024 {
    const LOG_N: u8 = 10;
    const SIGMA_MIN: f64 = 1.298280334344292;
}

// TESTS
// ================================================================================================
