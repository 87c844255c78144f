//! Random filling of buffers for test vectors, fixtures and benchmarks.
//!
//! Every function takes the entropy source as an argument; the `std`-only variants draw from the
//! thread-local generator seeded by the operating system, so their output is never reproducible.

use alloc::vec::Vec;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::{MODULUS, math::FalconFelt};

// RANDOMIZABLE
// ================================================================================================

/// Defines how `Self` can be read from a sequence of random bytes.
pub trait Randomizable: Sized {
    /// Size of `Self` in bytes.
    ///
    /// This is used to determine how many bytes should be passed to the
    /// [from_random_bytes()](Self::from_random_bytes) function.
    const VALUE_SIZE: usize;

    /// Returns `Self` if the set of bytes forms a valid value, otherwise returns None.
    fn from_random_bytes(source: &[u8]) -> Option<Self>;
}

impl Randomizable for u128 {
    const VALUE_SIZE: usize = 16;

    fn from_random_bytes(source: &[u8]) -> Option<Self> {
        source.get(..Self::VALUE_SIZE)?.try_into().ok().map(u128::from_le_bytes)
    }
}

impl Randomizable for u64 {
    const VALUE_SIZE: usize = 8;

    fn from_random_bytes(source: &[u8]) -> Option<Self> {
        source.get(..Self::VALUE_SIZE)?.try_into().ok().map(u64::from_le_bytes)
    }
}

impl Randomizable for u32 {
    const VALUE_SIZE: usize = 4;

    fn from_random_bytes(source: &[u8]) -> Option<Self> {
        source.get(..Self::VALUE_SIZE)?.try_into().ok().map(u32::from_le_bytes)
    }
}

impl Randomizable for u16 {
    const VALUE_SIZE: usize = 2;

    fn from_random_bytes(source: &[u8]) -> Option<Self> {
        source.get(..Self::VALUE_SIZE)?.try_into().ok().map(u16::from_le_bytes)
    }
}

impl Randomizable for u8 {
    const VALUE_SIZE: usize = 1;

    fn from_random_bytes(source: &[u8]) -> Option<Self> {
        source.first().copied()
    }
}

/// Nonzero field elements only: the low 14 bits of a little-endian `u16` are accepted when they
/// lie in `[1, q)`.
impl Randomizable for FalconFelt {
    const VALUE_SIZE: usize = 2;

    fn from_random_bytes(source: &[u8]) -> Option<Self> {
        let value = u16::from_random_bytes(source)? & 0x3fff;
        if value == 0 || value >= MODULUS as u16 {
            None
        } else {
            Some(FalconFelt::new(value))
        }
    }
}

// FILLING
// ================================================================================================

/// Draws a single value of type `T`, resampling until the random bytes form a valid value.
pub fn random_value<T: Randomizable, R: RngCore + ?Sized>(rng: &mut R) -> T {
    let mut bytes = vec![0u8; T::VALUE_SIZE];
    loop {
        rng.fill_bytes(&mut bytes);
        if let Some(value) = T::from_random_bytes(&bytes) {
            return value;
        }
    }
}

/// Overwrites every element of `dst` with a uniformly random value.
///
/// Unsigned integers cover their full range; field elements are drawn from `[1, q)`.
pub fn random_fill<T: Randomizable, R: RngCore + ?Sized>(dst: &mut [T], rng: &mut R) {
    for value in dst.iter_mut() {
        *value = random_value(rng);
    }
}

/// Overwrites every element of `dst` with a value drawn uniformly from `{-3, -2, ..., 4}`.
pub fn random_small_coefficients<R: RngCore + ?Sized>(dst: &mut [f64], rng: &mut R) {
    for value in dst.iter_mut() {
        *value = rng.random_range(-3i8..=4) as f64;
    }
}

/// Like [random_fill] with the thread-local, OS-seeded generator.
#[cfg(feature = "std")]
pub fn random_fill_os<T: Randomizable>(dst: &mut [T]) {
    random_fill(dst, &mut rand::rng());
}

/// Generates a deterministic vector using ChaCha20 seeded with `seed`.
pub fn prng_vector<T: Randomizable>(seed: [u8; 32], length: usize) -> Vec<T> {
    let mut rng = ChaCha20Rng::from_seed(seed);
    (0..length).map(|_| random_value(&mut rng)).collect()
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use rand::rand_core::impls;
    use rstest::rstest;

    use super::*;

    /// Replays a fixed byte pattern.
    struct CycleRng {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl RngCore for CycleRng {
        fn next_u32(&mut self) -> u32 {
            impls::next_u32_via_fill(self)
        }

        fn next_u64(&mut self) -> u64 {
            impls::next_u64_via_u32(self)
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            for byte in dst.iter_mut() {
                *byte = self.bytes[self.pos % self.bytes.len()];
                self.pos += 1;
            }
        }
    }

    #[rstest]
    #[case::zero(&[0x00, 0x00], None)]
    #[case::one(&[0x01, 0x00], Some(1))]
    #[case::largest(&[0x00, 0x30], Some(12288))]
    #[case::modulus(&[0x01, 0x30], None)]
    #[case::high_bits_ignored(&[0x01, 0xc0], Some(1))]
    #[case::too_short(&[0x01], None)]
    fn field_element_from_bytes(#[case] bytes: &[u8], #[case] expected: Option<u16>) {
        assert_eq!(FalconFelt::from_random_bytes(bytes).map(|e| e.value()), expected);
    }

    #[test]
    fn integers_are_little_endian() {
        let bytes: Vec<u8> = (1..=16).collect();
        assert_eq!(u8::from_random_bytes(&bytes), Some(1));
        assert_eq!(u16::from_random_bytes(&bytes), Some(0x0201));
        assert_eq!(u32::from_random_bytes(&bytes), Some(0x04030201));
        assert_eq!(u64::from_random_bytes(&bytes), Some(0x0807060504030201));
        assert_eq!(u128::from_random_bytes(&bytes), Some(0x100f0e0d0c0b0a090807060504030201));
        assert_eq!(u64::from_random_bytes(&[0u8; 7]), None);
    }

    #[test]
    fn invalid_draws_are_resampled() {
        // q, then 0, then 5
        let mut rng = CycleRng { bytes: vec![0x01, 0x30, 0x00, 0x00, 0x05, 0x00], pos: 0 };
        let value: FalconFelt = random_value(&mut rng);
        assert_eq!(value.value(), 5);
        assert_eq!(rng.pos, 6);
    }

    #[test]
    fn field_elements_are_nonzero_and_canonical() {
        let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
        let mut elements = vec![FalconFelt::new(0); 4096];
        random_fill(&mut elements, &mut rng);
        assert!(elements.iter().all(|e| (1..MODULUS as u16).contains(&e.value())));
        assert!(elements.iter().any(|e| e.value() > 8192));
    }

    #[test]
    fn small_coefficients_cover_their_range() {
        let mut rng = ChaCha20Rng::from_seed([2u8; 32]);
        let mut coefficients = vec![100.0; 1024];
        random_small_coefficients(&mut coefficients, &mut rng);

        for expected in -3..=4 {
            assert!(coefficients.contains(&(expected as f64)));
        }
        assert!(coefficients.iter().all(|&c| (-3.0..=4.0).contains(&c) && c.fract() == 0.0));
    }

    #[test]
    fn prng_vector_is_deterministic() {
        let a: Vec<u32> = prng_vector([3u8; 32], 64);
        let b: Vec<u32> = prng_vector([3u8; 32], 64);
        let c: Vec<u32> = prng_vector([4u8; 32], 64);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[cfg(feature = "std")]
    #[test]
    fn os_fill_writes_every_slot() {
        let mut values = vec![0u64; 32];
        random_fill_os(&mut values);
        // probability of a zero draw is 2^-64 per slot
        assert!(values.iter().all(|&v| v != 0));
    }
}
