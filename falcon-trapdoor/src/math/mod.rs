//! Arithmetic backbone: the Falcon prime field, polynomials, the NTT and FFT transforms, the
//! discrete Gaussian sampler and the data-parallel Karatsuba multiplier.
use alloc::vec::Vec;
use core::ops::MulAssign;

use num::{One, Zero};
use num_complex::Complex64;

use super::MODULUS;

mod field;
pub use field::FalconFelt;

pub mod fft;
pub mod karatsuba;
pub mod ntt;

mod polynomial;
pub use polynomial::Polynomial;

pub(crate) mod samplerz;

pub trait Inverse: Copy + Zero + MulAssign + One {
    /// Gets the inverse of a, or zero if it is zero.
    fn inverse_or_zero(self) -> Self;

    /// Gets the inverses of a batch of elements, and skip over any that are zero.
    fn batch_inverse_or_zero(batch: &[Self]) -> Vec<Self> {
        let mut acc = Self::one();
        let mut rp: Vec<Self> = Vec::with_capacity(batch.len());
        for batch_item in batch {
            if !batch_item.is_zero() {
                rp.push(acc);
                acc = *batch_item * acc;
            } else {
                rp.push(Self::zero());
            }
        }
        let mut inv = Self::inverse_or_zero(acc);
        for i in (0..batch.len()).rev() {
            if !batch[i].is_zero() {
                rp[i] *= inv;
                inv *= batch[i];
            }
        }
        rp
    }
}

impl Inverse for Complex64 {
    fn inverse_or_zero(self) -> Self {
        if self.is_zero() { Complex64::zero() } else { self.inv() }
    }

    /// Inverts element by element; Montgomery's trick loses precision over floating point.
    fn batch_inverse_or_zero(batch: &[Self]) -> Vec<Self> {
        batch.iter().map(|c| c.inverse_or_zero()).collect()
    }
}
