//! Generic polynomial type and operations used by the key codec and the NTRU generator.

use alloc::vec::Vec;
use core::ops::{Add, Mul, Neg, Sub};

use num::Zero;
use num_complex::Complex64;

use super::{FalconFelt, Inverse, fft, karatsuba, ntt};
use crate::MODULUS;

/// Represents a polynomial with coefficients of type F.
///
/// A polynomial used as an element of `Z[x]/(x^N + 1)` always carries exactly N coefficients;
/// the length is fixed when the polynomial is built and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Polynomial<F> {
    /// Coefficients of the polynomial, ordered from lowest to highest degree.
    pub coefficients: Vec<F>,
}

impl<F> Polynomial<F> {
    /// Creates a new polynomial from the provided coefficients.
    pub fn new(coefficients: Vec<F>) -> Self {
        Self { coefficients }
    }

    /// Returns the number of coefficients.
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns true if the polynomial has no coefficients.
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }
}

impl<F: Zero + Clone> Polynomial<F> {
    /// Returns the zero polynomial with `n` coefficients.
    pub fn zero_with_len(n: usize) -> Self {
        Self { coefficients: vec![F::zero(); n] }
    }

    /// Applies a function to each coefficient and returns a new polynomial.
    pub fn map<G, C: FnMut(&F) -> G>(&self, closure: C) -> Polynomial<G> {
        Polynomial::<G>::new(self.coefficients.iter().map(closure).collect())
    }
}

impl<F: Copy + Mul<Output = F> + Inverse> Polynomial<F> {
    /// Multiplies two polynomials coefficient-wise (Hadamard multiplication).
    pub fn hadamard_mul(&self, other: &Self) -> Self {
        debug_assert_eq!(self.len(), other.len());
        Polynomial::new(
            self.coefficients
                .iter()
                .zip(other.coefficients.iter())
                .map(|(a, b)| *a * *b)
                .collect(),
        )
    }

    /// Divides two polynomials coefficient-wise (Hadamard division).
    ///
    /// Coefficients of `other` which are zero yield zero in the quotient.
    pub fn hadamard_div(&self, other: &Self) -> Self {
        debug_assert_eq!(self.len(), other.len());
        let other_coefficients_inverse = F::batch_inverse_or_zero(&other.coefficients);
        Polynomial::new(
            self.coefficients
                .iter()
                .zip(other_coefficients_inverse.iter())
                .map(|(a, b)| *a * *b)
                .collect(),
        )
    }
}

impl<F: Copy + Add<Output = F>> Add for &Polynomial<F> {
    type Output = Polynomial<F>;

    fn add(self, rhs: Self) -> Self::Output {
        debug_assert_eq!(self.len(), rhs.len());
        Polynomial::new(
            self.coefficients.iter().zip(rhs.coefficients.iter()).map(|(a, b)| *a + *b).collect(),
        )
    }
}

impl<F: Copy + Sub<Output = F>> Sub for &Polynomial<F> {
    type Output = Polynomial<F>;

    fn sub(self, rhs: Self) -> Self::Output {
        debug_assert_eq!(self.len(), rhs.len());
        Polynomial::new(
            self.coefficients.iter().zip(rhs.coefficients.iter()).map(|(a, b)| *a - *b).collect(),
        )
    }
}

impl<F: Copy + Neg<Output = F>> Neg for &Polynomial<F> {
    type Output = Polynomial<F>;

    fn neg(self) -> Self::Output {
        Polynomial::new(self.coefficients.iter().map(|a| -*a).collect())
    }
}

impl<F: Copy + Neg<Output = F>> Neg for Polynomial<F> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        -&self
    }
}

// CONVERSIONS
// ================================================================================================

impl From<&Polynomial<i16>> for Polynomial<FalconFelt> {
    fn from(item: &Polynomial<i16>) -> Self {
        item.map(|&a| FalconFelt::from(a))
    }
}

impl From<&Polynomial<i8>> for Polynomial<FalconFelt> {
    fn from(item: &Polynomial<i8>) -> Self {
        item.map(|&a| FalconFelt::from(a))
    }
}

impl From<&Polynomial<i16>> for Polynomial<f64> {
    fn from(item: &Polynomial<i16>) -> Self {
        item.map(|&a| a as f64)
    }
}

impl From<&Polynomial<i8>> for Polynomial<f64> {
    fn from(item: &Polynomial<i8>) -> Self {
        item.map(|&a| a as f64)
    }
}

impl From<&Polynomial<f64>> for Polynomial<Complex64> {
    fn from(item: &Polynomial<f64>) -> Self {
        item.map(|&a| Complex64::new(a, 0.0))
    }
}

// FIELD POLYNOMIALS
// ================================================================================================

impl Polynomial<FalconFelt> {
    /// Returns the NTT representation of this polynomial.
    pub fn ntt(&self) -> Self {
        let mut coefficients = self.coefficients.clone();
        ntt::ntt(&mut coefficients);
        Self::new(coefficients)
    }

    /// Returns the coefficient representation of a polynomial given in NTT form.
    pub fn intt(&self) -> Self {
        let mut coefficients = self.coefficients.clone();
        ntt::intt(&mut coefficients);
        Self::new(coefficients)
    }

    /// Returns the coefficients in balanced signed representation.
    pub fn to_balanced(&self) -> Polynomial<i16> {
        self.map(FalconFelt::balanced_value)
    }

    /// Reduces every coefficient of an integer-valued real polynomial modulo q.
    ///
    /// The coefficients must be exact integers, as produced by the Karatsuba multiplier from
    /// integer inputs.
    pub fn from_integral_f64(item: &Polynomial<f64>) -> Self {
        item.map(|&a| {
            let reduced = (a as i64).rem_euclid(MODULUS as i64);
            FalconFelt::new(reduced as u16)
        })
    }
}

// REAL / COMPLEX POLYNOMIALS
// ================================================================================================

impl Polynomial<f64> {
    /// Computes the squared L2 norm of the coefficient vector.
    pub fn norm_squared(&self) -> f64 {
        self.coefficients.iter().map(|c| c * c).sum()
    }

    /// Returns the FFT representation of this polynomial.
    pub fn fft(&self) -> Polynomial<Complex64> {
        let mut coefficients = Polynomial::<Complex64>::from(self).coefficients;
        fft::fft(&mut coefficients);
        Polynomial::new(coefficients)
    }

    /// Multiplies two polynomials modulo `x^N + 1` with the Karatsuba multiplier.
    pub fn karatsuba_mul_mod(&self, other: &Self) -> Self {
        let n = self.len();
        let mut itmd_a = vec![0.0; n];
        let mut itmd_b = vec![0.0; n << 1];
        let mut dst = vec![0.0; n];
        karatsuba::modular_multiplication(
            &self.coefficients,
            &other.coefficients,
            &mut itmd_a,
            &mut itmd_b,
            &mut dst,
            karatsuba::default_chunk_size(n),
        );
        Self::new(dst)
    }
}

impl Polynomial<Complex64> {
    /// Returns the real parts of the inverse FFT of this polynomial.
    pub fn ifft_real(&self) -> Polynomial<f64> {
        let mut coefficients = self.coefficients.clone();
        fft::ifft(&mut coefficients);
        Polynomial::new(coefficients.iter().map(|c| c.re).collect())
    }

    /// Returns the adjoint `f*(x) = f(1/x) mod (x^N + 1)` of a real polynomial in FFT form.
    ///
    /// Every evaluation point lies on the unit circle, so the adjoint is the pointwise complex
    /// conjugate.
    pub fn adjoint(&self) -> Self {
        self.map(|c| c.conj())
    }
}

// ZEROIZE IMPLEMENTATIONS
// ================================================================================================

/// Zeroes the coefficients in place; the number of coefficients is preserved.
impl<F: zeroize::DefaultIsZeroes> zeroize::Zeroize for Polynomial<F> {
    fn zeroize(&mut self) {
        zeroize::Zeroize::zeroize(self.coefficients.as_mut_slice());
    }
}

// TESTS
// ================================================================================================
