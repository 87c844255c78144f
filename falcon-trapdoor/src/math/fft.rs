//! Complex FFT over `R[x]/(x^n + 1)`.
//!
//! The forward transform evaluates a real polynomial at the n primitive 2n-th roots of unity
//! `zeta^(2k+1)`, `zeta = exp(i*pi/n)`. Products in the negacyclic ring become pointwise
//! products, and the adjoint `f(1/x)` becomes a pointwise conjugate.

use alloc::vec::Vec;
use core::f64::consts::PI;

use num_complex::Complex64;

/// Computes the forward negacyclic FFT of `a` in place.
///
/// # Panics
/// Panics if the length of `a` is not a power of two.
pub fn fft(a: &mut [Complex64]) {
    let n = a.len();
    assert!(n.is_power_of_two(), "invalid FFT length {n}");

    for (j, coeff) in a.iter_mut().enumerate() {
        *coeff *= Complex64::cis(PI * j as f64 / n as f64);
    }
    bit_reverse_permute(a);
    butterflies(a, 1.0);
}

/// Computes the inverse negacyclic FFT of `a` in place.
///
/// # Panics
/// Panics if the length of `a` is not a power of two.
pub fn ifft(a: &mut [Complex64]) {
    let n = a.len();
    assert!(n.is_power_of_two(), "invalid FFT length {n}");

    bit_reverse_permute(a);
    butterflies(a, -1.0);

    let scale = 1.0 / n as f64;
    for (j, coeff) in a.iter_mut().enumerate() {
        *coeff *= Complex64::cis(-PI * j as f64 / n as f64).scale(scale);
    }
}

/// Radix-2 butterflies over a bit-reversed input. `sign` selects the direction of the twiddles.
fn butterflies(a: &mut [Complex64], sign: f64) {
    let n = a.len();
    let mut len = 2;
    while len <= n {
        let half = len >> 1;
        let twiddles: Vec<Complex64> = (0..half)
            .map(|k| Complex64::cis(sign * 2.0 * PI * k as f64 / len as f64))
            .collect();
        for start in (0..n).step_by(len) {
            for (k, w) in twiddles.iter().enumerate() {
                let u = a[start + k];
                let t = a[start + k + half] * w;
                a[start + k] = u + t;
                a[start + k + half] = u - t;
            }
        }
        len <<= 1;
    }
}

fn bit_reverse_permute(a: &mut [Complex64]) {
    let log_n = a.len().trailing_zeros();
    for i in 0..a.len() {
        let mut x = i;
        let mut j = 0;
        for _ in 0..log_n {
            j = (j << 1) | (x & 1);
            x >>= 1;
        }
        if i < j {
            a.swap(i, j);
        }
    }
}

// TESTS
// ================================================================================================
