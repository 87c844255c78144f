//! Negacyclic number-theoretic transform over Z_q, q = 12289.
//!
//! The forward transform evaluates `a(x) mod (x^n + 1)` at the n odd powers `psi^(2k+1)` of a
//! primitive 2n-th root of unity `psi`. It is computed by twisting the input with `psi^j` and
//! running a radix-2 Cooley-Tukey transform with `omega = psi^2`. Since q - 1 = 3 * 2^12, every
//! power-of-two degree up to 2048 is supported.

use num::{One, Zero};

use super::{FalconFelt, Inverse, MODULUS};

/// A generator of the multiplicative group of Z_q.
const GENERATOR: u16 = 11;

/// Largest transform size for which a primitive 2n-th root of unity exists in Z_q.
pub const MAX_NTT_LEN: usize = 2048;

/// Returns a primitive root of unity of the given order, which must divide q - 1.
fn primitive_root(order: usize) -> FalconFelt {
    let group_order = (MODULUS - 1) as usize;
    debug_assert_eq!(group_order % order, 0);
    FalconFelt::new(GENERATOR).pow((group_order / order) as u32)
}

/// Computes the forward negacyclic NTT of `a` in place.
///
/// # Panics
/// Panics if the length of `a` is not a power of two in `[1, MAX_NTT_LEN]`.
pub fn ntt(a: &mut [FalconFelt]) {
    let n = a.len();
    assert!(n.is_power_of_two() && n <= MAX_NTT_LEN, "invalid NTT length {n}");

    let psi = primitive_root(n << 1);
    let mut psi_pow = FalconFelt::one();
    for coeff in a.iter_mut() {
        *coeff *= psi_pow;
        psi_pow *= psi;
    }

    bit_reverse_permute(a);
    butterflies(a, psi * psi);
}

/// Computes the inverse negacyclic NTT of `a` in place.
///
/// # Panics
/// Panics if the length of `a` is not a power of two in `[1, MAX_NTT_LEN]`.
pub fn intt(a: &mut [FalconFelt]) {
    let n = a.len();
    assert!(n.is_power_of_two() && n <= MAX_NTT_LEN, "invalid NTT length {n}");

    let psi = primitive_root(n << 1);
    bit_reverse_permute(a);
    butterflies(a, (psi * psi).inverse_or_zero());

    // undo the 1/n scaling and the psi^j twist in a single pass
    let psi_inv = psi.inverse_or_zero();
    let mut factor = FalconFelt::new(n as u16).inverse_or_zero();
    for coeff in a.iter_mut() {
        *coeff *= factor;
        factor *= psi_inv;
    }
}

/// Returns true iff every coefficient of `a` is nonzero.
pub fn all_nonzero(a: &[FalconFelt]) -> bool {
    a.iter().all(|c| !c.is_zero())
}

/// Iterative radix-2 butterflies over a bit-reversed input, `omega` being a primitive n-th root
/// of unity.
fn butterflies(a: &mut [FalconFelt], omega: FalconFelt) {
    let n = a.len();
    let mut len = 2;
    while len <= n {
        let half = len >> 1;
        let w_len = omega.pow((n / len) as u32);
        for start in (0..n).step_by(len) {
            let mut w = FalconFelt::one();
            for j in start..start + half {
                let u = a[j];
                let t = w * a[j + half];
                a[j] = u + t;
                a[j + half] = u - t;
                w *= w_len;
            }
        }
        len <<= 1;
    }
}

fn bit_reverse_permute(a: &mut [FalconFelt]) {
    let log_n = a.len().trailing_zeros();
    for i in 0..a.len() {
        let j = bit_reverse(i, log_n);
        if i < j {
            a.swap(i, j);
        }
    }
}

#[inline]
fn bit_reverse(mut x: usize, bits: u32) -> usize {
    let mut result = 0;
    for _ in 0..bits {
        result = (result << 1) | (x & 1);
        x >>= 1;
    }
    result
}

// TESTS
// ================================================================================================
