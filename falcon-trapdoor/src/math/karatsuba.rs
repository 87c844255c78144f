//! Data-parallel Karatsuba polynomial multiplication with negacyclic reduction.
//!
//! Instead of splitting the operands recursively, every coefficient of the linear product is
//! reconstructed directly from the pointwise products `a_i * b_i` and the cross sums
//! `(a_s + a_t) * (b_s + b_t)`:
//!
//! ```text
//! c_k = sum_{s < t, s + t = k} [(a_s + a_t)(b_s + b_t) - a_s b_s - a_t b_t] + [k even] a_{k/2} b_{k/2}
//! ```
//!
//! Each output index depends only on the inputs and on the pointwise products, so once the
//! pointwise phase is complete all output coefficients can be computed independently. With the
//! `concurrent` feature the buffers are split into chunks which are processed on the rayon thread
//! pool; otherwise the same chunks are processed sequentially.
//!
//! All arithmetic is carried out over `f64`. Products of integer polynomials are exact as long as
//! every intermediate value stays below 2^53 in magnitude.

#[cfg(feature = "concurrent")]
use rayon::prelude::*;

/// Returns the chunk size used by [`modular_multiplication`] callers which have no preference.
///
/// The result always divides `n` when `n` is a power of two.
pub fn default_chunk_size(n: usize) -> usize {
    n.clamp(1, 64)
}

/// Computes the linear product of `a` and `b`, writing its `2 * len` coefficients into `dst`.
///
/// `itmd` receives the pointwise products `a_i * b_i`. The coefficient of degree `2 * len - 1` is
/// always zero.
///
/// # Panics
/// Panics if any of the following does not hold:
/// - `a`, `b` and `itmd` have the same length `len`;
/// - `dst` has length `2 * len`, which is a power of two;
/// - `chunk_size` is nonzero and divides `len`.
pub fn multiplication(
    a: &[f64],
    b: &[f64],
    itmd: &mut [f64],
    dst: &mut [f64],
    chunk_size: usize,
) {
    let len = itmd.len();
    assert_eq!(a.len(), b.len(), "operands must have the same length");
    assert_eq!(b.len(), len, "intermediate buffer must match the operand length");
    assert_eq!(len << 1, dst.len(), "destination must hold twice as many coefficients");
    assert!(dst.len().is_power_of_two(), "destination length must be a power of two");
    assert!(chunk_size > 0 && len % chunk_size == 0, "chunk size must divide the operand length");

    // phase 0: pointwise products, independent of zeroing the destination
    #[cfg(feature = "concurrent")]
    rayon::join(
        || pointwise_products(a, b, itmd, chunk_size),
        || dst.par_chunks_mut(chunk_size).for_each(|chunk| chunk.fill(0.0)),
    );

    #[cfg(not(feature = "concurrent"))]
    {
        pointwise_products(a, b, itmd, chunk_size);
        dst.fill(0.0);
    }

    // phase 1: reconstruction, only reads from `itmd`
    let itmd = &*itmd;
    let reconstruct = |(chunk_idx, chunk): (usize, &mut [f64])| {
        let offset = chunk_idx * chunk_size;
        for (k, coeff) in chunk.iter_mut().enumerate() {
            *coeff = product_coefficient(a, b, itmd, offset + k);
        }
    };

    #[cfg(feature = "concurrent")]
    dst.par_chunks_mut(chunk_size).enumerate().for_each(reconstruct);

    #[cfg(not(feature = "concurrent"))]
    dst.chunks_mut(chunk_size).enumerate().for_each(reconstruct);
}

/// Computes `a * b mod (x^len + 1)` and writes the `len` coefficients into `dst`.
///
/// `itmd_a` (length `len`) and `itmd_b` (length `2 * len`) are scratch buffers; on return
/// `itmd_b` holds the unreduced linear product.
///
/// # Panics
/// Panics under the same conditions as [`multiplication`], or if `dst` does not have length
/// `len`.
pub fn modular_multiplication(
    a: &[f64],
    b: &[f64],
    itmd_a: &mut [f64],
    itmd_b: &mut [f64],
    dst: &mut [f64],
    chunk_size: usize,
) {
    let len = a.len();
    assert_eq!(dst.len(), len, "destination must match the operand length");
    assert!(chunk_size > 0 && len % chunk_size == 0, "chunk size must divide the operand length");

    multiplication(a, b, itmd_a, itmd_b, chunk_size);

    let product = &*itmd_b;
    let fold = |(chunk_idx, chunk): (usize, &mut [f64])| {
        let offset = chunk_idx * chunk_size;
        for (k, coeff) in chunk.iter_mut().enumerate() {
            let idx = offset + k;
            *coeff = product[idx] - product[idx + len];
        }
    };

    #[cfg(feature = "concurrent")]
    dst.par_chunks_mut(chunk_size).enumerate().for_each(fold);

    #[cfg(not(feature = "concurrent"))]
    dst.chunks_mut(chunk_size).enumerate().for_each(fold);
}

// HELPER FUNCTIONS
// ================================================================================================

fn pointwise_products(a: &[f64], b: &[f64], itmd: &mut [f64], chunk_size: usize) {
    let multiply = |(chunk_idx, chunk): (usize, &mut [f64])| {
        let offset = chunk_idx * chunk_size;
        for (k, value) in chunk.iter_mut().enumerate() {
            *value = a[offset + k] * b[offset + k];
        }
    };

    #[cfg(feature = "concurrent")]
    itmd.par_chunks_mut(chunk_size).enumerate().for_each(multiply);

    #[cfg(not(feature = "concurrent"))]
    itmd.chunks_mut(chunk_size).enumerate().for_each(multiply);
}

/// Returns the coefficient of degree `idx` of the linear product.
#[inline]
fn product_coefficient(a: &[f64], b: &[f64], itmd: &[f64], idx: usize) -> f64 {
    let len = itmd.len();
    if idx == 0 {
        return itmd[0];
    }
    if idx == (len << 1) - 2 {
        return itmd[len - 1];
    }

    // pairs (s, t) with s < t < len and s + t = idx
    let mut cross = 0.0;
    let mut diagonal = 0.0;
    for s in (idx + 1).saturating_sub(len)..idx.div_ceil(2) {
        let t = idx - s;
        cross += (a[s] + a[t]) * (b[s] + b[t]);
        diagonal += itmd[s] + itmd[t];
    }

    if idx & 1 == 0 {
        cross - diagonal + itmd[idx >> 1]
    } else {
        cross - diagonal
    }
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;
    use rstest::rstest;

    use super::*;

    fn schoolbook(a: &[f64], b: &[f64]) -> Vec<f64> {
        let mut c = vec![0.0; a.len() * 2];
        for (i, x) in a.iter().enumerate() {
            for (j, y) in b.iter().enumerate() {
                c[i + j] += x * y;
            }
        }
        c
    }

    fn random_small(n: usize, rng: &mut ChaCha20Rng) -> Vec<f64> {
        (0..n).map(|_| rng.random_range(-2048i32..=2048) as f64).collect()
    }

    #[test]
    fn multiplies_small_polynomials() {
        let a = [1.0, 2.0];
        let b = [3.0, 4.0];
        let mut itmd = [0.0; 2];
        let mut dst = [0.0; 4];
        multiplication(&a, &b, &mut itmd, &mut dst, 1);
        assert_eq!(itmd, [3.0, 8.0]);
        assert_eq!(dst, [3.0, 10.0, 8.0, 0.0]);

        let mut itmd_a = [0.0; 2];
        let mut itmd_b = [0.0; 4];
        let mut reduced = [0.0; 2];
        modular_multiplication(&a, &b, &mut itmd_a, &mut itmd_b, &mut reduced, 2);
        assert_eq!(reduced, [-5.0, 10.0]);
        assert_eq!(itmd_b, [3.0, 10.0, 8.0, 0.0]);
    }

    #[test]
    fn single_coefficient_product() {
        let mut itmd = [0.0];
        let mut dst = [7.0, 7.0];
        multiplication(&[3.0], &[-5.0], &mut itmd, &mut dst, 1);
        assert_eq!(dst, [-15.0, 0.0]);
    }

    #[rstest]
    #[case::len_4(4, 1)]
    #[case::len_8(8, 4)]
    #[case::len_64(64, 16)]
    #[case::len_512(512, 64)]
    fn linear_product_matches_schoolbook(#[case] len: usize, #[case] chunk_size: usize) {
        let mut rng = ChaCha20Rng::from_seed([len as u8; 32]);
        let a = random_small(len, &mut rng);
        let b = random_small(len, &mut rng);

        let mut itmd = vec![0.0; len];
        let mut dst = vec![0.0; len << 1];
        multiplication(&a, &b, &mut itmd, &mut dst, chunk_size);

        assert_eq!(dst, schoolbook(&a, &b));
        assert_eq!(dst[(len << 1) - 1], 0.0);
    }

    #[rstest]
    #[case::len_8(8)]
    #[case::len_512(512)]
    #[case::len_1024(1024)]
    fn reduction_wraps_with_sign_flip(#[case] len: usize) {
        let mut rng = ChaCha20Rng::from_seed([9u8; 32]);
        let a = random_small(len, &mut rng);
        let b = random_small(len, &mut rng);

        let linear = schoolbook(&a, &b);
        let expected: Vec<f64> = (0..len).map(|i| linear[i] - linear[i + len]).collect();

        let mut itmd_a = vec![0.0; len];
        let mut itmd_b = vec![0.0; len << 1];
        let mut dst = vec![0.0; len];
        modular_multiplication(&a, &b, &mut itmd_a, &mut itmd_b, &mut dst, default_chunk_size(len));
        assert_eq!(dst, expected);
    }

    #[test]
    fn multiplying_by_x_rotates_negacyclically() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let x = [0.0, 1.0, 0.0, 0.0];
        let mut itmd_a = [0.0; 4];
        let mut itmd_b = [0.0; 8];
        let mut dst = [0.0; 4];
        modular_multiplication(&a, &x, &mut itmd_a, &mut itmd_b, &mut dst, 2);
        assert_eq!(dst, [-4.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    #[should_panic]
    fn operand_length_mismatch_panics() {
        let mut itmd = [0.0; 4];
        let mut dst = [0.0; 8];
        multiplication(&[1.0; 4], &[1.0; 2], &mut itmd, &mut dst, 1);
    }

    #[test]
    #[should_panic]
    fn destination_length_mismatch_panics() {
        let mut itmd = [0.0; 4];
        let mut dst = [0.0; 6];
        multiplication(&[1.0; 4], &[1.0; 4], &mut itmd, &mut dst, 1);
    }

    #[test]
    #[should_panic]
    fn non_power_of_two_destination_panics() {
        let mut itmd = [0.0; 3];
        let mut dst = [0.0; 6];
        multiplication(&[1.0; 3], &[1.0; 3], &mut itmd, &mut dst, 1);
    }

    #[test]
    #[should_panic]
    fn non_dividing_chunk_size_panics() {
        let mut itmd = [0.0; 8];
        let mut dst = [0.0; 16];
        multiplication(&[1.0; 8], &[1.0; 8], &mut itmd, &mut dst, 3);
    }

    #[test]
    #[should_panic]
    fn zero_chunk_size_panics() {
        let mut itmd = [0.0; 8];
        let mut dst = [0.0; 16];
        multiplication(&[1.0; 8], &[1.0; 8], &mut itmd, &mut dst, 0);
    }
}
