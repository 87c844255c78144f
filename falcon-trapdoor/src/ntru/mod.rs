//! NTRU trapdoor candidate generation.
//!
//! Key generation samples two small polynomials `f, g`, keeps them only if both are invertible
//! modulo q, and then compares the squared Gram-Schmidt norm of the NTRU basis they generate
//! against an acceptance bound. A rejected candidate is discarded as a whole: a passing `f` is
//! never reused with a freshly sampled `g`.
//!
//! ```text
//! SAMPLE -> CHECK_F -> CHECK_G -> NORM -> ACCEPTED
//!   ^         |          |         |
//!   +---------+----------+---------+  (rejected)
//! ```
//!
//! Solving the NTRU equation for `F, G` is left to the caller.

use alloc::vec::Vec;
use core::marker::PhantomData;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    FalconParameters, KeyCodecError, MODULUS,
    keys::codec::fits_in_bits,
    math::{FalconFelt, Polynomial, ntt, samplerz::sampler_z},
};

/// Standard deviation of each base sample summed into a coefficient of `f` or `g`.
///
/// This is `1.17 * sqrt(q / 8192)`; summing `4096 / N` such samples yields the
/// `1.17 * sqrt(q / 2N)` distribution mandated for degree N.
pub const SIGMA_FG: f64 = 1.43300980528773;

// ERRORS
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeygenError {
    #[error("no candidate was accepted within {attempts} attempts")]
    RetryBudgetExhausted { attempts: u32 },
}

// SAMPLING PRIMITIVES
// ================================================================================================

/// Samples a polynomial whose coefficients are each the sum of `4096 / N` draws of a discrete
/// Gaussian with mean 0 and standard deviation [`SIGMA_FG`].
pub fn gen_poly<P: FalconParameters, R: RngCore + ?Sized>(rng: &mut R) -> Polynomial<i16> {
    let k = 4096 / P::N;
    Polynomial::new(
        (0..P::N)
            .map(|_| (0..k).map(|_| sampler_z(0.0, SIGMA_FG, P::SIGMA_MIN, rng)).sum())
            .collect(),
    )
}

/// Returns true if `poly` is invertible in `Z_q[x]/(x^N + 1)`.
///
/// The coefficients are reduced modulo q (negative values wrap around) and the polynomial is
/// invertible exactly when none of its NTT coefficients is zero.
pub fn is_poly_invertible(poly: &Polynomial<i16>) -> bool {
    let lifted = Polynomial::<FalconFelt>::from(poly).ntt();
    ntt::all_nonzero(&lifted.coefficients)
}

/// Computes the squared Gram-Schmidt norm of the NTRU basis generated by `f` and `g`.
///
/// The result is the larger of `||(f, g)||^2` and
/// `q^2 * ||(f* / (f f* + g g*), g* / (f f* + g g*))||^2`, where `*` denotes the adjoint. The
/// second quantity is the squared norm of the last Gram-Schmidt vector, obtained without
/// solving for `F, G`.
pub fn gram_schmidt_norm(f: &Polynomial<f64>, g: &Polynomial<f64>) -> f64 {
    let q = MODULUS as f64;
    let sq_norm_fg = f.norm_squared() + g.norm_squared();

    let f_fft = f.fft();
    let g_fft = g.fft();
    let f_adj = f_fft.adjoint();
    let g_adj = g_fft.adjoint();

    let ffgg = &f_fft.hadamard_mul(&f_adj) + &g_fft.hadamard_mul(&g_adj);
    let ft = f_adj.hadamard_div(&ffgg).ifft_real();
    let gt = g_adj.hadamard_div(&ffgg).ifft_real();

    let sq_norm_fg_tilde = q * q * (ft.norm_squared() + gt.norm_squared());
    sq_norm_fg.max(sq_norm_fg_tilde)
}

// KEY GENERATION POLICY
// ================================================================================================

/// Acceptance policy of the rejection sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeygenConfig {
    /// Largest accepted squared Gram-Schmidt norm. Falcon uses `1.17^2 * q`.
    pub gs_norm_bound: f64,
    /// Maximum number of candidates to sample; `None` resamples until a candidate is accepted.
    pub max_attempts: Option<u32>,
}

impl KeygenConfig {
    /// Returns a policy with the given norm bound and no attempt limit.
    pub fn new(gs_norm_bound: f64) -> Self {
        Self { gs_norm_bound, max_attempts: None }
    }

    /// Limits the number of sampled candidates.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

// CANDIDATE
// ================================================================================================

/// An accepted pair `(f, g)` with its squared Gram-Schmidt norm.
pub struct NtruCandidate<P: FalconParameters> {
    f: Polynomial<i16>,
    g: Polynomial<i16>,
    gs_norm: f64,
    attempts: u32,
    _params: PhantomData<P>,
}

impl<P: FalconParameters> NtruCandidate<P> {
    pub fn f(&self) -> &Polynomial<i16> {
        &self.f
    }

    pub fn g(&self) -> &Polynomial<i16> {
        &self.g
    }

    /// Squared Gram-Schmidt norm of the basis generated by `f` and `g`.
    pub fn gs_norm(&self) -> f64 {
        self.gs_norm
    }

    /// Number of candidates sampled, this one included.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Narrows `f` and `g` to the coefficient width of an encoded secret key.
    ///
    /// # Errors
    /// Returns an error if a coefficient does not fit in `P::FG_BITS` signed bits.
    pub fn small_polynomials(&self) -> Result<(Polynomial<i8>, Polynomial<i8>), KeyCodecError> {
        Ok((narrow::<P>(&self.f)?, narrow::<P>(&self.g)?))
    }
}

fn narrow<P: FalconParameters>(poly: &Polynomial<i16>) -> Result<Polynomial<i8>, KeyCodecError> {
    poly.coefficients
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            if fits_in_bits(value, P::FG_BITS) {
                Ok(value as i8)
            } else {
                Err(KeyCodecError::CoefficientOutOfRange { index, value, bits: P::FG_BITS })
            }
        })
        .collect::<Result<Vec<i8>, _>>()
        .map(Polynomial::new)
}

impl<P: FalconParameters> core::fmt::Debug for NtruCandidate<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NtruCandidate")
            .field("gs_norm", &self.gs_norm)
            .field("attempts", &self.attempts)
            .finish_non_exhaustive()
    }
}

impl<P: FalconParameters> Zeroize for NtruCandidate<P> {
    fn zeroize(&mut self) {
        self.f.zeroize();
        self.g.zeroize();
    }
}

impl<P: FalconParameters> Drop for NtruCandidate<P> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<P: FalconParameters> ZeroizeOnDrop for NtruCandidate<P> {}

// GENERATOR
// ================================================================================================

/// Rejection sampler for NTRU trapdoor candidates of degree `P::N`.
#[derive(Debug, Clone, Copy)]
pub struct NtruGenerator<P: FalconParameters> {
    config: KeygenConfig,
    _params: PhantomData<P>,
}

impl<P: FalconParameters> NtruGenerator<P> {
    pub fn new(config: KeygenConfig) -> Self {
        Self { config, _params: PhantomData }
    }

    pub fn config(&self) -> &KeygenConfig {
        &self.config
    }

    /// Samples candidates from `rng` until one is accepted.
    ///
    /// # Errors
    /// Returns [`KeygenError::RetryBudgetExhausted`] if `max_attempts` candidates were rejected.
    pub fn sample_candidate<R: RngCore + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<NtruCandidate<P>, KeygenError> {
        let mut attempts = 0u32;
        loop {
            if self.config.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(KeygenError::RetryBudgetExhausted { attempts });
            }
            attempts += 1;

            let mut f = gen_poly::<P, R>(rng);
            let mut g = gen_poly::<P, R>(rng);

            if !is_poly_invertible(&f) || !is_poly_invertible(&g) {
                f.zeroize();
                g.zeroize();
                continue;
            }

            let gs_norm =
                gram_schmidt_norm(&Polynomial::<f64>::from(&f), &Polynomial::<f64>::from(&g));
            if gs_norm > self.config.gs_norm_bound || gs_norm.is_nan() {
                f.zeroize();
                g.zeroize();
                continue;
            }

            return Ok(NtruCandidate { f, g, gs_norm, attempts, _params: PhantomData });
        }
    }

    /// Samples a candidate from a ChaCha20 stream seeded with `seed`.
    pub fn sample_candidate_from_seed(
        &self,
        seed: [u8; 32],
    ) -> Result<NtruCandidate<P>, KeygenError> {
        let mut rng = ChaCha20Rng::from_seed(seed);
        self.sample_candidate(&mut rng)
    }

    /// Samples a candidate using the thread-local, OS-seeded generator.
    #[cfg(feature = "std")]
    pub fn sample_candidate_os(&self) -> Result<NtruCandidate<P>, KeygenError> {
        let mut rng = rand::rng();
        self.sample_candidate(&mut rng)
    }
}

#[cfg(test)]
mod tests;
