use alloc::vec::Vec;

use assert_matches::assert_matches;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rstest::rstest;

use super::*;
use crate::{Falcon512, Falcon1024, SecretKey};

/// Falcon's acceptance bound `1.17^2 * q`.
const FALCON_GS_BOUND: f64 = 1.17 * 1.17 * 12289.0;

fn unit(n: usize) -> Polynomial<f64> {
    let mut coefficients = vec![0.0; n];
    coefficients[0] = 1.0;
    Polynomial::new(coefficients)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        ((actual - expected) / expected).abs() < 1e-9,
        "expected {expected}, found {actual}"
    );
}

// GEN_POLY
// ================================================================================================

fn sample_std_dev(poly: &Polynomial<i16>) -> f64 {
    let n = poly.len() as f64;
    let mean = poly.coefficients.iter().map(|&c| c as f64).sum::<f64>() / n;
    let var = poly.coefficients.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / n;
    var.sqrt()
}

#[test]
fn gen_poly_has_expected_spread() {
    let mut rng = ChaCha20Rng::from_seed([1u8; 32]);

    // sum of 8 samples for N = 512, 4 samples for N = 1024
    let f = gen_poly::<Falcon512, _>(&mut rng);
    assert_eq!(f.len(), 512);
    let expected = SIGMA_FG * 8f64.sqrt();
    assert!((sample_std_dev(&f) - expected).abs() < 0.15 * expected);

    let f = gen_poly::<Falcon1024, _>(&mut rng);
    assert_eq!(f.len(), 1024);
    let expected = SIGMA_FG * 2.0;
    assert!((sample_std_dev(&f) - expected).abs() < 0.15 * expected);
}

#[test]
fn gen_poly_is_deterministic_for_a_seed() {
    let a = gen_poly::<Falcon512, _>(&mut ChaCha20Rng::from_seed([2u8; 32]));
    let b = gen_poly::<Falcon512, _>(&mut ChaCha20Rng::from_seed([2u8; 32]));
    let c = gen_poly::<Falcon512, _>(&mut ChaCha20Rng::from_seed([3u8; 32]));
    assert_eq!(a, b);
    assert_ne!(a, c);
}

// IS_POLY_INVERTIBLE
// ================================================================================================

#[rstest]
#[case::n512(512)]
#[case::n1024(1024)]
fn invertibility_of_simple_polynomials(#[case] n: usize) {
    let mut one = vec![0i16; n];
    one[0] = 1;
    assert!(is_poly_invertible(&Polynomial::new(one.clone())));

    // 1 + x vanishes only at -1, which is not a root of x^N + 1
    let mut one_plus_x = one.clone();
    one_plus_x[1] = 1;
    assert!(is_poly_invertible(&Polynomial::new(one_plus_x)));

    assert!(!is_poly_invertible(&Polynomial::new(vec![0i16; n])));

    // 1479 is a square root of -1 modulo q, hence a root of x^(N/2) - 1479 divides x^N + 1
    let mut p = vec![0i16; n];
    p[0] = -1479;
    p[n / 2] = 1;
    assert!(!is_poly_invertible(&Polynomial::new(p)));
}

#[test]
fn negative_coefficients_wrap_modulo_q() {
    // -1 and q - 1 are the same field element
    let mut a = vec![0i16; 512];
    let mut b = vec![0i16; 512];
    a[0] = -1;
    a[3] = -5;
    b[0] = 12288;
    b[3] = 12284;
    let (a, b) = (Polynomial::new(a), Polynomial::new(b));
    assert_eq!(Polynomial::<FalconFelt>::from(&a), Polynomial::<FalconFelt>::from(&b));
    assert_eq!(is_poly_invertible(&a), is_poly_invertible(&b));
}

// GRAM_SCHMIDT_NORM
// ================================================================================================

#[test]
fn gs_norm_of_unit_basis() {
    let q = 12289.0f64;
    let zero = Polynomial::new(vec![0.0; 512]);

    // f = 1, g = 0: f f* + g g* = 1 and the second estimate is q^2
    assert_close(gram_schmidt_norm(&unit(512), &zero), q * q);

    // f = g = 1: f f* + g g* = 2 and ft = gt = 1/2
    assert_close(gram_schmidt_norm(&unit(1024), &unit(1024)), q * q / 2.0);
}

#[test]
fn gs_norm_is_invariant_under_negation_and_swap() {
    let mut rng = ChaCha20Rng::from_seed([4u8; 32]);
    let f = Polynomial::<f64>::from(&gen_poly::<Falcon512, _>(&mut rng));
    let g = Polynomial::<f64>::from(&gen_poly::<Falcon512, _>(&mut rng));

    let norm = gram_schmidt_norm(&f, &g);
    assert_close(gram_schmidt_norm(&-&f, &g), norm);
    assert_close(gram_schmidt_norm(&g, &f), norm);
    assert!(norm >= f.norm_squared() + g.norm_squared());
}

#[test]
fn gs_norm_of_short_basis_is_the_first_estimate() {
    // large f, g make q^2 / |f f* + g g*| small, so ||(f, g)||^2 dominates
    let f = Polynomial::new((0..512).map(|i| if i == 0 { 100.0 } else { 0.0 }).collect::<Vec<_>>());
    let g = Polynomial::new((0..512).map(|i| if i == 1 { 100.0 } else { 0.0 }).collect::<Vec<_>>());
    let norm = gram_schmidt_norm(&f, &g);
    assert_close(norm, 20000.0f64.max(12289.0 * 12289.0 / 20000.0));
}

// GENERATOR
// ================================================================================================

#[test]
fn accepted_candidate_satisfies_all_checks() {
    let generator = NtruGenerator::<Falcon512>::new(KeygenConfig::new(FALCON_GS_BOUND));
    let candidate = generator.sample_candidate_from_seed([0u8; 32]).unwrap();

    assert!(candidate.attempts() >= 1);
    assert!(candidate.gs_norm() <= FALCON_GS_BOUND);
    assert!(is_poly_invertible(candidate.f()));
    assert!(is_poly_invertible(candidate.g()));
    assert_close(
        gram_schmidt_norm(
            &Polynomial::<f64>::from(candidate.f()),
            &Polynomial::<f64>::from(candidate.g()),
        ),
        candidate.gs_norm(),
    );
}

#[test]
fn seeded_sampling_is_reproducible() {
    let generator = NtruGenerator::<Falcon1024>::new(KeygenConfig::new(FALCON_GS_BOUND));
    let a = generator.sample_candidate_from_seed([7u8; 32]).unwrap();
    let b = generator.sample_candidate_from_seed([7u8; 32]).unwrap();
    assert_eq!(a.f(), b.f());
    assert_eq!(a.g(), b.g());
    assert_eq!(a.attempts(), b.attempts());
}

#[test]
fn retry_budget_is_enforced() {
    // every nonzero basis has a positive norm
    let config = KeygenConfig::new(0.0).with_max_attempts(3);
    let generator = NtruGenerator::<Falcon512>::new(config);
    assert_matches!(
        generator.sample_candidate_from_seed([1u8; 32]),
        Err(KeygenError::RetryBudgetExhausted { attempts: 3 })
    );

    let generator = NtruGenerator::<Falcon512>::new(KeygenConfig::new(1e12).with_max_attempts(0));
    assert_matches!(
        generator.sample_candidate_from_seed([1u8; 32]),
        Err(KeygenError::RetryBudgetExhausted { attempts: 0 })
    );
}

#[test]
fn loose_bound_accepts_first_invertible_candidate() {
    let generator = NtruGenerator::<Falcon512>::new(KeygenConfig::new(f64::INFINITY));
    let mut rng = ChaCha20Rng::from_seed([5u8; 32]);
    let candidate = generator.sample_candidate(&mut rng).unwrap();

    // replay the stream: the accepted pair is the first invertible one
    let mut rng = ChaCha20Rng::from_seed([5u8; 32]);
    for _ in 1..candidate.attempts() {
        let f = gen_poly::<Falcon512, _>(&mut rng);
        let g = gen_poly::<Falcon512, _>(&mut rng);
        assert!(!is_poly_invertible(&f) || !is_poly_invertible(&g));
    }
    assert_eq!(&gen_poly::<Falcon512, _>(&mut rng), candidate.f());
    assert_eq!(&gen_poly::<Falcon512, _>(&mut rng), candidate.g());
}

#[test]
fn candidate_yields_consistent_key_pair() {
    let generator = NtruGenerator::<Falcon512>::new(KeygenConfig::new(FALCON_GS_BOUND));
    let candidate = generator.sample_candidate_from_seed([9u8; 32]).unwrap();
    let (f, g) = candidate.small_polynomials().unwrap();

    let sk = SecretKey::<Falcon512>::from_polynomials(f, g, Polynomial::new(vec![0; 512])).unwrap();
    let pk = sk.public_key().unwrap();
    assert!(sk.verify_public_key(&pk));

    let decoded = SecretKey::<Falcon512>::from_bytes(&sk.to_bytes()).unwrap();
    assert_eq!(decoded.f().coefficients.len(), 512);
    assert!(decoded.verify_public_key(&pk));
}

#[test]
fn candidate_debug_hides_polynomials() {
    let generator = NtruGenerator::<Falcon512>::new(KeygenConfig::new(f64::INFINITY));
    let candidate = generator.sample_candidate_from_seed([6u8; 32]).unwrap();
    let shown = format!("{candidate:?}");
    assert!(shown.starts_with("NtruCandidate { gs_norm: "));
    assert!(!shown.contains("f:"));
}
