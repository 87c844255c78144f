use alloc::string::String;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num::{One, Zero};

use super::{Inverse, MODULUS};

// ================================================================================================
// FIELD ELEMENT REPRESENTATIONS
// ================================================================================================
//
// Elements of Z/qZ with q = 12289 are stored in canonical form, i.e. as an unsigned integer in
// [0, q-1]. This is the form written to and read from encoded public keys, so an element can be
// packed without any further reduction.
//
// Secret key material lives in the balanced form [-(q-1)/2, (q-1)/2]; conversions from signed
// integers add q to negative values before storing them.

const Q: u32 = MODULUS as u32;

/// Addition modulo q of two canonical values.
#[inline(always)]
const fn mq_add(x: u32, y: u32) -> u32 {
    // x + y - q wraps around when x + y < q, in which case the high half is all ones and q is
    // added back.
    let a = (x + y).wrapping_sub(Q);
    a.wrapping_add(Q & (a >> 16))
}

/// Subtraction modulo q of two canonical values.
#[inline(always)]
const fn mq_sub(x: u32, y: u32) -> u32 {
    let a = x.wrapping_sub(y);
    a.wrapping_add(Q & (a >> 16))
}

/// Multiplication modulo q of two canonical values.
#[inline(always)]
const fn mq_mul(x: u32, y: u32) -> u32 {
    (x * y) % Q
}

/// Maps a signed integer into [0, q-1].
#[inline(always)]
fn signed_to_canonical(value: i32) -> u16 {
    value.rem_euclid(Q as i32) as u16
}

// FALCON FELT
// ================================================================================================

/// An element of the Falcon prime field Z/qZ, q = 12289, in canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FalconFelt(u16);

impl FalconFelt {
    /// Creates a field element from an unsigned value, reducing it modulo q.
    pub const fn new(value: u16) -> Self {
        FalconFelt(value % Q as u16)
    }

    /// Returns the canonical representative in [0, q-1].
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Returns the balanced representative in [-(q-1)/2, (q-1)/2].
    ///
    /// - 0 → 0
    /// - 6144 → 6144
    /// - 6145 → -6144
    /// - 12288 → -1
    pub const fn balanced_value(&self) -> i16 {
        let v = self.0 as i16;
        let g = (v > (MODULUS / 2)) as i16;
        v - MODULUS * g
    }

    /// Raises this element to the power `exp` by square-and-multiply.
    pub const fn pow(self, mut exp: u32) -> Self {
        let mut acc = 1u32;
        let mut base = self.0 as u32;
        while exp > 0 {
            if exp & 1 == 1 {
                acc = mq_mul(acc, base);
            }
            base = mq_mul(base, base);
            exp >>= 1;
        }
        FalconFelt(acc as u16)
    }
}

impl Add for FalconFelt {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        FalconFelt(mq_add(self.0 as u32, rhs.0 as u32) as u16)
    }
}

impl AddAssign for FalconFelt {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for FalconFelt {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        FalconFelt(mq_sub(self.0 as u32, rhs.0 as u32) as u16)
    }
}

impl SubAssign for FalconFelt {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for FalconFelt {
    type Output = FalconFelt;

    fn neg(self) -> Self::Output {
        FalconFelt(mq_sub(0, self.0 as u32) as u16)
    }
}

impl Mul for FalconFelt {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        FalconFelt(mq_mul(self.0 as u32, rhs.0 as u32) as u16)
    }
}

impl MulAssign for FalconFelt {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Div for FalconFelt {
    type Output = FalconFelt;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn div(self, rhs: Self) -> Self::Output {
        self * rhs.inverse_or_zero()
    }
}

impl DivAssign for FalconFelt {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs
    }
}

impl Zero for FalconFelt {
    fn zero() -> Self {
        FalconFelt(0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl One for FalconFelt {
    fn one() -> Self {
        FalconFelt(1)
    }
}

impl Inverse for FalconFelt {
    fn inverse_or_zero(self) -> Self {
        // x^(q-2) = x^-1 by Fermat's little theorem, and 0^(q-2) = 0
        self.pow(Q - 2)
    }
}

impl zeroize::DefaultIsZeroes for FalconFelt {}

impl From<i16> for FalconFelt {
    fn from(value: i16) -> Self {
        FalconFelt(signed_to_canonical(value as i32))
    }
}

impl From<i8> for FalconFelt {
    fn from(value: i8) -> Self {
        FalconFelt(signed_to_canonical(value as i32))
    }
}

impl TryFrom<u32> for FalconFelt {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value >= Q {
            Err(format!("value {value} is greater than or equal to the field modulus {MODULUS}"))
        } else {
            Ok(FalconFelt(value as u16))
        }
    }
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    use super::*;

    #[test]
    fn add_sub_wrap_around_modulus() {
        let a = FalconFelt::new(12288);
        let b = FalconFelt::new(5);
        assert_eq!((a + b).value(), 4);
        assert_eq!((b - a).value(), 6);
        assert_eq!((a - a).value(), 0);
        assert_eq!((-FalconFelt::zero()).value(), 0);
        assert_eq!((-b).value(), 12284);
    }

    #[test]
    fn arithmetic_matches_integer_reference() {
        let mut rng = ChaCha20Rng::from_seed([7u8; 32]);
        for _ in 0..1000 {
            let x: u32 = rng.random_range(0..Q);
            let y: u32 = rng.random_range(0..Q);
            let (a, b) = (FalconFelt::new(x as u16), FalconFelt::new(y as u16));

            assert_eq!((a + b).value() as u32, (x + y) % Q);
            assert_eq!((a - b).value() as u32, (x + Q - y) % Q);
            assert_eq!((a * b).value() as u32, (x * y) % Q);
        }
    }

    #[test]
    fn inverse_of_every_nonzero_element() {
        for x in 1..Q as u16 {
            let a = FalconFelt::new(x);
            assert_eq!(a * a.inverse_or_zero(), FalconFelt::one(), "no inverse for {x}");
        }
        assert_eq!(FalconFelt::zero().inverse_or_zero(), FalconFelt::zero());
    }

    #[test]
    fn signed_conversions() {
        assert_eq!(FalconFelt::from(-1i16).value(), 12288);
        assert_eq!(FalconFelt::from(-6144i16).value(), 6145);
        assert_eq!(FalconFelt::from(-128i8).value(), 12161);
        assert_eq!(FalconFelt::from(-1i16).balanced_value(), -1);
        assert_eq!(FalconFelt::new(6144).balanced_value(), 6144);
        assert_eq!(FalconFelt::new(6145).balanced_value(), -6144);
        assert!(FalconFelt::try_from(12289u32).is_err());
        assert_eq!(FalconFelt::try_from(12288u32).unwrap().value(), 12288);
    }
}
