use alloc::vec::Vec;
use core::{fmt, marker::PhantomData};

use subtle::ConstantTimeEq;
use winter_utils::{ByteReader, ByteWriter, Deserializable, DeserializationError, Serializable};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{KeyCodecError, KeyError, PublicKey, codec};
use crate::{
    FalconParameters,
    math::{FalconFelt, Polynomial, ntt},
};

// SECRET KEY
// ================================================================================================

/// Falcon secret key material `(f, g, F)`.
///
/// `G` is not stored: it is determined by the NTRU equation `fG - gF = q mod (x^N + 1)`. The
/// coefficients of `f` and `g` are bounded by the packing width `P::FG_BITS` of the encoded key,
/// so every `SecretKey` can be encoded.
pub struct SecretKey<P: FalconParameters> {
    f: Polynomial<i8>,
    g: Polynomial<i8>,
    big_f: Polynomial<i8>,
    _params: PhantomData<P>,
}

impl<P: FalconParameters> SecretKey<P> {
    // CONSTRUCTORS
    // --------------------------------------------------------------------------------------------

    /// Builds a secret key from its three polynomials.
    ///
    /// # Errors
    /// Returns an error if any polynomial does not have `P::N` coefficients, or if a coefficient
    /// of `f` or `g` does not fit in `P::FG_BITS` signed bits.
    pub fn from_polynomials(
        f: Polynomial<i8>,
        g: Polynomial<i8>,
        big_f: Polynomial<i8>,
    ) -> Result<Self, KeyCodecError> {
        for poly in [&f, &g, &big_f] {
            if poly.len() != P::N {
                return Err(KeyCodecError::WrongDegree { expected: P::N, actual: poly.len() });
            }
        }
        for poly in [&f, &g] {
            if let Some(index) = poly
                .coefficients
                .iter()
                .position(|&c| !codec::fits_in_bits(c as i16, P::FG_BITS))
            {
                return Err(KeyCodecError::CoefficientOutOfRange {
                    index,
                    value: poly.coefficients[index] as i16,
                    bits: P::FG_BITS,
                });
            }
        }
        Ok(Self { f, g, big_f, _params: PhantomData })
    }

    /// Decodes a secret key from its `P::SK_LEN`-byte encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyCodecError> {
        let mut f = vec![0i8; P::N];
        let mut g = vec![0i8; P::N];
        let mut big_f = vec![0i8; P::N];
        codec::decode_skey::<P>(bytes, &mut f, &mut g, &mut big_f)?;
        Ok(Self {
            f: Polynomial::new(f),
            g: Polynomial::new(g),
            big_f: Polynomial::new(big_f),
            _params: PhantomData,
        })
    }

    // PUBLIC ACCESSORS
    // --------------------------------------------------------------------------------------------

    /// Returns the `P::SK_LEN`-byte encoding of this key.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; P::SK_LEN];
        // degrees and coefficient ranges are checked on construction
        if let Err(err) = codec::encode_skey::<P>(
            &self.f.coefficients,
            &self.g.coefficients,
            &self.big_f.coefficients,
            &mut out,
        ) {
            unreachable!("secret key encoding failed: {err}");
        }
        out
    }

    pub fn f(&self) -> &Polynomial<i8> {
        &self.f
    }

    pub fn g(&self) -> &Polynomial<i8> {
        &self.g
    }

    pub fn big_f(&self) -> &Polynomial<i8> {
        &self.big_f
    }

    // KEY DERIVATION
    // --------------------------------------------------------------------------------------------

    /// Derives the public key `h = g * f^-1 mod (q, x^N + 1)`.
    ///
    /// # Errors
    /// Returns [`KeyError::NonInvertible`] if `f` is not invertible modulo q.
    pub fn public_key(&self) -> Result<PublicKey<P>, KeyError> {
        let f_ntt = Polynomial::<FalconFelt>::from(&self.f).ntt();
        if !ntt::all_nonzero(&f_ntt.coefficients) {
            return Err(KeyError::NonInvertible);
        }
        let g_ntt = Polynomial::<FalconFelt>::from(&self.g).ntt();
        let h = g_ntt.hadamard_div(&f_ntt).intt();

        Ok(PublicKey::from_polynomial(h)?)
    }

    /// Returns true if `h * f = g mod (q, x^N + 1)`, i.e. if `public_key` belongs to this key.
    ///
    /// The product is computed over the integers with the Karatsuba multiplier and then reduced
    /// modulo q.
    pub fn verify_public_key(&self, public_key: &PublicKey<P>) -> bool {
        let h = public_key.polynomial().map(|c| c.value() as f64);
        let f = Polynomial::<f64>::from(&self.f);
        let hf = Polynomial::<FalconFelt>::from_integral_f64(&h.karatsuba_mul_mod(&f));

        hf == Polynomial::<FalconFelt>::from(&self.g)
    }
}

impl<P: FalconParameters> Clone for SecretKey<P> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            g: self.g.clone(),
            big_f: self.big_f.clone(),
            _params: PhantomData,
        }
    }
}

impl<P: FalconParameters> PartialEq for SecretKey<P> {
    fn eq(&self, other: &Self) -> bool {
        let mut lhs = self.to_bytes();
        let mut rhs = other.to_bytes();
        let equal = lhs.ct_eq(&rhs).into();
        lhs.zeroize();
        rhs.zeroize();
        equal
    }
}

impl<P: FalconParameters> Eq for SecretKey<P> {}

impl<P: FalconParameters> fmt::Debug for SecretKey<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<elided secret for SecretKey>")
    }
}

impl<P: FalconParameters> fmt::Display for SecretKey<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<elided secret for SecretKey>")
    }
}

impl<P: FalconParameters> Zeroize for SecretKey<P> {
    fn zeroize(&mut self) {
        self.f.zeroize();
        self.g.zeroize();
        self.big_f.zeroize();
    }
}

impl<P: FalconParameters> Drop for SecretKey<P> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<P: FalconParameters> ZeroizeOnDrop for SecretKey<P> {}

// SERIALIZATION / DESERIALIZATION
// ================================================================================================

impl<P: FalconParameters> Serializable for SecretKey<P> {
    fn write_into<W: ByteWriter>(&self, target: &mut W) {
        let mut bytes = self.to_bytes();
        target.write_bytes(&bytes);
        bytes.zeroize();
    }

    fn get_size_hint(&self) -> usize {
        P::SK_LEN
    }
}

impl<P: FalconParameters> Deserializable for SecretKey<P> {
    fn read_from<R: ByteReader>(source: &mut R) -> Result<Self, DeserializationError> {
        let mut bytes = source.read_vec(P::SK_LEN)?;
        let key = Self::from_bytes(&bytes).map_err(|err| {
            DeserializationError::InvalidValue(format!("failed to decode secret key: {err}"))
        });
        bytes.zeroize();
        key
    }
}

// TESTS
// ================================================================================================
