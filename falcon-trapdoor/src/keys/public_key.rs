use alloc::vec::Vec;
use core::marker::PhantomData;

use num::Zero;
use winter_utils::{ByteReader, ByteWriter, Deserializable, DeserializationError, Serializable};

use super::{KeyCodecError, codec};
use crate::{
    FalconParameters,
    math::{FalconFelt, Polynomial},
};

// PUBLIC KEY
// ================================================================================================

/// Falcon public key `h = g / f mod (q, x^N + 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey<P: FalconParameters> {
    h: Polynomial<FalconFelt>,
    _params: PhantomData<P>,
}

impl<P: FalconParameters> PublicKey<P> {
    /// Wraps the public polynomial `h`.
    ///
    /// # Errors
    /// Returns an error if `h` does not have `P::N` coefficients.
    pub fn from_polynomial(h: Polynomial<FalconFelt>) -> Result<Self, KeyCodecError> {
        if h.len() != P::N {
            return Err(KeyCodecError::WrongDegree { expected: P::N, actual: h.len() });
        }
        Ok(Self { h, _params: PhantomData })
    }

    /// Decodes a public key from its `P::PK_LEN`-byte encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyCodecError> {
        let mut h = vec![FalconFelt::zero(); P::N];
        codec::decode_pkey::<P>(bytes, &mut h)?;
        Ok(Self { h: Polynomial::new(h), _params: PhantomData })
    }

    /// Returns the `P::PK_LEN`-byte encoding of this key.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; P::PK_LEN];
        // degree and buffer length are fixed by construction
        if let Err(err) = codec::encode_pkey::<P>(&self.h.coefficients, &mut out) {
            unreachable!("public key encoding failed: {err}");
        }
        out
    }

    /// Returns the public polynomial `h`.
    pub fn polynomial(&self) -> &Polynomial<FalconFelt> {
        &self.h
    }
}

// SERIALIZATION / DESERIALIZATION
// ================================================================================================

impl<P: FalconParameters> Serializable for PublicKey<P> {
    fn write_into<W: ByteWriter>(&self, target: &mut W) {
        target.write_bytes(&self.to_bytes());
    }

    fn get_size_hint(&self) -> usize {
        P::PK_LEN
    }
}

impl<P: FalconParameters> Deserializable for PublicKey<P> {
    fn read_from<R: ByteReader>(source: &mut R) -> Result<Self, DeserializationError> {
        let bytes = source.read_vec(P::PK_LEN)?;
        Self::from_bytes(&bytes).map_err(|err| {
            DeserializationError::InvalidValue(format!("failed to decode public key: {err}"))
        })
    }
}

impl<P: FalconParameters> TryFrom<&[u8]> for PublicKey<P> {
    type Error = KeyCodecError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl<P: FalconParameters> core::fmt::Display for PublicKey<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&crate::utils::bytes_to_hex(&self.to_bytes()))
    }
}

// TESTS
// ================================================================================================
