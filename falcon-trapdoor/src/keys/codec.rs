//! Bit-exact encoding and decoding of Falcon public and secret keys.
//!
//! The decoders write into caller-provided buffers. On every error path the output buffers are
//! zeroed before the error is returned, so a failed decode never leaves partially decoded key
//! material behind.

use num::Zero;

use super::KeyCodecError;
use crate::{FALCON_ENCODING_BITS, FalconFelt, FalconParameters, MODULUS};

/// Bits per coefficient of the polynomial `F` in an encoded secret key.
pub const BIG_F_BITS: u32 = 8;

// PUBLIC KEY
// ================================================================================================

/// Encodes the public polynomial `h` into `out`, which must be exactly `P::PK_LEN` bytes long.
///
/// # Errors
/// Returns an error if `h` does not have `P::N` coefficients or `out` has the wrong length.
pub fn encode_pkey<P: FalconParameters>(
    h: &[FalconFelt],
    out: &mut [u8],
) -> Result<(), KeyCodecError> {
    check_degree::<P>(h.len())?;
    check_length(P::PK_LEN, out.len())?;

    out[0] = P::PK_HEADER;
    let mut writer = BitWriter::new(&mut out[1..]);
    for coeff in h {
        writer.write(coeff.value() as u32, FALCON_ENCODING_BITS);
    }
    debug_assert_eq!(writer.finish(), P::PK_LEN - 1);

    Ok(())
}

/// Decodes an encoded public key into `h`, which must have `P::N` coefficients.
///
/// # Errors
/// Returns an error, after zeroing `h`, if:
/// - `h` does not have `P::N` coefficients;
/// - `bytes` is not exactly `P::PK_LEN` bytes long;
/// - the header byte is not `P::PK_HEADER`;
/// - any packed coefficient is not smaller than q.
pub fn decode_pkey<P: FalconParameters>(
    bytes: &[u8],
    h: &mut [FalconFelt],
) -> Result<(), KeyCodecError> {
    let result = decode_pkey_inner::<P>(bytes, h);
    if result.is_err() {
        h.fill(FalconFelt::zero());
    }
    result
}

fn decode_pkey_inner<P: FalconParameters>(
    bytes: &[u8],
    h: &mut [FalconFelt],
) -> Result<(), KeyCodecError> {
    check_degree::<P>(h.len())?;
    check_length(P::PK_LEN, bytes.len())?;
    check_header(P::PK_HEADER, bytes[0])?;

    let mut reader = BitReader::new(&bytes[1..]);
    for (index, coeff) in h.iter_mut().enumerate() {
        let value = reader.read(FALCON_ENCODING_BITS);
        *coeff = FalconFelt::try_from(value)
            .map_err(|_| KeyCodecError::NonCanonicalCoefficient { index, value: value as u16 })?;
    }

    Ok(())
}

// SECRET KEY
// ================================================================================================

/// Encodes the secret polynomials `(f, g, F)` into `out`, which must be exactly `P::SK_LEN` bytes
/// long.
///
/// Coefficients of `f` and `g` must lie in `[-2^(w-1), 2^(w-1) - 1]` where `w = P::FG_BITS`;
/// every `i8` is a valid coefficient of `F`. The index reported in
/// [`KeyCodecError::CoefficientOutOfRange`] is relative to the offending polynomial.
///
/// # Errors
/// Returns an error if any polynomial does not have `P::N` coefficients, if `out` has the wrong
/// length, or if a coefficient of `f` or `g` is out of range. Nothing is written to `out` in
/// that case.
pub fn encode_skey<P: FalconParameters>(
    f: &[i8],
    g: &[i8],
    big_f: &[i8],
    out: &mut [u8],
) -> Result<(), KeyCodecError> {
    for poly in [f, g, big_f] {
        check_degree::<P>(poly.len())?;
    }
    check_length(P::SK_LEN, out.len())?;
    check_small_range(f, P::FG_BITS)?;
    check_small_range(g, P::FG_BITS)?;

    out[0] = P::SK_HEADER;
    let mut writer = BitWriter::new(&mut out[1..]);
    for &coeff in f.iter().chain(g) {
        writer.write(coeff as u32, P::FG_BITS);
    }
    for &coeff in big_f {
        writer.write(coeff as u32, BIG_F_BITS);
    }
    debug_assert_eq!(writer.finish(), P::SK_LEN - 1);

    Ok(())
}

/// Decodes an encoded secret key into `f`, `g` and `big_f`, each of which must have `P::N`
/// coefficients.
///
/// Every packed field is read as an unsigned integer `raw` of width `w` and mapped to
/// `raw - 2^w` when `raw > 2^(w-1) - 1`.
///
/// # Errors
/// Returns an error, after zeroing all three outputs, if any output does not have `P::N`
/// coefficients, if `bytes` is not exactly `P::SK_LEN` bytes long, or if the header byte is not
/// `P::SK_HEADER`.
pub fn decode_skey<P: FalconParameters>(
    bytes: &[u8],
    f: &mut [i8],
    g: &mut [i8],
    big_f: &mut [i8],
) -> Result<(), KeyCodecError> {
    let result = decode_skey_inner::<P>(bytes, f, g, big_f);
    if result.is_err() {
        f.fill(0);
        g.fill(0);
        big_f.fill(0);
    }
    result
}

fn decode_skey_inner<P: FalconParameters>(
    bytes: &[u8],
    f: &mut [i8],
    g: &mut [i8],
    big_f: &mut [i8],
) -> Result<(), KeyCodecError> {
    for len in [f.len(), g.len(), big_f.len()] {
        check_degree::<P>(len)?;
    }
    check_length(P::SK_LEN, bytes.len())?;
    check_header(P::SK_HEADER, bytes[0])?;

    let mut reader = BitReader::new(&bytes[1..]);
    for coeff in f.iter_mut().chain(g.iter_mut()) {
        *coeff = wrap_centered(reader.read(P::FG_BITS), P::FG_BITS);
    }
    for coeff in big_f.iter_mut() {
        *coeff = wrap_centered(reader.read(BIG_F_BITS), BIG_F_BITS);
    }

    Ok(())
}

/// Returns true if `value` can be encoded as a coefficient of `f` or `g` with the given width.
pub fn fits_in_bits(value: i16, bits: u32) -> bool {
    let half = 1i16 << (bits - 1);
    (-half..half).contains(&value)
}

// HELPERS
// ================================================================================================

fn check_degree<P: FalconParameters>(actual: usize) -> Result<(), KeyCodecError> {
    if actual != P::N {
        return Err(KeyCodecError::WrongDegree { expected: P::N, actual });
    }
    Ok(())
}

fn check_length(expected: usize, actual: usize) -> Result<(), KeyCodecError> {
    if actual != expected {
        return Err(KeyCodecError::InvalidLength { expected, actual });
    }
    Ok(())
}

fn check_header(expected: u8, found: u8) -> Result<(), KeyCodecError> {
    if found != expected {
        return Err(KeyCodecError::InvalidHeader { expected, found });
    }
    Ok(())
}

fn check_small_range(poly: &[i8], bits: u32) -> Result<(), KeyCodecError> {
    match poly.iter().position(|&c| !fits_in_bits(c as i16, bits)) {
        Some(index) => Err(KeyCodecError::CoefficientOutOfRange {
            index,
            value: poly[index] as i16,
            bits,
        }),
        None => Ok(()),
    }
}

/// Maps a raw `bits`-wide unsigned field to its centered signed value.
#[inline]
fn wrap_centered(raw: u32, bits: u32) -> i8 {
    let max = (1i32 << (bits - 1)) - 1;
    let raw = raw as i32;
    (raw - ((raw > max) as i32) * (1 << bits)) as i8
}

// BIT PACKING
// ================================================================================================

/// Packs unsigned fields of at most 24 bits into a byte buffer, least significant bit first.
struct BitWriter<'a> {
    out: &'a mut [u8],
    pos: usize,
    acc: u32,
    acc_len: u32,
}

impl<'a> BitWriter<'a> {
    fn new(out: &'a mut [u8]) -> Self {
        Self { out, pos: 0, acc: 0, acc_len: 0 }
    }

    /// Appends the low `bits` bits of `value`.
    fn write(&mut self, value: u32, bits: u32) {
        let mask = (1u32 << bits) - 1;
        self.acc |= (value & mask) << self.acc_len;
        self.acc_len += bits;
        while self.acc_len >= 8 {
            self.out[self.pos] = self.acc as u8;
            self.pos += 1;
            self.acc >>= 8;
            self.acc_len -= 8;
        }
    }

    /// Returns the number of bytes written. All encodings end on a byte boundary.
    fn finish(self) -> usize {
        debug_assert_eq!(self.acc_len, 0);
        self.pos
    }
}

/// Reads unsigned fields of at most 24 bits from a byte buffer, least significant bit first.
struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    acc: u32,
    acc_len: u32,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0, acc: 0, acc_len: 0 }
    }

    /// Reads the next `bits` bits. The caller guarantees the buffer holds enough bytes.
    fn read(&mut self, bits: u32) -> u32 {
        while self.acc_len < bits {
            self.acc |= (self.bytes[self.pos] as u32) << self.acc_len;
            self.pos += 1;
            self.acc_len += 8;
        }
        let value = self.acc & ((1u32 << bits) - 1);
        self.acc >>= bits;
        self.acc_len -= bits;
        value
    }
}

const _: () = assert!(MODULUS < (1 << FALCON_ENCODING_BITS));
