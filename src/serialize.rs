//! Byte, integer, and hex conversion primitives shared by the point and
//! signature codecs.

use crate::errors::{CurveError, CurveResult};
use crate::field::FieldElement;
use num_bigint::BigUint;
use num_traits::One;

/// Little-endian decode of a byte slice of any length.
pub fn bytes_to_number_le(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_le(bytes)
}

/// Little-endian encode, zero-padded to exactly `len` bytes.
/// Errors when the integer does not fit.
pub fn number_to_bytes_padded(n: &BigUint, len: usize) -> CurveResult<Vec<u8>> {
    let mut bytes = n.to_bytes_le();
    if bytes.len() > len {
        return Err(CurveError::OutOfRange("integer too large for encoding length"));
    }
    bytes.resize(len, 0u8);
    Ok(bytes)
}

/// Ingest a 32-byte string as a field element: little-endian decode with
/// bit 255 cleared, then reduced mod p.
pub fn bytes255_to_number_le(bytes: &[u8; 32]) -> FieldElement {
    let mask = (BigUint::one() << 255u32) - BigUint::one();
    FieldElement::new(bytes_to_number_le(bytes) & mask)
}

/// Strict hex decode; odd-length and non-hex input are rejected.
pub fn hex_to_bytes(s: &str) -> CurveResult<Vec<u8>> {
    hex::decode(s).map_err(|_| CurveError::InvalidEncoding("expected a valid hex string"))
}

pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_le_roundtrip() {
        let n = BigUint::from(0x0102030405060708u64);
        let bytes = number_to_bytes_padded(&n, 32).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[0], 0x08);
        assert_eq!(bytes_to_number_le(&bytes), n);
    }

    #[test]
    fn test_padded_encoding_overflow() {
        let n = BigUint::one() << 64u32;
        assert!(number_to_bytes_padded(&n, 8).is_err());
        assert!(number_to_bytes_padded(&n, 9).is_ok());
    }

    #[test]
    fn test_bytes255_clears_top_bit() {
        let mut bytes = [0u8; 32];
        bytes[0] = 1;
        bytes[31] = 0x80;
        let n = bytes255_to_number_le(&bytes);
        assert_eq!(n, FieldElement::one());
    }

    #[test]
    fn test_hex_strictness() {
        assert!(hex_to_bytes("abc").is_err());
        assert!(hex_to_bytes("zz").is_err());
        assert_eq!(hex_to_bytes("00ff").unwrap(), vec![0x00, 0xff]);
        assert_eq!(bytes_to_hex(&[0xde, 0xad]), "dead");
    }
}
