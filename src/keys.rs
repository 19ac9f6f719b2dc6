//! Private-key intake and the RFC 8032 key-expansion helpers.

use crate::curve::L;
use crate::errors::{CurveError, CurveResult};
use crate::serialize::{bytes_to_hex, bytes_to_number_le, hex_to_bytes, number_to_bytes_padded};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::RngCore;
use sha2::{Digest, Sha512};
use std::fmt;

/// A 32-byte Ed25519 seed, normalized to canonical little-endian form.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; 32]);

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print key material
        f.write_str("SecretKey([redacted])")
    }
}

impl SecretKey {
    pub fn from_bytes(bytes: &[u8]) -> CurveResult<Self> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CurveError::InvalidEncoding("expected 32 bytes of private key"))?;
        Ok(SecretKey(arr))
    }

    /// Strict 64-character hex form.
    pub fn from_hex(s: &str) -> CurveResult<Self> {
        Self::from_bytes(&hex_to_bytes(s)?)
    }

    /// Integer form of the seed: positive and below 2^256.
    pub fn from_uint(n: &BigUint) -> CurveResult<Self> {
        if n.is_zero() || n.bits() > 256 {
            return Err(CurveError::OutOfRange("private key integer must be in (0, 2^256)"));
        }
        let bytes = number_to_bytes_padded(n, 32)?;
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }

    /// Rejection-sampled random seed: fresh 32 bytes per round, accepted
    /// when the little-endian integer lands in (1, l). The retry bound
    /// exists only to surface a broken PRNG.
    pub fn random() -> CurveResult<Self> {
        let mut rng = rand::thread_rng();
        for _ in 0..1024 {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            let n = bytes_to_number_le(&bytes);
            if n > BigUint::one() && n < *L {
                return Ok(SecretKey(bytes));
            }
        }
        Err(CurveError::PrngExhausted)
    }
}

/// SHA-512 expansion of the seed: scalar material in the first half, the
/// deterministic-nonce prefix in the second.
pub fn expand(secret: &SecretKey) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(&Sha512::digest(secret.to_bytes()));
    out
}

/// Clamp the first digest half per RFC 8032: clear the three cofactor bits,
/// clear bit 255, set bit 254. Little-endian decode, reduced mod l.
pub fn encode_private(expanded: &[u8; 64]) -> BigUint {
    let mut head = [0u8; 32];
    head.copy_from_slice(&expanded[..32]);
    head[0] &= 248;
    head[31] &= 127;
    head[31] |= 64;
    bytes_to_number_le(&head) % &*L
}

/// The second digest half, fed into nonce derivation.
pub fn key_prefix(expanded: &[u8; 64]) -> &[u8] {
    &expanded[32..]
}
