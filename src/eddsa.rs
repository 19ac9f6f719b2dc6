// src/eddsa.rs

use crate::curve::{AffinePoint, BASE, H, L};
use crate::errors::{CurveError, CurveResult};
use crate::extended::ExtendedPoint;
use crate::keys::{encode_private, expand, key_prefix, SecretKey};
use crate::serialize::{bytes_to_hex, bytes_to_number_le, hex_to_bytes, number_to_bytes_padded};
use num_bigint::BigUint;
use sha2::{Digest, Sha512};

/// --- Helpers ---

#[inline]
fn mod_l(x: &BigUint) -> BigUint {
    x % &*L
}

#[inline]
fn add_mod_l(a: &BigUint, b: &BigUint) -> BigUint {
    mod_l(&(a + b))
}

/// SHA-512 over the concatenated parts, read little-endian and reduced mod L.
fn hash_to_scalar(parts: &[&[u8]]) -> BigUint {
    let mut h = Sha512::new();
    for part in parts {
        h.update(part);
    }
    mod_l(&bytes_to_number_le(&h.finalize()))
}

/// --- Keys ---

/// Public key point for a seed: BASE times the clamped expanded scalar.
pub fn public_key(secret: &SecretKey) -> CurveResult<AffinePoint> {
    AffinePoint::from_private_key(secret)
}

/// --- EdDSA ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub r: AffinePoint,
    pub s: BigUint,
}

impl Signature {
    /// Decode compressed R followed by little-endian s; s >= L is rejected
    /// to rule out malleable encodings.
    pub fn from_bytes(bytes: &[u8]) -> CurveResult<Self> {
        if bytes.len() != 64 {
            return Err(CurveError::InvalidEncoding("expected 64 bytes of signature"));
        }
        let r = AffinePoint::from_bytes(&bytes[..32])?;
        let s = bytes_to_number_le(&bytes[32..]);
        if s >= *L {
            return Err(CurveError::OutOfRange("signature scalar must be below the group order"));
        }
        Ok(Signature { r, s })
    }

    pub fn from_hex(s: &str) -> CurveResult<Self> {
        Self::from_bytes(&hex_to_bytes(s)?)
    }

    pub fn to_bytes(&self) -> CurveResult<[u8; 64]> {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r.to_bytes());
        out[32..].copy_from_slice(&number_to_bytes_padded(&self.s, 32)?);
        Ok(out)
    }

    pub fn to_hex(&self) -> CurveResult<String> {
        Ok(bytes_to_hex(&self.to_bytes()?))
    }
}

/// Deterministic RFC 8032 signing.
pub fn sign(message: &[u8], secret: &SecretKey) -> CurveResult<Signature> {
    let expanded = expand(secret);
    let scalar = encode_private(&expanded);
    let public = BASE.multiply(&scalar)?;

    let r = hash_to_scalar(&[key_prefix(&expanded), message]);
    let big_r = BASE.multiply(&r)?;

    let hs = hash_to_scalar(&[&big_r.to_bytes(), &public.to_bytes(), message]);
    let s = add_mod_l(&r, &(&hs * &scalar)); // s = r + hs*scalar mod L

    Ok(Signature { r: big_r, s })
}

/// Permissive cofactored verification: 8*(R + hs*A - s*B) == identity.
/// Mismatches and degenerate inputs both come back as `false`; structural
/// errors belong to the decoding step, not here.
pub fn verify(signature: &Signature, message: &[u8], public: &AffinePoint) -> bool {
    verify_inner(signature, message, public).unwrap_or(false)
}

// multiply_unsafe is fine throughout: every input here is public.
fn verify_inner(
    signature: &Signature,
    message: &[u8],
    public: &AffinePoint,
) -> CurveResult<bool> {
    if signature.s >= *L {
        return Ok(false);
    }
    let hs = hash_to_scalar(&[&signature.r.to_bytes(), &public.to_bytes(), message]);

    let a = ExtendedPoint::from_affine(public);
    let r = ExtendedPoint::from_affine(&signature.r);
    let sb = ExtendedPoint::base().multiply_unsafe(&signature.s)?;
    let lhs = r.add(&a.multiply_unsafe(&hs)?).subtract(&sb);

    Ok(lhs.multiply_unsafe(&H)? == ExtendedPoint::zero())
}

/// --- Tests ---
