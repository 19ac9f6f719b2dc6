//! Ed25519 signatures and the ristretto255 prime-order group, built on
//! arbitrary-precision field arithmetic.
//!
//! The crate provides:
//! - field and scalar arithmetic over p = 2^255 - 19 and the group order l
//! - affine and extended twisted-Edwards points with a windowed-NAF
//!   multiplication ladder and per-point precompute caching
//! - the ristretto255 encoding, decoding, and hash-to-group map
//! - RFC 8032 key derivation, signing, and verification
//!
//! Scalar multiplication through [`AffinePoint::multiply`] keeps a balanced
//! wNAF structure; [`ExtendedPoint::multiply_unsafe`] is variable-time and
//! meant for public inputs such as signature verification.

pub mod curve;
pub mod eddsa;
pub mod errors;
pub mod extended;
pub mod field;
pub mod keys;
pub mod ristretto;
pub mod serialize;

pub use curve::{AffinePoint, BASE, TORSION_SUBGROUP};
pub use eddsa::{public_key, sign, verify, Signature};
pub use errors::{CurveError, CurveResult};
pub use extended::ExtendedPoint;
pub use field::FieldElement;
pub use keys::SecretKey;
pub use ristretto::RistrettoPoint;
