//! Ristretto255: a prime-order group exposed over the Edwards curve by
//! quotienting out the small-order component. Wraps extended points in a
//! canonical encode/decode layer plus the Elligator hash-to-group map.

use crate::curve::{EDW_A, EDW_D};
use crate::errors::{CurveError, CurveResult};
use crate::extended::ExtendedPoint;
use crate::field::{invert_sqrt, uv_ratio, FieldElement, SQRT_M1};
use crate::serialize::{bytes255_to_number_le, bytes_to_hex, hex_to_bytes};
use lazy_static::lazy_static;
use num_bigint::BigUint;
use num_traits::Num;

lazy_static! {
    // sqrt(a*d - 1)
    pub static ref SQRT_AD_MINUS_ONE: FieldElement = FieldElement::new(
        BigUint::from_str_radix(
            "25063068953384623474111414158702152701244531502492656460079210482610430750235",
            10
        ).unwrap()
    );
    // 1/sqrt(a - d)
    pub static ref INVSQRT_A_MINUS_D: FieldElement = FieldElement::new(
        BigUint::from_str_radix(
            "54469307008909316920995813868745141605393597292927456921205312896311721017578",
            10
        ).unwrap()
    );
    // 1 - d^2
    pub static ref ONE_MINUS_D_SQ: FieldElement = FieldElement::new(
        BigUint::from_str_radix(
            "1159843021668779879193775521855586647937357759715417654439879720876111806838",
            10
        ).unwrap()
    );
    // (d - 1)^2
    pub static ref D_MINUS_ONE_SQ: FieldElement = FieldElement::new(
        BigUint::from_str_radix(
            "40440834346308536858101042469323190826248399146238708352240133220865137265952",
            10
        ).unwrap()
    );
}

/// An element of the ristretto255 group, carried as a representative of its
/// torsion coset.
#[derive(Debug, Clone)]
pub struct RistrettoPoint(pub ExtendedPoint);

// Coset equality: projective equality of representatives, or the
// cross-product identity X1*Y2 = X2*Y1.
impl PartialEq for RistrettoPoint {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 || &self.0.x * &other.0.y == &other.0.x * &self.0.y
    }
}
impl Eq for RistrettoPoint {}

impl RistrettoPoint {
    pub fn identity() -> Self {
        RistrettoPoint(ExtendedPoint::zero())
    }

    pub fn base() -> Self {
        RistrettoPoint(ExtendedPoint::base())
    }

    /// The underlying Edwards representative.
    pub fn inner(&self) -> &ExtendedPoint {
        &self.0
    }

    /// Decode a 32-byte canonical encoding.
    pub fn from_bytes(bytes: &[u8; 32]) -> CurveResult<Self> {
        let s = bytes255_to_number_le(bytes);
        // the encoding must be the canonical representative, bit for bit
        if s.to_le_bytes_len(32).as_slice() != &bytes[..] {
            return Err(CurveError::InvalidEncoding("non-canonical ristretto encoding"));
        }
        if s.is_negative() {
            return Err(CurveError::InvalidEncoding("ristretto encoding must be even"));
        }
        let one = FieldElement::one();
        let s2 = &s * &s;
        let u1 = &one + &(&*EDW_A * &s2); // 1 + a*s^2
        let u2 = &one - &(&*EDW_A * &s2); // 1 - a*s^2
        let u1_sq = &u1 * &u1;
        let u2_sq = &u2 * &u2;
        let v = &(&(&*EDW_A * &*EDW_D) * &u1_sq) - &u2_sq; // a*d*u1^2 - u2^2
        let (is_valid, i) = invert_sqrt(&(&v * &u2_sq)); // 1/sqrt(v*u2^2)
        let dx = &i * &u2;
        let dy = &(&i * &dx) * &v;
        let mut x = &(&s + &s) * &dx; // 2*s*Dx
        if x.is_negative() {
            x = -x;
        }
        let y = &u1 * &dy;
        let t = &x * &y;
        if !is_valid || t.is_negative() || y.is_zero() {
            return Err(CurveError::NotOnCurve);
        }
        Ok(RistrettoPoint(ExtendedPoint::new(x, y, one, t)))
    }

    pub fn from_hex(s: &str) -> CurveResult<Self> {
        let bytes = hex_to_bytes(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CurveError::InvalidEncoding("expected 32 bytes"))?;
        Self::from_bytes(&arr)
    }

    /// Canonical 32-byte encoding. Total for valid group elements: the
    /// inverse square root always exists here.
    pub fn to_bytes(&self) -> [u8; 32] {
        let p = &self.0;
        let u1 = &(&p.z + &p.y) * &(&p.z - &p.y);
        let u2 = &p.x * &p.y;
        let (_, invsqrt) = invert_sqrt(&(&u1 * &(&u2 * &u2)));
        let d1 = &invsqrt * &u1;
        let d2 = &invsqrt * &u2;
        let z_inv = &(&d1 * &d2) * &p.t;
        let mut x = p.x.clone();
        let mut y = p.y.clone();
        let d;
        if (&p.t * &z_inv).is_negative() {
            // rotate into the branch with non-negative t
            x = &p.y * &*SQRT_M1;
            y = &p.x * &*SQRT_M1;
            d = &d1 * &*INVSQRT_A_MINUS_D;
        } else {
            d = d2;
        }
        if (&x * &z_inv).is_negative() {
            y = -y;
        }
        let mut s = &(&p.z - &y) * &d;
        if s.is_negative() {
            s = -s;
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&s.to_le_bytes_len(32));
        out
    }

    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.to_bytes())
    }

    /// Map 64 uniform bytes to a group element: one Elligator evaluation per
    /// 32-byte half, summed.
    pub fn from_uniform_bytes(bytes: &[u8; 64]) -> Self {
        let mut half = [0u8; 32];
        half.copy_from_slice(&bytes[..32]);
        let p1 = calc_elligator_map(&bytes255_to_number_le(&half));
        half.copy_from_slice(&bytes[32..]);
        let p2 = calc_elligator_map(&bytes255_to_number_le(&half));
        RistrettoPoint(p1.add(&p2))
    }

    pub fn add(&self, rhs: &RistrettoPoint) -> RistrettoPoint {
        RistrettoPoint(self.0.add(&rhs.0))
    }

    pub fn subtract(&self, rhs: &RistrettoPoint) -> RistrettoPoint {
        RistrettoPoint(self.0.subtract(&rhs.0))
    }

    pub fn negate(&self) -> RistrettoPoint {
        RistrettoPoint(self.0.negate())
    }

    pub fn multiply(&self, scalar: &BigUint) -> CurveResult<RistrettoPoint> {
        Ok(RistrettoPoint(self.0.multiply(scalar, None)?))
    }
}

/// Ristretto's Elligator-2 variant: maps one field element to an extended
/// point on the even coset.
fn calc_elligator_map(r0: &FieldElement) -> ExtendedPoint {
    let one = FieldElement::one();
    let r = &*SQRT_M1 * &(r0 * r0);
    let ns = &(&r + &one) * &*ONE_MINUS_D_SQ;
    let mut c = -&one;
    let d = &(&c - &(&*EDW_D * &r)) * &(&r + &*EDW_D);
    let (ns_d_is_sq, mut s) = uv_ratio(&ns, &d);
    let mut s_ = &s * r0;
    if !s_.is_negative() {
        s_ = -s_;
    }
    if !ns_d_is_sq {
        s = s_;
        c = r.clone();
    }
    let nt = &(&(&c * &(&r - &one)) * &*D_MINUS_ONE_SQ) - &d;
    let s2 = &s * &s;
    let w0 = &(&s + &s) * &d;
    let w1 = &nt * &*SQRT_AD_MINUS_ONE;
    let w2 = &one - &s2;
    let w3 = &one + &s2;
    ExtendedPoint::new(&w0 * &w3, &w2 * &w1, &w1 * &w3, &w0 * &w2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha512};

    // multiples 0..=4 of the ristretto base point
    const SMALL_MULTIPLES: [&str; 5] = [
        "0000000000000000000000000000000000000000000000000000000000000000",
        "e2f2ae0a6abc4e71a884a961c500515f58e30b6aa582dd8db6a65945e08d2d76",
        "6a493210f7499cd17fecb510ae0cea23a110e8d5b901f8acadd3095c73a3b919",
        "94741f5d5d52755ece4f23f044ee27d5d1ea1e2bd196b462166b16152a9d0259",
        "da80862773358b466ffadfe0b3293ab3d9fd53c5ea6c955358f568322daf6a57",
    ];

    #[test]
    fn test_constants_satisfy_their_relations() {
        let one = FieldElement::one();
        let d = &*EDW_D;
        // 1 - d^2 and (d - 1)^2
        assert_eq!(*ONE_MINUS_D_SQ, &one - &(d * d));
        let d_minus_one = d - &one;
        assert_eq!(*D_MINUS_ONE_SQ, &d_minus_one * &d_minus_one);
        // sqrt(a*d - 1)
        let ad_minus_one = &(&*EDW_A * d) - &one;
        assert_eq!(&*SQRT_AD_MINUS_ONE * &*SQRT_AD_MINUS_ONE, ad_minus_one);
        // 1/sqrt(a - d)
        let inv_sq = &*INVSQRT_A_MINUS_D * &*INVSQRT_A_MINUS_D;
        assert!((&inv_sq * &(&*EDW_A - d)).is_one());
    }

    #[test]
    fn test_identity_roundtrip() {
        assert_eq!(RistrettoPoint::identity().to_bytes(), [0u8; 32]);
        let decoded = RistrettoPoint::from_bytes(&[0u8; 32]).unwrap();
        assert_eq!(decoded, RistrettoPoint::identity());
    }

    #[test]
    fn test_small_multiple_encodings() {
        let base = RistrettoPoint::base();
        let mut acc = RistrettoPoint::identity();
        for expected in SMALL_MULTIPLES {
            assert_eq!(acc.to_hex(), expected);
            acc = acc.add(&base);
        }
    }

    #[test]
    fn test_decode_encode_roundtrip() {
        for encoded in SMALL_MULTIPLES {
            let p = RistrettoPoint::from_hex(encoded).unwrap();
            assert_eq!(p.to_hex(), encoded);
        }
    }

    #[test]
    fn test_multiply_matches_addition_chain() {
        let base = RistrettoPoint::base();
        let four = base.multiply(&BigUint::from(4u32)).unwrap();
        assert_eq!(four.to_hex(), SMALL_MULTIPLES[4]);
        assert_eq!(four, base.add(&base).add(&base).add(&base));
    }

    #[test]
    fn test_rejects_non_canonical_encodings() {
        // s = p, reduces to zero and re-encodes differently
        let bad = "edffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff7f";
        assert!(matches!(
            RistrettoPoint::from_hex(bad).unwrap_err(),
            CurveError::InvalidEncoding(_)
        ));
        // bit 255 set, cleared by the 255-bit ingest
        let bad = "0000000000000000000000000000000000000000000000000000000000000080";
        assert!(matches!(
            RistrettoPoint::from_hex(bad).unwrap_err(),
            CurveError::InvalidEncoding(_)
        ));
        // 2^255 - 1 is above p after masking
        let bad = "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";
        assert!(RistrettoPoint::from_hex(bad).is_err());
    }

    #[test]
    fn test_rejects_negative_encodings() {
        // s = 1 is odd, hence "negative"
        let bad = "0100000000000000000000000000000000000000000000000000000000000000";
        assert!(matches!(
            RistrettoPoint::from_hex(bad).unwrap_err(),
            CurveError::InvalidEncoding(_)
        ));
    }

    #[test]
    fn test_negation_is_a_different_element() {
        let base = RistrettoPoint::base();
        assert_ne!(base, base.negate());
        assert_eq!(base.add(&base.negate()), RistrettoPoint::identity());
    }

    #[test]
    fn test_hash_to_group_espresso_vector() {
        let label = "Ristretto is traditionally a short shot of espresso coffee \
made with the normal amount of ground coffee but extracted with about half \
the amount of water in the same time by using a finer grind.";
        let digest = Sha512::digest(label.as_bytes());
        let mut wide = [0u8; 64];
        wide.copy_from_slice(&digest);
        let p = RistrettoPoint::from_uniform_bytes(&wide);
        assert_eq!(
            p.to_hex(),
            "3066f82a1a747d45120d1740f14358531a8f04bbffe6a819f86dfe50f44a0a46"
        );
        let decoded = RistrettoPoint::from_bytes(&p.to_bytes()).unwrap();
        assert_eq!(decoded, p);
        assert_eq!(decoded.to_bytes(), p.to_bytes());
    }

    #[test]
    fn test_hash_to_group_is_deterministic() {
        let wide = [7u8; 64];
        let a = RistrettoPoint::from_uniform_bytes(&wide);
        let b = RistrettoPoint::from_uniform_bytes(&wide);
        assert_eq!(a, b);
        assert_eq!(a.to_bytes(), b.to_bytes());
    }
}
