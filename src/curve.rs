use crate::errors::{CurveError, CurveResult};
use crate::extended::ExtendedPoint;
use crate::field::{uv_ratio, FieldElement};
use crate::keys::{encode_private, expand, SecretKey};
use crate::serialize::{bytes_to_hex, hex_to_bytes};
use num_bigint::BigUint;
use num_traits::{Num, One};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use crate::field::P;

lazy_static::lazy_static! {
    // Twisted Edwards parameters: a = -1, d = -121665/121666
    pub static ref EDW_A: FieldElement = -FieldElement::one();

    pub static ref EDW_D: FieldElement = FieldElement::new(
        BigUint::from_str_radix(
            "37095705934669439343138083508754565189542113879843219016388785533085940283555",
            10
        ).unwrap()
    );

    // Base point coordinates
    pub static ref GX: FieldElement = FieldElement::new(BigUint::from_str_radix(
        "15112221349535400772501151409588531511454012693041857206046113283949847762202", 10
    ).unwrap());
    pub static ref GY: FieldElement = FieldElement::new(BigUint::from_str_radix(
        "46316835694926478169428394003475163141307993866256225615783033603165251855960", 10
    ).unwrap());

    // Prime subgroup order ℓ = 2^252 + 27742317777372353535851937790883648493
    pub static ref L: BigUint = BigUint::from_str_radix(
        "7237005577332262213973186563042994240857116359379907606001950938285454250989", 10
    ).unwrap();

    pub static ref H: BigUint = BigUint::from(8u32);

    // Generator, with an 8-wide precompute window enabled out of the box.
    pub static ref BASE: AffinePoint = {
        let g = AffinePoint::new(GX.clone(), GY.clone());
        g.set_window_size(8);
        g
    };
}

/// The eight small-order points, compressed. 8*T is the identity for each.
pub const TORSION_SUBGROUP: [&str; 8] = [
    "0100000000000000000000000000000000000000000000000000000000000000",
    "c7176a703d4dd84fba3c0b760d10670f2a2053fa2c39ccc64ec7fd7792ac037a",
    "0000000000000000000000000000000000000000000000000000000000000080",
    "26e8958fc2b227b045c3f489f2ef98f0d5dfac05d3c63339b13802886d53fc05",
    "ecffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff7f",
    "26e8958fc2b227b045c3f489f2ef98f0d5dfac05d3c63339b13802886d53fc85",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "c7176a703d4dd84fba3c0b760d10670f2a2053fa2c39ccc64ec7fd7792ac03fa",
];

/// Window table storage attached to an affine point. Clones of a point share
/// the same cell, so a table built for one handle serves them all; dropping
/// every handle frees the table.
#[derive(Default)]
pub(crate) struct PrecomputeCache {
    state: Mutex<CacheState>,
}

#[derive(Default)]
pub(crate) struct CacheState {
    pub(crate) window: Option<u32>,
    pub(crate) table: Option<Arc<Vec<ExtendedPoint>>>,
}

impl PrecomputeCache {
    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A point in affine coordinates (x, y). The identity is (0, 1).
#[derive(Clone)]
pub struct AffinePoint {
    pub x: FieldElement,
    pub y: FieldElement,
    pub(crate) cache: Arc<PrecomputeCache>,
}

impl PartialEq for AffinePoint {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}
impl Eq for AffinePoint {}

impl fmt::Debug for AffinePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AffinePoint")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

impl AffinePoint {
    /// Construct without an on-curve check; validation happens in the
    /// decoders.
    pub fn new(x: FieldElement, y: FieldElement) -> Self {
        AffinePoint { x, y, cache: Arc::new(PrecomputeCache::default()) }
    }

    /// The identity element (0, 1).
    pub fn zero() -> Self {
        AffinePoint::new(FieldElement::zero(), FieldElement::one())
    }

    /// Decode a compressed point per RFC 8032 §5.1.3: 255-bit y plus the
    /// sign bit of x in bit 255.
    pub fn from_bytes(bytes: &[u8]) -> CurveResult<Self> {
        if bytes.len() != 32 {
            return Err(CurveError::InvalidEncoding("expected 32 bytes"));
        }
        let mut normed = [0u8; 32];
        normed.copy_from_slice(bytes);
        normed[31] &= 0x7f;
        let sign_bit = (bytes[31] & 0x80) != 0;
        let y = FieldElement::from_le_bytes_canonical(&normed)
            .ok_or(CurveError::OutOfRange("expected y coordinate below field prime"))?;

        let y2 = &y * &y;
        let u = &y2 - &FieldElement::one();
        let v = &(&*EDW_D * &y2) + &FieldElement::one();
        let (valid, mut x) = uv_ratio(&u, &v);
        if !valid {
            return Err(CurveError::NotOnCurve);
        }
        let is_x_odd = x.is_negative();
        if is_x_odd != sign_bit {
            x = -x;
        }
        Ok(AffinePoint::new(x, y))
    }

    pub fn from_hex(s: &str) -> CurveResult<Self> {
        Self::from_bytes(&hex_to_bytes(s)?)
    }

    /// Compressed encoding: little-endian y with bit 255 set to the parity
    /// of x.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.y.to_le_bytes_len(32));
        if self.x.is_negative() {
            out[31] |= 0x80;
        }
        out
    }

    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.to_bytes())
    }

    /// Public key point for a private key: BASE times the clamped scalar of
    /// the SHA-512 expanded seed.
    pub fn from_private_key(secret: &SecretKey) -> CurveResult<Self> {
        let expanded = expand(secret);
        BASE.multiply(&encode_private(&expanded))
    }

    /// Birational map to the Montgomery u-coordinate: u = (1 + y)/(1 - y).
    pub fn to_x25519(&self) -> CurveResult<FieldElement> {
        let one = FieldElement::one();
        let inv = (&one - &self.y).invert()?;
        Ok((&one + &self.y) * inv)
    }

    pub fn negate(&self) -> Self {
        AffinePoint::new(-&self.x, self.y.clone())
    }

    pub fn add(&self, other: &AffinePoint) -> CurveResult<Self> {
        ExtendedPoint::from_affine(self)
            .add(&ExtendedPoint::from_affine(other))
            .to_affine()
    }

    pub fn subtract(&self, other: &AffinePoint) -> CurveResult<Self> {
        ExtendedPoint::from_affine(self)
            .subtract(&ExtendedPoint::from_affine(other))
            .to_affine()
    }

    /// Constant-time-structured scalar multiplication, keyed by this point's
    /// precompute cache.
    pub fn multiply(&self, scalar: &BigUint) -> CurveResult<Self> {
        ExtendedPoint::from_affine(self)
            .multiply(scalar, Some(self))?
            .to_affine()
    }

    /// Record a wNAF window width for this point and drop any table built
    /// for the previous width.
    pub fn set_window_size(&self, window: u32) {
        let mut state = self.cache.state();
        state.window = Some(window);
        state.table = None;
    }

    pub fn window_size(&self) -> Option<u32> {
        self.cache.state().window
    }

    /// Build the window table for `point` (the generator when omitted) by
    /// setting the window width and running a throwaway multiply. Invalid
    /// widths surface from the ladder as `InvalidArgument`.
    pub fn precompute(window: u32, point: Option<&AffinePoint>) -> CurveResult<Self> {
        let cached = match point {
            Some(p) if *p != *BASE => AffinePoint::new(p.x.clone(), p.y.clone()),
            _ => BASE.clone(),
        };
        cached.set_window_size(window);
        cached.multiply(&BigUint::one())?;
        Ok(cached)
    }

    pub(crate) fn cached_window(&self) -> u32 {
        self.cache.state().window.unwrap_or(1)
    }

    pub(crate) fn cached_table(&self) -> Option<Arc<Vec<ExtendedPoint>>> {
        self.cache.state().table.clone()
    }

    pub(crate) fn store_table(&self, table: Arc<Vec<ExtendedPoint>>) {
        self.cache.state().table = Some(table);
    }
}
