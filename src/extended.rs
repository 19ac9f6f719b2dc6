//! Extended-coordinate (X, Y, Z, T) point arithmetic: the hwcd group law,
//! batch affine conversion, and the two scalar-multiplication ladders.

use crate::curve::{AffinePoint, BASE, EDW_A, L};
use crate::errors::{CurveError, CurveResult};
use crate::field::FieldElement;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::sync::Arc;

/// A point in extended coordinates with Z != 0 and T*Z = X*Y. The affine
/// point represented is (X/Z, Y/Z).
#[derive(Debug, Clone)]
pub struct ExtendedPoint {
    pub x: FieldElement,
    pub y: FieldElement,
    pub z: FieldElement,
    pub t: FieldElement,
}

// Projective equality: X1/Z1 = X2/Z2 and Y1/Z1 = Y2/Z2, cross-multiplied.
impl PartialEq for ExtendedPoint {
    fn eq(&self, other: &Self) -> bool {
        &self.x * &other.z == &other.x * &self.z && &self.y * &other.z == &other.y * &self.z
    }
}
impl Eq for ExtendedPoint {}

impl ExtendedPoint {
    pub fn new(x: FieldElement, y: FieldElement, z: FieldElement, t: FieldElement) -> Self {
        ExtendedPoint { x, y, z, t }
    }

    /// The identity (0, 1, 1, 0).
    pub fn zero() -> Self {
        ExtendedPoint::new(
            FieldElement::zero(),
            FieldElement::one(),
            FieldElement::one(),
            FieldElement::zero(),
        )
    }

    pub fn base() -> Self {
        ExtendedPoint::from_affine(&BASE)
    }

    pub fn from_affine(p: &AffinePoint) -> Self {
        if *p == AffinePoint::zero() {
            return ExtendedPoint::zero();
        }
        let t = &p.x * &p.y;
        ExtendedPoint::new(p.x.clone(), p.y.clone(), FieldElement::one(), t)
    }

    pub fn to_affine(&self) -> CurveResult<AffinePoint> {
        Ok(self.to_affine_with(&self.z.invert()?))
    }

    /// Affine conversion with a caller-supplied 1/Z, for batch use.
    pub fn to_affine_with(&self, inv_z: &FieldElement) -> AffinePoint {
        AffinePoint::new(&self.x * inv_z, &self.y * inv_z)
    }

    /// Convert many points at once, paying for a single field inversion.
    pub fn to_affine_batch(points: &[ExtendedPoint]) -> CurveResult<Vec<AffinePoint>> {
        let zs: Vec<FieldElement> = points.iter().map(|p| p.z.clone()).collect();
        let invs = FieldElement::invert_batch(&zs)?;
        Ok(points
            .iter()
            .zip(&invs)
            .map(|(p, inv)| p.to_affine_with(inv))
            .collect())
    }

    /// Rescale every point to Z = 1 so later additions see pre-reduced T.
    pub fn normalize_z(points: &[ExtendedPoint]) -> CurveResult<Vec<ExtendedPoint>> {
        Ok(Self::to_affine_batch(points)?
            .iter()
            .map(Self::from_affine)
            .collect())
    }

    pub fn negate(&self) -> Self {
        ExtendedPoint::new(-&self.x, self.y.clone(), self.z.clone(), -&self.t)
    }

    /// Doubling per dbl-2008-hwcd, 3M + 4S.
    pub fn double(&self) -> Self {
        let a = &self.x * &self.x;
        let b = &self.y * &self.y;
        let zz = &self.z * &self.z;
        let c = &zz + &zz;
        let d = &*EDW_A * &a;
        let xy = &self.x + &self.y;
        let e = &(&(&xy * &xy) - &a) - &b;
        let g = &d + &b;
        let f = &g - &c;
        let h = &d - &b;
        let x3 = &e * &f;
        let y3 = &g * &h;
        let t3 = &e * &h;
        let z3 = &f * &g;
        ExtendedPoint::new(x3, y3, z3, t3)
    }

    /// Addition per add-2008-hwcd-4, 8M. The formula is independent of d
    /// but not unified; coincident inputs (F = 0) fall through to `double`.
    pub fn add(&self, other: &ExtendedPoint) -> Self {
        let a = &(&self.y - &self.x) * &(&other.y + &other.x);
        let b = &(&self.y + &self.x) * &(&other.y - &other.x);
        let f = &b - &a;
        if f.is_zero() {
            return self.double();
        }
        let c = &(&self.z + &self.z) * &other.t;
        let d = &(&self.t + &self.t) * &other.z;
        let e = &d + &c;
        let g = &b + &a;
        let h = &d - &c;
        let x3 = &e * &f;
        let y3 = &g * &h;
        let t3 = &e * &h;
        let z3 = &f * &g;
        ExtendedPoint::new(x3, y3, z3, t3)
    }

    pub fn subtract(&self, other: &ExtendedPoint) -> Self {
        self.add(&other.negate())
    }

    /// Variable-time double-and-add on `scalar mod l`. Timing leaks the
    /// scalar; restrict to public inputs such as signature verification.
    pub fn multiply_unsafe(&self, scalar: &BigUint) -> CurveResult<Self> {
        validate_scalar(scalar)?;
        let mut n = scalar % &*L;
        let mut p = ExtendedPoint::zero();
        let mut d = self.clone();
        while !n.is_zero() {
            if n.bit(0) {
                p = p.add(&d);
            }
            d = d.double();
            n >>= 1;
        }
        Ok(p)
    }

    /// wNAF scalar multiplication with a balanced dummy accumulator. The
    /// window table is cached on `affine_hint` when one is given.
    pub fn multiply(
        &self,
        scalar: &BigUint,
        affine_hint: Option<&AffinePoint>,
    ) -> CurveResult<Self> {
        validate_scalar(scalar)?;
        let n = scalar % &*L;
        let (p, f) = self.wnaf(n, affine_hint)?;
        let mut normalized = ExtendedPoint::normalize_z(&[p, f])?;
        Ok(normalized.swap_remove(0))
    }

    fn wnaf(
        &self,
        mut n: BigUint,
        affine_hint: Option<&AffinePoint>,
    ) -> CurveResult<(ExtendedPoint, ExtendedPoint)> {
        let hint: Option<&AffinePoint> = match affine_hint {
            Some(p) => Some(p),
            None if *self == ExtendedPoint::base() => Some(&*BASE),
            None => None,
        };
        let w = hint.map(AffinePoint::cached_window).unwrap_or(1);
        if w == 0 || 256 % w != 0 {
            return Err(CurveError::InvalidArgument(
                "invalid precomputation window, must divide 256",
            ));
        }
        if w > 16 {
            return Err(CurveError::InvalidArgument("precomputation window too large"));
        }

        let precomputes: Arc<Vec<ExtendedPoint>> = match hint.and_then(AffinePoint::cached_table) {
            Some(table) => table,
            None => {
                let mut table = self.precompute_window(w);
                if w != 1 {
                    table = ExtendedPoint::normalize_z(&table)?;
                }
                let table = Arc::new(table);
                if w != 1 {
                    if let Some(h) = hint {
                        h.store_table(table.clone());
                    }
                }
                table
            }
        };

        let mut p = ExtendedPoint::zero();
        let mut f = ExtendedPoint::zero();
        let windows = 256 / w + 1;
        let window_size = 1usize << (w - 1);
        let mask = (BigUint::one() << w) - BigUint::one();
        let max_number = 1i64 << w;

        for window in 0..windows {
            let offset = window as usize * window_size;
            // Extract W bits and shift them out.
            let mut wbits = (&n & &mask)
                .to_u64_digits()
                .first()
                .copied()
                .unwrap_or(0) as i64;
            n >>= w;
            // Signed recoding: fold the upper half of the window into a
            // carry, mapping wbits into [-2^(W-1), 2^(W-1)].
            if wbits > window_size as i64 {
                wbits -= max_number;
                n += BigUint::one();
            }
            if wbits == 0 {
                // Feed the dummy accumulator so zero windows cost the same
                // as the rest; alternate the sign by window parity.
                let mut pr = precomputes[offset].clone();
                if window % 2 == 1 {
                    pr = pr.negate();
                }
                f = f.add(&pr);
            } else {
                let mut cached = precomputes[offset + wbits.unsigned_abs() as usize - 1].clone();
                if wbits < 0 {
                    cached = cached.negate();
                }
                p = p.add(&cached);
            }
        }
        Ok((p, f))
    }

    /// Flat table of (256/W + 1) windows of 2^(W-1) consecutive multiples;
    /// a doubling bridges each window to the next.
    fn precompute_window(&self, w: u32) -> Vec<ExtendedPoint> {
        let windows = 256 / w + 1;
        let window_size = 1usize << (w - 1);
        let mut points = Vec::with_capacity(windows as usize * window_size);
        let mut p = self.clone();
        for _ in 0..windows {
            let mut base = p.clone();
            points.push(base.clone());
            for _ in 1..window_size {
                base = base.add(&p);
                points.push(base.clone());
            }
            p = base.double();
        }
        points
    }
}

/// Scalars handed to the multiplication ladders must be non-zero; a zero
/// input is an error rather than a shortcut to the identity.
pub(crate) fn validate_scalar(scalar: &BigUint) -> CurveResult<()> {
    if scalar.is_zero() {
        return Err(CurveError::InvalidArgument("expected a scalar greater than 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(k: u64) -> ExtendedPoint {
        ExtendedPoint::base()
            .multiply_unsafe(&BigUint::from(k))
            .unwrap()
    }

    #[test]
    fn test_double_matches_self_addition() {
        let g = ExtendedPoint::base();
        assert_eq!(g.double(), g.add(&g));
        let p = point(12345);
        assert_eq!(p.double(), p.add(&p));
    }

    #[test]
    fn test_addition_is_distributive() {
        let a = BigUint::from(987654321u64);
        let b = BigUint::from(123456789u64);
        let sum = ExtendedPoint::base().multiply_unsafe(&(&a + &b)).unwrap();
        let split = ExtendedPoint::base()
            .multiply_unsafe(&a)
            .unwrap()
            .add(&ExtendedPoint::base().multiply_unsafe(&b).unwrap());
        assert_eq!(sum, split);
    }

    #[test]
    fn test_scalar_multiplication_composes() {
        let a = BigUint::from(0xdeadbeefu64);
        let b = BigUint::from(0xcafeu64);
        let ab = (&a * &b) % &*L;
        let nested = ExtendedPoint::base()
            .multiply_unsafe(&a)
            .unwrap()
            .multiply_unsafe(&b)
            .unwrap();
        assert_eq!(nested, ExtendedPoint::base().multiply_unsafe(&ab).unwrap());
    }

    #[test]
    fn test_multiply_agrees_with_unsafe() {
        let k = BigUint::from(0x0123_4567_89ab_cdefu64);
        let fast = ExtendedPoint::base().multiply(&k, None).unwrap();
        let slow = ExtendedPoint::base().multiply_unsafe(&k).unwrap();
        assert_eq!(fast, slow);
    }

    #[test]
    fn test_order_kills_every_point() {
        let one_more = &*L + BigUint::one();
        assert_eq!(
            ExtendedPoint::base().multiply_unsafe(&L).unwrap(),
            ExtendedPoint::zero()
        );
        assert_eq!(
            ExtendedPoint::base().multiply(&one_more, None).unwrap(),
            ExtendedPoint::base()
        );
    }

    #[test]
    fn test_zero_scalar_rejected() {
        let zero = BigUint::zero();
        assert!(ExtendedPoint::base().multiply_unsafe(&zero).is_err());
        assert!(ExtendedPoint::base().multiply(&zero, None).is_err());
    }

    #[test]
    fn test_negate_cancels() {
        let p = point(777);
        assert_eq!(p.add(&p.negate()), ExtendedPoint::zero());
        assert_eq!(p.subtract(&p), ExtendedPoint::zero());
    }

    #[test]
    fn test_window_size_independence() {
        let p = point(31415926).to_affine().unwrap();
        let k = BigUint::from(0x1122_3344_5566_7788u64);
        let reference = p.multiply(&k).unwrap();
        for w in [1u32, 2, 4, 8] {
            p.set_window_size(w);
            assert_eq!(p.multiply(&k).unwrap(), reference, "window {w} disagrees");
        }
    }

    #[test]
    fn test_precompute_reuses_base_identity() {
        let cached = AffinePoint::precompute(8, None).unwrap();
        assert_eq!(cached, *BASE);
        assert_eq!(cached.window_size(), Some(8));
    }

    #[test]
    fn test_precompute_rejects_bad_window() {
        let other = point(9).to_affine().unwrap();
        let err = AffinePoint::precompute(7, Some(&other)).unwrap_err();
        assert!(matches!(err, CurveError::InvalidArgument(_)));
    }

    #[test]
    fn test_precompute_detaches_non_base_points() {
        let other = point(42).to_affine().unwrap();
        let cached = AffinePoint::precompute(4, Some(&other)).unwrap();
        assert_eq!(cached, other);
        assert_eq!(cached.window_size(), Some(4));
        // the original handle keeps its own cache state
        assert_eq!(other.window_size(), None);
    }

    #[test]
    fn test_normalize_z_rescales_without_moving() {
        let points = [point(3), point(5).double(), ExtendedPoint::zero()];
        let normalized = ExtendedPoint::normalize_z(&points).unwrap();
        for (orig, norm) in points.iter().zip(&normalized) {
            assert_eq!(orig, norm);
            assert!(norm.z.is_one());
        }
    }

    #[test]
    fn test_from_affine_identity() {
        let z = ExtendedPoint::from_affine(&AffinePoint::zero());
        assert_eq!(z, ExtendedPoint::zero());
        assert!(z.t.is_zero());
    }

    #[test]
    fn test_roundtrip_through_affine() {
        let p = point(271828);
        let affine = p.to_affine().unwrap();
        assert_eq!(ExtendedPoint::from_affine(&affine), p);
    }
}
