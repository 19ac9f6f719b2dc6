use crate::errors::{CurveError, CurveResult};
use num_bigint::{BigInt, BigUint};
use num_traits::{Num, One, Zero};
use std::ops::{Add, Mul, Neg, Sub};

lazy_static::lazy_static! {
    // p = 2^255 - 19
    pub static ref P: BigUint = BigUint::from_str_radix("57896044618658097711785492504343953926634992332820282019728792003956564819949", 10).unwrap();

    // sqrt(-1) mod p
    pub static ref SQRT_M1: FieldElement = FieldElement::new(
        BigUint::from_str_radix("19681161376707505956807079304988542015446066515923890162744021073123829784752", 10).unwrap()
    );
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldElement(pub BigUint);

// --- Constructors and Helpers ---
impl FieldElement {
    pub fn new(n: BigUint) -> Self { FieldElement(n % &*P) }
    pub fn from_u64(n: u64) -> Self { FieldElement::new(BigUint::from(n)) }
    pub fn zero() -> Self { FieldElement(BigUint::zero()) }
    pub fn one() -> Self { FieldElement(BigUint::one()) }
    pub fn to_biguint(&self) -> BigUint { self.0.clone() }
    pub fn is_zero(&self) -> bool { self.0.is_zero() }
    pub fn is_one(&self) -> bool { self.0.is_one() }
    /// Exponentiate in the field: self^e mod p
    pub fn pow_big(&self, e: &BigUint) -> Self { FieldElement(self.0.modpow(e, &P)) }

    /// Multiplicative inverse via the extended Euclidean algorithm.
    /// Errors on zero input; there is no Fermat fallback.
    pub fn invert(&self) -> CurveResult<Self> {
        Ok(FieldElement(invert_mod(&self.0, &P)?))
    }

    /// Batch inversion with Montgomery's trick: one modular inversion plus
    /// roughly 3(n-1) multiplications. Zero entries pass through as zero.
    pub fn invert_batch(elems: &[FieldElement]) -> CurveResult<Vec<FieldElement>> {
        let mut scratch = vec![FieldElement::zero(); elems.len()];
        let mut acc = FieldElement::one();
        for (i, e) in elems.iter().enumerate() {
            if e.is_zero() {
                continue;
            }
            scratch[i] = acc.clone();
            acc = &acc * e;
        }
        let mut acc = acc.invert()?;
        for (i, e) in elems.iter().enumerate().rev() {
            if e.is_zero() {
                continue;
            }
            scratch[i] = &acc * &scratch[i];
            acc = &acc * e;
        }
        Ok(scratch)
    }

    /// self^(2^k) by k iterated squarings.
    pub fn pow2(&self, k: u32) -> Self {
        let mut res = self.clone();
        for _ in 0..k {
            res = &res * &res;
        }
        res
    }

    /// self^((p-5)/8), the square-root exponent for p = 5 (mod 8).
    /// Unrolled addition chain over successive 2^k - 1 exponent patterns.
    pub fn pow_2_252_3(&self) -> Self {
        let x = self;
        let x2 = x * x;
        let b2 = &x2 * x; // x^3
        let b4 = &b2.pow2(2) * &b2; // x^15
        let b5 = &b4.pow2(1) * x; // x^31
        let b10 = &b5.pow2(5) * &b5;
        let b20 = &b10.pow2(10) * &b10;
        let b40 = &b20.pow2(20) * &b20;
        let b80 = &b40.pow2(40) * &b40;
        let b160 = &b80.pow2(80) * &b80;
        let b240 = &b160.pow2(80) * &b80;
        let b250 = &b240.pow2(10) * &b10;
        &b250.pow2(2) * x
    }

    /// Parse a little-endian byte slice into a canonical field element (< p).
    pub fn from_le_bytes_canonical(bytes: &[u8]) -> Option<Self> {
        let n = BigUint::from_bytes_le(bytes);
        if &n < &*P { Some(FieldElement(n)) } else { None }
    }

    /// Serialize to little-endian with fixed length (pads as needed).
    pub fn to_le_bytes_len(&self, len: usize) -> Vec<u8> {
        let mut b = self.0.to_bytes_le();
        b.resize(len, 0u8);
        b
    }

    /// Parity bit (least significant bit) of the canonical representative
    pub fn parity(&self) -> u8 { self.0.bit(0) as u8 }

    /// An element is "negative" when its canonical representative is odd.
    pub fn is_negative(&self) -> bool { self.0.bit(0) }
}

/// Inverse of `a` modulo `modulo` via the signed extended Euclidean
/// algorithm. Errors on zero input and on gcd != 1.
pub(crate) fn invert_mod(a: &BigUint, modulo: &BigUint) -> CurveResult<BigUint> {
    if a.is_zero() || modulo.is_zero() {
        return Err(CurveError::InvalidArgument("invert expects positive integers"));
    }
    let mut a = BigInt::from(a % modulo);
    let mut b = BigInt::from(modulo.clone());
    let mut x = BigInt::zero();
    let mut y = BigInt::one();
    let mut u = BigInt::one();
    let mut v = BigInt::zero();
    while !a.is_zero() {
        let q = &b / &a;
        let r = &b % &a;
        let m = &x - &u * &q;
        let n = &y - &v * &q;
        b = a;
        a = r;
        x = u;
        y = v;
        u = m;
        v = n;
    }
    if !b.is_one() {
        return Err(CurveError::InvalidArgument("inverse does not exist"));
    }
    let p = BigInt::from(modulo.clone());
    let reduced = ((x % &p) + &p) % &p;
    Ok(reduced.magnitude().clone())
}

/// Given u and v, find x with x^2 * v = u (mod p). A single exponentiation
/// serves as both inversion and square root; multiplying by SQRT_M1 repairs
/// the root when v*x^2 lands on -u. The flag is false when no root exists,
/// and x is always the non-negative choice.
pub fn uv_ratio(u: &FieldElement, v: &FieldElement) -> (bool, FieldElement) {
    let v3 = &(v * v) * v;
    let v7 = &(&v3 * &v3) * v;
    let mut x = &(u * &v3) * &(u * &v7).pow_2_252_3();
    let vx2 = &(v * &x) * &x;
    let root1 = x.clone();
    let root2 = &x * &*SQRT_M1;
    let use_root1 = vx2 == *u;
    let use_root2 = vx2 == -u;
    let no_root = vx2 == &(-u) * &*SQRT_M1;
    if use_root1 {
        x = root1;
    }
    if use_root2 || no_root {
        x = root2;
    }
    if x.is_negative() {
        x = -x;
    }
    (use_root1 || use_root2, x)
}

/// 1/sqrt(v), expressed through `uv_ratio` with u = 1.
pub fn invert_sqrt(v: &FieldElement) -> (bool, FieldElement) {
    uv_ratio(&FieldElement::one(), v)
}

// --- Trait Implementations ---

// Helper for safe modular subtraction
fn sub_mod(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    if a >= b {
        a - b
    } else {
        a + p - b
    }
}

// Negation
impl Neg for FieldElement {
    type Output = Self;
    fn neg(self) -> Self { FieldElement(sub_mod(&P, &self.0, &P) % &*P) }
}
impl Neg for &FieldElement {
    type Output = FieldElement;
    fn neg(self) -> FieldElement { FieldElement(sub_mod(&P, &self.0, &P) % &*P) }
}

// Addition
impl Add for FieldElement {
    type Output = Self;
    fn add(self, rhs: Self) -> Self { FieldElement((self.0 + rhs.0) % &*P) }
}
impl Add<&FieldElement> for FieldElement {
    type Output = FieldElement;
    fn add(self, rhs: &FieldElement) -> FieldElement { FieldElement((self.0 + &rhs.0) % &*P) }
}
impl Add<FieldElement> for &FieldElement {
    type Output = FieldElement;
    fn add(self, rhs: FieldElement) -> FieldElement { FieldElement((&self.0 + rhs.0) % &*P) }
}
impl Add<&FieldElement> for &FieldElement {
    type Output = FieldElement;
    fn add(self, rhs: &FieldElement) -> FieldElement { FieldElement((&self.0 + &rhs.0) % &*P) }
}

// Subtraction
impl Sub for FieldElement {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self { FieldElement(sub_mod(&self.0, &rhs.0, &P)) }
}
impl Sub<&FieldElement> for FieldElement {
    type Output = FieldElement;
    fn sub(self, rhs: &FieldElement) -> FieldElement { FieldElement(sub_mod(&self.0, &rhs.0, &P)) }
}
impl Sub<FieldElement> for &FieldElement {
    type Output = FieldElement;
    fn sub(self, rhs: FieldElement) -> FieldElement { FieldElement(sub_mod(&self.0, &rhs.0, &P)) }
}
impl Sub<&FieldElement> for &FieldElement {
    type Output = FieldElement;
    fn sub(self, rhs: &FieldElement) -> FieldElement { FieldElement(sub_mod(&self.0, &rhs.0, &P)) }
}

// Multiplication
impl Mul for FieldElement {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self { FieldElement((self.0 * rhs.0) % &*P) }
}
impl Mul<&FieldElement> for FieldElement {
    type Output = FieldElement;
    fn mul(self, rhs: &FieldElement) -> FieldElement { FieldElement((self.0 * &rhs.0) % &*P) }
}
impl Mul<FieldElement> for &FieldElement {
    type Output = FieldElement;
    fn mul(self, rhs: FieldElement) -> FieldElement { FieldElement((&self.0 * rhs.0) % &*P) }
}
impl Mul<&FieldElement> for &FieldElement {
    type Output = FieldElement;
    fn mul(self, rhs: &FieldElement) -> FieldElement { FieldElement((&self.0 * &rhs.0) % &*P) }
}
