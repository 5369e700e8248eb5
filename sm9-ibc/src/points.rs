//! The two pairing groups.
//!
//! G1 is the prime-order BN curve `y^2 = x^3 + 5` over Fp, G2 the
//! order-n group of points on its sextic twist `y^2 = x^3 + 5u` over
//! Fp2. The generators are the standard's published base points `P1`
//! and `P2`; both are checked against the curve equation and the
//! group order at start-up, so a mistyped constant fails loudly
//! rather than producing a working-but-foreign group.

use lazy_static::lazy_static;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Num, One, Signed, Zero};

use crate::error::{Error, Result};
use crate::fp::{fp_add, fp_from_bytes, fp_inv, fp_mul, fp_neg, fp_to_bytes, N, Q};
use crate::tower::{Fp12, Fp2};

/// an affine point of G1; the identity is carried as a flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct G1Point {
    pub(crate) x: BigInt,
    pub(crate) y: BigInt,
    infinity: bool,
}

/// an affine point of the twist curve underlying G2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct G2Point {
    pub(crate) x: Fp2,
    pub(crate) y: Fp2,
    infinity: bool,
}

/// the uncompressed wire width of a G1 point
pub const G1_BYTES: usize = 65;

const CURVE_B: u32 = 5;

impl G1Point {
    pub(crate) fn infinity() -> G1Point {
        G1Point { x: BigInt::zero(), y: BigInt::zero(), infinity: true }
    }

    pub(crate) fn is_infinity(&self) -> bool {
        self.infinity
    }

    fn on_curve(x: &BigInt, y: &BigInt) -> bool {
        let lhs = fp_mul(y, y);
        let rhs = fp_add(&fp_mul(&fp_mul(x, x), x), &BigInt::from(CURVE_B));
        lhs == rhs
    }

    /// a finite point, checked against the curve equation
    pub(crate) fn new(x: BigInt, y: BigInt) -> Result<G1Point> {
        if !G1Point::on_curve(&x, &y) {
            return Err(Error::NotOnCurve);
        }
        Ok(G1Point { x, y, infinity: false })
    }

    pub(crate) fn neg(&self) -> G1Point {
        if self.infinity {
            return G1Point::infinity();
        }
        G1Point { x: self.x.clone(), y: fp_neg(&self.y), infinity: false }
    }

    pub(crate) fn add(&self, other: &G1Point) -> Result<G1Point> {
        if self.infinity {
            return Ok(other.clone());
        }
        if other.infinity {
            return Ok(self.clone());
        }
        if self.x == other.x {
            if fp_add(&self.y, &other.y).is_zero() {
                return Ok(G1Point::infinity());
            }
            return self.double();
        }
        let lambda = fp_mul(
            &fp_neg(&(&self.y - &other.y)),
            &fp_inv(&(&other.x - &self.x))?,
        );
        Ok(self.chord(other, &lambda))
    }

    pub(crate) fn double(&self) -> Result<G1Point> {
        if self.infinity || self.y.is_zero() {
            return Ok(G1Point::infinity());
        }
        let lambda = fp_mul(
            &fp_mul(&BigInt::from(3u32), &fp_mul(&self.x, &self.x)),
            &fp_inv(&(&self.y * 2))?,
        );
        Ok(self.chord(self, &lambda))
    }

    fn chord(&self, other: &G1Point, lambda: &BigInt) -> G1Point {
        let x = fp_mul(lambda, lambda) - &self.x - &other.x;
        let x = x.mod_floor(&Q);
        let y = fp_mul(lambda, &(&self.x - &x)) - &self.y;
        G1Point { x, y: y.mod_floor(&Q), infinity: false }
    }

    /// double-and-add; `k` must be non-negative and is not reduced
    pub(crate) fn scalar_mult(&self, k: &BigInt) -> Result<G1Point> {
        if k.is_negative() {
            return Err(Error::InvalidScalar);
        }
        let mut acc = G1Point::infinity();
        for byte in k.to_bytes_be().1.iter() {
            for bit in (0..8).rev() {
                acc = acc.double()?;
                if byte >> bit & 1 == 1 {
                    acc = acc.add(self)?;
                }
            }
        }
        Ok(acc)
    }

    /// `04 || x || y`, 65 bytes; the identity has no encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.infinity {
            return Err(Error::NotOnCurve);
        }
        let mut out = Vec::with_capacity(G1_BYTES);
        out.push(0x04);
        out.extend_from_slice(&fp_to_bytes(&self.x));
        out.extend_from_slice(&fp_to_bytes(&self.y));
        Ok(out)
    }

    pub fn from_bytes(raw: &[u8]) -> Result<G1Point> {
        if raw.len() != G1_BYTES || raw[0] != 0x04 {
            return Err(Error::InvalidEncoding { expected: G1_BYTES, got: raw.len() });
        }
        let x = fp_from_bytes(&raw[1..33])?;
        let y = fp_from_bytes(&raw[33..])?;
        G1Point::new(x, y)
    }
}

impl G2Point {
    pub(crate) fn infinity() -> G2Point {
        G2Point { x: Fp2::zero(), y: Fp2::zero(), infinity: true }
    }

    pub(crate) fn is_infinity(&self) -> bool {
        self.infinity
    }

    fn on_twist(x: &Fp2, y: &Fp2, b: &Fp2) -> bool {
        y.square() == x.square().mul(x).add(b)
    }

    pub(crate) fn add(&self, other: &G2Point) -> Result<G2Point> {
        if self.infinity {
            return Ok(other.clone());
        }
        if other.infinity {
            return Ok(self.clone());
        }
        if self.x == other.x {
            if self.y.add(&other.y).is_zero() {
                return Ok(G2Point::infinity());
            }
            return self.double();
        }
        let lambda = other.y.sub(&self.y).mul(&other.x.sub(&self.x).inv()?);
        Ok(self.chord(other, &lambda))
    }

    pub(crate) fn double(&self) -> Result<G2Point> {
        if self.infinity || self.y.is_zero() {
            return Ok(G2Point::infinity());
        }
        let lambda = self
            .x
            .square()
            .mul_by_fp(&BigInt::from(3u32))
            .mul(&self.y.double().inv()?);
        Ok(self.chord(self, &lambda))
    }

    fn chord(&self, other: &G2Point, lambda: &Fp2) -> G2Point {
        let x = lambda.square().sub(&self.x).sub(&other.x);
        let y = lambda.mul(&self.x.sub(&x)).sub(&self.y);
        G2Point { x, y, infinity: false }
    }

    pub(crate) fn scalar_mult(&self, k: &BigInt) -> Result<G2Point> {
        if k.is_negative() {
            return Err(Error::InvalidScalar);
        }
        let mut acc = G2Point::infinity();
        for byte in k.to_bytes_be().1.iter() {
            for bit in (0..8).rev() {
                acc = acc.double()?;
                if byte >> bit & 1 == 1 {
                    acc = acc.add(self)?;
                }
            }
        }
        Ok(acc)
    }

    /// `04 || x || y` with each Fp2 coefficient high part first
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.infinity {
            return Err(Error::NotOnCurve);
        }
        let mut out = Vec::with_capacity(129);
        out.push(0x04);
        out.extend_from_slice(&self.x.to_bytes());
        out.extend_from_slice(&self.y.to_bytes());
        Ok(out)
    }

    pub fn from_bytes(raw: &[u8]) -> Result<G2Point> {
        if raw.len() != 129 || raw[0] != 0x04 {
            return Err(Error::InvalidEncoding { expected: 129, got: raw.len() });
        }
        let x = Fp2::new(fp_from_bytes(&raw[33..65])?, fp_from_bytes(&raw[1..33])?);
        let y = Fp2::new(fp_from_bytes(&raw[97..])?, fp_from_bytes(&raw[65..97])?);
        let params = group_params()?;
        if !G2Point::on_twist(&x, &y, &params.twist_b) {
            return Err(Error::NotOnCurve);
        }
        Ok(G2Point { x, y, infinity: false })
    }
}

/// everything the pairing needs that is fixed for the curve
pub(crate) struct GroupParams {
    pub(crate) g1: G1Point,
    pub(crate) g2: G2Point,
    pub(crate) twist_b: Fp2,
    /// factors turning twist coordinates into E(Fp12) coordinates
    pub(crate) untwist_x: Fp12,
    pub(crate) untwist_y: Fp12,
    /// `(q^12 - 1) / n`, the reduced pairing exponent
    pub(crate) final_exponent: BigInt,
}

// The standard base points. G2 coordinates are Fp2 pairs written as
// (c0, c1) for c0 + c1*u.
const G1_X: &str = "93DE051D62BF718FF5ED0704487D01D6E1E4086909DC3280E8C4E4817C66DDDD";
const G1_Y: &str = "21FE8DDA4F21E607631065125C395BBC1C1C00CBFA6024350C464CD70A3EA616";
const G2_X0: &str = "3722755292130B08D2AAB97FD34EC120EE265948D19C17ABF9B7213BAF82D65B";
const G2_X1: &str = "85AEF3D078640C98597B6027B441A01FF1DD2C190F5E93C454806C11D8806141";
const G2_Y0: &str = "A7CF28D519BE3DA65F3170153D278FF247EFBA98A71A08116215BBA5C999A7C7";
const G2_Y1: &str = "17509B092E845C1266BA0D262CBEE6ED0736A96FA347C8BD856DC76B84EBEB96";

fn fp_const(hex: &str) -> BigInt {
    match BigInt::from_str_radix(hex, 16) {
        Ok(v) => v,
        Err(_) => unreachable!("built-in curve constants are well formed"),
    }
}

fn load_g1_generator() -> Result<G1Point> {
    let g = G1Point::new(fp_const(G1_X), fp_const(G1_Y))?;
    if !g.scalar_mult(&N)?.is_infinity() {
        return Err(Error::Setup("base curve generator"));
    }
    Ok(g)
}

fn load_g2_generator() -> Result<(G2Point, Fp2)> {
    let twist_b = Fp2::new(BigInt::zero(), BigInt::from(CURVE_B));
    let x = Fp2::new(fp_const(G2_X0), fp_const(G2_X1));
    let y = Fp2::new(fp_const(G2_Y0), fp_const(G2_Y1));
    if !G2Point::on_twist(&x, &y, &twist_b) {
        return Err(Error::Setup("twist generator"));
    }
    let point = G2Point { x, y, infinity: false };
    if !point.scalar_mult(&N)?.is_infinity() {
        return Err(Error::Setup("twist generator"));
    }
    Ok((point, twist_b))
}

fn derive_params() -> Result<GroupParams> {
    let g1 = load_g1_generator()?;
    let (g2, twist_b) = load_g2_generator()?;

    // D-type twists untwist by w^2 / w^3, M-type by their inverses;
    // D-type iff b' * u = b
    let d_type = twist_b.mul_by_u() == Fp2::from_u64(CURVE_B as u64);
    let (untwist_x, untwist_y) = if d_type {
        (Fp12::w_squared(), Fp12::w_cubed())
    } else {
        (Fp12::w_squared().inv()?, Fp12::w_cubed().inv()?)
    };

    let mut q12 = BigInt::one();
    for _ in 0..12 {
        q12 = q12 * &*Q;
    }
    let final_exponent = (q12 - 1) / &*N;

    Ok(GroupParams { g1, g2, twist_b, untwist_x, untwist_y, final_exponent })
}

lazy_static! {
    static ref PARAMS: Result<GroupParams> = derive_params();
}

pub(crate) fn group_params() -> Result<&'static GroupParams> {
    match &*PARAMS {
        Ok(params) => Ok(params),
        Err(_) => Err(Error::Setup("group parameters")),
    }
}

/// the G1 generator `P1`
pub(crate) fn g1_generator() -> Result<G1Point> {
    Ok(group_params()?.g1.clone())
}

/// the G2 generator `P2`
pub(crate) fn g2_generator() -> Result<G2Point> {
    Ok(group_params()?.g2.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generators_match_the_published_coordinates() {
        let g1 = g1_generator().unwrap();
        assert_eq!(
            hex::encode_upper(g1.to_bytes().unwrap()),
            format!("04{}{}", G1_X, G1_Y)
        );

        // the u coefficient of each Fp2 coordinate travels first
        let g2 = g2_generator().unwrap();
        assert_eq!(
            hex::encode_upper(g2.to_bytes().unwrap()),
            format!("04{}{}{}{}", G2_X1, G2_X0, G2_Y1, G2_Y0)
        );
    }

    #[test]
    fn g1_generator_has_order_n() {
        let g = g1_generator().unwrap();
        assert!(!g.is_infinity());
        assert!(g.scalar_mult(&N).unwrap().is_infinity());
        assert!(!g.scalar_mult(&BigInt::from(2u32)).unwrap().is_infinity());
    }

    #[test]
    fn g2_generator_has_order_n() {
        let g = g2_generator().unwrap();
        assert!(!g.is_infinity());
        assert!(g.scalar_mult(&N).unwrap().is_infinity());
    }

    #[test]
    fn g1_group_laws() {
        let g = g1_generator().unwrap();
        let a = BigInt::from(123_456u64);
        let b = BigInt::from(654_321u64);
        let left = g.scalar_mult(&a).unwrap().add(&g.scalar_mult(&b).unwrap()).unwrap();
        let right = g.scalar_mult(&(&a + &b)).unwrap();
        assert_eq!(left, right);
        assert!(g.add(&g.neg()).unwrap().is_infinity());
        assert_eq!(g.add(&G1Point::infinity()).unwrap(), g);
    }

    #[test]
    fn g2_group_laws() {
        let g = g2_generator().unwrap();
        let d = g.double().unwrap();
        let t = d.add(&g).unwrap();
        assert_eq!(t, g.scalar_mult(&BigInt::from(3u32)).unwrap());
    }

    #[test]
    fn g1_byte_roundtrip() {
        let g = g1_generator().unwrap();
        let p = g.scalar_mult(&BigInt::from(9u32)).unwrap();
        let raw = p.to_bytes().unwrap();
        assert_eq!(raw.len(), G1_BYTES);
        assert_eq!(G1Point::from_bytes(&raw).unwrap(), p);

        // corrupting a coordinate must fail the curve check
        let mut bad = raw.clone();
        bad[40] ^= 1;
        assert!(matches!(G1Point::from_bytes(&bad), Err(Error::NotOnCurve)));
        assert!(G1Point::from_bytes(&raw[..64]).is_err());
    }

    #[test]
    fn g2_byte_roundtrip() {
        let g = g2_generator().unwrap();
        let p = g.scalar_mult(&BigInt::from(11u32)).unwrap();
        let raw = p.to_bytes().unwrap();
        assert_eq!(raw.len(), 129);
        assert_eq!(G2Point::from_bytes(&raw).unwrap(), p);
        let mut bad = raw;
        bad[5] ^= 1;
        assert!(G2Point::from_bytes(&bad).is_err());
    }
}
