//! The Fp2/Fp4/Fp12 extension tower.
//!
//! The tower is built as `Fp2 = Fp[u]/(u^2 + 2)`, `Fp4 = Fp2[v]/(v^2 - u)`
//! and `Fp12 = Fp4[w]/(w^3 - v)`, so `w^6 = u` and the degree-twelve
//! extension carries the sextic twist with `u` as the twisting element.

use num_bigint::BigInt;
use num_traits::{One, Zero};

use crate::error::Result;
use crate::fp::{
    fp, fp_add, fp_double, fp_inv, fp_mul, fp_neg, fp_sqrt, fp_sub, fp_to_bytes,
};

/// `c0 + c1 u` with `u^2 = -2`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fp2 {
    pub(crate) c0: BigInt,
    pub(crate) c1: BigInt,
}

impl Fp2 {
    pub(crate) fn new(c0: BigInt, c1: BigInt) -> Fp2 {
        Fp2 { c0: fp(c0), c1: fp(c1) }
    }

    pub(crate) fn zero() -> Fp2 {
        Fp2 { c0: BigInt::zero(), c1: BigInt::zero() }
    }

    pub(crate) fn one() -> Fp2 {
        Fp2 { c0: BigInt::one(), c1: BigInt::zero() }
    }

    pub(crate) fn from_u64(v: u64) -> Fp2 {
        Fp2 { c0: fp(BigInt::from(v)), c1: BigInt::zero() }
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero()
    }

    pub(crate) fn add(&self, other: &Fp2) -> Fp2 {
        Fp2 { c0: fp_add(&self.c0, &other.c0), c1: fp_add(&self.c1, &other.c1) }
    }

    pub(crate) fn sub(&self, other: &Fp2) -> Fp2 {
        Fp2 { c0: fp_sub(&self.c0, &other.c0), c1: fp_sub(&self.c1, &other.c1) }
    }

    pub(crate) fn neg(&self) -> Fp2 {
        Fp2 { c0: fp_neg(&self.c0), c1: fp_neg(&self.c1) }
    }

    pub(crate) fn double(&self) -> Fp2 {
        Fp2 { c0: fp_double(&self.c0), c1: fp_double(&self.c1) }
    }

    /// Karatsuba; `u^2 = -2` folds the cross term back
    pub(crate) fn mul(&self, other: &Fp2) -> Fp2 {
        let aa = fp_mul(&self.c0, &other.c0);
        let bb = fp_mul(&self.c1, &other.c1);
        let cross = fp_mul(&fp_add(&self.c0, &self.c1), &fp_add(&other.c0, &other.c1));
        Fp2 {
            c0: fp_sub(&aa, &fp_double(&bb)),
            c1: fp_sub(&fp_sub(&cross, &aa), &bb),
        }
    }

    pub(crate) fn square(&self) -> Fp2 {
        self.mul(self)
    }

    pub(crate) fn mul_by_fp(&self, scalar: &BigInt) -> Fp2 {
        Fp2 { c0: fp_mul(&self.c0, scalar), c1: fp_mul(&self.c1, scalar) }
    }

    /// multiplication by the non-residue `u` itself
    pub(crate) fn mul_by_u(&self) -> Fp2 {
        Fp2 { c0: fp_neg(&fp_double(&self.c1)), c1: self.c0.clone() }
    }

    /// the norm `c0^2 + 2 c1^2` lands in the base field
    fn norm(&self) -> BigInt {
        fp_add(&fp_mul(&self.c0, &self.c0), &fp_double(&fp_mul(&self.c1, &self.c1)))
    }

    pub(crate) fn inv(&self) -> Result<Fp2> {
        let inv_norm = fp_inv(&self.norm())?;
        Ok(Fp2 {
            c0: fp_mul(&self.c0, &inv_norm),
            c1: fp_neg(&fp_mul(&self.c1, &inv_norm)),
        })
    }

    /// a square root, when one exists; resolved through the norm map
    pub(crate) fn sqrt(&self) -> Option<Fp2> {
        if self.is_zero() {
            return Some(Fp2::zero());
        }
        let half = fp_inv(&BigInt::from(2u32)).ok()?;
        if self.c1.is_zero() {
            // either c0 is a base-field square, or c0 = -2 x^2 = (x u)^2
            if let Some(root) = fp_sqrt(&self.c0) {
                return Some(Fp2 { c0: root, c1: BigInt::zero() });
            }
            let shifted = fp_mul(&fp_neg(&self.c0), &half);
            let root = fp_sqrt(&shifted)?;
            return Some(Fp2 { c0: BigInt::zero(), c1: root });
        }
        // for x = x0 + x1 u with x^2 = a: 2 x0^2 = a0 + norm(x), and
        // norm(x) is a square root of norm(a); try both signs of it
        let lambda = fp_sqrt(&self.norm())?;
        for delta in [lambda.clone(), fp_neg(&lambda)].iter() {
            let x0_sq = fp_mul(&fp_add(&self.c0, delta), &half);
            let x0 = match fp_sqrt(&x0_sq) {
                Some(root) if !root.is_zero() => root,
                _ => continue,
            };
            let x1 = fp_mul(&self.c1, &fp_inv(&fp_double(&x0)).ok()?);
            let candidate = Fp2 { c0: x0, c1: x1 };
            if candidate.square() == *self {
                return Some(candidate);
            }
        }
        None
    }

    pub(crate) fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&fp_to_bytes(&self.c1));
        out[32..].copy_from_slice(&fp_to_bytes(&self.c0));
        out
    }
}

/// `c0 + c1 v` over Fp2 with `v^2 = u`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fp4 {
    pub(crate) c0: Fp2,
    pub(crate) c1: Fp2,
}

impl Fp4 {
    pub(crate) fn zero() -> Fp4 {
        Fp4 { c0: Fp2::zero(), c1: Fp2::zero() }
    }

    pub(crate) fn one() -> Fp4 {
        Fp4 { c0: Fp2::one(), c1: Fp2::zero() }
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero()
    }

    pub(crate) fn add(&self, other: &Fp4) -> Fp4 {
        Fp4 { c0: self.c0.add(&other.c0), c1: self.c1.add(&other.c1) }
    }

    pub(crate) fn sub(&self, other: &Fp4) -> Fp4 {
        Fp4 { c0: self.c0.sub(&other.c0), c1: self.c1.sub(&other.c1) }
    }

    pub(crate) fn neg(&self) -> Fp4 {
        Fp4 { c0: self.c0.neg(), c1: self.c1.neg() }
    }

    pub(crate) fn mul(&self, other: &Fp4) -> Fp4 {
        let aa = self.c0.mul(&other.c0);
        let bb = self.c1.mul(&other.c1);
        let cross = self.c0.add(&self.c1).mul(&other.c0.add(&other.c1));
        Fp4 {
            c0: aa.add(&bb.mul_by_u()),
            c1: cross.sub(&aa).sub(&bb),
        }
    }

    pub(crate) fn square(&self) -> Fp4 {
        self.mul(self)
    }

    /// multiplication by `v`, the cubic non-residue of the top level
    pub(crate) fn mul_by_v(&self) -> Fp4 {
        Fp4 { c0: self.c1.mul_by_u(), c1: self.c0.clone() }
    }

    pub(crate) fn inv(&self) -> Result<Fp4> {
        // conjugation over v: norm = c0^2 - u c1^2 lives in Fp2
        let norm = self.c0.square().sub(&self.c1.square().mul_by_u());
        let inv_norm = norm.inv()?;
        Ok(Fp4 {
            c0: self.c0.mul(&inv_norm),
            c1: self.c1.mul(&inv_norm).neg(),
        })
    }
}

/// `c0 + c1 w + c2 w^2` over Fp4 with `w^3 = v`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fp12 {
    pub(crate) c0: Fp4,
    pub(crate) c1: Fp4,
    pub(crate) c2: Fp4,
}

impl Fp12 {
    pub(crate) fn one() -> Fp12 {
        Fp12 { c0: Fp4::one(), c1: Fp4::zero(), c2: Fp4::zero() }
    }

    pub(crate) fn is_one(&self) -> bool {
        *self == Fp12::one()
    }

    /// a base-field element embedded in the full extension
    pub(crate) fn from_fp(v: BigInt) -> Fp12 {
        Fp12 {
            c0: Fp4 { c0: Fp2::new(v, BigInt::zero()), c1: Fp2::zero() },
            c1: Fp4::zero(),
            c2: Fp4::zero(),
        }
    }

    /// an Fp2 element embedded in the full extension
    pub(crate) fn from_fp2(v: Fp2) -> Fp12 {
        Fp12 {
            c0: Fp4 { c0: v, c1: Fp2::zero() },
            c1: Fp4::zero(),
            c2: Fp4::zero(),
        }
    }

    /// `w^2` itself, used by the untwisting map
    pub(crate) fn w_squared() -> Fp12 {
        Fp12 { c0: Fp4::zero(), c1: Fp4::zero(), c2: Fp4::one() }
    }

    /// `w^3 = v` itself
    pub(crate) fn w_cubed() -> Fp12 {
        Fp12 {
            c0: Fp4 { c0: Fp2::zero(), c1: Fp2::one() },
            c1: Fp4::zero(),
            c2: Fp4::zero(),
        }
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero() && self.c2.is_zero()
    }

    pub(crate) fn sub(&self, other: &Fp12) -> Fp12 {
        Fp12 {
            c0: self.c0.sub(&other.c0),
            c1: self.c1.sub(&other.c1),
            c2: self.c2.sub(&other.c2),
        }
    }

    pub(crate) fn mul(&self, other: &Fp12) -> Fp12 {
        let (a0, a1, a2) = (&self.c0, &self.c1, &self.c2);
        let (b0, b1, b2) = (&other.c0, &other.c1, &other.c2);
        Fp12 {
            c0: a0.mul(b0).add(&a1.mul(b2).add(&a2.mul(b1)).mul_by_v()),
            c1: a0.mul(b1).add(&a1.mul(b0)).add(&a2.mul(b2).mul_by_v()),
            c2: a0.mul(b2).add(&a1.mul(b1)).add(&a2.mul(b0)),
        }
    }

    pub(crate) fn square(&self) -> Fp12 {
        let (a0, a1, a2) = (&self.c0, &self.c1, &self.c2);
        let a0a1 = a0.mul(a1);
        let a0a2 = a0.mul(a2);
        let a1a2 = a1.mul(a2);
        Fp12 {
            c0: a0.square().add(&a1a2.add(&a1a2).mul_by_v()),
            c1: a0a1.add(&a0a1).add(&a2.square().mul_by_v()),
            c2: a0a2.add(&a0a2).add(&a1.square()),
        }
    }

    pub(crate) fn inv(&self) -> Result<Fp12> {
        let (c0, c1, c2) = (&self.c0, &self.c1, &self.c2);
        let a = c0.square().sub(&c1.mul(c2).mul_by_v());
        let b = c2.square().mul_by_v().sub(&c0.mul(c1));
        let c = c1.square().sub(&c0.mul(c2));
        let f = c0.mul(&a).add(&c1.mul(&c).mul_by_v()).add(&c2.mul(&b).mul_by_v());
        let inv_f = f.inv()?;
        Ok(Fp12 { c0: a.mul(&inv_f), c1: b.mul(&inv_f), c2: c.mul(&inv_f) })
    }

    /// square-and-multiply over the big-endian bits of `exp`
    pub(crate) fn pow(&self, exp: &BigInt) -> Fp12 {
        let mut acc = Fp12::one();
        let mut started = false;
        for byte in exp.to_bytes_be().1.iter() {
            for bit in (0..8).rev() {
                if started {
                    acc = acc.square();
                }
                if byte >> bit & 1 == 1 {
                    if started {
                        acc = acc.mul(self);
                    } else {
                        acc = self.clone();
                        started = true;
                    }
                }
            }
        }
        acc
    }

    /// fixed big-endian coefficient order, highest power of `w` first
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(384);
        for part in [&self.c2, &self.c1, &self.c0].iter() {
            out.extend_from_slice(&part.c1.to_bytes());
            out.extend_from_slice(&part.c0.to_bytes());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fp2(seed: u64) -> Fp2 {
        Fp2::new(BigInt::from(seed), BigInt::from(seed.wrapping_mul(0x9e3779b9) | 1))
    }

    fn sample_fp12(seed: u64) -> Fp12 {
        Fp12 {
            c0: Fp4 { c0: sample_fp2(seed), c1: sample_fp2(seed + 1) },
            c1: Fp4 { c0: sample_fp2(seed + 2), c1: sample_fp2(seed + 3) },
            c2: Fp4 { c0: sample_fp2(seed + 4), c1: sample_fp2(seed + 5) },
        }
    }

    #[test]
    fn fp2_field_laws() {
        let a = sample_fp2(17);
        let b = sample_fp2(91);
        let c = sample_fp2(1234);
        assert_eq!(a.mul(&b), b.mul(&a));
        assert_eq!(a.mul(&b.add(&c)), a.mul(&b).add(&a.mul(&c)));
        assert_eq!(a.mul(&a.inv().unwrap()), Fp2::one());
        assert!(Fp2::zero().inv().is_err());
        // u * u = -2
        let u = Fp2::new(BigInt::from(0u32), BigInt::from(1u32));
        assert_eq!(u.mul(&u), Fp2::new(BigInt::from(-2i32), BigInt::from(0u32)));
        assert_eq!(u.mul_by_u(), u.mul(&u));
    }

    #[test]
    fn fp2_square_roots() {
        for seed in [3u64, 44, 500, 7777].iter() {
            let a = sample_fp2(*seed);
            let square = a.square();
            let root = a.square().sqrt().unwrap();
            assert_eq!(root.square(), square);
        }
        // a purely real square and a purely imaginary one
        let real = Fp2::from_u64(49);
        assert_eq!(real.sqrt().unwrap().square(), real);
        let imag = Fp2::new(BigInt::from(0u32), BigInt::from(5u32)).square();
        assert_eq!(imag.sqrt().unwrap().square(), imag);
    }

    #[test]
    fn fp4_inverse_and_non_residue() {
        let a = Fp4 { c0: sample_fp2(8), c1: sample_fp2(1009) };
        assert_eq!(a.mul(&a.inv().unwrap()), Fp4::one());
        // v^2 = u
        let v = Fp4 { c0: Fp2::zero(), c1: Fp2::one() };
        let u = Fp2::new(BigInt::from(0u32), BigInt::from(1u32));
        assert_eq!(v.square(), Fp4 { c0: u, c1: Fp2::zero() });
        assert_eq!(a.mul_by_v(), a.mul(&v));
    }

    #[test]
    fn fp12_field_laws() {
        let a = sample_fp12(5);
        let b = sample_fp12(400);
        assert_eq!(a.mul(&b), b.mul(&a));
        assert_eq!(a.square(), a.mul(&a));
        assert_eq!(a.mul(&a.inv().unwrap()), Fp12::one());
        // w^2 * w^3 * w = w^6 = u embedded in the extension
        let w = Fp12 { c0: Fp4::zero(), c1: Fp4::one(), c2: Fp4::zero() };
        let u12 = Fp12::from_fp2(Fp2::new(BigInt::from(0u32), BigInt::from(1u32)));
        assert_eq!(Fp12::w_squared().mul(&Fp12::w_cubed()).mul(&w), u12);
    }

    #[test]
    fn fp12_pow_is_multiplicative() {
        let a = sample_fp12(77);
        let x = BigInt::from(1234u32);
        let y = BigInt::from(4321u32);
        assert_eq!(a.pow(&x).mul(&a.pow(&y)), a.pow(&(&x + &y)));
        assert_eq!(a.pow(&BigInt::from(0u32)), Fp12::one());
        assert_eq!(a.pow(&BigInt::from(1u32)), a);
    }
}
