//! The SM9 base field.
//!
//! SM9 fixes one Barreto-Naehrig curve; its field modulus `q` and
//! group order `n` are polynomials in the BN parameter `t`, so only
//! `t` is carried as a constant and both are computed once.

use lazy_static::lazy_static;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Num, One, Signed, Zero};

use crate::error::{Error, Result};

/// the BN parameter of the SM9 curve
const BN_T_HEX: &str = "600000000058F98A";

fn bn_t() -> BigInt {
    match BigInt::from_str_radix(BN_T_HEX, 16) {
        Ok(v) => v,
        Err(_) => unreachable!("the BN parameter constant is well formed"),
    }
}

lazy_static! {
    /// base field modulus, `36t^4 + 36t^3 + 24t^2 + 6t + 1`
    pub(crate) static ref Q: BigInt = {
        let t = bn_t();
        let t2 = &t * &t;
        let t3 = &t2 * &t;
        let t4 = &t3 * &t;
        36 * &t4 + 36 * &t3 + 24 * &t2 + 6 * &t + 1
    };
    /// group order, `36t^4 + 36t^3 + 18t^2 + 6t + 1`
    pub(crate) static ref N: BigInt = {
        let t = bn_t();
        let t2 = &t * &t;
        let t3 = &t2 * &t;
        let t4 = &t3 * &t;
        36 * &t4 + 36 * &t3 + 18 * &t2 + 6 * &t + 1
    };
}

pub(crate) fn fp(v: BigInt) -> BigInt {
    v.mod_floor(&Q)
}

pub(crate) fn fp_add(a: &BigInt, b: &BigInt) -> BigInt {
    (a + b).mod_floor(&Q)
}

pub(crate) fn fp_sub(a: &BigInt, b: &BigInt) -> BigInt {
    (a - b).mod_floor(&Q)
}

pub(crate) fn fp_mul(a: &BigInt, b: &BigInt) -> BigInt {
    (a * b).mod_floor(&Q)
}

pub(crate) fn fp_neg(a: &BigInt) -> BigInt {
    (-a).mod_floor(&Q)
}

pub(crate) fn fp_double(a: &BigInt) -> BigInt {
    (a << 1u32).mod_floor(&Q)
}

/// extended Euclid over the prime modulus `m`
pub(crate) fn mod_inv(a: &BigInt, m: &BigInt) -> Result<BigInt> {
    let a = a.mod_floor(m);
    if a.is_zero() {
        return Err(Error::NotInvertible);
    }
    let (mut t, mut new_t) = (BigInt::zero(), BigInt::one());
    let (mut r, mut new_r) = (m.clone(), a);
    while !new_r.is_zero() {
        let quotient = &r / &new_r;
        let tmp = &t - &quotient * &new_t;
        t = std::mem::replace(&mut new_t, tmp);
        let tmp = &r - &quotient * &new_r;
        r = std::mem::replace(&mut new_r, tmp);
    }
    if !r.is_one() {
        return Err(Error::NotInvertible);
    }
    Ok(t.mod_floor(m))
}

pub(crate) fn fp_inv(a: &BigInt) -> Result<BigInt> {
    mod_inv(a, &Q)
}

/// Tonelli-Shanks in the base field
pub(crate) fn fp_sqrt(n: &BigInt) -> Option<BigInt> {
    let p: &BigInt = &Q;
    let n = n.mod_floor(p);
    if n.is_zero() {
        return Some(BigInt::zero());
    }
    let one = BigInt::one();
    let p_minus_one = p - &one;
    let half = &p_minus_one / 2;
    if n.modpow(&half, p) != one {
        return None;
    }
    if p.mod_floor(&BigInt::from(4u32)) == BigInt::from(3u32) {
        return Some(n.modpow(&((p + &one) / BigInt::from(4u32)), p));
    }

    let s = p_minus_one.trailing_zeros().unwrap_or(0) as usize;
    let odd = &p_minus_one >> s;
    let mut z = BigInt::from(2u32);
    while z.modpow(&half, p) != p_minus_one {
        z = z + 1u32;
    }

    let mut m = s;
    let mut c = z.modpow(&odd, p);
    let mut t = n.modpow(&odd, p);
    let mut r = n.modpow(&((&odd + &one) / 2), p);
    while t != one {
        let mut i = 0usize;
        let mut probe = t.clone();
        while probe != one {
            probe = (&probe * &probe).mod_floor(p);
            i += 1;
        }
        let exp = BigInt::one() << (m - i - 1);
        let b = c.modpow(&exp, p);
        m = i;
        c = (&b * &b).mod_floor(p);
        t = (&t * &c).mod_floor(p);
        r = (&r * &b).mod_floor(p);
    }
    Some(r)
}

/// big-endian, zero padded to 32 bytes
pub(crate) fn fp_to_bytes(v: &BigInt) -> [u8; 32] {
    let bytes = v.to_bytes_be().1;
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

pub(crate) fn scalar_from_bytes(raw: &[u8]) -> BigInt {
    BigInt::from_bytes_be(num_bigint::Sign::Plus, raw)
}

/// a field element decoded from exactly 32 big-endian bytes
pub(crate) fn fp_from_bytes(raw: &[u8]) -> Result<BigInt> {
    if raw.len() != 32 {
        return Err(Error::InvalidEncoding { expected: 32, got: raw.len() });
    }
    let v = scalar_from_bytes(raw);
    if v >= *Q || v.is_negative() {
        return Err(Error::InvalidScalar);
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulus_and_order_have_the_bn_shape() {
        // both are 256-bit primesized values with q - n = 6t^2
        assert_eq!(Q.bits(), 256);
        assert_eq!(N.bits(), 256);
        let t = bn_t();
        assert_eq!(&*Q - &*N, 6 * &t * &t);
        assert!(Q.is_odd() && N.is_odd());
    }

    #[test]
    fn inverse_and_sqrt() {
        let a = BigInt::from(0xdead_beefu64);
        let inv = fp_inv(&a).unwrap();
        assert!(fp_mul(&a, &inv).is_one());
        assert!(fp_inv(&BigInt::zero()).is_err());

        let square = fp_mul(&a, &a);
        let root = fp_sqrt(&square).unwrap();
        assert_eq!(fp_mul(&root, &root), square);
    }

    #[test]
    fn byte_roundtrip() {
        let a = fp(BigInt::from(0x0102_0304u64) << 200);
        let bytes = fp_to_bytes(&a);
        assert_eq!(fp_from_bytes(&bytes).unwrap(), a);
        assert!(fp_from_bytes(&[0u8; 31]).is_err());
        // a value at or above the modulus is rejected
        assert!(fp_from_bytes(&fp_to_bytes(&Q)).is_err());
    }
}
