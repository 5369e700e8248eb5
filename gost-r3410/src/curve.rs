//! Short Weierstrass curves over prime fields, affine arithmetic.
//!
//! Curves are validated when constructed: the generator abscissa must
//! have a square ordinate and the declared subgroup order must send
//! the generator to infinity. The ordinate itself is derived from the
//! abscissa, so parameter sets only carry `x`.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::error::{Error, Result};

/// an affine point; the identity is carried as a flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    pub x: BigInt,
    pub y: BigInt,
    infinity: bool,
}

impl Point {
    pub fn new(x: BigInt, y: BigInt) -> Point {
        Point { x, y, infinity: false }
    }

    pub fn infinity() -> Point {
        Point { x: BigInt::zero(), y: BigInt::zero(), infinity: true }
    }

    pub fn is_infinity(&self) -> bool {
        self.infinity
    }
}

/// extended Euclid; `m` is expected prime so this only fails on zero
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

/// Tonelli-Shanks, with the `p = 3 mod 4` shortcut
pub(crate) fn mod_sqrt(n: &BigInt, p: &BigInt) -> Option<BigInt> {
    let n = n.mod_floor(p);
    if n.is_zero() {
        return Some(BigInt::zero());
    }
    let one = BigInt::one();
    let two = BigInt::from(2u32);
    let p_minus_one = p - &one;
    let half = &p_minus_one / &two;
    if n.modpow(&half, p) != one {
        return None;
    }
    if p.mod_floor(&BigInt::from(4u32)) == BigInt::from(3u32) {
        return Some(n.modpow(&((p + &one) / BigInt::from(4u32)), p));
    }

    let s = p_minus_one.trailing_zeros().unwrap_or(0) as usize;
    let odd = &p_minus_one >> s;
    let mut z = two;
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

/// `y^2 = x^3 + ax + b (mod p)` with a generator of prime order `q`
#[derive(Debug, Clone)]
pub struct Curve {
    pub name: String,
    pub p: BigInt,
    pub a: BigInt,
    pub b: BigInt,
    pub q: BigInt,
    pub cofactor: BigInt,
    generator: Point,
    /// the (s, t) pair linking the twisted Edwards form, when one exists
    edwards_st: Option<(BigInt, BigInt)>,
}

impl Curve {
    pub fn new(
        name: &str,
        p: BigInt,
        a: BigInt,
        b: BigInt,
        q: BigInt,
        cofactor: BigInt,
        gx: BigInt,
    ) -> Result<Curve> {
        Curve::build(name, p, a, b, q, cofactor, gx, None)
    }

    /// a curve that also has a twisted Edwards form `eu^2 + v^2 = 1 + du^2v^2`
    pub fn new_edwards(
        name: &str,
        p: BigInt,
        a: BigInt,
        b: BigInt,
        e: BigInt,
        d: BigInt,
        q: BigInt,
        cofactor: BigInt,
        gx: BigInt,
    ) -> Result<Curve> {
        Curve::build(name, p, a, b, q, cofactor, gx, Some((e, d)))
    }

    fn build(
        name: &str,
        p: BigInt,
        a: BigInt,
        b: BigInt,
        q: BigInt,
        cofactor: BigInt,
        gx: BigInt,
        ed: Option<(BigInt, BigInt)>,
    ) -> Result<Curve> {
        if p.is_negative() || p.bits() < 3 || p.is_even() {
            return Err(Error::InvalidCurve("field modulus"));
        }
        if q <= BigInt::one() || q >= &p * 2 {
            return Err(Error::InvalidCurve("subgroup order"));
        }
        if cofactor < BigInt::one() {
            return Err(Error::InvalidCurve("cofactor"));
        }
        if gx >= p || gx.is_negative() {
            return Err(Error::InvalidCurve("generator abscissa"));
        }

        let rhs = (&gx * &gx * &gx + &a * &gx + &b).mod_floor(&p);
        let gy = mod_sqrt(&rhs, &p).ok_or(Error::InvalidCurve("generator abscissa"))?;

        let edwards_st = match ed {
            None => None,
            Some((e, d)) => {
                let s = ((&e - &d) * mod_inv(&BigInt::from(4u32), &p)?).mod_floor(&p);
                let t = ((&e + &d) * mod_inv(&BigInt::from(6u32), &p)?).mod_floor(&p);
                Some((s, t))
            }
        };

        let curve = Curve {
            name: name.to_string(),
            p,
            a,
            b,
            q,
            cofactor,
            generator: Point::new(gx, gy),
            edwards_st,
        };
        if !curve.contains(&curve.generator) {
            return Err(Error::InvalidCurve("generator"));
        }
        if !curve.scalar_mult(&curve.generator, &curve.q)?.is_infinity() {
            return Err(Error::InvalidCurve("subgroup order"));
        }
        Ok(curve)
    }

    pub fn generator(&self) -> &Point {
        &self.generator
    }

    /// the byte width of one coordinate
    pub fn point_size(&self) -> usize {
        ((self.p.bits() as usize) + 7) / 8
    }

    pub fn contains(&self, point: &Point) -> bool {
        if point.is_infinity() {
            return true;
        }
        let lhs = (&point.y * &point.y).mod_floor(&self.p);
        let rhs = (&point.x * &point.x * &point.x + &self.a * &point.x + &self.b).mod_floor(&self.p);
        lhs == rhs
    }

    pub fn add(&self, p1: &Point, p2: &Point) -> Result<Point> {
        if p1.is_infinity() {
            return Ok(p2.clone());
        }
        if p2.is_infinity() {
            return Ok(p1.clone());
        }
        if p1.x == p2.x {
            if (&p1.y + &p2.y).mod_floor(&self.p).is_zero() {
                return Ok(Point::infinity());
            }
            return self.double(p1);
        }
        let lambda =
            ((&p2.y - &p1.y) * mod_inv(&(&p2.x - &p1.x), &self.p)?).mod_floor(&self.p);
        self.chord(p1, p2, &lambda)
    }

    pub fn double(&self, point: &Point) -> Result<Point> {
        if point.is_infinity() {
            return Ok(Point::infinity());
        }
        if point.y.is_zero() {
            return Ok(Point::infinity());
        }
        let lambda = ((BigInt::from(3u32) * &point.x * &point.x + &self.a)
            * mod_inv(&(BigInt::from(2u32) * &point.y), &self.p)?)
        .mod_floor(&self.p);
        self.chord(point, point, &lambda)
    }

    fn chord(&self, p1: &Point, p2: &Point, lambda: &BigInt) -> Result<Point> {
        let x = (lambda * lambda - &p1.x - &p2.x).mod_floor(&self.p);
        let y = (lambda * (&p1.x - &x) - &p1.y).mod_floor(&self.p);
        Ok(Point::new(x, y))
    }

    /// double-and-add; `k` must be positive (not reduced here) and
    /// `point` must satisfy the curve equation
    pub fn scalar_mult(&self, point: &Point, k: &BigInt) -> Result<Point> {
        if k.is_negative() || k.is_zero() {
            return Err(Error::InvalidScalar);
        }
        if !self.contains(point) {
            return Err(Error::NotOnCurve);
        }
        let bytes = k.to_bytes_be().1;
        let mut acc = Point::infinity();
        for byte in bytes.iter() {
            for bit in (0..8).rev() {
                acc = self.double(&acc)?;
                if byte >> bit & 1 == 1 {
                    acc = self.add(&acc, point)?;
                }
            }
        }
        Ok(acc)
    }

    pub fn scalar_base_mult(&self, k: &BigInt) -> Result<Point> {
        self.scalar_mult(&self.generator, k)
    }

    fn st(&self) -> Result<&(BigInt, BigInt)> {
        self.edwards_st.as_ref().ok_or(Error::NoEdwardsForm)
    }

    /// map Weierstrass coordinates to the twisted Edwards form
    pub fn to_edwards(&self, point: &Point) -> Result<(BigInt, BigInt)> {
        let (s, t) = self.st()?;
        let xt = (&point.x - t).mod_floor(&self.p);
        let u = (&xt * mod_inv(&point.y, &self.p)?).mod_floor(&self.p);
        let v = ((&xt - s) * mod_inv(&(&xt + s), &self.p)?).mod_floor(&self.p);
        Ok((u, v))
    }

    /// map twisted Edwards coordinates back to the Weierstrass form
    pub fn from_edwards(&self, u: &BigInt, v: &BigInt) -> Result<Point> {
        let (s, t) = self.st()?;
        let one_plus = (BigInt::one() + v).mod_floor(&self.p);
        let one_minus = (BigInt::one() - v).mod_floor(&self.p);
        let x = ((s * &one_plus) * mod_inv(&one_minus, &self.p)? + t).mod_floor(&self.p);
        let y = ((s * &one_plus) * mod_inv(&(&one_minus * u), &self.p)?).mod_floor(&self.p);
        Ok(Point::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::curve_by_name;

    fn test_curve() -> std::sync::Arc<Curve> {
        curve_by_name("GostR3410-2001-Test").unwrap()
    }

    #[test]
    fn generator_is_valid() {
        let curve = test_curve();
        let g = curve.generator();
        assert!(curve.contains(g));
        assert!(curve.scalar_mult(g, &curve.q).unwrap().is_infinity());
    }

    #[test]
    fn addition_matches_scalar_multiplication() {
        let curve = test_curve();
        let g = curve.generator();
        let g2 = curve.double(g).unwrap();
        let g3 = curve.add(&g2, g).unwrap();
        assert_eq!(g3, curve.scalar_mult(g, &BigInt::from(3u32)).unwrap());

        let a = BigInt::from(123_456_789u64);
        let b = BigInt::from(987_654_321u64);
        let left = curve
            .add(&curve.scalar_mult(g, &a).unwrap(), &curve.scalar_mult(g, &b).unwrap())
            .unwrap();
        let right = curve.scalar_mult(g, &(&a + &b)).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn inverse_points_cancel() {
        let curve = test_curve();
        let g = curve.generator();
        let neg = Point::new(g.x.clone(), (-&g.y).mod_floor(&curve.p));
        assert!(curve.contains(&neg));
        assert!(curve.add(g, &neg).unwrap().is_infinity());
        assert_eq!(curve.add(g, &Point::infinity()).unwrap(), *g);
    }

    #[test]
    fn degenerate_multiplication_inputs_are_rejected() {
        let curve = test_curve();
        let g = curve.generator();
        assert!(matches!(
            curve.scalar_mult(g, &BigInt::zero()),
            Err(Error::InvalidScalar)
        ));
        assert!(matches!(
            curve.scalar_mult(g, &BigInt::from(-3)),
            Err(Error::InvalidScalar)
        ));
        let off = Point::new(g.x.clone(), &g.y + 1);
        assert!(matches!(
            curve.scalar_mult(&off, &BigInt::from(5u32)),
            Err(Error::NotOnCurve)
        ));
    }

    #[test]
    fn rejects_inconsistent_parameters() {
        let curve = test_curve();
        // wrong subgroup order
        assert!(Curve::new(
            "bad",
            curve.p.clone(),
            curve.a.clone(),
            curve.b.clone(),
            &curve.q + 2,
            BigInt::one(),
            curve.generator().x.clone(),
        )
        .is_err());
    }

    #[test]
    fn modular_square_root() {
        let p = BigInt::from(10_007u32); // prime, 3 mod 4
        for v in [2u32, 17, 1234].iter() {
            let square = (BigInt::from(*v) * BigInt::from(*v)).mod_floor(&p);
            let root = mod_sqrt(&square, &p).unwrap();
            assert_eq!((&root * &root).mod_floor(&p), square);
        }
        let p = BigInt::from(10_009u32); // prime, 1 mod 4 takes the long path
        for v in [3u32, 999, 4321].iter() {
            let square = (BigInt::from(*v) * BigInt::from(*v)).mod_floor(&p);
            let root = mod_sqrt(&square, &p).unwrap();
            assert_eq!((&root * &root).mod_floor(&p), square);
        }
    }

    #[test]
    fn edwards_conversion_inverts() {
        let curve = test_curve();
        // attach an arbitrary Edwards form; the two maps are algebraic
        // inverses for any (e, d) pair
        let curve = Curve::new_edwards(
            "test-ed",
            curve.p.clone(),
            curve.a.clone(),
            curve.b.clone(),
            BigInt::from(5u32),
            BigInt::from(57u32),
            curve.q.clone(),
            curve.cofactor.clone(),
            curve.generator().x.clone(),
        )
        .unwrap();

        let point = curve.scalar_base_mult(&BigInt::from(7u32)).unwrap();
        let (u, v) = curve.to_edwards(&point).unwrap();
        assert_eq!(curve.from_edwards(&u, &v).unwrap(), point);
    }

    #[test]
    fn edwards_conversion_requires_the_form() {
        let curve = test_curve();
        assert!(matches!(curve.to_edwards(curve.generator()), Err(Error::NoEdwardsForm)));
    }
}
