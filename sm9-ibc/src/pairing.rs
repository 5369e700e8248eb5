//! The reduced Tate pairing.
//!
//! The Miller loop runs over the bits of the group order with the
//! base point in G1, so every line coefficient stays in the base
//! field; only the evaluation point, the untwisted image of the G2
//! argument, lives in the full extension. Vertical line contributions
//! are collected in a separate denominator and cleared with a single
//! inversion before the final exponentiation.

use num_bigint::BigInt;
use num_traits::Zero;

use crate::error::Result;
use crate::fp::{fp_inv, fp_mul, fp_neg, N};
use crate::points::{group_params, G1Point, G2Point};
use crate::tower::Fp12;

/// the pairing target group, the order-n subgroup of Fp12
pub type Gt = Fp12;

struct Evaluation {
    x: Fp12,
    y: Fp12,
}

/// `l(Q) = y_Q - y_T - lambda (x_Q - x_T)` for a line through `T`
fn line(at: &Evaluation, tx: &BigInt, ty: &BigInt, lambda: &BigInt) -> Fp12 {
    let dx = at.x.sub(&Fp12::from_fp(tx.clone()));
    at.y.sub(&Fp12::from_fp(ty.clone())).sub(&dx.mul(&Fp12::from_fp(lambda.clone())))
}

/// `v(Q) = x_Q - x`, the vertical through abscissa `x`
fn vertical(at: &Evaluation, x: &BigInt) -> Fp12 {
    at.x.sub(&Fp12::from_fp(x.clone()))
}

/// `f_{n,P}` evaluated at the embedded point, as numerator/denominator
fn miller_loop(p: &G1Point, at: &Evaluation) -> Result<Fp12> {
    let mut num = Fp12::one();
    let mut den = Fp12::one();
    let mut t = p.clone();

    let bits = N.to_bytes_be().1;
    let mut seen_top = false;
    for byte in bits.iter() {
        for bit in (0..8).rev() {
            let set = byte >> bit & 1 == 1;
            if !seen_top {
                // the loop starts below the most significant bit
                seen_top = set;
                continue;
            }

            num = num.square();
            den = den.square();
            if t.is_infinity() {
                // both the line and the vertical degenerate to 1
            } else if t.y.is_zero() {
                // the tangent is vertical and the double is the identity
                num = num.mul(&vertical(at, &t.x));
                t = G1Point::infinity();
            } else {
                let lambda = fp_mul(
                    &fp_mul(&BigInt::from(3u32), &fp_mul(&t.x, &t.x)),
                    &fp_inv(&(&t.y * 2))?,
                );
                num = num.mul(&line(at, &t.x, &t.y, &lambda));
                t = t.double()?;
                den = den.mul(&vertical(at, &t.x));
            }

            if set {
                if t.is_infinity() {
                    // the vertical through P appears above and below
                    t = p.clone();
                } else if t.x == p.x && t.y == p.y {
                    let lambda = fp_mul(
                        &fp_mul(&BigInt::from(3u32), &fp_mul(&t.x, &t.x)),
                        &fp_inv(&(&t.y * 2))?,
                    );
                    num = num.mul(&line(at, &t.x, &t.y, &lambda));
                    t = t.double()?;
                    den = den.mul(&vertical(at, &t.x));
                } else if t.x == p.x {
                    // P = -T; the chord is the vertical and T + P = O
                    num = num.mul(&vertical(at, &t.x));
                    t = G1Point::infinity();
                } else {
                    let lambda = fp_mul(
                        &fp_neg(&(&t.y - &p.y)),
                        &fp_inv(&(&p.x - &t.x))?,
                    );
                    num = num.mul(&line(at, &t.x, &t.y, &lambda));
                    t = t.add(p)?;
                    if !t.is_infinity() {
                        den = den.mul(&vertical(at, &t.x));
                    }
                }
            }
        }
    }

    Ok(num.mul(&den.inv()?))
}

/// the reduced Tate pairing `e(P, Q)`
pub fn pairing(p: &G1Point, q: &G2Point) -> Result<Gt> {
    if p.is_infinity() || q.is_infinity() {
        return Ok(Fp12::one());
    }
    let params = group_params()?;
    let at = Evaluation {
        x: Fp12::from_fp2(q.x.clone()).mul(&params.untwist_x),
        y: Fp12::from_fp2(q.y.clone()).mul(&params.untwist_y),
    };
    let f = miller_loop(p, &at)?;
    Ok(f.pow(&params.final_exponent))
}
