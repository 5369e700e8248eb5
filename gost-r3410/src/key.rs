//! Key pairs and the 34.10 signature scheme.
//!
//! Signatures are `r || s`, both big-endian and padded to the point
//! size. Digests are read as little-endian integers and private key
//! bytes are little-endian, matching how GOST key material travels.

use std::sync::Arc;

use num_bigint::{BigInt, RandBigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::{CryptoRng, RngCore};

use crate::curve::{mod_inv, Curve, Point};
use crate::error::{Error, Result};
use crate::MAX_RETRIES;

pub(crate) fn pad_be(value: &BigInt, size: usize) -> Result<Vec<u8>> {
    let bytes = value.to_bytes_be().1;
    if bytes.len() > size {
        return Err(Error::InvalidEncoding { expected: size, got: bytes.len() });
    }
    let mut out = vec![0u8; size - bytes.len()];
    out.extend_from_slice(&bytes);
    Ok(out)
}

fn pad_le(value: &BigInt, size: usize) -> Result<Vec<u8>> {
    let mut bytes = value.to_bytes_le().1;
    if bytes.len() > size {
        return Err(Error::InvalidEncoding { expected: size, got: bytes.len() });
    }
    bytes.resize(size, 0);
    Ok(bytes)
}

/// digest bytes as a little-endian integer, reduced mod q; a zero
/// digest is substituted with one so the signature equations stay
/// solvable
fn digest_to_scalar(digest: &[u8], q: &BigInt) -> BigInt {
    let e = BigInt::from_bytes_le(Sign::Plus, digest).mod_floor(q);
    if e.is_zero() {
        BigInt::one()
    } else {
        e
    }
}

pub struct PrivateKey {
    pub curve: Arc<Curve>,
    key: BigInt,
}

impl PrivateKey {
    /// little-endian key bytes, exactly one point size long
    pub fn from_bytes(curve: Arc<Curve>, raw: &[u8]) -> Result<PrivateKey> {
        if raw.len() != curve.point_size() {
            return Err(Error::InvalidEncoding { expected: curve.point_size(), got: raw.len() });
        }
        let key = BigInt::from_bytes_le(Sign::Plus, raw);
        if key.is_zero() || key >= curve.q {
            return Err(Error::InvalidScalar);
        }
        Ok(PrivateKey { curve, key })
    }

    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R, curve: Arc<Curve>) -> PrivateKey {
        let key = rng.gen_bigint_range(&BigInt::one(), &curve.q);
        PrivateKey { curve, key }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        pad_le(&self.key, self.curve.point_size())
    }

    pub(crate) fn scalar(&self) -> &BigInt {
        &self.key
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        let point = self.curve.scalar_base_mult(&self.key)?;
        Ok(PublicKey { curve: self.curve.clone(), point })
    }

    /// sign a digest, returning the raw (r, s) pair
    pub fn sign_to_rs<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        digest: &[u8],
    ) -> Result<(BigInt, BigInt)> {
        let q = &self.curve.q;
        let e = digest_to_scalar(digest, q);
        for _ in 0..MAX_RETRIES {
            let k = rng.gen_bigint_range(&BigInt::one(), q);
            let c = self.curve.scalar_base_mult(&k)?;
            let r = c.x.mod_floor(q);
            if r.is_zero() {
                continue;
            }
            let s = (&r * &self.key + &k * &e).mod_floor(q);
            if s.is_zero() {
                continue;
            }
            return Ok((r, s));
        }
        Err(Error::RetriesExceeded)
    }

    /// sign a digest into the fixed width `r || s` wire form
    pub fn sign<R: RngCore + CryptoRng>(&self, rng: &mut R, digest: &[u8]) -> Result<Vec<u8>> {
        let (r, s) = self.sign_to_rs(rng, digest)?;
        let size = self.curve.point_size();
        let mut out = pad_be(&r, size)?;
        out.extend_from_slice(&pad_be(&s, size)?);
        Ok(out)
    }
}

pub struct PublicKey {
    pub curve: Arc<Curve>,
    pub point: Point,
}

impl PublicKey {
    pub fn from_point(curve: Arc<Curve>, point: Point) -> Result<PublicKey> {
        if point.is_infinity() || !curve.contains(&point) {
            return Err(Error::NotOnCurve);
        }
        Ok(PublicKey { curve, point })
    }

    /// little-endian `x || y`, each coordinate one point size long
    pub fn from_bytes(curve: Arc<Curve>, raw: &[u8]) -> Result<PublicKey> {
        let size = curve.point_size();
        if raw.len() != 2 * size {
            return Err(Error::InvalidEncoding { expected: 2 * size, got: raw.len() });
        }
        let x = BigInt::from_bytes_le(Sign::Plus, &raw[..size]);
        let y = BigInt::from_bytes_le(Sign::Plus, &raw[size..]);
        PublicKey::from_point(curve, Point::new(x, y))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let size = self.curve.point_size();
        let mut out = pad_le(&self.point.x, size)?;
        out.extend_from_slice(&pad_le(&self.point.y, size)?);
        Ok(out)
    }

    /// verify a raw (r, s) pair against a digest
    pub fn verify_with_rs(&self, digest: &[u8], r: &BigInt, s: &BigInt) -> Result<bool> {
        let q = &self.curve.q;
        if r <= &BigInt::zero() || r >= q || s <= &BigInt::zero() || s >= q {
            return Err(Error::InvalidSignature);
        }
        let e = digest_to_scalar(digest, q);
        let v = mod_inv(&e, q)?;
        let z1 = (s * &v).mod_floor(q);
        let z2 = (-(r * &v)).mod_floor(q);

        let c = self.curve.add(
            &self.curve.scalar_base_mult(&z1)?,
            &self.curve.scalar_mult(&self.point, &z2)?,
        )?;
        if c.is_infinity() {
            return Ok(false);
        }
        Ok(&c.x.mod_floor(q) == r)
    }

    /// verify the fixed width `r || s` wire form
    pub fn verify(&self, digest: &[u8], signature: &[u8]) -> Result<bool> {
        let size = self.curve.point_size();
        if signature.len() != 2 * size {
            return Err(Error::InvalidSignature);
        }
        let r = BigInt::from_bytes_be(Sign::Plus, &signature[..size]);
        let s = BigInt::from_bytes_be(Sign::Plus, &signature[size..]);
        self.verify_with_rs(digest, &r, &s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::curve_by_name;
    use rand::rngs::OsRng;

    fn keypair(curve_name: &str) -> (PrivateKey, PublicKey) {
        let curve = curve_by_name(curve_name).unwrap();
        let prv = PrivateKey::generate(&mut OsRng, curve);
        let public = prv.public_key().unwrap();
        (prv, public)
    }

    #[test]
    fn sign_verify_roundtrip() {
        for name in ["GostR3410-2001-Test", "GostR3410-2001-CryptoPro-A"].iter() {
            let (prv, public) = keypair(name);
            let digest = [0x5au8; 32];
            let signature = prv.sign(&mut OsRng, &digest).unwrap();
            assert_eq!(signature.len(), 64);
            assert!(public.verify(&digest, &signature).unwrap());

            let mut other = digest;
            other[7] ^= 1;
            assert!(!public.verify(&other, &signature).unwrap());
        }
    }

    #[test]
    fn tampered_signature_fails() {
        let (prv, public) = keypair("GostR3410-2001-CryptoPro-A");
        let digest = [0x13u8; 32];
        let mut signature = prv.sign(&mut OsRng, &digest).unwrap();
        signature[40] ^= 0x20;
        // either an honest mismatch or an out of range s
        match public.verify(&digest, &signature) {
            Ok(valid) => assert!(!valid),
            Err(Error::InvalidSignature) => (),
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn wrong_key_fails() {
        let (prv, _) = keypair("GostR3410-2001-Test");
        let (_, other_public) = keypair("GostR3410-2001-Test");
        let digest = [0x77u8; 32];
        let signature = prv.sign(&mut OsRng, &digest).unwrap();
        assert!(!other_public.verify(&digest, &signature).unwrap());
    }

    #[test]
    fn zero_digest_is_substituted() {
        let (prv, public) = keypair("GostR3410-2001-Test");
        let digest = [0u8; 32];
        let signature = prv.sign(&mut OsRng, &digest).unwrap();
        assert!(public.verify(&digest, &signature).unwrap());
        // and verifies the same as a digest equal to one
        let mut one = [0u8; 32];
        one[0] = 1;
        assert!(public.verify(&one, &signature).unwrap());
    }

    #[test]
    fn out_of_range_signature_is_rejected() {
        let (_, public) = keypair("GostR3410-2001-Test");
        let digest = [0x42u8; 32];
        let zero = BigInt::zero();
        let one = BigInt::one();
        assert!(matches!(
            public.verify_with_rs(&digest, &zero, &one),
            Err(Error::InvalidSignature)
        ));
        assert!(matches!(
            public.verify_with_rs(&digest, &one, &public.curve.q),
            Err(Error::InvalidSignature)
        ));
        assert!(matches!(public.verify(&digest, &[0u8; 63]), Err(Error::InvalidSignature)));
    }

    #[test]
    fn key_byte_roundtrips() {
        let (prv, public) = keypair("GostR3410-2001-CryptoPro-A");
        let curve = prv.curve.clone();

        let raw = prv.to_bytes().unwrap();
        assert_eq!(raw.len(), 32);
        let back = PrivateKey::from_bytes(curve.clone(), &raw).unwrap();
        assert_eq!(back.scalar(), prv.scalar());

        let raw = public.to_bytes().unwrap();
        assert_eq!(raw.len(), 64);
        let back = PublicKey::from_bytes(curve.clone(), &raw).unwrap();
        assert_eq!(back.point, public.point);

        // a corrupted coordinate lands off the curve
        let mut bad = raw.clone();
        bad[0] ^= 1;
        match PublicKey::from_bytes(curve, &bad) {
            Err(Error::NotOnCurve) => (),
            other => panic!("unexpected result: {:?}", other.map(|p| p.point)),
        }
    }

    #[test]
    fn rejects_out_of_range_private_key() {
        let curve = curve_by_name("GostR3410-2001-Test").unwrap();
        assert!(matches!(
            PrivateKey::from_bytes(curve.clone(), &[0u8; 32]),
            Err(Error::InvalidScalar)
        ));
        assert!(matches!(
            PrivateKey::from_bytes(curve, &[0xffu8; 32]),
            Err(Error::InvalidScalar)
        ));
    }
}
