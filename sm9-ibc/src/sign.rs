//! Identity-based signatures.
//!
//! A signature is the pair `(h, S)` with `h = H2(M || g^r)` for the
//! fixed pairing value `g = e(P1, Ppub)` and `S = [r - h] ds` in G1.
//! Verification recomputes `g^r` as `e(S, [H1(id)] P2 + Ppub) * g^h`
//! without any secret input.

use num_bigint::BigInt;
use num_traits::Zero;
use rand_core::{CryptoRng, RngCore};

use crate::error::{Error, Result};
use crate::fp::{fp_to_bytes, scalar_from_bytes, N};
use crate::hash::h2;
use crate::keys::{identity_scalar, Hid, SignMasterPublic, SignUserKey};
use crate::pairing::pairing;
use crate::points::{g1_generator, g2_generator, G1Point, G1_BYTES};
use crate::{rand_scalar, MAX_RETRIES};

/// the byte width of a serialized signature
pub const SIGNATURE_BYTES: usize = 32 + G1_BYTES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub(crate) h: BigInt,
    pub(crate) s: G1Point,
}

impl Signature {
    /// `h (32, big endian) || S (uncompressed)`
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(SIGNATURE_BYTES);
        out.extend_from_slice(&fp_to_bytes(&self.h));
        out.extend_from_slice(&self.s.to_bytes()?);
        Ok(out)
    }

    pub fn from_bytes(raw: &[u8]) -> Result<Signature> {
        if raw.len() != SIGNATURE_BYTES {
            return Err(Error::InvalidEncoding { expected: SIGNATURE_BYTES, got: raw.len() });
        }
        let h = scalar_from_bytes(&raw[..32]);
        if h.is_zero() || h >= *N {
            return Err(Error::InvalidSignature);
        }
        let s = G1Point::from_bytes(&raw[32..]).map_err(|_| Error::InvalidSignature)?;
        Ok(Signature { h, s })
    }
}

pub fn sign<R: RngCore + CryptoRng>(
    rng: &mut R,
    master: &SignMasterPublic,
    key: &SignUserKey,
    message: &[u8],
) -> Result<Signature> {
    let g = pairing(&g1_generator()?, &master.point)?;
    for _ in 0..MAX_RETRIES {
        let r = rand_scalar(rng);
        let w = g.pow(&r);

        let mut material = Vec::with_capacity(message.len() + 384);
        material.extend_from_slice(message);
        material.extend_from_slice(&w.to_bytes());
        let h = h2(&material);

        let l = (&r - &h + &*N) % &*N;
        if l.is_zero() {
            continue;
        }
        let s = key.point.scalar_mult(&l)?;
        return Ok(Signature { h, s });
    }
    Err(Error::RetriesExceeded)
}

pub fn verify(
    master: &SignMasterPublic,
    id: &[u8],
    message: &[u8],
    signature: &Signature,
) -> Result<bool> {
    if signature.h.is_zero() || signature.h >= *N {
        return Err(Error::InvalidSignature);
    }
    if signature.s.is_infinity() {
        return Err(Error::InvalidSignature);
    }

    let g = pairing(&g1_generator()?, &master.point)?;
    let t = g.pow(&signature.h);

    let h1 = identity_scalar(id, Hid::Signature);
    let p = g2_generator()?.scalar_mult(&h1)?.add(&master.point)?;
    let u = pairing(&signature.s, &p)?;
    let w = u.mul(&t);

    let mut material = Vec::with_capacity(message.len() + 384);
    material.extend_from_slice(message);
    material.extend_from_slice(&w.to_bytes());
    Ok(h2(&material) == signature.h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::SignMasterKey;
    use rand::rngs::OsRng;

    #[test]
    fn sign_and_verify() {
        let master = SignMasterKey::generate(&mut OsRng).unwrap();
        let public = master.public().unwrap();
        let key = master.user_key(b"alice@example.com").unwrap();

        let sig = sign(&mut OsRng, &public, &key, b"message to sign").unwrap();
        assert!(verify(&public, b"alice@example.com", b"message to sign", &sig).unwrap());

        // a different message or identity must not verify
        assert!(!verify(&public, b"alice@example.com", b"another message", &sig).unwrap());
        assert!(!verify(&public, b"bob@example.com", b"message to sign", &sig).unwrap());
    }

    #[test]
    fn signature_bytes_roundtrip() {
        let master = SignMasterKey::generate(&mut OsRng).unwrap();
        let public = master.public().unwrap();
        let key = master.user_key(b"alice").unwrap();

        let sig = sign(&mut OsRng, &public, &key, b"payload").unwrap();
        let raw = sig.to_bytes().unwrap();
        assert_eq!(raw.len(), SIGNATURE_BYTES);
        let back = Signature::from_bytes(&raw).unwrap();
        assert_eq!(back, sig);
        assert!(verify(&public, b"alice", b"payload", &back).unwrap());
    }

    #[test]
    fn malformed_signatures_are_rejected() {
        assert!(matches!(
            Signature::from_bytes(&[0u8; 10]),
            Err(Error::InvalidEncoding { .. })
        ));
        // h = 0 is outside the scalar range
        let mut raw = vec![0u8; SIGNATURE_BYTES];
        raw[32] = 0x04;
        assert!(matches!(Signature::from_bytes(&raw), Err(Error::InvalidSignature)));
    }

    #[test]
    fn tampered_point_fails_verification() {
        let master = SignMasterKey::generate(&mut OsRng).unwrap();
        let public = master.public().unwrap();
        let key = master.user_key(b"alice").unwrap();
        let sig = sign(&mut OsRng, &public, &key, b"payload").unwrap();

        let tampered = Signature { h: sig.h.clone(), s: sig.s.double().unwrap() };
        assert!(!verify(&public, b"alice", b"payload", &tampered).unwrap());
    }
}
