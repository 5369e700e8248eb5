//! Master key pairs and identity key extraction.
//!
//! The signature hierarchy keeps its master public key in G2 and
//! extracts user keys in G1; the encryption hierarchy is the mirror
//! image. Extraction divides by `H1(id || hid) + master` in the
//! scalar field, so the same identity yields independent keys per
//! function through the `hid` byte.

use num_bigint::BigInt;
use num_traits::Zero;
use rand_core::{CryptoRng, RngCore};

use crate::error::{Error, Result};
use crate::fp::N;
use crate::hash::h1;
use crate::points::{g1_generator, g2_generator, G1Point, G2Point};
use crate::rand_scalar;

/// function identifier appended to the identity before hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hid {
    Signature,
    KeyExchange,
    Encryption,
}

impl Hid {
    pub(crate) fn byte(self) -> u8 {
        match self {
            Hid::Signature => 0x01,
            Hid::KeyExchange => 0x02,
            Hid::Encryption => 0x03,
        }
    }
}

/// `H1(id || hid)`, the public scalar every party can compute
pub(crate) fn identity_scalar(id: &[u8], hid: Hid) -> BigInt {
    let mut material = Vec::with_capacity(id.len() + 1);
    material.extend_from_slice(id);
    material.push(hid.byte());
    h1(&material)
}

/// the signature master secret
pub struct SignMasterKey {
    pub(crate) secret: BigInt,
}

/// `[ks] P2`, published by the key generation centre
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignMasterPublic {
    pub(crate) point: G2Point,
}

/// an identity's signing key, a G1 point
#[derive(Debug, Clone)]
pub struct SignUserKey {
    pub(crate) point: G1Point,
}

impl SignMasterKey {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<SignMasterKey> {
        Ok(SignMasterKey { secret: rand_scalar(rng) })
    }

    pub(crate) fn from_scalar(secret: BigInt) -> Result<SignMasterKey> {
        if secret.is_zero() || secret >= *N || secret < BigInt::zero() {
            return Err(Error::InvalidScalar);
        }
        Ok(SignMasterKey { secret })
    }

    pub fn public(&self) -> Result<SignMasterPublic> {
        Ok(SignMasterPublic { point: g2_generator()?.scalar_mult(&self.secret)? })
    }

    /// extract the signing key for an identity
    pub fn user_key(&self, id: &[u8]) -> Result<SignUserKey> {
        let t1 = (identity_scalar(id, Hid::Signature) + &self.secret) % &*N;
        if t1.is_zero() {
            // the identity collides with the master secret; the centre
            // has to re-generate its master key
            return Err(Error::InvalidScalar);
        }
        let t2 = (&self.secret * crate::fp::mod_inv(&t1, &N)?) % &*N;
        Ok(SignUserKey { point: g1_generator()?.scalar_mult(&t2)? })
    }
}

impl SignMasterPublic {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.point.to_bytes()
    }

    pub fn from_bytes(raw: &[u8]) -> Result<SignMasterPublic> {
        Ok(SignMasterPublic { point: G2Point::from_bytes(raw)? })
    }
}

impl SignUserKey {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.point.to_bytes()
    }

    pub fn from_bytes(raw: &[u8]) -> Result<SignUserKey> {
        Ok(SignUserKey { point: G1Point::from_bytes(raw)? })
    }
}

/// the encryption and key-exchange master secret
pub struct EncryptMasterKey {
    pub(crate) secret: BigInt,
}

/// `[ke] P1`, published by the key generation centre
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptMasterPublic {
    pub(crate) point: G1Point,
}

/// an identity's decryption or key-exchange key, a G2 point
#[derive(Debug, Clone)]
pub struct EncryptUserKey {
    pub(crate) point: G2Point,
}

impl EncryptMasterKey {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<EncryptMasterKey> {
        Ok(EncryptMasterKey { secret: rand_scalar(rng) })
    }

    pub(crate) fn from_scalar(secret: BigInt) -> Result<EncryptMasterKey> {
        if secret.is_zero() || secret >= *N || secret < BigInt::zero() {
            return Err(Error::InvalidScalar);
        }
        Ok(EncryptMasterKey { secret })
    }

    pub fn public(&self) -> Result<EncryptMasterPublic> {
        Ok(EncryptMasterPublic { point: g1_generator()?.scalar_mult(&self.secret)? })
    }

    /// extract the user key for an identity; `hid` selects between the
    /// decryption and key-exchange hierarchies
    pub fn user_key(&self, id: &[u8], hid: Hid) -> Result<EncryptUserKey> {
        let t1 = (identity_scalar(id, hid) + &self.secret) % &*N;
        if t1.is_zero() {
            return Err(Error::InvalidScalar);
        }
        let t2 = (&self.secret * crate::fp::mod_inv(&t1, &N)?) % &*N;
        Ok(EncryptUserKey { point: g2_generator()?.scalar_mult(&t2)? })
    }
}

impl EncryptMasterPublic {
    /// `[H1(id || hid)] P1 + Ppub`, the point anyone can derive for a
    /// peer identity
    pub(crate) fn identity_point(&self, id: &[u8], hid: Hid) -> Result<G1Point> {
        let h = identity_scalar(id, hid);
        g1_generator()?.scalar_mult(&h)?.add(&self.point)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.point.to_bytes()
    }

    pub fn from_bytes(raw: &[u8]) -> Result<EncryptMasterPublic> {
        Ok(EncryptMasterPublic { point: G1Point::from_bytes(raw)? })
    }
}

impl EncryptUserKey {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.point.to_bytes()
    }

    pub fn from_bytes(raw: &[u8]) -> Result<EncryptUserKey> {
        Ok(EncryptUserKey { point: G2Point::from_bytes(raw)? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn extraction_is_deterministic_per_identity() {
        let master = SignMasterKey::generate(&mut OsRng).unwrap();
        let a = master.user_key(b"alice").unwrap();
        let b = master.user_key(b"alice").unwrap();
        assert_eq!(a.point, b.point);
        let c = master.user_key(b"bob").unwrap();
        assert_ne!(a.point, c.point);
    }

    #[test]
    fn hid_separates_the_hierarchies() {
        let master = EncryptMasterKey::generate(&mut OsRng).unwrap();
        let enc = master.user_key(b"alice", Hid::Encryption).unwrap();
        let exch = master.user_key(b"alice", Hid::KeyExchange).unwrap();
        assert_ne!(enc.point, exch.point);
    }

    #[test]
    fn extraction_inverts_on_the_curve() {
        // [H1 + ks] ds = [ks] P1 must hold by construction
        let master = SignMasterKey::from_scalar(BigInt::from(0x1234_5678u64)).unwrap();
        let user = master.user_key(b"carol").unwrap();
        let t1 = (identity_scalar(b"carol", Hid::Signature) + &master.secret) % &*N;
        let left = user.point.scalar_mult(&t1).unwrap();
        let right = g1_generator().unwrap().scalar_mult(&master.secret).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn public_keys_roundtrip() {
        let master = EncryptMasterKey::generate(&mut OsRng).unwrap();
        let public = master.public().unwrap();
        let raw = public.to_bytes().unwrap();
        assert_eq!(EncryptMasterPublic::from_bytes(&raw).unwrap(), public);

        let user = master.user_key(b"dave", Hid::Encryption).unwrap();
        let raw = user.to_bytes().unwrap();
        assert_eq!(EncryptUserKey::from_bytes(&raw).unwrap().point, user.point);
    }

    #[test]
    fn rejects_out_of_range_master_scalars() {
        assert!(SignMasterKey::from_scalar(BigInt::zero()).is_err());
        assert!(EncryptMasterKey::from_scalar(N.clone()).is_err());
    }
}
