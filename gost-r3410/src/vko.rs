//! VKO key agreement (RFC 4357 and RFC 7836).
//!
//! Both parties multiply the peer's public point by their own key, a
//! shared user key material number and the cofactor, then hash the
//! resulting point. The hash picks the protocol generation: 34.11-94
//! for VKO 2001, Streebog for VKO 2012.

use digest::Digest;
use gost94::Gost94CryptoPro;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};
use streebog::{Streebog256, Streebog512};

use crate::error::{Error, Result};
use crate::key::{PrivateKey, PublicKey};

impl PrivateKey {
    /// the shared point serialised as little-endian `x || y`
    pub fn kek(&self, peer: &PublicKey, ukm: &BigInt) -> Result<Vec<u8>> {
        if ukm.is_zero() || ukm.is_negative() {
            return Err(Error::InvalidScalar);
        }
        let t = (ukm * self.scalar()).mod_floor(&self.curve.q) * &self.curve.cofactor;
        let shared = self.curve.scalar_mult(&peer.point, &t)?;
        if shared.is_infinity() {
            return Err(Error::NotOnCurve);
        }
        PublicKey::from_point(self.curve.clone(), shared)?.to_bytes()
    }
}

/// VKO GOST R 34.10-2001, KEK via the 34.11-94 hash
pub fn kek_2001(prv: &PrivateKey, peer: &PublicKey, ukm: &BigInt) -> Result<Vec<u8>> {
    Ok(Gost94CryptoPro::digest(&prv.kek(peer, ukm)?).to_vec())
}

/// VKO GOST R 34.10-2012 with a 256-bit KEK
pub fn kek_2012_256(prv: &PrivateKey, peer: &PublicKey, ukm: &BigInt) -> Result<Vec<u8>> {
    Ok(Streebog256::digest(&prv.kek(peer, ukm)?).to_vec())
}

/// VKO GOST R 34.10-2012 with a 512-bit KEK
pub fn kek_2012_512(prv: &PrivateKey, peer: &PublicKey, ukm: &BigInt) -> Result<Vec<u8>> {
    Ok(Streebog512::digest(&prv.kek(peer, ukm)?).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::curve_by_name;
    use rand::rngs::OsRng;

    #[test]
    fn both_sides_agree() {
        let curve = curve_by_name("GostR3410-2001-CryptoPro-A").unwrap();
        let alice = PrivateKey::generate(&mut OsRng, curve.clone());
        let bob = PrivateKey::generate(&mut OsRng, curve);
        let alice_pub = alice.public_key().unwrap();
        let bob_pub = bob.public_key().unwrap();
        let ukm = BigInt::from(0x0011_2233_4455_6677u64);

        assert_eq!(alice.kek(&bob_pub, &ukm).unwrap(), bob.kek(&alice_pub, &ukm).unwrap());
        let a = kek_2001(&alice, &bob_pub, &ukm).unwrap();
        let b = kek_2001(&bob, &alice_pub, &ukm).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);

        let a = kek_2012_256(&alice, &bob_pub, &ukm).unwrap();
        assert_eq!(a, kek_2012_256(&bob, &alice_pub, &ukm).unwrap());
        assert_eq!(a.len(), 32);

        let a = kek_2012_512(&alice, &bob_pub, &ukm).unwrap();
        assert_eq!(a, kek_2012_512(&bob, &alice_pub, &ukm).unwrap());
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn ukm_changes_the_key() {
        let curve = curve_by_name("GostR3410-2001-Test").unwrap();
        let alice = PrivateKey::generate(&mut OsRng, curve.clone());
        let bob = PrivateKey::generate(&mut OsRng, curve);
        let bob_pub = bob.public_key().unwrap();

        let one = kek_2012_256(&alice, &bob_pub, &BigInt::from(1u32)).unwrap();
        let two = kek_2012_256(&alice, &bob_pub, &BigInt::from(2u32)).unwrap();
        assert_ne!(one, two);
    }

    #[test]
    fn zero_ukm_is_rejected() {
        let curve = curve_by_name("GostR3410-2001-Test").unwrap();
        let alice = PrivateKey::generate(&mut OsRng, curve.clone());
        let bob = PrivateKey::generate(&mut OsRng, curve);
        let bob_pub = bob.public_key().unwrap();
        assert!(matches!(alice.kek(&bob_pub, &BigInt::zero()), Err(Error::InvalidScalar)));
    }
}
