//! Hashing to scalars and the key derivation function, both built on
//! SM3 in counter mode.

use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::One;
use sm3::{Digest, Sm3};

use crate::fp::N;

/// 40 bytes of counter-mode output keep the bias of the final modular
/// reduction below 2^-64
const RANGE_HASH_BYTES: usize = 40;

fn counter_stream(material: &[u8], len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + 32);
    let mut counter: u32 = 1;
    while out.len() < len {
        let mut hasher = Sm3::new();
        hasher.update(material);
        hasher.update(counter.to_be_bytes());
        out.extend_from_slice(&hasher.finalize());
        counter = counter.wrapping_add(1);
    }
    out.truncate(len);
    out
}

fn hash_to_range(prefix: u8, data: &[u8]) -> BigInt {
    let mut material = Vec::with_capacity(1 + data.len());
    material.push(prefix);
    material.extend_from_slice(data);
    let stream = counter_stream(&material, RANGE_HASH_BYTES);
    let wide = BigInt::from_bytes_be(Sign::Plus, &stream);
    // uniform over [1, n-1]
    wide.mod_floor(&(&*N - 1)) + BigInt::one()
}

/// the identity-to-scalar hash, domain separated with prefix 0x01
pub(crate) fn h1(data: &[u8]) -> BigInt {
    hash_to_range(0x01, data)
}

/// the message-and-pairing hash used by signatures, prefix 0x02
pub(crate) fn h2(data: &[u8]) -> BigInt {
    hash_to_range(0x02, data)
}

/// derive `len` key bytes from the shared material
pub(crate) fn kdf(material: &[u8], len: usize) -> Vec<u8> {
    counter_stream(material, len)
}

pub(crate) fn sm3_digest(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sm3::digest(data));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn scalars_stay_in_range() {
        for msg in [&b"alice@example.com"[..], b"", b"\x00\x00"].iter() {
            let v = h1(msg);
            assert!(v > BigInt::zero() && v < *N);
        }
    }

    #[test]
    fn prefixes_separate_the_domains() {
        assert_ne!(h1(b"same input"), h2(b"same input"));
    }

    #[test]
    fn kdf_is_deterministic_and_length_exact() {
        let a = kdf(b"shared secret", 80);
        let b = kdf(b"shared secret", 80);
        assert_eq!(a, b);
        assert_eq!(a.len(), 80);
        assert_eq!(&kdf(b"shared secret", 16)[..], &a[..16]);
        assert_ne!(kdf(b"other secret", 80), a);
        assert!(kdf(b"x", 0).is_empty());
    }
}
