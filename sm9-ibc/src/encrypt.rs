//! Identity-based public key encryption.
//!
//! Ciphertexts are `C1 || C3 || C2`: an ephemeral G1 point, an SM3
//! tag over the body and the derived MAC key, and the body itself.
//! The body is either the plaintext XORed with derived key stream or
//! an SM4-ECB encryption under a derived block key, selected by
//! [`BlockMode`].

use cipher_suite::{modes, padding, BlockAlg};
use rand_core::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::hash::{kdf, sm3_digest};
use crate::keys::{EncryptMasterPublic, EncryptUserKey, Hid};
use crate::pairing::pairing;
use crate::points::{g2_generator, G1Point, G1_BYTES};
use crate::{rand_scalar, MAX_RETRIES};

const TAG_BYTES: usize = 32;
const MAC_KEY_BYTES: usize = 32;
const SM4_KEY_BYTES: usize = 16;

/// how the ciphertext body is produced from the derived key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMode {
    /// XOR with the key stream; the body keeps the plaintext length
    Stream,
    /// SM4 in ECB with PKCS#7 padding under a 128-bit derived key
    Sm4,
}

impl BlockMode {
    fn enc_key_len(self, plaintext_len: usize) -> usize {
        match self {
            BlockMode::Stream => plaintext_len,
            BlockMode::Sm4 => SM4_KEY_BYTES,
        }
    }

    fn seal_body(self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        match self {
            BlockMode::Stream => {
                Ok(plaintext.iter().zip(key.iter()).map(|(p, k)| p ^ k).collect())
            }
            BlockMode::Sm4 => {
                let op = BlockAlg::Sm4.with_key(key).map_err(|_| Error::Decryption)?;
                let mut body = plaintext.to_vec();
                padding::pkcs7_pad(&mut body, op.block_size());
                modes::ecb_encrypt(&*op, &mut body).map_err(|_| Error::Decryption)?;
                Ok(body)
            }
        }
    }

    fn open_body(self, key: &[u8], body: &[u8]) -> Result<Vec<u8>> {
        match self {
            BlockMode::Stream => Ok(body.iter().zip(key.iter()).map(|(c, k)| c ^ k).collect()),
            BlockMode::Sm4 => {
                let op = BlockAlg::Sm4.with_key(key).map_err(|_| Error::Decryption)?;
                let mut plain = body.to_vec();
                modes::ecb_decrypt(&*op, &mut plain).map_err(|_| Error::Decryption)?;
                let unpadded =
                    padding::pkcs7_unpad(&plain, op.block_size()).map_err(|_| Error::Decryption)?;
                Ok(unpadded.to_vec())
            }
        }
    }
}

fn derive_keys(
    c1_bytes: &[u8],
    w_bytes: &[u8],
    id: &[u8],
    enc_key_len: usize,
) -> Vec<u8> {
    let mut material = Vec::with_capacity(c1_bytes.len() + w_bytes.len() + id.len());
    material.extend_from_slice(c1_bytes);
    material.extend_from_slice(w_bytes);
    material.extend_from_slice(id);
    kdf(&material, enc_key_len + MAC_KEY_BYTES)
}

fn body_tag(body: &[u8], mac_key: &[u8]) -> [u8; 32] {
    let mut material = Vec::with_capacity(body.len() + mac_key.len());
    material.extend_from_slice(body);
    material.extend_from_slice(mac_key);
    sm3_digest(&material)
}

pub fn encrypt<R: RngCore + CryptoRng>(
    rng: &mut R,
    master: &EncryptMasterPublic,
    id: &[u8],
    plaintext: &[u8],
    mode: BlockMode,
) -> Result<Vec<u8>> {
    if plaintext.is_empty() {
        return Err(Error::EmptyPlaintext);
    }
    let receiver = master.identity_point(id, Hid::Encryption)?;
    let g = pairing(&master.point, &g2_generator()?)?;
    let enc_key_len = mode.enc_key_len(plaintext.len());

    for _ in 0..MAX_RETRIES {
        let r = rand_scalar(rng);
        let c1 = receiver.scalar_mult(&r)?;
        let c1_bytes = c1.to_bytes()?;
        let w = g.pow(&r);

        let mut keys = derive_keys(&c1_bytes, &w.to_bytes(), id, enc_key_len);
        if keys[..enc_key_len].iter().all(|b| *b == 0) {
            keys.zeroize();
            continue;
        }

        let body = mode.seal_body(&keys[..enc_key_len], plaintext)?;
        let tag = body_tag(&body, &keys[enc_key_len..]);
        keys.zeroize();

        let mut out = Vec::with_capacity(G1_BYTES + TAG_BYTES + body.len());
        out.extend_from_slice(&c1_bytes);
        out.extend_from_slice(&tag);
        out.extend_from_slice(&body);
        return Ok(out);
    }
    Err(Error::RetriesExceeded)
}

pub fn decrypt(
    key: &EncryptUserKey,
    id: &[u8],
    ciphertext: &[u8],
    mode: BlockMode,
) -> Result<Vec<u8>> {
    if ciphertext.len() <= G1_BYTES + TAG_BYTES {
        return Err(Error::Decryption);
    }
    let (c1_bytes, rest) = ciphertext.split_at(G1_BYTES);
    let (tag, body) = rest.split_at(TAG_BYTES);

    let c1 = G1Point::from_bytes(c1_bytes).map_err(|_| Error::Decryption)?;
    let w = pairing(&c1, &key.point)?;
    let enc_key_len = mode.enc_key_len(body.len());

    let mut keys = derive_keys(c1_bytes, &w.to_bytes(), id, enc_key_len);
    if keys[..enc_key_len].iter().all(|b| *b == 0) {
        keys.zeroize();
        return Err(Error::Decryption);
    }

    let expected = body_tag(body, &keys[enc_key_len..]);
    if expected[..].ct_eq(tag).unwrap_u8() != 1 {
        keys.zeroize();
        return Err(Error::Decryption);
    }

    let plain = mode.open_body(&keys[..enc_key_len], body);
    keys.zeroize();
    plain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::EncryptMasterKey;
    use num_bigint::BigInt;
    use rand::rngs::OsRng;

    fn setup() -> (EncryptMasterPublic, EncryptUserKey) {
        let master = EncryptMasterKey::from_scalar(BigInt::from(0x5eed_1234_5678u64)).unwrap();
        let public = master.public().unwrap();
        let key = master.user_key(b"bob@example.com", Hid::Encryption).unwrap();
        (public, key)
    }

    #[test]
    fn stream_mode_roundtrip() {
        let (public, key) = setup();
        let msg = b"identity based encryption";
        let ct = encrypt(&mut OsRng, &public, b"bob@example.com", msg, BlockMode::Stream).unwrap();
        assert_eq!(ct.len(), G1_BYTES + TAG_BYTES + msg.len());
        let pt = decrypt(&key, b"bob@example.com", &ct, BlockMode::Stream).unwrap();
        assert_eq!(pt, msg);
    }

    #[test]
    fn sm4_mode_roundtrip() {
        let (public, key) = setup();
        let msg = b"a body that is not a multiple of the block size";
        let ct = encrypt(&mut OsRng, &public, b"bob@example.com", msg, BlockMode::Sm4).unwrap();
        let pt = decrypt(&key, b"bob@example.com", &ct, BlockMode::Sm4).unwrap();
        assert_eq!(pt, msg);
    }

    #[test]
    fn refuses_empty_plaintext() {
        let (public, _) = setup();
        assert!(matches!(
            encrypt(&mut OsRng, &public, b"bob@example.com", b"", BlockMode::Stream),
            Err(Error::EmptyPlaintext)
        ));
    }

    #[test]
    fn tampering_is_detected() {
        let (public, key) = setup();
        let ct = encrypt(&mut OsRng, &public, b"bob@example.com", b"msg", BlockMode::Stream)
            .unwrap();

        for index in [0usize, G1_BYTES + 2, ct.len() - 1].iter() {
            let mut bad = ct.clone();
            bad[*index] ^= 1;
            assert!(decrypt(&key, b"bob@example.com", &bad, BlockMode::Stream).is_err());
        }
        assert!(decrypt(&key, b"bob@example.com", &ct[..40], BlockMode::Stream).is_err());
    }

    #[test]
    fn wrong_recipient_cannot_decrypt() {
        let master = EncryptMasterKey::generate(&mut OsRng).unwrap();
        let public = master.public().unwrap();
        let eve = master.user_key(b"eve@example.com", Hid::Encryption).unwrap();

        let ct = encrypt(&mut OsRng, &public, b"bob@example.com", b"msg", BlockMode::Stream)
            .unwrap();
        assert!(matches!(
            decrypt(&eve, b"bob@example.com", &ct, BlockMode::Stream),
            Err(Error::Decryption)
        ));
    }
}
