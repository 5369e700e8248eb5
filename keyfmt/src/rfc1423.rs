//! RFC 1423 PEM encryption for legacy PKCS#1 blocks.
//!
//! The IV doubles as the derivation salt: the key is the MD5 chain
//! `D_i = MD5(D_{i-1} || password || iv[..8])` truncated to the cipher
//! key size, and the IV travels hex encoded in the `DEK-Info` header
//! next to the algorithm name. The cipher comes from the PEM registry
//! and fails loudly on unknown names.

use cipher_suite::get_pem_cipher;
use md5::{Digest, Md5};
use pem::Pem;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::error::{Error, Result};

const PROC_TYPE: &str = "Proc-Type";
const DEK_INFO: &str = "DEK-Info";

/// the OpenSSL `EVP_BytesToKey` derivation with MD5 and one round
fn derive_key(password: &[u8], salt: &[u8], size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(size + 16);
    let mut block: Vec<u8> = Vec::new();
    while out.len() < size {
        let mut hasher = Md5::new();
        hasher.update(&block);
        hasher.update(password);
        hasher.update(salt);
        block = hasher.finalize().to_vec();
        out.extend_from_slice(&block);
    }
    block.zeroize();
    out.truncate(size);
    out
}

/// true when the block carries the RFC 1421 encryption marker
pub fn is_encrypted_pem_block(block: &Pem) -> bool {
    match block.headers().get(PROC_TYPE) {
        Some(value) => value.contains("ENCRYPTED"),
        None => false,
    }
}

/// encrypt `data` into a PEM block with `Proc-Type` and `DEK-Info`
/// headers
pub fn encrypt_pem_block<R: RngCore + CryptoRng>(
    rng: &mut R,
    tag: &str,
    password: &[u8],
    data: &[u8],
    cipher_name: &str,
) -> Result<Pem> {
    let cipher = get_pem_cipher(cipher_name)?;
    let mut iv = vec![0u8; cipher.iv_size()];
    rng.fill_bytes(&mut iv);

    let mut key = derive_key(password, &iv[..8], cipher.key_size());
    let outcome = cipher.encrypt(&key, &iv, data);
    key.zeroize();

    let mut block = Pem::new(tag, outcome?);
    block.headers_mut().add(PROC_TYPE, "4,ENCRYPTED")?;
    block
        .headers_mut()
        .add(DEK_INFO, &format!("{},{}", cipher.name, hex::encode_upper(&iv)))?;
    Ok(block)
}

/// decrypt a PEM block produced by [`encrypt_pem_block`]
pub fn decrypt_pem_block(block: &Pem, password: &[u8]) -> Result<Vec<u8>> {
    if !is_encrypted_pem_block(block) {
        return Err(Error::InvalidFormat("missing ENCRYPTED Proc-Type header"));
    }
    let dek_info = block
        .headers()
        .get(DEK_INFO)
        .ok_or(Error::InvalidFormat("missing DEK-Info header"))?;
    let mut parts = dek_info.splitn(2, ',');
    let name = parts.next().unwrap_or("").trim();
    let hex_iv = parts.next().ok_or(Error::InvalidFormat("DEK-Info carries no IV"))?;

    let cipher = get_pem_cipher(name)?;
    let iv = hex::decode(hex_iv.trim()).map_err(|_| Error::InvalidFormat("DEK-Info IV"))?;
    if iv.len() != cipher.iv_size() {
        return Err(Error::InvalidFormat("DEK-Info IV length"));
    }

    let mut key = derive_key(password, &iv[..8], cipher.key_size());
    let outcome = cipher.decrypt(&key, &iv, block.contents());
    key.zeroize();
    // padding failures mean a wrong password as far as the caller knows
    outcome.map_err(|_| Error::Decryption)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn roundtrip_through_pem_text() {
        let data = b"-- pretend this is a PKCS#1 RSA key --";
        let block = encrypt_pem_block(
            &mut OsRng,
            "RSA PRIVATE KEY",
            b"letmein",
            data,
            "AES-128-CBC",
        )
        .unwrap();
        assert!(is_encrypted_pem_block(&block));

        let text = pem::encode(&block);
        let parsed = pem::parse(&text).unwrap();
        assert_eq!(parsed.tag(), "RSA PRIVATE KEY");
        assert_eq!(decrypt_pem_block(&parsed, b"letmein").unwrap(), data);
    }

    #[test]
    fn wrong_password_is_rejected() {
        let block = encrypt_pem_block(
            &mut OsRng,
            "RSA PRIVATE KEY",
            b"letmein",
            b"payload",
            "DES-EDE3-CBC",
        )
        .unwrap();
        assert!(matches!(decrypt_pem_block(&block, b"wrong"), Err(Error::Decryption)));
    }

    #[test]
    fn unknown_cipher_name_fails_loudly() {
        assert!(encrypt_pem_block(&mut OsRng, "X", b"pw", b"data", "IDEA-CBC").is_err());
    }

    #[test]
    fn unencrypted_blocks_are_refused() {
        let block = Pem::new("RSA PRIVATE KEY", &b"plain"[..]);
        assert!(matches!(
            decrypt_pem_block(&block, b"pw"),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn derivation_matches_itself_and_depends_on_salt() {
        let a = derive_key(b"pw", &[1u8; 8], 24);
        assert_eq!(a.len(), 24);
        assert_eq!(derive_key(b"pw", &[1u8; 8], 24), a);
        assert_ne!(derive_key(b"pw", &[2u8; 8], 24), a);
        assert_eq!(&derive_key(b"pw", &[1u8; 8], 16)[..], &a[..16]);
    }
}
