//! Modes of operation over [`BlockOp`](../block/trait.BlockOp.html).
//!
//! All of them work in place. CBC and ECB require whole blocks (the
//! suites pad beforehand); CFB, OFB and CTR are keystream modes and
//! take any length. CFB is the full-block variant.

use crate::block::BlockOp;
use crate::error::{Error, Result};

fn check_iv(cipher: &dyn BlockOp, iv: &[u8]) -> Result<()> {
    if iv.len() != cipher.block_size() {
        return Err(Error::InvalidIvSize { expected: cipher.block_size(), got: iv.len() });
    }
    Ok(())
}

fn xor_into(out: &mut [u8], other: &[u8]) {
    for (o, i) in out.iter_mut().zip(other.iter()) {
        *o ^= i;
    }
}

pub fn ecb_encrypt(cipher: &dyn BlockOp, data: &mut [u8]) -> Result<()> {
    let bs = cipher.block_size();
    if data.len() % bs != 0 {
        return Err(Error::InvalidDataLength);
    }
    for block in data.chunks_mut(bs) {
        cipher.encrypt_block(block);
    }
    Ok(())
}

pub fn ecb_decrypt(cipher: &dyn BlockOp, data: &mut [u8]) -> Result<()> {
    let bs = cipher.block_size();
    if data.len() % bs != 0 {
        return Err(Error::InvalidDataLength);
    }
    for block in data.chunks_mut(bs) {
        cipher.decrypt_block(block);
    }
    Ok(())
}

pub fn cbc_encrypt(cipher: &dyn BlockOp, iv: &[u8], data: &mut [u8]) -> Result<()> {
    check_iv(cipher, iv)?;
    let bs = cipher.block_size();
    if data.len() % bs != 0 {
        return Err(Error::InvalidDataLength);
    }
    let mut prev = iv.to_vec();
    for block in data.chunks_mut(bs) {
        xor_into(block, &prev);
        cipher.encrypt_block(block);
        prev.copy_from_slice(block);
    }
    Ok(())
}

pub fn cbc_decrypt(cipher: &dyn BlockOp, iv: &[u8], data: &mut [u8]) -> Result<()> {
    check_iv(cipher, iv)?;
    let bs = cipher.block_size();
    if data.len() % bs != 0 {
        return Err(Error::InvalidDataLength);
    }
    let mut prev = iv.to_vec();
    for block in data.chunks_mut(bs) {
        let saved = block.to_vec();
        cipher.decrypt_block(block);
        xor_into(block, &prev);
        prev = saved;
    }
    Ok(())
}

pub fn cfb_encrypt(cipher: &dyn BlockOp, iv: &[u8], data: &mut [u8]) -> Result<()> {
    check_iv(cipher, iv)?;
    let bs = cipher.block_size();
    let mut shift = iv.to_vec();
    for chunk in data.chunks_mut(bs) {
        cipher.encrypt_block(&mut shift);
        xor_into(chunk, &shift);
        shift[..chunk.len()].copy_from_slice(chunk);
    }
    Ok(())
}

pub fn cfb_decrypt(cipher: &dyn BlockOp, iv: &[u8], data: &mut [u8]) -> Result<()> {
    check_iv(cipher, iv)?;
    let bs = cipher.block_size();
    let mut shift = iv.to_vec();
    for chunk in data.chunks_mut(bs) {
        cipher.encrypt_block(&mut shift);
        let ciphertext = chunk.to_vec();
        xor_into(chunk, &shift);
        shift[..ciphertext.len()].copy_from_slice(&ciphertext);
    }
    Ok(())
}

/// OFB keystream application; encryption and decryption are the same
pub fn ofb_xor(cipher: &dyn BlockOp, iv: &[u8], data: &mut [u8]) -> Result<()> {
    check_iv(cipher, iv)?;
    let bs = cipher.block_size();
    let mut feedback = iv.to_vec();
    for chunk in data.chunks_mut(bs) {
        cipher.encrypt_block(&mut feedback);
        xor_into(chunk, &feedback);
    }
    Ok(())
}

/// increment the whole counter block as a big-endian integer
pub(crate) fn increment_be(counter: &mut [u8]) {
    for b in counter.iter_mut().rev() {
        *b = b.wrapping_add(1);
        if *b != 0 {
            break;
        }
    }
}

/// CTR keystream application over a full-block big-endian counter;
/// encryption and decryption are the same
pub fn ctr_xor(cipher: &dyn BlockOp, iv: &[u8], data: &mut [u8]) -> Result<()> {
    check_iv(cipher, iv)?;
    let bs = cipher.block_size();
    let mut counter = iv.to_vec();
    let mut keystream = vec![0u8; bs];
    for chunk in data.chunks_mut(bs) {
        keystream.copy_from_slice(&counter);
        cipher.encrypt_block(&mut keystream);
        xor_into(chunk, &keystream);
        increment_be(&mut counter);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockAlg;

    fn alg_cipher(alg: BlockAlg) -> Box<dyn BlockOp> {
        let key: Vec<u8> = (1..=alg.key_size() as u8).collect();
        alg.with_key(&key).unwrap()
    }

    #[test]
    fn cbc_roundtrip_multi_block() {
        for &alg in [BlockAlg::Aes256, BlockAlg::TdesEde3, BlockAlg::Sm4].iter() {
            let cipher = alg_cipher(alg);
            let bs = cipher.block_size();
            let iv = vec![0x24u8; bs];
            let original: Vec<u8> = (0..(bs * 3) as u8).collect();

            let mut data = original.clone();
            cbc_encrypt(cipher.as_ref(), &iv, &mut data).unwrap();
            assert_ne!(data, original);
            cbc_decrypt(cipher.as_ref(), &iv, &mut data).unwrap();
            assert_eq!(data, original);
        }
    }

    #[test]
    fn cbc_rejects_partial_blocks_and_bad_iv() {
        let cipher = alg_cipher(BlockAlg::Aes128);
        let mut short = vec![0u8; 15];
        assert!(cbc_encrypt(cipher.as_ref(), &[0u8; 16], &mut short).is_err());
        let mut ok = vec![0u8; 16];
        assert!(cbc_encrypt(cipher.as_ref(), &[0u8; 8], &mut ok).is_err());
    }

    #[test]
    fn ecb_equal_blocks_encrypt_equally() {
        let cipher = alg_cipher(BlockAlg::Aes128);
        let mut data = vec![0x41u8; 32];
        ecb_encrypt(cipher.as_ref(), &mut data).unwrap();
        let (left, right) = data.split_at(16);
        assert_eq!(left, right);
        ecb_decrypt(cipher.as_ref(), &mut data).unwrap();
        assert_eq!(data, vec![0x41u8; 32]);
    }

    #[test]
    fn stream_modes_roundtrip_odd_lengths() {
        let cipher = alg_cipher(BlockAlg::Aes192);
        let iv = [0x07u8; 16];
        for len in [0usize, 1, 15, 16, 17, 47].iter().copied() {
            let original: Vec<u8> = (0..len as u8).map(|b| b.wrapping_mul(3)).collect();

            let mut data = original.clone();
            cfb_encrypt(cipher.as_ref(), &iv, &mut data).unwrap();
            cfb_decrypt(cipher.as_ref(), &iv, &mut data).unwrap();
            assert_eq!(data, original);

            let mut data = original.clone();
            ofb_xor(cipher.as_ref(), &iv, &mut data).unwrap();
            ofb_xor(cipher.as_ref(), &iv, &mut data).unwrap();
            assert_eq!(data, original);

            let mut data = original.clone();
            ctr_xor(cipher.as_ref(), &iv, &mut data).unwrap();
            ctr_xor(cipher.as_ref(), &iv, &mut data).unwrap();
            assert_eq!(data, original);
        }
    }

    #[test]
    fn ctr_counter_carries_across_byte_boundaries() {
        let mut counter = vec![0x00, 0xff, 0xff];
        increment_be(&mut counter);
        assert_eq!(counter, vec![0x01, 0x00, 0x00]);
        let mut counter = vec![0xff, 0xff];
        increment_be(&mut counter);
        assert_eq!(counter, vec![0x00, 0x00]);
    }

    #[test]
    fn cfb_differs_from_ofb() {
        let cipher = alg_cipher(BlockAlg::Aes128);
        let iv = [0x33u8; 16];
        let mut a = vec![0x55u8; 48];
        let mut b = vec![0x55u8; 48];
        cfb_encrypt(cipher.as_ref(), &iv, &mut a).unwrap();
        ofb_xor(cipher.as_ref(), &iv, &mut b).unwrap();
        // first block matches (same keystream), later blocks diverge
        assert_eq!(&a[..16], &b[..16]);
        assert_ne!(&a[16..], &b[16..]);
    }
}
