//! Counter with CBC-MAC over any 128-bit [`BlockOp`](../block/trait.BlockOp.html).

use subtle::ConstantTimeEq;

use crate::block::BlockOp;
use crate::error::{Error, Result};

fn check_params(cipher: &dyn BlockOp, nonce: &[u8], tag_len: usize) -> Result<()> {
    if cipher.block_size() != 16 {
        return Err(Error::UnsupportedCipher("CCM needs a 128-bit block".to_string()));
    }
    if nonce.len() < 7 || nonce.len() > 13 {
        return Err(Error::InvalidNonceSize(nonce.len()));
    }
    if tag_len < 4 || tag_len > 16 || tag_len % 2 != 0 {
        return Err(Error::InvalidTagSize(tag_len));
    }
    Ok(())
}

/// the length field width; everything after the nonce in a counter block
fn length_width(nonce: &[u8]) -> usize {
    15 - nonce.len()
}

fn check_message_length(nonce: &[u8], len: usize) -> Result<()> {
    let q = length_width(nonce);
    if q < 8 && (len as u64) >= 1u64 << (8 * q) {
        return Err(Error::InvalidDataLength);
    }
    Ok(())
}

fn counter_block(nonce: &[u8], index: u64) -> [u8; 16] {
    let q = length_width(nonce);
    let mut block = [0u8; 16];
    block[0] = (q - 1) as u8;
    block[1..1 + nonce.len()].copy_from_slice(nonce);
    let be = index.to_be_bytes();
    block[16 - q.min(8)..].copy_from_slice(&be[8 - q.min(8)..]);
    block
}

fn cbc_mac(cipher: &dyn BlockOp, nonce: &[u8], aad: &[u8], message: &[u8], tag_len: usize) -> [u8; 16] {
    let q = length_width(nonce);

    let mut b0 = [0u8; 16];
    b0[0] = ((tag_len as u8 - 2) / 2) << 3 | (q as u8 - 1);
    if !aad.is_empty() {
        b0[0] |= 0x40;
    }
    b0[1..1 + nonce.len()].copy_from_slice(nonce);
    let be = (message.len() as u64).to_be_bytes();
    b0[16 - q.min(8)..].copy_from_slice(&be[8 - q.min(8)..]);

    let mut mac = b0;
    cipher.encrypt_block(&mut mac);

    let absorb = |mac: &mut [u8; 16], data: &[u8]| {
        for chunk in data.chunks(16) {
            for (m, d) in mac.iter_mut().zip(chunk.iter()) {
                *m ^= d;
            }
            cipher.encrypt_block(mac);
        }
    };

    if !aad.is_empty() {
        // associated data is prefixed with its encoded length, then the
        // whole thing zero padded to a block boundary
        let mut encoded = Vec::with_capacity(aad.len() + 6);
        if aad.len() < 0xff00 {
            encoded.extend_from_slice(&(aad.len() as u16).to_be_bytes());
        } else {
            encoded.extend_from_slice(&[0xff, 0xfe]);
            encoded.extend_from_slice(&(aad.len() as u32).to_be_bytes());
        }
        encoded.extend_from_slice(aad);
        while encoded.len() % 16 != 0 {
            encoded.push(0);
        }
        absorb(&mut mac, &encoded);
    }

    let mut padded = message.to_vec();
    while padded.len() % 16 != 0 {
        padded.push(0);
    }
    absorb(&mut mac, &padded);
    mac
}

fn ctr_stream(cipher: &dyn BlockOp, nonce: &[u8], data: &mut [u8]) {
    let mut keystream = [0u8; 16];
    for (i, chunk) in data.chunks_mut(16).enumerate() {
        keystream.copy_from_slice(&counter_block(nonce, i as u64 + 1));
        cipher.encrypt_block(&mut keystream);
        for (o, k) in chunk.iter_mut().zip(keystream.iter()) {
            *o ^= k;
        }
    }
}

fn tag_mask(cipher: &dyn BlockOp, nonce: &[u8]) -> [u8; 16] {
    let mut a0 = counter_block(nonce, 0);
    cipher.encrypt_block(&mut a0);
    a0
}

/// encrypt and authenticate, returning ciphertext with the tag appended
pub fn seal(
    cipher: &dyn BlockOp,
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
    tag_len: usize,
) -> Result<Vec<u8>> {
    check_params(cipher, nonce, tag_len)?;
    check_message_length(nonce, plaintext.len())?;

    let mac = cbc_mac(cipher, nonce, aad, plaintext, tag_len);
    let mask = tag_mask(cipher, nonce);

    let mut out = plaintext.to_vec();
    ctr_stream(cipher, nonce, &mut out);
    for i in 0..tag_len {
        out.push(mac[i] ^ mask[i]);
    }
    Ok(out)
}

/// verify and decrypt `ciphertext || tag`
pub fn open(
    cipher: &dyn BlockOp,
    nonce: &[u8],
    aad: &[u8],
    sealed: &[u8],
    tag_len: usize,
) -> Result<Vec<u8>> {
    check_params(cipher, nonce, tag_len)?;
    if sealed.len() < tag_len {
        return Err(Error::Decryption);
    }
    let (ciphertext, tag) = sealed.split_at(sealed.len() - tag_len);
    check_message_length(nonce, ciphertext.len())?;

    let mut out = ciphertext.to_vec();
    ctr_stream(cipher, nonce, &mut out);

    let mac = cbc_mac(cipher, nonce, aad, &out, tag_len);
    let mask = tag_mask(cipher, nonce);
    let mut expected = [0u8; 16];
    for i in 0..tag_len {
        expected[i] = mac[i] ^ mask[i];
    }

    if expected[..tag_len].ct_eq(tag).unwrap_u8() != 1 {
        return Err(Error::Decryption);
    }
    Ok(out)
}
