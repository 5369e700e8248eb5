//! Galois/Counter Mode over any 128-bit [`BlockOp`](../block/trait.BlockOp.html).
//!
//! The GHASH field arithmetic is carried in a `u128` holding the block
//! in big-endian order, with the GCM reflected bit convention.

use subtle::ConstantTimeEq;

use crate::block::BlockOp;
use crate::error::{Error, Result};

const R: u128 = 0xe1 << 120;

fn block_to_u128(block: &[u8]) -> u128 {
    let mut bytes = [0u8; 16];
    bytes[..block.len()].copy_from_slice(block);
    u128::from_be_bytes(bytes)
}

fn gf_mul(x: u128, y: u128) -> u128 {
    let mut z = 0u128;
    let mut v = y;
    for i in 0..128 {
        if (x >> (127 - i)) & 1 == 1 {
            z ^= v;
        }
        let lsb = v & 1;
        v >>= 1;
        if lsb == 1 {
            v ^= R;
        }
    }
    z
}

struct Ghash {
    h: u128,
    y: u128,
}

impl Ghash {
    fn new(h: u128) -> Self {
        Ghash { h, y: 0 }
    }

    /// absorb data, zero padding the trailing partial block
    fn update_padded(&mut self, data: &[u8]) {
        for chunk in data.chunks(16) {
            self.y = gf_mul(self.y ^ block_to_u128(chunk), self.h);
        }
    }

    fn update_lengths(&mut self, aad_len: usize, data_len: usize) {
        let lens = (u128::from(aad_len as u64 * 8) << 64) | u128::from(data_len as u64 * 8);
        self.y = gf_mul(self.y ^ lens, self.h);
    }

    fn finalize(self) -> [u8; 16] {
        self.y.to_be_bytes()
    }
}

fn increment_ctr32(block: &mut [u8; 16]) {
    let mut ctr = u32::from_be_bytes([block[12], block[13], block[14], block[15]]);
    ctr = ctr.wrapping_add(1);
    block[12..].copy_from_slice(&ctr.to_be_bytes());
}

/// keystream application with the 32-bit wrapping counter of GCM
fn gctr(cipher: &dyn BlockOp, initial: &[u8; 16], data: &mut [u8]) {
    let mut counter = *initial;
    let mut keystream = [0u8; 16];
    for chunk in data.chunks_mut(16) {
        increment_ctr32(&mut counter);
        keystream.copy_from_slice(&counter);
        cipher.encrypt_block(&mut keystream);
        for (o, k) in chunk.iter_mut().zip(keystream.iter()) {
            *o ^= k;
        }
    }
}

fn setup(cipher: &dyn BlockOp, nonce: &[u8], tag_len: usize) -> Result<(u128, [u8; 16])> {
    if cipher.block_size() != 16 {
        return Err(Error::UnsupportedCipher("GCM needs a 128-bit block".to_string()));
    }
    if nonce.is_empty() {
        return Err(Error::InvalidNonceSize(0));
    }
    if tag_len < 12 || tag_len > 16 {
        return Err(Error::InvalidTagSize(tag_len));
    }

    let mut h_block = [0u8; 16];
    cipher.encrypt_block(&mut h_block);
    let h = u128::from_be_bytes(h_block);

    let mut j0 = [0u8; 16];
    if nonce.len() == 12 {
        j0[..12].copy_from_slice(nonce);
        j0[15] = 1;
    } else {
        let mut g = Ghash::new(h);
        g.update_padded(nonce);
        g.update_lengths(0, nonce.len());
        j0 = g.finalize();
    }
    Ok((h, j0))
}

fn compute_tag(cipher: &dyn BlockOp, h: u128, j0: &[u8; 16], aad: &[u8], ciphertext: &[u8]) -> [u8; 16] {
    let mut g = Ghash::new(h);
    g.update_padded(aad);
    g.update_padded(ciphertext);
    g.update_lengths(aad.len(), ciphertext.len());
    let mut tag = g.finalize();

    let mut e_j0 = *j0;
    cipher.encrypt_block(&mut e_j0);
    for (t, e) in tag.iter_mut().zip(e_j0.iter()) {
        *t ^= e;
    }
    tag
}

/// encrypt and authenticate, returning ciphertext with the tag appended
pub fn seal(
    cipher: &dyn BlockOp,
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
    tag_len: usize,
) -> Result<Vec<u8>> {
    let (h, j0) = setup(cipher, nonce, tag_len)?;

    let mut out = plaintext.to_vec();
    gctr(cipher, &j0, &mut out);
    let tag = compute_tag(cipher, h, &j0, aad, &out);
    out.extend_from_slice(&tag[..tag_len]);
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
    let (h, j0) = setup(cipher, nonce, tag_len)?;
    if sealed.len() < tag_len {
        return Err(Error::Decryption);
    }
    let (ciphertext, tag) = sealed.split_at(sealed.len() - tag_len);

    let expected = compute_tag(cipher, h, &j0, aad, ciphertext);
    if expected[..tag_len].ct_eq(tag).unwrap_u8() != 1 {
        return Err(Error::Decryption);
    }

    let mut out = ciphertext.to_vec();
    gctr(cipher, &j0, &mut out);
    Ok(out)
}
