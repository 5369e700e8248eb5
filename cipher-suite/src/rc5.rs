//! RC5-32 with a parameterised round count.
//!
//! The 32-bit word variant is the one the RC5-CBC-Pad parameter record
//! describes (64-bit blocks); the round count travels in the record.

use crate::block::BlockOp;
use crate::error::{Error, Result};

const P32: u32 = 0xb7e1_5163;
const Q32: u32 = 0x9e37_79b9;

pub struct Rc5_32 {
    s: Vec<u32>,
    rounds: usize,
}

impl Rc5_32 {
    /// key length 1..=255 bytes, rounds 8..=127 per the parameter record
    pub fn new(key: &[u8], rounds: usize) -> Result<Self> {
        if key.is_empty() || key.len() > 255 {
            return Err(Error::InvalidKeySize { expected: 16, got: key.len() });
        }
        if rounds < 8 || rounds > 127 {
            return Err(Error::Rc5Params);
        }

        // key bytes into little-endian words
        let c = (key.len() + 3) / 4;
        let mut l = vec![0u32; c];
        for (i, &b) in key.iter().enumerate() {
            l[i / 4] |= u32::from(b) << (8 * (i % 4));
        }

        let t = 2 * (rounds + 1);
        let mut s = vec![0u32; t];
        s[0] = P32;
        for i in 1..t {
            s[i] = s[i - 1].wrapping_add(Q32);
        }

        let (mut a, mut b) = (0u32, 0u32);
        let (mut i, mut j) = (0usize, 0usize);
        for _ in 0..3 * t.max(c) {
            a = s[i].wrapping_add(a).wrapping_add(b).rotate_left(3);
            s[i] = a;
            b = l[j].wrapping_add(a).wrapping_add(b).rotate_left(a.wrapping_add(b) & 31);
            l[j] = b;
            i = (i + 1) % t;
            j = (j + 1) % c;
        }

        Ok(Rc5_32 { s, rounds })
    }
}

impl BlockOp for Rc5_32 {
    fn block_size(&self) -> usize {
        8
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        let mut a = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        let mut b = u32::from_le_bytes([block[4], block[5], block[6], block[7]]);
        a = a.wrapping_add(self.s[0]);
        b = b.wrapping_add(self.s[1]);
        for i in 1..=self.rounds {
            a = (a ^ b).rotate_left(b & 31).wrapping_add(self.s[2 * i]);
            b = (b ^ a).rotate_left(a & 31).wrapping_add(self.s[2 * i + 1]);
        }
        block[..4].copy_from_slice(&a.to_le_bytes());
        block[4..].copy_from_slice(&b.to_le_bytes());
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        let mut a = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        let mut b = u32::from_le_bytes([block[4], block[5], block[6], block[7]]);
        for i in (1..=self.rounds).rev() {
            b = b.wrapping_sub(self.s[2 * i + 1]).rotate_right(a & 31) ^ a;
            a = a.wrapping_sub(self.s[2 * i]).rotate_right(b & 31) ^ b;
        }
        b = b.wrapping_sub(self.s[1]);
        a = a.wrapping_sub(self.s[0]);
        block[..4].copy_from_slice(&a.to_le_bytes());
        block[4..].copy_from_slice(&b.to_le_bytes());
    }
}
