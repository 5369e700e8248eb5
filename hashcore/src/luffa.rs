//! An implementation of the Luffa family of cryptographic hash
//! functions (224, 256, 384 and 512 bits of output).
//!
//! Luffa keeps 3, 4 or 5 parallel 256-bit lanes depending on the output
//! size. A 256-bit message block is injected into every lane through a
//! xor tree and repeated multiplication by `x` in a ring over
//! `GF(2^32)^8`, then each lane runs its own 8-step permutation made of
//! a bit-sliced 4-bit substitution (SubCrumb), a word mixing layer
//! (MixWord, rotations 2, 14, 10, 1) and per-step round constants.
//! Output blocks are squeezed 256 bits at a time, each preceded by a
//! blank round absorbing an all-zero message block.

use std::cmp;

use crate::cryptoutil::{read_u32v_be, write_u32v_be, zero};
use crate::digest::Digest;

const BLOCK_SIZE: usize = 32;
const STEPS: usize = 8;

/// initial lane values
const IV: [[u32; 8]; 5] = [
    [
        0x6d251e69, 0x44b051e0, 0x4eaa6fb4, 0xdbf78465, 0x6e292011, 0x90152df4, 0xee058139,
        0xdef610bb,
    ],
    [
        0xc3b44b95, 0xd9d2f256, 0x70eee9a0, 0xde099fa3, 0x5d9b0557, 0x8fc944b3, 0xcf1ccf0e,
        0x746cd581,
    ],
    [
        0xf7efc89d, 0x5dba5781, 0x04016ce5, 0xad659c05, 0x0306194f, 0x666d1836, 0x24aa230a,
        0x8b264ae7,
    ],
    [
        0x858075d5, 0x36d79cce, 0xe571f7d7, 0x204b1f67, 0x35870c6a, 0x57e9e923, 0x14bcb808,
        0x7cde72ce,
    ],
    [
        0x6c68e9be, 0x5ec41e22, 0xc825b7c7, 0xaffb4363, 0xf5df3999, 0x0fc688f1, 0xb07224cc,
        0x03e86cea,
    ],
];

/// per-lane, per-step round constants (injected into words 0 and 4)
const CNS: [[[u32; 2]; STEPS]; 5] = [
    [
        [0x303994a6, 0xe0337818],
        [0xc0e65299, 0x441ba90d],
        [0x6cc33a12, 0x7f34d442],
        [0xdc56983e, 0x9389217f],
        [0x1e00108f, 0xe5a8bce6],
        [0x7800423d, 0x5274baf4],
        [0x8f5b7882, 0x26889ba7],
        [0x96e1db12, 0x9a226e9d],
    ],
    [
        [0xb6de10ed, 0x01685f3d],
        [0x70f47aae, 0x05a17cf4],
        [0x0707a3d4, 0xbd09caca],
        [0x1c1e8f51, 0xf4272b28],
        [0x707a3d45, 0x144ae5cc],
        [0xaeb28562, 0xfaa7ae2b],
        [0xbaca1589, 0x2e48f1c1],
        [0x40a46f3e, 0xb923c704],
    ],
    [
        [0xfc20d9d2, 0xe25e72c1],
        [0x34552e25, 0xe623bb72],
        [0x7ad8818f, 0x5c58a4a4],
        [0x8438764a, 0x1e38e2e7],
        [0xbb6de032, 0x78e38b9d],
        [0xedb780c8, 0x27586719],
        [0xd9847356, 0x36eda57f],
        [0xa2c78434, 0x703aace7],
    ],
    [
        [0xb213afa5, 0xe028c9bf],
        [0xc84ebe95, 0x44756f91],
        [0x4e608a22, 0x7e8fce32],
        [0x56d858fe, 0x956548be],
        [0x343b138f, 0xfe191be2],
        [0xd0ec4e3d, 0x3cb226e5],
        [0x2ceb4882, 0x5944a28e],
        [0xb3ad2208, 0xa1c4c355],
    ],
    [
        [0xf0d2e9e3, 0x5090d577],
        [0xac11d7fa, 0x2d1925ab],
        [0x1bcb66f2, 0xb46496ac],
        [0x6f2d9bc9, 0xd1925ab0],
        [0x78602649, 0x29131ab6],
        [0x8edae952, 0x0fc053c3],
        [0x3b6ba548, 0x3f014f0c],
        [0xedae9520, 0xfc053c31],
    ],
];

/// multiplication by x in the message-injection ring
#[inline]
fn mult2(a: &mut [u32; 8]) {
    let tmp = a[7];
    a[7] = a[6];
    a[6] = a[5];
    a[5] = a[4];
    a[4] = a[3] ^ tmp;
    a[3] = a[2] ^ tmp;
    a[2] = a[1];
    a[1] = a[0] ^ tmp;
    a[0] = tmp;
}

/// bit-sliced 4-bit substitution over four word slices
#[inline]
fn sub_crumb(a0: &mut u32, a1: &mut u32, a2: &mut u32, a3: &mut u32) {
    let mut tmp = *a0;
    *a0 |= *a1;
    *a2 ^= *a3;
    *a1 = !*a1;
    *a0 ^= *a3;
    *a3 &= tmp;
    *a1 ^= *a3;
    *a3 ^= *a2;
    *a2 &= *a0;
    *a0 = !*a0;
    *a2 ^= *a1;
    *a1 |= *a3;
    tmp ^= *a1;
    *a3 ^= *a2;
    *a2 &= *a1;
    *a1 ^= *a0;
    *a0 = tmp;
}

#[inline]
fn mix_word(a: &mut u32, b: &mut u32) {
    *b ^= *a;
    *a = a.rotate_left(2) ^ *b;
    *b = b.rotate_left(14) ^ *a;
    *a = a.rotate_left(10) ^ *b;
    *b = b.rotate_left(1);
}

fn permute(v: &mut [u32; 8], lane: usize) {
    // tweak: rotate the second half of the lane by the lane index
    for k in 4..8 {
        v[k] = v[k].rotate_left(lane as u32);
    }
    for step in 0..STEPS {
        {
            let (lo, hi) = v.split_at_mut(4);
            let (l0, l1) = lo.split_at_mut(1);
            let (l1, l2) = l1.split_at_mut(1);
            let (l2, l3) = l2.split_at_mut(1);
            sub_crumb(&mut l0[0], &mut l1[0], &mut l2[0], &mut l3[0]);
            let (h0, h1) = hi.split_at_mut(1);
            let (h1, h2) = h1.split_at_mut(1);
            let (h2, h3) = h2.split_at_mut(1);
            sub_crumb(&mut h1[0], &mut h2[0], &mut h3[0], &mut h0[0]);
        }
        for k in 0..4 {
            let (lo, hi) = v.split_at_mut(4);
            mix_word(&mut lo[k], &mut hi[k]);
        }
        v[0] ^= CNS[lane][step][0];
        v[4] ^= CNS[lane][step][1];
    }
}

#[derive(Clone)]
pub struct Luffa {
    lanes: [[u32; 8]; 5],
    width: usize,
    output_bits: usize,
    buffer: [u8; BLOCK_SIZE],
    buffer_len: usize,
    finished: bool,
}

impl Luffa {
    fn with_width(width: usize, output_bits: usize) -> Luffa {
        let mut lanes = [[0u32; 8]; 5];
        for j in 0..width {
            lanes[j] = IV[j];
        }
        Luffa {
            lanes,
            width,
            output_bits,
            buffer: [0u8; BLOCK_SIZE],
            buffer_len: 0,
            finished: false,
        }
    }

    pub fn luffa224() -> Luffa {
        Luffa::with_width(3, 224)
    }

    pub fn luffa256() -> Luffa {
        Luffa::with_width(3, 256)
    }

    pub fn luffa384() -> Luffa {
        Luffa::with_width(4, 384)
    }

    pub fn luffa512() -> Luffa {
        Luffa::with_width(5, 512)
    }

    fn process_block(&mut self, block: &[u32; 8]) {
        let w = self.width;

        // message injection: xor tree followed by the mult2 cascade
        let mut t = [0u32; 8];
        for j in 0..w {
            for k in 0..8 {
                t[k] ^= self.lanes[j][k];
            }
        }
        mult2(&mut t);
        for j in 0..w {
            for k in 0..8 {
                self.lanes[j][k] ^= t[k];
            }
        }
        let mut x = *block;
        for j in 0..w {
            for k in 0..8 {
                self.lanes[j][k] ^= x[k];
            }
            mult2(&mut x);
        }

        for j in 0..w {
            permute(&mut self.lanes[j], j);
        }
    }

    fn absorb_buffer(&mut self) {
        let mut m = [0u32; 8];
        read_u32v_be(&mut m, &self.buffer);
        self.process_block(&m);
        self.buffer_len = 0;
    }

    /// one output block: a blank round then the xor of all lanes
    fn squeeze(&mut self) -> [u32; 8] {
        self.process_block(&[0u32; 8]);
        let mut z = [0u32; 8];
        for j in 0..self.width {
            for k in 0..8 {
                z[k] ^= self.lanes[j][k];
            }
        }
        z
    }

    fn finish(&mut self) {
        // pad with 0x80 then zeroes to the end of the block
        self.buffer[self.buffer_len] = 0x80;
        for i in self.buffer_len + 1..BLOCK_SIZE {
            self.buffer[i] = 0;
        }
        self.buffer_len = BLOCK_SIZE;
        self.absorb_buffer();
        self.finished = true;
    }
}

impl Digest for Luffa {
    fn input(&mut self, input: &[u8]) {
        assert!(!self.finished, "input must not be called after result");
        let mut pos = 0;
        while pos < input.len() {
            let take = cmp::min(BLOCK_SIZE - self.buffer_len, input.len() - pos);
            self.buffer[self.buffer_len..self.buffer_len + take]
                .copy_from_slice(&input[pos..pos + take]);
            self.buffer_len += take;
            pos += take;
            if self.buffer_len == BLOCK_SIZE {
                self.absorb_buffer();
            }
        }
    }

    fn result(&mut self, out: &mut [u8]) {
        if !self.finished {
            self.finish();
        }
        let out_bytes = self.output_bytes();
        assert!(out.len() >= out_bytes);
        let mut produced = 0;
        while produced < out_bytes {
            let z = self.squeeze();
            let mut block = [0u8; BLOCK_SIZE];
            write_u32v_be(&mut block, &z);
            let take = cmp::min(BLOCK_SIZE, out_bytes - produced);
            out[produced..produced + take].copy_from_slice(&block[..take]);
            produced += take;
        }
    }

    fn reset(&mut self) {
        let mut lanes = [[0u32; 8]; 5];
        for j in 0..self.width {
            lanes[j] = IV[j];
        }
        self.lanes = lanes;
        zero(&mut self.buffer);
        self.buffer_len = 0;
        self.finished = false;
    }

    fn output_bits(&self) -> usize {
        self.output_bits
    }

    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::Digest;

    fn oneshot(mut h: Luffa, data: &[u8]) -> Vec<u8> {
        h.input(data);
        let mut out = vec![0u8; h.output_bytes()];
        h.result(&mut out);
        out
    }

    fn hex(mut h: Luffa, data: &[u8]) -> String {
        h.input(data);
        h.result_str()
    }

    #[test]
    fn known_answer_vectors_224() {
        let cases: [(&[u8], &str); 3] = [
            (b"", "dbb8665871f4154d3e4396aefbba417cb7837dd683c332ba6be87e02"),
            (b"0", "4384f5ee950d5c2bd5af0011d2c474ff056fe9858dc8354bb131a433"),
            (
                b"The quick brown fox jumps over the lazy dog",
                "49ac0a3651e0dbf30224e2b0a8b7f24450c8b49f21e6eef9fc7968c3",
            ),
        ];
        for (input, expected) in cases.iter() {
            assert_eq!(hex(Luffa::luffa224(), input), *expected);
        }
    }

    #[test]
    fn known_answer_vectors_256() {
        let cases: [(&[u8], &str); 3] = [
            (b"", "dbb8665871f4154d3e4396aefbba417cb7837dd683c332ba6be87e02a2712d6f"),
            (b"0", "4384f5ee950d5c2bd5af0011d2c474ff056fe9858dc8354bb131a433ad3229fa"),
            (
                b"The quick brown fox jumps over the lazy dog",
                "49ac0a3651e0dbf30224e2b0a8b7f24450c8b49f21e6eef9fc7968c33e25bef7",
            ),
        ];
        for (input, expected) in cases.iter() {
            assert_eq!(hex(Luffa::luffa256(), input), *expected);
        }
    }

    #[test]
    fn pinned_digests_384() {
        let cases: [(&[u8], &str); 3] = [
            (
                b"",
                "7fd7f01852afbde1113b454423484834d238b90c13eb82052dfa8dd76660b1ce\
                 b1f8c4612a9c4fab3d239b50d4bb77be",
            ),
            (
                b"0",
                "fe1c730c922646baff7cfa59d6c497b61807c8ef94a3590d5f73e1b27d033957\
                 822d21a36966b7f53bb8d4d40ec4086b",
            ),
            (
                b"The quick brown fox jumps over the lazy dog",
                "5bf935884ae013dff091b5e25be56f07daf7fc059b250f815a23a982568a9cb4\
                 36f1409fc1fbc376295f19cc862773e2",
            ),
        ];
        for (input, expected) in cases.iter() {
            assert_eq!(hex(Luffa::luffa384(), input), *expected);
        }
    }

    #[test]
    fn pinned_digests_512() {
        let cases: [(&[u8], &str); 3] = [
            (
                b"",
                "fd626e9fb2b7388a29055036e3c31576a29c1ad46824f86ef8371838c0b36271\
                 47aeaf51b7548299ebc82ea84b561d2b9d27ae3eab2b904f75f8c73e98516c51",
            ),
            (
                b"0",
                "17927137a60f5ddec1cffb6991c85ce53bd39dbb49324aed3411faa028f31ef5\
                 92996e741aa707261d3a42b9e85ea4b1d2b098992401f545b276cc59118cf903",
            ),
            (
                b"The quick brown fox jumps over the lazy dog",
                "5e283ca6c69547b2cb4fbca6a5b3163483398a3a121ba2b47cfde2d694227b8f\
                 0f0debfb93dd608f96649837b21b63fee23fc6cc149e56ebe4ddaa123999d616",
            ),
        ];
        for (input, expected) in cases.iter() {
            assert_eq!(hex(Luffa::luffa512(), input), *expected);
        }
    }

    #[test]
    fn incremental_matches_oneshot() {
        let data: Vec<u8> = (0u8..=255).cycle().take(97).collect();
        for split in [0usize, 1, 31, 32, 33, 64, 96] {
            let mut h = Luffa::luffa256();
            h.input(&data[..split]);
            h.input(&data[split..]);
            let mut out = vec![0u8; h.output_bytes()];
            h.result(&mut out);
            assert_eq!(out, oneshot(Luffa::luffa256(), &data), "split at {}", split);
        }
    }

    #[test]
    fn widths_disagree() {
        // the 256 and 512 variants share no lane state
        let d256 = oneshot(Luffa::luffa256(), b"abc");
        let d512 = oneshot(Luffa::luffa512(), b"abc");
        assert_ne!(&d256[..], &d512[..32]);
    }

    #[test]
    fn distinct_inputs_distinct_digests() {
        assert_ne!(oneshot(Luffa::luffa256(), b""), oneshot(Luffa::luffa256(), b"\x00"));
        assert_ne!(
            oneshot(Luffa::luffa384(), b"message a"),
            oneshot(Luffa::luffa384(), b"message b")
        );
        // a full block and the same block plus one byte
        assert_ne!(
            oneshot(Luffa::luffa512(), &[7u8; 32]),
            oneshot(Luffa::luffa512(), &[7u8; 33])
        );
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut h = Luffa::luffa512();
        h.input(b"first use");
        let mut first = vec![0u8; h.output_bytes()];
        h.result(&mut first);

        h.reset();
        h.input(b"first use");
        let mut second = vec![0u8; h.output_bytes()];
        h.result(&mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn output_sizes() {
        assert_eq!(Luffa::luffa224().output_bytes(), 28);
        assert_eq!(Luffa::luffa256().output_bytes(), 32);
        assert_eq!(Luffa::luffa384().output_bytes(), 48);
        assert_eq!(Luffa::luffa512().output_bytes(), 64);
    }

    #[test]
    fn truncation_law() {
        // luffa-224 is luffa-256 truncated
        let d224 = oneshot(Luffa::luffa224(), b"truncation");
        let d256 = oneshot(Luffa::luffa256(), b"truncation");
        assert_eq!(&d224[..], &d256[..28]);
    }
}
