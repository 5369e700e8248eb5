//! An implementation of the RadioGatun hash function, in its 32-bit and
//! 64-bit word variants.
//!
//! RadioGatun is a belt-and-mill design: a 19-word mill provides the
//! non-linearity while a 13x3-word belt provides long-term diffusion.
//! Three words of input are injected per round, and after the final
//! input block the state is run for 16 blank rounds before words are
//! squeezed out two at a time.
//!
//! # Usage
//!
//! ```rust
//! use hashcore::digest::Digest;
//! use hashcore::radiogatun::RadioGatun32;
//!
//! let mut hasher = RadioGatun32::new();
//! hasher.input_str("abc");
//! let _hex = hasher.result_str();
//! ```

use crate::cryptoutil::zero;
use crate::digest::Digest;

const MILL_SIZE: usize = 19;
const BELT_ROWS: usize = 13;
const BELT_COLS: usize = 3;
const BLANK_ROUNDS: usize = 16;

macro_rules! radiogatun_impl {
    ($name:ident, $word:ty, $word_bytes:expr, $digest_bytes:expr, $doc:expr) => {
        #[doc=$doc]
        #[derive(Clone)]
        pub struct $name {
            mill: [$word; MILL_SIZE],
            belt: [[$word; BELT_COLS]; BELT_ROWS],
            buffer: [u8; BELT_COLS * $word_bytes],
            buffer_len: usize,
            squeezing: bool,
        }

        impl $name {
            pub fn new() -> $name {
                $name {
                    mill: [0; MILL_SIZE],
                    belt: [[0; BELT_COLS]; BELT_ROWS],
                    buffer: [0u8; BELT_COLS * $word_bytes],
                    buffer_len: 0,
                    squeezing: false,
                }
            }

            fn round(&mut self) {
                let w = (8 * $word_bytes) as u32;
                let q = self.belt[BELT_ROWS - 1];

                // rotate the belt
                for i in (1..BELT_ROWS).rev() {
                    self.belt[i] = self.belt[i - 1];
                }
                self.belt[0] = q;

                // mill to belt feedforward
                for i in 0..12 {
                    self.belt[i + 1][i % BELT_COLS] ^= self.mill[i + 1];
                }

                // mill function: gamma (non-linearity)
                let mut a = [0; MILL_SIZE];
                for i in 0..MILL_SIZE {
                    a[i] = self.mill[i]
                        ^ (self.mill[(i + 1) % MILL_SIZE] | !self.mill[(i + 2) % MILL_SIZE]);
                }
                // pi (intra- and inter-word dispersion)
                let mut b = [0; MILL_SIZE];
                for i in 0..MILL_SIZE {
                    let rot = ((i * (i + 1) / 2) as u32) % w;
                    b[i] = a[(7 * i) % MILL_SIZE].rotate_right(rot);
                }
                // theta (diffusion)
                for i in 0..MILL_SIZE {
                    self.mill[i] = b[i] ^ b[(i + 1) % MILL_SIZE] ^ b[(i + 4) % MILL_SIZE];
                }
                // iota (asymmetry)
                self.mill[0] ^= 1;

                // belt to mill feedforward
                for i in 0..BELT_COLS {
                    self.mill[13 + i] ^= q[i];
                }
            }

            fn absorb_block(&mut self, block: &[u8]) {
                debug_assert!(block.len() == BELT_COLS * $word_bytes);
                for i in 0..BELT_COLS {
                    let mut le = [0u8; $word_bytes];
                    le.copy_from_slice(&block[i * $word_bytes..(i + 1) * $word_bytes]);
                    let p = <$word>::from_le_bytes(le);
                    self.belt[0][i] ^= p;
                    self.mill[16 + i] ^= p;
                }
                self.round();
            }

            fn finish_absorbing(&mut self) {
                // pad with a single 0x01 byte then zeroes to the end of
                // the 3-word block
                let mut block = self.buffer;
                block[self.buffer_len] = 0x01;
                for b in block[self.buffer_len + 1..].iter_mut() {
                    *b = 0;
                }
                self.absorb_block(&block);

                for _ in 0..BLANK_ROUNDS {
                    self.round();
                }
                self.squeezing = true;
            }
        }

        impl Digest for $name {
            fn input(&mut self, input: &[u8]) {
                assert!(!self.squeezing, "input must not be called after result");
                let block_len = BELT_COLS * $word_bytes;
                let mut pos = 0;
                while pos < input.len() {
                    let take =
                        ::std::cmp::min(block_len - self.buffer_len, input.len() - pos);
                    self.buffer[self.buffer_len..self.buffer_len + take]
                        .copy_from_slice(&input[pos..pos + take]);
                    self.buffer_len += take;
                    pos += take;
                    if self.buffer_len == block_len {
                        let block = self.buffer;
                        self.absorb_block(&block);
                        self.buffer_len = 0;
                    }
                }
            }

            fn result(&mut self, out: &mut [u8]) {
                if !self.squeezing {
                    self.finish_absorbing();
                }
                assert!(out.len() >= $digest_bytes);
                let mut produced = 0;
                while produced < $digest_bytes {
                    self.round();
                    for i in 0..2 {
                        let bytes = self.mill[1 + i].to_le_bytes();
                        let take =
                            ::std::cmp::min($word_bytes, $digest_bytes - produced);
                        out[produced..produced + take].copy_from_slice(&bytes[..take]);
                        produced += take;
                        if produced == $digest_bytes {
                            break;
                        }
                    }
                }
            }

            fn reset(&mut self) {
                self.mill = [0; MILL_SIZE];
                self.belt = [[0; BELT_COLS]; BELT_ROWS];
                zero(&mut self.buffer);
                self.buffer_len = 0;
                self.squeezing = false;
            }

            fn output_bits(&self) -> usize {
                $digest_bytes * 8
            }

            fn block_size(&self) -> usize {
                BELT_COLS * $word_bytes
            }
        }
    };
}

radiogatun_impl!(
    RadioGatun32,
    u32,
    4,
    32,
    "RadioGatun over 32-bit words, producing a 256-bit digest."
);
radiogatun_impl!(
    RadioGatun64,
    u64,
    8,
    64,
    "RadioGatun over 64-bit words, producing a 512-bit digest."
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::Digest;

    fn oneshot32(data: &[u8]) -> Vec<u8> {
        let mut h = RadioGatun32::new();
        h.input(data);
        let mut out = vec![0u8; h.output_bytes()];
        h.result(&mut out);
        out
    }

    fn hex32(data: &[u8]) -> String {
        let mut h = RadioGatun32::new();
        h.input(data);
        h.result_str()
    }

    fn hex64(data: &[u8]) -> String {
        let mut h = RadioGatun64::new();
        h.input(data);
        h.result_str()
    }

    #[test]
    fn known_answer_vectors_32() {
        let cases: [(&[u8], &str); 3] = [
            (b"", "f30028b54afab6b3e55355d277711109a19beda7091067e9a492fb5ed9f20117"),
            (b"0", "af0d3f51b98e90eeebae86dd0b304a4003ac5f755fa2cac2b6866a0a91c5c752"),
            (
                b"The quick brown fox jumps over the lazy dog",
                "191589005fec1f2a248f96a16e9553bf38d0aee1648ffa036655ce29c2e229ae",
            ),
        ];
        for (input, expected) in cases.iter() {
            assert_eq!(hex32(input), *expected);
        }
    }

    #[test]
    fn known_answer_vectors_64() {
        let cases: [(&[u8], &str); 3] = [
            (
                b"",
                "64a9a7fa139905b57bdab35d33aa216370d5eae13e77bfcdd85513408311a584\
                 d7bb3678d20775a3891d1434eadff2bb834aa351b2a78a71a0f5bece72a46b1a",
            ),
            (
                b"0",
                "5db6b188afef88ad8d2e426105acffcd42ee439cc26275d11f87b530de94d066\
                 fad1ca7294eb5e5bebec3a2fb29007d3381e6952198574f56c11b4784a4d17ae",
            ),
            (
                b"The quick brown fox jumps over the lazy dog",
                "6219fb8dad92ebe5b2f7d18318f8da13cecbf13289d79f5abf4d253c6904c807\
                 4d70d50ae1165a110d533e27a7599c193e4d93996cdd8d0e21b814349a56f728",
            ),
        ];
        for (input, expected) in cases.iter() {
            assert_eq!(hex64(input), *expected);
        }
    }

    #[test]
    fn incremental_matches_oneshot() {
        let data = b"The quick brown fox jumps over the lazy dog";
        for split in 0..data.len() {
            let mut h = RadioGatun32::new();
            h.input(&data[..split]);
            h.input(&data[split..]);
            let mut out = vec![0u8; h.output_bytes()];
            h.result(&mut out);
            assert_eq!(out, oneshot32(data), "split at {}", split);
        }
    }

    #[test]
    fn incremental_matches_oneshot_64() {
        let data = [0x5au8; 100];
        let mut one = RadioGatun64::new();
        one.input(&data);
        let mut split = RadioGatun64::new();
        split.input(&data[..33]);
        split.input(&data[33..77]);
        split.input(&data[77..]);
        let mut a = vec![0u8; one.output_bytes()];
        let mut b = vec![0u8; split.output_bytes()];
        one.result(&mut a);
        split.result(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_inputs_distinct_digests() {
        assert_ne!(oneshot32(b""), oneshot32(b"\x00"));
        assert_ne!(oneshot32(b"abc"), oneshot32(b"abd"));
        assert_ne!(oneshot32(&[0u8; 12]), oneshot32(&[0u8; 13]));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut h = RadioGatun32::new();
        h.input(b"some input material");
        let mut first = vec![0u8; h.output_bytes()];
        h.result(&mut first);

        h.reset();
        h.input(b"some input material");
        let mut second = vec![0u8; h.output_bytes()];
        h.result(&mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn output_sizes() {
        assert_eq!(RadioGatun32::new().output_bytes(), 32);
        assert_eq!(RadioGatun64::new().output_bytes(), 64);
        assert_eq!(RadioGatun32::new().block_size(), 12);
        assert_eq!(RadioGatun64::new().block_size(), 24);
    }
}
