//! Block primitives behind a single object-safe operation.
//!
//! The mode implementations only need "encrypt one block in place" and
//! "decrypt one block in place", so that is all the [`BlockOp`] trait
//! exposes. [`BlockAlg`] names the primitives the suites are built
//! from and instantiates a keyed `BlockOp` for them.

use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

use crate::error::{Error, Result};

/// a keyed block primitive; blocks are exactly `block_size` bytes
pub trait BlockOp {
    fn block_size(&self) -> usize;
    fn encrypt_block(&self, block: &mut [u8]);
    fn decrypt_block(&self, block: &mut [u8]);
}

impl std::fmt::Debug for dyn BlockOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockOp").field("block_size", &self.block_size()).finish()
    }
}

macro_rules! block_adapter {
    ($name:ident, $inner:ty, $keysize:expr, $blocksize:expr) => {
        pub struct $name($inner);

        impl $name {
            pub fn new(key: &[u8]) -> Result<Self> {
                <$inner>::new_from_slice(key).map($name).map_err(|_| {
                    Error::InvalidKeySize { expected: $keysize, got: key.len() }
                })
            }
        }

        impl BlockOp for $name {
            fn block_size(&self) -> usize {
                $blocksize
            }
            fn encrypt_block(&self, block: &mut [u8]) {
                self.0.encrypt_block(GenericArray::from_mut_slice(block));
            }
            fn decrypt_block(&self, block: &mut [u8]) {
                self.0.decrypt_block(GenericArray::from_mut_slice(block));
            }
        }
    };
}

block_adapter!(Aes128Block, aes::Aes128, 16, 16);
block_adapter!(Aes192Block, aes::Aes192, 24, 16);
block_adapter!(Aes256Block, aes::Aes256, 32, 16);
block_adapter!(DesBlock, des::Des, 8, 8);
block_adapter!(TdesBlock, des::TdesEde3, 24, 8);
block_adapter!(Sm4Block, sm4::Sm4, 16, 16);
block_adapter!(KuznyechikBlock, kuznyechik::Kuznyechik, 32, 16);
block_adapter!(MagmaBlock, magma::Magma, 32, 8);

/// RC2 with an explicit effective key length in bits
pub struct Rc2Block(rc2::Rc2);

impl Rc2Block {
    pub fn new(key: &[u8], effective_bits: usize) -> Result<Self> {
        if key.is_empty() || key.len() > 128 {
            return Err(Error::InvalidKeySize { expected: 16, got: key.len() });
        }
        Ok(Rc2Block(rc2::Rc2::new_with_eff_key_len(key, effective_bits)))
    }
}

impl BlockOp for Rc2Block {
    fn block_size(&self) -> usize {
        8
    }
    fn encrypt_block(&self, block: &mut [u8]) {
        self.0.encrypt_block(GenericArray::from_mut_slice(block));
    }
    fn decrypt_block(&self, block: &mut [u8]) {
        self.0.decrypt_block(GenericArray::from_mut_slice(block));
    }
}

/// the fixed-parameter primitives the suites and registries draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAlg {
    Aes128,
    Aes192,
    Aes256,
    Des,
    TdesEde3,
    Sm4,
    Kuznyechik,
    Magma,
}

impl BlockAlg {
    pub fn key_size(self) -> usize {
        match self {
            BlockAlg::Aes128 | BlockAlg::Sm4 => 16,
            BlockAlg::Aes192 => 24,
            BlockAlg::Aes256 | BlockAlg::Kuznyechik | BlockAlg::Magma => 32,
            BlockAlg::Des => 8,
            BlockAlg::TdesEde3 => 24,
        }
    }

    pub fn block_size(self) -> usize {
        match self {
            BlockAlg::Des | BlockAlg::TdesEde3 | BlockAlg::Magma => 8,
            _ => 16,
        }
    }

    /// instantiate the primitive with the given key
    pub fn with_key(self, key: &[u8]) -> Result<Box<dyn BlockOp>> {
        if key.len() != self.key_size() {
            return Err(Error::InvalidKeySize { expected: self.key_size(), got: key.len() });
        }
        Ok(match self {
            BlockAlg::Aes128 => Box::new(Aes128Block::new(key)?),
            BlockAlg::Aes192 => Box::new(Aes192Block::new(key)?),
            BlockAlg::Aes256 => Box::new(Aes256Block::new(key)?),
            BlockAlg::Des => Box::new(DesBlock::new(key)?),
            BlockAlg::TdesEde3 => Box::new(TdesBlock::new(key)?),
            BlockAlg::Sm4 => Box::new(Sm4Block::new(key)?),
            BlockAlg::Kuznyechik => Box::new(KuznyechikBlock::new(key)?),
            BlockAlg::Magma => Box::new(MagmaBlock::new(key)?),
        })
    }
}
