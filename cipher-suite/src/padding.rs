//! PKCS#7 block padding.

use crate::error::{Error, Result};

/// Append PKCS#7 padding, extending the message to a whole number of
/// blocks. Always adds at least one byte.
pub fn pkcs7_pad(data: &mut Vec<u8>, block_size: usize) {
    assert!(block_size > 0 && block_size < 256);
    let pad = block_size - data.len() % block_size;
    data.extend(std::iter::repeat(pad as u8).take(pad));
}

/// Strip and validate PKCS#7 padding. The error is deliberately the
/// same for every malformation.
pub fn pkcs7_unpad(data: &[u8], block_size: usize) -> Result<&[u8]> {
    if data.is_empty() || data.len() % block_size != 0 {
        return Err(Error::InvalidPadding);
    }
    let pad = data[data.len() - 1] as usize;
    if pad == 0 || pad > block_size {
        return Err(Error::InvalidPadding);
    }
    // scan the whole tail, independent of where the first mismatch is
    let mut bad = 0u8;
    for &b in &data[data.len() - pad..] {
        bad |= b ^ (pad as u8);
    }
    if bad != 0 {
        return Err(Error::InvalidPadding);
    }
    Ok(&data[..data.len() - pad])
}
