//! Small helpers shared by the hash implementations: fixed-endian
//! reads/writes between byte buffers and word lanes.

/// Write a u64 into a vector, which must be 8 bytes long. The value is
/// written in big-endian format.
pub fn write_u64_be(dst: &mut [u8], input: u64) {
    assert!(dst.len() == 8);
    dst.copy_from_slice(&input.to_be_bytes());
}

/// Write a u32 into a vector, which must be 4 bytes long. The value is
/// written in big-endian format.
pub fn write_u32_be(dst: &mut [u8], input: u32) {
    assert!(dst.len() == 4);
    dst.copy_from_slice(&input.to_be_bytes());
}

/// Write a vector of u32s into a vector of bytes. The values are written
/// in big-endian format.
pub fn write_u32v_be(dst: &mut [u8], input: &[u32]) {
    assert!(dst.len() == 4 * input.len());
    for (chunk, &v) in dst.chunks_mut(4).zip(input.iter()) {
        chunk.copy_from_slice(&v.to_be_bytes());
    }
}

/// Write a u32 into a vector, which must be 4 bytes long. The value is
/// written in little-endian format.
pub fn write_u32_le(dst: &mut [u8], input: u32) {
    assert!(dst.len() == 4);
    dst.copy_from_slice(&input.to_le_bytes());
}

/// Write a u64 into a vector, which must be 8 bytes long. The value is
/// written in little-endian format.
pub fn write_u64_le(dst: &mut [u8], input: u64) {
    assert!(dst.len() == 8);
    dst.copy_from_slice(&input.to_le_bytes());
}

/// Read a vector of bytes into a vector of u32s. The values are read in
/// big-endian format.
pub fn read_u32v_be(dst: &mut [u32], input: &[u8]) {
    assert!(input.len() == 4 * dst.len());
    for (d, chunk) in dst.iter_mut().zip(input.chunks(4)) {
        let mut b = [0u8; 4];
        b.copy_from_slice(chunk);
        *d = u32::from_be_bytes(b);
    }
}

/// Read a vector of bytes into a vector of u32s. The values are read in
/// little-endian format.
pub fn read_u32v_le(dst: &mut [u32], input: &[u8]) {
    assert!(input.len() == 4 * dst.len());
    for (d, chunk) in dst.iter_mut().zip(input.chunks(4)) {
        let mut b = [0u8; 4];
        b.copy_from_slice(chunk);
        *d = u32::from_le_bytes(b);
    }
}

/// Read a vector of bytes into a vector of u64s. The values are read in
/// little-endian format.
pub fn read_u64v_le(dst: &mut [u64], input: &[u8]) {
    assert!(input.len() == 8 * dst.len());
    for (d, chunk) in dst.iter_mut().zip(input.chunks(8)) {
        let mut b = [0u8; 8];
        b.copy_from_slice(chunk);
        *d = u64::from_le_bytes(b);
    }
}

/// Copy bytes from src to dest
pub fn copy_memory(src: &[u8], dst: &mut [u8]) {
    assert!(dst.len() >= src.len());
    dst[..src.len()].copy_from_slice(src);
}

/// Zero all bytes in dst
pub fn zero(dst: &mut [u8]) {
    for b in dst.iter_mut() {
        *b = 0;
    }
}
