//! Helpers for callers to turn identifiers into fixed width keys and numbers into fixed width
//! values.  The table itself never calls these, it only sees the resulting bytes.

use crate::error::PackError;

/// Reduce identifier (a URL for instance) to exactly width bytes.
/// Bytes come from murmur3 x64 128, each further 16 byte block uses the next seed.
pub fn hash_key(identifier: &[u8], width: usize) -> Vec<u8> {
    let mut key = Vec::with_capacity(width);
    let mut seed = 0_u32;
    while key.len() < width {
        let (h1, h2) = mur3::murmurhash3_x64_128(identifier, seed);
        let mut block = [0_u8; 16];
        block[..8].copy_from_slice(&h1.to_be_bytes());
        block[8..].copy_from_slice(&h2.to_be_bytes());
        let take = (width - key.len()).min(16);
        key.extend_from_slice(&block[..take]);
        seed += 1;
    }
    key
}

/// Pack a u32 as four big endian bytes.
pub fn pack_u32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Unpack a u32 packed with pack_u32.
pub fn unpack_u32(bytes: &[u8]) -> Result<u32, PackError> {
    let mut buf32 = [0_u8; 4];
    if bytes.len() != buf32.len() {
        return Err(PackError::InvalidWidth {
            expected: buf32.len(),
            found: bytes.len(),
        });
    }
    buf32.copy_from_slice(bytes);
    Ok(u32::from_be_bytes(buf32))
}

/// Pack a u64 as eight big endian bytes.
pub fn pack_u64(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Unpack a u64 packed with pack_u64.
pub fn unpack_u64(bytes: &[u8]) -> Result<u64, PackError> {
    let mut buf64 = [0_u8; 8];
    if bytes.len() != buf64.len() {
        return Err(PackError::InvalidWidth {
            expected: buf64.len(),
            found: bytes.len(),
        });
    }
    buf64.copy_from_slice(bytes);
    Ok(u64::from_be_bytes(buf64))
}
