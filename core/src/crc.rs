//! CRC32 helpers for fixed size on-disk blocks.  The checksum always occupies the last four bytes
//! of the block in little endian format.

/// True if the trailing crc32 of block matches the rest of block.
pub(crate) fn check_crc(block: &[u8]) -> bool {
    let len = block.len();
    if len < 5 {
        return false;
    }
    let mut buf32 = [0_u8; 4];
    buf32.copy_from_slice(&block[(len - 4)..]);
    crc32fast::hash(&block[..(len - 4)]) == u32::from_le_bytes(buf32)
}

/// Overwrite the last four bytes of block with the crc32 of everything before them.
pub(crate) fn add_crc32(block: &mut [u8]) {
    let len = block.len();
    if len < 4 {
        return;
    }
    let crc32 = crc32fast::hash(&block[..(len - 4)]);
    block[len - 4..].copy_from_slice(&crc32.to_le_bytes());
}
