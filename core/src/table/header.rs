//! Contains the table file header.

use crate::crc::{add_crc32, check_crc};
use crate::error::LoadHeaderError;
use crate::table_config::TableConfig;
use std::io;
use std::io::{Read, Seek, SeekFrom, Write};

/// Size of a table header, the slot region starts right after it.
pub const HEADER_SIZE: usize = 64;
/// Current file format version.
pub const FORMAT_VERSION: u16 = 1;
const TYPE_ID: &[u8; 8] = b"seendb.t";

/// Header for a table file.  This is rewritten in place on every flush and is followed by the
/// slot region.  The last four bytes are a CRC32 of the rest of the header.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct TableHeader {
    type_id: [u8; 8], // The characters "seendb.t"
    version: u16,
    capacity: u32,
    key_size: u16,
    value_size: u16,
    salt: u64,   // Random on creation
    pepper: u64, // salt hashed with the table's hasher
    used: u64,
    deleted: u64,
}

impl TableHeader {
    /// Return a new header for a freshly created table.
    pub fn new(config: &TableConfig, salt: u64, pepper: u64) -> Self {
        Self {
            type_id: *TYPE_ID,
            version: FORMAT_VERSION,
            capacity: config.capacity,
            key_size: config.key_size,
            value_size: config.value_size,
            salt,
            pepper,
            used: 0,
            deleted: 0,
        }
    }

    /// Load a header from source.  This will seek to the beginning and leave source
    /// positioned after the header.
    pub fn load_header<R: Read + Seek>(source: &mut R) -> Result<Self, LoadHeaderError> {
        source.seek(SeekFrom::Start(0))?;
        let mut buffer = [0_u8; HEADER_SIZE];
        source.read_exact(&mut buffer[..])?;
        Self::decode(&buffer)
    }

    fn decode(buffer: &[u8; HEADER_SIZE]) -> Result<Self, LoadHeaderError> {
        let mut buf16 = [0_u8; 2];
        let mut buf32 = [0_u8; 4];
        let mut buf64 = [0_u8; 8];
        let mut type_id = [0_u8; 8];
        type_id.copy_from_slice(&buffer[0..8]);
        if &type_id != TYPE_ID {
            return Err(LoadHeaderError::InvalidType);
        }
        if !check_crc(&buffer[..]) {
            return Err(LoadHeaderError::CrcFailed);
        }
        let mut pos = 8;
        buf16.copy_from_slice(&buffer[pos..(pos + 2)]);
        let version = u16::from_le_bytes(buf16);
        pos += 2;
        if version != FORMAT_VERSION {
            return Err(LoadHeaderError::InvalidVersion(version));
        }
        buf32.copy_from_slice(&buffer[pos..(pos + 4)]);
        let capacity = u32::from_le_bytes(buf32);
        pos += 4;
        buf16.copy_from_slice(&buffer[pos..(pos + 2)]);
        let key_size = u16::from_le_bytes(buf16);
        pos += 2;
        buf16.copy_from_slice(&buffer[pos..(pos + 2)]);
        let value_size = u16::from_le_bytes(buf16);
        pos += 2;
        buf64.copy_from_slice(&buffer[pos..(pos + 8)]);
        let salt = u64::from_le_bytes(buf64);
        pos += 8;
        buf64.copy_from_slice(&buffer[pos..(pos + 8)]);
        let pepper = u64::from_le_bytes(buf64);
        pos += 8;
        buf64.copy_from_slice(&buffer[pos..(pos + 8)]);
        let used = u64::from_le_bytes(buf64);
        pos += 8;
        buf64.copy_from_slice(&buffer[pos..(pos + 8)]);
        let deleted = u64::from_le_bytes(buf64);
        Ok(Self {
            type_id,
            version,
            capacity,
            key_size,
            value_size,
            salt,
            pepper,
            used,
            deleted,
        })
    }

    fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buffer = [0_u8; HEADER_SIZE];
        let mut pos = 0;
        buffer[pos..8].copy_from_slice(&self.type_id);
        pos += 8;
        buffer[pos..(pos + 2)].copy_from_slice(&self.version.to_le_bytes());
        pos += 2;
        buffer[pos..(pos + 4)].copy_from_slice(&self.capacity.to_le_bytes());
        pos += 4;
        buffer[pos..(pos + 2)].copy_from_slice(&self.key_size.to_le_bytes());
        pos += 2;
        buffer[pos..(pos + 2)].copy_from_slice(&self.value_size.to_le_bytes());
        pos += 2;
        buffer[pos..(pos + 8)].copy_from_slice(&self.salt.to_le_bytes());
        pos += 8;
        buffer[pos..(pos + 8)].copy_from_slice(&self.pepper.to_le_bytes());
        pos += 8;
        buffer[pos..(pos + 8)].copy_from_slice(&self.used.to_le_bytes());
        pos += 8;
        buffer[pos..(pos + 8)].copy_from_slice(&self.deleted.to_le_bytes());
        // Rest is reserved (zero) up to the crc32.
        add_crc32(&mut buffer[..]);
        buffer
    }

    /// Write this header at the start of sync.
    pub fn write_header<W: Write + Seek>(&self, sync: &mut W) -> Result<(), io::Error> {
        sync.seek(SeekFrom::Start(0))?;
        sync.write_all(&self.encode())?;
        Ok(())
    }

    /// Number of slots.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Bytes in a key.
    pub fn key_size(&self) -> u16 {
        self.key_size
    }

    /// Bytes in a value.
    pub fn value_size(&self) -> u16 {
        self.value_size
    }

    /// Bytes in one slot record (status byte, key and value).
    pub fn slot_size(&self) -> usize {
        1 + self.key_size as usize + self.value_size as usize
    }

    /// Bytes the slot region following the header should occupy.
    pub fn region_len(&self) -> u64 {
        self.capacity as u64 * self.slot_size() as u64
    }

    /// Salt recorded at creation.
    pub fn salt(&self) -> u64 {
        self.salt
    }

    /// Salt hashed with the hasher in use at creation.
    pub fn pepper(&self) -> u64 {
        self.pepper
    }

    /// Live entries recorded at the last flush.
    pub fn used(&self) -> u64 {
        self.used
    }

    /// Tombstones recorded at the last flush.
    pub fn deleted(&self) -> u64 {
        self.deleted
    }

    /// Record the counts to be written with the next header write.
    pub fn set_counts(&mut self, used: u64, deleted: u64) {
        self.used = used;
        self.deleted = deleted;
    }
}
