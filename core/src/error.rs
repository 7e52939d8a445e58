//! Implements the errors for a seendb table.

pub mod flush;
pub mod insert;

use crate::error::flush::FlushError;
use std::error::Error;
use std::fmt;
use std::io;

/// Table parameters are invalid or do not match an existing table file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Capacity must be at least one slot.
    ZeroCapacity,
    /// Key size must be at least one byte.
    ZeroKeySize,
    /// Value size must be at least one byte.
    ZeroValueSize,
    /// Existing file was created with a different capacity.
    CapacityMismatch {
        /// Requested capacity.
        expected: u32,
        /// Capacity recorded in the file.
        found: u32,
    },
    /// Existing file was created with a different key size.
    KeySizeMismatch {
        /// Requested key size.
        expected: u16,
        /// Key size recorded in the file.
        found: u16,
    },
    /// Existing file was created with a different value size.
    ValueSizeMismatch {
        /// Requested value size.
        expected: u16,
        /// Value size recorded in the file.
        found: u16,
    },
    /// Existing file was created with a different hasher, probe order would not match.
    HasherMismatch,
}

impl Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::ZeroCapacity => write!(f, "capacity must be greater than zero"),
            Self::ZeroKeySize => write!(f, "key size must be greater than zero"),
            Self::ZeroValueSize => write!(f, "value size must be greater than zero"),
            Self::CapacityMismatch { expected, found } => {
                write!(f, "capacity mismatch, expected {expected} found {found}")
            }
            Self::KeySizeMismatch { expected, found } => {
                write!(f, "key size mismatch, expected {expected} found {found}")
            }
            Self::ValueSizeMismatch { expected, found } => {
                write!(f, "value size mismatch, expected {expected} found {found}")
            }
            Self::HasherMismatch => write!(f, "table was created with a different hasher"),
        }
    }
}

/// Error on loading a table file header.
#[derive(Debug)]
pub enum LoadHeaderError {
    /// The type string for the header was invalid- corrupted or incorrect file type.
    InvalidType,
    /// The header has a format version this code does not understand.
    InvalidVersion(u16),
    /// The calculated and recorded crc32 codes do not match for the header.
    CrcFailed,
    /// An underlying IO error while loading the header.
    IO(io::Error),
}

impl Error for LoadHeaderError {}

impl fmt::Display for LoadHeaderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::InvalidType => write!(f, "invalid type id"),
            Self::InvalidVersion(v) => write!(f, "unsupported version {v}"),
            Self::CrcFailed => write!(f, "header crc32 mismatch"),
            Self::IO(e) => write!(f, "io: {}", e),
        }
    }
}

impl From<io::Error> for LoadHeaderError {
    fn from(io_err: io::Error) -> Self {
        Self::IO(io_err)
    }
}

/// Error on opening a table.
#[derive(Debug)]
pub enum OpenError {
    /// Bad parameters or parameters that disagree with the existing file.
    InvalidConfig(ConfigError),
    /// Error reading the file header.
    Header(LoadHeaderError),
    /// The slot region is not the size the header says it should be.
    RegionLength {
        /// Bytes expected after the header.
        expected: u64,
        /// Bytes actually found.
        found: u64,
    },
    /// A slot has a status byte that is not Empty, Used or Deleted.
    CorruptSlot {
        /// Index of the bad slot.
        index: u32,
        /// The status byte found.
        status: u8,
    },
    /// IO error opening, creating or reading the table file.
    IO(io::Error),
}

impl Error for OpenError {}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::InvalidConfig(e) => write!(f, "invalid config: {}", e),
            Self::Header(e) => write!(f, "header: {}", e),
            Self::RegionLength { expected, found } => write!(
                f,
                "slot region is {found} bytes, expected {expected} bytes"
            ),
            Self::CorruptSlot { index, status } => {
                write!(f, "slot {index} has invalid status {status}")
            }
            Self::IO(e) => write!(f, "io: {}", e),
        }
    }
}

impl From<io::Error> for OpenError {
    fn from(io_err: io::Error) -> Self {
        Self::IO(io_err)
    }
}

impl From<ConfigError> for OpenError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig(err)
    }
}

impl From<LoadHeaderError> for OpenError {
    fn from(err: LoadHeaderError) -> Self {
        match err {
            LoadHeaderError::IO(e) => Self::IO(e),
            err => Self::Header(err),
        }
    }
}

/// Error on a lookup.  A missing key is not an error, lookups return None for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    /// Key is not the table's key size.
    InvalidKeyLength {
        /// The table's key size.
        expected: usize,
        /// Length of the key given.
        found: usize,
    },
}

impl Error for FetchError {}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::InvalidKeyLength { expected, found } => {
                write!(f, "invalid key length {found}, expected {expected}")
            }
        }
    }
}

/// Error from commit().
#[derive(Debug)]
pub enum CommitError {
    /// An error flushing dirty slots.
    Flush(FlushError),
    /// An io error occured syncing the table file.
    Sync(io::Error),
    /// Table is opened read-only.
    ReadOnly,
}

impl Error for CommitError {}

impl fmt::Display for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::Flush(e) => write!(f, "flush: {}", e),
            Self::Sync(io_err) => write!(f, "sync: {}", io_err),
            Self::ReadOnly => write!(f, "read only"),
        }
    }
}

impl From<FlushError> for CommitError {
    fn from(err: FlushError) -> Self {
        Self::Flush(err)
    }
}

/// Error unpacking a fixed width value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackError {
    /// Byte slice was the wrong width for the type.
    InvalidWidth {
        /// Width of the type.
        expected: usize,
        /// Width of the bytes given.
        found: usize,
    },
}

impl Error for PackError {}

impl fmt::Display for PackError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::InvalidWidth { expected, found } => {
                write!(f, "invalid width {found}, expected {expected}")
            }
        }
    }
}
