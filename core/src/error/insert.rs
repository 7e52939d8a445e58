//! Contains the errors for the insert() and delete() functions.

use crate::error::flush::FlushError;
use crate::error::FetchError;
use std::error::Error;
use std::fmt;

/// Custom error type for inserts.  A full probe chain is not an error, insert returns false.
#[derive(Debug)]
pub enum InsertError {
    /// Key is not the table's key size.
    InvalidKeyLength {
        /// The table's key size.
        expected: usize,
        /// Length of the key given.
        found: usize,
    },
    /// Value is not the table's value size.
    InvalidValueLength {
        /// The table's value size.
        expected: usize,
        /// Length of the value given.
        found: usize,
    },
    /// Table opened read-only.
    ReadOnly,
    /// Error on a checkpoint flush triggered by this insert.
    Flush(FlushError),
}

impl Error for InsertError {}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::InvalidKeyLength { expected, found } => {
                write!(f, "invalid key length {found}, expected {expected}")
            }
            Self::InvalidValueLength { expected, found } => {
                write!(f, "invalid value length {found}, expected {expected}")
            }
            Self::ReadOnly => write!(f, "read only"),
            Self::Flush(e) => write!(f, "flush: {}", e),
        }
    }
}

impl From<FlushError> for InsertError {
    fn from(err: FlushError) -> Self {
        Self::Flush(err)
    }
}

impl From<FetchError> for InsertError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::InvalidKeyLength { expected, found } => {
                Self::InvalidKeyLength { expected, found }
            }
        }
    }
}

/// Custom error type for deletes.  Deleting a missing key is not an error, delete returns false.
#[derive(Debug)]
pub enum DeleteError {
    /// Key is not the table's key size.
    InvalidKeyLength {
        /// The table's key size.
        expected: usize,
        /// Length of the key given.
        found: usize,
    },
    /// Table opened read-only.
    ReadOnly,
    /// Error on a checkpoint flush triggered by this delete.
    Flush(FlushError),
}

impl Error for DeleteError {}

impl fmt::Display for DeleteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::InvalidKeyLength { expected, found } => {
                write!(f, "invalid key length {found}, expected {expected}")
            }
            Self::ReadOnly => write!(f, "read only"),
            Self::Flush(e) => write!(f, "flush: {}", e),
        }
    }
}

impl From<FlushError> for DeleteError {
    fn from(err: FlushError) -> Self {
        Self::Flush(err)
    }
}

impl From<FetchError> for DeleteError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::InvalidKeyLength { expected, found } => {
                Self::InvalidKeyLength { expected, found }
            }
        }
    }
}
