//! Contains the error type for the flush() function.

use std::error::Error;
use std::fmt;
use std::io;

/// Error writing dirty state back to the table file.
#[derive(Debug)]
pub enum FlushError {
    /// Error writing slots to the table file.
    WriteSlots(io::Error),
    /// Error writing the header back to the table file.
    WriteHeader(io::Error),
}

impl Error for FlushError {}

impl fmt::Display for FlushError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::WriteSlots(e) => write!(f, "write slots: {}", e),
            Self::WriteHeader(e) => write!(f, "write header: {}", e),
        }
    }
}
