//! Contains an error that extend the base CommitError with new errors from the tokio commits.

use seendb_core::error::flush::FlushError;
use std::error::Error;
use std::{fmt, io};

/// Error from async commit().
#[derive(Debug)]
pub enum CommitError {
    /// An error flushing dirty slots.
    Flush(FlushError),
    /// An io error occured syncing the table file.
    Sync(io::Error),
    /// The channel to send commands to the checkpoint thread has closed (this is fatal for the
    /// table).
    SendChannelClosed,
    /// Failed to receive a response, this indicates a failed table in an unknown state.
    ReceiveFailed,
    /// Table is opened read-only.
    ReadOnly,
}

impl Error for CommitError {}

impl fmt::Display for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::Flush(e) => write!(f, "flush: {}", e),
            Self::Sync(io_err) => write!(f, "sync: {}", io_err),
            Self::SendChannelClosed => write!(f, "send channel closed"),
            Self::ReceiveFailed => write!(f, "receive failed"),
            Self::ReadOnly => write!(f, "read only"),
        }
    }
}

impl From<seendb_core::error::CommitError> for CommitError {
    fn from(err: seendb_core::error::CommitError) -> Self {
        match err {
            seendb_core::error::CommitError::Flush(e) => Self::Flush(e),
            seendb_core::error::CommitError::Sync(e) => Self::Sync(e),
            seendb_core::error::CommitError::ReadOnly => Self::ReadOnly,
        }
    }
}
