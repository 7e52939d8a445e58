//! Define the configuration used to create or open a table.

use crate::error::{ConfigError, OpenError};
use crate::table::HashTable;
use crate::table_files::TableFiles;
use std::hash::BuildHasher;
use std::time::Duration;

/// Default number of mutations between automatic checkpoints.
pub const DEFAULT_CHECKPOINT_MUTATIONS: u32 = 1000;

/// Configuration for a table.
#[derive(Clone, Debug)]
pub struct TableConfig {
    pub(crate) files: TableFiles,
    pub(crate) capacity: u32,
    pub(crate) key_size: u16,
    pub(crate) value_size: u16,
    pub(crate) write: bool,
    pub(crate) create: bool,
    pub(crate) truncate: bool,
    pub(crate) auto_flush: bool,
    pub(crate) checkpoint_mutations: u32,
    pub(crate) checkpoint_interval: Option<Duration>,
}

impl TableConfig {
    /// Create a new config for a table of capacity slots with fixed key and value sizes.
    pub fn new(files: TableFiles, capacity: u32, key_size: u16, value_size: u16) -> Self {
        Self {
            files,
            capacity,
            key_size,
            value_size,
            write: true,
            create: false,
            truncate: false,
            auto_flush: true,
            checkpoint_mutations: DEFAULT_CHECKPOINT_MUTATIONS,
            checkpoint_interval: None,
        }
    }

    /// Replace the backing files.
    pub fn set_files(mut self, files: TableFiles) -> Self {
        self.files = files;
        self
    }

    /// Backing files for the table.
    pub fn files(&self) -> &TableFiles {
        &self.files
    }

    /// Open the table as read-only.
    pub fn read_only(mut self) -> Self {
        self.write = false;
        self
    }

    /// If the table does not exist then create it, otherwise open existing.
    /// File must be writable in order to create it if missing (option ignored if read-only).
    pub fn create(mut self) -> Self {
        self.create = true;
        self
    }

    /// If the table exists then truncate it on open, requires write mode (option ignored if
    /// read-only).
    /// This will rebuild the table with new parameters instead of validating the old parameters.
    pub fn truncate(mut self) -> Self {
        self.truncate = true;
        self
    }

    /// Do NOT checkpoint automatically, dirty slots are only written on flush() or commit().
    pub fn no_auto_flush(mut self) -> Self {
        self.auto_flush = false;
        self
    }

    /// Flush after every mutation.  Slow but loses nothing short of an OS crash.
    pub fn flush_every_write(mut self) -> Self {
        self.auto_flush = true;
        self.checkpoint_mutations = 1;
        self
    }

    /// Flush after this many mutations (0 disables the count trigger).
    pub fn set_checkpoint_mutations(mut self, mutations: u32) -> Self {
        self.checkpoint_mutations = mutations;
        self
    }

    /// Flush on the first mutation after interval has passed since the last flush.
    pub fn set_checkpoint_interval(mut self, interval: Duration) -> Self {
        self.checkpoint_interval = Some(interval);
        self
    }

    /// Number of slots.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Bytes in each key.
    pub fn key_size(&self) -> u16 {
        self.key_size
    }

    /// Bytes in each value.
    pub fn value_size(&self) -> u16 {
        self.value_size
    }

    /// Is this config for a writable table?
    pub fn is_write(&self) -> bool {
        self.write
    }

    /// Make sure the parameters describe a usable table.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.key_size == 0 {
            return Err(ConfigError::ZeroKeySize);
        }
        if self.value_size == 0 {
            return Err(ConfigError::ZeroValueSize);
        }
        Ok(())
    }

    /// Consumes the config and builds a table.
    pub fn build<S>(self) -> Result<HashTable<S>, OpenError>
    where
        S: BuildHasher + Default,
    {
        HashTable::open(self)
    }
}
