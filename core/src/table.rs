//! Main module for the seendb core.  This implements the sync single threaded hash table.
//!
//! A table is a fixed number of slots, each `status ∥ key ∥ value` with fixed key and value
//! sizes.  Collisions are resolved with linear probing.  Deleted slots become permanent
//! tombstones: they are skipped by lookups and are never reused by inserts, so a delete heavy
//! workload slowly eats the capacity available to new keys (see [`HashTable::empty_slots`]).
//! There is no resizing, a table that fills up has to be replaced by the caller.

use crate::error::flush::FlushError;
use crate::error::insert::{DeleteError, InsertError};
use crate::error::{CommitError, ConfigError, FetchError, OpenError};
use crate::hasher::Mur3BuildHasher;
use crate::table::checkpoint::{CheckpointPolicy, Checkpointer};
use crate::table::header::{TableHeader, HEADER_SIZE};
use crate::table::probe::{hash_bytes, ProbeSequence};
use crate::table::slot_iter::SlotIter;
use crate::table::slot_store::{SlotStatus, SlotStore, SlotView};
use crate::table_config::TableConfig;
use crate::table_files::TableFiles;
use log::{debug, info, warn};
use std::fs;
use std::fs::{File, OpenOptions};
use std::hash::BuildHasher;
use std::io::{Seek, SeekFrom};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod checkpoint;
pub mod header;
pub mod probe;
pub mod slot_iter;
pub mod slot_store;

/// What a lookup should return for a found key.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LookupMode {
    /// The stored value.
    Value,
    /// The slot index the key was found at.
    ProbeIndex,
    /// Both the slot index and value.
    Both,
}

/// Result of a successful lookup, shape depends on the LookupMode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The stored value.
    Value(&'a [u8]),
    /// The slot index holding the key.
    ProbeIndex(u32),
    /// Slot index and value.
    Both {
        /// The slot index holding the key.
        index: u32,
        /// The stored value.
        value: &'a [u8],
    },
}

/// Outcome of walking a key's probe sequence.
enum Probe {
    /// Key is in this slot.
    Found(u32),
    /// Hit this Empty slot first, key is absent and would be placed here.
    Vacant(u32),
    /// Walked every slot without a match or an Empty slot.
    Exhausted,
}

/// A fixed capacity hash table persisted to a single file.
/// All slots live in memory, changes are written back on checkpoints (see [`TableConfig`]),
/// on flush()/commit() and when the table is dropped.
pub struct HashTable<S = Mur3BuildHasher>
where
    S: BuildHasher + Default,
{
    header: TableHeader,
    slots: SlotStore,
    table_file: File,
    hasher: S,
    used: u64,
    deleted: u64,
    checkpoints: Checkpointer,
    config: TableConfig,
}

impl<S> Drop for HashTable<S>
where
    S: BuildHasher + Default,
{
    fn drop(&mut self) {
        if self.config.write {
            if let Err(err) = self.commit() {
                warn!(
                    "failed to commit table {} on drop: {}",
                    self.config.files.path().display(),
                    err
                );
            }
        }
    }
}

impl<S> HashTable<S>
where
    S: BuildHasher + Default,
{
    /// Open an existing table at path, checking it has the given parameters, or create it.
    pub fn open_or_create<P: Into<PathBuf>>(
        path: P,
        capacity: u32,
        key_size: u16,
        value_size: u16,
    ) -> Result<Self, OpenError> {
        let config = TableConfig::new(TableFiles::with_path(path), capacity, key_size, value_size)
            .create();
        Self::open(config)
    }

    /// Open a new or reopen an existing table.
    pub fn open(config: TableConfig) -> Result<Self, OpenError> {
        config.validate()?;
        let path = config.files.path();
        let create = config.create && config.write;
        if create {
            fs::create_dir_all(config.files.parent_dir())?;
        }
        let mut table_file = OpenOptions::new()
            .read(true)
            .write(config.write)
            .create(create)
            .truncate(config.truncate && config.write)
            .open(&path)?;
        let file_end = table_file.seek(SeekFrom::End(0))?;
        let hasher = S::default();

        let (header, slots, used, deleted) = if file_end == 0 && config.write {
            let salt = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0x5eed_5a17);
            let pepper = hash_bytes(&hasher, &salt.to_le_bytes());
            let header = TableHeader::new(&config, salt, pepper);
            let slots = SlotStore::new_empty(config.capacity, config.key_size, config.value_size);
            header.write_header(&mut table_file)?;
            slots.write_region(&mut table_file)?;
            info!(
                "created table {} with {} slots, key size {}, value size {}",
                path.display(),
                config.capacity,
                config.key_size,
                config.value_size
            );
            (header, slots, 0, 0)
        } else {
            let header = TableHeader::load_header(&mut table_file)?;
            Self::check_header(&header, &config, &hasher)?;
            let found = file_end.saturating_sub(HEADER_SIZE as u64);
            if found != header.region_len() {
                return Err(OpenError::RegionLength {
                    expected: header.region_len(),
                    found,
                });
            }
            let slots = SlotStore::load(
                &mut table_file,
                header.capacity(),
                header.key_size(),
                header.value_size(),
            )?;
            let (used, deleted) = slots.count_statuses()?;
            if used != header.used() || deleted != header.deleted() {
                // Slots made it to disk but the header did not, the slots are the truth.
                warn!(
                    "table {} header counts ({}, {}) do not match slots ({}, {}), using slots",
                    path.display(),
                    header.used(),
                    header.deleted(),
                    used,
                    deleted
                );
            }
            debug!(
                "opened table {}, {} used, {} deleted of {} slots",
                path.display(),
                used,
                deleted,
                header.capacity()
            );
            (header, slots, used, deleted)
        };
        Ok(Self {
            header,
            slots,
            table_file,
            hasher,
            used,
            deleted,
            checkpoints: Checkpointer::new(CheckpointPolicy::from_config(&config)),
            config,
        })
    }

    /// Make sure an existing header agrees with the config and the hasher.
    fn check_header(
        header: &TableHeader,
        config: &TableConfig,
        hasher: &S,
    ) -> Result<(), ConfigError> {
        if header.capacity() != config.capacity {
            return Err(ConfigError::CapacityMismatch {
                expected: config.capacity,
                found: header.capacity(),
            });
        }
        if header.key_size() != config.key_size {
            return Err(ConfigError::KeySizeMismatch {
                expected: config.key_size,
                found: header.key_size(),
            });
        }
        if header.value_size() != config.value_size {
            return Err(ConfigError::ValueSizeMismatch {
                expected: config.value_size,
                found: header.value_size(),
            });
        }
        // A different (or unstable) hasher would scatter keys to different home slots.
        if hash_bytes(hasher, &header.salt().to_le_bytes()) != header.pepper() {
            return Err(ConfigError::HasherMismatch);
        }
        Ok(())
    }

    fn check_key(&self, key: &[u8]) -> Result<(), FetchError> {
        if key.len() != self.key_size() {
            return Err(FetchError::InvalidKeyLength {
                expected: self.key_size(),
                found: key.len(),
            });
        }
        Ok(())
    }

    /// Walk the probe sequence for key.  Stops at the first Empty slot, nothing for this key can
    /// live past one since inserts never skip an Empty slot and slots never become Empty again.
    fn find(&self, key: &[u8]) -> Probe {
        for index in ProbeSequence::for_key(&self.hasher, key, self.header.capacity()) {
            match self.slots.status(index) {
                SlotStatus::Empty => return Probe::Vacant(index),
                SlotStatus::Used if self.slots.key(index) == key => return Probe::Found(index),
                SlotStatus::Used | SlotStatus::Deleted => {}
            }
        }
        Probe::Exhausted
    }

    /// Insert key with value, or overwrite the value if key is already present (in which case
    /// it keeps its slot).
    /// Returns false if the key's probe sequence has no room: every slot is Used by another key
    /// or is a tombstone.  This can happen before the table is_full().
    /// If a checkpoint flush triggered by this insert fails the error is returned but the entry
    /// is already in the table (lookups will see it), retrying the insert just overwrites it.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<bool, InsertError> {
        if !self.config.write {
            return Err(InsertError::ReadOnly);
        }
        self.check_key(key)?;
        if value.len() != self.value_size() {
            return Err(InsertError::InvalidValueLength {
                expected: self.value_size(),
                found: value.len(),
            });
        }
        match self.find(key) {
            Probe::Found(index) => self.slots.set_value(index, value),
            Probe::Vacant(index) => {
                self.slots.write_used(index, key, value);
                self.used += 1;
            }
            Probe::Exhausted => {
                debug!(
                    "no free slot for key {:?} in {} ({} used, {} deleted)",
                    key,
                    self.config.files.path().display(),
                    self.used,
                    self.deleted
                );
                return Ok(false);
            }
        }
        self.mutated()?;
        Ok(true)
    }

    /// Look key up, returning what mode asks for or None if the key is not present.
    pub fn lookup_with(
        &self,
        key: &[u8],
        mode: LookupMode,
    ) -> Result<Option<Lookup<'_>>, FetchError> {
        self.check_key(key)?;
        Ok(match self.find(key) {
            Probe::Found(index) => Some(match mode {
                LookupMode::Value => Lookup::Value(self.slots.value(index)),
                LookupMode::ProbeIndex => Lookup::ProbeIndex(index),
                LookupMode::Both => Lookup::Both {
                    index,
                    value: self.slots.value(index),
                },
            }),
            Probe::Vacant(_) | Probe::Exhausted => None,
        })
    }

    /// Fetch the value stored for key.
    pub fn get(&self, key: &[u8]) -> Result<Option<&[u8]>, FetchError> {
        self.check_key(key)?;
        Ok(match self.find(key) {
            Probe::Found(index) => Some(self.slots.value(index)),
            Probe::Vacant(_) | Probe::Exhausted => None,
        })
    }

    /// Slot index holding key.
    pub fn probe_index(&self, key: &[u8]) -> Result<Option<u32>, FetchError> {
        self.check_key(key)?;
        Ok(match self.find(key) {
            Probe::Found(index) => Some(index),
            Probe::Vacant(_) | Probe::Exhausted => None,
        })
    }

    /// True if the table contains key.
    pub fn contains_key(&self, key: &[u8]) -> Result<bool, FetchError> {
        Ok(self.probe_index(key)?.is_some())
    }

    /// The order slots would be visited for key.
    pub fn probe_sequence(&self, key: &[u8]) -> Result<ProbeSequence, FetchError> {
        self.check_key(key)?;
        Ok(ProbeSequence::for_key(&self.hasher, key, self.header.capacity()))
    }

    /// Delete key, leaving a tombstone in its slot.  Returns false if key was not present.
    /// If a checkpoint flush triggered by this delete fails the error is returned but the key is
    /// already deleted in memory, a retry will return false.
    pub fn delete(&mut self, key: &[u8]) -> Result<bool, DeleteError> {
        if !self.config.write {
            return Err(DeleteError::ReadOnly);
        }
        self.check_key(key)?;
        match self.find(key) {
            Probe::Found(index) => {
                self.slots.mark_deleted(index);
                self.used -= 1;
                self.deleted += 1;
                self.mutated()?;
                Ok(true)
            }
            Probe::Vacant(_) | Probe::Exhausted => Ok(false),
        }
    }

    /// Record a mutation, flushing if the checkpoint policy says so.
    fn mutated(&mut self) -> Result<(), FlushError> {
        if self.checkpoints.note_mutation() {
            self.flush()?;
        }
        Ok(())
    }

    /// True when every slot holds a live entry.
    pub fn is_full(&self) -> bool {
        self.used >= self.header.capacity() as u64
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.used as usize
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Number of tombstones.
    pub fn tombstones(&self) -> usize {
        self.deleted as usize
    }

    /// Slots never written.  Once this hits zero no new key can be inserted, whatever len() is.
    pub fn empty_slots(&self) -> usize {
        self.header.capacity() as usize - self.len() - self.tombstones()
    }

    /// Number of slots.
    pub fn capacity(&self) -> u32 {
        self.header.capacity()
    }

    /// Bytes in each key.
    pub fn key_size(&self) -> usize {
        self.header.key_size() as usize
    }

    /// Bytes in each value.
    pub fn value_size(&self) -> usize {
        self.header.value_size() as usize
    }

    /// Raw view of the slot at index, None if index is out of range.
    pub fn slot(&self, index: u32) -> Option<SlotView<'_>> {
        self.slots.view(index)
    }

    /// Iterate over the live entries in slot order.
    pub fn iter(&self) -> SlotIter<'_> {
        SlotIter::new(&self.slots)
    }

    /// Backing files for this table.
    pub fn files(&self) -> &TableFiles {
        &self.config.files
    }

    /// Mutations not yet flushed.
    pub fn pending_mutations(&self) -> u32 {
        self.checkpoints.pending()
    }

    /// Write dirty slots and the header to the table file.
    /// Note this is only a flush not a commit, it does not do a sync on the file.
    pub fn flush(&mut self) -> Result<(), FlushError> {
        if !self.config.write {
            return Ok(());
        }
        let written = self
            .slots
            .write_dirty(&mut self.table_file, HEADER_SIZE as u64)
            .map_err(FlushError::WriteSlots)?;
        if written > 0 || self.header.used() != self.used || self.header.deleted() != self.deleted
        {
            self.header.set_counts(self.used, self.deleted);
            self.header
                .write_header(&mut self.table_file)
                .map_err(FlushError::WriteHeader)?;
            debug!(
                "flushed {} slots to {}",
                written,
                self.config.files.path().display()
            );
        }
        self.checkpoints.flushed();
        Ok(())
    }

    /// Flush and sync the table file.
    /// All data should be safely on disk if this call succeeds.
    /// Note this is a very expensive call (syncing to disk is not cheap).
    pub fn commit(&mut self) -> Result<(), CommitError> {
        if !self.config.write {
            return Err(CommitError::ReadOnly);
        }
        self.flush()?;
        self.table_file.sync_all().map_err(CommitError::Sync)?;
        debug!("committed {}", self.config.files.path().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadHeaderError;
    use crate::hasher::KeyIntBuildHasher;
    use crate::pack::{hash_key, pack_u32, unpack_u32};
    use std::io::Write;
    use std::time;
    use tempfile::TempDir;

    type IntTable = HashTable<KeyIntBuildHasher>;

    fn config(
        dir: &TempDir,
        name: &str,
        capacity: u32,
        key_size: u16,
        value_size: u16,
    ) -> TableConfig {
        TableConfig::new(
            TableFiles::with_dir(dir.path(), name),
            capacity,
            key_size,
            value_size,
        )
        .create()
    }

    fn int_key(i: u64) -> [u8; 8] {
        i.to_be_bytes()
    }

    #[test]
    fn test_hi_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let mut table: HashTable = config(&dir, "hi", 10, 8, 1).build().unwrap();
        for i in 0..10 {
            let key = hash_key(format!("hi{i}").as_bytes(), 8);
            let value = format!("{i}");
            assert!(table.insert(&key, value.as_bytes()).unwrap(), "insert hi{i}");
        }
        assert!(table.is_full());
        let hi11 = hash_key(b"hi11", 8);
        assert!(!table.insert(&hi11, b"a").unwrap());
        assert_eq!(table.len(), 10);
        for i in 0..10 {
            let key = hash_key(format!("hi{i}").as_bytes(), 8);
            assert_eq!(table.get(&key).unwrap(), Some(format!("{i}").as_bytes()));
        }
        assert_eq!(table.get(&hi11).unwrap(), None);

        for i in 0..10 {
            let key = hash_key(format!("hi{i}").as_bytes(), 8);
            assert!(table.delete(&key).unwrap());
        }
        for i in 0..10 {
            let key = hash_key(format!("hi{i}").as_bytes(), 8);
            assert_eq!(table.get(&key).unwrap(), None);
            assert!(!table.delete(&key).unwrap());
        }
        assert_eq!(table.get(&hi11).unwrap(), None);
        assert!(table.is_empty());
        assert!(!table.is_full());
        // Every slot is a tombstone now so nothing fits.
        assert_eq!(table.tombstones(), 10);
        assert_eq!(table.empty_slots(), 0);
        assert!(!table.insert(&hi11, b"a").unwrap());
    }

    #[test]
    fn test_overwrite_keeps_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut table: IntTable = config(&dir, "overwrite", 10, 8, 1).build().unwrap();
        assert!(table.insert(&int_key(3), b"a").unwrap());
        assert!(table.insert(&int_key(13), b"b").unwrap());
        let index = table.probe_index(&int_key(13)).unwrap().unwrap();
        assert_eq!(index, 4);
        assert!(table.insert(&int_key(13), b"c").unwrap());
        assert_eq!(table.probe_index(&int_key(13)).unwrap(), Some(index));
        assert_eq!(table.get(&int_key(13)).unwrap(), Some(&b"c"[..]));
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.lookup_with(&int_key(13), LookupMode::Both).unwrap(),
            Some(Lookup::Both {
                index: 4,
                value: &b"c"[..]
            })
        );
        assert_eq!(
            table.lookup_with(&int_key(3), LookupMode::Value).unwrap(),
            Some(Lookup::Value(&b"a"[..]))
        );
        assert_eq!(
            table.lookup_with(&int_key(3), LookupMode::ProbeIndex).unwrap(),
            Some(Lookup::ProbeIndex(3))
        );
        assert_eq!(
            table.lookup_with(&int_key(23), LookupMode::ProbeIndex).unwrap(),
            None
        );
    }

    #[test]
    fn test_retried_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let mut table: IntTable = config(&dir, "retry", 10, 8, 1)
            .flush_every_write()
            .build()
            .unwrap();
        // A mutation that reported a failed flush is already applied, retrying it is harmless.
        assert!(table.insert(&int_key(3), b"a").unwrap());
        assert!(table.insert(&int_key(3), b"a").unwrap());
        assert_eq!(table.len(), 1);
        assert_eq!(table.probe_index(&int_key(3)).unwrap(), Some(3));
        assert_eq!(table.pending_mutations(), 0);
        assert!(table.delete(&int_key(3)).unwrap());
        assert!(!table.delete(&int_key(3)).unwrap());
        assert_eq!(table.tombstones(), 1);
        assert_eq!(table.empty_slots(), 9);
    }

    #[test]
    fn test_delete_does_not_block_chain() {
        let dir = tempfile::tempdir().unwrap();
        let mut table: IntTable = config(&dir, "chain", 10, 8, 1).build().unwrap();
        assert!(table.insert(&int_key(3), b"a").unwrap());
        assert!(table.insert(&int_key(13), b"b").unwrap());
        assert!(table.insert(&int_key(23), b"c").unwrap());
        assert!(table.delete(&int_key(13)).unwrap());
        assert!(!table.contains_key(&int_key(13)).unwrap());
        assert_eq!(table.get(&int_key(23)).unwrap(), Some(&b"c"[..]));
        assert_eq!(table.probe_index(&int_key(23)).unwrap(), Some(5));
        assert_eq!(table.slot(4).unwrap().status, SlotStatus::Deleted);
        assert_eq!(table.len(), 2);
        assert_eq!(table.tombstones(), 1);
    }

    #[test]
    fn test_no_tombstone_reuse() {
        let dir = tempfile::tempdir().unwrap();
        let mut table: IntTable = config(&dir, "tombstones", 10, 8, 1).build().unwrap();
        assert!(table.insert(&int_key(3), b"a").unwrap());
        assert!(table.insert(&int_key(13), b"b").unwrap());
        let first = table.probe_index(&int_key(3)).unwrap().unwrap();
        let second = table.probe_index(&int_key(13)).unwrap().unwrap();
        assert_eq!((first, second), (3, 4));
        assert!(table.delete(&int_key(3)).unwrap());
        assert!(table.delete(&int_key(13)).unwrap());
        assert!(table.insert(&int_key(3), b"x").unwrap());
        let again = table.probe_index(&int_key(3)).unwrap().unwrap();
        assert!(again > first && again > second);
        assert_eq!(again, 5);
        assert_eq!(table.slot(3).unwrap().status, SlotStatus::Deleted);
        assert_eq!(table.slot(4).unwrap().status, SlotStatus::Deleted);
        assert_eq!(table.empty_slots(), 7);
    }

    #[test]
    fn test_chain_wraps_and_fills() {
        let dir = tempfile::tempdir().unwrap();
        let mut table: IntTable = config(&dir, "wrap", 4, 8, 2).build().unwrap();
        // All of these want slot 3.
        for (i, key) in [3_u64, 7, 11, 15].iter().enumerate() {
            assert!(table.insert(&int_key(*key), &[i as u8, 0]).unwrap());
        }
        assert_eq!(table.probe_index(&int_key(7)).unwrap(), Some(0));
        assert_eq!(table.probe_index(&int_key(15)).unwrap(), Some(2));
        assert!(!table.insert(&int_key(19), &[9, 9]).unwrap());
        // Overwrite still works on a full table.
        assert!(table.insert(&int_key(11), &[7, 7]).unwrap());
        assert_eq!(table.get(&int_key(11)).unwrap(), Some(&[7_u8, 7][..]));
        let indexes: Vec<u32> = table.iter().map(|e| e.index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
        let seq: Vec<u32> = table.probe_sequence(&int_key(19)).unwrap().collect();
        assert_eq!(seq, vec![3, 0, 1, 2]);
    }

    #[test]
    fn test_invalid_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let mut table: HashTable = config(&dir, "lengths", 10, 8, 1).build().unwrap();
        assert!(matches!(
            table.insert(&[1; 7], b"a"),
            Err(InsertError::InvalidKeyLength {
                expected: 8,
                found: 7
            })
        ));
        assert!(matches!(
            table.insert(&[1; 8], b"ab"),
            Err(InsertError::InvalidValueLength {
                expected: 1,
                found: 2
            })
        ));
        assert_eq!(
            table.get(&[1; 9]),
            Err(FetchError::InvalidKeyLength {
                expected: 8,
                found: 9
            })
        );
        assert!(matches!(
            table.delete(&[]),
            Err(DeleteError::InvalidKeyLength {
                expected: 8,
                found: 0
            })
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn test_zero_config() {
        let dir = tempfile::tempdir().unwrap();
        let res: Result<HashTable, OpenError> = config(&dir, "zero", 0, 8, 1).build();
        assert!(matches!(
            res,
            Err(OpenError::InvalidConfig(ConfigError::ZeroCapacity))
        ));
        let res: Result<HashTable, OpenError> = config(&dir, "zero", 10, 8, 0).build();
        assert!(matches!(
            res,
            Err(OpenError::InvalidConfig(ConfigError::ZeroValueSize))
        ));
        assert!(!dir.path().join("zero.sdb").exists());
    }

    #[test]
    fn test_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let mut indexes = Vec::new();
        {
            let mut table: HashTable = config(&dir, "persist", 64, 8, 4).build().unwrap();
            for i in 0..40_u32 {
                let key = hash_key(format!("http://site{i}.example/").as_bytes(), 8);
                assert!(table.insert(&key, &pack_u32(i)).unwrap());
                indexes.push(table.probe_index(&key).unwrap().unwrap());
            }
            for i in 0..5_u32 {
                let key = hash_key(format!("http://site{i}.example/").as_bytes(), 8);
                assert!(table.delete(&key).unwrap());
            }
            table.commit().unwrap();
        }
        let table: HashTable = config(&dir, "persist", 64, 8, 4).build().unwrap();
        assert_eq!(table.len(), 35);
        assert_eq!(table.tombstones(), 5);
        for i in 0..40_u32 {
            let key = hash_key(format!("http://site{i}.example/").as_bytes(), 8);
            if i < 5 {
                assert_eq!(table.get(&key).unwrap(), None);
                assert_eq!(
                    table.slot(indexes[i as usize]).unwrap().status,
                    SlotStatus::Deleted
                );
            } else {
                let value = table.get(&key).unwrap().unwrap();
                assert_eq!(unpack_u32(value).unwrap(), i);
                assert_eq!(table.probe_index(&key).unwrap(), Some(indexes[i as usize]));
            }
        }
    }

    #[test]
    fn test_open_or_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("seen.tbl");
        {
            let mut table: HashTable = HashTable::open_or_create(&path, 10, 8, 1).unwrap();
            assert!(table.insert(&[7; 8], b"z").unwrap());
        }
        let table: HashTable = HashTable::open_or_create(&path, 10, 8, 1).unwrap();
        assert_eq!(table.get(&[7; 8]).unwrap(), Some(&b"z"[..]));
        assert_eq!(table.files().name(), "seen");
    }

    #[test]
    fn test_mismatched_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let _table: HashTable = config(&dir, "mismatch", 10, 8, 1).build().unwrap();
        }
        let res: Result<HashTable, OpenError> = config(&dir, "mismatch", 11, 8, 1).build();
        assert!(matches!(
            res,
            Err(OpenError::InvalidConfig(ConfigError::CapacityMismatch {
                expected: 11,
                found: 10
            }))
        ));
        let res: Result<HashTable, OpenError> = config(&dir, "mismatch", 10, 4, 1).build();
        assert!(matches!(
            res,
            Err(OpenError::InvalidConfig(ConfigError::KeySizeMismatch {
                expected: 4,
                found: 8
            }))
        ));
        let res: Result<HashTable, OpenError> = config(&dir, "mismatch", 10, 8, 2).build();
        assert!(matches!(
            res,
            Err(OpenError::InvalidConfig(ConfigError::ValueSizeMismatch {
                expected: 2,
                found: 1
            }))
        ));
        let res: Result<IntTable, OpenError> = config(&dir, "mismatch", 10, 8, 1).build();
        assert!(matches!(
            res,
            Err(OpenError::InvalidConfig(ConfigError::HasherMismatch))
        ));
        // Truncate rebuilds with the new parameters.
        let table: HashTable = config(&dir, "mismatch", 11, 8, 1).truncate().build().unwrap();
        assert_eq!(table.capacity(), 11);
    }

    #[test]
    fn test_read_only() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut table: HashTable = config(&dir, "ro", 10, 8, 1).build().unwrap();
            assert!(table.insert(&[1; 8], b"1").unwrap());
        }
        let mut table: HashTable = config(&dir, "ro", 10, 8, 1).read_only().build().unwrap();
        assert_eq!(table.get(&[1; 8]).unwrap(), Some(&b"1"[..]));
        assert!(matches!(table.insert(&[2; 8], b"2"), Err(InsertError::ReadOnly)));
        assert!(matches!(table.delete(&[1; 8]), Err(DeleteError::ReadOnly)));
        assert!(matches!(table.commit(), Err(CommitError::ReadOnly)));
        assert!(table.flush().is_ok());

        let res: Result<HashTable, OpenError> =
            config(&dir, "missing", 10, 8, 1).read_only().build();
        assert!(matches!(res, Err(OpenError::IO(_))));
    }

    #[test]
    fn test_checkpoint_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let mut table: HashTable = config(&dir, "checkpoint", 10, 8, 1)
            .set_checkpoint_mutations(3)
            .build()
            .unwrap();
        let reader = || -> HashTable {
            config(&dir, "checkpoint", 10, 8, 1).read_only().build().unwrap()
        };
        assert!(table.insert(&[1; 8], b"1").unwrap());
        assert!(table.insert(&[2; 8], b"2").unwrap());
        assert_eq!(table.pending_mutations(), 2);
        assert_eq!(reader().len(), 0);
        assert!(table.insert(&[3; 8], b"3").unwrap());
        assert_eq!(table.pending_mutations(), 0);
        let on_disk = reader();
        assert_eq!(on_disk.len(), 3);
        assert_eq!(on_disk.get(&[2; 8]).unwrap(), Some(&b"2"[..]));
        // A failed insert is not a mutation.
        for i in 4..30_u8 {
            table.insert(&[i; 8], b"x").unwrap();
        }
        assert_eq!(table.len(), 10);
        assert_eq!(reader().len(), 9);
    }

    #[test]
    fn test_lost_since_last_flush() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut table: HashTable = config(&dir, "crash", 10, 8, 1)
                .no_auto_flush()
                .build()
                .unwrap();
            assert!(table.insert(&[1; 8], b"1").unwrap());
            table.flush().unwrap();
            assert!(table.insert(&[2; 8], b"2").unwrap());
            // Simulate a crash, no drop so no commit.
            std::mem::forget(table);
        }
        let table: HashTable = config(&dir, "crash", 10, 8, 1).build().unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.contains_key(&[1; 8]).unwrap());
        assert!(!table.contains_key(&[2; 8]).unwrap());
    }

    #[test]
    fn test_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let mut table: HashTable = config(&dir, "corrupt", 10, 8, 1).build().unwrap();
            assert!(table.insert(&[1; 8], b"1").unwrap());
            table.files().path()
        };
        {
            let mut file = OpenOptions::new().write(true).open(&path).unwrap();
            file.seek(SeekFrom::Start((HEADER_SIZE + 2 * 10) as u64))
                .unwrap();
            file.write_all(&[9]).unwrap();
        }
        let res: Result<HashTable, OpenError> = config(&dir, "corrupt", 10, 8, 1).build();
        assert!(matches!(
            res,
            Err(OpenError::CorruptSlot {
                index: 2,
                status: 9
            })
        ));

        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len((HEADER_SIZE + 50) as u64).unwrap();
        let res: Result<HashTable, OpenError> = config(&dir, "corrupt", 10, 8, 1).build();
        assert!(matches!(
            res,
            Err(OpenError::RegionLength {
                expected: 100,
                found: 50
            })
        ));

        fs::write(&path, [0_u8; HEADER_SIZE + 100]).unwrap();
        let res: Result<HashTable, OpenError> = config(&dir, "corrupt", 10, 8, 1).build();
        assert!(matches!(
            res,
            Err(OpenError::Header(LoadHeaderError::InvalidType))
        ));
    }

    #[test]
    fn test_bulk() {
        let dir = tempfile::tempdir().unwrap();
        let mut table: HashTable = config(&dir, "bulk", 100_000, 8, 4)
            .set_checkpoint_mutations(10_000)
            .build()
            .unwrap();
        let keys: Vec<Vec<u8>> = (0..50_000)
            .map(|i| hash_key(format!("http://www.example.com/page/{i}").as_bytes(), 8))
            .collect();
        let start = time::Instant::now();
        for (i, key) in keys.iter().enumerate() {
            assert!(table.insert(key, &pack_u32(i as u32)).unwrap());
        }
        println!("insert time {}", start.elapsed().as_secs_f64());
        assert_eq!(table.len(), 50_000);

        let start = time::Instant::now();
        for (i, key) in keys.iter().enumerate() {
            let value = table.get(key).unwrap();
            assert!(value.is_some(), "Failed on item {}", i);
            assert_eq!(unpack_u32(value.unwrap()).unwrap(), i as u32);
        }
        println!("lookup time {}", start.elapsed().as_secs_f64());

        let start = time::Instant::now();
        table.commit().unwrap();
        println!("commit time {}", start.elapsed().as_secs_f64());

        let start = time::Instant::now();
        for key in &keys {
            assert!(table.delete(key).unwrap());
        }
        println!("delete time {}", start.elapsed().as_secs_f64());
        for key in &keys {
            assert!(!table.contains_key(key).unwrap());
        }
        let other = hash_key(b"http://www.example.com/never", 8);
        assert!(!table.contains_key(&other).unwrap());
        assert!(table.is_empty());
        assert_eq!(table.tombstones(), 50_000);
        assert_eq!(table.empty_slots(), 50_000);
    }
}
