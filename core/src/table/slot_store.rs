//! The slot region: a contiguous array of fixed size slot records held in memory with the same
//! layout it has on disk.  Each record is `status ∥ key ∥ value`.

use crate::error::OpenError;
use std::collections::BTreeSet;
use std::io;
use std::io::{Read, Seek, SeekFrom, Write};

/// If at least 1/FULL_WRITE_DIVISOR of the slots are dirty write the whole region in one go.
const FULL_WRITE_DIVISOR: usize = 4;

/// State of a slot.  The discriminant is the status byte on disk.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum SlotStatus {
    /// Never written.  Ends every probe walk that reaches it.
    Empty = 0,
    /// Holds a live key and value.
    Used = 1,
    /// Tombstone.  Keeps its key bytes but is never matched or reused.
    Deleted = 2,
}

impl SlotStatus {
    /// Decode a status byte, None if it is not a valid status.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Empty),
            1 => Some(Self::Used),
            2 => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// Read only view of one slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SlotView<'a> {
    /// Index of the slot.
    pub index: u32,
    /// Status of the slot.
    pub status: SlotStatus,
    /// Key bytes, all zero for an Empty slot.
    pub key: &'a [u8],
    /// Value bytes, only meaningful for a Used slot.
    pub value: &'a [u8],
}

#[derive(Debug)]
pub(crate) struct SlotStore {
    region: Vec<u8>,
    capacity: u32,
    key_size: usize,
    value_size: usize,
    // Ordered so flushes write front to back and contiguous runs are easy to find.
    dirty: BTreeSet<u32>,
}

impl SlotStore {
    /// A region of capacity Empty slots.
    pub fn new_empty(capacity: u32, key_size: u16, value_size: u16) -> Self {
        let slot_size = 1 + key_size as usize + value_size as usize;
        Self {
            region: vec![0_u8; capacity as usize * slot_size],
            capacity,
            key_size: key_size as usize,
            value_size: value_size as usize,
            dirty: BTreeSet::new(),
        }
    }

    /// Read a full slot region from source's current position.
    pub fn load<R: Read>(
        source: &mut R,
        capacity: u32,
        key_size: u16,
        value_size: u16,
    ) -> Result<Self, io::Error> {
        let mut store = Self::new_empty(capacity, key_size, value_size);
        source.read_exact(&mut store.region[..])?;
        Ok(store)
    }

    /// Verify every status byte and return the (used, deleted) counts.
    pub fn count_statuses(&self) -> Result<(u64, u64), OpenError> {
        let mut used = 0;
        let mut deleted = 0;
        for index in 0..self.capacity {
            let status = self.region[self.offset(index)];
            match SlotStatus::from_byte(status) {
                Some(SlotStatus::Empty) => {}
                Some(SlotStatus::Used) => used += 1,
                Some(SlotStatus::Deleted) => deleted += 1,
                None => return Err(OpenError::CorruptSlot { index, status }),
            }
        }
        Ok((used, deleted))
    }

    /// Bytes in one slot.
    pub fn slot_size(&self) -> usize {
        1 + self.key_size + self.value_size
    }

    #[inline]
    fn offset(&self, index: u32) -> usize {
        index as usize * self.slot_size()
    }

    /// Status of slot index.
    pub fn status(&self, index: u32) -> SlotStatus {
        // Status bytes are checked on load and only ever written from a SlotStatus.
        SlotStatus::from_byte(self.region[self.offset(index)]).unwrap_or(SlotStatus::Empty)
    }

    /// Key bytes of slot index.
    pub fn key(&self, index: u32) -> &[u8] {
        let start = self.offset(index) + 1;
        &self.region[start..start + self.key_size]
    }

    /// Value bytes of slot index.
    pub fn value(&self, index: u32) -> &[u8] {
        let start = self.offset(index) + 1 + self.key_size;
        &self.region[start..start + self.value_size]
    }

    /// View of slot index, None if out of range.
    pub fn view(&self, index: u32) -> Option<SlotView<'_>> {
        if index >= self.capacity {
            return None;
        }
        Some(SlotView {
            index,
            status: self.status(index),
            key: self.key(index),
            value: self.value(index),
        })
    }

    /// Number of slots.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Turn slot index into a Used slot holding key and value.
    pub fn write_used(&mut self, index: u32, key: &[u8], value: &[u8]) {
        let start = self.offset(index);
        self.region[start] = SlotStatus::Used as u8;
        self.region[start + 1..start + 1 + self.key_size].copy_from_slice(key);
        self.set_value(index, value);
    }

    /// Replace the value of slot index, key and status are untouched.
    pub fn set_value(&mut self, index: u32, value: &[u8]) {
        let start = self.offset(index) + 1 + self.key_size;
        self.region[start..start + self.value_size].copy_from_slice(value);
        self.dirty.insert(index);
    }

    /// Turn slot index into a tombstone.
    pub fn mark_deleted(&mut self, index: u32) {
        let start = self.offset(index);
        self.region[start] = SlotStatus::Deleted as u8;
        self.dirty.insert(index);
    }

    /// Number of slots changed since the last write_dirty().
    #[cfg(test)]
    pub fn dirty_len(&self) -> usize {
        self.dirty.len()
    }

    /// Write the whole region to sync at its current position.
    pub fn write_region<W: Write>(&self, sync: &mut W) -> Result<(), io::Error> {
        sync.write_all(&self.region[..])
    }

    /// Write dirty slots into sync where the region begins at region_start.
    /// Whole slots are always written, runs of adjacent dirty slots go out in one write.
    /// Dirty state is only cleared once everything is written.  Returns the slots written.
    pub fn write_dirty<W: Write + Seek>(
        &mut self,
        sync: &mut W,
        region_start: u64,
    ) -> Result<usize, io::Error> {
        let dirty = self.dirty.len();
        if dirty == 0 {
            return Ok(0);
        }
        if dirty * FULL_WRITE_DIVISOR >= self.capacity as usize {
            sync.seek(SeekFrom::Start(region_start))?;
            self.write_region(sync)?;
        } else {
            let mut run: Option<(u32, u32)> = None;
            for &index in &self.dirty {
                run = match run {
                    Some((first, last)) if last + 1 == index => Some((first, index)),
                    Some((first, last)) => {
                        self.write_run(sync, region_start, first, last)?;
                        Some((index, index))
                    }
                    None => Some((index, index)),
                };
            }
            if let Some((first, last)) = run {
                self.write_run(sync, region_start, first, last)?;
            }
        }
        self.dirty.clear();
        Ok(dirty)
    }

    fn write_run<W: Write + Seek>(
        &self,
        sync: &mut W,
        region_start: u64,
        first: u32,
        last: u32,
    ) -> Result<(), io::Error> {
        let start = self.offset(first);
        let end = self.offset(last) + self.slot_size();
        sync.seek(SeekFrom::Start(region_start + start as u64))?;
        sync.write_all(&self.region[start..end])
    }
}
