//! Iterator over the live entries of a table in slot order.

use crate::table::slot_store::{SlotStatus, SlotStore};

/// A live (Used) entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Entry<'a> {
    /// Slot index holding the entry.
    pub index: u32,
    /// Key bytes.
    pub key: &'a [u8],
    /// Value bytes.
    pub value: &'a [u8],
}

/// Iterates over the Used slots, skipping Empty slots and tombstones.
pub struct SlotIter<'a> {
    slots: &'a SlotStore,
    next: u32,
}

impl<'a> SlotIter<'a> {
    pub(crate) fn new(slots: &'a SlotStore) -> Self {
        Self { slots, next: 0 }
    }
}

impl<'a> Iterator for SlotIter<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.slots.capacity() {
            let index = self.next;
            self.next += 1;
            if self.slots.status(index) == SlotStatus::Used {
                return Some(Entry {
                    index,
                    key: self.slots.key(index),
                    value: self.slots.value(index),
                });
            }
        }
        None
    }
}
