//! Home slot calculation and the linear probe order used by every table operation.

use std::hash::{BuildHasher, Hasher};

/// Hash bytes with a fresh hasher from build.
pub(crate) fn hash_bytes<S: BuildHasher>(build: &S, bytes: &[u8]) -> u64 {
    let mut hasher = build.build_hasher();
    hasher.write(bytes);
    hasher.finish()
}

/// Home slot for key in a table of capacity slots.
pub fn home_index<S: BuildHasher>(build: &S, key: &[u8], capacity: u32) -> u32 {
    (hash_bytes(build, key) % capacity as u64) as u32
}

/// Iterator over slot indices starting at a home slot and wrapping around, visiting each of
/// the capacity slots exactly once.
#[derive(Debug, Clone)]
pub struct ProbeSequence {
    next: u32,
    capacity: u32,
    remaining: u32,
}

impl ProbeSequence {
    /// Probe sequence for a table with capacity slots starting at home.
    pub fn new(home: u32, capacity: u32) -> Self {
        Self {
            next: home,
            capacity,
            remaining: capacity,
        }
    }

    /// Probe sequence for key.
    pub fn for_key<S: BuildHasher>(build: &S, key: &[u8], capacity: u32) -> Self {
        Self::new(home_index(build, key, capacity), capacity)
    }
}

impl Iterator for ProbeSequence {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.next;
        self.remaining -= 1;
        self.next = if index + 1 == self.capacity {
            0
        } else {
            index + 1
        };
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl ExactSizeIterator for ProbeSequence {}
