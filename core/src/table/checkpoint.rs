//! Decide when buffered slot changes should be flushed to the table file.

use crate::table_config::TableConfig;
use std::time::{Duration, Instant};

/// When to checkpoint: after a number of mutations and/or once an interval has passed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CheckpointPolicy {
    /// Flush once this many mutations are pending, 0 to never trigger on count.
    pub mutations: u32,
    /// Flush on the first mutation after this long since the last flush.  A HashTable only checks
    /// this on a mutation, it has no timer of its own.
    pub interval: Option<Duration>,
}

impl CheckpointPolicy {
    /// Policy from config, None if automatic checkpoints are off.
    pub fn from_config(config: &TableConfig) -> Option<Self> {
        if config.auto_flush {
            Some(Self {
                mutations: config.checkpoint_mutations,
                interval: config.checkpoint_interval,
            })
        } else {
            None
        }
    }

    /// True if pending mutations, the last one elapsed after the previous flush, call for a flush.
    pub fn is_due(&self, pending: u32, elapsed: Duration) -> bool {
        if pending == 0 {
            return false;
        }
        if self.mutations > 0 && pending >= self.mutations {
            return true;
        }
        matches!(self.interval, Some(interval) if elapsed >= interval)
    }
}

/// Tracks mutations since the last flush for a table.
#[derive(Debug)]
pub(crate) struct Checkpointer {
    policy: Option<CheckpointPolicy>,
    pending: u32,
    last_flush: Instant,
}

impl Checkpointer {
    pub fn new(policy: Option<CheckpointPolicy>) -> Self {
        Self {
            policy,
            pending: 0,
            last_flush: Instant::now(),
        }
    }

    /// Count a mutation, returns true if it is time to flush.
    pub fn note_mutation(&mut self) -> bool {
        self.pending = self.pending.saturating_add(1);
        match &self.policy {
            Some(policy) => policy.is_due(self.pending, self.last_flush.elapsed()),
            None => false,
        }
    }

    /// Mutations since the last flush.
    pub fn pending(&self) -> u32 {
        self.pending
    }

    /// A flush has happened.
    pub fn flushed(&mut self) {
        self.pending = 0;
        self.last_flush = Instant::now();
    }
}
