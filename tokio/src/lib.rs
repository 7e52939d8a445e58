#![deny(missing_docs)]

//! Provide a tokio async wrapper around HashTable.  This is tokio specific but should be easily
//! adaptable to other runtimes.

mod checkpoint_thread;
mod commit_error;

use crate::checkpoint_thread::{checkpoint_thread, CheckpointCommand, CheckpointSchedule};
pub use crate::commit_error::CommitError;
use seendb_core::error::insert::{DeleteError, InsertError};
use seendb_core::error::{FetchError, OpenError};
use seendb_core::hasher::Mur3BuildHasher;
use seendb_core::table::checkpoint::CheckpointPolicy;
use seendb_core::table::HashTable;
use seendb_core::table_config::TableConfig;
use seendb_core::table_files::TableFiles;
use std::hash::BuildHasher;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};

/// Checkpoint commands that can be queued before senders wait.
const COMMAND_QUEUE: usize = 64;

/// This provides an async wrapper around one HashTable.
/// Every operation takes a single lock on the table so callers are serialized, this adds no
/// concurrency to the table itself.  Lookups and mutations are done in memory once the lock is
/// held.  Checkpoints (flush and sync) are offloaded to a background thread so callers never wait
/// on a sync unless they call commit().
pub struct SharedTable<S = Mur3BuildHasher>
where
    S: BuildHasher + Default + Send + 'static,
{
    table: Arc<Mutex<HashTable<S>>>,
    command_tx: mpsc::Sender<CheckpointCommand>,
    checkpoint_thread: Option<std::thread::JoinHandle<()>>,
    schedule: Arc<CheckpointSchedule>,
    files: TableFiles,
}

impl<S> Drop for SharedTable<S>
where
    S: BuildHasher + Default + Send + 'static,
{
    fn drop(&mut self) {
        // If the queue is full the thread will end once our sender is dropped instead.
        if self.command_tx.try_send(CheckpointCommand::Done).is_ok() {
            if let Some(thread) = self.checkpoint_thread.take() {
                let _ = thread.join();
            }
        }
    }
}

impl<S> SharedTable<S>
where
    S: BuildHasher + Default + Send + 'static,
{
    /// Open a new or reopen an existing table.
    /// The checkpoint policy from config is applied here instead of inside the table.  With an
    /// interval set, mutations left idle for that long are checkpointed by the background thread
    /// without waiting for another mutation.
    pub fn open(config: TableConfig) -> Result<Self, OpenError> {
        let schedule = Arc::new(CheckpointSchedule::new(CheckpointPolicy::from_config(&config)));
        let files = config.files().clone();
        let config = config.no_auto_flush(); // Wrapper needs to control commit.
        let table = Arc::new(Mutex::new(HashTable::open(config)?));
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
        let table_clone = table.clone();
        let schedule_clone = schedule.clone();
        let thread =
            std::thread::spawn(move || checkpoint_thread(table_clone, schedule_clone, command_rx));
        Ok(Self {
            table,
            command_tx,
            checkpoint_thread: Some(thread),
            schedule,
            files,
        })
    }

    /// Return the backing files object for this table.
    pub fn files(&self) -> &TableFiles {
        &self.files
    }

    /// Insert key with value or overwrite an existing key's value.
    /// Returns false if there is no room on the key's probe sequence.
    pub async fn insert(&self, key: &[u8], value: &[u8]) -> Result<bool, InsertError> {
        let inserted = self.table.lock().await.insert(key, value)?;
        if inserted {
            self.mutated().await;
        }
        Ok(inserted)
    }

    /// Fetch a copy of the value stored for key.
    pub async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, FetchError> {
        Ok(self.table.lock().await.get(key)?.map(|v| v.to_vec()))
    }

    /// Slot index holding key.
    pub async fn probe_index(&self, key: &[u8]) -> Result<Option<u32>, FetchError> {
        self.table.lock().await.probe_index(key)
    }

    /// True if the table contains key.
    pub async fn contains_key(&self, key: &[u8]) -> Result<bool, FetchError> {
        self.table.lock().await.contains_key(key)
    }

    /// Delete key, returns false if it was not present.
    pub async fn delete(&self, key: &[u8]) -> Result<bool, DeleteError> {
        let deleted = self.table.lock().await.delete(key)?;
        if deleted {
            self.mutated().await;
        }
        Ok(deleted)
    }

    /// True when every slot holds a live entry.
    pub async fn is_full(&self) -> bool {
        self.table.lock().await.is_full()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        self.table.lock().await.len()
    }

    /// Is the table empty?
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of tombstones.
    pub async fn tombstones(&self) -> usize {
        self.table.lock().await.tombstones()
    }

    /// Flush and sync the table on the background thread and wait for it to finish.
    /// All data should be safely on disk if this call succeeds.
    pub async fn commit(&self) -> Result<(), CommitError> {
        let (tx, rx) = oneshot::channel();
        if self
            .command_tx
            .send(CheckpointCommand::Commit(tx))
            .await
            .is_err()
        {
            // An error here means the receiver in the checkpoint thread was dropped/closed.
            return Err(CommitError::SendChannelClosed);
        }
        self.schedule.reset();
        match rx.await {
            Ok(res) => res,
            Err(_err) => Err(CommitError::ReceiveFailed),
        }
    }

    /// Schedule a checkpoint but don't wait for it to complete.
    pub async fn checkpoint(&self) {
        // An error here indicates the receiver in the checkpoint thread was closed/dropped.
        let _ = self.command_tx.send(CheckpointCommand::CommitBG).await;
        self.schedule.reset();
    }

    /// Count a mutation and schedule a checkpoint if the policy says it is due.
    async fn mutated(&self) {
        if self.schedule.note_mutation() {
            self.checkpoint().await;
        }
    }
}
