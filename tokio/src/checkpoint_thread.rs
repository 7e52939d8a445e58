use crate::CommitError;
use log::{debug, error};
use seendb_core::table::checkpoint::CheckpointPolicy;
use seendb_core::table::HashTable;
use std::hash::BuildHasher;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime;
use tokio::sync::{mpsc, oneshot, Mutex};

/// Commands that can be sent to a checkpoint thread.
pub(crate) enum CheckpointCommand {
    Commit(oneshot::Sender<Result<(), CommitError>>),
    CommitBG,
    Done,
}

/// Mutations since the last checkpoint and when that was, shared by the table handle (which
/// counts mutations) and the checkpoint thread (which flushes idle mutations on the interval).
pub(crate) struct CheckpointSchedule {
    policy: Option<CheckpointPolicy>,
    // Held only briefly and never across an await so a sync mutex is fine.
    state: parking_lot::Mutex<(u32, Instant)>,
}

impl CheckpointSchedule {
    pub fn new(policy: Option<CheckpointPolicy>) -> Self {
        Self {
            policy,
            state: parking_lot::Mutex::new((0, Instant::now())),
        }
    }

    /// Interval the checkpoint thread should wake on, if any.
    pub fn interval(&self) -> Option<Duration> {
        self.policy.and_then(|policy| policy.interval)
    }

    /// Count a mutation, returns true if a checkpoint is due.
    pub fn note_mutation(&self) -> bool {
        let mut state = self.state.lock();
        state.0 = state.0.saturating_add(1);
        match &self.policy {
            Some(policy) => policy.is_due(state.0, state.1.elapsed()),
            None => false,
        }
    }

    /// True (and resets) if mutations have been waiting at least the interval.
    fn take_idle_due(&self) -> bool {
        let mut state = self.state.lock();
        match self.interval() {
            Some(interval) if state.0 > 0 && state.1.elapsed() >= interval => {
                *state = (0, Instant::now());
                true
            }
            _ => false,
        }
    }

    /// A checkpoint has been scheduled.
    pub fn reset(&self) {
        *self.state.lock() = (0, Instant::now());
    }
}

enum Wake {
    Command(CheckpointCommand),
    Tick,
    Closed,
}

/// Wait for the next command, or at most interval if there is a ticker.
/// The ticker runtime only drives the timed receive, commits happen outside of it since
/// blocking_lock() can not be used in an async context.
fn next_wake(
    command_rx: &mut mpsc::Receiver<CheckpointCommand>,
    ticker: &Option<(runtime::Runtime, Duration)>,
) -> Wake {
    let command = match ticker {
        Some((rt, interval)) => {
            match rt.block_on(tokio::time::timeout(*interval, command_rx.recv())) {
                Ok(command) => command,
                Err(_elapsed) => return Wake::Tick,
            }
        }
        None => command_rx.blocking_recv(),
    };
    match command {
        Some(command) => Wake::Command(command),
        None => Wake::Closed,
    }
}

/// Commit the table, reporting to result_tx if someone is waiting on it.
fn commit_table<S>(
    table: &Mutex<HashTable<S>>,
    result_tx: Option<oneshot::Sender<Result<(), CommitError>>>,
) where
    S: BuildHasher + Default,
{
    let res = table.blocking_lock().commit();
    match (res, result_tx) {
        (Ok(()), Some(tx)) => {
            let _ = tx.send(Ok(()));
        }
        (Ok(()), None) => {}
        (Err(err), Some(tx)) => {
            let _ = tx.send(Err(err.into()));
        }
        (Err(err), None) => error!("background checkpoint failed: {}", err),
    }
}

/// Run a background thread to do the flush and sync work for a single table.
/// Must be a plain thread, not a runtime task, since it uses blocking_lock().
pub(crate) fn checkpoint_thread<S>(
    table: Arc<Mutex<HashTable<S>>>,
    schedule: Arc<CheckpointSchedule>,
    mut command_rx: mpsc::Receiver<CheckpointCommand>,
) where
    S: BuildHasher + Default,
{
    let ticker = match schedule.interval() {
        Some(interval) => match runtime::Builder::new_current_thread().enable_time().build() {
            Ok(rt) => Some((rt, interval)),
            Err(err) => {
                error!("no interval checkpoints, failed to build timer: {}", err);
                None
            }
        },
        None => None,
    };
    let mut done = false;
    while !done {
        match next_wake(&mut command_rx, &ticker) {
            Wake::Command(CheckpointCommand::Commit(tx)) => commit_table(&table, Some(tx)),
            Wake::Command(CheckpointCommand::CommitBG) => commit_table(&table, None),
            Wake::Command(CheckpointCommand::Done) => done = true,
            Wake::Tick => {
                if schedule.take_idle_due() {
                    commit_table(&table, None);
                }
            }
            Wake::Closed => done = true, // All senders are gone, nothing left to do.
        }
    }
    debug!("checkpoint thread done");
}
