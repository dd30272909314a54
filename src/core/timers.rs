//! One-shot long-press timers keyed by pair
//!
//! The detector only talks to [`TimerProvider`]. Expiry comes back into the
//! event sequence as [`RuntimeEvent::TimerFired`] (tokio) or from
//! [`ManualTimers::advance`] (virtual clock).

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::types::{PairId, RuntimeEvent, TimerHandle};

/// Schedules and cancels one-shot timers
pub trait TimerProvider {
    /// Arm a timer that reports `pair` after `after`
    fn schedule(&mut self, pair: PairId, after: Duration) -> TimerHandle;

    /// Cancel a pending timer; unknown or already fired handles are ignored
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due: Duration,
    pair: PairId,
    handle: TimerHandle,
}

/// Deterministic virtual clock
#[derive(Debug, Default)]
pub struct ManualTimers {
    now: Duration,
    next_id: u64,
    pending: Vec<Scheduled>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Timers still waiting to fire
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Move the clock forward and return everything that came due, oldest first
    pub fn advance(&mut self, by: Duration) -> Vec<(PairId, TimerHandle)> {
        self.now += by;
        let now = self.now;

        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|t| {
            if t.due <= now {
                due.push(*t);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|t| (t.due, t.handle));
        due.into_iter().map(|t| (t.pair, t.handle)).collect()
    }
}

impl TimerProvider for ManualTimers {
    fn schedule(&mut self, pair: PairId, after: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending.push(Scheduled {
            due: self.now + after,
            pair,
            handle,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|t| t.handle != handle);
    }
}

/// Timers backed by tokio tasks posting into the event channel.
///
/// `schedule` spawns, so it must run inside a tokio runtime.
#[derive(Debug)]
pub struct TokioTimers {
    tx: UnboundedSender<RuntimeEvent>,
    tasks: HashMap<TimerHandle, JoinHandle<()>>,
    next_id: u64,
}

impl TokioTimers {
    pub fn new(tx: UnboundedSender<RuntimeEvent>) -> Self {
        Self {
            tx,
            tasks: HashMap::new(),
            next_id: 0,
        }
    }
}

impl TimerProvider for TokioTimers {
    fn schedule(&mut self, pair: PairId, after: Duration) -> TimerHandle {
        self.tasks.retain(|_, task| !task.is_finished());

        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // receiver gone means the loop is shutting down
            let _ = tx.send(RuntimeEvent::TimerFired { pair, handle });
        });
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
            debug!(handle = handle.0, "timer task aborted");
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
