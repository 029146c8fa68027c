use hashbrown::HashMap;

use crate::data::{TaskKey, TaskPayload, WorkerId};
use crate::record::TaskRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginOutcome {
    Inserted,
    /// A pending entry for the key already existed and was overwritten
    /// (last-start-wins). The caller decides how loudly to report it.
    Replaced,
}

#[derive(Debug)]
struct Completion {
    end_time: f64,
    worker_id: WorkerId,
}

#[derive(Debug)]
struct PendingEntry {
    task: TaskPayload,
    start_time: f64,
    completion: Option<Completion>,
}

/// Transient table of tasks that have started but not yet been folded into
/// the accumulated log. Keys are finalized in begin-insertion order, which
/// keeps the log order stable within one finish call.
#[derive(Debug, Default)]
pub struct PendingTable {
    entries: HashMap<TaskKey, PendingEntry>,
    order: Vec<TaskKey>,
}

impl PendingTable {
    pub fn begin(&mut self, key: TaskKey, task: TaskPayload, start_time: f64) -> BeginOutcome {
        let entry = PendingEntry {
            task,
            start_time,
            completion: None,
        };
        match self.entries.insert(key.clone(), entry) {
            // The key keeps its original position in the order list.
            Some(_) => BeginOutcome::Replaced,
            None => {
                self.order.push(key);
                BeginOutcome::Inserted
            }
        }
    }

    /// Attaches a completion to the pending entry for `key`. Returns false
    /// when no entry exists or one is already completed; the first
    /// completion wins.
    pub fn complete(&mut self, key: &TaskKey, end_time: f64, worker_id: WorkerId) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) if entry.completion.is_none() => {
                entry.completion = Some(Completion {
                    end_time,
                    worker_id,
                });
                true
            }
            _ => false,
        }
    }

    /// Moves every completed entry out as a record, in begin-insertion
    /// order, and empties the table. Entries that never completed are
    /// discarded; their count is returned for diagnostics.
    pub fn drain_completed(&mut self) -> (Vec<TaskRecord>, usize) {
        let mut records = Vec::with_capacity(self.entries.len());
        let mut dropped = 0usize;

        for key in self.order.drain(..) {
            let Some(entry) = self.entries.remove(&key) else {
                continue;
            };
            match entry.completion {
                Some(completion) => records.push(TaskRecord {
                    key,
                    task: entry.task,
                    start_time: entry.start_time,
                    end_time: completion.end_time,
                    worker_id: completion.worker_id,
                }),
                None => dropped += 1,
            }
        }

        debug_assert!(self.entries.is_empty());
        (records, dropped)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
