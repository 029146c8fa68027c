use serde::Serialize;

use crate::data::{TaskKey, TaskPayload, WorkerId};

/// One completed task observation. All five fields are always populated;
/// a partially observed task never becomes a record. The payload is skipped
/// during serialization because it is opaque to this crate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskRecord {
    pub key: TaskKey,
    #[serde(skip)]
    pub task: TaskPayload,
    pub start_time: f64,
    pub end_time: f64,
    pub worker_id: WorkerId,
}

impl TaskRecord {
    /// Wall time between the pre-task and post-task hooks, in seconds.
    /// Timestamps come from the monotonic process clock, so this is
    /// non-negative in practice; it is not validated.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}
