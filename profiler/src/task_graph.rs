use hashbrown::HashMap;

use crate::data::{TaskKey, TaskPayload};

/// The engine's task graph as seen by the profiler: a mapping from key to
/// task payload, stable for the duration of one execution. Cloning is the
/// defensive copy taken at graph-start; payloads are shared, not deep-copied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskGraph {
    tasks: HashMap<TaskKey, TaskPayload>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<TaskKey>, task: TaskPayload) {
        self.tasks.insert(key.into(), task);
    }

    pub fn task_by_key(&self, key: &TaskKey) -> Option<&TaskPayload> {
        self.tasks.get(key)
    }

    pub fn contains(&self, key: &TaskKey) -> bool {
        self.tasks.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &TaskKey> {
        self.tasks.keys()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<K: Into<TaskKey>> FromIterator<(K, TaskPayload)> for TaskGraph {
    fn from_iter<I: IntoIterator<Item = (K, TaskPayload)>>(iter: I) -> Self {
        Self {
            tasks: iter
                .into_iter()
                .map(|(key, task)| (key.into(), task))
                .collect(),
        }
    }
}
