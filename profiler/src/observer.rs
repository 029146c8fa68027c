use std::sync::Arc;

use common::Shared;

use crate::data::{TaskKey, TaskPayload, WorkerId};
use crate::task_graph::TaskGraph;

/// Lifecycle hooks an engine invokes around one graph execution:
/// `on_graph_start` once, then per executed task `on_task_start` followed
/// eventually by `on_task_finish` (the finish may be omitted for aborted
/// tasks), then `on_finish` once.
///
/// The per-task hooks may be called concurrently from the engine's worker
/// threads for different keys; for a single key the engine guarantees that
/// start precedes finish. Implementations must be quick and must not block:
/// they run on the hot path of task execution.
pub trait ExecutionObserver: Send + Sync {
    fn on_graph_start(&self, _graph: &TaskGraph) {}

    fn on_task_start(&self, _key: &TaskKey, _graph: &TaskGraph) {}

    fn on_task_finish(
        &self,
        _key: &TaskKey,
        _value: Option<&TaskPayload>,
        _graph: &TaskGraph,
        _worker_id: &WorkerId,
    ) {
    }

    fn on_finish(&self, _graph: &TaskGraph, _failed: bool) {}
}

/// Hook registry an engine embeds to fan callbacks out to any number of
/// observers. Cloning yields a handle to the same registry.
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    observers: Shared<Vec<Arc<dyn ExecutionObserver>>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, observer: Arc<dyn ExecutionObserver>) {
        self.observers.lock().push(observer);
    }

    /// Removes a previously registered observer, matched by identity.
    pub fn unregister(&self, observer: &Arc<dyn ExecutionObserver>) {
        let target = Arc::as_ptr(observer) as *const ();
        self.observers
            .lock()
            .retain(|existing| Arc::as_ptr(existing) as *const () != target);
    }

    pub fn len(&self) -> usize {
        self.observers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.lock().is_empty()
    }

    pub fn notify_graph_start(&self, graph: &TaskGraph) {
        for observer in self.current() {
            observer.on_graph_start(graph);
        }
    }

    pub fn notify_task_start(&self, key: &TaskKey, graph: &TaskGraph) {
        for observer in self.current() {
            observer.on_task_start(key, graph);
        }
    }

    pub fn notify_task_finish(
        &self,
        key: &TaskKey,
        value: Option<&TaskPayload>,
        graph: &TaskGraph,
        worker_id: &WorkerId,
    ) {
        for observer in self.current() {
            observer.on_task_finish(key, value, graph, worker_id);
        }
    }

    pub fn notify_finish(&self, graph: &TaskGraph, failed: bool) {
        for observer in self.current() {
            observer.on_finish(graph, failed);
        }
    }

    // Snapshot of the observer list so hooks run outside the registry lock;
    // an observer may register or unregister from within a callback.
    fn current(&self) -> Vec<Arc<dyn ExecutionObserver>> {
        self.observers.lock().clone()
    }
}
