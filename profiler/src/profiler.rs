use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use parking_lot::Mutex;

use common::id_type;

use crate::clock;
use crate::data::{TaskKey, TaskPayload, WorkerId};
use crate::observer::ExecutionObserver;
use crate::pending::{BeginOutcome, PendingTable};
use crate::record::TaskRecord;
use crate::task_graph::TaskGraph;

id_type!(SessionId);

#[derive(Debug, Default)]
struct ProfilerState {
    pending: PendingTable,
    records: Vec<TaskRecord>,
    graph: Option<TaskGraph>,
    session_id: SessionId,
}

/// Read view handed to a renderer or exporter: the accumulated log plus the
/// graph snapshot taken at the last graph-start.
#[derive(Clone, Debug)]
pub struct ProfilerSnapshot {
    pub records: Vec<TaskRecord>,
    pub graph: Option<TaskGraph>,
}

/// Task-level execution profiler. Registered with an engine's
/// [`ObserverRegistry`](crate::observer::ObserverRegistry), it turns the
/// engine's callback stream into [`TaskRecord`]s: key, task payload, start
/// and end timestamps, and the worker that ran the task.
///
/// ```
/// use std::sync::Arc;
///
/// use profiler::data::TaskPayload;
/// use profiler::observer::ObserverRegistry;
/// use profiler::profiler::Profiler;
/// use profiler::task_graph::TaskGraph;
///
/// let profiler = Arc::new(Profiler::new());
/// let registry = ObserverRegistry::new();
/// registry.register(profiler.clone());
///
/// let mut graph = TaskGraph::new();
/// graph.insert("x", TaskPayload::new(1i64));
///
/// let scope = profiler.start();
/// // The engine drives the hooks through the registry:
/// registry.notify_graph_start(&graph);
/// registry.notify_task_start(&"x".into(), &graph);
/// registry.notify_task_finish(&"x".into(), None, &graph, &"w1".into());
/// registry.notify_finish(&graph, false);
/// drop(scope);
///
/// assert_eq!(profiler.results().len(), 1);
/// ```
///
/// The profiler never panics on a malformed callback sequence: a finish
/// without a start is ignored, a start without a finish is dropped at
/// `on_finish`, a duplicate start overwrites its predecessor with a
/// warning. At worst it loses a data point; it never destabilizes the
/// execution it observes.
#[derive(Debug, Default)]
pub struct Profiler {
    // One lock over pending table, log, and snapshot keeps clear() atomic
    // with respect to every read and hook.
    state: Mutex<ProfilerState>,
    active: AtomicBool,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets all collected state and begins observing. Stops observing when
    /// the returned scope drops, on any exit path; results stay readable
    /// after that. Calling `start` again while active just re-runs the reset.
    pub fn start(&self) -> ProfilerScope<'_> {
        let session_id = SessionId::unique();
        {
            let mut state = self.state.lock();
            state.pending.clear();
            state.records.clear();
            state.graph = None;
            state.session_id = session_id;
        }
        self.active.store(true, Ordering::SeqCst);
        debug!("profiler session {} started", session_id);

        ProfilerScope {
            profiler: self,
            session_id,
        }
    }

    /// Stops observing without clearing anything. Pending entries left by
    /// tasks still in flight stay in the table until the next
    /// `clear()`/`start()`.
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Empties the accumulated log, the pending table, and the graph
    /// snapshot. Safe in any state; does not affect whether the profiler
    /// is observing.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.pending.clear();
        state.records.clear();
        state.graph = None;
    }

    /// The accumulated log so far. Safe to call mid-session; records only
    /// appear after `on_finish` folds them in.
    pub fn results(&self) -> Vec<TaskRecord> {
        self.state.lock().records.clone()
    }

    pub fn snapshot(&self) -> ProfilerSnapshot {
        let state = self.state.lock();
        ProfilerSnapshot {
            records: state.records.clone(),
            graph: state.graph.clone(),
        }
    }
}

impl ExecutionObserver for Profiler {
    fn on_graph_start(&self, graph: &TaskGraph) {
        if !self.is_active() {
            return;
        }
        self.state.lock().graph = Some(graph.clone());
    }

    fn on_task_start(&self, key: &TaskKey, graph: &TaskGraph) {
        if !self.is_active() {
            return;
        }
        let start_time = clock::now_secs();

        let Some(task) = graph.task_by_key(key) else {
            debug!("pre-task hook for key {} absent from the graph, skipping", key);
            return;
        };

        let outcome = self
            .state
            .lock()
            .pending
            .begin(key.clone(), task.clone(), start_time);

        if outcome == BeginOutcome::Replaced {
            // Usually an engine bug or a task re-run; worth a signal but
            // never a failure.
            warn!("duplicate pre-task hook for key {}, keeping the later start", key);
        }
    }

    fn on_task_finish(
        &self,
        key: &TaskKey,
        _value: Option<&TaskPayload>,
        _graph: &TaskGraph,
        worker_id: &WorkerId,
    ) {
        if !self.is_active() {
            return;
        }
        let end_time = clock::now_secs();

        let completed = self
            .state
            .lock()
            .pending
            .complete(key, end_time, worker_id.clone());

        if !completed {
            debug!("post-task hook for key {} without a pending start, ignoring", key);
        }
    }

    fn on_finish(&self, _graph: &TaskGraph, failed: bool) {
        if !self.is_active() {
            return;
        }

        let (session_id, dropped, total) = {
            let mut state = self.state.lock();
            let (mut records, dropped) = state.pending.drain_completed();
            state.records.append(&mut records);
            (state.session_id, dropped, state.records.len())
        };

        if dropped > 0 {
            debug!(
                "session {}: {} task(s) started but never finished, dropped",
                session_id, dropped
            );
        }
        debug!(
            "session {}: execution finished (failed: {}), {} record(s) accumulated",
            session_id, failed, total
        );
    }
}

/// RAII handle for one profiling session. Dropping it stops observation on
/// every exit path, including unwinds of the observed execution.
#[must_use = "dropping the scope immediately stops the profiler; bind it with `let scope = ...`"]
#[derive(Debug)]
pub struct ProfilerScope<'a> {
    profiler: &'a Profiler,
    session_id: SessionId,
}

impl ProfilerScope<'_> {
    /// Identifier of this session, also present in the profiler's debug
    /// logs for run correlation.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Explicit early stop; equivalent to dropping the scope.
    pub fn stop(self) {}
}

impl Drop for ProfilerScope<'_> {
    fn drop(&mut self) {
        self.profiler.stop();
        debug!("profiler session {} stopped", self.session_id);
    }
}
