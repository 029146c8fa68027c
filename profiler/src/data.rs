use std::any::Any;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Task identifier, unique within one graph execution. Opaque to the
/// profiler; supplied by the engine.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskKey(Arc<str>);

impl TaskKey {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        TaskKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskKey {
    fn from(key: &str) -> Self {
        TaskKey(key.into())
    }
}

impl From<String> for TaskKey {
    fn from(key: String) -> Self {
        TaskKey(key.into())
    }
}

impl std::fmt::Display for TaskKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the execution context that ran a task. Opaque; used only
/// for grouping and display downstream.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(Arc<str>);

impl WorkerId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        WorkerId(id.into())
    }

    pub fn current_thread() -> Self {
        WorkerId(format!("{:?}", std::thread::current().id()).into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkerId {
    fn from(id: &str) -> Self {
        WorkerId(id.into())
    }
}

impl From<String> for WorkerId {
    fn from(id: String) -> Self {
        WorkerId(id.into())
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("payload type mismatch: expected {expected}, stored {actual}")]
pub struct PayloadTypeError {
    pub expected: &'static str,
    pub actual: &'static str,
}

/// A task definition as supplied by the engine's graph. The profiler stores
/// and returns payloads without ever interpreting them; typed access exists
/// for downstream consumers such as renderers.
#[derive(Clone)]
pub struct TaskPayload {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl TaskPayload {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    pub fn typed<T: Any>(&self) -> Result<&T, PayloadTypeError> {
        self.downcast_ref().ok_or(PayloadTypeError {
            expected: std::any::type_name::<T>(),
            actual: self.type_name,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

// Payloads are compared by identity: a record's task is "the same payload
// the graph held", not a structural equality the profiler cannot know.
impl PartialEq for TaskPayload {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl std::fmt::Debug for TaskPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TaskPayload({})", self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_equality_is_identity() {
        let payload = TaskPayload::new(42i64);
        let clone = payload.clone();
        let other = TaskPayload::new(42i64);

        assert_eq!(payload, clone);
        assert_ne!(payload, other);
    }

    #[test]
    fn typed_access() {
        let payload = TaskPayload::new("add".to_string());

        assert_eq!(payload.typed::<String>().unwrap(), "add");

        let err = payload.typed::<i64>().unwrap_err();
        assert_eq!(err.expected, "i64");
        assert_eq!(err.actual, "alloc::string::String");
    }

    #[test]
    fn worker_id_from_current_thread_is_stable() {
        assert_eq!(WorkerId::current_thread(), WorkerId::current_thread());
    }
}
