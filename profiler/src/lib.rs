pub mod clock;
pub mod data;
pub mod observer;
pub mod pending;
pub mod profiler;
pub mod record;
pub mod task_graph;

#[cfg(test)]
mod tests;
