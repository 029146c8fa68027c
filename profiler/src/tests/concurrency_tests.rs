use std::sync::Arc;
use std::sync::Barrier;

use common::log_setup::setup_logging;

use crate::data::{TaskKey, TaskPayload, WorkerId};
use crate::observer::{ExecutionObserver, ObserverRegistry};
use crate::profiler::Profiler;
use crate::task_graph::TaskGraph;

fn graph_of(keys: impl IntoIterator<Item = String>) -> TaskGraph {
    keys.into_iter()
        .enumerate()
        .map(|(index, key)| (key, TaskPayload::new(index as i64)))
        .collect()
}

#[test]
fn interleaved_workers_record_independent_tasks() {
    setup_logging("debug");

    let profiler = Arc::new(Profiler::new());
    let graph = graph_of(["a", "b"].map(String::from));

    let scope = profiler.start();
    profiler.on_graph_start(&graph);

    // Two workers, one key each, all hook interleavings racing through
    // the same pending table.
    let barrier = Barrier::new(2);
    std::thread::scope(|s| {
        for key in ["a", "b"] {
            let profiler = &profiler;
            let graph = &graph;
            let barrier = &barrier;
            s.spawn(move || {
                let key: TaskKey = key.into();
                let worker = WorkerId::current_thread();
                barrier.wait();
                profiler.on_task_start(&key, &graph);
                profiler.on_task_finish(&key, None, &graph, &worker);
            });
        }
    });

    profiler.on_finish(&graph, false);
    drop(scope);

    let results = profiler.results();
    assert_eq!(results.len(), 2);

    let mut keys: Vec<&str> = results.iter().map(|r| r.key.as_str()).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["a", "b"]);

    for record in &results {
        assert!(record.end_time >= record.start_time);
        assert_eq!(Some(&record.task), graph.task_by_key(&record.key));
    }
}

#[test]
fn stress_many_workers_many_keys() {
    const WORKERS: usize = 8;
    const KEYS_PER_WORKER: usize = 50;

    let profiler = Arc::new(Profiler::new());
    let graph = graph_of(
        (0..WORKERS)
            .flat_map(|w| (0..KEYS_PER_WORKER).map(move |i| format!("task-{}-{}", w, i))),
    );

    let scope = profiler.start();
    profiler.on_graph_start(&graph);

    let barrier = Barrier::new(WORKERS);
    std::thread::scope(|s| {
        for w in 0..WORKERS {
            let profiler = &profiler;
            let graph = &graph;
            let barrier = &barrier;
            s.spawn(move || {
                let worker = WorkerId::current_thread();
                barrier.wait();
                for i in 0..KEYS_PER_WORKER {
                    let key: TaskKey = format!("task-{}-{}", w, i).into();
                    profiler.on_task_start(&key, graph);
                    profiler.on_task_finish(&key, None, graph, &worker);
                }
            });
        }
    });

    profiler.on_finish(&graph, false);
    drop(scope);

    let results = profiler.results();
    assert_eq!(results.len(), WORKERS * KEYS_PER_WORKER);

    // Every record is complete and uncorrupted.
    let mut seen: Vec<&str> = Vec::with_capacity(results.len());
    for record in &results {
        assert!(record.end_time >= record.start_time);
        assert_eq!(Some(&record.task), graph.task_by_key(&record.key));
        assert!(!record.worker_id.as_str().is_empty());
        seen.push(record.key.as_str());
    }
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), WORKERS * KEYS_PER_WORKER, "duplicate keys in log");
}

#[tokio::test(flavor = "multi_thread")]
async fn simulated_async_engine_drives_the_registry() -> anyhow::Result<()> {
    let profiler = Arc::new(Profiler::new());
    let registry = ObserverRegistry::new();
    registry.register(profiler.clone());

    let graph = graph_of((0..16).map(|i| format!("node-{}", i)));

    let scope = profiler.start();
    registry.notify_graph_start(&graph);

    // Each task runs on whichever runtime worker picks it up; the hooks
    // stay synchronous inside the spawned task, as a real engine's would.
    let mut handles = Vec::new();
    for key in graph.keys().cloned().collect::<Vec<_>>() {
        let registry = registry.clone();
        let graph = graph.clone();
        handles.push(tokio::spawn(async move {
            let worker = WorkerId::current_thread();
            registry.notify_task_start(&key, &graph);
            tokio::task::yield_now().await;
            registry.notify_task_finish(&key, None, &graph, &worker);
        }));
    }
    for handle in handles {
        handle.await?;
    }

    registry.notify_finish(&graph, false);
    drop(scope);

    let results = profiler.results();
    assert_eq!(results.len(), 16);
    for record in &results {
        assert!(record.end_time >= record.start_time);
        assert_eq!(Some(&record.task), graph.task_by_key(&record.key));
    }

    Ok(())
}
