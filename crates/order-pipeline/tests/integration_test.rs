use async_trait::async_trait;
use order_pipeline::mock::RecordingSleeper;
use order_pipeline::{retry, Job, PipelineError, PoolCounters, RetryPolicy, WorkerPool};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// --- Test Job ---

#[derive(Debug)]
struct WriteJob {
    key: u32,
    /// Number of attempts that fail before one succeeds.
    failures: u32,
}

#[derive(Debug, thiserror::Error)]
#[error("write {key} gave up after {attempts} attempts")]
struct WriteFailed {
    key: u32,
    attempts: u32,
}

#[derive(Default)]
struct Sink {
    writes: Mutex<HashMap<u32, u32>>,
    sleeper: RecordingSleeper,
}

#[async_trait]
impl Job for WriteJob {
    type Id = u32;
    type Context = Sink;
    type Error = WriteFailed;

    fn id(&self) -> u32 {
        self.key
    }

    async fn process(self, sink: &Sink) -> Result<(), WriteFailed> {
        let policy = RetryPolicy::linear(3, Duration::from_millis(1));
        let key = self.key;
        let failures = self.failures;
        retry(&policy, &sink.sleeper, |attempt| async move {
            if attempt <= failures {
                Err(format!("attempt {attempt} failed"))
            } else {
                Ok(())
            }
        })
        .await
        .map_err(|e| WriteFailed {
            key,
            attempts: e.attempts,
        })?;

        *sink.writes.lock().unwrap().entry(key).or_insert(0) += 1;
        Ok(())
    }
}

/// Panics when `explode` is set, otherwise bumps the shared counter.
#[derive(Debug)]
struct FragileJob {
    explode: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("unreachable")]
struct Unreachable;

#[async_trait]
impl Job for FragileJob {
    type Id = bool;
    type Context = AtomicU32;
    type Error = Unreachable;

    fn id(&self) -> bool {
        self.explode
    }

    async fn process(self, done: &AtomicU32) -> Result<(), Unreachable> {
        if self.explode {
            panic!("job blew up");
        }
        done.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// --- Tests ---

#[tokio::test]
async fn test_pool_processes_every_admitted_job_once() {
    let (pool, queue) = WorkerPool::<WriteJob>::new(100);
    let handle = pool.start(4, Sink::default());
    assert_eq!(handle.workers(), 4);

    for key in 0..50 {
        queue.try_submit(WriteJob { key, failures: 0 }).unwrap();
    }

    let sink = handle.context();
    handle.shutdown().await.unwrap();

    let writes = sink.writes.lock().unwrap();
    assert_eq!(writes.len(), 50);
    assert!(writes.values().all(|count| *count == 1));
}

#[tokio::test]
async fn test_failed_jobs_are_dropped_and_counted() {
    let (pool, queue) = WorkerPool::<WriteJob>::new(10);
    let handle = pool.start(2, Sink::default());

    queue.try_submit(WriteJob { key: 1, failures: 2 }).unwrap();
    queue.try_submit(WriteJob { key: 2, failures: 3 }).unwrap();
    queue.try_submit(WriteJob { key: 3, failures: 0 }).unwrap();

    let sink = handle.context();
    handle.shutdown().await.unwrap();

    let writes = sink.writes.lock().unwrap();
    assert_eq!(writes.get(&1), Some(&1));
    assert_eq!(writes.get(&2), None);
    assert_eq!(writes.get(&3), Some(&1));
    // key 1: two backoffs, key 2: two backoffs before giving up
    assert_eq!(sink.sleeper.sleeps().len(), 4);
}

#[tokio::test]
async fn test_counters_after_drain() {
    let (pool, queue) = WorkerPool::<WriteJob>::new(10);
    for key in 0..3 {
        queue.try_submit(WriteJob { key, failures: 0 }).unwrap();
    }
    queue.try_submit(WriteJob { key: 99, failures: 5 }).unwrap();

    // Jobs admitted before start are still processed.
    let handle = pool.start(1, Sink::default());
    while handle.counters().processed + handle.counters().failed < 4 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(
        handle.counters(),
        PoolCounters {
            processed: 3,
            failed: 1,
            panicked: 0,
        }
    );
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_submit_after_shutdown_is_rejected() {
    let (pool, queue) = WorkerPool::<WriteJob>::new(10);
    let handle = pool.start(1, Sink::default());
    handle.shutdown().await.unwrap();

    let result = queue.try_submit(WriteJob { key: 1, failures: 0 });
    assert_eq!(result, Err(PipelineError::QueueClosed));
}

#[tokio::test]
async fn test_full_queue_sheds_load() {
    // Not started: nothing drains the queue.
    let (_pool, queue) = WorkerPool::<WriteJob>::new(2);
    queue.try_submit(WriteJob { key: 1, failures: 0 }).unwrap();
    queue.try_submit(WriteJob { key: 2, failures: 0 }).unwrap();

    let rejected = queue.try_submit(WriteJob { key: 3, failures: 0 });
    assert_eq!(rejected, Err(PipelineError::QueueFull { capacity: 2 }));
    assert_eq!(queue.depth(), 2);
}

#[tokio::test]
async fn test_panicking_job_does_not_kill_its_worker() {
    let (pool, queue) = WorkerPool::<FragileJob>::new(10);
    queue.try_submit(FragileJob { explode: true }).unwrap();
    queue.try_submit(FragileJob { explode: false }).unwrap();
    queue.try_submit(FragileJob { explode: true }).unwrap();
    queue.try_submit(FragileJob { explode: false }).unwrap();

    // A single worker has to survive both panics to finish the other jobs.
    let handle = pool.start(1, AtomicU32::new(0));
    while handle.counters().processed + handle.counters().panicked < 4 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(
        handle.counters(),
        PoolCounters {
            processed: 2,
            failed: 0,
            panicked: 2,
        }
    );
    let done = handle.context();
    handle.shutdown().await.unwrap();
    assert_eq!(done.load(Ordering::SeqCst), 2);
}
