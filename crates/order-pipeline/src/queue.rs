//! # Admission Queue
//!
//! A bounded, multi-producer / multi-consumer FIFO used for load shedding.
//!
//! - **Producers** ([`AdmissionQueue`]) never wait: [`AdmissionQueue::try_submit`] either
//!   admits the job or fails immediately with [`PipelineError::QueueFull`].
//! - **Consumers** ([`JobReceiver`]) wait in [`JobReceiver::recv`] until a job is available.
//!   Each admitted job is handed to exactly one consumer.
//!
//! Items live in a `VecDeque` guarded by a `std::sync::Mutex` that is only ever held for a
//! push or a pop, never across an `.await`. A `Semaphore` counts queued items and is what
//! consumers actually wait on.
//!
//! Ordering is FIFO at the queue, but with several consumers there is no ordering guarantee on
//! *completion*: two jobs dequeued back to back may finish in either order.

use crate::error::PipelineError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

struct State<J> {
    items: VecDeque<J>,
    closed: bool,
}

struct Shared<J> {
    state: Mutex<State<J>>,
    available: Semaphore,
    capacity: usize,
}

impl<J> Shared<J> {
    fn lock(&self) -> MutexGuard<'_, State<J>> {
        // Nothing panics while holding the lock, but never propagate poisoning into workers.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pop(&self) -> Option<J> {
        self.lock().items.pop_front()
    }
}

/// Creates a bounded queue and returns its producer and consumer halves.
///
/// Both halves are cheap to clone. A `capacity` of zero rejects every submission.
pub fn bounded<J>(capacity: usize) -> (AdmissionQueue<J>, JobReceiver<J>) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State {
            items: VecDeque::with_capacity(capacity.min(1024)),
            closed: false,
        }),
        available: Semaphore::new(0),
        capacity,
    });
    (
        AdmissionQueue {
            shared: shared.clone(),
        },
        JobReceiver { shared },
    )
}

/// Producer half of the queue. Submission is non-blocking.
pub struct AdmissionQueue<J> {
    shared: Arc<Shared<J>>,
}

impl<J> Clone for AdmissionQueue<J> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<J> AdmissionQueue<J> {
    /// Admits `job` if there is room, otherwise rejects it immediately.
    ///
    /// The capacity check and the push happen under the same lock, so `N` concurrent
    /// submissions into `C` free slots admit exactly `min(N, C)` jobs.
    ///
    /// # Errors
    /// - [`PipelineError::QueueFull`] when the queue holds `capacity` jobs.
    /// - [`PipelineError::QueueClosed`] once [`JobReceiver::close`] has been called.
    pub fn try_submit(&self, job: J) -> Result<(), PipelineError> {
        {
            let mut state = self.shared.lock();
            if state.closed {
                return Err(PipelineError::QueueClosed);
            }
            if state.items.len() >= self.shared.capacity {
                return Err(PipelineError::QueueFull {
                    capacity: self.shared.capacity,
                });
            }
            state.items.push_back(job);
        }
        self.shared.available.add_permits(1);
        Ok(())
    }

    /// Number of jobs admitted but not yet taken by a consumer.
    pub fn depth(&self) -> usize {
        self.shared.lock().items.len()
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}

/// Consumer half of the queue.
pub struct JobReceiver<J> {
    shared: Arc<Shared<J>>,
}

impl<J> Clone for JobReceiver<J> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<J> JobReceiver<J> {
    /// Waits for the next job.
    ///
    /// Returns `None` only after the queue has been closed *and* fully drained, so jobs that
    /// were admitted before `close` are still delivered.
    pub async fn recv(&self) -> Option<J> {
        loop {
            match self.shared.available.acquire().await {
                Ok(permit) => {
                    permit.forget();
                    if let Some(job) = self.shared.pop() {
                        return Some(job);
                    }
                    // A draining consumer already took the item this permit stood for.
                    if self.shared.lock().closed {
                        return None;
                    }
                }
                // Semaphore closed: drain without waiting.
                Err(_) => return self.shared.pop(),
            }
        }
    }

    /// Stops admission. Waiting consumers wake up and drain what is left.
    pub fn close(&self) {
        self.shared.lock().closed = true;
        self.shared.available.close();
    }

    pub fn depth(&self) -> usize {
        self.shared.lock().items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    #[tokio::test]
    async fn test_rejects_when_full_without_changing_depth() {
        let (queue, _receiver) = bounded::<u32>(2);

        assert!(queue.try_submit(1).is_ok());
        assert!(queue.try_submit(2).is_ok());
        assert_eq!(
            queue.try_submit(3),
            Err(PipelineError::QueueFull { capacity: 2 })
        );
        assert_eq!(queue.depth(), 2);
    }

    #[tokio::test]
    async fn test_fifo_for_single_consumer() {
        let (queue, receiver) = bounded::<u32>(10);
        for i in 0..5 {
            queue.try_submit(i).unwrap();
        }

        let mut seen = vec![];
        for _ in 0..5 {
            seen.push(receiver.recv().await.unwrap());
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(queue.depth(), 0);
    }

    #[tokio::test]
    async fn test_recv_waits_for_submission() {
        let (queue, receiver) = bounded::<&'static str>(1);

        let waiter = tokio::spawn(async move { receiver.recv().await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        queue.try_submit("job").unwrap();
        assert_eq!(waiter.await.unwrap(), Some("job"));
    }

    #[tokio::test]
    async fn test_each_job_delivered_to_exactly_one_consumer() {
        let (queue, receiver) = bounded::<u32>(1000);
        for i in 0..1000 {
            queue.try_submit(i).unwrap();
        }
        receiver.close();

        let mut handles = vec![];
        for _ in 0..8 {
            let receiver = receiver.clone();
            handles.push(tokio::spawn(async move {
                let mut got = vec![];
                while let Some(job) = receiver.recv().await {
                    got.push(job);
                }
                got
            }));
        }

        let mut all = vec![];
        for handle in handles {
            all.extend(handle.await.unwrap());
        }
        let unique: HashSet<u32> = all.iter().copied().collect();
        assert_eq!(all.len(), 1000);
        assert_eq!(unique.len(), 1000);
    }

    #[tokio::test]
    async fn test_close_drains_then_ends() {
        let (queue, receiver) = bounded::<u32>(4);
        queue.try_submit(7).unwrap();
        queue.try_submit(8).unwrap();

        receiver.close();

        assert!(queue.is_closed());
        assert_eq!(queue.try_submit(9), Err(PipelineError::QueueClosed));
        assert_eq!(receiver.recv().await, Some(7));
        assert_eq!(receiver.recv().await, Some(8));
        assert_eq!(receiver.recv().await, None);
    }

    #[tokio::test]
    async fn test_close_wakes_idle_consumer() {
        let (_queue, receiver) = bounded::<u32>(4);
        let idle = receiver.clone();
        let waiter = tokio::spawn(async move { idle.recv().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        receiver.close();
        assert_eq!(waiter.await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submitters_fill_exactly_capacity() {
        const CAPACITY: usize = 8;
        const SUBMITTERS: usize = 64;

        let (queue, _receiver) = bounded::<usize>(CAPACITY);
        let start = std::sync::Arc::new(tokio::sync::Barrier::new(SUBMITTERS));

        let handles: Vec<_> = (0..SUBMITTERS)
            .map(|i| {
                let queue = queue.clone();
                let start = start.clone();
                tokio::spawn(async move {
                    start.wait().await;
                    queue.try_submit(i)
                })
            })
            .collect();

        let mut admitted = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => admitted += 1,
                Err(PipelineError::QueueFull { capacity }) => {
                    assert_eq!(capacity, CAPACITY);
                    rejected += 1;
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(admitted, CAPACITY);
        assert_eq!(rejected, SUBMITTERS - CAPACITY);
        assert_eq!(queue.depth(), CAPACITY);
    }
}
