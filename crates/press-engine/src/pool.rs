//! Worker Pool
//!
//! Fixed set of std threads sharing one bounded queue. Submission never
//! blocks: once running plus queued jobs reach `workers + queue_depth`,
//! [`WorkerPool::try_submit`] refuses the job.

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;

use crate::error::{RenderError, Result};

/// Task function type
pub type TaskFn = Box<dyn FnOnce() + Send + 'static>;

/// Shared task queue
struct TaskQueue {
    tasks: Mutex<VecDeque<TaskFn>>,
    condvar: Condvar,
    shutdown: AtomicBool,
}

impl TaskQueue {
    fn new() -> Self {
        Self {
            tasks: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<TaskFn>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, task: TaskFn) {
        self.lock().push_back(task);
        self.condvar.notify_one();
    }

    fn wait_for_task(&self) -> Option<TaskFn> {
        let mut queue = self.lock();
        loop {
            if let Some(task) = queue.pop_front() {
                return Some(task);
            }
            if self.shutdown.load(Ordering::Acquire) {
                return None;
            }
            // Wait with timeout to check shutdown
            queue = self
                .condvar
                .wait_timeout(queue, Duration::from_millis(100))
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.condvar.notify_all();
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Counters shared with the workers
#[derive(Default)]
struct Counters {
    /// Queued plus running
    in_flight: AtomicUsize,
    active: AtomicUsize,
    completed: AtomicUsize,
    panicked: AtomicUsize,
}

/// Snapshot of pool load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub workers: usize,
    pub queue_depth: usize,
    pub active: usize,
    pub queued: usize,
    pub completed: usize,
}

struct Worker {
    id: usize,
    thread: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("running", &self.thread.is_some())
            .finish()
    }
}

impl Worker {
    fn spawn(id: usize, queue: Arc<TaskQueue>, counters: Arc<Counters>) -> std::io::Result<Self> {
        let thread = thread::Builder::new()
            .name(format!("press-worker-{id}"))
            .spawn(move || {
                while let Some(task) = queue.wait_for_task() {
                    counters.active.fetch_add(1, Ordering::SeqCst);
                    if catch_unwind(AssertUnwindSafe(task)).is_err() {
                        counters.panicked.fetch_add(1, Ordering::Relaxed);
                        tracing::error!("worker {} recovered from a panicking job", id);
                    }
                    counters.completed.fetch_add(1, Ordering::Relaxed);
                    // slot first, so an idle worker always means a free slot
                    counters.in_flight.fetch_sub(1, Ordering::SeqCst);
                    counters.active.fetch_sub(1, Ordering::SeqCst);
                }
                tracing::debug!("worker {} stopped", id);
            })?;
        Ok(Self { id, thread: Some(thread) })
    }
}

/// Bounded pool of render workers
pub struct WorkerPool {
    workers: Vec<Worker>,
    queue: Arc<TaskQueue>,
    counters: Arc<Counters>,
    queue_depth: usize,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .field("queue_depth", &self.queue_depth)
            .field("in_flight", &self.counters.in_flight.load(Ordering::Relaxed))
            .finish()
    }
}

impl WorkerPool {
    /// Start `workers` threads (at least one) accepting up to `queue_depth`
    /// waiting jobs
    pub fn new(workers: usize, queue_depth: usize) -> std::io::Result<Self> {
        let queue = Arc::new(TaskQueue::new());
        let counters = Arc::new(Counters::default());
        let workers = (0..workers.max(1))
            .map(|id| Worker::spawn(id, Arc::clone(&queue), Arc::clone(&counters)))
            .collect::<std::io::Result<Vec<_>>>()?;
        tracing::debug!("started {} workers, queue depth {}", workers.len(), queue_depth);

        Ok(Self {
            workers,
            queue,
            counters,
            queue_depth,
        })
    }

    /// One worker per CPU core
    pub fn default_size(queue_depth: usize) -> std::io::Result<Self> {
        Self::new(num_cpus::get(), queue_depth)
    }

    /// Queue a task, or fail with `CapacityExceeded` when the pool is full
    pub fn try_submit<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let capacity = self.capacity();
        self.counters
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n < capacity).then_some(n + 1))
            .map_err(|n| {
                tracing::warn!("rejecting job: {} of {} slots in use", n, capacity);
                RenderError::capacity_exceeded(format!("all {capacity} render slots are busy"))
            })?;
        self.queue.push(Box::new(task));
        Ok(())
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Running plus queued jobs the pool accepts
    pub fn capacity(&self) -> usize {
        self.workers.len() + self.queue_depth
    }

    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    pub fn active_tasks(&self) -> usize {
        self.counters.active.load(Ordering::SeqCst)
    }

    /// Jobs whose task panicked
    pub fn panicked_tasks(&self) -> usize {
        self.counters.panicked.load(Ordering::Relaxed)
    }

    pub fn is_idle(&self) -> bool {
        self.counters.in_flight.load(Ordering::SeqCst) == 0
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            workers: self.workers.len(),
            queue_depth: self.queue_depth,
            active: self.active_tasks(),
            queued: self.pending_tasks(),
            completed: self.counters.completed.load(Ordering::Relaxed),
        }
    }

    /// Finish queued work and join every worker
    pub fn shutdown(&mut self) {
        self.queue.shutdown();
        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                let _ = thread.join();
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
