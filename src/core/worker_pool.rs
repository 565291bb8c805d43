//! Fixed-size worker thread pool.
//!
//! Each region owns one `WorkerPool` whose thread count is the region's
//! concurrency limit. Tasks travel over an unbounded crossbeam channel, so
//! submission never blocks and never rejects for load: excess work waits in
//! the channel until a worker frees up.
//!
//! # Design
//!
//! - **No polling**: workers block on `recv`; results use Condvar slots
//! - **Graceful shutdown**: dropping the sender closes admission, workers
//!   drain whatever is still queued and then exit
//! - **Panic isolation**: a panicking task abandons its result slot, the
//!   worker survives

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use tracing::{debug, error, info};

use super::completion::{slot, Completer, Completion};
use super::error::DispatchError;

/// Executes one task payload on a worker thread.
pub trait WorkerExecutor<P, R>: Send + Sync + Clone + 'static
where
    P: Send + 'static,
    R: Send + 'static,
{
    /// Run `payload` to completion and return its result.
    fn execute(&self, payload: P) -> R;
}

/// Statistics about pool utilization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Number of worker threads.
    pub worker_count: usize,
    /// Currently executing tasks.
    pub active_tasks: u64,
    /// Highest number of tasks ever executing at once.
    pub peak_active_tasks: u64,
    /// Tasks waiting for a free worker.
    pub queued_tasks: u64,
    /// Total tasks completed successfully.
    pub completed_tasks: u64,
    /// Total tasks that panicked.
    pub failed_tasks: u64,
    /// Total tasks submitted.
    pub submitted_tasks: u64,
}

/// Internal counters for pool statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub active_tasks: AtomicU64,
    pub peak_active_tasks: AtomicU64,
    pub queued_tasks: AtomicU64,
    pub completed_tasks: AtomicU64,
    pub failed_tasks: AtomicU64,
    pub submitted_tasks: AtomicU64,
}

impl PoolCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self, worker_count: usize) -> PoolStats {
        PoolStats {
            worker_count,
            active_tasks: self.active_tasks.load(Ordering::Relaxed),
            peak_active_tasks: self.peak_active_tasks.load(Ordering::Relaxed),
            queued_tasks: self.queued_tasks.load(Ordering::Relaxed),
            completed_tasks: self.completed_tasks.load(Ordering::Relaxed),
            failed_tasks: self.failed_tasks.load(Ordering::Relaxed),
            submitted_tasks: self.submitted_tasks.load(Ordering::Relaxed),
        }
    }
}

/// A task submitted to the worker pool.
struct WorkerTask<P, R> {
    task_id: u64,
    payload: P,
    completer: Completer<R>,
}

/// Count of live worker threads, used to await termination.
#[derive(Default)]
struct LiveWorkers {
    count: Mutex<usize>,
    exited: Condvar,
}

impl LiveWorkers {
    fn worker_exited(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.exited.notify_all();
        }
    }
}

/// Worker pool with a fixed number of dedicated OS threads.
pub struct WorkerPool<P, R, E>
where
    P: Send + 'static,
    R: Send + 'static,
    E: WorkerExecutor<P, R>,
{
    name: String,
    worker_count: usize,
    /// Task sender; `None` once shut down.
    task_tx: Mutex<Option<Sender<WorkerTask<P, R>>>>,
    counters: Arc<PoolCounters>,
    live: Arc<LiveWorkers>,
    shutdown: AtomicBool,
    workers: Mutex<Vec<JoinHandle<()>>>,
    _executor: std::marker::PhantomData<E>,
}

impl<P, R, E> WorkerPool<P, R, E>
where
    P: Send + 'static,
    R: Send + 'static,
    E: WorkerExecutor<P, R>,
{
    /// Spawn `worker_count` threads named `<name>-<index>`.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidConfig` for a zero worker count and
    /// `DispatchError::Internal` if a thread cannot be spawned.
    pub fn new(name: &str, worker_count: usize, executor: E) -> Result<Self, DispatchError> {
        if worker_count == 0 {
            return Err(DispatchError::InvalidConfig(format!(
                "worker pool `{name}` needs at least one worker"
            )));
        }

        let (task_tx, task_rx) = unbounded::<WorkerTask<P, R>>();
        let counters = Arc::new(PoolCounters::default());
        let live = Arc::new(LiveWorkers::default());

        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            *live.count.lock() += 1;
            let spawned = spawn_worker(
                format!("{name}-{worker_id}"),
                task_rx.clone(),
                Arc::clone(&counters),
                Arc::clone(&live),
                executor.clone(),
            );
            match spawned {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    live.worker_exited();
                    error!(pool = %name, worker_id, error = %e, "failed to spawn worker thread");
                    return Err(DispatchError::Internal(format!(
                        "failed to spawn worker for `{name}`: {e}"
                    )));
                }
            }
        }

        info!(pool = %name, worker_count, "worker pool started");

        Ok(Self {
            name: name.to_owned(),
            worker_count,
            task_tx: Mutex::new(Some(task_tx)),
            counters,
            live,
            shutdown: AtomicBool::new(false),
            workers: Mutex::new(workers),
            _executor: std::marker::PhantomData,
        })
    }

    /// Queue `payload` for execution. Never blocks.
    ///
    /// # Errors
    ///
    /// Hands the payload back if the pool has been shut down.
    pub(crate) fn submit(&self, task_id: u64, payload: P) -> Result<Completion<R>, P> {
        let task_tx_guard = self.task_tx.lock();
        let Some(task_tx) = task_tx_guard.as_ref() else {
            return Err(payload);
        };

        let (completer, completion) = slot();
        // Count before sending so a fast worker never decrements first.
        self.counters.queued_tasks.fetch_add(1, Ordering::Relaxed);
        match task_tx.send(WorkerTask {
            task_id,
            payload,
            completer,
        }) {
            Ok(()) => {
                self.counters.submitted_tasks.fetch_add(1, Ordering::Relaxed);
                debug!(pool = %self.name, task_id, "task submitted");
                Ok(completion)
            }
            Err(rejected) => {
                self.counters.queued_tasks.fetch_sub(1, Ordering::Relaxed);
                Err(rejected.into_inner().payload)
            }
        }
    }

    /// Current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.counters.snapshot(self.worker_count)
    }

    /// Stop accepting tasks. Queued and running tasks still complete.
    ///
    /// Does not wait for the workers; see [`await_termination`](Self::await_termination).
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }
        self.task_tx.lock().take();
        info!(pool = %self.name, "worker pool shutting down, draining queued tasks");
    }

    /// Wait up to `timeout` for every worker to drain and exit.
    ///
    /// Returns `true` if all workers exited. Only meaningful after
    /// [`shutdown`](Self::shutdown); a running pool never terminates. A
    /// timeout too large to express as a deadline waits without one.
    pub fn await_termination(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        {
            let mut count = self.live.count.lock();
            while *count > 0 {
                match deadline {
                    Some(deadline) => {
                        if self.live.exited.wait_until(&mut count, deadline).timed_out() {
                            return *count == 0;
                        }
                    }
                    None => self.live.exited.wait(&mut count),
                }
            }
        }

        let mut workers = self.workers.lock();
        for (idx, worker) in workers.drain(..).enumerate() {
            if worker.join().is_err() {
                error!(pool = %self.name, worker_id = idx, "worker thread panicked");
            }
        }
        debug!(pool = %self.name, "worker pool terminated");
        true
    }
}

impl<P, R, E> Drop for WorkerPool<P, R, E>
where
    P: Send + 'static,
    R: Send + 'static,
    E: WorkerExecutor<P, R>,
{
    fn drop(&mut self) {
        // Close admission but do not join; workers finish their queue detached.
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            self.task_tx.lock().take();
            debug!(pool = %self.name, "worker pool dropped without explicit shutdown");
        }
    }
}

fn spawn_worker<P, R, E>(
    thread_name: String,
    task_rx: Receiver<WorkerTask<P, R>>,
    counters: Arc<PoolCounters>,
    live: Arc<LiveWorkers>,
    executor: E,
) -> std::io::Result<JoinHandle<()>>
where
    P: Send + 'static,
    R: Send + 'static,
    E: WorkerExecutor<P, R>,
{
    thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            debug!(worker = %thread_name, "worker thread started");

            // Blocks until work arrives; returns Err once the sender is gone
            // and the queue is empty.
            while let Ok(task) = task_rx.recv() {
                counters.queued_tasks.fetch_sub(1, Ordering::Relaxed);
                let active = counters.active_tasks.fetch_add(1, Ordering::Relaxed) + 1;
                counters.peak_active_tasks.fetch_max(active, Ordering::Relaxed);

                let WorkerTask {
                    task_id,
                    payload,
                    completer,
                } = task;
                debug!(worker = %thread_name, task_id, "worker executing task");

                let outcome = catch_unwind(AssertUnwindSafe(|| executor.execute(payload)));

                // Leave the active count before resolving so observers that
                // wake on the result never see this task as still running.
                counters.active_tasks.fetch_sub(1, Ordering::Relaxed);
                match outcome {
                    Ok(result) => {
                        counters.completed_tasks.fetch_add(1, Ordering::Relaxed);
                        completer.complete(result);
                    }
                    Err(_) => {
                        counters.failed_tasks.fetch_add(1, Ordering::Relaxed);
                        error!(worker = %thread_name, task_id, "task panicked");
                        drop(completer);
                    }
                }
            }

            debug!(worker = %thread_name, "worker thread exiting");
            live.worker_exited();
        })
}
