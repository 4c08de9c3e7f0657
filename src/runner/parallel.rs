//! Multi-worker runner over the shared lock-free pool.
//!
//! # Shape
//!
//! ```text
//!                    ┌────────────────────────────────────────────┐
//!                    │               ParallelRunner               │
//!                    │                                            │
//!   run(root) ───────┼──► TaskPool (lock-free LIFO) ◄─────────┐   │
//!                    │        │                               │   │
//!                    │        ▼ pop                    push ▲ │   │
//!                    │   ┌──────────┬──────────┬──────────┐ │ │   │
//!                    │   │ Worker 0 │ Worker 1 │ Worker N │─┘ │   │
//!                    │   └────┬─────┴────┬─────┴────┬─────┘   │   │
//!                    │        │ split → children ───────────────┘ │
//!                    │        │ solve → leaf result               │
//!                    │        ▼                                   │
//!                    │   outstanding: AtomicI64 (quiescence)      │
//!                    │   idle: Mutex + Condvar (sleep/wake only)  │
//!                    └────────────────────────────────────────────┘
//! ```
//!
//! # Correctness invariants
//!
//! - **Accounting**: every task that enters the system is decremented
//!   from `outstanding` exactly once, after its fate (leaf solved, or
//!   replaced by `n` children with a prior `+= n`) is recorded.
//!   `outstanding == 0` therefore implies the pool is empty and no
//!   worker holds a task: quiescence.
//! - **No lost wakeups**: a worker that saw an empty pool re-checks the
//!   predicates under the condvar lock before sleeping; producers
//!   notify while holding that lock.
//! - **Wake discipline**: the decrement that reaches zero broadcasts;
//!   any other completion wakes one sleeper. Shutdown broadcasts.
//! - **Ownership**: the pool owns pending tasks; a worker owns at most
//!   the one task between pop and drop. Split consumes the parent.
//!
//! Tasks are never interrupted mid-flight: `stop` lets workers finish
//! the task in hand and exit at the top of the loop.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::pool::TaskPool;
use crate::task::{BoxedTask, TaskList};

/// State shared between the runner and its workers.
struct Shared {
    pool: TaskPool,
    /// Tasks in the system whose terminal event is not yet counted.
    outstanding: AtomicI64,
    /// Once true, workers exit at the next loop head.
    stop: AtomicBool,
    tasks_created: AtomicU64,
    tasks_processed: AtomicU64,
    /// Lock for the condvar only; no data lives under it.
    idle: Mutex<()>,
    wake: Condvar,
    /// First panic raised by a task; re-raised on the runner thread.
    panic: Mutex<Option<Box<dyn Any + Send>>>,
}

impl Shared {
    fn notify_all(&self) {
        let _guard = self.idle.lock().expect("idle mutex poisoned");
        self.wake.notify_all();
    }

    /// Record the first task panic and shut the run down so the
    /// remaining workers do not wait for a quiescence that will never
    /// come.
    fn record_panic(&self, payload: Box<dyn Any + Send>) {
        {
            let mut slot = self.panic.lock().expect("panic mutex poisoned");
            if slot.is_none() {
                *slot = Some(payload);
            }
        }
        self.stop.store(true, Ordering::Relaxed);
        self.notify_all();
    }
}

/// Handle for requesting shutdown of an in-flight run from another
/// thread. Workers finish their current task and exit; `run` then joins
/// them and returns.
#[derive(Clone)]
pub struct RunnerHandle {
    shared: Arc<Shared>,
}

impl RunnerHandle {
    pub fn stop(&self) {
        self.shared.stop.store(true, Ordering::Relaxed);
        self.shared.notify_all();
    }
}

/// Fixed pool of worker threads sharing one [`TaskPool`].
pub struct ParallelRunner {
    shared: Arc<Shared>,
    handles: Vec<JoinHandle<()>>,
    threads: usize,
    elapsed: Duration,
}

impl ParallelRunner {
    /// `threads == 0` auto-detects hardware parallelism (minimum 4 when
    /// detection fails).
    pub fn new(threads: usize) -> Self {
        let threads = if threads == 0 {
            thread::available_parallelism().map_or(4, |n| n.get())
        } else {
            threads
        };
        Self {
            shared: Arc::new(Shared {
                pool: TaskPool::new(),
                outstanding: AtomicI64::new(0),
                stop: AtomicBool::new(false),
                tasks_created: AtomicU64::new(0),
                tasks_processed: AtomicU64::new(0),
                idle: Mutex::new(()),
                wake: Condvar::new(),
                panic: Mutex::new(None),
            }),
            handles: Vec::new(),
            threads,
            elapsed: Duration::ZERO,
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// A handle that can stop an in-flight run from another thread.
    pub fn handle(&self) -> RunnerHandle {
        RunnerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Drive `root` and its descendants to quiescence, blocking until
    /// every worker has exited and been joined.
    ///
    /// # Panics
    /// Re-raises the first panic of any task on the calling thread; the
    /// run is aborted, not recovered.
    pub fn run(&mut self, root: BoxedTask) {
        let shared = &self.shared;
        shared.stop.store(false, Ordering::Relaxed);
        shared.tasks_processed.store(0, Ordering::Relaxed);
        // The root counts as one outstanding task and one created task.
        shared.outstanding.store(1, Ordering::Relaxed);
        shared.pool.clear();
        shared.pool.push(root);
        shared.tasks_created.store(1, Ordering::Relaxed);

        let started = Instant::now();
        for id in 0..self.threads {
            let shared = Arc::clone(&self.shared);
            let handle = thread::Builder::new()
                .name(format!("task-worker-{id}"))
                .spawn(move || worker_loop(&shared, id))
                .expect("spawn worker thread");
            self.handles.push(handle);
        }
        self.shared.notify_all();

        let mut join_panic = None;
        for handle in self.handles.drain(..) {
            if let Err(payload) = handle.join() {
                join_panic.get_or_insert(payload);
            }
        }
        self.elapsed = started.elapsed();

        let task_panic = self
            .shared
            .panic
            .lock()
            .expect("panic mutex poisoned")
            .take();
        if let Some(payload) = task_panic.or(join_panic) {
            panic::resume_unwind(payload);
        }

        info!(
            threads = self.threads,
            created = self.tasks_created(),
            processed = self.tasks_processed(),
            elapsed_ms = self.elapsed.as_millis() as u64,
            "parallel run complete"
        );
    }

    /// Request shutdown and join any workers still alive. Idempotent.
    pub fn stop(&mut self) {
        self.shared.stop.store(true, Ordering::Relaxed);
        self.shared.notify_all();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }

    /// Wall-clock duration of the last run, in seconds.
    pub fn duration(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Tasks that entered the system during the last run (root
    /// included).
    pub fn tasks_created(&self) -> u64 {
        self.shared.tasks_created.load(Ordering::Relaxed)
    }

    /// Leaf tasks solved during the last run.
    pub fn tasks_processed(&self) -> u64 {
        self.shared.tasks_processed.load(Ordering::Relaxed)
    }

    /// True when nothing is pending: the quiescence predicate.
    pub fn is_quiescent(&self) -> bool {
        self.shared.outstanding.load(Ordering::Acquire) == 0 && self.shared.pool.is_empty()
    }
}

impl Drop for ParallelRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(shared: &Shared, id: usize) {
    debug!(worker = id, "worker started");
    loop {
        if shared.stop.load(Ordering::Relaxed) {
            break;
        }

        let Some(task) = shared.pool.pop() else {
            // Empty pool: sleep until there is work, the run quiesces,
            // or shutdown. The predicates are re-checked under the lock
            // so a push racing with this pop cannot be missed.
            let mut guard = shared.idle.lock().expect("idle mutex poisoned");
            let exit = loop {
                if shared.stop.load(Ordering::Relaxed) {
                    break true;
                }
                let outstanding = shared.outstanding.load(Ordering::Acquire);
                if outstanding == 0 && shared.pool.is_empty() {
                    break true;
                }
                if !shared.pool.is_empty() {
                    break false;
                }
                guard = shared.wake.wait(guard).expect("idle mutex poisoned");
            };
            drop(guard);
            if exit {
                break;
            }
            continue;
        };

        process(shared, task);
    }
    debug!(worker = id, "worker exiting");
}

/// Run one task to its terminal event and record it.
fn process(shared: &Shared, mut task: BoxedTask) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let n = task.split(&mut TaskList::Pool(&shared.pool));
        if n > 0 {
            shared.tasks_created.fetch_add(n as u64, Ordering::Relaxed);
            shared.outstanding.fetch_add(n as i64, Ordering::Relaxed);
        } else {
            task.solve();
            shared.tasks_processed.fetch_add(1, Ordering::Relaxed);
        }
    }));
    // The parent is consumed either way: split replaced it with its
    // children, solve completed it.
    drop(task);

    if let Err(payload) = outcome {
        shared.record_panic(payload);
        return;
    }

    let remaining = shared.outstanding.fetch_sub(1, Ordering::AcqRel) - 1;
    debug_assert!(remaining >= 0, "outstanding task counter underflow");
    let _guard = shared.idle.lock().expect("idle mutex poisoned");
    if remaining == 0 {
        shared.wake.notify_all();
    } else {
        shared.wake.notify_one();
    }
}
