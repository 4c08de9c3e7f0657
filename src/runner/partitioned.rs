//! Single-threaded recursive runner.
//!
//! Drives the task tree depth-first: each level splits into a local
//! stack, recurses over the children in push order, then merges. Leaves
//! fall through to `solve`. The split/solve counters give a cheap
//! diagnostic of how bushy the task tree was.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::stack::TaskStack;
use crate::task::{Task, TaskList};

/// Recursive sequential runner over per-level [`TaskStack`]s.
#[derive(Debug)]
pub struct PartitionedRunner {
    /// Capacity hint for each level's local stack (maximum fan-out).
    capacity: usize,
    splits: u64,
    solves: u64,
    elapsed: Duration,
}

impl PartitionedRunner {
    /// `capacity` is the largest fan-out a single `split` can produce.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            splits: 0,
            solves: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn run(&mut self, task: &mut dyn Task) {
        self.splits = 0;
        self.solves = 0;
        let started = Instant::now();
        self.recurse(task);
        self.elapsed = started.elapsed();
        debug!(
            splits = self.splits,
            solves = self.solves,
            "partitioned run complete"
        );
    }

    fn recurse(&mut self, task: &mut dyn Task) {
        let mut local = TaskStack::with_capacity(self.capacity);
        let n = task.split(&mut TaskList::Stack(&mut local));
        if n > 0 {
            self.splits += 1;
            // Children are solved in push order.
            for i in 0..n {
                self.recurse(local.get_mut(i).as_mut());
            }
            task.merge(&mut TaskList::Stack(&mut local));
            debug_assert!(local.is_empty(), "merge must drain the local stack");
        } else {
            self.solves += 1;
            task.solve();
        }
    }

    /// Wall-clock duration of the last run, in seconds.
    pub fn duration(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn splits(&self) -> u64 {
        self.splits
    }

    pub fn solves(&self) -> u64 {
        self.solves
    }

    /// Fraction of visited tasks that were leaves, in `(0, 1]` for any
    /// non-empty run.
    pub fn solve_ratio(&self) -> f64 {
        let total = self.solves + self.splits;
        if total == 0 {
            return 0.0;
        }
        self.solves as f64 / total as f64
    }
}
