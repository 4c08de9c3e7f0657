//! Engine-level properties: no task loss under the parallel runner,
//! and mergesort correctness under both sequential runners.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use proptest::prelude::*;

use tsp_rs::{
    BoxedTask, DirectRunner, IntSortTask, ParallelRunner, PartitionedRunner, Task, TaskList,
};

const PROPTEST_CASES: u32 = 32;

/// Splits `fanout`-ways until `depth` hits zero; leaves bump a shared
/// counter.
struct CountingTask {
    depth: u32,
    fanout: usize,
    solved: Arc<AtomicU64>,
}

impl CountingTask {
    fn boxed(depth: u32, fanout: usize, solved: &Arc<AtomicU64>) -> BoxedTask {
        Box::new(CountingTask {
            depth,
            fanout,
            solved: Arc::clone(solved),
        })
    }
}

impl Task for CountingTask {
    fn split(&mut self, tasks: &mut TaskList<'_, '_>) -> usize {
        if self.depth == 0 {
            return 0;
        }
        for _ in 0..self.fanout {
            tasks.push(CountingTask::boxed(
                self.depth - 1,
                self.fanout,
                &self.solved,
            ));
        }
        self.fanout
    }
    fn merge(&mut self, tasks: &mut TaskList<'_, '_>) {
        tasks.clear();
    }
    fn solve(&mut self) {
        self.solved.fetch_add(1, Ordering::Relaxed);
    }
    fn write(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "counting(depth={})", self.depth)
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Task-tree node count of a full `fanout`-ary tree of height `depth`.
fn tree_nodes(depth: u32, fanout: u64) -> u64 {
    (0..=depth).map(|level| fanout.pow(level)).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(crate::proptest_cases(PROPTEST_CASES)))]

    /// Every leaf is processed exactly once and the counters account
    /// for every node of the tree; outstanding work returns to zero.
    #[test]
    fn parallel_runner_loses_no_tasks(
        depth in 0u32..5,
        fanout in 1usize..4,
        threads in 1usize..5,
    ) {
        let solved = Arc::new(AtomicU64::new(0));
        let mut runner = ParallelRunner::new(threads);
        runner.run(CountingTask::boxed(depth, fanout, &solved));

        let leaves = (fanout as u64).pow(depth);
        prop_assert_eq!(solved.load(Ordering::Relaxed), leaves);
        prop_assert_eq!(runner.tasks_processed(), leaves);
        prop_assert_eq!(runner.tasks_created(), tree_nodes(depth, fanout as u64));
        prop_assert!(runner.is_quiescent());
    }

    /// Both sequential runners sort any vector.
    #[test]
    fn mergesort_sorts(values in prop::collection::vec(any::<i32>(), 0..200)) {
        let mut expected = values.clone();
        expected.sort_unstable();

        let mut direct_task = IntSortTask::new(values.clone());
        DirectRunner::new().run(&mut direct_task);
        prop_assert_eq!(direct_task.values(), expected.as_slice());

        let mut partitioned_task = IntSortTask::new(values);
        let mut runner = PartitionedRunner::new(2);
        runner.run(&mut partitioned_task);
        prop_assert_eq!(partitioned_task.values(), expected.as_slice());
    }
}
