//! Task runners: the engines that drive a task tree to completion.
//!
//! - [`DirectRunner`] solves the root inline on the calling thread.
//! - [`PartitionedRunner`] recursively splits, solves and merges on a
//!   single thread, using a local stack per recursion level.
//! - [`ParallelRunner`] drives N workers against the shared lock-free
//!   pool, with quiescence detection over an outstanding-task counter.
//!
//! All runners report wall-clock duration for the last run.

mod direct;
mod parallel;
mod partitioned;

pub use direct::DirectRunner;
pub use parallel::{ParallelRunner, RunnerHandle};
pub use partitioned::PartitionedRunner;
