//! Parallel recursive task engine with a branch-and-bound TSP solver.
//!
//! The engine drives polymorphic tasks that know how to subdivide
//! (`split`), combine (`merge`) and finish (`solve`) themselves:
//!
//! - [`task`]: the [`Task`] contract and the [`TaskList`] collection
//!   capability tasks see.
//! - [`pool`]: the shared lock-free LIFO ([`TaskPool`], a tagged
//!   Treiber stack) that the parallel workers deposit into and withdraw
//!   from.
//! - [`stack`]: single-threaded task stacks for the partitioned
//!   sequential runner.
//! - [`runner`]: the three engines — direct, partitioned-recursive and
//!   parallel, the latter with quiescence detection over an
//!   outstanding-task counter and a condvar used only for idle sleep.
//! - [`tsp`]: the branch-and-bound TSP instantiation, coordinating
//!   through a shared monotonic incumbent.
//! - [`sort`]: a toy mergesort task exercising the merge path.
//!
//! Execution flow, parallel case:
//!
//! ```text
//! run(root) ─► pool ─► worker: pop ──► split? ─► push children, outstanding += n
//!                         ▲              │
//!                         │              └─► solve leaf, processed += 1
//!                         │          outstanding -= 1
//!                         └──── 0 reached ⇒ quiescent, broadcast, join
//! ```

pub mod pool;
pub mod runner;
pub mod sort;
pub mod stack;
mod sync;
pub mod task;
pub mod tsp;
pub mod util;

pub use pool::TaskPool;
pub use runner::{DirectRunner, ParallelRunner, PartitionedRunner, RunnerHandle};
pub use sort::IntSortTask;
pub use stack::{FixedTaskStack, TaskStack};
pub use task::{BoxedTask, Task, TaskList};
pub use tsp::{BranchContext, GraphError, TspBranchTask, TspGraph, TspPath, MAX_CITIES};
