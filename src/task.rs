//! The task contract and the collection capability tasks see.
//!
//! A [`Task`] is a unit of recursive work. The engine drives it through
//! exactly four operations:
//!
//! - [`Task::split`] may deposit child tasks into the supplied collection
//!   and returns how many it pushed. Returning 0 means "no children" and
//!   obliges the caller to invoke [`Task::solve`] instead. A task that
//!   returns 0 must not have pushed anything.
//! - [`Task::merge`] combines completed children back into the parent.
//!   Only the partitioned sequential runner calls it; it must leave the
//!   collection empty on return.
//! - [`Task::solve`] computes the leaf result. It may read shared state
//!   (e.g. a branch-and-bound incumbent) but never touches the pool.
//! - [`Task::write`] renders the task to a formatter; `dyn Task`
//!   implements [`Display`](fmt::Display) on top of it.
//!
//! Ownership is strict: a task is held by exactly one place at any time,
//! either a collection or the worker processing it. `split` donates the
//! children it creates; the parent is consumed by the runner afterwards.

use std::any::Any;
use std::fmt;

use crate::pool::TaskPool;
use crate::stack::{FixedTaskStack, TaskStack};

/// An owned, heap-allocated task handle.
pub type BoxedTask = Box<dyn Task>;

/// A unit of recursive work. See the module docs for the contract.
pub trait Task: Send {
    /// Subdivide into child tasks pushed onto `tasks`. Returns the number
    /// pushed; 0 means the task is a leaf and must be solved instead.
    fn split(&mut self, tasks: &mut TaskList<'_, '_>) -> usize;

    /// Combine completed children from `tasks` into `self`, draining the
    /// collection. Tasks with no combination step just clear it.
    fn merge(&mut self, tasks: &mut TaskList<'_, '_>);

    /// Compute the leaf result in place.
    fn solve(&mut self);

    /// Render to a text sink.
    fn write(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// Downcast hook so problem-specific `merge` implementations can
    /// recover their concrete child type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl fmt::Display for dyn Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f)
    }
}

/// The collection a task sees during `split` and `merge`.
///
/// Tagged over the three implementations so the engine stays monomorphic
/// at the seam: the concurrent pool used by the parallel runner, and the
/// two single-threaded stacks used by the partitioned runner.
pub enum TaskList<'c, 's> {
    /// The shared lock-free pool. Indexed access is not supported.
    Pool(&'c TaskPool),
    /// A growable single-threaded stack.
    Stack(&'c mut TaskStack),
    /// A fixed-capacity stack over caller-provided storage.
    Fixed(&'c mut FixedTaskStack<'s>),
}

impl TaskList<'_, '_> {
    /// Deposit a task. The collection takes ownership.
    pub fn push(&mut self, task: BoxedTask) {
        match self {
            TaskList::Pool(pool) => pool.push(task),
            TaskList::Stack(stack) => stack.push(task),
            TaskList::Fixed(stack) => stack.push(task),
        }
    }

    /// Withdraw the most recently pushed task, or `None` when empty.
    pub fn pop(&mut self) -> Option<BoxedTask> {
        match self {
            TaskList::Pool(pool) => pool.pop(),
            TaskList::Stack(stack) => stack.pop(),
            TaskList::Fixed(stack) => stack.pop(),
        }
    }

    /// Drop every task still held.
    pub fn clear(&mut self) {
        match self {
            TaskList::Pool(pool) => pool.clear(),
            TaskList::Stack(stack) => stack.clear(),
            TaskList::Fixed(stack) => stack.clear(),
        }
    }

    /// Number of tasks currently held. Advisory for the pool variant.
    pub fn len(&self) -> usize {
        match self {
            TaskList::Pool(pool) => pool.len(),
            TaskList::Stack(stack) => stack.len(),
            TaskList::Fixed(stack) => stack.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            TaskList::Pool(pool) => pool.is_empty(),
            TaskList::Stack(stack) => stack.is_empty(),
            TaskList::Fixed(stack) => stack.is_empty(),
        }
    }

    /// Access the `index`-th task (push order) in place.
    ///
    /// # Panics
    /// On the `Pool` variant: the concurrent pool has no stable indexing.
    /// On the stack variants: if `index` is out of bounds.
    pub fn get_mut(&mut self, index: usize) -> &mut BoxedTask {
        match self {
            TaskList::Pool(_) => {
                panic!("indexed access is not supported on the concurrent task pool")
            }
            TaskList::Stack(stack) => stack.get_mut(index),
            TaskList::Fixed(stack) => stack.get_mut(index),
        }
    }
}
