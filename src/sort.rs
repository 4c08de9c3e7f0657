//! Toy mergesort task: the divide-and-conquer smoke test for the
//! runners, and the one task in the system with a real `merge` step.

use std::any::Any;
use std::fmt;

use crate::task::{Task, TaskList};
use crate::util::XorShift64;

/// Sorts a vector of integers by recursive halving.
pub struct IntSortTask {
    values: Vec<i32>,
}

impl IntSortTask {
    pub fn new(values: Vec<i32>) -> Self {
        Self { values }
    }

    /// A task over `len` uniform values in `0..=1000`.
    pub fn random(len: usize, rng: &mut XorShift64) -> Self {
        let values = (0..len).map(|_| rng.next_u32(1001) as i32).collect();
        Self { values }
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }
}

impl Task for IntSortTask {
    fn split(&mut self, tasks: &mut TaskList<'_, '_>) -> usize {
        if self.values.len() <= 1 {
            return 0;
        }
        let right = self.values.split_off(self.values.len() / 2);
        let left = std::mem::take(&mut self.values);
        tasks.push(Box::new(IntSortTask::new(left)));
        tasks.push(Box::new(IntSortTask::new(right)));
        2
    }

    /// Merge the two sorted children back into `self`.
    ///
    /// # Panics
    /// If the collection does not hold exactly two `IntSortTask`
    /// children: the task tree was corrupted.
    fn merge(&mut self, tasks: &mut TaskList<'_, '_>) {
        assert_eq!(tasks.len(), 2, "mergesort merge expects two children");
        let left = take_values(tasks.get_mut(0));
        let right = take_values(tasks.get_mut(1));
        tasks.clear();

        self.values = merge_sorted(left, right);
    }

    fn solve(&mut self) {
        self.values.sort_unstable();
    }

    fn write(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn take_values(task: &mut crate::task::BoxedTask) -> Vec<i32> {
    let child = task
        .as_any_mut()
        .downcast_mut::<IntSortTask>()
        .expect("mergesort child has the wrong type");
    std::mem::take(&mut child.values)
}

fn merge_sorted(left: Vec<i32>, right: Vec<i32>) -> Vec<i32> {
    let mut out = Vec::with_capacity(left.len() + right.len());
    let (mut l, mut r) = (left.into_iter().peekable(), right.into_iter().peekable());
    loop {
        match (l.peek(), r.peek()) {
            (Some(&a), Some(&b)) => {
                if a <= b {
                    out.push(a);
                    l.next();
                } else {
                    out.push(b);
                    r.next();
                }
            }
            (Some(_), None) => {
                out.extend(l);
                break;
            }
            (None, _) => {
                out.extend(r);
                break;
            }
        }
    }
    out
}
