//! Pool linearizability properties: the multiset of tasks ever pushed
//! equals the multiset ever popped plus the residents, and LIFO order
//! holds single-threaded.

use proptest::prelude::*;

use tsp_rs::{BoxedTask, IntSortTask, TaskPool};

const PROPTEST_CASES: u32 = 64;

fn labeled(id: i32) -> BoxedTask {
    Box::new(IntSortTask::new(vec![id]))
}

fn label(task: &mut BoxedTask) -> i32 {
    task.as_any_mut()
        .downcast_mut::<IntSortTask>()
        .expect("pool test task is an IntSortTask")
        .values()[0]
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Push(i32),
    Pop,
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(crate::proptest_cases(PROPTEST_CASES)))]

    /// Single-threaded model check against a shadow Vec.
    #[test]
    fn matches_stack_model(
        ops in prop::collection::vec(
            prop_oneof![(0i32..1000).prop_map(Op::Push), Just(Op::Pop)],
            1..200,
        )
    ) {
        let pool = TaskPool::new();
        let mut shadow: Vec<i32> = Vec::new();

        for op in ops {
            match op {
                Op::Push(id) => {
                    pool.push(labeled(id));
                    shadow.push(id);
                }
                Op::Pop => {
                    let popped = pool.pop().map(|mut task| label(&mut task));
                    prop_assert_eq!(popped, shadow.pop());
                }
            }
            prop_assert_eq!(pool.len(), shadow.len());
            prop_assert_eq!(pool.is_empty(), shadow.is_empty());
        }

        while let Some(mut task) = pool.pop() {
            prop_assert_eq!(Some(label(&mut task)), shadow.pop());
        }
        prop_assert!(shadow.is_empty());
    }

    /// Concurrent pushes from several threads: every task is popped
    /// exactly once, none invented.
    #[test]
    fn concurrent_pushes_conserve_the_multiset(
        per_thread in 1usize..200,
        threads in 2usize..5,
    ) {
        let pool = std::sync::Arc::new(TaskPool::new());
        let mut handles = Vec::new();
        for t in 0..threads {
            let pool = std::sync::Arc::clone(&pool);
            handles.push(std::thread::spawn(move || {
                for i in 0..per_thread {
                    pool.push(labeled((t * per_thread + i) as i32));
                }
            }));
        }
        for handle in handles {
            handle.join().expect("producer finished");
        }

        let mut seen = vec![false; threads * per_thread];
        while let Some(mut task) = pool.pop() {
            let id = label(&mut task) as usize;
            prop_assert!(!seen[id], "task {} popped twice", id);
            seen[id] = true;
        }
        prop_assert!(seen.iter().all(|&s| s));
        prop_assert_eq!(pool.len(), 0);
    }
}
