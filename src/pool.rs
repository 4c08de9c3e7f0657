//! Lock-free LIFO task pool.
//!
//! A Treiber stack: a singly-linked list whose head is swung by CAS. The
//! head word packs `(node pointer << 16) | 16-bit tag`, and every
//! successful push or pop bumps the tag, so a CAS cannot succeed against
//! a head that was popped and re-pushed in between (ABA).
//!
//! # Reclamation
//!
//! Popped nodes are retired to an internal free list and reused by later
//! pushes; node memory goes back to the allocator only when the pool is
//! dropped. A racing popper may therefore dereference a node that was
//! concurrently retired, but it always reads valid (possibly recycled)
//! memory, and its CAS then fails on the tag. The node count is bounded
//! by the pool's high-water mark.
//!
//! # Ordering
//!
//! The successful push CAS is `Release` and head loads are `Acquire`, so
//! the push of a node happens-before any pop that observes it. The pop
//! CAS is `AcqRel`. The size counter is advisory and `Relaxed`: it may
//! briefly disagree with the true list length between a CAS and the
//! counter update, and converges when the pool quiesces.
//!
//! # Pointer packing
//!
//! Packing assumes 64-bit pointers whose upper 16 bits are not
//! significant (canonical user-space addresses). Platforms with pointer
//! authentication or tags in the high bits need a different packing.

use core::marker::PhantomData;
use std::cell::UnsafeCell;

use crossbeam_utils::CachePadded;

use crate::sync::{AtomicU64, AtomicUsize, Ordering};
use crate::task::BoxedTask;

// Compile-time: the packed head word needs full 64-bit pointers.
const _: () = assert!(
    std::mem::size_of::<*mut ()>() == 8,
    "the packed task pool head requires 64-bit pointers"
);

const TAG_BITS: u32 = 16;
const TAG_MASK: u64 = (1 << TAG_BITS) - 1;

struct Node {
    /// The owned task. `None` while the node sits on the free list.
    slot: UnsafeCell<Option<BoxedTask>>,
    /// Packed `(ptr, tag)` word of the next node in whichever list this
    /// node is linked into. Atomic because a stale reader may load it
    /// while the new owner rewrites it; the tag check rejects the
    /// reader's CAS in that case.
    next: AtomicU64,
}

#[inline]
fn pack(ptr: *mut Node, tag: u64) -> u64 {
    ((ptr as u64) << TAG_BITS) | (tag & TAG_MASK)
}

#[inline]
fn unpack_ptr(word: u64) -> *mut Node {
    (word >> TAG_BITS) as *mut Node
}

#[inline]
fn unpack_tag(word: u64) -> u64 {
    word & TAG_MASK
}

/// Concurrent LIFO of owned tasks, shared by all workers.
///
/// All operations are non-blocking. `pop` on an empty pool returns
/// `None` immediately. Indexed access is deliberately absent; only the
/// sequential stacks support it.
pub struct TaskPool {
    head: CachePadded<AtomicU64>,
    free: CachePadded<AtomicU64>,
    len: CachePadded<AtomicUsize>,
    _owns: PhantomData<BoxedTask>,
}

// SAFETY: all shared mutation goes through the atomic head/free words;
// a node's slot is only touched by the thread that currently owns the
// node (pre-publication in push, post-CAS in pop). Tasks are `Send` by
// the `Task` supertrait bound.
unsafe impl Send for TaskPool {}
unsafe impl Sync for TaskPool {}

impl TaskPool {
    pub fn new() -> Self {
        Self {
            head: CachePadded::new(AtomicU64::new(pack(std::ptr::null_mut(), 0))),
            free: CachePadded::new(AtomicU64::new(pack(std::ptr::null_mut(), 0))),
            len: CachePadded::new(AtomicUsize::new(0)),
            _owns: PhantomData,
        }
    }

    /// Deposit a task. Lock-free; loops only while losing CAS races.
    pub fn push(&self, task: BoxedTask) {
        let node = self.acquire_node();
        // SAFETY: `node` is unpublished (fresh or taken off the free
        // list), so this thread has exclusive access to its slot.
        unsafe { *(*node).slot.get() = Some(task) };

        loop {
            let head = self.head.load(Ordering::Acquire);
            // SAFETY: exclusive access until the CAS below publishes it.
            unsafe { (*node).next.store(head, Ordering::Relaxed) };
            let new_head = pack(node, unpack_tag(head).wrapping_add(1));
            if self
                .head
                .compare_exchange_weak(head, new_head, Ordering::Release, Ordering::Relaxed)
                .is_ok()
            {
                self.len.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
    }

    /// Withdraw the most recently pushed task, or `None` when empty.
    pub fn pop(&self) -> Option<BoxedTask> {
        loop {
            let head = self.head.load(Ordering::Acquire);
            let node = unpack_ptr(head);
            if node.is_null() {
                return None;
            }
            // SAFETY: nodes are never freed while the pool is alive, so
            // `node` points at valid memory even if another thread
            // already popped and recycled it; the CAS below then fails
            // on the bumped tag and we retry with a fresh head.
            let next = unsafe { (*node).next.load(Ordering::Acquire) };
            let new_head = pack(unpack_ptr(next), unpack_tag(head).wrapping_add(1));
            if self
                .head
                .compare_exchange_weak(head, new_head, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                // SAFETY: the successful CAS unlinked `node`; this
                // thread is its sole owner now.
                let task = unsafe { (*(*node).slot.get()).take() };
                self.release_node(node);
                self.len.fetch_sub(1, Ordering::Relaxed);
                return Some(task.expect("popped node holds a task"));
            }
        }
    }

    /// Drop every task still in the pool.
    ///
    /// Only valid while no other thread is operating on the pool; the
    /// runner calls it between runs, at quiescence.
    pub fn clear(&self) {
        while self.pop().is_some() {}
    }

    /// Advisory task count; converges with the true length at
    /// quiescence.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Derived from the current head pointer, not the advisory counter.
    #[inline]
    pub fn is_empty(&self) -> bool {
        unpack_ptr(self.head.load(Ordering::Acquire)).is_null()
    }

    /// Take a node off the free list, or allocate a fresh one.
    fn acquire_node(&self) -> *mut Node {
        loop {
            let free = self.free.load(Ordering::Acquire);
            let node = unpack_ptr(free);
            if node.is_null() {
                return Box::into_raw(Box::new(Node {
                    slot: UnsafeCell::new(None),
                    next: AtomicU64::new(pack(std::ptr::null_mut(), 0)),
                }));
            }
            // SAFETY: same argument as in `pop`; retired nodes stay
            // allocated, and the tag protects the CAS.
            let next = unsafe { (*node).next.load(Ordering::Acquire) };
            let new_free = pack(unpack_ptr(next), unpack_tag(free).wrapping_add(1));
            if self
                .free
                .compare_exchange_weak(free, new_free, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return node;
            }
        }
    }

    /// Retire a popped node onto the free list for reuse.
    fn release_node(&self, node: *mut Node) {
        loop {
            let free = self.free.load(Ordering::Acquire);
            // SAFETY: this thread owns `node` between pop and retirement.
            unsafe { (*node).next.store(free, Ordering::Relaxed) };
            let new_free = pack(node, unpack_tag(free).wrapping_add(1));
            if self
                .free
                .compare_exchange_weak(free, new_free, Ordering::Release, Ordering::Relaxed)
                .is_ok()
            {
                return;
            }
        }
    }
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        // Drop the tasks, which also retires their nodes.
        self.clear();
        // Now reclaim the nodes for real; `&mut self` proves no other
        // thread can still observe them.
        let mut cur = unpack_ptr(self.free.load(Ordering::Acquire));
        while !cur.is_null() {
            // SAFETY: every node was created by `Box::into_raw` and is
            // linked into the free list exactly once.
            let node = unsafe { Box::from_raw(cur) };
            cur = unpack_ptr(node.next.load(Ordering::Relaxed));
        }
    }
}
