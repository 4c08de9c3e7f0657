//! Synchronization primitives, swappable for loom models.
//!
//! The lock-free pool and the shared incumbent import their atomics and
//! locks from here so the same code runs under `loom` exhaustive
//! interleaving tests (`RUSTFLAGS="--cfg loom" cargo test --lib`).

#[cfg(not(loom))]
pub(crate) use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};

#[cfg(not(loom))]
pub(crate) use std::sync::Mutex;

#[cfg(loom)]
pub(crate) use loom::sync::Mutex;
