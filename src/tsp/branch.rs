//! Branch-and-bound TSP task over a shared incumbent.
//!
//! Each task carries one [`TspPath`] prefix by value. Everything the
//! tasks coordinate through lives in a [`BranchContext`] shared by
//! `Arc`: the graph, the incumbent, the split cutoff, and the one-shot
//! initial-bound flag.
//!
//! # Incumbent protocol
//!
//! `best_distance` is a monotonically non-increasing atomic, giving the
//! hot pruning path a cheap lock-free read. `best_path` is written under
//! a mutex only on the rare event of an improvement, after the CAS that
//! claimed the new distance. Between the CAS and the mutex write the
//! pair is transiently inconsistent: the distance has advanced, the path
//! has not. Readers that need the pair take the mutex and trust the
//! path's own distance; the pruning path needs only the atomic.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::sync::{AtomicBool, AtomicU32, Mutex, Ordering};
use crate::task::{Task, TaskList};

use super::graph::TspGraph;
use super::path::{TspPath, MAX_CITIES, START_CITY};

/// Prune checks are rechecked against the incumbent every this many
/// calls; in between, the stale snapshot is good enough.
const PRUNE_CHECK_INTERVAL: u32 = 16;

/// Shared state of one branch-and-bound run.
pub struct BranchContext {
    graph: TspGraph,
    /// Path length at which `split` stops spawning and the subtree is
    /// solved inline.
    cutoff_size: usize,
    /// Distance of the incumbent; `u32::MAX` until a tour is recorded.
    best_distance: AtomicU32,
    /// The incumbent tour. Lags `best_distance` by design; see the
    /// module docs.
    best_path: Mutex<TspPath>,
    initial_bound_set: AtomicBool,
}

impl BranchContext {
    /// `cutoff` is expressed as a distance from a full path: splitting
    /// stops once `graph.size() - cutoff` cities are fixed.
    ///
    /// # Panics
    /// If the graph holds more than [`MAX_CITIES`] cities or is empty.
    pub fn new(graph: TspGraph, cutoff: usize) -> Self {
        assert!(
            graph.size() <= MAX_CITIES,
            "graph of {} cities exceeds the {} city limit",
            graph.size(),
            MAX_CITIES
        );
        assert!(graph.size() >= 1, "empty graph");
        let cutoff_size = graph.size().saturating_sub(cutoff);
        Self {
            graph,
            cutoff_size,
            best_distance: AtomicU32::new(u32::MAX),
            best_path: Mutex::new(TspPath::new()),
            initial_bound_set: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn graph(&self) -> &TspGraph {
        &self.graph
    }

    /// Current incumbent distance; `u32::MAX` while no tour is known.
    #[inline]
    pub fn best_distance(&self) -> u32 {
        self.best_distance.load(Ordering::Acquire)
    }

    /// The incumbent tour, or `None` when no complete tour was recorded
    /// yet. The returned path's own distance is authoritative for the
    /// pair.
    pub fn best(&self) -> Option<TspPath> {
        let path = self.best_path.lock().expect("incumbent mutex poisoned");
        if path.len() <= 1 {
            return None;
        }
        Some(path.clone())
    }

    /// Install `candidate` as the incumbent if it is strictly better.
    ///
    /// Loops on the monotonic distance CAS; the winner then writes the
    /// path under the mutex. Returns whether the candidate won.
    pub fn update_best(&self, candidate: &TspPath) -> bool {
        let distance = candidate.distance();
        let mut current = self.best_distance.load(Ordering::Acquire);
        while distance < current {
            match self.best_distance.compare_exchange_weak(
                current,
                distance,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    let mut best = self.best_path.lock().expect("incumbent mutex poisoned");
                    *best = candidate.clone();
                    trace!(distance, "incumbent improved");
                    return true;
                }
                Err(observed) => current = observed,
            }
        }
        false
    }

    /// Seed the incumbent with the naive tour `0, 1, …, N-1, 0` exactly
    /// once per context, so pruning bites from the first branch.
    fn ensure_initial_bound(&self) {
        if self.initial_bound_set.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut tour = TspPath::new();
        for city in 1..self.graph.size() {
            tour.push(city, &self.graph);
        }
        tour.push(START_CITY, &self.graph);
        self.update_best(&tour);
        debug!(bound = tour.distance(), "seeded naive-tour bound");
    }

    /// Periodic prune test: every [`PRUNE_CHECK_INTERVAL`]-th call
    /// compares the prefix against the incumbent.
    fn should_prune(&self, path: &TspPath, checks: &mut u32) -> bool {
        *checks += 1;
        if *checks % PRUNE_CHECK_INTERVAL == 0 {
            return path.distance() >= self.best_distance.load(Ordering::Relaxed);
        }
        false
    }
}

/// The branch-and-bound task. Splitting spawns one child per viable
/// next city until the cutoff depth; deeper subtrees are enumerated
/// inline by `solve` without spawning, which amortizes split overhead.
pub struct TspBranchTask {
    ctx: Arc<BranchContext>,
    path: TspPath,
    prune_checks: u32,
}

impl TspBranchTask {
    /// The root task: an empty prefix at city 0.
    pub fn root(ctx: Arc<BranchContext>) -> Self {
        Self {
            ctx,
            path: TspPath::new(),
            prune_checks: 0,
        }
    }

    fn child(&self, city: usize) -> Self {
        let mut path = self.path.clone();
        path.push(city, self.ctx.graph());
        Self {
            ctx: Arc::clone(&self.ctx),
            path,
            prune_checks: 0,
        }
    }
}

impl Task for TspBranchTask {
    fn split(&mut self, tasks: &mut TaskList<'_, '_>) -> usize {
        self.ctx.ensure_initial_bound();
        if self.path.len() >= self.ctx.cutoff_size {
            return 0;
        }
        if self.ctx.should_prune(&self.path, &mut self.prune_checks) {
            return 0;
        }

        let best = self.ctx.best_distance.load(Ordering::Relaxed);
        let mut spawned = 0;
        for city in 0..self.ctx.graph().size() {
            if self.path.contains(city) {
                continue;
            }
            let bound =
                self.path.distance() + self.ctx.graph().distance(self.path.tail(), city);
            if bound < best {
                tasks.push(Box::new(self.child(city)));
                spawned += 1;
            }
        }
        spawned
    }

    /// Results travel through the shared incumbent; nothing to combine.
    fn merge(&mut self, tasks: &mut TaskList<'_, '_>) {
        tasks.clear();
    }

    fn solve(&mut self) {
        let ctx = Arc::clone(&self.ctx);
        solve_dfs(&ctx, &mut self.path, &mut self.prune_checks);
    }

    fn write(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task{}", self.path)
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Depth-first enumeration over the same branching choices as `split`,
/// without spawning. The incumbent snapshot is refreshed after every
/// recursion so sibling subtrees see improvements immediately.
fn solve_dfs(ctx: &BranchContext, path: &mut TspPath, checks: &mut u32) {
    if ctx.should_prune(path, checks) {
        return;
    }
    let graph = ctx.graph();
    if path.len() == graph.size() {
        path.push(START_CITY, graph);
        if path.distance() < ctx.best_distance.load(Ordering::Relaxed) {
            ctx.update_best(path);
        }
        path.pop(graph);
        return;
    }

    let mut best = ctx.best_distance.load(Ordering::Relaxed);
    for city in 0..graph.size() {
        if path.contains(city) {
            continue;
        }
        let bound = path.distance() + graph.distance(path.tail(), city);
        if bound < best {
            path.push(city, graph);
            solve_dfs(ctx, path, checks);
            path.pop(graph);
            best = ctx.best_distance.load(Ordering::Relaxed);
        }
    }
}
