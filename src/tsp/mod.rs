//! Traveling Salesman Problem instantiation of the task engine.
//!
//! - [`TspGraph`] loads a TSPLIB-subset file into a symmetric
//!   rounded-Euclidean distance matrix.
//! - [`TspPath`] is a fixed-capacity tour prefix with O(1) incremental
//!   distance maintenance.
//! - [`TspBranchTask`] is the branch-and-bound task; all concurrent
//!   coordination goes through the shared [`BranchContext`] incumbent.

mod branch;
mod graph;
mod path;

pub use branch::{BranchContext, TspBranchTask};
pub use graph::{GraphError, TspGraph};
pub use path::{TspPath, MAX_CITIES, START_CITY};
