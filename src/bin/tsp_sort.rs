//! Mergesort demo: both sequential runners over a random vector.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing_subscriber::EnvFilter;

use tsp_rs::util::XorShift64;
use tsp_rs::{DirectRunner, IntSortTask, PartitionedRunner, Task};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1);
    let mut rng = XorShift64::new(seed);

    let mut direct_task = IntSortTask::random(100, &mut rng);
    let mut partitioned_task = IntSortTask::new(direct_task.values().to_vec());

    let mut direct = DirectRunner::new();
    direct.run(&mut direct_task);
    println!(
        "direct:{} t:{}",
        &direct_task as &dyn Task,
        direct.duration()
    );

    let mut partitioned = PartitionedRunner::new(2);
    partitioned.run(&mut partitioned_task);
    println!(
        "partit:{} t:{} r:{}",
        &partitioned_task as &dyn Task,
        partitioned.duration(),
        partitioned.solve_ratio()
    );
}
