//! Sequential TSP: direct and partitioned-recursive runs over the same
//! instance, each against a fresh incumbent.

use std::env;
use std::process;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tsp_rs::{
    BranchContext, DirectRunner, PartitionedRunner, TspBranchTask, TspGraph, MAX_CITIES,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let exe = args.first().map(String::as_str).unwrap_or("tsp_seq");
    if args.len() < 2 || args.len() > 3 {
        eprintln!("usage: {exe} <file.tsp> [num_cities]");
        process::exit(1);
    }

    let mut graph = match TspGraph::from_file(&args[1]) {
        Ok(graph) => graph,
        Err(err) => {
            eprintln!("{}: {err}", args[1]);
            process::exit(1);
        }
    };
    if let Some(arg) = args.get(2) {
        let Ok(num_cities) = arg.parse::<usize>() else {
            eprintln!("usage: {exe} <file.tsp> [num_cities]");
            process::exit(1);
        };
        if num_cities > 0 && num_cities < graph.size() {
            graph.resize(num_cities);
        }
    }

    let direct_ctx = Arc::new(BranchContext::new(graph.clone(), 0));
    let mut direct_root = TspBranchTask::root(Arc::clone(&direct_ctx));
    let mut direct = DirectRunner::new();
    direct.run(&mut direct_root);
    let tour = direct_ctx.best().expect("direct run records a tour");
    println!("direct: {tour} t:{}", direct.duration());

    let partitioned_ctx = Arc::new(BranchContext::new(graph, 0));
    let mut partitioned_root = TspBranchTask::root(Arc::clone(&partitioned_ctx));
    let mut partitioned = PartitionedRunner::new(MAX_CITIES);
    partitioned.run(&mut partitioned_root);
    let tour = partitioned_ctx
        .best()
        .expect("partitioned run records a tour");
    println!(
        "partit: {tour} t:{} r:{}",
        partitioned.duration(),
        partitioned.solve_ratio()
    );
}
