//! Parallel TSP with a sequential comparison run, speedup and
//! efficiency report.

use std::env;
use std::process;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tsp_rs::{BranchContext, DirectRunner, ParallelRunner, TspBranchTask, TspGraph};

fn usage(exe: &str) -> ! {
    eprintln!("usage: {exe} <file.tsp> <num_cities> <num_threads> [cutoff]");
    eprintln!("example: {exe} example.tsp 12 8 3");
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let exe = args.first().map(String::as_str).unwrap_or("tsp_par");
    if args.len() < 4 || args.len() > 5 {
        usage(exe);
    }

    let Ok(num_cities) = args[2].parse::<usize>() else {
        usage(exe);
    };
    let Ok(threads_arg) = args[3].parse::<i64>() else {
        usage(exe);
    };
    let cutoff = match args.get(4) {
        Some(arg) => match arg.parse::<usize>() {
            Ok(cutoff) => cutoff,
            Err(_) => usage(exe),
        },
        None => 0,
    };
    // Zero or negative thread counts mean auto-detect.
    let threads = if threads_arg <= 0 { 0 } else { threads_arg as usize };

    println!("Loading TSP file: {}", args[1]);
    let mut graph = match TspGraph::from_file(&args[1]) {
        Ok(graph) => graph,
        Err(err) => {
            eprintln!("{}: {err}", args[1]);
            process::exit(1);
        }
    };
    if num_cities > 0 && num_cities < graph.size() {
        graph.resize(num_cities);
    }

    let mut runner = ParallelRunner::new(threads);
    println!("Graph size: {} cities", graph.size());
    println!("Using {} threads", runner.threads());
    println!("Cutoff: {cutoff}\n");

    let parallel_ctx = Arc::new(BranchContext::new(graph.clone(), cutoff));
    println!(
        "Running parallel version with {} threads...",
        runner.threads()
    );
    runner.run(Box::new(TspBranchTask::root(Arc::clone(&parallel_ctx))));
    let parallel_time = runner.duration();
    let parallel_best = parallel_ctx.best().expect("parallel run records a tour");

    println!("\n=== PARALLEL RESULTS ===");
    println!("Best distance: {}", parallel_best.distance());
    println!("Time: {parallel_time:.3} seconds");
    println!("Tasks processed: {}", runner.tasks_processed());
    println!("Tasks created: {}", runner.tasks_created());

    println!("\nRunning sequential version for comparison...");
    let sequential_ctx = Arc::new(BranchContext::new(graph, cutoff));
    let mut sequential_root = TspBranchTask::root(Arc::clone(&sequential_ctx));
    let mut sequential = DirectRunner::new();
    sequential.run(&mut sequential_root);
    let sequential_time = sequential.duration();
    let sequential_best = sequential_ctx.best().expect("sequential run records a tour");

    println!("\n=== SEQUENTIAL RESULTS ===");
    println!("Best distance: {}", sequential_best.distance());
    println!("Time: {sequential_time:.3} seconds");

    if parallel_best.distance() == sequential_best.distance() {
        println!("\nResults match: parallel solution is correct.");
    } else {
        println!("\nERROR: results don't match!");
        println!("Parallel: {}", parallel_best.distance());
        println!("Sequential: {}", sequential_best.distance());
    }

    if parallel_time > 0.0 && sequential_time > 0.0 {
        let speedup = sequential_time / parallel_time;
        let efficiency = speedup / runner.threads() as f64;
        println!("\n=== PERFORMANCE ===");
        println!("Speedup: {speedup:.2}x");
        println!("Efficiency: {:.2}%", efficiency * 100.0);
    }
}
