//! Print a parsed TSP instance: coordinates and distance matrix.

use std::env;
use std::process;

use tracing_subscriber::EnvFilter;

use tsp_rs::TspGraph;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = env::args();
    let exe = args.next().unwrap_or_else(|| "tsp_print".into());
    let Some(path) = args.next() else {
        eprintln!("usage: {exe} <file.tsp>");
        process::exit(1);
    };

    match TspGraph::from_file(&path) {
        Ok(graph) => println!("{graph}"),
        Err(err) => {
            eprintln!("{path}: {err}");
            process::exit(1);
        }
    }
}
