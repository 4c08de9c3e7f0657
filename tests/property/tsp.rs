//! TSP properties: the engine's answer equals a brute-force reference,
//! the parallel and sequential answers agree, and the incumbent never
//! ends above the naive-tour bound.

use std::sync::Arc;

use proptest::prelude::*;

use tsp_rs::{
    BranchContext, DirectRunner, ParallelRunner, TspBranchTask, TspGraph, TspPath,
};

const PROPTEST_CASES: u32 = 24;

/// First ten cities of the classic berlin52 instance, in TSPLIB form.
const BERLIN10: &str = "\
NAME: berlin10
TYPE: TSP
DIMENSION: 10
EDGE_WEIGHT_TYPE: EUC_2D
NODE_COORD_SECTION
1 565.0 575.0
2 25.0 185.0
3 345.0 750.0
4 945.0 685.0
5 845.0 655.0
6 880.0 660.0
7 25.0 230.0
8 525.0 1000.0
9 580.0 1175.0
10 650.0 1130.0
EOF
";

/// Exhaustive minimum over all tours `0, perm(1..n), 0`.
fn brute_force(graph: &TspGraph) -> u32 {
    fn recurse(graph: &TspGraph, cities: &mut Vec<usize>, k: usize, best: &mut u32) {
        if k == cities.len() {
            let mut distance = graph.distance(0, cities[0]);
            for pair in cities.windows(2) {
                distance += graph.distance(pair[0], pair[1]);
            }
            distance += graph.distance(*cities.last().unwrap(), 0);
            *best = (*best).min(distance);
            return;
        }
        for i in k..cities.len() {
            cities.swap(k, i);
            recurse(graph, cities, k + 1, best);
            cities.swap(k, i);
        }
    }

    let mut cities: Vec<usize> = (1..graph.size()).collect();
    let mut best = u32::MAX;
    recurse(graph, &mut cities, 0, &mut best);
    best
}

fn naive_bound(graph: &TspGraph) -> u32 {
    let mut tour = TspPath::new();
    for city in 1..graph.size() {
        tour.push(city, graph);
    }
    tour.push(0, graph);
    tour.distance()
}

/// Eight workers on a real TSPLIB instance find the same optimum as
/// exhaustive enumeration.
#[test]
fn eight_threads_on_berlin10_find_the_optimum() {
    let graph = TspGraph::parse(std::io::Cursor::new(BERLIN10), "berlin10")
        .expect("valid TSPLIB subset");
    assert_eq!(graph.size(), 10);
    let expected = brute_force(&graph);

    let ctx = Arc::new(BranchContext::new(graph, 3));
    let mut runner = ParallelRunner::new(8);
    runner.run(Box::new(TspBranchTask::root(Arc::clone(&ctx))));

    assert_eq!(ctx.best_distance(), expected);
    let tour = ctx.best().expect("a tour was recorded");
    assert_eq!(tour.distance(), expected);
    assert!(runner.is_quiescent());
}

fn coords_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0u32..50, 0u32..50), 3..=7)
        .prop_map(|points| points.into_iter().map(|(x, y)| (x as f64, y as f64)).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(crate::proptest_cases(PROPTEST_CASES)))]

    /// The sequential solver finds the optimum.
    #[test]
    fn direct_solver_is_optimal(coords in coords_strategy()) {
        let graph = TspGraph::from_coords(coords, "random");
        let expected = brute_force(&graph);

        let ctx = Arc::new(BranchContext::new(graph, 0));
        let mut root = TspBranchTask::root(Arc::clone(&ctx));
        DirectRunner::new().run(&mut root);

        prop_assert_eq!(ctx.best_distance(), expected);
        let tour = ctx.best().expect("a tour was recorded");
        prop_assert_eq!(tour.distance(), expected);
        // A complete closed tour: every city once, 0 at both ends.
        prop_assert_eq!(tour.len(), ctx.graph().size() + 1);
    }

    /// The parallel runner agrees with the brute-force optimum for any
    /// thread count and cutoff.
    #[test]
    fn parallel_equals_sequential_optimum(
        coords in coords_strategy(),
        threads in 1usize..5,
        cutoff in 0usize..4,
    ) {
        let graph = TspGraph::from_coords(coords, "random");
        let expected = brute_force(&graph);

        let ctx = Arc::new(BranchContext::new(graph, cutoff));
        let mut runner = ParallelRunner::new(threads);
        runner.run(Box::new(TspBranchTask::root(Arc::clone(&ctx))));

        prop_assert_eq!(ctx.best_distance(), expected);
        prop_assert!(runner.is_quiescent());
    }

    /// After any run that split at least once, the incumbent is at most
    /// the naive-tour bound.
    #[test]
    fn incumbent_never_exceeds_naive_bound(coords in coords_strategy()) {
        let graph = TspGraph::from_coords(coords, "random");
        let bound = naive_bound(&graph);

        let ctx = Arc::new(BranchContext::new(graph, 2));
        let mut runner = ParallelRunner::new(2);
        runner.run(Box::new(TspBranchTask::root(Arc::clone(&ctx))));

        prop_assert!(ctx.best_distance() <= bound);
    }
}
