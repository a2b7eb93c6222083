// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Task graphs shared by the integration tests, with their known optima.
#![allow(dead_code)]

use optsched::*;

pub fn graph(name: &str, tasks: &[(&str, isize)], edges: &[(&str, &str, isize)]) -> TaskGraph {
    let mut builder = GraphBuilder::new(name);
    for (label, weight) in tasks {
        builder.add_task(*label, *weight).expect("invalid task");
    }
    for (from, to, weight) in edges {
        builder.add_edge(from, to, *weight).expect("invalid edge");
    }
    builder.build().expect("invalid graph")
}

/// 12 on any number of processors
pub fn chain() -> TaskGraph {
    graph(
        "chain",
        &[("A", 2), ("B", 3), ("C", 1), ("D", 4), ("E", 2)],
        &[("A", "B", 1), ("B", "C", 3), ("C", "D", 2), ("D", "E", 1)],
    )
}

/// 40 on 1 processor, 28 on 2, 22 on 4
pub fn out_tree_7() -> TaskGraph {
    graph(
        "Nodes_7_OutTree",
        &[("0", 5), ("1", 6), ("2", 5), ("3", 6), ("4", 4), ("5", 7), ("6", 7)],
        &[("0", "1", 15), ("0", "2", 11), ("0", "3", 11), ("1", "4", 19), ("1", "5", 4), ("1", "6", 21)],
    )
}

/// 640 on 1 processor, 350 on 2, 227 on 4
pub fn out_tree_11() -> TaskGraph {
    graph(
        "Nodes_11_OutTree",
        &[
            ("0", 50), ("1", 70), ("2", 90), ("3", 100), ("4", 40), ("5", 20),
            ("6", 100), ("7", 80), ("8", 50), ("9", 20), ("10", 20),
        ],
        &[
            ("0", "1", 9), ("0", "2", 7), ("0", "3", 4), ("1", "4", 10), ("1", "5", 7),
            ("1", "6", 5), ("2", "7", 5), ("2", "8", 3), ("2", "9", 10), ("3", "10", 4),
        ],
    )
}

/// 19 on 1 processor, 14 on 2 or more
pub fn fork_join() -> TaskGraph {
    graph(
        "fork_join",
        &[("a", 3), ("b", 4), ("c", 2), ("d", 5), ("e", 3), ("f", 2)],
        &[
            ("a", "b", 2), ("a", "c", 1), ("a", "d", 3), ("a", "e", 4),
            ("b", "f", 3), ("c", "f", 1), ("d", "f", 2), ("e", "f", 2),
        ],
    )
}

/// A pseudo random DAG whose edges go from lower to higher indices
pub fn random_dag(seed: u64, nb_tasks: usize, density: u64) -> TaskGraph {
    let mut rng = seed.max(1);
    let mut next = move || {
        rng ^= rng << 13;
        rng ^= rng >> 7;
        rng ^= rng << 17;
        rng
    };
    let mut builder = GraphBuilder::new(format!("random_{seed}"));
    for i in 0..nb_tasks {
        builder.add_task(format!("n{i}"), 1 + (next() % 9) as isize).expect("invalid task");
    }
    for to in 1..nb_tasks {
        for from in 0..to {
            if next() % 100 < density {
                builder.add_edge(&format!("n{from}"), &format!("n{to}"), (next() % 6) as isize).expect("invalid edge");
            }
        }
    }
    builder.build().expect("invalid graph")
}

pub const ALGORITHMS: [Algorithm; 4] =
    [Algorithm::DepthFirst, Algorithm::BestFirst, Algorithm::Parallel, Algorithm::AllocationOrdering];

pub fn config(nb_threads: usize) -> SolverConfig {
    SolverConfigBuilder::default().nb_threads(nb_threads).build().expect("invalid config")
}

/// Schedules `graph` with the given algorithm, checks the outcome is a valid
/// and proven schedule and returns its makespan.
pub fn optimum(algorithm: Algorithm, graph: &TaskGraph, nb_processors: usize) -> usize {
    let solver = algorithm.scheduler(config(4));
    let outcome = solver.schedule(graph, nb_processors).expect("invalid request");
    assert!(outcome.is_exact, "{algorithm} did not prove optimality");
    assert_eq!(Ok(()), outcome.schedule.verify(graph), "{algorithm}");
    assert_eq!(outcome.makespan, outcome.schedule.makespan());
    assert_eq!(Status::Scheduled, solver.status());
    assert_eq!(Some(outcome.makespan), solver.best_makespan());
    outcome.makespan
}
