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

//! This module provides some utilities to write unit tests: the task graphs
//! used as fixtures throughout the crate and an exhaustive solver used to
//! check the bounds and the search engines against ground truth.
#![cfg(test)]

use crate::*;

/// Builds a graph from `(label, weight)` tasks and `(from, to, weight)` edges
pub fn graph(name: &str, tasks: &[(&str, isize)], edges: &[(&str, &str, isize)]) -> TaskGraph {
    let mut builder = GraphBuilder::new(name);
    for (label, weight) in tasks {
        builder.add_task(*label, *weight).unwrap();
    }
    for (from, to, weight) in edges {
        builder.add_edge(from, to, *weight).unwrap();
    }
    builder.build().unwrap()
}

/// A -> B -> C -> D -> E. Its optimal makespan is 12 whatever the number
/// of processors.
pub fn chain() -> TaskGraph {
    graph(
        "chain",
        &[("A", 2), ("B", 3), ("C", 1), ("D", 4), ("E", 2)],
        &[("A", "B", 1), ("B", "C", 3), ("C", "D", 2), ("D", "E", 1)],
    )
}

/// Optimal makespan: 40 on 1 processor, 28 on 2, 22 on 4.
pub fn out_tree_7() -> TaskGraph {
    graph(
        "Nodes_7_OutTree",
        &[("0", 5), ("1", 6), ("2", 5), ("3", 6), ("4", 4), ("5", 7), ("6", 7)],
        &[
            ("0", "1", 15),
            ("0", "2", 11),
            ("0", "3", 11),
            ("1", "4", 19),
            ("1", "5", 4),
            ("1", "6", 21),
        ],
    )
}

/// Optimal makespan: 640 on 1 processor, 350 on 2, 227 on 4.
pub fn out_tree_11() -> TaskGraph {
    graph(
        "Nodes_11_OutTree",
        &[
            ("0", 50),
            ("1", 70),
            ("2", 90),
            ("3", 100),
            ("4", 40),
            ("5", 20),
            ("6", 100),
            ("7", 80),
            ("8", 50),
            ("9", 20),
            ("10", 20),
        ],
        &[
            ("0", "1", 9),
            ("0", "2", 7),
            ("0", "3", 4),
            ("1", "4", 10),
            ("1", "5", 7),
            ("1", "6", 5),
            ("2", "7", 5),
            ("2", "8", 3),
            ("2", "9", 10),
            ("3", "10", 4),
        ],
    )
}

/// a fans out to b, c, d, e which all join into f. Optimal makespan: 19 on
/// 1 processor, 14 on 2 or more.
pub fn fork_join() -> TaskGraph {
    graph(
        "fork_join",
        &[("a", 3), ("b", 4), ("c", 2), ("d", 5), ("e", 3), ("f", 2)],
        &[
            ("a", "b", 2),
            ("a", "c", 1),
            ("a", "d", 3),
            ("a", "e", 4),
            ("b", "f", 3),
            ("c", "f", 1),
            ("d", "f", 2),
            ("e", "f", 2),
        ],
    )
}

/// a and b both feed c, b also feeds d. Optimal makespan: 8 on 1
/// processor, 6 on 2 or more.
pub fn small() -> TaskGraph {
    graph(
        "small",
        &[("a", 2), ("b", 3), ("c", 2), ("d", 1)],
        &[("a", "c", 2), ("b", "c", 1), ("b", "d", 3)],
    )
}

/// Tasks without any precedence constraint, labelled t0, t1, ...
pub fn independent(weights: &[isize]) -> TaskGraph {
    let labels = (0..weights.len()).map(|i| format!("t{i}")).collect::<Vec<_>>();
    let tasks = labels.iter().map(String::as_str).zip(weights.iter().copied()).collect::<Vec<_>>();
    graph("independent", &tasks, &[])
}

/// A pseudo random DAG: edges only go from lower to higher indices.
pub fn random_dag(seed: u64, nb_tasks: usize, density: u64) -> TaskGraph {
    let mut rng = seed.max(1);
    let mut next = move || {
        // xorshift64
        rng ^= rng << 13;
        rng ^= rng >> 7;
        rng ^= rng << 17;
        rng
    };
    let mut builder = GraphBuilder::new(format!("random_{seed}"));
    for i in 0..nb_tasks {
        builder.add_task(format!("{i}"), 1 + (next() % 9) as isize).unwrap();
    }
    for to in 1..nb_tasks {
        for from in 0..to {
            if next() % 100 < density {
                builder.add_edge(&format!("{from}"), &format!("{to}"), (next() % 6) as isize).unwrap();
            }
        }
    }
    builder.build().unwrap()
}

/// The makespan of an optimal completion of `state`, found by enumerating
/// every ready task on every processor. Only usable on tiny graphs.
pub fn brute_force(graph: &TaskGraph, state: &PartialSchedule) -> usize {
    if state.is_complete() {
        return state.latest_end_time();
    }
    let mut best = usize::MAX;
    for task in state.ready() {
        for processor in 0..state.nb_processors() {
            let child = state.extend(graph, task, processor);
            best = best.min(brute_force(graph, &child));
        }
    }
    best
}

/// Visits `state` and every state reachable from it by extension.
pub fn visit_all(graph: &TaskGraph, state: &PartialSchedule, f: &mut dyn FnMut(&PartialSchedule)) {
    f(state);
    for task in state.ready() {
        for processor in 0..state.nb_processors() {
            visit_all(graph, &state.extend(graph, task, processor), f);
        }
    }
}
