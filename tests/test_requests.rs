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

mod common;

use std::time::Duration;

use common::*;
use optsched::*;

#[test]
fn duplicate_task_labels_are_rejected() {
    let mut builder = GraphBuilder::new("g");
    builder.add_task("a", 1).unwrap();
    assert_eq!(Err(Error::DuplicateTask("a".to_string())), builder.add_task("a", 2));
}

#[test]
fn tasks_must_have_a_positive_weight() {
    let mut builder = GraphBuilder::new("g");
    assert_eq!(Err(Error::InvalidTaskWeight { label: "a".to_string(), weight: 0 }), builder.add_task("a", 0));
    assert!(matches!(builder.add_task("b", -3), Err(Error::InvalidTaskWeight { weight: -3, .. })));
}

#[test]
fn edges_must_connect_known_tasks_once() {
    let mut builder = GraphBuilder::new("g");
    builder.add_task("a", 1).unwrap();
    builder.add_task("b", 1).unwrap();
    assert!(matches!(builder.add_edge("a", "z", 1), Err(Error::DanglingEdge { .. })));
    assert!(matches!(builder.add_edge("a", "b", -1), Err(Error::InvalidEdgeWeight { weight: -1, .. })));
    assert_eq!(Ok(()), builder.add_edge("a", "b", 0));
    assert!(matches!(builder.add_edge("a", "b", 2), Err(Error::DuplicateEdge { .. })));
}

#[test]
fn cyclic_graphs_are_rejected_at_build_time() {
    let mut builder = GraphBuilder::new("g");
    for label in ["a", "b", "c"] {
        builder.add_task(label, 1).unwrap();
    }
    builder.add_edge("a", "b", 1).unwrap();
    builder.add_edge("b", "c", 1).unwrap();
    builder.add_edge("c", "b", 1).unwrap();
    assert!(matches!(builder.build(), Err(Error::Cycle(_))));
}

#[test]
fn a_graph_holds_at_most_32_tasks() {
    let mut builder = GraphBuilder::new("g");
    for i in 0..32 {
        builder.add_task(format!("t{i}"), 1).unwrap();
    }
    assert_eq!(Err(Error::TooManyTasks { count: 33, max: 32 }), builder.add_task("t32", 1));
}

#[test]
fn every_scheduler_rejects_invalid_processor_counts() {
    let graph = chain();
    for algorithm in ALGORITHMS {
        let solver = algorithm.scheduler(config(2));
        assert_eq!(Err(Error::NoProcessor), solver.schedule(&graph, 0));
        assert_eq!(Err(Error::TooManyProcessors { count: 33, max: 32 }), solver.schedule(&graph, 33));
        assert_eq!(Status::Idle, solver.status());
    }
}

#[test]
fn unknown_algorithms_are_rejected() {
    assert_eq!(Err(Error::UnknownAlgorithm("magic".to_string())), "magic".parse::<Algorithm>());
}

#[test]
fn a_zero_thread_configuration_is_rejected() {
    assert!(SolverConfigBuilder::default().nb_threads(0).build().is_err());
    assert!(SolverConfigBuilder::default().sync_threshold(0).build().is_err());
}

#[test]
fn a_cancelled_search_still_returns_a_valid_schedule() {
    let graph = out_tree_11();
    let token = CancellationToken::new();
    token.cancel();
    for algorithm in ALGORITHMS {
        let solver = algorithm.custom(config(2), &token);
        let outcome = solver.schedule(&graph, 4).unwrap();
        assert!(!outcome.is_exact, "{algorithm}");
        assert_eq!(Ok(()), outcome.schedule.verify(&graph), "{algorithm}");
        assert!(outcome.makespan >= 227, "{algorithm}");
    }
}

#[test]
fn a_generous_time_budget_does_not_prevent_optimality() {
    let graph = out_tree_7();
    let budget = TimeBudget::new(Duration::from_secs(60));
    for algorithm in ALGORITHMS {
        let solver = algorithm.custom(config(2), &budget);
        let outcome = solver.schedule(&graph, 2).unwrap();
        assert!(outcome.is_exact, "{algorithm}");
        assert_eq!(28, outcome.makespan, "{algorithm}");
    }
}

#[test]
fn a_scheduler_can_be_reused() {
    for algorithm in ALGORITHMS {
        let solver = algorithm.scheduler(config(2));
        assert_eq!(28, solver.schedule(&out_tree_7(), 2).unwrap().makespan);
        assert_eq!(12, solver.schedule(&chain(), 3).unwrap().makespan);
        assert_eq!(Some(12), solver.best_makespan());
    }
}
