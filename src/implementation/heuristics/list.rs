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

//! This module provides a greedy list scheduler. It produces a valid (but
//! generally sub-optimal) schedule in a single pass, which the search engines
//! use as their first upper bound.

use crate::{PartialSchedule, TaskGraph};

/// Schedules the tasks one at a time in topological order. Each task is
/// appended to the processor on which it can start the earliest (the lowest
/// index wins ties).
#[derive(Debug, Default, Copy, Clone)]
pub struct ListScheduler;

impl ListScheduler {
    /// Returns a complete schedule of `graph` on `nb_processors` processors.
    ///
    /// # Panics
    /// When `nb_processors` is zero or exceeds `BitSet::CAPACITY`.
    pub fn schedule(graph: &TaskGraph, nb_processors: usize) -> PartialSchedule {
        let mut state = PartialSchedule::with_symmetry_reduction(graph, nb_processors, false);
        for &task in graph.topological_order() {
            let processor = (0..nb_processors)
                .min_by_key(|p| (state.earliest_start(graph, task, *p), *p))
                .unwrap_or(0);
            state = state.extend(graph, task, processor);
        }
        state
    }
}

#[cfg(test)]
mod test_list_scheduler {
    use crate::*;
    use crate::test_utils::*;

    #[test]
    fn the_list_schedule_is_complete_and_valid() {
        for graph in [chain(), small(), fork_join(), out_tree_7(), out_tree_11()] {
            for nb_processors in [1, 2, 4] {
                let state = ListScheduler::schedule(&graph, nb_processors);
                assert!(state.is_complete());
                assert_eq!(Ok(()), Schedule::from(&state).verify(&graph));
            }
        }
    }
    #[test]
    fn on_one_processor_there_is_no_idle_time() {
        let graph = out_tree_11();
        let state = ListScheduler::schedule(&graph, 1);
        assert_eq!(640, state.latest_end_time());
        assert_eq!(0, state.total_idle_time());
    }
    #[test]
    fn the_chain_stays_on_one_processor() {
        let graph = chain();
        let state = ListScheduler::schedule(&graph, 4);
        assert_eq!(12, state.latest_end_time());
        assert_eq!(1, state.non_empty_processors());
    }
    #[test]
    fn independent_tasks_are_spread() {
        let graph = independent(&[3, 5, 2, 4]);
        let state = ListScheduler::schedule(&graph, 2);
        // the order is t3, t2, t1, t0:
        // t3 -> P0 [0,4), t2 -> P1 [0,2), t1 -> P1 [2,7), t0 -> P0 [4,7)
        assert_eq!(7, state.latest_end_time());
        assert_eq!(2, state.non_empty_processors());
    }
    #[test]
    fn the_list_schedule_is_never_better_than_the_optimum() {
        assert!(ListScheduler::schedule(&out_tree_7(), 2).latest_end_time() >= 28);
        assert!(ListScheduler::schedule(&out_tree_7(), 4).latest_end_time() >= 22);
        assert!(ListScheduler::schedule(&out_tree_11(), 2).latest_end_time() >= 350);
        assert!(ListScheduler::schedule(&out_tree_11(), 4).latest_end_time() >= 227);
    }
}
