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

//! This module provides the admissible lower bounds on the makespan which are
//! used to prune the search. None of them ever exceeds the makespan of the
//! best schedule that completes the state it is computed for.

use crate::{BitSet, Task, TaskGraph};

/// The summary of the tasks allocated to one processor that the load
/// heuristic needs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ProcessorLoad {
    /// The total weight of the tasks
    pub weight: usize,
    /// The smallest top level among the tasks
    pub min_top_level: usize,
    /// The smallest tail (bottom level minus weight) among the tasks
    pub min_tail: usize,
}
impl Default for ProcessorLoad {
    fn default() -> Self {
        Self::EMPTY
    }
}
impl ProcessorLoad {
    pub const EMPTY: ProcessorLoad = ProcessorLoad {
        weight: 0,
        min_top_level: usize::MAX,
        min_tail: usize::MAX,
    };

    pub fn is_empty(&self) -> bool {
        self.weight == 0
    }
    /// The load of this processor once it also runs `task`
    pub fn with(&self, task: &Task) -> Self {
        ProcessorLoad {
            weight: self.weight + task.weight(),
            min_top_level: self.min_top_level.min(task.top_level()),
            min_tail: self.min_tail.min(task.tail()),
        }
    }
    /// The load of a processor running exactly the given tasks
    pub fn of(graph: &TaskGraph, tasks: BitSet) -> Self {
        tasks.iter().fold(Self::EMPTY, |load, t| load.with(graph.task(t)))
    }
    /// The load heuristic: a processor cannot start before the smallest top
    /// level of its tasks, must then run all of them, and the last of them is
    /// followed by at least the smallest tail among them.
    pub fn lower_bound(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.min_top_level + self.weight + self.min_tail
        }
    }
}

/// The largest load heuristic over all processors
pub fn load_heuristic(loads: &[ProcessorLoad]) -> usize {
    loads.iter().map(ProcessorLoad::lower_bound).max().unwrap_or(0)
}

/// The critical path heuristic: the largest `bottom level + top level` of
/// the given tasks.
pub fn critical_path_heuristic(graph: &TaskGraph, tasks: BitSet) -> usize {
    tasks
        .iter()
        .map(|t| {
            let task = graph.task(t);
            task.bottom_level() + task.top_level()
        })
        .max()
        .unwrap_or(0)
}

/// The work of all tasks plus the idle time already committed, spread
/// evenly over all processors.
pub fn average_load(total_weight: usize, idle_time: usize, nb_processors: usize) -> usize {
    let work = total_weight + idle_time;
    (work + nb_processors - 1) / nb_processors
}

/// The bound used to prune allocations: the max of the heaviest processor,
/// the load heuristic and the critical path heuristic.
pub fn combined_bound(max_processor_weight: usize, loads: &[ProcessorLoad], critical_path: usize) -> usize {
    max_processor_weight.max(load_heuristic(loads)).max(critical_path)
}
