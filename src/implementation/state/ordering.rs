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

//! This module provides the `OrderingState`: the state explored during the
//! second phase of the allocation-ordering search. Given a complete
//! allocation, it decides in which order the tasks of each processor run.

use crate::{Allocation, BitSet, Fingerprint, PartialSchedule, TaskGraph};

/// A partial schedule whose tasks can only be placed on the processor the
/// allocation assigned them to.
///
/// A task is ready once all of its parents are scheduled: its predecessors
/// on the same processor are then already appended before it, and those on
/// other processors have a known completion time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingState<'a> {
    allocation: &'a Allocation,
    schedule: PartialSchedule,
    /// The weight of the tasks of each processor that are not scheduled yet
    remaining: Vec<usize>,
    estimate: usize,
}

impl<'a> OrderingState<'a> {
    /// # Panics
    /// When the allocation is not complete.
    pub fn new(graph: &TaskGraph, allocation: &'a Allocation) -> Self {
        assert!(allocation.is_complete(), "only complete allocations can be ordered");
        let nb_processors = allocation.nb_processors();
        let schedule = PartialSchedule::with_symmetry_reduction(graph, nb_processors, false);
        let remaining = (0..nb_processors).map(|p| allocation.weight_of(p)).collect::<Vec<_>>();
        let estimate = allocation.estimate().max(schedule.estimated_makespan());
        OrderingState { allocation, schedule, remaining, estimate }
    }

    pub fn allocation(&self) -> &'a Allocation {
        self.allocation
    }
    pub fn schedule(&self) -> &PartialSchedule {
        &self.schedule
    }
    pub fn ready(&self) -> BitSet {
        self.schedule.ready()
    }
    pub fn is_complete(&self) -> bool {
        self.schedule.is_complete()
    }
    pub fn makespan(&self) -> usize {
        self.schedule.latest_end_time()
    }
    /// An admissible lower bound on the makespan of any completion of this
    /// ordering. Besides the bounds of the partial schedule, no processor can
    /// complete before it has run all the tasks still allocated to it.
    pub fn estimate(&self) -> usize {
        self.estimate
    }
    pub fn fingerprint(&self) -> Fingerprint {
        self.schedule.fingerprint()
    }

    /// Appends `task` to the processor it is allocated to.
    ///
    /// # Panics
    /// When the task is not ready.
    pub fn extend(&self, graph: &TaskGraph, task: usize) -> Self {
        let processor = match self.allocation.processor_of(task) {
            Some(p) => p,
            None => panic!("task {task} is not allocated"),
        };
        let schedule = self.schedule.extend(graph, task, processor);
        let mut remaining = self.remaining.clone();
        remaining[processor] -= graph.task(task).weight();
        let estimate = self
            .estimate
            .max(schedule.estimated_makespan())
            .max(schedule.processor_end_time(processor) + remaining[processor]);
        OrderingState { allocation: self.allocation, schedule, remaining, estimate }
    }

    /// All the states obtained by appending one ready task
    pub fn children<'s>(&'s self, graph: &'s TaskGraph) -> impl Iterator<Item = OrderingState<'a>> + 's {
        self.ready().iter().map(move |task| self.extend(graph, task))
    }
}
