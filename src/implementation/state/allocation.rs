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

//! This module provides the `Allocation`: the state explored during the first
//! phase of the allocation-ordering search. An allocation decides on which
//! processor each task runs, without deciding when. Tasks are allocated in
//! index order, so the `n` first tasks of a graph are allocated in a state of
//! depth `n`.

use crate::{average_load, combined_bound, critical_path_heuristic, BitSet, ProcessorLoad, TaskGraph};

/// A (possibly partial) assignment of tasks to processors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    nb_tasks: usize,
    /// The tasks assigned to each processor
    processors: Vec<BitSet>,
    loads: Vec<ProcessorLoad>,
    /// The processor of each allocated task, by task index
    task_processor: Vec<usize>,
    max_processor_weight: usize,
    non_empty_processors: usize,
    estimate: usize,
    reduce_symmetry: bool,
}

impl Allocation {
    /// The empty allocation of `graph` on `nb_processors` processors, with
    /// symmetry reduction.
    ///
    /// # Panics
    /// When `nb_processors` is zero or exceeds `BitSet::CAPACITY`.
    pub fn new(graph: &TaskGraph, nb_processors: usize) -> Self {
        Self::with_symmetry_reduction(graph, nb_processors, true)
    }
    pub fn with_symmetry_reduction(graph: &TaskGraph, nb_processors: usize, enabled: bool) -> Self {
        assert!(
            (1..=BitSet::CAPACITY).contains(&nb_processors),
            "cannot allocate on {nb_processors} processors"
        );
        Allocation {
            nb_tasks: graph.nb_tasks(),
            processors: vec![BitSet::empty(); nb_processors],
            loads: vec![ProcessorLoad::EMPTY; nb_processors],
            task_processor: Vec::with_capacity(graph.nb_tasks()),
            max_processor_weight: 0,
            non_empty_processors: 0,
            estimate: average_load(graph.total_weight(), 0, nb_processors),
            reduce_symmetry: enabled,
        }
    }

    pub fn nb_processors(&self) -> usize {
        self.processors.len()
    }
    /// The number of tasks that have been allocated so far
    pub fn allocation_count(&self) -> usize {
        self.task_processor.len()
    }
    pub fn is_complete(&self) -> bool {
        self.task_processor.len() == self.nb_tasks
    }
    /// The task the next extension allocates
    pub fn next_task(&self) -> Option<usize> {
        if self.is_complete() {
            None
        } else {
            Some(self.task_processor.len())
        }
    }
    pub fn processor_of(&self, task: usize) -> Option<usize> {
        self.task_processor.get(task).copied()
    }
    pub fn tasks_on(&self, processor: usize) -> BitSet {
        self.processors[processor]
    }
    /// The total weight of the tasks allocated to the processor
    pub fn weight_of(&self, processor: usize) -> usize {
        self.loads[processor].weight
    }
    pub fn max_processor_weight(&self) -> usize {
        self.max_processor_weight
    }
    pub fn non_empty_processors(&self) -> usize {
        self.non_empty_processors
    }
    /// An admissible lower bound on the makespan of any schedule that
    /// follows this allocation (or any of its extensions)
    pub fn estimate(&self) -> usize {
        self.estimate
    }
    /// The processors the next task may be allocated to. With symmetry
    /// reduction, these are the non-empty processors plus one empty one.
    pub fn candidate_processors(&self) -> usize {
        if self.reduce_symmetry {
            self.processors.len().min(self.non_empty_processors + 1)
        } else {
            self.processors.len()
        }
    }

    /// Returns a new allocation where the next task runs on `processor`.
    ///
    /// # Panics
    /// When the allocation is complete or the processor does not exist.
    pub fn extend(&self, graph: &TaskGraph, processor: usize) -> Self {
        let task = match self.next_task() {
            Some(task) => task,
            None => panic!("all tasks are already allocated"),
        };
        assert!(processor < self.processors.len(), "there is no processor {processor}");
        let info = graph.task(task);

        let mut child = self.clone();
        if child.processors[processor].is_empty() {
            child.non_empty_processors += 1;
        }
        child.processors[processor] = child.processors[processor].with(task);
        child.loads[processor] = child.loads[processor].with(info);
        child.task_processor.push(processor);
        child.max_processor_weight = child.max_processor_weight.max(child.loads[processor].weight);
        child.estimate = self
            .estimate
            .max(child.max_processor_weight)
            .max(child.loads[processor].lower_bound())
            .max(info.top_level() + info.bottom_level());
        child
    }

    /// All the allocations of the next task to a candidate processor
    pub fn children<'a>(&'a self, graph: &'a TaskGraph) -> impl Iterator<Item = Allocation> + 'a {
        let processors = if self.is_complete() { 0 } else { self.candidate_processors() };
        (0..processors).map(move |p| self.extend(graph, p))
    }

    /// Recomputes the combined bound of this allocation from scratch
    pub fn lower_bound(&self, graph: &TaskGraph) -> usize {
        let loads = self
            .processors
            .iter()
            .map(|tasks| ProcessorLoad::of(graph, *tasks))
            .collect::<Vec<_>>();
        let allocated = self.processors.iter().fold(BitSet::empty(), |all, tasks| all | *tasks);
        combined_bound(self.max_processor_weight, &loads, critical_path_heuristic(graph, allocated))
            .max(average_load(graph.total_weight(), 0, self.processors.len()))
    }
}

#[cfg(test)]
mod test_allocation {
    use crate::*;
    use crate::test_utils::*;

    fn count_complete(graph: &TaskGraph, allocation: &Allocation) -> usize {
        if allocation.is_complete() {
            1
        } else {
            allocation.children(graph).map(|c| count_complete(graph, &c)).sum()
        }
    }

    #[test]
    fn the_empty_allocation() {
        let graph = out_tree_7();
        let root = Allocation::new(&graph, 2);
        assert_eq!(0, root.allocation_count());
        assert_eq!(Some(0), root.next_task());
        assert_eq!(1, root.candidate_processors());
        assert_eq!(0, root.max_processor_weight());
        // ceil(40 / 2)
        assert_eq!(20, root.estimate());
    }
    #[test]
    fn tasks_are_allocated_in_index_order() {
        let graph = out_tree_7();
        let state = Allocation::new(&graph, 2).extend(&graph, 0).extend(&graph, 1).extend(&graph, 0);
        assert_eq!(3, state.allocation_count());
        assert_eq!(Some(3), state.next_task());
        assert_eq!(Some(0), state.processor_of(0));
        assert_eq!(Some(1), state.processor_of(1));
        assert_eq!(Some(0), state.processor_of(2));
        assert_eq!(None, state.processor_of(3));
        assert_eq!(vec![0, 2], state.tasks_on(0).iter().collect::<Vec<_>>());
        assert_eq!(10, state.weight_of(0));
        assert_eq!(6, state.weight_of(1));
        assert_eq!(10, state.max_processor_weight());
        assert_eq!(2, state.non_empty_processors());
    }
    #[test]
    fn extending_leaves_the_parent_untouched() {
        let graph = out_tree_7();
        let root = Allocation::new(&graph, 2);
        let snapshot = root.clone();
        let child = root.extend(&graph, 0);
        assert_eq!(snapshot, root);
        assert_eq!(child, root.extend(&graph, 0));
    }
    #[test]
    #[should_panic]
    fn extending_a_complete_allocation_panics() {
        let graph = independent(&[1]);
        let _ = Allocation::new(&graph, 1).extend(&graph, 0).extend(&graph, 0);
    }
    #[test]
    fn symmetry_reduction_enumerates_each_partition_once() {
        let graph = independent(&[1, 2, 3, 4]);
        // S(4,1) + S(4,2)
        assert_eq!(8, count_complete(&graph, &Allocation::new(&graph, 2)));
        // the Bell number B(4)
        assert_eq!(15, count_complete(&graph, &Allocation::new(&graph, 4)));
        assert_eq!(16, count_complete(&graph, &Allocation::with_symmetry_reduction(&graph, 2, false)));
    }
    #[test]
    fn the_estimate_combines_weight_load_and_critical_path() {
        let graph = chain();
        let state = Allocation::new(&graph, 4).extend(&graph, 0);
        // A alone: top 0 + weight 2 + tail 10
        assert_eq!(12, state.estimate());
        assert_eq!(12, state.lower_bound(&graph));
    }
    #[test]
    fn the_heaviest_processor_bounds_the_makespan() {
        let graph = independent(&[5, 4, 3]);
        let state = Allocation::new(&graph, 3).extend(&graph, 0).extend(&graph, 0).extend(&graph, 0);
        assert_eq!(12, state.max_processor_weight());
        assert_eq!(12, state.estimate());
        assert!(state.is_complete());
        assert_eq!(0, state.children(&graph).count());
    }
    #[test]
    fn the_recomputed_bound_never_exceeds_the_estimate() {
        let graph = out_tree_11();
        let mut stack = vec![Allocation::new(&graph, 3)];
        let mut seen = 0;
        while let Some(state) = stack.pop() {
            assert!(state.lower_bound(&graph) <= state.estimate());
            seen += 1;
            if seen < 2_000 {
                stack.extend(state.children(&graph));
            }
        }
    }
}
