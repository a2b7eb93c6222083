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

//! This module provides the `PartialSchedule`: the state of the search space
//! explored by the depth-first, best-first and parallel engines.
//!
//! A partial schedule is immutable. Extending it with one more task yields a
//! brand new state and leaves the original untouched; the derived values
//! (ready set, end times, idle time, estimated makespan) are maintained
//! incrementally upon each extension.

use std::hash::{Hash, Hasher};

use fxhash::FxHasher;

use crate::{
    average_load, critical_path_heuristic, load_heuristic, BitSet, Fingerprint, IndexedSet,
    ProcessorLoad, Schedule, ScheduledTask, TaskGraph,
};

/// What a partial schedule knows about one processor
#[derive(Debug, Clone, PartialEq, Eq)]
struct ProcessorState {
    /// The completion time of the last task placed on the processor
    end_time: usize,
    tasks: BitSet,
    load: ProcessorLoad,
}
impl ProcessorState {
    const IDLE: ProcessorState = ProcessorState {
        end_time: 0,
        tasks: BitSet::empty(),
        load: ProcessorLoad::EMPTY,
    };
}

/// A set of tasks already given a processor and a start time.
///
/// # Symmetry reduction
/// All processors are identical, so placing the first task on processor 0 or
/// on processor 3 yields equivalent schedules. When symmetry reduction is
/// enabled, the candidate processors of a state are the processors already
/// running some task plus *one* empty processor. This only holds as long as
/// the state is extended on candidate processors (`candidate_processors`),
/// which keeps the non-empty processors a prefix of all processors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialSchedule {
    placements: Vec<Option<ScheduledTask>>,
    processors: Vec<ProcessorState>,
    scheduled: BitSet,
    ready: BitSet,
    latest_end_time: usize,
    estimated_makespan: usize,
    total_idle_time: usize,
    non_empty_processors: usize,
    reduce_symmetry: bool,
}

impl PartialSchedule {
    /// The empty schedule of `graph` on `nb_processors` processors, with
    /// symmetry reduction.
    ///
    /// # Panics
    /// When `nb_processors` is zero or exceeds `BitSet::CAPACITY`. The
    /// schedulers reject such requests before building any state.
    pub fn new(graph: &TaskGraph, nb_processors: usize) -> Self {
        Self::with_symmetry_reduction(graph, nb_processors, true)
    }
    /// The empty schedule of `graph` on `nb_processors` processors.
    pub fn with_symmetry_reduction(graph: &TaskGraph, nb_processors: usize, enabled: bool) -> Self {
        assert!(
            (1..=BitSet::CAPACITY).contains(&nb_processors),
            "cannot schedule on {nb_processors} processors"
        );
        PartialSchedule {
            placements: vec![None; graph.nb_tasks()],
            processors: vec![ProcessorState::IDLE; nb_processors],
            scheduled: BitSet::empty(),
            ready: graph.sources().bits(),
            latest_end_time: 0,
            estimated_makespan: average_load(graph.total_weight(), 0, nb_processors),
            total_idle_time: 0,
            non_empty_processors: 0,
            reduce_symmetry: enabled,
        }
    }

    // --- ACCESSORS ----------------------------------------------------------
    pub fn nb_tasks(&self) -> usize {
        self.placements.len()
    }
    pub fn nb_processors(&self) -> usize {
        self.processors.len()
    }
    pub fn placement(&self, task: usize) -> Option<ScheduledTask> {
        self.placements.get(task).copied().flatten()
    }
    /// The set of tasks that already have a placement
    pub fn scheduled(&self) -> BitSet {
        self.scheduled
    }
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }
    /// The unscheduled tasks whose parents are all scheduled
    pub fn ready(&self) -> BitSet {
        self.ready
    }
    /// The ready tasks, as a set that can be iterated over
    pub fn ready_tasks<'g>(&self, graph: &'g TaskGraph) -> IndexedSet<'g, TaskGraph> {
        IndexedSet::from_bits(self.ready, Some(graph))
    }
    pub fn is_complete(&self) -> bool {
        self.scheduled.len() == self.placements.len()
    }
    pub fn processor_end_time(&self, processor: usize) -> usize {
        self.processors[processor].end_time
    }
    pub fn tasks_on(&self, processor: usize) -> BitSet {
        self.processors[processor].tasks
    }
    pub fn load_of(&self, processor: usize) -> ProcessorLoad {
        self.processors[processor].load
    }
    /// The completion time of the last scheduled task (the makespan, once
    /// the schedule is complete)
    pub fn latest_end_time(&self) -> usize {
        self.latest_end_time
    }
    /// An admissible lower bound on the makespan of any completion of this
    /// schedule. For a complete schedule, it equals the makespan.
    pub fn estimated_makespan(&self) -> usize {
        self.estimated_makespan
    }
    /// The sum, over all processors, of the time they spent waiting before
    /// running their tasks
    pub fn total_idle_time(&self) -> usize {
        self.total_idle_time
    }
    pub fn non_empty_processors(&self) -> usize {
        self.non_empty_processors
    }
    pub fn reduces_symmetry(&self) -> bool {
        self.reduce_symmetry
    }
    /// The number of processors on which the next task may be placed. With
    /// symmetry reduction, that is at most the non-empty processors plus one.
    pub fn candidate_processors(&self) -> usize {
        if self.reduce_symmetry {
            self.processors.len().min(self.non_empty_processors + 1)
        } else {
            self.processors.len()
        }
    }

    // --- EXTENSION ----------------------------------------------------------
    /// The earliest time at which `task` could start on `processor`: once
    /// the processor is free and the data of every parent has arrived.
    pub fn earliest_start(&self, graph: &TaskGraph, task: usize, processor: usize) -> usize {
        let mut start = self.processors[processor].end_time;
        for edge in graph.incoming_edges(task) {
            if let Some(parent) = self.placements[edge.from] {
                let delay = if parent.processor == processor { 0 } else { edge.weight };
                start = start.max(parent.end + delay);
            }
        }
        start
    }

    /// Returns a new schedule in which `task` is appended to `processor` at
    /// its earliest start time.
    ///
    /// # Panics
    /// When `task` is not ready or `processor` does not exist.
    pub fn extend(&self, graph: &TaskGraph, task: usize, processor: usize) -> Self {
        assert!(self.ready.contains(task), "task {task} is not ready");
        assert!(processor < self.processors.len(), "there is no processor {processor}");

        let info = graph.task(task);
        let start = self.earliest_start(graph, task, processor);
        let end = start + info.weight();

        let mut child = self.clone();
        let target = &mut child.processors[processor];
        let idle = start - target.end_time;
        if target.tasks.is_empty() {
            child.non_empty_processors += 1;
        }
        target.end_time = end;
        target.tasks = target.tasks.with(task);
        target.load = target.load.with(info);
        let load_bound = target.load.lower_bound();

        child.placements[task] = Some(ScheduledTask { start, end, processor });
        child.scheduled = child.scheduled.with(task);
        child.ready = child.ready.without(task);
        for c in info.children() {
            if child.scheduled.contains_all(graph.task(c).parents()) {
                child.ready = child.ready.with(c);
            }
        }
        child.total_idle_time += idle;
        child.latest_end_time = child.latest_end_time.max(end);
        child.estimated_makespan = self
            .estimated_makespan
            .max(end)
            .max(start + info.bottom_level())
            .max(info.top_level() + info.bottom_level())
            .max(load_bound)
            .max(average_load(graph.total_weight(), child.total_idle_time, self.processors.len()));
        child
    }

    /// All the states obtained by placing one ready task on one candidate
    /// processor. Tasks are enumerated by increasing index, then processors.
    pub fn children<'a>(&'a self, graph: &'a TaskGraph) -> impl Iterator<Item = PartialSchedule> + 'a {
        let processors = self.candidate_processors();
        self.ready
            .iter()
            .flat_map(move |task| (0..processors).map(move |p| self.extend(graph, task, p)))
    }

    // --- BOUNDS AND IDENTITY ------------------------------------------------
    /// Recomputes from scratch the family of lower bounds that the estimated
    /// makespan maintains incrementally. It never exceeds the estimate.
    pub fn lower_bound(&self, graph: &TaskGraph) -> usize {
        let loads = self
            .processors
            .iter()
            .map(|p| ProcessorLoad::of(graph, p.tasks))
            .collect::<Vec<_>>();
        let from_start = self
            .placements
            .iter()
            .enumerate()
            .filter_map(|(t, p)| p.map(|p| p.start + graph.task(t).bottom_level()))
            .max()
            .unwrap_or(0);
        self.latest_end_time
            .max(from_start)
            .max(load_heuristic(&loads))
            .max(critical_path_heuristic(graph, self.scheduled))
            .max(average_load(graph.total_weight(), self.total_idle_time, self.processors.len()))
    }

    /// A digest of the placements of this schedule which does not depend on
    /// the numbering of the processors: they are relabelled by increasing
    /// index of the first task they run.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut order = self
            .processors
            .iter()
            .enumerate()
            .filter_map(|(p, state)| state.tasks.first().map(|first| (first, p)))
            .collect::<Vec<_>>();
        order.sort_unstable();

        let mut labels = [0_usize; BitSet::CAPACITY];
        for (label, (_, p)) in order.into_iter().enumerate() {
            labels[p] = label;
        }

        // the set of scheduled tasks comes first: a hasher starting from zero
        // would otherwise ignore a leading all-zero triple
        let mut hasher = FxHasher::default();
        self.scheduled.bitmap().hash(&mut hasher);
        for (task, placement) in self.placements.iter().enumerate() {
            if let Some(placed) = placement {
                (task, labels[placed.processor], placed.start).hash(&mut hasher);
            }
        }
        Fingerprint(hasher.finish())
    }
}

impl From<&PartialSchedule> for Schedule {
    /// Only meaningful for complete schedules: unscheduled tasks are skipped.
    fn from(state: &PartialSchedule) -> Self {
        debug_assert!(state.is_complete());
        Schedule::new(state.placements.iter().flatten().copied().collect(), state.nb_processors())
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
