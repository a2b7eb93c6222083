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

//! This module provides the implementation of a parallel branch-and-bound
//! scheduler that balances its load with work stealing.
//!
//! Each worker owns a LIFO deque: it pushes the children of the states it
//! expands on its own deque and pops them back, which makes every worker a
//! depth-first search of its own. When its deque runs dry, a worker steals a
//! batch of states from the opposite end of a sibling's deque. The best known
//! schedule is the only piece of mutable state that is shared by all workers
//! (the closed set aside).
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crossbeam::deque::{Steal, Stealer, Worker};
use crossbeam::utils::Backoff;
use tracing::debug;

use crate::{
    ClosedSet, Completion, Cutoff, Error, NoCutoff, PartialSchedule, Schedule, Scheduler,
    SolverConfig, Status, TaskGraph,
};

use super::shared::{visit, Counters, Progress, StopOnPanic};

/// The state which is shared among the many running threads
struct Shared<'a> {
    /// The (read only) task graph being scheduled
    graph: &'a TaskGraph,
    /// A cutoff heuristic meant to decide when to stop the search
    cutoff: &'a (dyn Cutoff + Send + Sync),
    /// The best known schedule and the statistics of the search
    progress: &'a Progress,
    /// The fingerprints of all the states that have been generated so far
    closed: Box<dyn ClosedSet>,
    /// The stealing end of the deque of every worker
    stealers: Vec<Stealer<PartialSchedule>>,
    /// The number of states that have been published and are not fully
    /// expanded yet.
    ///
    /// # Note
    /// This is the counter telling the difference between a worker which is
    /// momentarily starving and the end of the search. A child is counted
    /// *before* it gets published and its parent is only discounted once all
    /// of its children have been published. Hence, this counter can only
    /// reach zero when all deques are empty and no worker holds a state.
    pending: AtomicUsize,
    /// Set when all workers must stop at once (cutoff or panic)
    stop: AtomicBool,
    /// Set when the search was interrupted by the cutoff
    cut_off: AtomicBool,
    /// Number of states a worker pops between two refreshes of its bound
    sync_threshold: usize,
}

/// The outcome of a request for work
enum WorkLoad {
    /// There is no work left to be done: you can safely terminate
    Complete,
    /// The work must stop because of an external cutoff (or a sibling panic)
    Aborted,
    /// The item to process
    WorkItem { state: PartialSchedule },
}

/// The parallel work-stealing scheduler. It spawns `nb_threads` workers
/// (as configured in its `SolverConfig`) for the duration of each call
/// to `schedule`.
///
/// # Example Usage
/// ```
/// # use optsched::*;
/// let mut builder = GraphBuilder::new("diamond");
/// builder.add_task("a", 2)?;
/// builder.add_task("b", 3)?;
/// builder.add_task("c", 3)?;
/// builder.add_task("d", 2)?;
/// builder.add_edge("a", "b", 1)?;
/// builder.add_edge("a", "c", 1)?;
/// builder.add_edge("b", "d", 1)?;
/// builder.add_edge("c", "d", 1)?;
/// let graph = builder.build()?;
///
/// let config = SolverConfigBuilder::default().nb_threads(4).build().unwrap();
/// let solver = ParallelSolver::new(config);
/// let outcome = solver.schedule(&graph, 2)?;
/// assert_eq!(8, outcome.makespan);
/// # Ok::<(), Error>(())
/// ```
pub struct ParallelSolver<'a> {
    config: SolverConfig,
    cutoff: &'a (dyn Cutoff + Send + Sync),
    progress: Progress,
}

impl<'a> ParallelSolver<'a> {
    pub fn new(config: SolverConfig) -> Self {
        Self::custom(config, &NoCutoff)
    }
    pub fn custom(config: SolverConfig, cutoff: &'a (dyn Cutoff + Send + Sync)) -> Self {
        ParallelSolver { config, cutoff, progress: Progress::default() }
    }

    /// Consults the local deque, then the deques of the siblings to fetch a
    /// workload. Depending on the current state of the search, the workload
    /// can either be:
    ///
    ///   + Complete, when no state is pending anymore and all threads
    ///     should stop,
    ///   + Aborted, when the cutoff fired or a sibling died,
    ///   + WorkItem, when the thread successfully obtained a state to expand.
    fn get_workload(shared: &Shared, local: &Worker<PartialSchedule>, thread_id: usize) -> WorkLoad {
        let backoff = Backoff::new();
        let nb_workers = shared.stealers.len();
        loop {
            if shared.stop.load(Ordering::Acquire) {
                return WorkLoad::Aborted;
            }
            if shared.cutoff.must_stop() {
                shared.cut_off.store(true, Ordering::Release);
                shared.stop.store(true, Ordering::Release);
                return WorkLoad::Aborted;
            }
            if let Some(state) = local.pop() {
                return WorkLoad::WorkItem { state };
            }
            for k in 1..nb_workers {
                let victim = &shared.stealers[(thread_id + k) % nb_workers];
                if let Steal::Success(state) = victim.steal_batch_and_pop(local) {
                    return WorkLoad::WorkItem { state };
                }
            }
            if shared.pending.load(Ordering::Acquire) == 0 {
                return WorkLoad::Complete;
            }
            backoff.snooze();
        }
    }

    /// The loop of one worker: it keeps expanding states until there is no
    /// work left.
    fn work(shared: &Shared, local: Worker<PartialSchedule>, thread_id: usize) {
        let _guard = StopOnPanic(&shared.stop);
        let incumbent = &shared.progress.incumbent;
        let mut counters = Counters::default();
        let mut best = incumbent.bound();
        let mut since_sync = 0;
        let mut expanded = 0_u64;

        while let WorkLoad::WorkItem { state } = Self::get_workload(shared, &local, thread_id) {
            visit(shared.graph, state, &mut best, incumbent, shared.closed.as_ref(), &mut counters, |child| {
                shared.pending.fetch_add(1, Ordering::AcqRel);
                local.push(child);
            });
            shared.pending.fetch_sub(1, Ordering::AcqRel);

            expanded += 1;
            since_sync += 1;
            if since_sync >= shared.sync_threshold {
                best = best.min(incumbent.bound());
                counters.flush(&shared.progress.stats);
                since_sync = 0;
            }
        }
        counters.flush(&shared.progress.stats);
        debug!(worker = thread_id, states = expanded, "worker finished");
    }
}

impl Scheduler for ParallelSolver<'_> {
    fn name(&self) -> &'static str {
        "parallel"
    }

    /// Spawns `nb_threads` workers (long running threads); each of which will
    /// continually get a workload and process it until no state is pending.
    fn schedule(&self, graph: &TaskGraph, nb_processors: usize) -> Result<Completion, Error> {
        let start = self.progress.begin(self.name(), &self.config, graph, nb_processors)?;

        let workers = (0..self.config.nb_threads()).map(|_| Worker::new_lifo()).collect::<Vec<_>>();
        let stealers = workers.iter().map(Worker::stealer).collect::<Vec<_>>();
        let shared = Shared {
            graph,
            cutoff: self.cutoff,
            progress: &self.progress,
            closed: self.config.new_closed_set(),
            stealers,
            pending: AtomicUsize::new(1),
            stop: AtomicBool::new(false),
            cut_off: AtomicBool::new(false),
            sync_threshold: self.config.sync_threshold(),
        };

        let root = PartialSchedule::with_symmetry_reduction(graph, nb_processors, self.config.symmetry_reduction());
        shared.closed.insert(root.fingerprint());
        workers[0].push(root);

        std::thread::scope(|s| {
            for (thread_id, local) in workers.into_iter().enumerate() {
                let shared = &shared;
                s.spawn(move || Self::work(shared, local, thread_id));
            }
        });

        let is_exact = !shared.cut_off.load(Ordering::Acquire);
        Ok(self.progress.end(self.name(), start, is_exact))
    }

    fn status(&self) -> Status {
        self.progress.stats.status()
    }
    fn searched_count(&self) -> u64 {
        self.progress.stats.searched()
    }
    fn pruned_count(&self) -> u64 {
        self.progress.stats.pruned()
    }
    fn best_schedule(&self) -> Option<Schedule> {
        self.progress.incumbent.schedule()
    }
    fn best_makespan(&self) -> Option<usize> {
        self.progress.incumbent.makespan()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
