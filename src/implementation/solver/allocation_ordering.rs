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

//! This module provides the implementation of the allocation-ordering
//! scheduler. It splits the decisions of the search in two phases:
//!
//!   1. the allocation phase enumerates (depth-first) the ways of assigning
//!      every task to a processor, pruning the allocations whose bound cannot
//!      beat the best known schedule;
//!   2. the ordering phase takes each complete allocation and enumerates
//!      (again depth-first) the orders in which the tasks of each processor
//!      can run.
//!
//! The allocations are produced on the calling thread. When the solver is
//! configured with more than one thread, they are handed to a pool of
//! workers through a bounded channel so that the orderings of many
//! allocations are searched concurrently.
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel;
use fxhash::FxHashSet;

use crate::{
    Allocation, Completion, Cutoff, Error, Fingerprint, NoCutoff, OrderingState, Schedule, Scheduler,
    SolverConfig, Status, TaskGraph,
};

use super::shared::{Counters, Progress, StopOnPanic};

/// The state which is shared by the allocating thread and the workers
struct Shared<'a> {
    graph: &'a TaskGraph,
    config: &'a SolverConfig,
    cutoff: &'a (dyn Cutoff + Send + Sync),
    progress: &'a Progress,
    /// Set when all threads must stop at once (cutoff or panic)
    stop: AtomicBool,
    /// Set when the search was interrupted by the cutoff
    cut_off: AtomicBool,
}
impl Shared<'_> {
    fn must_stop(&self) -> bool {
        if self.stop.load(Ordering::Acquire) {
            true
        } else if self.cutoff.must_stop() {
            self.cut_off.store(true, Ordering::Release);
            self.stop.store(true, Ordering::Release);
            true
        } else {
            false
        }
    }
}

/// The closed set of one ordering job. It is private to the job, hence
/// it needs no synchronisation.
struct JobClosedSet {
    enabled: bool,
    limit: Option<usize>,
    seen: FxHashSet<Fingerprint>,
}
impl JobClosedSet {
    fn new(config: &SolverConfig) -> Self {
        JobClosedSet { enabled: config.closed_set(), limit: config.closed_set_limit(), seen: FxHashSet::default() }
    }
    /// Returns true iff the fingerprint was never seen before
    fn insert(&mut self, fingerprint: Fingerprint) -> bool {
        if !self.enabled {
            true
        } else if self.limit.map_or(false, |limit| self.seen.len() >= limit) {
            !self.seen.contains(&fingerprint)
        } else {
            self.seen.insert(fingerprint)
        }
    }
}

/// The two-phase scheduler: allocate first, then order.
///
/// # Example Usage
/// ```
/// # use optsched::*;
/// let mut builder = GraphBuilder::new("fork");
/// builder.add_task("a", 2)?;
/// builder.add_task("b", 3)?;
/// builder.add_task("c", 3)?;
/// builder.add_edge("a", "b", 1)?;
/// builder.add_edge("a", "c", 1)?;
/// let graph = builder.build()?;
///
/// let solver = AllocationOrderingSolver::new(SolverConfig::default());
/// let outcome = solver.schedule(&graph, 2)?;
/// assert_eq!(6, outcome.makespan);
/// # Ok::<(), Error>(())
/// ```
pub struct AllocationOrderingSolver<'a> {
    config: SolverConfig,
    cutoff: &'a (dyn Cutoff + Send + Sync),
    progress: Progress,
}

impl<'a> AllocationOrderingSolver<'a> {
    pub fn new(config: SolverConfig) -> Self {
        Self::custom(config, &NoCutoff)
    }
    pub fn custom(config: SolverConfig, cutoff: &'a (dyn Cutoff + Send + Sync)) -> Self {
        AllocationOrderingSolver { config, cutoff, progress: Progress::default() }
    }

    /// Enumerates the complete allocations that may still beat the best
    /// known schedule and submits each of them for ordering.
    fn allocate(shared: &Shared, root: Allocation, mut submit: impl FnMut(Allocation)) {
        let incumbent = &shared.progress.incumbent;
        let mut counters = Counters::default();
        let mut since_sync = 0;
        let mut stack = vec![root];

        while let Some(allocation) = stack.pop() {
            if shared.must_stop() {
                break;
            }
            since_sync += 1;
            if since_sync >= shared.config.sync_threshold() {
                counters.flush(&shared.progress.stats);
                since_sync = 0;
            }

            let best = incumbent.bound();
            if allocation.estimate() >= best {
                counters.pruned += 1;
                continue;
            }
            counters.searched += 1;
            if allocation.is_complete() {
                submit(allocation);
                continue;
            }
            // reversed so that the lowest processor is explored first
            let children = allocation.children(shared.graph).collect::<Vec<_>>();
            for child in children.into_iter().rev() {
                if child.estimate() >= best {
                    counters.pruned += 1;
                } else {
                    stack.push(child);
                }
            }
        }
        counters.flush(&shared.progress.stats);
    }

    /// Searches the best ordering of one complete allocation
    fn order(shared: &Shared, allocation: &Allocation) {
        let graph = shared.graph;
        let incumbent = &shared.progress.incumbent;
        let mut counters = Counters::default();
        let mut closed = JobClosedSet::new(shared.config);
        let mut stack = vec![OrderingState::new(graph, allocation)];

        while let Some(state) = stack.pop() {
            if shared.must_stop() {
                break;
            }
            let best = incumbent.bound();
            if state.estimate() >= best {
                counters.pruned += 1;
                continue;
            }
            counters.searched += 1;
            if state.is_complete() {
                incumbent.offer(state.schedule());
                continue;
            }
            for child in state.children(graph) {
                if child.estimate() >= best || !closed.insert(child.fingerprint()) {
                    counters.pruned += 1;
                } else {
                    stack.push(child);
                }
            }
        }
        counters.flush(&shared.progress.stats);
    }
}

impl Scheduler for AllocationOrderingSolver<'_> {
    fn name(&self) -> &'static str {
        "allocation-ordering"
    }

    fn schedule(&self, graph: &TaskGraph, nb_processors: usize) -> Result<Completion, Error> {
        let start = self.progress.begin(self.name(), &self.config, graph, nb_processors)?;
        let shared = Shared {
            graph,
            config: &self.config,
            cutoff: self.cutoff,
            progress: &self.progress,
            stop: AtomicBool::new(false),
            cut_off: AtomicBool::new(false),
        };
        let root = Allocation::with_symmetry_reduction(graph, nb_processors, self.config.symmetry_reduction());
        let nb_threads = self.config.nb_threads();

        if nb_threads <= 1 {
            Self::allocate(&shared, root, |allocation| Self::order(&shared, &allocation));
        } else {
            let (sender, receiver) = channel::bounded::<Allocation>(2 * nb_threads);
            std::thread::scope(|s| {
                for _ in 0..nb_threads {
                    let shared = &shared;
                    let receiver = receiver.clone();
                    s.spawn(move || {
                        let _guard = StopOnPanic(&shared.stop);
                        for allocation in receiver {
                            Self::order(shared, &allocation);
                        }
                    });
                }
                drop(receiver);

                let _guard = StopOnPanic(&shared.stop);
                Self::allocate(&shared, root, |allocation| {
                    // fails only when every worker is gone
                    if sender.send(allocation).is_err() {
                        shared.stop.store(true, Ordering::Release);
                    }
                });
                drop(sender);
            });
        }

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
