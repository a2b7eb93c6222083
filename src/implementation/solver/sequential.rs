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

//! This module provides the implementation of a sequential branch-and-bound
//! scheduler. That is a scheduler that explores the space of partial
//! schedules using one single thread of execution.
//!
//! The order of the exploration is decided by its frontier: with a
//! `DepthFirstFrontier` it performs a depth-first search whose memory stays
//! proportional to the depth of the search; with a `BestFirstFrontier` it
//! performs a best-first (A*) search which stops as soon as the most
//! promising open state cannot beat the best known schedule.
use std::marker::PhantomData;

use crate::{
    BestFirstFrontier, Completion, Cutoff, DepthFirstFrontier, Error, Frontier, NoCutoff,
    PartialSchedule, Schedule, Scheduler, SolverConfig, Status, TaskGraph,
};

use super::shared::{visit, Counters, Progress, Visit};

/// A single threaded scheduler, generic over the frontier deciding the order
/// in which states are explored.
///
/// # Example Usage
/// ```
/// # use optsched::*;
/// let mut builder = GraphBuilder::new("example");
/// builder.add_task("a", 2)?;
/// builder.add_task("b", 3)?;
/// builder.add_task("c", 3)?;
/// builder.add_edge("a", "b", 1)?;
/// builder.add_edge("a", "c", 1)?;
/// let graph = builder.build()?;
///
/// let solver = DepthFirstSolver::new(SolverConfig::default());
/// let outcome = solver.schedule(&graph, 2)?;
///
/// assert!(outcome.is_exact);
/// assert_eq!(6, outcome.makespan);
/// assert_eq!(Status::Scheduled, solver.status());
/// # Ok::<(), Error>(())
/// ```
pub struct SequentialSolver<'a, F = DepthFirstFrontier> {
    config: SolverConfig,
    /// A cutoff heuristic meant to decide when to stop the search
    cutoff: &'a (dyn Cutoff + Send + Sync),
    progress: Progress,
    name: &'static str,
    _frontier: PhantomData<fn() -> F>,
}

/// The sequential depth-first scheduler
pub type DepthFirstSolver<'a> = SequentialSolver<'a, DepthFirstFrontier>;
/// The sequential best-first (A*) scheduler
pub type BestFirstSolver<'a> = SequentialSolver<'a, BestFirstFrontier>;

impl<'a, F: Frontier + Default> SequentialSolver<'a, F> {
    pub fn new(config: SolverConfig) -> Self {
        Self::custom(config, &NoCutoff)
    }
    pub fn custom(config: SolverConfig, cutoff: &'a (dyn Cutoff + Send + Sync)) -> Self {
        let name = if F::default().is_best_first() { "best-first" } else { "depth-first" };
        SequentialSolver { config, cutoff, progress: Progress::default(), name, _frontier: PhantomData }
    }
}

impl<F: Frontier + Default> Scheduler for SequentialSolver<'_, F> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn schedule(&self, graph: &TaskGraph, nb_processors: usize) -> Result<Completion, Error> {
        let start = self.progress.begin(self.name, &self.config, graph, nb_processors)?;
        let incumbent = &self.progress.incumbent;
        let closed = self.config.new_closed_set();
        let mut frontier = F::default();
        let mut counters = Counters::default();
        let mut best = incumbent.bound();
        let mut since_sync = 0;
        let mut is_exact = true;

        let root = PartialSchedule::with_symmetry_reduction(graph, nb_processors, self.config.symmetry_reduction());
        closed.insert(root.fingerprint());
        frontier.push(root);

        while let Some(state) = frontier.pop() {
            if self.cutoff.must_stop() {
                is_exact = false;
                break;
            }
            let outcome = visit(graph, state, &mut best, incumbent, closed.as_ref(), &mut counters, |child| {
                frontier.push(child)
            });
            if outcome == Visit::Pruned && frontier.is_best_first() {
                // nothing left on the frontier can beat the best schedule
                counters.pruned += frontier.len() as u64;
                frontier.clear();
            }
            since_sync += 1;
            if since_sync >= self.config.sync_threshold() {
                counters.flush(&self.progress.stats);
                since_sync = 0;
            }
        }
        counters.flush(&self.progress.stats);
        Ok(self.progress.end(self.name, start, is_exact))
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
