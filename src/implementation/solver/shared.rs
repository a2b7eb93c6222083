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

//! This module provides the bookkeeping that all search engines share: the
//! validation of a request, the best schedule found so far, the statistics of
//! the search and the expansion of one partial schedule.

use std::{
    sync::atomic::{AtomicBool, AtomicU64, AtomicU8, AtomicUsize, Ordering},
    time::Instant,
};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    BitSet, ClosedSet, Completion, Error, ListScheduler, PartialSchedule, Schedule, SolverConfig,
    Status, TaskGraph,
};

/// Rejects the requests no scheduler can serve
pub(crate) fn check_request(nb_processors: usize) -> Result<(), Error> {
    if nb_processors == 0 {
        Err(Error::NoProcessor)
    } else if nb_processors > BitSet::CAPACITY {
        Err(Error::TooManyProcessors { count: nb_processors, max: BitSet::CAPACITY })
    } else {
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// --- INCUMBENT --------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The best schedule found so far, shared among all workers.
///
/// The makespan is mirrored in an atomic so that workers can read the bound
/// without locking; it is only ever written while holding the lock, together
/// with the schedule, and only ever decreases.
#[derive(Debug)]
pub(crate) struct Incumbent {
    makespan: AtomicUsize,
    best: Mutex<Option<Schedule>>,
}
impl Default for Incumbent {
    fn default() -> Self {
        Incumbent { makespan: AtomicUsize::new(usize::MAX), best: Mutex::new(None) }
    }
}
impl Incumbent {
    pub fn reset(&self) {
        let mut best = self.best.lock();
        *best = None;
        self.makespan.store(usize::MAX, Ordering::Release);
    }
    /// The makespan to beat (`usize::MAX` when nothing was found yet)
    pub fn bound(&self) -> usize {
        self.makespan.load(Ordering::Acquire)
    }
    pub fn makespan(&self) -> Option<usize> {
        self.best.lock().as_ref().map(Schedule::makespan)
    }
    pub fn schedule(&self) -> Option<Schedule> {
        self.best.lock().clone()
    }
    /// Replaces the best schedule with the given complete schedule iff it is
    /// strictly better. Returns true iff that was the case.
    pub fn offer(&self, state: &PartialSchedule) -> bool {
        let makespan = state.latest_end_time();
        if makespan >= self.bound() {
            return false;
        }
        let mut best = self.best.lock();
        if best.as_ref().map_or(false, |s| s.makespan() <= makespan) {
            return false;
        }
        *best = Some(Schedule::from(state));
        self.makespan.store(makespan, Ordering::Release);
        debug!(makespan, "new best schedule");
        true
    }
}

// ----------------------------------------------------------------------------
// --- STATISTICS -------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The counters and status a client may observe during a search
#[derive(Debug)]
pub(crate) struct Statistics {
    searched: AtomicU64,
    pruned: AtomicU64,
    status: AtomicU8,
}
impl Default for Statistics {
    fn default() -> Self {
        Statistics {
            searched: AtomicU64::new(0),
            pruned: AtomicU64::new(0),
            status: AtomicU8::new(Status::Idle.code()),
        }
    }
}
impl Statistics {
    pub fn searched(&self) -> u64 {
        self.searched.load(Ordering::Relaxed)
    }
    pub fn pruned(&self) -> u64 {
        self.pruned.load(Ordering::Relaxed)
    }
    pub fn status(&self) -> Status {
        Status::from_code(self.status.load(Ordering::Acquire))
    }
    fn set_status(&self, status: Status) {
        self.status.store(status.code(), Ordering::Release);
    }
    fn reset(&self) {
        self.searched.store(0, Ordering::Relaxed);
        self.pruned.store(0, Ordering::Relaxed);
    }
}

/// The counters of one worker, flushed to the shared statistics from time to
/// time.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub searched: u64,
    pub pruned: u64,
}
impl Counters {
    pub fn flush(&mut self, stats: &Statistics) {
        stats.searched.fetch_add(self.searched, Ordering::Relaxed);
        stats.pruned.fetch_add(self.pruned, Ordering::Relaxed);
        self.searched = 0;
        self.pruned = 0;
    }
}

// ----------------------------------------------------------------------------
// --- PROGRESS ---------------------------------------------------------------
// ----------------------------------------------------------------------------
/// Everything a scheduler exposes about its current (or last) search
#[derive(Debug, Default)]
pub(crate) struct Progress {
    pub incumbent: Incumbent,
    pub stats: Statistics,
}

/// What a search needs to remember from its start
pub(crate) struct Start {
    /// The list schedule, returned when the search finds nothing better
    fallback: PartialSchedule,
    nb_tasks: usize,
    nb_processors: usize,
    time: Instant,
}

impl Progress {
    /// Validates the request and resets the bookkeeping for a new search
    pub fn begin(
        &self,
        name: &'static str,
        config: &SolverConfig,
        graph: &TaskGraph,
        nb_processors: usize,
    ) -> Result<Start, Error> {
        check_request(nb_processors)?;
        self.incumbent.reset();
        self.stats.reset();
        self.stats.set_status(Status::Scheduling);
        info!(
            algorithm = name,
            graph = graph.name(),
            tasks = graph.nb_tasks(),
            processors = nb_processors,
            threads = config.nb_threads(),
            "scheduling started"
        );

        let fallback = ListScheduler::schedule(graph, nb_processors);
        if config.seed_with_list_schedule() {
            self.incumbent.offer(&fallback);
        }
        Ok(Start { fallback, nb_tasks: graph.nb_tasks(), nb_processors, time: Instant::now() })
    }

    /// Closes the search and reports its outcome
    pub fn end(&self, name: &'static str, start: Start, is_exact: bool) -> Completion {
        let schedule = match self.incumbent.schedule() {
            Some(schedule) => schedule,
            None => {
                // an uninterrupted search always reaches a complete state
                assert!(!is_exact, "{name} finished without finding any schedule");
                self.incumbent.offer(&start.fallback);
                Schedule::from(&start.fallback)
            }
        };
        self.stats.set_status(Status::Scheduled);
        if !is_exact {
            warn!(algorithm = name, makespan = schedule.makespan(), "search interrupted by a cutoff");
        }
        info!(
            algorithm = name,
            tasks = start.nb_tasks,
            processors = start.nb_processors,
            makespan = schedule.makespan(),
            searched = self.stats.searched(),
            pruned = self.stats.pruned(),
            exact = is_exact,
            elapsed_ms = start.time.elapsed().as_millis() as u64,
            "scheduling finished"
        );
        Completion { is_exact, makespan: schedule.makespan(), schedule }
    }
}

// ----------------------------------------------------------------------------
// --- EXPANSION --------------------------------------------------------------
// ----------------------------------------------------------------------------
/// What became of a state popped from a frontier
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Visit {
    /// Its estimate could not beat the best known makespan
    Pruned,
    /// It was complete, and offered as a new best schedule
    Complete,
    /// Its children were generated
    Expanded,
}

/// Processes one state of the partial schedule search space: prunes it,
/// records it as a candidate best schedule, or pushes those of its children
/// that are neither hopeless nor duplicates.
pub(crate) fn visit(
    graph: &TaskGraph,
    state: PartialSchedule,
    best: &mut usize,
    incumbent: &Incumbent,
    closed: &dyn ClosedSet,
    counters: &mut Counters,
    mut push: impl FnMut(PartialSchedule),
) -> Visit {
    if state.estimated_makespan() >= *best {
        counters.pruned += 1;
        return Visit::Pruned;
    }
    counters.searched += 1;
    if state.is_complete() {
        incumbent.offer(&state);
        *best = (*best).min(incumbent.bound());
        return Visit::Complete;
    }
    for child in state.children(graph) {
        if child.estimated_makespan() >= *best || !closed.insert(child.fingerprint()) {
            counters.pruned += 1;
        } else {
            push(child);
        }
    }
    Visit::Expanded
}

/// Raises the given flag if the thread owning this guard panics, so that the
/// other workers stop instead of waiting for work that will never come.
pub(crate) struct StopOnPanic<'a>(pub &'a AtomicBool);
impl Drop for StopOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.store(true, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod test_shared {
    use std::sync::atomic::AtomicBool;

    use super::*;
    use crate::test_utils::*;
    use crate::{SimpleClosedSet, SolverConfigBuilder};

    #[test]
    fn requests_without_processor_are_rejected() {
        assert_eq!(Err(Error::NoProcessor), check_request(0));
        assert_eq!(Ok(()), check_request(1));
        assert_eq!(Ok(()), check_request(32));
        assert_eq!(Err(Error::TooManyProcessors { count: 33, max: 32 }), check_request(33));
    }
    #[test]
    fn the_incumbent_only_accepts_strict_improvements() {
        let graph = chain();
        let incumbent = Incumbent::default();
        assert_eq!(usize::MAX, incumbent.bound());
        assert_eq!(None, incumbent.makespan());

        let forced = PartialSchedule::new(&graph, 4)
            .extend(&graph, 0, 0)
            .extend(&graph, 1, 1)
            .extend(&graph, 2, 2)
            .extend(&graph, 3, 3)
            .extend(&graph, 4, 3);
        let sequential = ListScheduler::schedule(&graph, 4);

        assert!(incumbent.offer(&forced));
        assert_eq!(18, incumbent.bound());
        assert!(!incumbent.offer(&forced));
        assert!(incumbent.offer(&sequential));
        assert_eq!(Some(12), incumbent.makespan());
        assert!(!incumbent.offer(&forced));
        assert_eq!(12, incumbent.schedule().unwrap().makespan());

        incumbent.reset();
        assert_eq!(usize::MAX, incumbent.bound());
        assert!(incumbent.schedule().is_none());
    }
    #[test]
    fn concurrent_offers_keep_the_best() {
        let graph = out_tree_7();
        let incumbent = Incumbent::default();
        std::thread::scope(|s| {
            for p in 1..=4 {
                let incumbent = &incumbent;
                let graph = &graph;
                s.spawn(move || {
                    incumbent.offer(&ListScheduler::schedule(graph, p));
                });
            }
        });
        let best = (1..=4).map(|p| ListScheduler::schedule(&graph, p).latest_end_time()).min().unwrap();
        assert_eq!(best, incumbent.bound());
        assert_eq!(Some(best), incumbent.makespan());
    }
    #[test]
    fn counters_are_flushed_and_reset() {
        let stats = Statistics::default();
        let mut counters = Counters { searched: 3, pruned: 2 };
        counters.flush(&stats);
        counters.flush(&stats);
        assert_eq!(3, stats.searched());
        assert_eq!(2, stats.pruned());
        assert_eq!(0, counters.searched);
        assert_eq!(Status::Idle, stats.status());
    }
    #[test]
    fn visit_prunes_states_that_cannot_improve() {
        let graph = chain();
        let incumbent = Incumbent::default();
        let closed = SimpleClosedSet::default();
        let mut counters = Counters::default();
        // the root estimate is ceil(12 / 2)
        let mut best = 6;
        let root = PartialSchedule::new(&graph, 2);
        let outcome = visit(&graph, root, &mut best, &incumbent, &closed, &mut counters, |_| panic!());
        assert_eq!(Visit::Pruned, outcome);
        assert_eq!(1, counters.pruned);
        assert_eq!(0, counters.searched);
    }
    #[test]
    fn visit_expands_and_skips_duplicates() {
        let graph = independent(&[2, 3]);
        let incumbent = Incumbent::default();
        let closed = SimpleClosedSet::default();
        let mut counters = Counters::default();
        let mut best = usize::MAX;
        let mut pushed = vec![];
        let root = PartialSchedule::new(&graph, 2);
        let outcome = visit(&graph, root.clone(), &mut best, &incumbent, &closed, &mut counters, |c| pushed.push(c));
        assert_eq!(Visit::Expanded, outcome);
        assert_eq!(2, pushed.len());
        // the same expansion only meets known states
        let outcome = visit(&graph, root, &mut best, &incumbent, &closed, &mut counters, |c| pushed.push(c));
        assert_eq!(Visit::Expanded, outcome);
        assert_eq!(2, pushed.len());
        assert_eq!(2, counters.searched);
        assert_eq!(2, counters.pruned);
    }
    #[test]
    fn visit_records_complete_states() {
        let graph = chain();
        let incumbent = Incumbent::default();
        let closed = SimpleClosedSet::default();
        let mut counters = Counters::default();
        let mut best = usize::MAX;
        let complete = ListScheduler::schedule(&graph, 2);
        let outcome = visit(&graph, complete, &mut best, &incumbent, &closed, &mut counters, |_| panic!());
        assert_eq!(Visit::Complete, outcome);
        assert_eq!(12, best);
        assert_eq!(Some(12), incumbent.makespan());
    }
    fn unseeded() -> SolverConfig {
        SolverConfigBuilder::default().nb_threads(1_usize).seed_with_list_schedule(false).build().unwrap()
    }
    #[test]
    fn an_interrupted_search_falls_back_on_the_list_schedule() {
        let graph = out_tree_7();
        let progress = Progress::default();
        let start = progress.begin("test", &unseeded(), &graph, 2).unwrap();
        assert_eq!(None, progress.incumbent.makespan());
        let outcome = progress.end("test", start, false);
        assert!(!outcome.is_exact);
        assert_eq!(ListScheduler::schedule(&graph, 2).latest_end_time(), outcome.makespan);
        assert_eq!(Ok(()), outcome.schedule.verify(&graph));
        assert_eq!(Some(outcome.makespan), progress.incumbent.makespan());
    }
    #[test]
    #[should_panic]
    fn a_complete_search_without_any_schedule_is_a_bug() {
        let graph = out_tree_7();
        let progress = Progress::default();
        let start = progress.begin("test", &unseeded(), &graph, 2).unwrap();
        let _ = progress.end("test", start, true);
    }
    #[test]
    fn the_guard_raises_its_flag_on_panic_only() {
        let flag = AtomicBool::new(false);
        {
            let _guard = StopOnPanic(&flag);
        }
        assert!(!flag.load(Ordering::SeqCst));
        let outcome = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = StopOnPanic(&flag);
                panic!("boom");
            })
            .join()
        });
        assert!(outcome.is_err());
        assert!(flag.load(Ordering::SeqCst));
    }
}
