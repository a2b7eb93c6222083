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

//! This module defines the plain data types that are shared by all the
//! abstractions and implementations of the crate: the placement of one task,
//! the final schedule, the outcome of a search and the observable status of
//! a scheduler.

use std::fmt;

use crate::{Error, TaskGraph};

// ----------------------------------------------------------------------------
// --- SCHEDULED TASK ---------------------------------------------------------
// ----------------------------------------------------------------------------
/// The placement of one task: the processor running it and the time interval
/// `[start, end)` during which it runs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ScheduledTask {
    pub start: usize,
    pub end: usize,
    pub processor: usize,
}
impl ScheduledTask {
    /// The time it takes to run the task
    pub fn duration(&self) -> usize {
        self.end - self.start
    }
}

// ----------------------------------------------------------------------------
// --- SCHEDULE ---------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A complete schedule: every task of a graph has been given a processor and
/// a start time. The placement of the task with index `i` is found at
/// position `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    tasks: Vec<ScheduledTask>,
    nb_processors: usize,
    makespan: usize,
}
impl Schedule {
    pub fn new(tasks: Vec<ScheduledTask>, nb_processors: usize) -> Self {
        let makespan = tasks.iter().map(|t| t.end).max().unwrap_or(0);
        Schedule { tasks, nb_processors, makespan }
    }
    /// The time at which the last task completes
    pub fn makespan(&self) -> usize {
        self.makespan
    }
    pub fn nb_processors(&self) -> usize {
        self.nb_processors
    }
    pub fn nb_tasks(&self) -> usize {
        self.tasks.len()
    }
    /// The placement of the task with the given index (if there is one)
    pub fn get(&self, task: usize) -> Option<&ScheduledTask> {
        self.tasks.get(task)
    }
    pub fn iter(&self) -> impl Iterator<Item = &ScheduledTask> + '_ {
        self.tasks.iter()
    }
    /// The indices of the tasks that run on the given processor, in the
    /// order in which they are executed.
    pub fn tasks_on(&self, processor: usize) -> Vec<usize> {
        let mut tasks = (0..self.tasks.len())
            .filter(|t| self.tasks[*t].processor == processor)
            .collect::<Vec<_>>();
        tasks.sort_unstable_by_key(|t| (self.tasks[*t].start, *t));
        tasks
    }
    /// Checks that this schedule is a valid execution of the given graph:
    /// every task is placed on an existing processor and runs for exactly
    /// its weight, no two tasks overlap on a processor and every task starts
    /// after the completion of each of its parents (plus the transfer delay
    /// when they run on different processors).
    pub fn verify(&self, graph: &TaskGraph) -> Result<(), Error> {
        if self.tasks.len() != graph.nb_tasks() {
            return Err(Error::InvalidSchedule(format!(
                "{} tasks placed but the graph has {}",
                self.tasks.len(),
                graph.nb_tasks()
            )));
        }
        for (placed, task) in self.tasks.iter().zip(graph.tasks()) {
            if placed.processor >= self.nb_processors {
                return Err(Error::InvalidSchedule(format!(
                    "task `{}` runs on processor {} out of {}",
                    task.label(),
                    placed.processor,
                    self.nb_processors
                )));
            }
            if placed.end < placed.start || placed.duration() != task.weight() {
                return Err(Error::InvalidSchedule(format!(
                    "task `{}` runs from {} to {} but weighs {}",
                    task.label(),
                    placed.start,
                    placed.end,
                    task.weight()
                )));
            }
        }
        for edge in graph.edges() {
            let from = &self.tasks[edge.from];
            let to = &self.tasks[edge.to];
            let delay = if from.processor == to.processor { 0 } else { edge.weight };
            if to.start < from.end + delay {
                return Err(Error::InvalidSchedule(format!(
                    "task `{}` starts at {} before the data of `{}` is available at {}",
                    graph.task(edge.to).label(),
                    to.start,
                    graph.task(edge.from).label(),
                    from.end + delay
                )));
            }
        }
        for processor in 0..self.nb_processors {
            let order = self.tasks_on(processor);
            for pair in order.windows(2) {
                let (a, b) = (&self.tasks[pair[0]], &self.tasks[pair[1]]);
                if b.start < a.end {
                    return Err(Error::InvalidSchedule(format!(
                        "tasks `{}` and `{}` overlap on processor {}",
                        graph.task(pair[0]).label(),
                        graph.task(pair[1]).label(),
                        processor
                    )));
                }
            }
        }
        Ok(())
    }
}
impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "makespan: {}", self.makespan)?;
        for processor in 0..self.nb_processors {
            write!(f, "P{processor}:")?;
            for task in self.tasks_on(processor) {
                let t = &self.tasks[task];
                write!(f, " {task}[{}..{})", t.start, t.end)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// --- FINGERPRINT ------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A compact digest identifying a partial schedule up to a renaming of its
/// processors. Two states with the same fingerprint are considered to be
/// duplicates of one another (collisions are not resolved).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub u64);

// ----------------------------------------------------------------------------
// --- STATUS -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The observable lifecycle of a scheduler
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// No search has been started yet
    Idle,
    /// A search is ongoing
    Scheduling,
    /// The last search has terminated
    Scheduled,
}
impl Status {
    pub(crate) fn code(self) -> u8 {
        match self {
            Status::Idle => 0,
            Status::Scheduling => 1,
            Status::Scheduled => 2,
        }
    }
    pub(crate) fn from_code(code: u8) -> Self {
        match code {
            0 => Status::Idle,
            1 => Status::Scheduling,
            _ => Status::Scheduled,
        }
    }
}

// ----------------------------------------------------------------------------
// --- COMPLETION -------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The outcome of a call to `Scheduler::schedule`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Is the schedule proven optimal ? This is only false when the search
    /// was interrupted by a cutoff.
    pub is_exact: bool,
    /// The makespan of the returned schedule
    pub makespan: usize,
    /// The best schedule that was found
    pub schedule: Schedule,
}

#[cfg(test)]
mod test_schedule {
    use crate::*;
    use crate::test_utils::*;

    #[test]
    fn makespan_is_the_latest_end_time() {
        let schedule = Schedule::new(vec![
            ScheduledTask { start: 0, end: 3, processor: 0 },
            ScheduledTask { start: 1, end: 7, processor: 1 },
        ], 2);
        assert_eq!(7, schedule.makespan());
        assert_eq!(2, schedule.nb_tasks());
    }
    #[test]
    fn empty_schedule_has_a_zero_makespan() {
        assert_eq!(0, Schedule::new(vec![], 3).makespan());
    }
    #[test]
    fn tasks_on_lists_the_tasks_by_start_time() {
        let schedule = Schedule::new(vec![
            ScheduledTask { start: 5, end: 6, processor: 0 },
            ScheduledTask { start: 0, end: 2, processor: 1 },
            ScheduledTask { start: 0, end: 5, processor: 0 },
        ], 2);
        assert_eq!(vec![2, 0], schedule.tasks_on(0));
        assert_eq!(vec![1], schedule.tasks_on(1));
        assert!(schedule.tasks_on(2).is_empty());
    }
    #[test]
    fn verify_accepts_a_sequential_execution_of_the_chain() {
        let graph = chain();
        let mut start = 0;
        let mut tasks = vec![];
        for task in graph.tasks() {
            tasks.push(ScheduledTask { start, end: start + task.weight(), processor: 0 });
            start += task.weight();
        }
        let schedule = Schedule::new(tasks, 1);
        assert_eq!(12, schedule.makespan());
        assert_eq!(Ok(()), schedule.verify(&graph));
    }
    #[test]
    fn verify_rejects_a_missing_transfer_delay() {
        let graph = chain();
        // B runs on P1 right after A although the transfer from A takes 1
        let schedule = Schedule::new(vec![
            ScheduledTask { start: 0, end: 2, processor: 0 },
            ScheduledTask { start: 2, end: 5, processor: 1 },
            ScheduledTask { start: 8, end: 9, processor: 1 },
            ScheduledTask { start: 11, end: 15, processor: 1 },
            ScheduledTask { start: 16, end: 18, processor: 1 },
        ], 2);
        assert!(matches!(schedule.verify(&graph), Err(Error::InvalidSchedule(_))));
    }
    #[test]
    fn verify_rejects_overlapping_tasks() {
        let graph = independent(&[3, 3]);
        let schedule = Schedule::new(vec![
            ScheduledTask { start: 0, end: 3, processor: 0 },
            ScheduledTask { start: 2, end: 5, processor: 0 },
        ], 1);
        assert!(matches!(schedule.verify(&graph), Err(Error::InvalidSchedule(_))));
    }
    #[test]
    fn verify_rejects_an_unknown_processor() {
        let graph = independent(&[3]);
        let schedule = Schedule::new(vec![ScheduledTask { start: 0, end: 3, processor: 1 }], 1);
        assert!(matches!(schedule.verify(&graph), Err(Error::InvalidSchedule(_))));
    }
    #[test]
    fn verify_rejects_a_wrong_duration() {
        let graph = independent(&[3]);
        let schedule = Schedule::new(vec![ScheduledTask { start: 0, end: 2, processor: 0 }], 1);
        assert!(matches!(schedule.verify(&graph), Err(Error::InvalidSchedule(_))));
    }
    #[test]
    fn verify_rejects_an_incomplete_schedule() {
        let graph = independent(&[3, 1]);
        let schedule = Schedule::new(vec![ScheduledTask { start: 0, end: 3, processor: 0 }], 1);
        assert!(matches!(schedule.verify(&graph), Err(Error::InvalidSchedule(_))));
    }
    #[test]
    fn status_codes_roundtrip() {
        for status in [Status::Idle, Status::Scheduling, Status::Scheduled] {
            assert_eq!(status, Status::from_code(status.code()));
        }
    }
}
