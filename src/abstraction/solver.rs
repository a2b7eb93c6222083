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

//! This module defines the `Scheduler` abstraction: the common interface of
//! all search engines.

use crate::{Completion, Error, Schedule, Status, TaskGraph};

/// A scheduler searches for a schedule of minimum makespan for a task graph
/// on a given number of identical processors.
///
/// All methods take `&self` so that one thread may observe the progress of a
/// search (status, counters, best schedule so far) while another thread runs
/// it. A scheduler must not be used for two searches at once.
pub trait Scheduler {
    /// A human readable name of the search strategy
    fn name(&self) -> &'static str;

    /// Searches for an optimal schedule of `graph` on `nb_processors`
    /// processors. This fails with `Error::NoProcessor` when `nb_processors`
    /// is zero and with `Error::TooManyProcessors` when it exceeds the
    /// capacity of a bitset. Unless a cutoff interrupts the search, the
    /// returned schedule is optimal.
    fn schedule(&self, graph: &TaskGraph, nb_processors: usize) -> Result<Completion, Error>;

    /// Where the scheduler stands in its lifecycle
    fn status(&self) -> Status;
    /// The number of states that have been explored so far
    fn searched_count(&self) -> u64;
    /// The number of states that have been discarded so far
    fn pruned_count(&self) -> u64;
    /// The best schedule found so far (if any)
    fn best_schedule(&self) -> Option<Schedule>;
    /// The makespan of the best schedule found so far (if any)
    fn best_makespan(&self) -> Option<usize>;
}
