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

//! # Optsched
//! Optsched computes optimal schedules of task graphs on a set of identical
//! processors. A task graph is a DAG whose nodes are tasks with a computation
//! cost and whose edges carry the cost of moving data from a task to its
//! successor when both do not run on the same processor. A schedule places
//! each task on a processor at a given start time; its makespan is the time
//! at which the last task completes. Optsched searches for a schedule of
//! minimum makespan.
//!
//! The search is an exact branch-and-bound: partial schedules are extended
//! one task at a time and discarded as soon as an admissible lower bound on
//! their makespan shows they cannot beat the best schedule found so far.
//! Duplicate partial schedules (up to a permutation of the processors) are
//! detected and explored only once.
//!
//! ## Side benefit
//! As a side benefit from using `optsched`, you will be able to exploit all
//! of your hardware to schedule your graph in parallel.
//!
//! ## Quick Example
//! ```
//! use optsched::*;
//!
//! // 1. Describe the task graph
//! let mut builder = GraphBuilder::new("quick");
//! builder.add_task("load", 2)?;
//! builder.add_task("left", 3)?;
//! builder.add_task("right", 3)?;
//! builder.add_task("merge", 2)?;
//! builder.add_edge("load", "left", 1)?;
//! builder.add_edge("load", "right", 1)?;
//! builder.add_edge("left", "merge", 1)?;
//! builder.add_edge("right", "merge", 1)?;
//! let graph = builder.build()?;
//!
//! // 2. Pick a search strategy and configure it
//! let config = SolverConfigBuilder::default().nb_threads(2).build().unwrap();
//! let solver = Algorithm::Parallel.scheduler(config);
//!
//! // 3. Search for an optimal schedule on two processors
//! let outcome = solver.schedule(&graph, 2)?;
//! assert!(outcome.is_exact);
//! assert_eq!(8, outcome.makespan);
//! assert_eq!(Ok(()), outcome.schedule.verify(&graph));
//! # Ok::<(), Error>(())
//! ```
//!
//! When you don't care about the strategy, `optsched::schedule(&graph, 2)`
//! does the same with the default solver and configuration.

mod common;
mod error;
mod abstraction;
mod implementation;

pub use common::*;
pub use error::*;
pub use abstraction::*;
pub use implementation::*;

#[cfg(test)]
mod test_utils;
