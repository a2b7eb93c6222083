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

//! This module and its sub modules provide the actual implementations of the
//! schedulers. The `sequential` module provides the `SequentialSolver` which
//! (obviously) explores the search space on one single thread, either depth
//! first or best first. The `parallel` sub module provides the
//! `ParallelSolver` which splits the very same search among many threads,
//! and the `allocation_ordering` module provides a two-phase alternative.
//! All of them implement the `Scheduler` trait.
use std::{fmt::Display, str::FromStr};

use crate::{Cutoff, Error, Schedule, Scheduler, TaskGraph};

mod config;
mod shared;
mod sequential;
mod parallel;
mod allocation_ordering;

pub use config::*;
pub use sequential::*;
pub use parallel::*;
pub use allocation_ordering::*;

/// The scheduler that is used when you don't care which one is used
pub type DefaultSolver<'a> = ParallelSolver<'a>;

/// The search strategies that are available
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Sequential depth-first branch-and-bound (`"dfs"`)
    DepthFirst,
    /// Sequential best-first search (`"astar"`)
    BestFirst,
    /// Depth-first branch-and-bound with work stealing (`"parallel"`)
    Parallel,
    /// Allocate the tasks first, then order them (`"ao"`)
    AllocationOrdering,
}

impl Algorithm {
    /// Creates a scheduler for this strategy which runs until completion
    pub fn scheduler<'a>(self, config: SolverConfig) -> Box<dyn Scheduler + Send + Sync + 'a> {
        self.custom(config, &crate::NoCutoff)
    }
    /// Creates a scheduler for this strategy which stops when `cutoff` fires
    pub fn custom<'a>(
        self,
        config: SolverConfig,
        cutoff: &'a (dyn Cutoff + Send + Sync),
    ) -> Box<dyn Scheduler + Send + Sync + 'a> {
        match self {
            Algorithm::DepthFirst => Box::new(DepthFirstSolver::custom(config, cutoff)),
            Algorithm::BestFirst => Box::new(BestFirstSolver::custom(config, cutoff)),
            Algorithm::Parallel => Box::new(ParallelSolver::custom(config, cutoff)),
            Algorithm::AllocationOrdering => Box::new(AllocationOrderingSolver::custom(config, cutoff)),
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dfs" => Ok(Algorithm::DepthFirst),
            "astar" => Ok(Algorithm::BestFirst),
            "parallel" => Ok(Algorithm::Parallel),
            "ao" => Ok(Algorithm::AllocationOrdering),
            _ => Err(Error::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Algorithm::DepthFirst => "dfs",
            Algorithm::BestFirst => "astar",
            Algorithm::Parallel => "parallel",
            Algorithm::AllocationOrdering => "ao",
        };
        write!(f, "{name}")
    }
}

/// Computes an optimal schedule of `graph` on `nb_processors` processors with
/// the default solver and configuration.
pub fn schedule(graph: &TaskGraph, nb_processors: usize) -> Result<Schedule, Error> {
    let solver = DefaultSolver::new(SolverConfig::default());
    Ok(solver.schedule(graph, nb_processors)?.schedule)
}
