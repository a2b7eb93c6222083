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

//! This module provides the configuration shared by all schedulers.

use derive_builder::Builder;

use crate::{ClosedSet, EmptyClosedSet, SimpleClosedSet};

/// This is how you tune the behavior of a scheduler. All the options have a
/// sensible default, so you only need to set those you care about:
///
/// ```
/// # use optsched::*;
/// let config = SolverConfigBuilder::default()
///     .nb_threads(4_usize)
///     .closed_set_limit(1_000_000_usize)
///     .build()
///     .unwrap();
/// assert_eq!(4, config.nb_threads());
/// assert_eq!(4096, config.sync_threshold());
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SolverConfig {
    /// The number of worker threads of the parallel engines. It defaults to
    /// the number of hardware threads of the machine.
    #[builder(default = "num_cpus::get()")]
    nb_threads: usize,
    /// The number of states a worker explores between two refreshes of its
    /// copy of the best known makespan
    #[builder(default = "4096")]
    sync_threshold: usize,
    /// This flag must be true (default) if you want the search to skip the
    /// states it has already generated through another path
    #[builder(default = "true")]
    closed_set: bool,
    /// The maximum number of states the closed set remembers (unbounded by
    /// default)
    #[builder(default, setter(strip_option))]
    closed_set_limit: Option<usize>,
    /// This flag must be true (default) if you want the search to start with
    /// the schedule of a greedy list scheduler as its best known schedule
    #[builder(default = "true")]
    seed_with_list_schedule: bool,
    /// This flag must be true (default) if you want the search to consider
    /// at most one empty processor at any point
    #[builder(default = "true")]
    symmetry_reduction: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            nb_threads: num_cpus::get(),
            sync_threshold: 4096,
            closed_set: true,
            closed_set_limit: None,
            seed_with_list_schedule: true,
            symmetry_reduction: true,
        }
    }
}

impl SolverConfig {
    pub fn nb_threads(&self) -> usize {
        self.nb_threads
    }
    pub fn sync_threshold(&self) -> usize {
        self.sync_threshold
    }
    pub fn closed_set(&self) -> bool {
        self.closed_set
    }
    pub fn closed_set_limit(&self) -> Option<usize> {
        self.closed_set_limit
    }
    pub fn seed_with_list_schedule(&self) -> bool {
        self.seed_with_list_schedule
    }
    pub fn symmetry_reduction(&self) -> bool {
        self.symmetry_reduction
    }
    /// A fresh closed set, as configured
    pub(crate) fn new_closed_set(&self) -> Box<dyn ClosedSet> {
        if self.closed_set {
            Box::new(SimpleClosedSet::new(self.closed_set_limit))
        } else {
            Box::new(EmptyClosedSet)
        }
    }
}

impl SolverConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(0) = self.nb_threads {
            return Err("at least one thread is required".to_string());
        }
        if let Some(0) = self.sync_threshold {
            return Err("the sync threshold must be positive".to_string());
        }
        Ok(())
    }
}
