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

//! This module defines the one error type used throughout the crate.

/// Everything that can go wrong when building a task graph, when manipulating
/// the bitsets it relies upon or when issuing a scheduling request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    // --- GRAPH VALIDITY -----------------------------------------------------
    #[error("duplicate task label `{0}`")]
    DuplicateTask(String),
    #[error("task `{label}` must have a positive weight (got {weight})")]
    InvalidTaskWeight { label: String, weight: isize },
    #[error("edge ({from}, {to}) must have a non-negative weight (got {weight})")]
    InvalidEdgeWeight { from: String, to: String, weight: isize },
    #[error("edge ({from}, {to}) references the unknown task `{missing}`")]
    DanglingEdge { from: String, to: String, missing: String },
    #[error("duplicate edge ({from}, {to})")]
    DuplicateEdge { from: String, to: String },
    #[error("the task graph contains a cycle through task `{0}`")]
    Cycle(String),
    #[error("a task graph holds at most {max} tasks (got {count})")]
    TooManyTasks { count: usize, max: usize },

    // --- INVALID REQUEST ----------------------------------------------------
    #[error("at least one processor is required")]
    NoProcessor,
    #[error("at most {max} processors are supported (got {count})")]
    TooManyProcessors { count: usize, max: usize },
    #[error("unknown scheduling algorithm `{0}`")]
    UnknownAlgorithm(String),

    // --- CAPACITY / INVALID OPERATION ---------------------------------------
    #[error("index {index} exceeds the capacity of a bitset ({capacity} elements)")]
    Capacity { index: usize, capacity: usize },
    #[error("cannot iterate over a set that has no index resolver")]
    MissingResolver,

    // --- VERIFICATION -------------------------------------------------------
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
}
