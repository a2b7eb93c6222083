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

//! This module provides the implementation of a frontier ordered by
//! estimated makespan (priority queue).

use std::cmp::Ordering;

use binary_heap_plus::BinaryHeap;
use compare::Compare;

use crate::{Frontier, PartialSchedule};

/// The order of a best-first frontier: the smallest estimated makespan pops
/// first, and among equal estimates the state with the most scheduled tasks.
#[derive(Debug, Default, Copy, Clone)]
pub struct MinEstimate;
impl Compare<PartialSchedule> for MinEstimate {
    fn compare(&self, a: &PartialSchedule, b: &PartialSchedule) -> Ordering {
        // binary heaps pop their greatest element
        b.estimated_makespan()
            .cmp(&a.estimated_makespan())
            .then_with(|| a.scheduled_count().cmp(&b.scheduled_count()))
    }
}

/// A binary heap of partial schedules ordered by `MinEstimate`. Since all
/// estimates are admissible, the first complete schedule to pop is optimal.
pub struct BestFirstFrontier {
    heap: BinaryHeap<PartialSchedule, MinEstimate>,
}
impl Default for BestFirstFrontier {
    fn default() -> Self {
        BestFirstFrontier { heap: BinaryHeap::from_vec_cmp(vec![], MinEstimate) }
    }
}
impl Frontier for BestFirstFrontier {
    fn push(&mut self, state: PartialSchedule) {
        self.heap.push(state)
    }
    fn pop(&mut self) -> Option<PartialSchedule> {
        self.heap.pop()
    }
    fn clear(&mut self) {
        self.heap.clear()
    }
    fn len(&self) -> usize {
        self.heap.len()
    }
    fn is_best_first(&self) -> bool {
        true
    }
}
