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

//! This module provides the implementation of a LIFO frontier

use crate::{Frontier, PartialSchedule};

/// The simplest frontier you can think of: a stack. The most recently pushed
/// state pops first, which makes the search dive towards complete schedules
/// and keeps the memory footprint proportional to the depth of the search.
#[derive(Debug, Default, Clone)]
pub struct DepthFirstFrontier {
    stack: Vec<PartialSchedule>,
}
impl Frontier for DepthFirstFrontier {
    fn push(&mut self, state: PartialSchedule) {
        self.stack.push(state)
    }
    fn pop(&mut self) -> Option<PartialSchedule> {
        self.stack.pop()
    }
    fn clear(&mut self) {
        self.stack.clear()
    }
    fn len(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod test_depth_first_frontier {
    use crate::*;
    use crate::test_utils::*;

    #[test]
    fn by_default_it_is_empty() {
        let frontier = DepthFirstFrontier::default();
        assert!(frontier.is_empty());
        assert!(!frontier.is_best_first());
    }
    #[test]
    fn the_last_state_pushed_pops_first() {
        let graph = independent(&[1, 2, 3]);
        let root = PartialSchedule::new(&graph, 1);
        let mut frontier = DepthFirstFrontier::default();
        for task in 0..3 {
            frontier.push(root.extend(&graph, task, 0));
        }
        assert_eq!(3, frontier.len());
        assert!(frontier.pop().unwrap().scheduled().contains(2));
        assert!(frontier.pop().unwrap().scheduled().contains(1));
        assert!(frontier.pop().unwrap().scheduled().contains(0));
        assert!(frontier.pop().is_none());
    }
    #[test]
    fn when_cleared_it_is_empty() {
        let graph = chain();
        let mut frontier = DepthFirstFrontier::default();
        frontier.push(PartialSchedule::new(&graph, 1));
        frontier.clear();
        assert!(frontier.is_empty());
    }
}
