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

//! This module provides the topological sorter which validates that a task
//! graph is acyclic and orders its tasks so that every parent comes before
//! all of its children.

use crate::{Error, TaskGraph};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// A deterministic depth-first topological sorter. The search starts from
/// every unvisited task in index order and follows the outgoing edges of a
/// task in insertion order; the resulting order is the reverse postorder of
/// that traversal. It uses an explicit stack so that deep graphs cannot
/// overflow the call stack.
#[derive(Debug, Default, Copy, Clone)]
pub struct TopologicalSorter;

impl TopologicalSorter {
    /// Returns the tasks of the graph in topological order, or
    /// `Error::Cycle` when the traversal meets a back edge.
    pub fn sort(graph: &TaskGraph) -> Result<Vec<usize>, Error> {
        let n = graph.nb_tasks();
        let mut marks = vec![Mark::Unvisited; n];
        let mut postorder = Vec::with_capacity(n);
        // (task, position of the next outgoing edge to follow)
        let mut stack: Vec<(usize, usize)> = Vec::with_capacity(n);

        for root in 0..n {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            marks[root] = Mark::InProgress;
            stack.push((root, 0));

            while let Some(top) = stack.len().checked_sub(1) {
                let (task, next) = stack[top];
                let outgoing = graph.task(task).outgoing();
                if next < outgoing.len() {
                    stack[top].1 += 1;
                    let child = graph.edge(outgoing[next]).to;
                    match marks[child] {
                        Mark::Unvisited => {
                            marks[child] = Mark::InProgress;
                            stack.push((child, 0));
                        }
                        Mark::InProgress => {
                            return Err(Error::Cycle(graph.task(child).label().to_string()));
                        }
                        Mark::Done => {}
                    }
                } else {
                    marks[task] = Mark::Done;
                    postorder.push(task);
                    stack.pop();
                }
            }
        }
        postorder.reverse();
        Ok(postorder)
    }

    /// Returns true iff `order` is a permutation of the tasks of the graph in
    /// which every task comes after all of its parents.
    pub fn is_topological(graph: &TaskGraph, order: &[usize]) -> bool {
        if order.len() != graph.nb_tasks() {
            return false;
        }
        let mut position = vec![usize::MAX; graph.nb_tasks()];
        for (pos, task) in order.iter().copied().enumerate() {
            if task >= graph.nb_tasks() || position[task] != usize::MAX {
                return false;
            }
            position[task] = pos;
        }
        graph.edges().iter().all(|e| position[e.from] < position[e.to])
    }
}
