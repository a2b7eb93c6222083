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

//! This module provides the immutable task graph which is the input of every
//! scheduler, along with the builder used to ingest it.
//!
//! A task graph is a DAG of weighted tasks connected by weighted edges. The
//! weight of a task is its computation time, the weight of an edge is the
//! delay it takes to transfer the data of its source to its destination when
//! both run on different processors. Each task also knows its bottom level
//! (the longest path, counting only task weights, from the start of the task
//! to the end of the graph) and its top level (the longest such path from the
//! start of the graph to the start of the task).

mod topo;

pub use topo::*;

use fxhash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::{BitSet, Error, IndexResolver, IndexedSet, Indexable};

/// The maximum number of tasks a graph may hold
pub const MAX_TASKS: usize = BitSet::CAPACITY;

// ----------------------------------------------------------------------------
// --- TASK -------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// One node of the task graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    index: usize,
    label: String,
    weight: usize,
    /// The ids of the edges entering this task, in insertion order
    incoming: Vec<usize>,
    /// The ids of the edges leaving this task, in insertion order
    outgoing: Vec<usize>,
    parents: BitSet,
    children: BitSet,
    top_level: usize,
    bottom_level: usize,
}
impl Task {
    /// The dense identifier assigned to the task in insertion order
    pub fn index(&self) -> usize {
        self.index
    }
    pub fn label(&self) -> &str {
        &self.label
    }
    /// The computation time of the task
    pub fn weight(&self) -> usize {
        self.weight
    }
    pub fn incoming(&self) -> &[usize] {
        &self.incoming
    }
    pub fn outgoing(&self) -> &[usize] {
        &self.outgoing
    }
    pub fn parents(&self) -> BitSet {
        self.parents
    }
    pub fn children(&self) -> BitSet {
        self.children
    }
    pub fn is_source(&self) -> bool {
        self.parents.is_empty()
    }
    pub fn is_sink(&self) -> bool {
        self.children.is_empty()
    }
    /// The earliest time at which the task could start if there were
    /// infinitely many processors and no transfer delays
    pub fn top_level(&self) -> usize {
        self.top_level
    }
    /// The length of the longest path from the start of this task to the
    /// end of the graph, weight of the task included
    pub fn bottom_level(&self) -> usize {
        self.bottom_level
    }
    /// The bottom level of the task minus its own weight: the minimum amount
    /// of work that must still run after the task completes
    pub fn tail(&self) -> usize {
        self.bottom_level - self.weight
    }
}
impl Indexable for Task {
    fn index(&self) -> usize {
        self.index
    }
}

// ----------------------------------------------------------------------------
// --- EDGE -------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A precedence constraint between two tasks
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    /// The index of the source task
    pub from: usize,
    /// The index of the destination task
    pub to: usize,
    /// The transfer delay incurred when both ends run on different processors
    pub weight: usize,
}

// ----------------------------------------------------------------------------
// --- TASK GRAPH -------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The immutable, validated DAG of tasks to schedule. It can only be created
/// through a `GraphBuilder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGraph {
    name: String,
    tasks: Vec<Task>,
    edges: Vec<Edge>,
    by_label: FxHashMap<String, usize>,
    topological_order: Vec<usize>,
    total_weight: usize,
    critical_path: usize,
}
impl TaskGraph {
    pub fn builder<S: Into<String>>(name: S) -> GraphBuilder {
        GraphBuilder::new(name)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn nb_tasks(&self) -> usize {
        self.tasks.len()
    }
    pub fn nb_edges(&self) -> usize {
        self.edges.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
    /// The tasks ordered by index
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
    /// # Panics
    /// When there is no task with the given index
    pub fn task(&self, index: usize) -> &Task {
        &self.tasks[index]
    }
    pub fn task_by_label(&self, label: &str) -> Option<&Task> {
        self.by_label.get(label).map(|i| &self.tasks[*i])
    }
    /// The edges ordered by insertion
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
    pub fn edge(&self, id: usize) -> &Edge {
        &self.edges[id]
    }
    pub fn incoming_edges(&self, task: usize) -> impl Iterator<Item = &Edge> + '_ {
        self.tasks[task].incoming.iter().map(move |e| &self.edges[*e])
    }
    pub fn outgoing_edges(&self, task: usize) -> impl Iterator<Item = &Edge> + '_ {
        self.tasks[task].outgoing.iter().map(move |e| &self.edges[*e])
    }
    /// The tasks having no parent
    pub fn sources(&self) -> IndexedSet<'_, TaskGraph> {
        let mut sources = IndexedSet::with_resolver(self);
        // a graph never holds more than MAX_TASKS tasks: no index overflows
        let _ = sources.extend_from(self.tasks.iter().filter(|t| t.is_source()));
        sources
    }
    /// All the tasks of the graph, as a set
    pub fn all_tasks(&self) -> BitSet {
        // a graph never holds more than MAX_TASKS tasks
        BitSet::full(self.tasks.len()).unwrap_or_default()
    }
    /// A topological order of the tasks (parents always come before their
    /// children)
    pub fn topological_order(&self) -> &[usize] {
        &self.topological_order
    }
    /// The sum of the weights of all tasks
    pub fn total_weight(&self) -> usize {
        self.total_weight
    }
    /// The length of the longest path of the graph (counting task weights
    /// only). No schedule can be shorter than this.
    pub fn critical_path_length(&self) -> usize {
        self.critical_path
    }

    /// Computes the top and bottom levels of all tasks, given a topological
    /// order of the graph.
    fn compute_levels(&mut self) {
        for i in (0..self.topological_order.len()).rev() {
            let task = self.topological_order[i];
            let below = self.tasks[task]
                .outgoing
                .iter()
                .map(|e| self.tasks[self.edges[*e].to].bottom_level)
                .max()
                .unwrap_or(0);
            self.tasks[task].bottom_level = self.tasks[task].weight + below;
        }
        for i in 0..self.topological_order.len() {
            let task = self.topological_order[i];
            let above = self.tasks[task]
                .incoming
                .iter()
                .map(|e| {
                    let parent = &self.tasks[self.edges[*e].from];
                    parent.top_level + parent.weight
                })
                .max()
                .unwrap_or(0);
            self.tasks[task].top_level = above;
        }
        self.critical_path = self.tasks.iter().map(|t| t.bottom_level).max().unwrap_or(0);
    }
}
impl IndexResolver for TaskGraph {
    type Item = Task;

    fn resolve(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }
}

// ----------------------------------------------------------------------------
// --- BUILDER ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// Ingests the tasks and edges of a graph one at a time. Tasks are indexed in
/// insertion order; edges refer to tasks by label. Every structural problem
/// is reported as soon as it is detected, cycles are detected by `build`.
///
/// # Example
/// ```
/// # use optsched::*;
/// let mut builder = GraphBuilder::new("fork");
/// builder.add_task("a", 2)?;
/// builder.add_task("b", 3)?;
/// builder.add_task("c", 1)?;
/// builder.add_edge("a", "b", 1)?;
/// builder.add_edge("a", "c", 4)?;
/// let graph = builder.build()?;
///
/// assert_eq!(3, graph.nb_tasks());
/// assert_eq!(5, graph.task(0).bottom_level());
/// # Ok::<(), Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    name: String,
    tasks: Vec<(String, usize)>,
    edges: Vec<Edge>,
    by_label: FxHashMap<String, usize>,
    edge_pairs: FxHashSet<(usize, usize)>,
}
impl GraphBuilder {
    pub fn new<S: Into<String>>(name: S) -> Self {
        GraphBuilder { name: name.into(), ..Default::default() }
    }
    /// Adds a task and returns the index it was given.
    pub fn add_task<S: Into<String>>(&mut self, label: S, weight: isize) -> Result<usize, Error> {
        let label = label.into();
        if self.by_label.contains_key(&label) {
            return Err(Error::DuplicateTask(label));
        }
        if weight <= 0 {
            return Err(Error::InvalidTaskWeight { label, weight });
        }
        if self.tasks.len() >= MAX_TASKS {
            return Err(Error::TooManyTasks { count: self.tasks.len() + 1, max: MAX_TASKS });
        }
        let index = self.tasks.len();
        self.by_label.insert(label.clone(), index);
        self.tasks.push((label, weight as usize));
        Ok(index)
    }
    /// Adds an edge between two tasks that were already added.
    pub fn add_edge(&mut self, from: &str, to: &str, weight: isize) -> Result<(), Error> {
        let dangling = |missing: &str| Error::DanglingEdge {
            from: from.to_string(),
            to: to.to_string(),
            missing: missing.to_string(),
        };
        let src = *self.by_label.get(from).ok_or_else(|| dangling(from))?;
        let dst = *self.by_label.get(to).ok_or_else(|| dangling(to))?;
        if weight < 0 {
            return Err(Error::InvalidEdgeWeight {
                from: from.to_string(),
                to: to.to_string(),
                weight,
            });
        }
        if !self.edge_pairs.insert((src, dst)) {
            return Err(Error::DuplicateEdge { from: from.to_string(), to: to.to_string() });
        }
        self.edges.push(Edge { from: src, to: dst, weight: weight as usize });
        Ok(())
    }
    /// Validates the graph, orders it topologically and computes the levels
    /// of all its tasks.
    pub fn build(self) -> Result<TaskGraph, Error> {
        let mut tasks = self
            .tasks
            .into_iter()
            .enumerate()
            .map(|(index, (label, weight))| Task {
                index,
                label,
                weight,
                incoming: vec![],
                outgoing: vec![],
                parents: BitSet::empty(),
                children: BitSet::empty(),
                top_level: 0,
                bottom_level: 0,
            })
            .collect::<Vec<_>>();

        for (id, edge) in self.edges.iter().enumerate() {
            tasks[edge.from].outgoing.push(id);
            tasks[edge.from].children = tasks[edge.from].children.with(edge.to);
            tasks[edge.to].incoming.push(id);
            tasks[edge.to].parents = tasks[edge.to].parents.with(edge.from);
        }

        let total_weight = tasks.iter().map(|t| t.weight).sum();
        let mut graph = TaskGraph {
            name: self.name,
            tasks,
            edges: self.edges,
            by_label: self.by_label,
            topological_order: vec![],
            total_weight,
            critical_path: 0,
        };
        graph.topological_order = TopologicalSorter::sort(&graph)?;
        debug_assert!(TopologicalSorter::is_topological(&graph, &graph.topological_order));
        graph.compute_levels();

        debug!(
            name = graph.name.as_str(),
            tasks = graph.nb_tasks(),
            edges = graph.nb_edges(),
            critical_path = graph.critical_path,
            "task graph built"
        );
        Ok(graph)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
