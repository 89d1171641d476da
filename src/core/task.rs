//! Named tasks and the dependency graph between them.
//!
//! An edge `a -> b` in the graph means "task `a` depends on task `b`", so
//! `b` runs first. Tasks run their actions in the order they were attached.

use std::collections::HashMap;
use std::fmt;

use anyhow::Result;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use thiserror::Error;

use crate::core::project::Project;
use crate::util::process::CommandRunner;

/// What a task action can see while it runs.
pub struct TaskContext<'a> {
    /// The fully configured project
    pub project: &'a Project,

    /// Where processes and deletions go
    pub runner: &'a dyn CommandRunner,
}

/// A unit of work attached to a task.
pub type TaskAction = Box<dyn Fn(&TaskContext<'_>) -> Result<()>>;

/// Task graph errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskGraphError {
    #[error("task `{0}` is already registered")]
    Duplicate(String),

    #[error("task `{0}` not found")]
    NotFound(String),

    #[error("circular dependency between tasks: {0}")]
    Cycle(String),

    #[error("cannot register task `{0}` after project configuration has finished")]
    Configured(String),

    #[error("task dependencies can only be wired after project configuration has finished")]
    NotConfigured,
}

/// A named task.
pub struct Task {
    name: String,
    description: Option<String>,
    actions: Vec<TaskAction>,
}

impl Task {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Number of attached actions. Zero for lifecycle placeholders.
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub(crate) fn actions(&self) -> &[TaskAction] {
        &self.actions
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("actions", &self.actions.len())
            .finish()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// The set of registered tasks.
#[derive(Debug, Default)]
pub struct TaskGraph {
    graph: DiGraph<Task, ()>,
    by_name: HashMap<String, NodeIndex>,
}

impl TaskGraph {
    pub fn new() -> Self {
        TaskGraph::default()
    }

    /// Register a task with no actions.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: Option<&str>,
    ) -> Result<(), TaskGraphError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(TaskGraphError::Duplicate(name));
        }
        let node = self.graph.add_node(Task {
            name: name.clone(),
            description: description.map(str::to_string),
            actions: Vec::new(),
        });
        self.by_name.insert(name, node);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.by_name.get(name).map(|&node| &self.graph[node])
    }

    pub(crate) fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Task names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.graph.node_indices().map(move |n| self.graph[n].name())
    }

    fn node(&self, name: &str) -> Result<NodeIndex, TaskGraphError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| TaskGraphError::NotFound(name.to_string()))
    }

    /// Append an action to run after the task's existing actions.
    pub fn do_last(&mut self, name: &str, action: TaskAction) -> Result<(), TaskGraphError> {
        let node = self.node(name)?;
        self.graph[node].actions.push(action);
        Ok(())
    }

    /// Make `task` depend on `dependency`. Repeated edges are collapsed.
    pub fn depends_on(&mut self, task: &str, dependency: &str) -> Result<(), TaskGraphError> {
        let from = self.node(task)?;
        let to = self.node(dependency)?;
        self.graph.update_edge(from, to, ());
        Ok(())
    }

    /// Direct dependencies of a task, in registration order.
    pub fn dependencies(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Tasks that directly depend on the given task, in registration order.
    pub fn dependents(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<&str> {
        let Some(&node) = self.by_name.get(name) else {
            return Vec::new();
        };
        let mut nodes: Vec<NodeIndex> = self.graph.neighbors_directed(node, direction).collect();
        nodes.sort();
        nodes.into_iter().map(|n| self.graph[n].name()).collect()
    }

    /// Tasks to run for the requested names, dependencies first.
    ///
    /// Each task appears once. Among independent tasks, request order and
    /// then registration order decide.
    pub fn execution_plan(&self, requested: &[String]) -> Result<Vec<&Task>, TaskGraphError> {
        let mut marks = HashMap::new();
        let mut order = Vec::new();
        let mut stack = Vec::new();

        for name in requested {
            let node = self.node(name)?;
            self.visit(node, &mut marks, &mut stack, &mut order)?;
        }

        Ok(order.into_iter().map(|n| &self.graph[n]).collect())
    }

    fn visit(
        &self,
        node: NodeIndex,
        marks: &mut HashMap<NodeIndex, Mark>,
        stack: &mut Vec<NodeIndex>,
        order: &mut Vec<NodeIndex>,
    ) -> Result<(), TaskGraphError> {
        match marks.get(&node) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|&n| n == node).unwrap_or(0);
                let mut cycle: Vec<&str> = stack[start..]
                    .iter()
                    .map(|&n| self.graph[n].name())
                    .collect();
                cycle.push(self.graph[node].name());
                return Err(TaskGraphError::Cycle(cycle.join(" -> ")));
            }
            None => {}
        }

        marks.insert(node, Mark::Visiting);
        stack.push(node);

        let mut deps: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        deps.sort();
        for dep in deps {
            self.visit(dep, marks, stack, order)?;
        }

        stack.pop();
        marks.insert(node, Mark::Done);
        order.push(node);
        Ok(())
    }
}
