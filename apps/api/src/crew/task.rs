//! Task — one prompted unit of work bound to an agent.

use std::path::PathBuf;

use crate::crew::agent::AgentId;

/// Index of a task within a crew. Only obtainable from
/// `CrewBuilder::add_task`, so a prerequisite can only name a task that was
/// already added — forward references cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub(crate) usize);

/// Declarative description of a task. `description` is a named-placeholder
/// template filled from the run inputs when the task executes.
pub struct Task {
    pub description: String,
    pub expected_output: String,
    pub agent: AgentId,
    /// Prerequisite outputs are fed into this task's prompt context in
    /// exactly this order.
    pub prerequisites: Vec<TaskId>,
    /// If set, the final answer is persisted here (atomic overwrite).
    pub output_file: Option<PathBuf>,
    /// Root tasks marked concurrent-eligible may run in parallel with each
    /// other. Ignored for tasks with prerequisites, which always run
    /// sequentially after their dependencies.
    pub concurrent_eligible: bool,
}

impl Task {
    pub fn new(description: impl Into<String>, expected_output: impl Into<String>, agent: AgentId) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            prerequisites: Vec::new(),
            output_file: None,
            concurrent_eligible: false,
        }
    }

    pub fn with_prerequisites(mut self, prerequisites: Vec<TaskId>) -> Self {
        self.prerequisites = prerequisites;
        self
    }

    pub fn with_output_file(mut self, path: PathBuf) -> Self {
        self.output_file = Some(path);
        self
    }

    pub fn concurrent(mut self) -> Self {
        self.concurrent_eligible = true;
        self
    }
}
