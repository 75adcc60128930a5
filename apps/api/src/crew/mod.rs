//! Crew — the task-graph runner.
//!
//! An agent is an immutable prompting persona; a task is one prompted unit of
//! work bound to an agent, with optional dependencies on earlier tasks'
//! outputs. The crew executes the declared DAG: root tasks marked
//! concurrent-eligible run in parallel, dependent tasks run strictly after
//! their prerequisites, sequentially among themselves.

pub mod agent;
pub mod directive;
pub mod runner;
pub mod task;
pub mod template;

pub use agent::{Agent, AgentId};
pub use runner::{Crew, CrewBuilder, TaskOutput};
pub use task::{Task, TaskId};
