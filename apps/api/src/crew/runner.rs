//! Crew execution: a declarative DAG of at most a handful of tasks.
//!
//! Root tasks marked concurrent-eligible run in parallel as spawned tokio
//! tasks; everything else runs sequentially in declaration order, strictly
//! after its prerequisites. A dependent task's prompt is only ever built from
//! fully completed prerequisite outputs, concatenated in declaration order.
//!
//! Failure semantics: the first model or tool failure aborts the entire run.
//! There is no per-task retry and no partial-result recovery. Output files
//! are written (atomic rename) only after every task has completed, so an
//! aborted run never modifies a previous run's files — not even for tasks
//! that had already succeeded when a sibling failed.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use uuid::Uuid;

use crate::crew::agent::{Agent, AgentId};
use crate::crew::directive::{parse_reply, Directive};
use crate::crew::task::{Task, TaskId};
use crate::crew::template;
use crate::errors::AppError;

/// Iteration cap for the tool-call loop. A misbehaving model that never emits
/// a final answer has its last reply taken as the answer once this is hit.
const MAX_TOOL_ITERATIONS: usize = 8;

/// The immutable result of one task. Optionally persisted to the task's
/// declared output file; consumed as prompt context by dependent tasks.
#[derive(Debug, Clone)]
pub struct TaskOutput {
    pub text: String,
    pub produced_by: TaskId,
}

/// Assembles agents and tasks into a validated crew.
///
/// Ids are indices handed out by `add_agent` / `add_task`, so prerequisites
/// can only reference tasks added earlier; `add_task` additionally rejects an
/// id that does not resolve, which also covers ids minted by another builder.
#[derive(Default)]
pub struct CrewBuilder {
    agents: Vec<Agent>,
    tasks: Vec<Task>,
}

impl CrewBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_agent(&mut self, agent: Agent) -> AgentId {
        self.agents.push(agent);
        AgentId(self.agents.len() - 1)
    }

    pub fn add_task(&mut self, task: Task) -> Result<TaskId, AppError> {
        if task.agent.0 >= self.agents.len() {
            return Err(AppError::Validation(format!(
                "task references unknown agent #{}",
                task.agent.0
            )));
        }
        for prereq in &task.prerequisites {
            if prereq.0 >= self.tasks.len() {
                return Err(AppError::Validation(format!(
                    "task prerequisite #{} is not defined yet; prerequisites must \
                     reference tasks added earlier",
                    prereq.0
                )));
            }
        }
        self.tasks.push(task);
        Ok(TaskId(self.tasks.len() - 1))
    }

    pub fn build(self) -> Result<Crew, AppError> {
        if self.tasks.is_empty() {
            return Err(AppError::Validation("crew has no tasks".to_string()));
        }
        Ok(Crew {
            inner: Arc::new(CrewInner {
                agents: self.agents,
                tasks: self.tasks,
            }),
        })
    }
}

struct CrewInner {
    agents: Vec<Agent>,
    tasks: Vec<Task>,
}

/// An executable task graph. Cheap to clone; execution is `kickoff`.
#[derive(Clone)]
pub struct Crew {
    inner: Arc<CrewInner>,
}

impl Crew {
    /// Executes every task exactly once and returns the output of the final
    /// task in declaration order.
    pub async fn kickoff(
        &self,
        fields: HashMap<String, String>,
    ) -> Result<TaskOutput, AppError> {
        let run_id = Uuid::new_v4();
        let fields = Arc::new(fields);
        let task_count = self.inner.tasks.len();
        info!(%run_id, task_count, "crew kickoff");

        let mut outputs: Vec<Option<Arc<TaskOutput>>> = (0..task_count).map(|_| None).collect();

        // Wave 1: concurrent-eligible root tasks run in parallel.
        let mut handles = Vec::new();
        for (idx, task) in self.inner.tasks.iter().enumerate() {
            if task.concurrent_eligible && task.prerequisites.is_empty() {
                let inner = Arc::clone(&self.inner);
                let fields = Arc::clone(&fields);
                handles.push((
                    idx,
                    tokio::spawn(async move { execute_task(inner, idx, fields, Vec::new()).await }),
                ));
            }
        }
        // On the first failure the remaining root tasks are aborted before
        // the error propagates; nothing a sibling was doing can reach disk,
        // because file writes only happen after the whole graph succeeds.
        let mut first_err: Option<AppError> = None;
        for (idx, handle) in handles {
            if first_err.is_some() {
                handle.abort();
                continue;
            }
            match handle.await {
                Ok(Ok(output)) => outputs[idx] = Some(Arc::new(output)),
                Ok(Err(e)) => first_err = Some(e),
                Err(e) => {
                    first_err = Some(AppError::Internal(anyhow::anyhow!("task panicked: {e}")))
                }
            }
        }
        if let Some(err) = first_err {
            return Err(err);
        }

        // Remaining tasks run sequentially in declaration order. Prerequisites
        // always point backwards, so by the time a task runs its inputs exist.
        for idx in 0..task_count {
            if outputs[idx].is_some() {
                continue;
            }
            let prereq_outputs: Vec<Arc<TaskOutput>> = self.inner.tasks[idx]
                .prerequisites
                .iter()
                .map(|p| {
                    outputs[p.0].clone().ok_or_else(|| {
                        AppError::Internal(anyhow::anyhow!(
                            "prerequisite task #{} has no output",
                            p.0
                        ))
                    })
                })
                .collect::<Result<_, _>>()?;

            let output = execute_task(
                Arc::clone(&self.inner),
                idx,
                Arc::clone(&fields),
                prereq_outputs,
            )
            .await?;
            outputs[idx] = Some(Arc::new(output));
        }

        // Every task succeeded: persist declared output files now, in task
        // order. Deferring the writes to this point is what guarantees that
        // an aborted run leaves previous files untouched.
        for (idx, task) in self.inner.tasks.iter().enumerate() {
            if let Some(path) = &task.output_file {
                let output = outputs[idx].as_ref().ok_or_else(|| {
                    AppError::Internal(anyhow::anyhow!("task #{idx} has no output to persist"))
                })?;
                persist_output(path, &output.text).await?;
                info!(task = idx, path = %path.display(), "task output persisted");
            }
        }

        info!(%run_id, "crew run complete");

        let last = outputs[task_count - 1]
            .take()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("final task produced no output")))?;
        Ok(last.as_ref().clone())
    }
}

/// Runs one task to completion: render description, assemble the prompt,
/// drive the tool-call loop. Persisting the answer is the crew's job, once
/// the whole graph has succeeded.
async fn execute_task(
    inner: Arc<CrewInner>,
    idx: usize,
    fields: Arc<HashMap<String, String>>,
    prereq_outputs: Vec<Arc<TaskOutput>>,
) -> Result<TaskOutput, AppError> {
    let task = &inner.tasks[idx];
    let agent = &inner.agents[task.agent.0];

    let field_refs: HashMap<&str, &str> = fields
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let description = template::render(&task.description, &field_refs)
        .map_err(|e| AppError::Validation(format!("task #{idx} description: {e}")))?;

    let base_prompt = build_task_prompt(agent, &description, &task.expected_output, &prereq_outputs);

    info!(task = idx, role = %agent.role, "task started");
    let answer = run_tool_loop(agent, &base_prompt).await?;

    // Empty answers never reach the output files: surface a model failure
    // instead of silently writing a blank document.
    if answer.trim().is_empty() {
        return Err(AppError::ModelUnavailable(format!(
            "task #{idx} produced an empty answer"
        )));
    }

    info!(task = idx, chars = answer.len(), "task complete");
    Ok(TaskOutput {
        text: answer,
        produced_by: TaskId(idx),
    })
}

/// The bounded tool-call state machine: ask the model, execute any requested
/// tool, feed the observation back, repeat until a final answer or the cap.
async fn run_tool_loop(agent: &Agent, base_prompt: &str) -> Result<String, AppError> {
    let mut transcript = String::new();
    let mut last_reply = String::new();

    for iteration in 0..MAX_TOOL_ITERATIONS {
        let prompt = if transcript.is_empty() {
            base_prompt.to_string()
        } else {
            format!(
                "{base_prompt}\n\nSTEPS SO FAR:\n{transcript}\n\
                 Continue. Reply with exactly one JSON directive."
            )
        };

        let reply = agent.model.complete(&prompt).await?;
        last_reply = reply.clone();

        match parse_reply(&reply) {
            Directive::Final { answer } => return Ok(answer),
            Directive::ToolCall { tool, input } => {
                transcript.push_str(&format!("Model requested tool '{tool}' with input: {input}\n"));
                match agent.find_tool(&tool) {
                    Some(capability) => {
                        let observation = capability.invoke(&input).await?;
                        transcript.push_str(&format!("Tool '{tool}' returned:\n{observation}\n\n"));
                    }
                    None => {
                        // Surfaced to the model as an observation; still
                        // counts against the iteration cap.
                        warn!(tool = %tool, iteration, "model requested unknown tool");
                        transcript.push_str(&format!(
                            "Error: '{tool}' is not an available tool. Available tools are \
                             listed above.\n\n"
                        ));
                    }
                }
            }
        }
    }

    warn!(
        role = %agent.role,
        "tool loop hit iteration cap; taking last model reply as the answer"
    );
    Ok(last_reply)
}

/// Builds the single textual prompt for a task: persona, tool catalog and
/// protocol, the filled description, the expected output, and prerequisite
/// outputs in declaration order.
fn build_task_prompt(
    agent: &Agent,
    description: &str,
    expected_output: &str,
    prereq_outputs: &[Arc<TaskOutput>],
) -> String {
    let mut prompt = format!(
        "You are {role}.\n\
         GOAL: {goal}\n\
         BACKSTORY: {backstory}\n\n\
         AVAILABLE TOOLS:\n{catalog}\n\n\
         PROTOCOL: Reply with exactly one JSON directive per turn, nothing else.\n\
         To invoke a tool:  {{\"action\": \"tool\", \"tool\": \"<name>\", \"input\": \"<input>\"}}\n\
         To finish:         {{\"action\": \"final\", \"answer\": \"<your complete answer>\"}}\n",
        role = agent.role,
        goal = agent.goal,
        backstory = agent.backstory,
        catalog = agent.tool_catalog(),
    );

    if !prereq_outputs.is_empty() {
        prompt.push_str("\nCONTEXT FROM EARLIER TASKS:\n");
        for output in prereq_outputs {
            prompt.push_str(&format!(
                "--- output of task #{} ---\n{}\n",
                output.produced_by.0, output.text
            ));
        }
    }

    prompt.push_str(&format!(
        "\nYOUR TASK:\n{description}\n\nEXPECTED OUTPUT:\n{expected_output}\n"
    ));
    prompt
}

/// Writes the answer via temp file + rename in the destination directory, so
/// a crash or failed run never leaves a truncated or half-written file.
async fn persist_output(path: &Path, text: &str) -> Result<(), AppError> {
    let path = path.to_owned();
    let text = text.to_owned();
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temp file in {}", dir.display()))?;
        std::io::Write::write_all(&mut tmp, text.as_bytes())
            .context("writing task output to temp file")?;
        tmp.persist(&path)
            .with_context(|| format!("renaming temp file to {}", path.display()))?;
        Ok(())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("output write task panicked: {e}")))?
    .map_err(AppError::Internal)?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
