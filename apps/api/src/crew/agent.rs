//! Agent — an immutable prompting persona.

use std::sync::Arc;

use crate::llm_client::CompletionModel;
use crate::tools::CapabilityTool;

/// Index of an agent within a crew. Handed out by `CrewBuilder::add_agent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentId(pub(crate) usize);

/// A named role with a goal, a backstory used purely as prompt context, the
/// set of capability tools it may invoke, and the shared model handle.
///
/// This is a configuration record, not a behavior hierarchy: the runner reads
/// its fields to build prompts and to resolve tool calls, nothing more.
pub struct Agent {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub tools: Vec<Arc<dyn CapabilityTool>>,
    pub model: Arc<dyn CompletionModel>,
}

impl Agent {
    pub fn find_tool(&self, name: &str) -> Option<&Arc<dyn CapabilityTool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// One line per tool for the prompt's tool catalog.
    pub fn tool_catalog(&self) -> String {
        if self.tools.is_empty() {
            return "(none)".to_string();
        }
        self.tools
            .iter()
            .map(|t| format!("- {}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
