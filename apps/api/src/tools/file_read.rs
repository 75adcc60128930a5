//! Local file reading, pinned to a single document.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::tools::{CapabilityTool, ToolError};

/// Reads one pre-configured file — the saved résumé. The model's input is
/// ignored so it cannot wander around the filesystem.
pub struct FileReadTool {
    path: PathBuf,
    description: String,
}

impl FileReadTool {
    pub fn new(path: PathBuf) -> Self {
        let description = format!(
            "Read the candidate's resume file ({}). \
             Input is ignored; the full file contents are returned.",
            path.display()
        );
        Self { path, description }
    }
}

#[async_trait]
impl CapabilityTool for FileReadTool {
    fn name(&self) -> &str {
        "read_resume"
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, _input: &str) -> Result<String, ToolError> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ToolError::Unavailable(format!("could not read {}: {e}", self.path.display()))
        })
    }
}
