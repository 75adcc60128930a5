//! Capability Tools — external callables an agent may invoke mid-generation.
//!
//! The pipeline treats tools as opaque collaborators: a name, a description
//! the model sees, and `invoke(input) -> text`. Nothing in the runner inspects
//! tool internals.

pub mod file_read;
pub mod scrape;
pub mod search;
pub mod semantic;

use async_trait::async_trait;
use thiserror::Error;

pub use file_read::FileReadTool;
pub use scrape::ScrapeWebsiteTool;
pub use search::SerperSearchTool;
pub use semantic::SemanticResumeSearchTool;

#[derive(Debug, Error)]
pub enum ToolError {
    /// Network error, missing file, malformed query — anything that makes the
    /// capability unusable for this call.
    #[error("tool unavailable: {0}")]
    Unavailable(String),

    /// The tool depends on an API key that was never configured.
    #[error("credential '{0}' is not configured")]
    CredentialMissing(String),
}

/// A capability an agent may invoke. `description` is shown verbatim to the
/// model as part of the tool catalog, so it should state what the input is.
#[async_trait]
pub trait CapabilityTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    async fn invoke(&self, input: &str) -> Result<String, ToolError>;
}
