//! The job-application pipeline: four agents, four tasks, two documents.

pub mod handlers;
pub mod pipeline;
pub mod prompts;

pub use pipeline::{
    run_application_pipeline, RunArtifacts, RunInputs, ToolSet, INTERVIEW_MATERIALS_FILE,
    TAILORED_RESUME_FILE, UPLOADED_RESUME_FILE,
};
