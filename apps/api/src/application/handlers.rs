//! Axum route handlers for the application pipeline.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::application::pipeline::{
    run_application_pipeline, RunInputs, ToolSet, INTERVIEW_MATERIALS_FILE, TAILORED_RESUME_FILE,
    UPLOADED_RESUME_FILE,
};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub run_id: Uuid,
    pub tailored_resume: String,
    pub interview_materials: String,
}

/// POST /api/v1/applications/run
///
/// Runs the full four-agent pipeline against the supplied inputs and returns
/// both generated documents. The documents are also persisted to the output
/// directory for later download.
pub async fn handle_run(
    State(state): State<AppState>,
    Json(inputs): Json<RunInputs>,
) -> Result<Json<RunResponse>, AppError> {
    let run_id = Uuid::new_v4();
    tracing::info!(%run_id, "application run requested");

    let resume_path = state.config.output_dir.join(UPLOADED_RESUME_FILE);
    let tools = ToolSet::live(&state.config, resume_path);

    let artifacts =
        run_application_pipeline(state.model.clone(), tools, &state.config.output_dir, inputs)
            .await?;

    Ok(Json(RunResponse {
        run_id,
        tailored_resume: artifacts.tailored_resume,
        interview_materials: artifacts.interview_materials,
    }))
}

/// GET /api/v1/applications/files/{name}
///
/// Serves one of the two generated documents for download. Only the two known
/// file names are recognized; a file that was never generated is
/// `OUTPUT_FILE_MISSING`, which the UI reports as a generic failure.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<String, AppError> {
    if name != TAILORED_RESUME_FILE && name != INTERVIEW_MATERIALS_FILE {
        return Err(AppError::Validation(format!("unknown file '{name}'")));
    }

    let path = state.config.output_dir.join(&name);
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|_| AppError::OutputFileMissing(name))
}
