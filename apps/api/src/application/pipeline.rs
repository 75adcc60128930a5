//! Pipeline wiring — builds the four-agent crew and runs it end to end.
//!
//! Flow: save résumé locally → build tools → build agents and tasks →
//! crew kickoff → read back the two generated documents.
//!
//! The research and profile tasks run concurrently; the strategy task waits
//! on both; the interview task waits on all three.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::prompts;
use crate::config::Config;
use crate::crew::{Agent, Crew, CrewBuilder, Task};
use crate::errors::AppError;
use crate::llm_client::CompletionModel;
use crate::tools::{
    CapabilityTool, FileReadTool, ScrapeWebsiteTool, SemanticResumeSearchTool, SerperSearchTool,
};

pub const TAILORED_RESUME_FILE: &str = "tailored_resume.md";
pub const INTERVIEW_MATERIALS_FILE: &str = "interview_materials.md";
/// Where the incoming résumé text is saved so file-based tools can read it.
pub const UPLOADED_RESUME_FILE: &str = "uploaded_resume.md";

/// The four inputs supplied once per run. Each is substituted into task
/// description templates wherever a matching placeholder appears.
#[derive(Debug, Clone, Deserialize)]
pub struct RunInputs {
    pub job_posting_url: String,
    pub github_url: String,
    pub personal_writeup: String,
    pub resume_text: String,
}

impl RunInputs {
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, value) in [
            ("job_posting_url", &self.job_posting_url),
            ("github_url", &self.github_url),
            ("personal_writeup", &self.personal_writeup),
            ("resume_text", &self.resume_text),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{name} cannot be empty")));
            }
        }
        Ok(())
    }
}

/// The two documents a successful run produces.
#[derive(Debug, Clone, Serialize)]
pub struct RunArtifacts {
    pub tailored_resume: String,
    pub interview_materials: String,
}

/// The four capability tools the agents may invoke. Bundled so tests can
/// substitute stubs without touching the pipeline wiring.
pub struct ToolSet {
    pub search: Arc<dyn CapabilityTool>,
    pub scrape: Arc<dyn CapabilityTool>,
    pub read_resume: Arc<dyn CapabilityTool>,
    pub semantic: Arc<dyn CapabilityTool>,
}

impl ToolSet {
    /// Live tools against the real external services.
    pub fn live(config: &Config, resume_path: PathBuf) -> Self {
        Self {
            search: Arc::new(SerperSearchTool::new(config.serper_api_key.clone())),
            scrape: Arc::new(ScrapeWebsiteTool::new()),
            read_resume: Arc::new(FileReadTool::new(resume_path.clone())),
            semantic: Arc::new(SemanticResumeSearchTool::new(
                config.google_api_key.clone(),
                resume_path,
            )),
        }
    }
}

/// Runs the full job-application pipeline and returns both documents.
///
/// Any model or tool failure aborts the run; output files from a previous run
/// are left untouched on failure.
pub async fn run_application_pipeline(
    model: Arc<dyn CompletionModel>,
    tools: ToolSet,
    output_dir: &Path,
    inputs: RunInputs,
) -> Result<RunArtifacts, AppError> {
    inputs.validate()?;

    // Save the résumé so the file-read and semantic tools have a local copy.
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("creating output dir: {e}")))?;
    let resume_path = output_dir.join(UPLOADED_RESUME_FILE);
    tokio::fs::write(&resume_path, &inputs.resume_text)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("saving resume: {e}")))?;
    info!(path = %resume_path.display(), "resume saved for tool access");

    let crew = build_crew(model, tools, output_dir)?;

    let fields = HashMap::from([
        ("job_posting_url".to_string(), inputs.job_posting_url),
        ("github_url".to_string(), inputs.github_url),
        ("personal_writeup".to_string(), inputs.personal_writeup),
    ]);
    crew.kickoff(fields).await?;

    // Both documents must exist and be non-empty, or the run is a failure.
    let tailored_resume = read_artifact(output_dir, TAILORED_RESUME_FILE).await?;
    let interview_materials = read_artifact(output_dir, INTERVIEW_MATERIALS_FILE).await?;

    Ok(RunArtifacts {
        tailored_resume,
        interview_materials,
    })
}

/// Wires the four agents and four tasks. The task graph is fixed:
///
/// ```text
/// research ─┬─> strategy ──> interview
/// profile  ─┘      │              ^
///     └────────────┴──────────────┘
/// ```
fn build_crew(
    model: Arc<dyn CompletionModel>,
    tools: ToolSet,
    output_dir: &Path,
) -> Result<Crew, AppError> {
    let mut builder = CrewBuilder::new();

    let researcher = builder.add_agent(Agent {
        role: prompts::RESEARCHER_ROLE.to_string(),
        goal: prompts::RESEARCHER_GOAL.to_string(),
        backstory: prompts::RESEARCHER_BACKSTORY.to_string(),
        tools: vec![tools.scrape.clone(), tools.search.clone()],
        model: model.clone(),
    });

    let all_tools = vec![
        tools.scrape.clone(),
        tools.search.clone(),
        tools.read_resume.clone(),
        tools.semantic.clone(),
    ];

    let profiler = builder.add_agent(Agent {
        role: prompts::PROFILER_ROLE.to_string(),
        goal: prompts::PROFILER_GOAL.to_string(),
        backstory: prompts::PROFILER_BACKSTORY.to_string(),
        tools: all_tools.clone(),
        model: model.clone(),
    });

    let strategist = builder.add_agent(Agent {
        role: prompts::STRATEGIST_ROLE.to_string(),
        goal: prompts::STRATEGIST_GOAL.to_string(),
        backstory: prompts::STRATEGIST_BACKSTORY.to_string(),
        tools: all_tools.clone(),
        model: model.clone(),
    });

    let interviewer = builder.add_agent(Agent {
        role: prompts::INTERVIEWER_ROLE.to_string(),
        goal: prompts::INTERVIEWER_GOAL.to_string(),
        backstory: prompts::INTERVIEWER_BACKSTORY.to_string(),
        tools: all_tools,
        model,
    });

    let research = builder.add_task(
        Task::new(prompts::RESEARCH_TASK, prompts::RESEARCH_EXPECTED, researcher).concurrent(),
    )?;
    let profile = builder.add_task(
        Task::new(prompts::PROFILE_TASK, prompts::PROFILE_EXPECTED, profiler).concurrent(),
    )?;
    let strategy = builder.add_task(
        Task::new(prompts::STRATEGY_TASK, prompts::STRATEGY_EXPECTED, strategist)
            .with_prerequisites(vec![research, profile])
            .with_output_file(output_dir.join(TAILORED_RESUME_FILE)),
    )?;
    builder.add_task(
        Task::new(prompts::INTERVIEW_TASK, prompts::INTERVIEW_EXPECTED, interviewer)
            .with_prerequisites(vec![research, profile, strategy])
            .with_output_file(output_dir.join(INTERVIEW_MATERIALS_FILE)),
    )?;

    builder.build()
}

async fn read_artifact(output_dir: &Path, name: &str) -> Result<String, AppError> {
    let path = output_dir.join(name);
    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|_| AppError::OutputFileMissing(name.to_string()))?;
    if text.trim().is_empty() {
        return Err(AppError::OutputFileMissing(name.to_string()));
    }
    Ok(text)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::llm_client::LlmError;
    use crate::tools::ToolError;

    /// One shared model for all four agents, as in production. Replies are
    /// selected by matching a marker substring in the prompt, so concurrent
    /// task interleaving cannot skew the script.
    struct KeyedModel {
        rules: Vec<(&'static str, String)>,
        prompts: Mutex<Vec<String>>,
    }

    impl KeyedModel {
        fn pipeline_stub() -> Arc<Self> {
            let final_reply = |answer: &str| {
                serde_json::json!({"action": "final", "answer": answer}).to_string()
            };
            Arc::new(Self {
                rules: vec![
                    ("Analyze the job posting", final_reply("RESEARCH-OUTPUT: skills list")),
                    ("personal and professional profile", final_reply("PROFILE-OUTPUT: profile doc")),
                    ("tailor the resume", final_reply("# Tailored Resume\nRESUME-OUTPUT")),
                    ("interview questions", final_reply("# Interview Materials\nQUESTIONS-OUTPUT")),
                ],
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn prompt_for(&self, marker: &str) -> Option<String> {
            self.prompts
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.contains(marker))
                .cloned()
        }
    }

    #[async_trait]
    impl crate::llm_client::CompletionModel for KeyedModel {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            for (marker, reply) in &self.rules {
                if prompt.contains(marker) {
                    return Ok(reply.clone());
                }
            }
            Err(LlmError::EmptyContent)
        }
    }

    struct StubTool {
        name: &'static str,
        result: Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl CapabilityTool for StubTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "stub"
        }
        async fn invoke(&self, _input: &str) -> Result<String, ToolError> {
            match self.result {
                Ok(text) => Ok(text.to_string()),
                Err(msg) => Err(ToolError::Unavailable(msg.to_string())),
            }
        }
    }

    fn stub_tools() -> ToolSet {
        ToolSet {
            search: Arc::new(StubTool { name: "search_web", result: Ok("search hits") }),
            scrape: Arc::new(StubTool { name: "scrape_website", result: Ok("page text") }),
            read_resume: Arc::new(StubTool { name: "read_resume", result: Ok("# Resume") }),
            semantic: Arc::new(StubTool { name: "search_resume", result: Ok("resume chunk") }),
        }
    }

    fn sample_inputs() -> RunInputs {
        RunInputs {
            job_posting_url: "https://example.com/job/123".to_string(),
            github_url: "https://github.com/alice".to_string(),
            personal_writeup: "Backend engineer, 5 years".to_string(),
            resume_text: "# Resume\n...".to_string(),
        }
    }

    #[tokio::test]
    async fn test_full_scenario_produces_both_documents() {
        let dir = tempfile::tempdir().unwrap();
        let model = KeyedModel::pipeline_stub();

        let artifacts = run_application_pipeline(
            model.clone(),
            stub_tools(),
            dir.path(),
            sample_inputs(),
        )
        .await
        .unwrap();

        assert!(artifacts.tailored_resume.contains("RESUME-OUTPUT"));
        assert!(artifacts.interview_materials.contains("QUESTIONS-OUTPUT"));

        // Files on disk match the returned artifacts and are non-empty
        let resume_file =
            std::fs::read_to_string(dir.path().join(TAILORED_RESUME_FILE)).unwrap();
        let interview_file =
            std::fs::read_to_string(dir.path().join(INTERVIEW_MATERIALS_FILE)).unwrap();
        assert_eq!(resume_file, artifacts.tailored_resume);
        assert_eq!(interview_file, artifacts.interview_materials);

        // Run inputs were substituted into the task prompts
        let research_prompt = model.prompt_for("Analyze the job posting").unwrap();
        assert!(research_prompt.contains("https://example.com/job/123"));
        let profile_prompt = model.prompt_for("personal and professional profile").unwrap();
        assert!(profile_prompt.contains("https://github.com/alice"));
        assert!(profile_prompt.contains("Backend engineer, 5 years"));

        // The interview task's context includes all three earlier outputs
        let interview_prompt = model.prompt_for("interview questions").unwrap();
        assert!(interview_prompt.contains("RESEARCH-OUTPUT"));
        assert!(interview_prompt.contains("PROFILE-OUTPUT"));
        assert!(interview_prompt.contains("RESUME-OUTPUT"));
    }

    #[tokio::test]
    async fn test_search_failure_aborts_and_preserves_previous_outputs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TAILORED_RESUME_FILE), "old resume").unwrap();
        std::fs::write(dir.path().join(INTERVIEW_MATERIALS_FILE), "old questions").unwrap();

        // Research agent asks for a search; the search tool is down.
        let tool_reply = serde_json::json!({
            "action": "tool", "tool": "search_web", "input": "job requirements"
        })
        .to_string();
        let model = Arc::new(KeyedModel {
            rules: vec![("Analyze the job posting", tool_reply)],
            prompts: Mutex::new(Vec::new()),
        });
        let mut tools = stub_tools();
        tools.search = Arc::new(StubTool {
            name: "search_web",
            result: Err("connection refused"),
        });

        let err = run_application_pipeline(model, tools, dir.path(), sample_inputs())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ToolUnavailable(_)));

        assert_eq!(
            std::fs::read_to_string(dir.path().join(TAILORED_RESUME_FILE)).unwrap(),
            "old resume"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join(INTERVIEW_MATERIALS_FILE)).unwrap(),
            "old questions"
        );
    }

    #[tokio::test]
    async fn test_identical_inputs_yield_identical_files() {
        let dir = tempfile::tempdir().unwrap();

        for _ in 0..2 {
            run_application_pipeline(
                KeyedModel::pipeline_stub(),
                stub_tools(),
                dir.path(),
                sample_inputs(),
            )
            .await
            .unwrap();
        }

        let resume = std::fs::read(dir.path().join(TAILORED_RESUME_FILE)).unwrap();
        let interview = std::fs::read(dir.path().join(INTERVIEW_MATERIALS_FILE)).unwrap();
        assert_eq!(resume, b"# Tailored Resume\nRESUME-OUTPUT".to_vec());
        assert_eq!(
            interview,
            b"# Interview Materials\nQUESTIONS-OUTPUT".to_vec()
        );
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected_before_any_call() {
        let dir = tempfile::tempdir().unwrap();
        let mut inputs = sample_inputs();
        inputs.job_posting_url = "  ".to_string();

        let err = run_application_pipeline(
            KeyedModel::pipeline_stub(),
            stub_tools(),
            dir.path(),
            inputs,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_resume_is_saved_for_tool_access() {
        let dir = tempfile::tempdir().unwrap();
        run_application_pipeline(
            KeyedModel::pipeline_stub(),
            stub_tools(),
            dir.path(),
            sample_inputs(),
        )
        .await
        .unwrap();

        let saved = std::fs::read_to_string(dir.path().join(UPLOADED_RESUME_FILE)).unwrap();
        assert_eq!(saved, "# Resume\n...");
    }
}
