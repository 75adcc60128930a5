//! Semantic search over the résumé.
//!
//! Chunks the saved résumé into paragraphs, embeds chunks and query with the
//! Gemini embedContent API, and returns the top chunks by cosine similarity.
//! Embeddings are computed lazily on first use and cached for the run.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::tools::{CapabilityTool, ToolError};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const EMBEDDING_MODEL: &str = "text-embedding-004";
/// How many chunks a query returns.
const TOP_K: usize = 4;
/// Minimum characters for a paragraph to count as a chunk on its own.
const MIN_CHUNK_CHARS: usize = 40;

pub struct SemanticResumeSearchTool {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    resume_path: PathBuf,
    index: OnceCell<Vec<(String, Vec<f32>)>>,
}

impl SemanticResumeSearchTool {
    pub fn new(api_key: Option<String>, resume_path: PathBuf) -> Self {
        Self::with_base_url(api_key, resume_path, GEMINI_BASE_URL.to_string())
    }

    pub fn with_base_url(
        api_key: Option<String>,
        resume_path: PathBuf,
        base_url: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            resume_path,
            index: OnceCell::new(),
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ToolError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ToolError::CredentialMissing("GOOGLE_API_KEY".to_string()))?;

        let url = format!(
            "{}/v1beta/models/{}:embedContent?key={}",
            self.base_url, EMBEDDING_MODEL, api_key
        );
        let body = json!({
            "model": format!("models/{EMBEDDING_MODEL}"),
            "content": {"parts": [{"text": text}]}
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolError::Unavailable(format!("embedding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Unavailable(format!(
                "embedding API returned {status}: {body}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ToolError::Unavailable(format!("embedding response not JSON: {e}")))?;

        body.pointer("/embedding/values")
            .and_then(|v| v.as_array())
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_f64().map(|f| f as f32))
                    .collect()
            })
            .ok_or_else(|| {
                ToolError::Unavailable("embedding response missing values".to_string())
            })
    }

    /// Reads, chunks, and embeds the résumé. Runs once per tool instance.
    async fn build_index(&self) -> Result<Vec<(String, Vec<f32>)>, ToolError> {
        let text = tokio::fs::read_to_string(&self.resume_path)
            .await
            .map_err(|e| {
                ToolError::Unavailable(format!(
                    "could not read {}: {e}",
                    self.resume_path.display()
                ))
            })?;

        let chunks = chunk_paragraphs(&text);
        if chunks.is_empty() {
            return Err(ToolError::Unavailable(
                "resume is empty; nothing to search".to_string(),
            ));
        }

        let mut index = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let embedding = self.embed(&chunk).await?;
            index.push((chunk, embedding));
        }
        debug!("resume index built: {} chunks", index.len());
        Ok(index)
    }
}

#[async_trait]
impl CapabilityTool for SemanticResumeSearchTool {
    fn name(&self) -> &str {
        "search_resume"
    }

    fn description(&self) -> &str {
        "Semantic search over the candidate's resume. Input: a natural-language \
         query (e.g. 'distributed systems experience'). Returns the most \
         relevant resume sections."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(ToolError::Unavailable(
                "semantic search query must not be empty".to_string(),
            ));
        }

        let index = self.index.get_or_try_init(|| self.build_index()).await?;
        let query_embedding = self.embed(query).await?;

        let mut scored: Vec<(&String, f32)> = index
            .iter()
            .map(|(chunk, embedding)| (chunk, cosine_similarity(embedding, &query_embedding)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(scored
            .into_iter()
            .take(TOP_K)
            .map(|(chunk, _)| chunk.as_str())
            .collect::<Vec<_>>()
            .join("\n\n---\n\n"))
    }
}

/// Splits text on blank lines; runs of short fragments are merged forward so
/// headings stay attached to the section they introduce.
fn chunk_paragraphs(text: &str) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut pending = String::new();

    for block in text.split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        if !pending.is_empty() {
            pending.push('\n');
        }
        pending.push_str(block);

        if pending.len() >= MIN_CHUNK_CHARS {
            chunks.push(std::mem::take(&mut pending));
        }
    }
    if !pending.is_empty() {
        match chunks.last_mut() {
            Some(last) => {
                last.push('\n');
                last.push_str(&pending);
            }
            None => chunks.push(pending),
        }
    }
    chunks
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_paragraphs_splits_on_blank_lines() {
        let text = "## Experience\nBuilt a storage engine in Rust over three years.\n\n## Education\nBSc Computer Science, somewhere reputable.";
        let chunks = chunk_paragraphs(text);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].contains("storage engine"));
        assert!(chunks[1].contains("Education"));
    }

    #[test]
    fn test_chunk_paragraphs_merges_short_fragments() {
        let text = "# Resume\n\nSenior backend engineer with five years of distributed systems work.";
        let chunks = chunk_paragraphs(text);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].starts_with("# Resume"));
    }

    #[test]
    fn test_chunk_paragraphs_empty_input() {
        assert!(chunk_paragraphs("   \n\n  ").is_empty());
    }

    #[test]
    fn test_cosine_similarity_orders_by_alignment() {
        let query = [1.0, 0.0];
        let aligned = [2.0, 0.0];
        let orthogonal = [0.0, 1.0];
        assert!(
            cosine_similarity(&aligned, &query) > cosine_similarity(&orthogonal, &query),
            "aligned vector must rank above orthogonal"
        );
    }

    #[test]
    fn test_cosine_similarity_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_missing_key_fails_on_first_use() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.md");
        tokio::fs::write(&path, "# Resume\n\nA reasonably long paragraph about Rust work.")
            .await
            .unwrap();

        let tool = SemanticResumeSearchTool::new(None, path);
        let err = tool.invoke("rust").await.unwrap_err();
        assert!(matches!(err, ToolError::CredentialMissing(_)));
    }
}
