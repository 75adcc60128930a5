//! Web search via the Serper.dev Google Search API.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::tools::{CapabilityTool, ToolError};

const SERPER_SEARCH_URL: &str = "https://google.serper.dev/search";
/// How many organic results to include in the tool observation.
const MAX_RESULTS: usize = 8;

/// Searches the web and returns a compact plain-text digest of the top
/// organic results (title, link, snippet per result).
pub struct SerperSearchTool {
    client: reqwest::Client,
    api_key: Option<String>,
    search_url: String,
}

impl SerperSearchTool {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_search_url(api_key, SERPER_SEARCH_URL.to_string())
    }

    pub fn with_search_url(api_key: Option<String>, search_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            search_url,
        }
    }
}

#[async_trait]
impl CapabilityTool for SerperSearchTool {
    fn name(&self) -> &str {
        "search_web"
    }

    fn description(&self) -> &str {
        "Search the web. Input: a search query string. \
         Returns the top results as 'title — url — snippet' lines."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(ToolError::Unavailable(
                "search query must not be empty".to_string(),
            ));
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ToolError::CredentialMissing("SERPER_API_KEY".to_string()))?;

        let response = self
            .client
            .post(&self.search_url)
            .header("X-API-KEY", api_key)
            .json(&json!({ "q": query }))
            .send()
            .await
            .map_err(|e| ToolError::Unavailable(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Unavailable(format!(
                "search API returned {status}: {body}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ToolError::Unavailable(format!("search response was not JSON: {e}")))?;

        let digest = format_results(&body);
        debug!("search '{}' returned {} chars", query, digest.len());

        if digest.is_empty() {
            return Ok(format!("No search results found for: {query}"));
        }
        Ok(digest)
    }
}

fn format_results(body: &Value) -> String {
    body.get("organic")
        .and_then(|o| o.as_array())
        .map(|results| {
            results
                .iter()
                .take(MAX_RESULTS)
                .filter_map(|r| {
                    let title = r.get("title").and_then(|t| t.as_str())?;
                    let link = r.get("link").and_then(|l| l.as_str()).unwrap_or("");
                    let snippet = r.get("snippet").and_then(|s| s.as_str()).unwrap_or("");
                    Some(format!("{title} — {link} — {snippet}"))
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_results_takes_title_link_snippet() {
        let body = json!({
            "organic": [
                {"title": "Rust jobs", "link": "https://example.com", "snippet": "Hiring now"},
                {"title": "No snippet", "link": "https://example.org"}
            ]
        });
        let digest = format_results(&body);
        assert!(digest.contains("Rust jobs — https://example.com — Hiring now"));
        assert!(digest.contains("No snippet — https://example.org — "));
    }

    #[test]
    fn test_format_results_empty_body() {
        assert_eq!(format_results(&json!({})), "");
    }

    #[tokio::test]
    async fn test_missing_key_fails_on_first_use() {
        let tool = SerperSearchTool::new(None);
        let err = tool.invoke("rust engineer").await.unwrap_err();
        assert!(matches!(err, ToolError::CredentialMissing(key) if key == "SERPER_API_KEY"));
    }

    #[tokio::test]
    async fn test_empty_query_is_unavailable() {
        let tool = SerperSearchTool::new(Some("key".to_string()));
        let err = tool.invoke("   ").await.unwrap_err();
        assert!(matches!(err, ToolError::Unavailable(_)));
    }
}
