//! Web page scraping: fetch a URL and reduce the HTML to readable text.

use async_trait::async_trait;
use tracing::debug;

use crate::tools::{CapabilityTool, ToolError};

/// Cap on returned text so one scraped page cannot swamp the prompt context.
const MAX_TEXT_CHARS: usize = 16_000;

/// Fetches a web page and returns its visible text with markup removed.
pub struct ScrapeWebsiteTool {
    client: reqwest::Client,
}

impl ScrapeWebsiteTool {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .user_agent(concat!("jobsmith/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

impl Default for ScrapeWebsiteTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CapabilityTool for ScrapeWebsiteTool {
    fn name(&self) -> &str {
        "scrape_website"
    }

    fn description(&self) -> &str {
        "Fetch a web page. Input: a full http(s) URL. \
         Returns the page's visible text with HTML removed."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let url = input.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ToolError::Unavailable(format!(
                "not a valid http(s) URL: {url}"
            )));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ToolError::Unavailable(format!("fetch failed for {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Unavailable(format!(
                "fetch for {url} returned {status}"
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| ToolError::Unavailable(format!("could not read body of {url}: {e}")))?;

        let text = html_to_text(&html);
        let text = truncate_chars(&text, MAX_TEXT_CHARS);
        debug!("scraped {} -> {} chars of text", url, text.len());

        Ok(text)
    }
}

/// Strips tags, scripts, and styles from HTML, collapsing whitespace.
/// Deliberately simple: job postings are text-heavy pages and the model
/// tolerates imperfect extraction.
fn html_to_text(html: &str) -> String {
    // ASCII lowercasing preserves byte offsets, so one lowered copy of the
    // document serves every case-insensitive tag check.
    let lower = html.to_ascii_lowercase();
    let mut out = String::with_capacity(html.len() / 4);
    let mut pos = 0;

    loop {
        let Some(rel) = lower[pos..].find('<') else {
            out.push_str(&html[pos..]);
            break;
        };
        let open = pos + rel;
        out.push_str(&html[pos..open]);

        // script/style content is never visible text; an unclosed element
        // drops the rest of the document
        if lower[open..].starts_with("<script") {
            pos = match lower[open..].find("</script>") {
                Some(rel) => open + rel + "</script>".len(),
                None => html.len(),
            };
            continue;
        }
        if lower[open..].starts_with("<style") {
            pos = match lower[open..].find("</style>") {
                Some(rel) => open + rel + "</style>".len(),
                None => html.len(),
            };
            continue;
        }

        let Some(rel) = lower[open..].find('>') else {
            break;
        };
        let end = open + rel;
        if is_block_boundary(&lower[open..end]) {
            out.push('\n');
        }
        pos = end + 1;
    }

    collapse_whitespace(&decode_basic_entities(&out))
}

/// Closing tags of block-level elements become line breaks.
/// `tag` is already lowercased.
fn is_block_boundary(tag: &str) -> bool {
    const BOUNDARIES: &[&str] = &["</p", "<br", "</div", "</li", "</h", "</tr", "</ul", "</ol"];
    BOUNDARIES.iter().any(|b| tag.starts_with(b))
}

fn decode_basic_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_lines = 0usize;
    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            blank_lines += 1;
            if blank_lines > 1 {
                continue;
            }
        } else {
            blank_lines = 0;
        }
        out.push_str(&line);
        out.push('\n');
    }
    out.trim().to_string()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_strips_tags() {
        let html = "<html><body><h1>Senior Rust Engineer</h1><p>Build <b>fast</b> systems.</p></body></html>";
        let text = html_to_text(html);
        assert!(text.contains("Senior Rust Engineer"));
        assert!(text.contains("Build fast systems."));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_html_to_text_drops_script_and_style() {
        let html = "<p>Visible</p><script>var hidden = 1;</script><style>.x{color:red}</style><p>Also visible</p>";
        let text = html_to_text(html);
        assert!(text.contains("Visible"));
        assert!(text.contains("Also visible"));
        assert!(!text.contains("hidden"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_html_to_text_drops_uppercase_script_and_style() {
        let html = "<P>Visible</P><SCRIPT>var hidden = 1;</SCRIPT><STYLE>.x{color:red}</STYLE>";
        let text = html_to_text(html);
        assert!(text.contains("Visible"));
        assert!(!text.contains("hidden"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_html_to_text_unclosed_script_drops_tail() {
        let text = html_to_text("<p>Seen</p><script>var x = 1;");
        assert_eq!(text, "Seen");
    }

    #[test]
    fn test_html_to_text_decodes_entities() {
        let text = html_to_text("<p>Fish &amp; Chips &lt;daily&gt;</p>");
        assert_eq!(text, "Fish & Chips <daily>");
    }

    #[test]
    fn test_html_to_text_handles_non_ascii() {
        let text = html_to_text("<p>Ingénieur logiciel — Zürich</p>");
        assert_eq!(text, "Ingénieur logiciel — Zürich");
    }

    #[test]
    fn test_block_boundaries_become_line_breaks() {
        let text = html_to_text("<li>First</li><li>Second</li>");
        assert_eq!(text, "First\nSecond");
    }

    #[test]
    fn test_collapse_whitespace_limits_blank_lines() {
        let text = collapse_whitespace("a\n\n\n\n\nb");
        assert_eq!(text, "a\n\nb");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        let text = truncate_chars("ééééé", 3);
        assert_eq!(text, "ééé");
    }

    #[tokio::test]
    async fn test_non_http_input_is_unavailable() {
        let tool = ScrapeWebsiteTool::new();
        let err = tool.invoke("ftp://example.com").await.unwrap_err();
        assert!(matches!(err, ToolError::Unavailable(_)));
    }
}
