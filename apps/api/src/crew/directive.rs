//! The model-reply protocol for the tool-call loop.
//!
//! Each model turn must be one JSON directive:
//!   {"action": "tool", "tool": "<name>", "input": "<tool input>"}
//!   {"action": "final", "answer": "<full answer text>"}
//!
//! Models are imperfect protocol citizens: fenced JSON is tolerated, and a
//! reply that is not a directive at all is treated as the final answer.

use serde::Deserialize;

use crate::llm_client::strip_json_fences;

#[derive(Debug, PartialEq)]
pub enum Directive {
    ToolCall { tool: String, input: String },
    Final { answer: String },
}

#[derive(Deserialize)]
struct RawDirective {
    action: String,
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    input: Option<String>,
    #[serde(default)]
    answer: Option<String>,
}

/// Parses one model reply into a directive. Never fails: anything that is not
/// a well-formed directive is the final answer, verbatim.
pub fn parse_reply(reply: &str) -> Directive {
    let stripped = strip_json_fences(reply);

    let Ok(raw) = serde_json::from_str::<RawDirective>(stripped) else {
        return Directive::Final {
            answer: reply.trim().to_string(),
        };
    };

    match raw.action.as_str() {
        "tool" => match raw.tool {
            Some(tool) if !tool.trim().is_empty() => Directive::ToolCall {
                tool,
                input: raw.input.unwrap_or_default(),
            },
            // "tool" action without a tool name: fall back to treating the
            // reply as text rather than failing the run
            _ => Directive::Final {
                answer: reply.trim().to_string(),
            },
        },
        "final" => Directive::Final {
            answer: raw.answer.unwrap_or_default(),
        },
        _ => Directive::Final {
            answer: reply.trim().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_call() {
        let reply = r#"{"action": "tool", "tool": "search_web", "input": "rust jobs"}"#;
        assert_eq!(
            parse_reply(reply),
            Directive::ToolCall {
                tool: "search_web".to_string(),
                input: "rust jobs".to_string()
            }
        );
    }

    #[test]
    fn test_parse_final_answer() {
        let reply = r##"{"action": "final", "answer": "# Tailored Resume\n..."}"##;
        assert_eq!(
            parse_reply(reply),
            Directive::Final {
                answer: "# Tailored Resume\n...".to_string()
            }
        );
    }

    #[test]
    fn test_parse_fenced_directive() {
        let reply = "```json\n{\"action\": \"tool\", \"tool\": \"read_resume\", \"input\": \"\"}\n```";
        assert_eq!(
            parse_reply(reply),
            Directive::ToolCall {
                tool: "read_resume".to_string(),
                input: String::new()
            }
        );
    }

    #[test]
    fn test_plain_text_is_final_answer() {
        let reply = "Here is the tailored resume:\n\n# Resume";
        assert_eq!(
            parse_reply(reply),
            Directive::Final {
                answer: reply.to_string()
            }
        );
    }

    #[test]
    fn test_tool_action_without_name_is_final() {
        let reply = r#"{"action": "tool"}"#;
        assert!(matches!(parse_reply(reply), Directive::Final { .. }));
    }

    #[test]
    fn test_unknown_action_is_final() {
        let reply = r#"{"action": "think", "answer": "hmm"}"#;
        assert_eq!(
            parse_reply(reply),
            Directive::Final {
                answer: reply.to_string()
            }
        );
    }
}
