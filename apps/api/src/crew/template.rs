//! Named-placeholder templates for task descriptions.
//!
//! Templates use `{field}` placeholders. Rendering is validated: an unbound
//! placeholder is an error at render time, never silently left in the prompt.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("unbound placeholder '{{{0}}}' in template")]
    UnboundPlaceholder(String),

    #[error("unclosed '{{' in template")]
    UnclosedBrace,
}

/// Renders `template`, substituting every `{name}` from `fields`.
/// `{{` and `}}` escape literal braces.
pub fn render(template: &str, fields: &HashMap<&str, &str>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => return Err(TemplateError::UnclosedBrace),
                    }
                }
                let value = fields
                    .get(name.as_str())
                    .ok_or(TemplateError::UnboundPlaceholder(name))?;
                out.push_str(value);
            }
            '}' => {
                // tolerate }} as an escaped literal; a lone } passes through
                if chars.peek() == Some(&'}') {
                    chars.next();
                }
                out.push('}');
            }
            c => out.push(c),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_render_substitutes_named_fields() {
        let out = render(
            "Analyze {job_posting_url} for {name}",
            &fields(&[("job_posting_url", "https://example.com/job/123"), ("name", "Alice")]),
        )
        .unwrap();
        assert_eq!(out, "Analyze https://example.com/job/123 for Alice");
    }

    #[test]
    fn test_render_unbound_placeholder_fails() {
        let err = render("Hello {missing}", &fields(&[])).unwrap_err();
        assert_eq!(err, TemplateError::UnboundPlaceholder("missing".to_string()));
    }

    #[test]
    fn test_render_escaped_braces() {
        let out = render("JSON: {{\"k\": \"{v}\"}}", &fields(&[("v", "1")])).unwrap();
        assert_eq!(out, "JSON: {\"k\": \"1\"}");
    }

    #[test]
    fn test_render_unclosed_brace_fails() {
        let err = render("Hello {name", &fields(&[("name", "x")])).unwrap_err();
        assert_eq!(err, TemplateError::UnclosedBrace);
    }

    #[test]
    fn test_render_no_placeholders_passthrough() {
        let out = render("plain text", &fields(&[])).unwrap();
        assert_eq!(out, "plain text");
    }
}
