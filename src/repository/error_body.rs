//! Failure Response Decoding
//!
//! Turns a non-success HTTP answer into a `DomainError` with a message a
//! person can read: the structured `message` when the body is JSON, the
//! body text without markup when it is not, the status line otherwise.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::StatusCode;

use crate::domain::DomainError;

const MAX_MESSAGE_CHARS: usize = 300;

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").expect("valid regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Map a failed response to the matching error kind
pub fn error_from_response(status: StatusCode, body: &str) -> DomainError {
    let message = failure_message(status, body);
    match status {
        StatusCode::NOT_FOUND => DomainError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => DomainError::InvalidInput(message),
        StatusCode::CONFLICT => DomainError::Conflict(message),
        _ => DomainError::Remote {
            status: status.as_u16(),
            message,
        },
    }
}

/// Human-readable message for a failed response
pub fn failure_message(status: StatusCode, body: &str) -> String {
    if let Some(message) = structured_message(body) {
        return message;
    }

    let text = strip_markup(body);
    if !text.is_empty() {
        return truncate(&text);
    }

    match status.canonical_reason() {
        Some(reason) => format!("Request failed with status {} {}", status.as_u16(), reason),
        None => format!("Request failed with status {}", status.as_u16()),
    }
}

/// `message` or `error` from a JSON error body
fn structured_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    for key in ["message", "error"] {
        match object.get(key) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                return Some(s.trim().to_string());
            }
            Some(serde_json::Value::Object(nested)) => {
                if let Some(serde_json::Value::String(s)) = nested.get("message") {
                    return Some(s.trim().to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Body text with tags removed, common entities decoded and whitespace collapsed
pub fn strip_markup(body: &str) -> String {
    let without_scripts = SCRIPT_OR_STYLE.replace_all(body, " ");
    let without_tags = TAG.replace_all(&without_scripts, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_MESSAGE_CHARS).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_json_message() {
        let body = r#"{"message": "Item not found"}"#;
        assert_eq!(failure_message(StatusCode::NOT_FOUND, body), "Item not found");

        let body = r#"{"error": {"message": "name is required"}}"#;
        assert_eq!(failure_message(StatusCode::BAD_REQUEST, body), "name is required");
    }

    #[test]
    fn test_strips_html_error_page() {
        let body = "<!DOCTYPE html><html><head><style>body{color:red}</style></head>\
                    <body><pre>Cannot PUT /api/items/9</pre></body></html>";
        assert_eq!(
            failure_message(StatusCode::NOT_FOUND, body),
            "Cannot PUT /api/items/9"
        );
    }

    #[test]
    fn test_falls_back_to_status() {
        assert_eq!(
            failure_message(StatusCode::INTERNAL_SERVER_ERROR, "  "),
            "Request failed with status 500 Internal Server Error"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(error_from_response(StatusCode::NOT_FOUND, "").is_not_found());
        assert!(matches!(
            error_from_response(StatusCode::UNPROCESSABLE_ENTITY, "{}"),
            DomainError::InvalidInput(_)
        ));
        assert_eq!(
            error_from_response(StatusCode::BAD_GATEWAY, "upstream &amp; down"),
            DomainError::Remote {
                status: 502,
                message: "upstream & down".to_string()
            }
        );
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(1000);
        let message = failure_message(StatusCode::BAD_GATEWAY, &body);
        assert_eq!(message.chars().count(), MAX_MESSAGE_CHARS + 1);
    }
}
