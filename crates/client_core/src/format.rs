//! HTML rendering of backend payloads.
//!
//! Everything here is pure: the same value always renders to the same
//! fragment, and no input shape makes rendering fail.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use shared::domain::FormattableValue;

pub const ACKNOWLEDGMENT_LABEL: &str = "Acknowledgment of Previous Feedback:";

/// Keys under which the evaluator may wrap its whole answer.
const RAW_EVALUATION_KEYS: [&str; 2] = ["Raw_Evaluation", "Raw Evaluation"];

static HEADING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"###\s*([^\r\n]*)").expect("heading marker pattern"));
static ACKNOWLEDGMENT_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?i){}", regex::escape(ACKNOWLEDGMENT_LABEL)))
        .expect("acknowledgment pattern")
});

/// Renders an arbitrary backend value (evaluation or feedback) as HTML.
pub fn format_response(value: &FormattableValue) -> String {
    match value {
        FormattableValue::Text(text) => format_text(text, 3),
        FormattableValue::Mapping(entries) => {
            if let Some(raw) = RAW_EVALUATION_KEYS
                .iter()
                .filter_map(|key| entries.get(*key))
                .find(|raw| raw.is_truthy())
            {
                return format_response(raw);
            }

            let mut html = String::new();
            for (key, value) in entries {
                html.push_str(&format!("<h3>{key}</h3>"));
                match value {
                    FormattableValue::Text(text) => html.push_str(&format_text(text, 4)),
                    FormattableValue::Mapping(_) => html.push_str(&format_response(value)),
                    FormattableValue::Other(other) => html.push_str(
                        &pretty_json(other)
                            .replace('\n', "<br>")
                            .replace(' ', "&nbsp;"),
                    ),
                }
            }
            html
        }
        FormattableValue::Other(other) => pretty_json(other),
    }
}

/// Renders generated content, lifting an inline acknowledgment section (if
/// any) into its own block ahead of the body.
pub fn format_content(content: &str) -> String {
    let Some(marker) = ACKNOWLEDGMENT_MARKER.find(content) else {
        return format_text(content, 3);
    };

    let after = &content[marker.end()..];
    let body_len = after.find("\n\n").unwrap_or(after.len());
    let body = &after[..body_len];

    let mut remainder = String::with_capacity(content.len());
    remainder.push_str(&content[..marker.start()]);
    remainder.push_str(&after[body_len..]);

    let mut html = format_acknowledgment(body.trim());
    html.push_str(&format_text(&remainder, 3));
    html
}

pub fn format_acknowledgment(body: &str) -> String {
    format!(
        "<div class=\"acknowledgment\"><h3>{ACKNOWLEDGMENT_LABEL}</h3>{}</div>",
        body.replace('\n', "<br>")
    )
}

/// `###` markers become headings of the given level, newlines become breaks.
pub fn format_text(text: &str, heading_level: u8) -> String {
    let replacement = format!("<h{heading_level}>${{1}}</h{heading_level}>");
    HEADING_MARKER
        .replace_all(text, replacement.as_str())
        .replace('\n', "<br>")
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
#[path = "tests/format_tests.rs"]
mod tests;
