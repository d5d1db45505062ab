//! Plain-text rendering of page panels for the terminal.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<h([2-4])>(.*?)</h[2-4]>").expect("heading pattern"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));

pub fn to_terminal(html: &str) -> String {
    let text = HEADING.replace_all(html, |caps: &Captures<'_>| {
        let title = caps[2].trim();
        match &caps[1] {
            "2" => format!("\n=== {title} ===\n"),
            "3" => format!("\n{title}\n"),
            _ => format!("\n  {title}\n"),
        }
    });
    let text = text.replace("<br>", "\n").replace("</div>", "\n");
    let text = TAG.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&");

    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        if line.is_empty() && lines.last().map_or(true, |last| last.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_breaks_become_lines() {
        let html = "<h2>Generated Content</h2><div class=\"generated-content\"><h3>Haiku</h3><br>Line1<br>Line2</div>";
        assert_eq!(
            to_terminal(html),
            "=== Generated Content ===\n\nHaiku\n\nLine1\nLine2"
        );
    }

    #[test]
    fn entities_are_decoded_and_blank_runs_collapse() {
        let html = "<h3>tags</h3>[<br>&nbsp;&nbsp;\"a\"<br>]<br><br><br><pre>x &amp; y</pre>";
        assert_eq!(to_terminal(html), "tags\n[\n  \"a\"\n]\n\nx & y");
    }
}
