//! Model output sanitation
//!
//! The frontend renders answers as plain paragraphs; any markdown the
//! model sneaks past the prompt rules is stripped here rather than shown
//! as literal asterisks.

use regex_lite::Regex;

/// Flatten raw model output into one clean paragraph: no emphasis
/// markers, no heading markers, no leading bullets, no newlines.
pub fn clean_text_output(text: &str) -> String {
    let text = text.replace("**", "").replace("__", "");

    let headings = Regex::new(r"(?m)^\s*#+\s*").unwrap();
    let text = headings.replace_all(&text, "");

    let bullets = Regex::new(r"(?m)^\s*[*\-]\s+").unwrap();
    let text = bullets.replace_all(&text, "");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
