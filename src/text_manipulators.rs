use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]").unwrap());
static WHITESPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}

/// Line breaks become spaces, then every whitespace run collapses to one space.
pub fn normalize_whitespace(text: &str) -> String {
    let single_line = LINE_BREAKS.replace_all(text, " ");
    WHITESPACE_RUNS.replace_all(&single_line, " ").into_owned()
}
