//! Ordered manifest patterns shared by the page scanning providers.

use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

pub const SOURCE_PATTERN: &str = r#"source:\s*['"]([^'"]+\.m3u8[^'"]*)['"]"#;
pub const FILE_PATTERN: &str = r#"file:\s*['"]([^'"]+\.m3u8[^'"]*)['"]"#;
pub const SRC_PATTERN: &str = r#"src:\s*['"]([^'"]+\.m3u8[^'"]*)['"]"#;
pub const QUOTED_PATTERN: &str = r#"['"]([^'"]*\.m3u8[^'"]*)['"]"#;

static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [SOURCE_PATTERN, FILE_PATTERN, SRC_PATTERN, QUOTED_PATTERN]
        .iter()
        .map(|x| Regex::new(x).unwrap())
        .collect()
});

/// First match of the highest priority pattern that matches anywhere in `text`.
pub fn find_manifest(text: &str) -> Option<&str> {
    PATTERNS
        .iter()
        .find_map(|re| re.captures(text).and_then(|x| x.get(1)))
        .map(|x| x.as_str())
}

/// Resolves a scanned url against the page it was found on.
pub fn absolute(page: &Url, found: &str) -> String {
    page.join(found)
        .map(|x| x.to_string())
        .unwrap_or_else(|_| found.to_owned())
}
