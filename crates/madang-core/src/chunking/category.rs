//! Two-level category outline parser.
//!
//! Parses documents laid out as a marker line followed by a content line:
//!
//! ```text
//! 1.
//! 시장 안내          <- title
//! A.
//! 전통시장이란       <- subtitle
//! i.
//! 정의               <- item text
//! (https://example.com)
//! ```
//!
//! Numeric markers (`1.`) start a new title and reset the subtitle, letter
//! markers (`A.`) set the subtitle, roman markers (`i.`) emit one record
//! from the following line, optionally consuming a parenthesized URL on the
//! line after that. Lines matching no marker are skipped.

use super::Chunk;
use regex::Regex;
use std::sync::LazyLock;

static TITLE_MARK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.$").expect("title mark pattern"));
static SUBTITLE_MARK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]\.$").expect("subtitle mark pattern"));
static ITEM_MARK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(i|ii|iii|iv|v|vi|vii|viii|ix|x)\.$").expect("item mark pattern")
});
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((https?://[^\)]+)\)").expect("url pattern"));

/// Parses a category outline into one chunk per leaf item.
///
/// A record carries the title and subtitle in effect when its item marker
/// appeared; headings not yet seen are recorded as JSON null, and a missing
/// URL as the empty string. Marker lines at end of input with no content
/// line are skipped.
pub fn parse_category(raw_text: &str) -> Vec<Chunk> {
    let lines: Vec<&str> = raw_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut chunks = Vec::new();
    let mut title: Option<&str> = None;
    let mut subtitle: Option<&str> = None;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if TITLE_MARK_RE.is_match(line) {
            if i + 1 < lines.len() {
                title = Some(lines[i + 1]);
                subtitle = None;
            }
            i += 2;
            continue;
        }

        if SUBTITLE_MARK_RE.is_match(line) {
            if i + 1 < lines.len() {
                subtitle = Some(lines[i + 1]);
            }
            i += 2;
            continue;
        }

        if ITEM_MARK_RE.is_match(line) {
            if i + 1 >= lines.len() {
                // dangling marker at end of input
                i += 1;
                continue;
            }
            let item_text = lines[i + 1];
            i += 2;

            let mut url = "";
            if i < lines.len() {
                if let Some(caps) = URL_RE.captures(lines[i]) {
                    url = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                    i += 1;
                }
            }

            if !item_text.is_empty() {
                let mut chunk = Chunk::new("category");
                match title {
                    Some(t) => chunk.set("title", t),
                    None => chunk.set_null("title"),
                }
                match subtitle {
                    Some(s) => chunk.set("subtitle", s),
                    None => chunk.set_null("subtitle"),
                }
                chunk.set("text", item_text);
                chunk.set("url", url);
                chunks.push(chunk);
            }
            continue;
        }

        i += 1;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_outline_with_url() {
        let text = "1.\n시장 안내\nA.\n전통시장이란\ni.\n정의\n(https://example.com)";
        let chunks = parse_category(text);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].strategy(), Some("category"));
        assert_eq!(chunks[0].get_str("title"), Some("시장 안내"));
        assert_eq!(chunks[0].get_str("subtitle"), Some("전통시장이란"));
        assert_eq!(chunks[0].get_str("text"), Some("정의"));
        assert_eq!(chunks[0].get_str("url"), Some("https://example.com"));
    }

    #[test]
    fn test_item_without_url() {
        let text = "1.\n제목\ni.\n내용\nii.\n다음 내용";
        let chunks = parse_category(text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].get_str("url"), Some(""));
        assert_eq!(chunks[1].get_str("text"), Some("다음 내용"));
    }

    #[test]
    fn test_new_title_resets_subtitle() {
        let text = "1.\n첫 제목\nA.\n부제목\ni.\n항목 하나\n2.\n둘째 제목\ni.\n항목 둘";
        let chunks = parse_category(text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].get_str("subtitle"), Some("부제목"));
        assert_eq!(chunks[1].get_str("title"), Some("둘째 제목"));
        assert!(chunks[1].fields.get("subtitle").unwrap().is_null());
    }

    #[test]
    fn test_item_before_any_heading_has_null_headings() {
        let text = "i.\n고아 항목";
        let chunks = parse_category(text);

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].fields.get("title").unwrap().is_null());
        assert!(chunks[0].fields.get("subtitle").unwrap().is_null());
        assert_eq!(chunks[0].get_str("text"), Some("고아 항목"));
    }

    #[test]
    fn test_dangling_marker_at_end_is_skipped() {
        let text = "1.\n제목\ni.";
        assert!(parse_category(text).is_empty());
    }

    #[test]
    fn test_roman_markers_case_insensitive() {
        let text = "1.\n제목\nIV.\n네 번째";
        let chunks = parse_category(text);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].get_str("text"), Some("네 번째"));
    }

    #[test]
    fn test_unmarked_lines_are_skipped() {
        let text = "머리말 잡음\n1.\n제목\n각주 잡음\ni.\n항목";
        let chunks = parse_category(text);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].get_str("title"), Some("제목"));
        assert_eq!(chunks[0].get_str("text"), Some("항목"));
    }
}
