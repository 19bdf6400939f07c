//! Output formatting for query results.
//!
//! Supports human-readable terminal output and JSON for scripting. Search
//! hits serialize with their record fields flattened, so the JSON shape
//! matches the persisted metadata plus `score` and `matched_by`.

use madang_core::index::{embedding_text, SearchHit};
use serde::Serialize;

/// Maximum characters to show in a text snippet
const SNIPPET_MAX_LEN: usize = 200;

/// JSON output structure for query results
#[derive(Serialize)]
struct JsonOutput<'a> {
    query: &'a str,
    intent: &'a str,
    results: &'a [SearchHit],
}

/// Formats query results as JSON.
pub fn format_json(query: &str, intent: &str, hits: &[SearchHit]) -> String {
    let output = JsonOutput {
        query,
        intent,
        results: hits,
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Formats query results for human-readable terminal output.
pub fn format_human(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results found for \"{}\"", query);
    }

    let mut output = String::new();
    output.push_str(&format!(
        "Found {} result{} for \"{}\":\n\n",
        hits.len(),
        if hits.len() == 1 { "" } else { "s" },
        query
    ));

    for (i, hit) in hits.iter().enumerate() {
        output.push_str(&format!(
            "{}. {} (score: {:.2})\n",
            i + 1,
            hit.chunk.file_name,
            hit.score
        ));

        if !hit.matched_by.is_empty() {
            output.push_str(&format!("   [{}]\n", hit.matched_by.join(", ")));
        }

        let snippet = truncate_text(&embedding_text(&hit.chunk.fields), SNIPPET_MAX_LEN);
        if !snippet.is_empty() {
            output.push_str(&format!("   {}\n", snippet));
        }
        output.push('\n');
    }

    output.trim_end().to_string()
}

/// Truncates on a character boundary, appending an ellipsis when cut.
fn truncate_text(text: &str, max_chars: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= max_chars {
        return text;
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use madang_core::chunking::Chunk;
    use madang_core::index::IndexedChunk;

    fn hit(text: &str, score: f32, matched_by: &[&str]) -> SearchHit {
        let chunk = Chunk::with_text("regular", text);
        SearchHit {
            chunk: IndexedChunk {
                id: 0,
                file_name: "guide.pdf".to_string(),
                hash: "abc123".to_string(),
                fields: chunk.fields,
            },
            score,
            matched_by: matched_by.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_human_output_empty() {
        let out = format_human("시장 지원", &[]);
        assert!(out.contains("No results"));
        assert!(out.contains("시장 지원"));
    }

    #[test]
    fn test_human_output_lists_hits() {
        let hits = vec![hit("전통시장 활성화 지원", 0.91, &["semantic:law"])];
        let out = format_human("지원", &hits);

        assert!(out.contains("1. guide.pdf (score: 0.91)"));
        assert!(out.contains("[semantic:law]"));
        assert!(out.contains("전통시장 활성화 지원"));
    }

    #[test]
    fn test_json_output_flattens_fields() {
        let hits = vec![hit("본문", 1.0, &["csv.exact"])];
        let out = format_json("질문", "MERCHANT_DATA", &hits);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(parsed["intent"], "MERCHANT_DATA");
        assert_eq!(parsed["results"][0]["text"], "본문");
        assert_eq!(parsed["results"][0]["file_name"], "guide.pdf");
        assert_eq!(parsed["results"][0]["matched_by"][0], "csv.exact");
    }

    #[test]
    fn test_truncate_long_text() {
        let long: String = "가나다 ".repeat(100);
        let snippet = truncate_text(&long, 10);
        assert!(snippet.ends_with("..."));
        assert!(snippet.chars().count() <= 13);
    }
}
