//! Chunk-to-text projection for embedding.

use crate::chunking::Fields;
use serde_json::Value;

const LAW_KEYS: [&str; 5] = ["chapter", "section", "article", "clause", "title"];
const CATEGORY_KEYS: [&str; 3] = ["title", "subtitle", "url"];

/// Projects a chunk's fields to the single string that gets embedded.
///
/// Resolution order:
///
/// 1. a non-empty `text` field wins outright;
/// 2. if any statute key is present, the present string values among
///    `chapter`, `section`, `article`, `clause`, `title` joined with spaces
///    in that fixed order;
/// 3. if any category key is present, the present string values among
///    `title`, `subtitle`, `url` joined in that order;
/// 4. the longest string value in the record (first wins on ties);
/// 5. the canonical JSON serialization of the record.
///
/// Key *presence* triggers a branch even when the value is null; null
/// values simply contribute nothing to the join. The fallback serialization
/// is deterministic because field maps keep keys sorted, which the dedup
/// fingerprint relies on.
pub fn embedding_text(fields: &Fields) -> String {
    if let Some(Value::String(text)) = fields.get("text") {
        if !text.trim().is_empty() {
            return text.clone();
        }
    }

    if LAW_KEYS.iter().any(|k| fields.contains_key(*k)) {
        return join_string_values(fields, &LAW_KEYS);
    }

    if CATEGORY_KEYS.iter().any(|k| fields.contains_key(*k)) {
        return join_string_values(fields, &CATEGORY_KEYS);
    }

    let mut longest: Option<&str> = None;
    for value in fields.values() {
        if let Value::String(s) = value {
            if longest.map_or(true, |best| s.chars().count() > best.chars().count()) {
                longest = Some(s);
            }
        }
    }
    if let Some(s) = longest {
        return s.to_string();
    }

    serde_json::to_string(fields).unwrap_or_default()
}

fn join_string_values(fields: &Fields, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| fields.get(*k).and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Chunk;

    #[test]
    fn test_text_field_wins() {
        let mut chunk = Chunk::with_text("law", "조문 본문");
        chunk.set("article", "제5조");

        assert_eq!(embedding_text(&chunk.fields), "조문 본문");
    }

    #[test]
    fn test_blank_text_falls_through() {
        let mut chunk = Chunk::with_text("law", "   ");
        chunk.set("article", "제5조");
        chunk.set("title", "목적");

        assert_eq!(embedding_text(&chunk.fields), "제5조 목적");
    }

    #[test]
    fn test_law_keys_join_in_fixed_order() {
        let mut chunk = Chunk::new("law");
        chunk.set("title", "목적");
        chunk.set("chapter", "제1장 총칙");
        chunk.set("article", "제5조");
        chunk.fields.remove("strategy");
        chunk.fields.remove("text");

        assert_eq!(embedding_text(&chunk.fields), "제1장 총칙 제5조 목적");
    }

    #[test]
    fn test_law_branch_with_null_values() {
        let mut chunk = Chunk::new("law");
        chunk.set_null("chapter");
        chunk.set("article", "제5조");

        // null presence still selects the statute branch
        assert_eq!(embedding_text(&chunk.fields), "제5조");
    }

    #[test]
    fn test_category_keys_join() {
        let mut chunk = Chunk::new("category");
        chunk.set("subtitle", "전통시장이란");
        chunk.set("url", "https://example.com");
        chunk.fields.remove("strategy");

        // no law key present, so the category branch applies
        assert_eq!(
            embedding_text(&chunk.fields),
            "전통시장이란 https://example.com"
        );
    }

    #[test]
    fn test_longest_string_value() {
        let mut chunk = Chunk::new("csv");
        chunk.set("code", "M001");
        chunk.set("name", "서울중앙시장상회");

        assert_eq!(embedding_text(&chunk.fields), "서울중앙시장상회");
    }

    #[test]
    fn test_json_fallback_deterministic() {
        let mut chunk = Chunk::new("csv");
        chunk.fields.remove("strategy");
        chunk
            .fields
            .insert("count".to_string(), serde_json::json!(3));
        chunk.fields.insert("b".to_string(), serde_json::json!(1));

        let first = embedding_text(&chunk.fields);
        let second = embedding_text(&chunk.fields);
        assert_eq!(first, second);
        assert!(first.contains("\"count\":3"));
    }
}
