//! Delimited row records.

use super::Chunk;
use crate::config::StrategyConfig;

/// Splits each non-blank line on `,` and builds one record per row from the
/// configured field-to-column mapping.
///
/// Columns past the end of a short row map to JSON null rather than being
/// dropped, so every record carries the full mapped field set. Records are
/// tagged `strategy = "csv"` with `page_no = "-"` since row data has no
/// page provenance. An absent mapping yields rows with only the tag fields.
pub fn chunk_column_record(text: &str, config: &StrategyConfig) -> Vec<Chunk> {
    let mapping = config.mapping.clone().unwrap_or_default();

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let columns: Vec<&str> = line.split(',').collect();
            let mut chunk = Chunk::new("csv");
            for (field, &idx) in &mapping {
                match columns.get(idx) {
                    Some(value) => chunk.set(field, value),
                    None => chunk.set_null(field),
                }
            }
            chunk.set("page_no", "-");
            chunk
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn config_with_mapping(pairs: &[(&str, usize)]) -> StrategyConfig {
        let mapping: BTreeMap<String, usize> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        StrategyConfig {
            strategy: Some("column_record".to_string()),
            mapping: Some(mapping),
            ..Default::default()
        }
    }

    #[test]
    fn test_maps_columns_to_fields() {
        let config = config_with_mapping(&[("가맹점코드", 0), ("가맹점명", 1)]);
        let chunks = chunk_column_record("M001,서울상회\nM002,부산상회", &config);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].get_str("가맹점코드"), Some("M001"));
        assert_eq!(chunks[0].get_str("가맹점명"), Some("서울상회"));
        assert_eq!(chunks[1].get_str("가맹점코드"), Some("M002"));
        assert_eq!(chunks[0].strategy(), Some("csv"));
        assert_eq!(chunks[0].get_str("page_no"), Some("-"));
    }

    #[test]
    fn test_short_row_fills_null() {
        let config = config_with_mapping(&[("code", 0), ("address", 5)]);
        let chunks = chunk_column_record("M001,서울상회", &config);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].get_str("code"), Some("M001"));
        assert!(chunks[0].fields.get("address").unwrap().is_null());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let config = config_with_mapping(&[("code", 0)]);
        let chunks = chunk_column_record("M001\n\n   \nM002", &config);

        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_no_mapping_yields_tag_only_records() {
        let config = StrategyConfig {
            strategy: Some("column_record".to_string()),
            ..Default::default()
        };
        let chunks = chunk_column_record("a,b,c", &config);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].strategy(), Some("csv"));
        assert!(chunks[0].get_str("a").is_none());
    }
}
