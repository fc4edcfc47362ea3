use serde_json::Value;

use crate::record::StoredEntity;
use crate::response::HistoryItem;

pub const DEFAULT_LIMIT: i64 = 10;

/// Parse the `limit` query value, falling back to [`DEFAULT_LIMIT`].
pub fn parse_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_LIMIT)
}

/// Newest-first slice of `entities`.
///
/// A negative `limit` drops that many of the oldest entries instead.
pub fn most_recent(mut entities: Vec<StoredEntity>, limit: i64) -> Vec<StoredEntity> {
    entities.sort_by(|a, b| {
        let a = a.analyzed_at.as_deref().unwrap_or_default();
        let b = b.analyzed_at.as_deref().unwrap_or_default();
        b.cmp(a)
    });

    let len = entities.len();
    let keep = if limit >= 0 {
        usize::try_from(limit).unwrap_or(usize::MAX).min(len)
    } else {
        let drop = usize::try_from(limit.unsigned_abs()).unwrap_or(usize::MAX);
        len.saturating_sub(drop)
    };
    entities.truncate(keep);
    entities
}

impl From<StoredEntity> for HistoryItem {
    fn from(entity: StoredEntity) -> Self {
        let analysis = entity
            .analysis()
            .unwrap_or_else(|| Value::Object(Default::default()));

        HistoryItem {
            id: entity.row_key,
            original_text: entity.original_text,
            analyzed_at: entity.analyzed_at,
            analysis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(row_key: &str, analyzed_at: Option<&str>) -> StoredEntity {
        StoredEntity {
            row_key: Some(row_key.to_string()),
            analyzed_at: analyzed_at.map(str::to_string),
            ..Default::default()
        }
    }

    fn ids(entities: &[StoredEntity]) -> Vec<&str> {
        entities.iter().filter_map(|e| e.row_key.as_deref()).collect()
    }

    fn sample() -> Vec<StoredEntity> {
        vec![
            entity("b", Some("2024-01-02T00:00:00.000000Z")),
            entity("none", None),
            entity("d", Some("2024-01-04T00:00:00.000000Z")),
            entity("a", Some("2024-01-01T00:00:00.000000Z")),
            entity("c", Some("2024-01-03T00:00:00.000000Z")),
        ]
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None), 10);
        assert_eq!(parse_limit(Some("3")), 3);
        assert_eq!(parse_limit(Some(" 7 ")), 7);
        assert_eq!(parse_limit(Some("abc")), 10);
        assert_eq!(parse_limit(Some("")), 10);
        assert_eq!(parse_limit(Some("2.5")), 10);
        assert_eq!(parse_limit(Some("-1")), -1);
    }

    #[test]
    fn test_most_recent_orders_descending() {
        let recent = most_recent(sample(), 10);
        assert_eq!(ids(&recent), vec!["d", "c", "b", "a", "none"]);
    }

    #[test]
    fn test_most_recent_truncates() {
        assert_eq!(ids(&most_recent(sample(), 2)), vec!["d", "c"]);
        assert!(most_recent(sample(), 0).is_empty());
    }

    #[test]
    fn test_negative_limit_drops_oldest() {
        assert_eq!(ids(&most_recent(sample(), -2)), vec!["d", "c", "b"]);
        assert!(most_recent(sample(), -50).is_empty());
    }

    #[test]
    fn test_history_item_from_entity() {
        let analysis = crate::analysis::AnalysisResult::compute("Hello world");
        let stored = StoredEntity {
            row_key: Some("id-1".to_string()),
            original_text: Some("Hello world".to_string()),
            analyzed_at: Some("2024-01-01T00:00:00.000000Z".to_string()),
            full_analysis_json: Some(serde_json::to_string(&analysis).unwrap()),
            ..Default::default()
        };

        let item = HistoryItem::from(stored);
        assert_eq!(item.id.as_deref(), Some("id-1"));
        assert_eq!(item.analysis["wordCount"], 2);
        assert_eq!(item.analysis["longestWord"], "Hello");
    }

    #[test]
    fn test_history_item_passes_through_stored_analysis() {
        let stored = StoredEntity {
            row_key: Some("id-3".to_string()),
            full_analysis_json: Some(r#"{"wordCount": 4, "extra": [1, 2]}"#.to_string()),
            ..Default::default()
        };

        let item = HistoryItem::from(stored);
        assert_eq!(item.analysis, serde_json::json!({ "wordCount": 4, "extra": [1, 2] }));
    }

    #[test]
    fn test_history_item_degrades_bad_analysis() {
        let stored = StoredEntity {
            row_key: Some("id-2".to_string()),
            full_analysis_json: Some("[1, 2".to_string()),
            ..Default::default()
        };

        let item = HistoryItem::from(stored);
        assert_eq!(item.analysis, serde_json::json!({}));
        assert!(item.original_text.is_none());
    }
}
