use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::AnalysisResult;

/// Partition every analysis is stored under.
pub const PARTITION_KEY: &str = "Analysis";

/// Flat entity written to the table store for each analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnalysisRecord {
    pub partition_key: String,
    pub row_key: String,
    pub original_text: String,
    pub word_count: u64,
    pub analyzed_at: String,
    pub full_analysis_json: String,
}

impl AnalysisRecord {
    /// Build a record with a fresh id and the current UTC time.
    pub fn new(text: &str, analysis: &AnalysisResult) -> serde_json::Result<Self> {
        Self::with_identity(Uuid::new_v4(), Utc::now(), text, analysis)
    }

    pub fn with_identity(
        id: Uuid,
        analyzed_at: DateTime<Utc>,
        text: &str,
        analysis: &AnalysisResult,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            partition_key: PARTITION_KEY.to_string(),
            row_key: id.to_string(),
            original_text: text.to_string(),
            word_count: analysis.word_count,
            analyzed_at: format_timestamp(analyzed_at),
            full_analysis_json: serde_json::to_string(analysis)?,
        })
    }
}

/// RFC 3339 with microseconds and a `Z` suffix; sorts lexically by time.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Entity as read back from the store.
///
/// Every column is optional: rows written by other tools, or by older
/// versions of this service, may lack any of them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StoredEntity {
    pub partition_key: Option<String>,
    pub row_key: Option<String>,
    pub original_text: Option<String>,
    pub word_count: Option<u64>,
    pub analyzed_at: Option<String>,
    pub full_analysis_json: Option<String>,
}

impl StoredEntity {
    /// The embedded analysis as stored, if present and valid JSON.
    ///
    /// The value is not checked against [`AnalysisResult`]: rows keep
    /// whatever shape they were written with.
    pub fn analysis(&self) -> Option<serde_json::Value> {
        let raw = self.full_analysis_json.as_deref()?;
        match serde_json::from_str(raw) {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                tracing::warn!(
                    row_key = self.row_key.as_deref().unwrap_or_default(),
                    error = %e,
                    "Stored analysis JSON could not be parsed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_mirrors_analysis() {
        let analysis = AnalysisResult::compute("Hello world");
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let record = AnalysisRecord::with_identity(Uuid::nil(), at, "Hello world", &analysis).unwrap();

        assert_eq!(record.partition_key, PARTITION_KEY);
        assert_eq!(record.row_key, Uuid::nil().to_string());
        assert_eq!(record.analyzed_at, "2024-03-01T12:30:00.000000Z");
        assert_eq!(record.word_count, 2);

        let embedded: AnalysisResult = serde_json::from_str(&record.full_analysis_json).unwrap();
        assert_eq!(embedded, analysis);
    }

    #[test]
    fn test_record_wire_names() {
        let analysis = AnalysisResult::compute("abc");
        let record = AnalysisRecord::new("abc", &analysis).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        for column in ["PartitionKey", "RowKey", "OriginalText", "WordCount", "AnalyzedAt", "FullAnalysisJson"] {
            assert!(json.get(column).is_some(), "missing {column}");
        }
    }

    #[test]
    fn test_stored_entity_tolerates_missing_columns() {
        let entity: StoredEntity = serde_json::from_str(r#"{"RowKey": "abc"}"#).unwrap();
        assert_eq!(entity.row_key.as_deref(), Some("abc"));
        assert!(entity.analyzed_at.is_none());
        assert!(entity.analysis().is_none());
    }

    #[test]
    fn test_stored_entity_keeps_partial_analysis() {
        let entity = StoredEntity {
            full_analysis_json: Some(r#"{"wordCount": 3, "sentiment": "neutral"}"#.to_string()),
            ..Default::default()
        };
        assert_eq!(
            entity.analysis(),
            Some(serde_json::json!({ "wordCount": 3, "sentiment": "neutral" }))
        );
    }

    #[test]
    fn test_stored_entity_rejects_malformed_analysis() {
        let entity = StoredEntity {
            full_analysis_json: Some("{not json".to_string()),
            ..Default::default()
        };
        assert!(entity.analysis().is_none());
    }
}
