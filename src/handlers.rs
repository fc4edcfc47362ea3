use axum::{
    body::Bytes,
    extract::{OriginalUri, Query, State},
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::analysis::{text_preview, AnalysisResult};
use crate::error::{AnalyzerError, Result};
use crate::history::{most_recent, parse_limit};
use crate::record::{format_timestamp, AnalysisRecord, PARTITION_KEY};
use crate::response::{
    AnalysisMetadata, AnalyzeResponse, HealthResponse, HistoryItem, HistoryResponse, PrettyJson,
};
use crate::store::{StoreHandle, StoreResult};

/// Shared application state
pub type SharedState = Arc<AppState>;

/// Application state holding the table store handle
pub struct AppState {
    pub store: StoreHandle,
}

impl AppState {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }
}

/// Query string as ordered pairs. Repeated keys are allowed; lookups take
/// the first occurrence.
pub type QueryPairs = Vec<(String, String)>;

/// First value for `name` in `params`.
pub fn first_param(params: &[(String, String)], name: &str) -> Option<String> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.clone())
}

/// Pick the text to analyze: a non-empty `text` query parameter wins,
/// otherwise the `text` string field of a JSON body.
pub fn resolve_text(query_text: Option<String>, body: &[u8]) -> Option<String> {
    if let Some(text) = query_text.filter(|text| !text.is_empty()) {
        return Some(text);
    }
    if body.is_empty() {
        return None;
    }

    let payload: Value = serde_json::from_slice(body).ok()?;
    payload
        .get("text")?
        .as_str()
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Analyze text and record the result
pub async fn text_analyzer(
    State(state): State<SharedState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<QueryPairs>,
    body: Bytes,
) -> Result<PrettyJson<AnalyzeResponse>> {
    tracing::info!("Text analyzer called");

    let text = resolve_text(first_param(&params, "text"), &body).ok_or_else(|| {
        AnalyzerError::MissingText {
            path: uri.path().to_string(),
        }
    })?;

    let analysis = AnalysisResult::compute(&text);
    let id = Uuid::new_v4();
    let now = Utc::now();

    // Persistence is best effort; the caller gets the analysis regardless
    match save_analysis(&state.store, id, now, &text, &analysis).await {
        Ok(true) => tracing::debug!(id = %id, "Saved analysis"),
        Ok(false) => tracing::debug!("Table storage not configured, analysis not saved"),
        Err(e) => tracing::error!(id = %id, error = %e, "Failed to save to table storage"),
    }

    Ok(PrettyJson(AnalyzeResponse {
        id: id.to_string(),
        metadata: AnalysisMetadata {
            analyzed_at: format_timestamp(now),
            text_preview: text_preview(&text),
        },
        original_text: text,
        analysis,
    }))
}

/// Returns `Ok(false)` when there is no store to write to.
async fn save_analysis(
    store: &StoreHandle,
    id: Uuid,
    at: chrono::DateTime<Utc>,
    text: &str,
    analysis: &AnalysisResult,
) -> StoreResult<bool> {
    let Some(store) = store.get().await else {
        return Ok(false);
    };

    let record = AnalysisRecord::with_identity(id, at, text, analysis)?;
    store.insert(&record).await?;
    Ok(true)
}

/// Most recent analyses, newest first
pub async fn analysis_history(
    State(state): State<SharedState>,
    Query(params): Query<QueryPairs>,
) -> Result<PrettyJson<HistoryResponse>> {
    tracing::info!("Analysis history requested");

    let store = state
        .store
        .get()
        .await
        .ok_or(AnalyzerError::StoreNotConfigured)?;

    let limit = parse_limit(first_param(&params, "limit").as_deref());
    let entities = store.query_partition(PARTITION_KEY).await?;
    let total = entities.len();

    let results: Vec<HistoryItem> = most_recent(entities, limit)
        .into_iter()
        .map(HistoryItem::from)
        .collect();

    tracing::debug!(limit, total, returned = results.len(), "History assembled");
    Ok(PrettyJson(HistoryResponse::new(results)))
}

/// Health check endpoint
pub async fn health_check(State(state): State<SharedState>) -> PrettyJson<HealthResponse> {
    let store_configured = state.store.get().await.is_some();
    PrettyJson(HealthResponse::healthy(store_configured))
}
