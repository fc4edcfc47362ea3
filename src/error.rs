use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::response::PrettyJson;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// `path` is the endpoint the caller used, echoed back in the usage example.
    #[error("No text provided")]
    MissingText { path: String },

    #[error("Database not configured")]
    StoreNotConfigured,

    #[error("{0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Guidance returned alongside a missing-text error.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub error: String,
    pub how_to_use: HowToUse,
}

#[derive(Debug, Serialize)]
pub struct HowToUse {
    pub option1: String,
    pub option2: String,
    pub example: String,
}

impl UsageResponse {
    pub fn missing_text(path: &str) -> Self {
        Self {
            error: "No text provided".to_string(),
            how_to_use: HowToUse {
                option1: "Add ?text=YourText to the URL".to_string(),
                option2: r#"Send a POST request with JSON body: {"text": "Your text here"}"#
                    .to_string(),
                example: format!("{path}?text=Hello world"),
            },
        }
    }
}

impl AnalyzerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalyzerError::MissingText { .. } => StatusCode::BAD_REQUEST,
            AnalyzerError::StoreNotConfigured | AnalyzerError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AnalyzerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            AnalyzerError::MissingText { ref path } => {
                (status, PrettyJson(UsageResponse::missing_text(path))).into_response()
            }
            AnalyzerError::StoreNotConfigured => {
                tracing::warn!("History requested but table storage is not configured");
                (status, PrettyJson(json!({ "error": self.to_string() }))).into_response()
            }
            AnalyzerError::Store(ref e) => {
                tracing::error!(error = %e, "Error retrieving history");
                (status, PrettyJson(json!({ "error": self.to_string() }))).into_response()
            }
        }
    }
}
