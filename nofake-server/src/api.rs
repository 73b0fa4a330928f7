//! Request handlers.

use crate::AppState;
use crate::error::ApiResult;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use nofake_analysis::{AnalysisResult, CitationRequest, CitationsResult, VerifyInput};
use serde_json::{Value, json};

/// `POST /verify`
pub async fn verify(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<AnalysisResult>> {
    let Json(body) = body?;
    let input = VerifyInput::from_json(&body)?;
    tracing::debug!(
        content_chars = input.content.chars().count(),
        has_url = input.provided_url.is_some(),
        "verify.request"
    );
    Ok(Json(state.credibility.analyze(&input).await))
}

/// `POST /citations`
pub async fn citations(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<CitationsResult>> {
    let Json(body) = body?;
    let req = CitationRequest::from_json(&body)?;
    tracing::debug!(topic = %req.topic, style = %req.style, "citations.request");
    Ok(Json(state.citations.generate(&req).await))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "module": "nofake",
        "version": env!("CARGO_PKG_VERSION"),
        "oracle": state.oracle_model.as_deref(),
    }))
}
