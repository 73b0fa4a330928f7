//! HTTP front end for NoFake: credibility checks and citation suggestions.

use axum::{
    Router,
    http::Response,
    response::IntoResponse,
    routing::{get, post},
};
use nofake_analysis::{CitationService, CredibilityService, HttpLinkChecker};
use nofake_config::NofakeConfig;
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod error;

use error::ApiError;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub credibility: CredibilityService,
    pub citations: CitationService,
    /// Model answering oracle calls, `None` when running locally only.
    pub oracle_model: Option<String>,
}

impl AppState {
    pub fn new(
        credibility: CredibilityService,
        citations: CitationService,
        oracle_model: Option<String>,
    ) -> Self {
        Self {
            credibility,
            citations,
            oracle_model,
        }
    }

    /// Wire services from loaded configuration.
    pub fn from_config(cfg: &NofakeConfig) -> nofake_common::Result<Self> {
        let llm = nofake_llm::client_from_config(&cfg.llm_config())?;
        let (temperature, max_tokens) = cfg
            .llm
            .as_ref()
            .map(|s| s.generation())
            .unwrap_or_default();
        let oracle_model = llm.as_ref().map(|c| c.model_name().to_string());

        let credibility =
            CredibilityService::new(llm.clone()).with_generation(temperature, max_tokens);
        let mut citations = CitationService::new(llm)
            .with_generation(temperature, max_tokens)
            .with_seed(cfg.citations.seed);
        if cfg.citations.verify_urls {
            citations = citations.with_link_checker(Arc::new(HttpLinkChecker::new()?));
        }

        tracing::info!(
            oracle = oracle_model.as_deref().unwrap_or("none"),
            verify_urls = cfg.citations.verify_urls,
            seeded = cfg.citations.seed.is_some(),
            "server.state.ready"
        );
        Ok(Self::new(credibility, citations, oracle_model))
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response<axum::body::Body> {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}

/// Build application router
///
/// Analysis routes are served both at the root and under `/api`.
pub fn build_router(state: AppState) -> Router {
    let analysis = Router::new()
        .route("/verify", post(api::verify))
        .route("/citations", post(api::citations));

    Router::new()
        .merge(analysis.clone())
        .nest("/api", analysis)
        .route("/health", get(api::health))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
