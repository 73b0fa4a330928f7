//! Credibility scoring and citation generation for NoFake.
//!
//! Two request flows live here:
//!
//! - [`credibility::CredibilityService`] blends the oracle's credibility
//!   opinion with the local [`scorer`] and attaches fact-checking sources.
//! - [`citations::CitationService`] asks the oracle for academic citations,
//!   [`repair`]s every entry, keeps links on the [`urls`] allow-list and
//!   [`format`]s them as APA 7 or IEEE.
//!
//! Both degrade to purely local output when the oracle is missing or
//! answers with something unusable; neither ever fails on oracle problems.
//!
//! # Examples
//! ```
//! use nofake_analysis::{CredibilityService, CredibilityStatus, VerifyInput};
//! use serde_json::json;
//!
//! # tokio_test_block(async {
//! let service = CredibilityService::new(None);
//! let input = VerifyInput::from_json(&json!({ "content": "URGENTE: MILAGRO!!!!!!" })).unwrap();
//! let result = service.analyze(&input).await;
//! assert_ne!(result.status, CredibilityStatus::Verified);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```
pub mod citations;
pub mod credibility;
pub mod format;
pub mod links;
pub mod model;
pub mod prompts;
pub mod repair;
pub mod request;
pub mod scorer;
pub mod text;
pub mod urls;

pub use citations::CitationService;
pub use credibility::CredibilityService;
pub use links::{HttpLinkChecker, LinkChecker};
pub use model::{
    AnalysisDetail, AnalysisResult, Citation, CitationStyle, CitationsResult, CredibilityStatus,
    SourceCheck,
};
pub use request::{CitationRequest, VerifyInput};
