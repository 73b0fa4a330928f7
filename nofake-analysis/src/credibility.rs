//! Credibility analysis: oracle opinion blended with the local heuristic.

use crate::model::{AnalysisDetail, AnalysisResult, CredibilityStatus, SourceCheck};
use crate::prompts::credibility_prompt;
use crate::request::VerifyInput;
use crate::scorer::{claim_counts, heuristic_score};
use crate::text::prefix_chars;
use nofake_llm::extract::extract_json;
use nofake_llm::SharedLlm;
use serde_json::Value;
use std::time::Instant;

pub const FALLBACK_WARNING: &str = "Análisis básico - IA no disponible";
pub const SUSPICIOUS_PATTERNS_WARNING: &str = "Patrones de texto sospechosos detectados";
pub const LOCAL_REASONING: &str = "Análisis basado únicamente en patrones de texto locales";
pub const MISSING_REASONING: &str = "El modelo no proporcionó una explicación";

const DEFAULT_BIAS: u8 = 30;
const DEFAULT_SENTIMENT: &str = "neutral";
const SUSPICIOUS_HEURISTIC_BELOW: u8 = 40;
const SOURCE_QUERY_CHARS: usize = 50;

/// Per-request analysis before blending with the heuristic.
#[derive(Debug, Clone, PartialEq)]
struct Assessment {
    score: u8,
    bias: u8,
    sentiment: String,
    factual_claims: u32,
    verified_claims: u32,
    warnings: Vec<String>,
    reasoning: String,
}

impl Assessment {
    /// Pattern-only analysis used whenever the oracle cannot be trusted.
    fn local(content: &str) -> Self {
        let (factual_claims, verified_claims) = claim_counts(content);
        Self {
            score: heuristic_score(content),
            bias: DEFAULT_BIAS,
            sentiment: DEFAULT_SENTIMENT.to_string(),
            factual_claims,
            verified_claims,
            warnings: vec![FALLBACK_WARNING.to_string()],
            reasoning: LOCAL_REASONING.to_string(),
        }
    }

    /// Accepts oracle JSON only if it carries a numeric `credibilityScore`;
    /// everything else is clamped or defaulted.
    fn from_oracle(value: &Value, content: &str) -> Option<Self> {
        let score = clamp_percent(value.get("credibilityScore")?.as_f64()?);
        let (local_factual, local_verified) = claim_counts(content);

        let warnings = value
            .get("warnings")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|w| !w.trim().is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            score,
            bias: value
                .get("biasScore")
                .and_then(Value::as_f64)
                .map(clamp_percent)
                .unwrap_or(DEFAULT_BIAS),
            sentiment: non_empty(value, "sentiment").unwrap_or(DEFAULT_SENTIMENT).to_string(),
            factual_claims: count(value, "factualClaims").unwrap_or(local_factual),
            verified_claims: count(value, "verifiedClaims").unwrap_or(local_verified),
            warnings,
            reasoning: non_empty(value, "reasoning").unwrap_or(MISSING_REASONING).to_string(),
        })
    }
}

fn clamp_percent(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

fn non_empty<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn count(value: &Value, key: &str) -> Option<u32> {
    let n = value.get(key)?.as_f64()?;
    (n.is_finite() && n >= 0.0).then(|| n.floor().min(u32::MAX as f64) as u32)
}

/// Fact-checking cross references keyed off the final score.
pub fn fact_check_sources(content: &str, final_score: u8) -> Vec<SourceCheck> {
    let query: String =
        url::form_urlencoded::byte_serialize(prefix_chars(content, SOURCE_QUERY_CHARS).as_bytes())
            .collect();
    let pick = |ok: bool, yes: &str, no: &str| (if ok { yes } else { no }).to_string();

    vec![
        SourceCheck {
            name: "Snopes".into(),
            status: pick(final_score > 60, "verified", "disputed"),
            url: format!("https://snopes.com/search/?q={query}"),
        },
        SourceCheck {
            name: "FactCheck.org".into(),
            status: pick(final_score > 50, "fact-checked", "disputed"),
            url: format!("https://factcheck.org/search/?q={query}"),
        },
        SourceCheck {
            name: "PolitiFact".into(),
            status: pick(final_score > 55, "verified", "needs-verification"),
            url: format!("https://politifact.com/search/?q={query}"),
        },
    ]
}

/// Scores news content. Cheap to clone; shares the oracle handle.
#[derive(Clone, Default)]
pub struct CredibilityService {
    llm: Option<SharedLlm>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl CredibilityService {
    pub fn new(llm: Option<SharedLlm>) -> Self {
        Self {
            llm,
            ..Self::default()
        }
    }

    pub fn with_generation(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Analyze `input`. Oracle problems degrade to the local analysis and
    /// are never returned to the caller.
    pub async fn analyze(&self, input: &VerifyInput) -> AnalysisResult {
        let started = Instant::now();
        let content = input.content.as_str();

        let assessment = match self.ask_oracle(input).await {
            Some(a) => a,
            None => Assessment::local(content),
        };

        let heuristic = heuristic_score(content);
        let final_score =
            ((f64::from(assessment.score) + f64::from(heuristic)) / 2.0).round() as u8;
        let status = CredibilityStatus::from_score(final_score);

        let mut warnings = assessment.warnings;
        if heuristic < SUSPICIOUS_HEURISTIC_BELOW {
            warnings.push(SUSPICIOUS_PATTERNS_WARNING.to_string());
        }

        let processing_time = started.elapsed().as_millis() as u64;
        tracing::info!(
            final_score,
            heuristic,
            oracle_score = assessment.score,
            ?status,
            processing_ms = processing_time,
            "verify.completed"
        );

        AnalysisResult {
            credibility_score: final_score,
            status,
            sources: fact_check_sources(content, final_score),
            analysis: AnalysisDetail {
                sentiment: assessment.sentiment,
                bias_score: assessment.bias,
                factual_claims: assessment.factual_claims,
                verified_claims: assessment.verified_claims,
                reasoning: assessment.reasoning,
            },
            warnings,
            processing_time,
        }
    }

    async fn ask_oracle(&self, input: &VerifyInput) -> Option<Assessment> {
        let Some(llm) = self.llm.as_ref() else {
            tracing::debug!(reason = "no_oracle", "verify.oracle.fallback");
            return None;
        };

        let prompt = credibility_prompt(&input.content, input.provided_url.as_deref());
        let response = match llm
            .generate(
                &prompt,
                Some(llm.default_system_prompt()),
                self.max_tokens,
                self.temperature,
            )
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, reason = "oracle_error", "verify.oracle.fallback");
                return None;
            }
        };

        let extraction = extract_json(&response.text);
        let kind = extraction.kind();
        let Some(value) = extraction.into_value() else {
            tracing::warn!(extraction = kind, reason = "no_json", "verify.oracle.fallback");
            return None;
        };

        let assessment = Assessment::from_oracle(&value, &input.content);
        if assessment.is_none() {
            tracing::warn!(reason = "malformed", "verify.oracle.fallback");
        }
        assessment
    }
}
