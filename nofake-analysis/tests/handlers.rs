use async_trait::async_trait;
use nofake_analysis::format::{format_apa7, format_ieee};
use nofake_analysis::urls::is_allowed;
use nofake_analysis::{
    CitationRequest, CitationService, CitationStyle, CredibilityService, CredibilityStatus,
    LinkChecker, VerifyInput,
};
use nofake_common::{NofakeError, Result};
use nofake_llm::traits::{LlmClient, LlmResponse};
use nofake_llm::SharedLlm;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Oracle that always answers with the same text, or always fails.
struct ScriptedLlm {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(
        &self,
        _prompt: &str,
        _system_prompt: Option<&str>,
        _max_tokens: Option<u32>,
        _temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(LlmResponse {
                text: text.clone(),
                model: Some("scripted".into()),
                tokens_used: None,
            }),
            Err(msg) => Err(NofakeError::Oracle(msg.clone())),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.reply.is_ok())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn shared(llm: Arc<ScriptedLlm>) -> Option<SharedLlm> {
    Some(llm as SharedLlm)
}

const URGENT_TEXT: &str = "URGENTE: cura milagrosa oculta por el gobierno!!!!!!";

fn verify(content: &str) -> VerifyInput {
    VerifyInput::from_json(&json!({ "content": content })).unwrap()
}

fn citations_req(topic: &str, format: &str) -> CitationRequest {
    CitationRequest::from_json(&json!({ "topic": topic, "format": format })).unwrap()
}

#[tokio::test]
async fn urgent_text_without_oracle_is_fake() {
    let result = CredibilityService::new(None).analyze(&verify(URGENT_TEXT)).await;

    // Heuristic 10 on both sides of the blend.
    assert_eq!(result.credibility_score, 10);
    assert_eq!(result.status, CredibilityStatus::Fake);
    assert_eq!(
        result.warnings,
        vec![
            "Análisis básico - IA no disponible".to_string(),
            "Patrones de texto sospechosos detectados".to_string(),
        ]
    );
    assert_eq!(result.analysis.bias_score, 30);
    assert_eq!(result.sources.len(), 3);
    assert!(result.sources.iter().all(|s| s.status != "verified"));
}

#[tokio::test]
async fn oracle_score_is_averaged_with_heuristic() {
    let llm = ScriptedLlm::answering(
        "Claro, aquí está:\n```json\n{\"credibilityScore\": 91, \"status\": \"fake\", \"biasScore\": 12, \
         \"sentiment\": \"positive\", \"factualClaims\": 4, \"verifiedClaims\": 3, \
         \"warnings\": [], \"reasoning\": \"Fuentes citadas\"}\n```",
    );
    let service = CredibilityService::new(shared(llm.clone()));
    let result = service
        .analyze(&verify("el ministerio publicó el informe anual."))
        .await;

    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    // (91 + 70) / 2 = 80.5 rounds to 81; the oracle's own status is ignored.
    assert_eq!(result.credibility_score, 81);
    assert_eq!(result.status, CredibilityStatus::Verified);
    assert_eq!(result.analysis.sentiment, "positive");
    assert_eq!(result.analysis.bias_score, 12);
    assert_eq!(result.analysis.reasoning, "Fuentes citadas");
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn unusable_oracle_answers_fall_back_locally() {
    for llm in [
        ScriptedLlm::failing("429"),
        ScriptedLlm::answering("No puedo responder a eso."),
        ScriptedLlm::answering("{\"credibilityScore\": \"alto\"}"),
    ] {
        let result = CredibilityService::new(shared(llm))
            .analyze(&verify("el ministerio publicó el informe anual."))
            .await;
        assert_eq!(result.credibility_score, 70);
        assert_eq!(result.status, CredibilityStatus::Verified);
        assert_eq!(result.warnings, vec!["Análisis básico - IA no disponible".to_string()]);
        assert_eq!(
            result.analysis.reasoning,
            "Análisis basado únicamente en patrones de texto locales"
        );
    }
}

#[tokio::test]
async fn out_of_range_oracle_score_is_clamped() {
    let llm = ScriptedLlm::answering("{\"credibilityScore\": 250}");
    let result = CredibilityService::new(shared(llm))
        .analyze(&verify("el ministerio publicó el informe anual."))
        .await;
    assert_eq!(result.credibility_score, 85);
    assert!(result.credibility_score <= 100);
}

#[tokio::test]
async fn no_oracle_yields_three_templated_citations() {
    let result = CitationService::new(None)
        .with_seed(Some(1))
        .generate(&citations_req("vacunas", "apa7"))
        .await;

    assert_eq!(result.citations.len(), 3);
    assert_eq!(result.format, CitationStyle::Apa7);
    assert_eq!(result.topic, "vacunas");
    assert_eq!(result.analyzed_text, "vacunas");
    assert_eq!(result.search_query, "vacunas");
    assert!(result.citations[0].title.contains("vacunas"));
    for c in &result.citations {
        assert_eq!(c.formatted, format_apa7(c));
        assert!(is_allowed(&c.url));
    }
}

#[tokio::test]
async fn parse_failure_yields_single_formatted_default() {
    let llm = ScriptedLlm::answering("Lo siento, no tengo referencias.");
    let req = CitationRequest::from_json(&json!({
        "topic": "clima",
        "format": "ieee",
        "analyzedText": "El calentamiento global acelera el deshielo en los Andes."
    }))
    .unwrap();
    let result = CitationService::new(shared(llm)).generate(&req).await;

    assert_eq!(result.citations.len(), 1);
    let c = &result.citations[0];
    assert!(c.title.contains("El calentamiento global acelera el deshielo en los"));
    assert_eq!(c.formatted, format_ieee(c, 0));
    assert!(c.formatted.starts_with("[1] "));
    assert!(!c.authors.is_empty() && !c.abstract_text.is_empty() && !c.doi.is_empty());
    assert_eq!(result.search_query, "clima calentamiento global acelera deshielo andes");
}

#[tokio::test]
async fn oracle_citations_are_repaired_and_kept_on_allow_list() {
    let llm = ScriptedLlm::answering(
        r#"```json
{
  "searchQuery": "sleep deprivation cognition",
  "citations": [
    {"authors": ["Walker, Matthew"], "title": "Why We Sleep", "journal": "Neuron",
     "year": 2017, "doi": "10.1016/j.neuron.2017.01.001",
     "url": "https://made-up-journal.example/why-we-sleep"},
    "not an object",
    {"title": "Sleep and memory", "url": "https://www.nature.com/articles/nrn2762"}
  ]
}
```"#,
    );
    let result = CitationService::new(shared(llm))
        .with_seed(Some(9))
        .generate(&citations_req("sueño", "ieee"))
        .await;

    assert_eq!(result.search_query, "sleep deprivation cognition");
    assert_eq!(result.citations.len(), 2);
    assert!(result.citations.iter().all(|c| is_allowed(&c.url)));
    assert_eq!(
        result.citations[0].formatted,
        "[1] M. Walker, \"Why We Sleep\", *Neuron*, 2017. doi: 10.1016/j.neuron.2017.01.001"
    );
    assert_eq!(result.citations[1].url, "https://www.nature.com/articles/nrn2762");
    assert!(result.citations[1].formatted.starts_with("[2] "));
}

#[tokio::test]
async fn bare_array_and_empty_list_are_handled() {
    let bare = ScriptedLlm::answering(r#"[{"title": "Solo título"}]"#);
    let result = CitationService::new(shared(bare))
        .generate(&citations_req("agua", "apa7"))
        .await;
    assert_eq!(result.citations.len(), 1);
    assert_eq!(result.citations[0].title, "Solo título");

    let empty = ScriptedLlm::answering(r#"{"citations": []}"#);
    let result = CitationService::new(shared(empty))
        .generate(&citations_req("agua", "apa7"))
        .await;
    assert_eq!(result.citations.len(), 1);
    assert!(result.citations[0].title.contains("agua"));
}

#[tokio::test]
async fn seeded_services_are_deterministic() {
    let answer = r#"{"citations": [{"title": "T", "url": "garbage"}]}"#;
    let a = CitationService::new(shared(ScriptedLlm::answering(answer)))
        .with_seed(Some(5))
        .generate(&citations_req("x", "apa7"))
        .await;
    let b = CitationService::new(shared(ScriptedLlm::answering(answer)))
        .with_seed(Some(5))
        .generate(&citations_req("x", "apa7"))
        .await;
    assert_eq!(a.citations, b.citations);
    assert!(a.citations[0].url.contains("/article/"));
}

struct NothingIsAlive;

#[async_trait]
impl LinkChecker for NothingIsAlive {
    async fn is_reachable(&self, _url: &str) -> bool {
        false
    }
}

#[tokio::test]
async fn link_checker_replaces_dead_links() {
    let result = CitationService::new(shared(ScriptedLlm::answering(
        r#"{"citations": [{"title": "Dead link", "url": "https://doi.org/10.9/none"}]}"#,
    )))
    .with_link_checker(Arc::new(NothingIsAlive))
    .generate(&citations_req("x", "apa7"))
    .await;
    assert_eq!(
        result.citations[0].url,
        "https://scholar.google.com/scholar?q=Dead+link"
    );
}
