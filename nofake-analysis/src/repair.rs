//! Turns whatever the oracle produced for one citation into a complete
//! [`Citation`]. Never fails: every missing or mistyped field gets a
//! placeholder.

use crate::format::format_citation;
use crate::model::{Citation, CitationStyle};
use crate::urls::{normalize_url, scholar_search_url};
use rand::Rng;
use serde_json::Value;

pub const UNKNOWN_AUTHOR: &str = "Autor desconocido";
pub const UNKNOWN_TITLE: &str = "Título no disponible";
pub const UNKNOWN_JOURNAL: &str = "Revista no disponible";
pub const UNKNOWN_DOI: &str = "No disponible";
pub const UNKNOWN_ABSTRACT: &str = "Resumen no disponible";
pub const UNKNOWN_RELEVANCE: &str = "Relevancia no especificada";
pub const UNKNOWN_FINDINGS: &str = "Hallazgos no especificados";
pub const DEFAULT_KIND: &str = "journal_article";

/// Non-empty trimmed string at `key`.
fn text_field<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// String list at `key`; a bare string is accepted as a one-element list.
fn list_field(raw: &Value, key: &str) -> Option<Vec<String>> {
    let items: Vec<String> = match raw.get(key)? {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => return None,
    };
    (!items.is_empty()).then_some(items)
}

fn year_field(raw: &Value) -> Option<i32> {
    match raw.get("year")? {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|y| *y > 0)
}

/// Repair the `index`-th citation candidate for `style`.
pub fn repair_citation<R: Rng + ?Sized>(
    raw: &Value,
    style: CitationStyle,
    index: usize,
    current_year: i32,
    rng: &mut R,
) -> Citation {
    let title = text_field(raw, "title").unwrap_or(UNKNOWN_TITLE).to_string();
    let doi = text_field(raw, "doi");

    let url = match text_field(raw, "url") {
        Some(u) => normalize_url(u, rng),
        None => match doi {
            Some(d) => normalize_url(&format!("https://doi.org/{d}"), rng),
            None => scholar_search_url(&title),
        },
    };

    let mut citation = Citation {
        authors: list_field(raw, "authors").unwrap_or_else(|| vec![UNKNOWN_AUTHOR.to_string()]),
        title,
        journal: text_field(raw, "journal").unwrap_or(UNKNOWN_JOURNAL).to_string(),
        year: year_field(raw).unwrap_or(current_year),
        doi: doi.unwrap_or(UNKNOWN_DOI).to_string(),
        url,
        abstract_text: text_field(raw, "abstract").unwrap_or(UNKNOWN_ABSTRACT).to_string(),
        kind: text_field(raw, "type").unwrap_or(DEFAULT_KIND).to_string(),
        formatted: String::new(),
        relevance: text_field(raw, "relevance").unwrap_or(UNKNOWN_RELEVANCE).to_string(),
        key_findings: list_field(raw, "keyFindings")
            .unwrap_or_else(|| vec![UNKNOWN_FINDINGS.to_string()]),
    };

    citation.formatted = match text_field(raw, "formatted") {
        Some(f) => f.to_string(),
        None => format_citation(style, &citation, index),
    };
    citation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{format_apa7, format_ieee};
    use crate::urls::is_allowed;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    fn assert_complete(c: &Citation) {
        assert!(!c.authors.is_empty() && c.authors.iter().all(|a| !a.is_empty()));
        for field in [
            &c.title,
            &c.journal,
            &c.doi,
            &c.url,
            &c.abstract_text,
            &c.kind,
            &c.formatted,
            &c.relevance,
        ] {
            assert!(!field.is_empty());
        }
        assert!(!c.key_findings.is_empty());
    }

    #[test]
    fn empty_object_is_fully_populated() {
        let c = repair_citation(&json!({}), CitationStyle::Apa7, 0, 2025, &mut rng());
        assert_complete(&c);
        assert_eq!(c.title, UNKNOWN_TITLE);
        assert_eq!(c.year, 2025);
        assert_eq!(c.kind, "journal_article");
        assert_eq!(c.authors, vec![UNKNOWN_AUTHOR.to_string()]);
        assert!(c.url.starts_with("https://scholar.google.com/scholar?q="));
        assert_eq!(c.formatted, format_apa7(&c));
    }

    #[test]
    fn non_object_input_is_treated_as_empty() {
        let c = repair_citation(&json!("texto suelto"), CitationStyle::Ieee, 1, 2025, &mut rng());
        assert_complete(&c);
        assert!(c.formatted.starts_with("[2] "));
    }

    #[test]
    fn well_formed_fields_are_kept() {
        let raw = json!({
            "authors": ["Chen, W.", "Liu, X. Y."],
            "title": "Meta-Analysis of sleep",
            "journal": "Nature Scientific Reports",
            "year": 2022,
            "doi": "10.1038/s41598-024-12345",
            "url": "https://www.nature.com/articles/s41598-024-12345",
            "abstract": "A systematic meta-analysis.",
            "type": "review",
            "formatted": "Chen, W. (2022). Oracle formatted.",
            "relevance": "Directamente relacionado",
            "keyFindings": ["uno", "dos"]
        });
        let c = repair_citation(&raw, CitationStyle::Apa7, 0, 2025, &mut rng());
        assert_eq!(c.year, 2022);
        assert_eq!(c.kind, "review");
        assert_eq!(c.url, "https://www.nature.com/articles/s41598-024-12345");
        assert_eq!(c.formatted, "Chen, W. (2022). Oracle formatted.");
        assert_eq!(c.key_findings.len(), 2);
    }

    #[test]
    fn mistyped_fields_get_placeholders() {
        let raw = json!({
            "authors": "Solo, A.",
            "title": 42,
            "year": "2019",
            "keyFindings": [1, 2, ""],
            "doi": "   "
        });
        let c = repair_citation(&raw, CitationStyle::Ieee, 0, 2025, &mut rng());
        assert_eq!(c.authors, vec!["Solo, A.".to_string()]);
        assert_eq!(c.title, UNKNOWN_TITLE);
        assert_eq!(c.year, 2019);
        assert_eq!(c.doi, UNKNOWN_DOI);
        assert_eq!(c.key_findings, vec![UNKNOWN_FINDINGS.to_string()]);
        assert_eq!(c.formatted, format_ieee(&c, 0));
    }

    #[test]
    fn url_is_synthesized_from_doi() {
        let raw = json!({ "doi": "10.1016/j.jas.2023.001" });
        let c = repair_citation(&raw, CitationStyle::Apa7, 0, 2025, &mut rng());
        assert_eq!(c.url, "https://doi.org/10.1016/j.jas.2023.001");
    }

    #[test]
    fn off_list_urls_are_normalized() {
        let raw = json!({ "url": "https://totally-real-journal.biz/paper/1" });
        let c = repair_citation(&raw, CitationStyle::Apa7, 0, 2025, &mut rng());
        assert!(is_allowed(&c.url));
    }
}
