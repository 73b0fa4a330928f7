//! Local citation formatting. Output depends only on the citation fields and
//! the list position, so the same input always renders the same string.

use crate::model::{Citation, CitationStyle};
use crate::repair::UNKNOWN_DOI;

/// A DOI worth linking; blanks and the placeholder render no suffix.
fn known_doi(c: &Citation) -> Option<&str> {
    let doi = c.doi.trim();
    (!doi.is_empty() && doi != UNKNOWN_DOI).then_some(doi)
}

/// `{authors} ({year}). {title}. *{journal}*. https://doi.org/{doi}`
///
/// Without a known DOI the citation ends after the journal.
///
/// ```
/// use nofake_analysis::format::format_apa7;
/// # use nofake_analysis::model::Citation;
/// # let c = Citation {
/// #     authors: vec!["Chen, W.".into(), "Liu, X. Y.".into()],
/// #     title: "Meta-Analysis".into(), journal: "Nature".into(), year: 2024,
/// #     doi: "10.1038/x".into(), url: String::new(), abstract_text: String::new(),
/// #     kind: String::new(), formatted: String::new(), relevance: String::new(),
/// #     key_findings: vec![],
/// # };
/// assert_eq!(
///     format_apa7(&c),
///     "Chen, W., Liu, X. Y. (2024). Meta-Analysis. *Nature*. https://doi.org/10.1038/x"
/// );
/// ```
pub fn format_apa7(c: &Citation) -> String {
    let head = format!(
        "{} ({}). {}. *{}*.",
        c.authors.join(", "),
        c.year,
        c.title,
        c.journal
    );
    match known_doi(c) {
        Some(doi) => format!("{head} https://doi.org/{doi}"),
        None => head,
    }
}

/// `[{index+1}] {G. Surname, ...}, "{title}", *{journal}*, {year}. doi: {doi}`
pub fn format_ieee(c: &Citation, index: usize) -> String {
    let authors = c
        .authors
        .iter()
        .map(|a| ieee_author(a))
        .collect::<Vec<_>>()
        .join(", ");
    let head = format!(
        "[{}] {}, \"{}\", *{}*, {}.",
        index + 1,
        authors,
        c.title,
        c.journal,
        c.year
    );
    match known_doi(c) {
        Some(doi) => format!("{head} doi: {doi}"),
        None => head,
    }
}

/// `"Surname, Given"` becomes `"G. Surname"`; any other shape is kept.
fn ieee_author(author: &str) -> String {
    let mut parts = author.split(", ");
    let surname = parts.next().unwrap_or_default();
    match parts.next().and_then(|given| given.chars().next()) {
        Some(initial) => format!("{initial}. {surname}"),
        None => author.to_string(),
    }
}

pub fn format_citation(style: CitationStyle, c: &Citation, index: usize) -> String {
    match style {
        CitationStyle::Apa7 => format_apa7(c),
        CitationStyle::Ieee => format_ieee(c, index),
    }
}
