//! Local credibility heuristic over keyword and punctuation statistics.
//!
//! Used on every request, and on its own whenever the oracle is missing or
//! unusable.

/// Sensationalist markers, matched against the uppercased text.
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "URGENTE",
    "EXCLUSIVO",
    "BOMBAZO",
    "INCREÍBLE",
    "NO CREERÁS",
    "MÉDICOS ODIAN",
    "GOBIERNO OCULTA",
    "CONSPIRACIÓN",
    "SECRETO",
    "MILAGRO",
    "CURA DEFINITIVA",
    "ÉLITE",
    "ILLUMINATI",
];

const BASE_SCORE: i32 = 70;
const KEYWORD_PENALTY: i32 = 15;
const CAPS_RATIO_LIMIT: f64 = 0.1;
const CAPS_PENALTY: i32 = 20;
const EXCLAMATION_LIMIT: usize = 5;
const EXCLAMATION_PENALTY: i32 = 10;
const QUESTION_LIMIT: usize = 3;
const QUESTION_PENALTY: i32 = 5;

/// Score `text` in `0..=100`; higher reads as more credible.
///
/// ```
/// use nofake_analysis::scorer::heuristic_score;
///
/// assert_eq!(heuristic_score("el informe anual se publicó ayer."), 70);
/// assert!(heuristic_score("URGENTE!!! MILAGRO!!! SECRETO!!!") < 20);
/// ```
pub fn heuristic_score(text: &str) -> u8 {
    let upper = text.to_uppercase();
    let keyword_hits = SUSPICIOUS_KEYWORDS
        .iter()
        .filter(|kw| upper.contains(*kw))
        .count() as i32;

    let total_chars = text.chars().count();
    let caps = text.chars().filter(char::is_ascii_uppercase).count();
    let caps_ratio = if total_chars == 0 {
        0.0
    } else {
        caps as f64 / total_chars as f64
    };
    let exclamations = text.matches('!').count();
    let questions = text.matches('?').count();

    let mut score = BASE_SCORE - keyword_hits * KEYWORD_PENALTY;
    if caps_ratio > CAPS_RATIO_LIMIT {
        score -= CAPS_PENALTY;
    }
    if exclamations > EXCLAMATION_LIMIT {
        score -= EXCLAMATION_PENALTY;
    }
    if questions > QUESTION_LIMIT {
        score -= QUESTION_PENALTY;
    }

    score.clamp(0, 100) as u8
}

/// Rough claim counts from sentence pieces: `(factual, verified)`.
///
/// `pieces` is the number of `.`-separated fragments, so a single sentence
/// ending in a period counts as two.
pub fn claim_counts(text: &str) -> (u32, u32) {
    let pieces = text.split('.').count() as u32;
    (pieces / 2, pieces / 3)
}
