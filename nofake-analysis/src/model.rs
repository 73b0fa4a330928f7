//! Wire types returned to HTTP callers. Field names follow the JSON contract
//! the browser client already consumes (camelCase).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall verdict for a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredibilityStatus {
    Verified,
    Suspicious,
    Fake,
    Unknown,
}

impl CredibilityStatus {
    /// ≥70 verified, ≤40 fake, anything between suspicious.
    pub fn from_score(score: u8) -> Self {
        match score {
            70.. => CredibilityStatus::Verified,
            0..=40 => CredibilityStatus::Fake,
            _ => CredibilityStatus::Suspicious,
        }
    }
}

/// One fact-checking site cross-reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCheck {
    pub name: String,
    pub status: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetail {
    pub sentiment: String,
    pub bias_score: u8,
    pub factual_claims: u32,
    pub verified_claims: u32,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub credibility_score: u8,
    pub status: CredibilityStatus,
    pub sources: Vec<SourceCheck>,
    pub analysis: AnalysisDetail,
    pub warnings: Vec<String>,
    /// Milliseconds spent producing this result.
    pub processing_time: u64,
}

/// Supported citation styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    Apa7,
    Ieee,
}

impl CitationStyle {
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw {
            "apa7" => Some(CitationStyle::Apa7),
            "ieee" => Some(CitationStyle::Ieee),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CitationStyle::Apa7 => "apa7",
            CitationStyle::Ieee => "ieee",
        }
    }

    /// Human label used inside prompts.
    pub fn label(self) -> &'static str {
        match self {
            CitationStyle::Apa7 => "APA 7ª edición",
            CitationStyle::Ieee => "IEEE",
        }
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully populated citation. Every field is non-empty once it has been
/// through [`crate::repair::repair_citation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub authors: Vec<String>,
    pub title: String,
    pub journal: String,
    pub year: i32,
    pub doi: String,
    pub url: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub formatted: String,
    pub relevance: String,
    pub key_findings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationsResult {
    pub citations: Vec<Citation>,
    pub format: CitationStyle,
    pub topic: String,
    pub analyzed_text: String,
    pub search_query: String,
    pub generated_at: String,
}
