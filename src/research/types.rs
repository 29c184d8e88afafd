use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use super::planner::Depth;

/// One hit from the web search capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// A fetched page that was long enough to be worth synthesizing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceContent {
    pub url: String,
    pub title: String,
    pub body: String,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

// Models capitalize freely; only the word itself is checked.
impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            _ => Err(de::Error::unknown_variant(&raw, &["high", "medium", "low"])),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub finding: String,
    pub confidence: Confidence,
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question: String,
    pub answer: String,
    pub confidence: Confidence,
}

/// Multi-source synthesis returned by the completion capability. Every
/// structural field must be present; only the remark may be omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchSynthesis {
    pub executive_summary: String,
    pub key_findings: Vec<Finding>,
    pub answers: Vec<Answer>,
    pub consensus_view: String,
    pub controversial_points: Vec<String>,
    pub gaps: Vec<String>,
    pub bias_analysis: String,
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub ted_take: String,
}

/// Single-topic analysis returned by the completion capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchAnalysis {
    pub overview: String,
    pub key_questions: Vec<Answer>,
    pub perspectives: Vec<String>,
    pub skeptical_analysis: Vec<String>,
    pub suggested_queries: Vec<String>,
    #[serde(default)]
    pub ted_take: String,
}

/// Deterministic stand-in for [`ResearchAnalysis`] when no model answer is usable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchFramework {
    pub analysis_unavailable: bool,
    pub reason: String,
    pub suggested_queries: Vec<String>,
    pub questions: Vec<String>,
    pub skeptical_analysis: Vec<String>,
    pub methodology: Vec<String>,
}

/// Extractive digest of one gathered source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDigest {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
}

/// What a deep-research caller gets instead of a synthesis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisFallback {
    pub synthesis_unavailable: bool,
    pub reason: String,
    pub sources: Vec<SearchResult>,
    pub digests: Vec<SourceDigest>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisOutcome {
    Synthesized(ResearchSynthesis),
    Fallback(SynthesisFallback),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Analyzed(ResearchAnalysis),
    Framework(ResearchFramework),
}

// Request envelopes

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub url: Option<String>,
    pub text: Option<String>,
    pub max_length: Option<usize>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    pub topic: String,
    #[serde(default)]
    pub questions: Vec<String>,
    pub skeptical_mode: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepResearchRequest {
    pub topic: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub depth: Depth,
    #[serde(default)]
    pub focus_areas: Vec<String>,
}

// Response envelopes

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeResponse {
    pub success: bool,
    pub summary: String,
    pub key_points: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub original_word_count: usize,
    pub summary_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResponse {
    pub success: bool,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ResearchAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<ResearchFramework>,
    pub ted_take: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Methodology {
    pub search_queries: Vec<String>,
    pub sources_found: usize,
    pub sources_analyzed: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepResearchResponse {
    pub success: bool,
    pub topic: String,
    pub depth: Depth,
    pub methodology: Methodology,
    pub sources: Vec<SearchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<ResearchSynthesis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<SynthesisFallback>,
    pub ted_take: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
