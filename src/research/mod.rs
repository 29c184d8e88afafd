pub mod planner;
pub mod prompts;
pub mod search;
pub mod synthesis;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ResearchError, ResearchResult};
use crate::llm::LlmClient;
use crate::text;

use planner::plan;
use search::WebClient;
use synthesis::{analyze, pick_remark, synthesize};
use types::{
    AnalysisOutcome, DeepResearchRequest, DeepResearchResponse, Methodology, ResearchRequest,
    ResearchResponse, SummarizeRequest, SummarizeResponse, SynthesisOutcome,
};

pub const DEFAULT_MAX_LENGTH: usize = 500;
pub const MIN_MAX_LENGTH: usize = 50;
pub const MAX_MAX_LENGTH: usize = 5_000;
pub const MIN_TOPIC_CHARS: usize = 3;

/// Where a deep-research request is; every terminal stage is a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Planned,
    Searching,
    SourcesGathered,
    NoSources,
    Synthesized,
    SynthesisFallback,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Planned => "planned",
            Stage::Searching => "searching",
            Stage::SourcesGathered => "sources_gathered",
            Stage::NoSources => "no_sources",
            Stage::Synthesized => "synthesized",
            Stage::SynthesisFallback => "synthesis_fallback",
        };
        f.write_str(name)
    }
}

/// Entry point for the three request kinds. Holds no per-request state;
/// share it behind an `Arc`.
pub struct ResearchEngine {
    web: WebClient,
    llm: LlmClient,
    rng: Mutex<StdRng>,
}

impl ResearchEngine {
    pub fn new(config: &Config) -> ResearchResult<Self> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Deterministic remark selection.
    #[cfg(test)]
    pub fn with_seed(config: &Config, seed: u64) -> ResearchResult<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &Config, rng: StdRng) -> ResearchResult<Self> {
        Ok(Self {
            web: WebClient::new(config)?,
            llm: LlmClient::new(&config.llm)?,
            rng: Mutex::new(rng),
        })
    }

    pub fn search_available(&self) -> bool {
        self.web.search_available()
    }

    pub fn llm_available(&self) -> bool {
        self.llm.is_available()
    }

    fn remark(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        pick_remark(&mut *rng).to_string()
    }

    /// Extractive summary of supplied text or a fetched page.
    pub async fn summarize(&self, request: SummarizeRequest) -> SummarizeResponse {
        let max_length = request.max_length.unwrap_or(DEFAULT_MAX_LENGTH);
        let input = match validate_summarize(
            non_blank(request.url),
            non_blank(request.text),
            max_length,
        ) {
            Ok(input) => input,
            Err(e) => {
                return SummarizeResponse {
                    success: false,
                    error: Some(e.to_string()),
                    ..SummarizeResponse::default()
                }
            }
        };

        let (url, source_text) = match input {
            SummarizeInput::Url(url) => match self.web.fetch_page(&url).await {
                Ok(page) => (Some(url), page),
                Err(e) => {
                    warn!(url, error = %e, "summarize fetch failed");
                    return SummarizeResponse {
                        success: false,
                        error: Some(format!("Failed to fetch: {}", e)),
                        url: Some(url),
                        ..SummarizeResponse::default()
                    };
                }
            },
            SummarizeInput::Text(text) => (None, text),
        };

        let result = text::summarize(&source_text, max_length, &request.keywords);
        info!(
            source = url.as_deref().unwrap_or("text"),
            words = result.word_count,
            summary_len = result.summary_text.chars().count(),
            "summary produced"
        );

        SummarizeResponse {
            success: true,
            summary_length: result.summary_text.chars().count(),
            summary: result.summary_text,
            key_points: result.key_points,
            source_url: url,
            original_word_count: result.word_count,
            error: None,
            url: None,
        }
    }

    /// Single-topic research analysis without gathered sources.
    pub async fn research(&self, request: ResearchRequest) -> ResearchResponse {
        let topic = request.topic.trim().to_string();
        if let Err(e) = validate_topic(&topic) {
            return ResearchResponse {
                success: false,
                topic,
                analysis: None,
                framework: None,
                ted_take: String::new(),
                error: Some(e.to_string()),
            };
        }

        let skeptical = request.skeptical_mode.unwrap_or(true);
        info!(topic, skeptical, "research analysis started");

        match analyze(&self.llm, &topic, &request.questions, skeptical).await {
            AnalysisOutcome::Analyzed(mut analysis) => {
                let ted_take = if analysis.ted_take.trim().is_empty() {
                    self.remark()
                } else {
                    std::mem::take(&mut analysis.ted_take)
                };
                ResearchResponse {
                    success: true,
                    topic,
                    analysis: Some(analysis),
                    framework: None,
                    ted_take,
                    error: None,
                }
            }
            AnalysisOutcome::Framework(framework) => ResearchResponse {
                success: true,
                topic,
                analysis: None,
                framework: Some(framework),
                ted_take: self.remark(),
                error: None,
            },
        }
    }

    /// Plan → search → fetch → synthesize, degrading at every step.
    pub async fn deep_research(&self, request: DeepResearchRequest) -> DeepResearchResponse {
        let topic = request.topic.trim().to_string();
        let depth = request.depth;
        if let Err(e) = validate_topic(&topic) {
            return DeepResearchResponse {
                success: false,
                topic,
                depth,
                methodology: Methodology::default(),
                sources: Vec::new(),
                synthesis: None,
                fallback: None,
                ted_take: String::new(),
                error: Some(e.to_string()),
            };
        }

        let queries = plan(&topic, depth, &request.focus_areas);
        debug!(stage = %Stage::Planned, ?queries);
        info!(topic, depth = %depth, queries = queries.len(), "deep research started");

        debug!(stage = %Stage::Searching);
        let gathered = self.web.gather(&queries, depth).await;
        let stage = if gathered.sources.is_empty() {
            Stage::NoSources
        } else {
            Stage::SourcesGathered
        };
        debug!(
            stage = %stage,
            found = gathered.results.len(),
            analyzed = gathered.sources.len()
        );

        let methodology = Methodology {
            search_queries: queries,
            sources_found: gathered.results.len(),
            sources_analyzed: gathered.sources.len(),
        };

        let outcome = synthesize(
            &self.llm,
            &topic,
            &request.questions,
            &request.focus_areas,
            &gathered.results,
            &gathered.sources,
        )
        .await;

        let (synthesis, fallback, ted_take) = match outcome {
            SynthesisOutcome::Synthesized(mut synthesis) => {
                debug!(stage = %Stage::Synthesized);
                let ted_take = if synthesis.ted_take.trim().is_empty() {
                    self.remark()
                } else {
                    synthesis.ted_take.clone()
                };
                synthesis.ted_take = ted_take.clone();
                (Some(synthesis), None, ted_take)
            }
            SynthesisOutcome::Fallback(fallback) => {
                debug!(stage = %Stage::SynthesisFallback);
                (None, Some(fallback), self.remark())
            }
        };

        info!(
            topic,
            sources_found = methodology.sources_found,
            sources_analyzed = methodology.sources_analyzed,
            synthesized = synthesis.is_some(),
            "deep research complete"
        );

        DeepResearchResponse {
            success: true,
            topic,
            depth,
            methodology,
            sources: gathered.results,
            synthesis,
            fallback,
            ted_take,
            error: None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

enum SummarizeInput {
    Url(String),
    Text(String),
}

fn validate_summarize(
    url: Option<String>,
    text: Option<String>,
    max_length: usize,
) -> ResearchResult<SummarizeInput> {
    if !(MIN_MAX_LENGTH..=MAX_MAX_LENGTH).contains(&max_length) {
        return Err(ResearchError::Input(format!(
            "maxLength must be between {} and {}",
            MIN_MAX_LENGTH, MAX_MAX_LENGTH
        )));
    }
    match (url, text) {
        (None, None) => Err(ResearchError::Input(
            "Either url or text is required".to_string(),
        )),
        (Some(_), Some(_)) => Err(ResearchError::Input(
            "Provide either url or text, not both".to_string(),
        )),
        (Some(url), None) => {
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(SummarizeInput::Url(url))
            } else {
                Err(ResearchError::Input(
                    "url must start with http:// or https://".to_string(),
                ))
            }
        }
        (None, Some(text)) => Ok(SummarizeInput::Text(text)),
    }
}

fn validate_topic(topic: &str) -> ResearchResult<()> {
    if topic.chars().count() < MIN_TOPIC_CHARS {
        return Err(ResearchError::Input(format!(
            "Topic must be at least {} characters",
            MIN_TOPIC_CHARS
        )));
    }
    Ok(())
}
