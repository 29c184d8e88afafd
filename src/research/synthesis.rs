use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::{ResearchError, ResearchResult};
use crate::llm::LlmClient;
use crate::text::summarize;

use super::planner::{plan, Depth};
use super::prompts;
use super::types::{
    AnalysisOutcome, ResearchAnalysis, ResearchFramework, ResearchSynthesis, SearchResult,
    SourceContent, SourceDigest, SynthesisFallback, SynthesisOutcome,
};

/// Body characters of each source embedded in the synthesis prompt.
pub const EXCERPT_CHARS: usize = 3_000;
/// Character budget of each per-source digest in the fallback payload.
pub const DIGEST_CHARS: usize = 300;

pub fn build_synthesis_prompt(
    topic: &str,
    questions: &[String],
    focus_areas: &[String],
    sources: &[SourceContent],
) -> String {
    let mut prompt = format!("Research topic: {}\n", topic);

    if !questions.is_empty() {
        prompt.push_str("\nQuestions to answer:\n");
        for (i, q) in questions.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, q));
        }
    }

    if !focus_areas.is_empty() {
        prompt.push_str(&format!("\nFocus areas: {}\n", focus_areas.join(", ")));
    }

    prompt.push_str(&format!("\n{} sources were retrieved:\n", sources.len()));
    for (i, source) in sources.iter().enumerate() {
        let excerpt: String = source.body.chars().take(EXCERPT_CHARS).collect();
        prompt.push_str(&format!(
            "\n--- Source {}: {} ---\nURL: {}\n{}\n",
            i + 1,
            source.title,
            source.url,
            excerpt
        ));
    }

    prompt.push_str(&format!(
        "\nRespond with a JSON object of exactly this shape:\n{}",
        prompts::SYNTHESIS_RESPONSE_SHAPE
    ));
    prompt
}

pub fn build_analysis_prompt(topic: &str, questions: &[String], skeptical: bool) -> String {
    let mut prompt = format!("Topic: {}\n", topic);
    if !questions.is_empty() {
        prompt.push_str("\nThe user specifically wants to know:\n");
        for q in questions {
            prompt.push_str(&format!("- {}\n", q));
        }
    }
    if skeptical {
        prompt.push_str(
            "\nBe skeptical: flag weak evidence, conflicts of interest and popular misconceptions.\n",
        );
    }
    prompt.push_str(&format!(
        "\nRespond with a JSON object of exactly this shape:\n{}",
        prompts::ANALYSIS_RESPONSE_SHAPE
    ));
    prompt
}

/// Return the first balanced `{...}` span of `raw`, skipping braces that
/// appear inside JSON string literals.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Decode and validate a synthesis. Anything short of a complete object is
/// a decode failure, never a partial result.
pub fn decode_synthesis(raw: &str) -> ResearchResult<ResearchSynthesis> {
    let json = extract_json_object(raw)
        .ok_or_else(|| ResearchError::Decode("no JSON object in response".to_string()))?;
    let synthesis: ResearchSynthesis =
        serde_json::from_str(json).map_err(|e| ResearchError::Decode(e.to_string()))?;

    if synthesis.executive_summary.trim().is_empty() {
        return Err(ResearchError::Decode("executiveSummary is empty".to_string()));
    }
    if synthesis.key_findings.iter().any(|f| f.finding.trim().is_empty()) {
        return Err(ResearchError::Decode("keyFindings contains an empty finding".to_string()));
    }
    if synthesis.answers.iter().any(|a| a.question.trim().is_empty()) {
        return Err(ResearchError::Decode("answers contains an empty question".to_string()));
    }

    Ok(synthesis)
}

pub fn decode_analysis(raw: &str) -> ResearchResult<ResearchAnalysis> {
    let json = extract_json_object(raw)
        .ok_or_else(|| ResearchError::Decode("no JSON object in response".to_string()))?;
    let analysis: ResearchAnalysis =
        serde_json::from_str(json).map_err(|e| ResearchError::Decode(e.to_string()))?;

    if analysis.overview.trim().is_empty() {
        return Err(ResearchError::Decode("overview is empty".to_string()));
    }

    Ok(analysis)
}

/// Ask the model to synthesize the gathered sources. Never fails: any
/// problem in the call/decode chain yields the fallback payload.
pub async fn synthesize(
    llm: &LlmClient,
    topic: &str,
    questions: &[String],
    focus_areas: &[String],
    results: &[SearchResult],
    sources: &[SourceContent],
) -> SynthesisOutcome {
    if sources.is_empty() {
        info!(topic, "no usable sources, skipping synthesis");
        return SynthesisOutcome::Fallback(synthesis_fallback(
            "No sources could be gathered for this topic",
            topic,
            results,
            sources,
        ));
    }

    let prompt = build_synthesis_prompt(topic, questions, focus_areas, sources);
    debug!(prompt_len = prompt.len(), sources = sources.len(), "requesting synthesis");

    let decoded = match llm.complete(prompts::SYNTHESIS_SYSTEM_PROMPT, &prompt).await {
        Ok(raw) => decode_synthesis(&raw),
        Err(e) => Err(e),
    };

    match decoded {
        Ok(synthesis) => {
            info!(
                topic,
                findings = synthesis.key_findings.len(),
                answers = synthesis.answers.len(),
                "synthesis complete"
            );
            SynthesisOutcome::Synthesized(synthesis)
        }
        Err(e) => {
            warn!(topic, error = %e, "synthesis unavailable, falling back to extractive digests");
            SynthesisOutcome::Fallback(synthesis_fallback(
                &format!("Synthesis unavailable: {}", e),
                topic,
                results,
                sources,
            ))
        }
    }
}

/// Ask the model for a single-topic analysis, falling back to the
/// template framework on any failure.
pub async fn analyze(
    llm: &LlmClient,
    topic: &str,
    questions: &[String],
    skeptical: bool,
) -> AnalysisOutcome {
    let prompt = build_analysis_prompt(topic, questions, skeptical);

    let decoded = match llm.complete(prompts::ANALYSIS_SYSTEM_PROMPT, &prompt).await {
        Ok(raw) => decode_analysis(&raw),
        Err(e) => Err(e),
    };

    match decoded {
        Ok(analysis) => {
            info!(topic, questions = analysis.key_questions.len(), "analysis complete");
            AnalysisOutcome::Analyzed(analysis)
        }
        Err(e) => {
            warn!(topic, error = %e, "analysis unavailable, returning research framework");
            AnalysisOutcome::Framework(research_framework(
                topic,
                questions,
                skeptical,
                &format!("AI analysis unavailable: {}", e),
            ))
        }
    }
}

/// Raw sources plus an extractive digest of every page that was fetched.
pub fn synthesis_fallback(
    reason: &str,
    topic: &str,
    results: &[SearchResult],
    sources: &[SourceContent],
) -> SynthesisFallback {
    let keywords = topic_keywords(topic);
    let digests = sources
        .iter()
        .map(|source| {
            let summary = summarize(&source.body, DIGEST_CHARS, &keywords);
            SourceDigest {
                url: source.url.clone(),
                title: source.title.clone(),
                summary: summary.summary_text,
                key_points: summary.key_points,
            }
        })
        .collect();

    SynthesisFallback {
        synthesis_unavailable: true,
        reason: reason.to_string(),
        sources: results.to_vec(),
        digests,
    }
}

/// Deterministic research plan for when no model is available.
pub fn research_framework(
    topic: &str,
    questions: &[String],
    skeptical: bool,
    reason: &str,
) -> ResearchFramework {
    let topic = topic.trim();
    let mut all_questions: Vec<String> = questions
        .iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();
    all_questions.extend(
        prompts::GENERIC_QUESTIONS
            .iter()
            .map(|q| q.replace("{topic}", topic)),
    );

    let skeptical_analysis = if skeptical {
        prompts::SKEPTICAL_CHECKS.iter().map(|s| s.to_string()).collect()
    } else {
        Vec::new()
    };

    ResearchFramework {
        analysis_unavailable: true,
        reason: reason.to_string(),
        suggested_queries: plan(topic, Depth::Deep, &[]),
        questions: all_questions,
        skeptical_analysis,
        methodology: prompts::FRAMEWORK_METHODOLOGY
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

/// Pick one canned remark.
pub fn pick_remark<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    prompts::TED_REMARKS
        .choose(rng)
        .copied()
        .unwrap_or(prompts::TED_REMARKS[0])
}

fn topic_keywords(topic: &str) -> Vec<String> {
    topic
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| w.chars().count() > 2)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::config::LlmConfig;
    use crate::research::testing::{serve, Reply};
    use crate::research::types::Confidence;

    const VALID: &str = r#"{
        "executiveSummary": "Widgets are mostly fine.",
        "keyFindings": [
            {"finding": "Widgets last ten years", "confidence": "high", "sources": ["https://a.test"]},
            {"finding": "Cheap widgets break {sometimes}", "confidence": "low"}
        ],
        "answers": [{"question": "Are widgets safe?", "answer": "Mostly.", "confidence": "medium"}],
        "consensusView": "Durable.",
        "controversialPoints": ["Pricing"],
        "gaps": [],
        "biasAnalysis": "Vendor heavy.",
        "recommendations": ["Buy mid-range"],
        "tedTake": "Ask who sells them."
    }"#;

    fn source(url: &str, body: &str) -> SourceContent {
        SourceContent {
            url: url.to_string(),
            title: format!("Title of {}", url),
            body: body.to_string(),
            fetched_at: Utc::now(),
        }
    }

    fn llm(base_url: &str, api_key: Option<&str>) -> LlmClient {
        LlmClient::new(&LlmConfig {
            base_url: base_url.to_string(),
            api_key: api_key.map(str::to_string),
            ..LlmConfig::default()
        })
        .unwrap()
    }

    fn completion_body(content: &str) -> String {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[test]
    fn test_extract_json_object_with_prose() {
        let raw = "Sure! Here you go:\n```json\n{\"a\": {\"b\": 1}}\n```\nAnything else? {\"c\": 2}";
        assert_eq!(extract_json_object(raw), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn test_extract_json_object_ignores_braces_in_strings() {
        let raw = r#"{"text": "a } and a \" { inside"} trailing"#;
        assert_eq!(
            extract_json_object(raw),
            Some(r#"{"text": "a } and a \" { inside"}"#)
        );
    }

    #[test]
    fn test_extract_json_object_unbalanced() {
        assert_eq!(extract_json_object("{\"a\": 1"), None);
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn test_decode_synthesis_valid() {
        let raw = format!("Here is the synthesis:\n{}\nHope that helps.", VALID);
        let synthesis = decode_synthesis(&raw).unwrap();
        assert_eq!(synthesis.executive_summary, "Widgets are mostly fine.");
        assert_eq!(synthesis.key_findings.len(), 2);
        assert_eq!(synthesis.key_findings[0].confidence, Confidence::High);
        assert!(synthesis.key_findings[1].sources.is_empty());
        assert_eq!(synthesis.answers[0].confidence, Confidence::Medium);
        assert_eq!(synthesis.ted_take, "Ask who sells them.");
    }

    #[test]
    fn test_decode_synthesis_rejects_unknown_confidence() {
        let raw = VALID.replace("\"low\"", "\"certain\"");
        assert!(matches!(decode_synthesis(&raw), Err(ResearchError::Decode(_))));
    }

    #[test]
    fn test_decode_synthesis_rejects_missing_summary() {
        let raw = r#"{"keyFindings": []}"#;
        assert!(matches!(decode_synthesis(raw), Err(ResearchError::Decode(_))));
        let raw = r#"{"executiveSummary": "  ", "keyFindings": []}"#;
        assert!(matches!(decode_synthesis(raw), Err(ResearchError::Decode(_))));
    }

    fn valid_without(field: &str) -> String {
        let mut value: serde_json::Value = serde_json::from_str(VALID).unwrap();
        value.as_object_mut().unwrap().remove(field);
        value.to_string()
    }

    #[test]
    fn test_decode_synthesis_rejects_partial_object() {
        let raw = r#"{"executiveSummary": "x", "keyFindings": []}"#;
        assert!(matches!(decode_synthesis(raw), Err(ResearchError::Decode(_))));

        for field in ["answers", "consensusView", "gaps", "biasAnalysis", "recommendations"] {
            match decode_synthesis(&valid_without(field)) {
                Err(ResearchError::Decode(msg)) => assert!(msg.contains(field), "{}", msg),
                other => panic!("expected decode error without {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_decode_synthesis_tolerates_missing_take() {
        let synthesis = decode_synthesis(&valid_without("tedTake")).unwrap();
        assert!(synthesis.ted_take.is_empty());
        assert_eq!(synthesis.recommendations, vec!["Buy mid-range"]);
    }

    #[test]
    fn test_decode_confidence_ignores_case() {
        let raw = VALID.replace("\"high\"", "\"High\"").replace("\"medium\"", "\" MEDIUM \"");
        let synthesis = decode_synthesis(&raw).unwrap();
        assert_eq!(synthesis.key_findings[0].confidence, Confidence::High);
        assert_eq!(synthesis.answers[0].confidence, Confidence::Medium);
        assert_eq!(
            serde_json::to_value(Confidence::High).unwrap(),
            serde_json::json!("high")
        );
    }

    #[test]
    fn test_decode_synthesis_rejects_wrong_shape() {
        let raw = r#"{"executiveSummary": "ok", "keyFindings": "none"}"#;
        assert!(matches!(decode_synthesis(raw), Err(ResearchError::Decode(_))));
    }

    #[test]
    fn test_decode_analysis() {
        let raw = r#"{"overview": "A thing.", "keyQuestions": [], "perspectives": ["fans"],
            "skepticalAnalysis": [], "suggestedQueries": ["thing history"]}"#;
        let analysis = decode_analysis(raw).unwrap();
        assert_eq!(analysis.overview, "A thing.");
        assert_eq!(analysis.suggested_queries, vec!["thing history"]);
        assert!(analysis.key_questions.is_empty());
        assert!(analysis.ted_take.is_empty());

        let partial = r#"{"overview": "A thing.", "suggestedQueries": ["thing history"]}"#;
        assert!(matches!(decode_analysis(partial), Err(ResearchError::Decode(_))));
        let blank = r#"{"overview": "", "keyQuestions": [], "perspectives": [],
            "skepticalAnalysis": [], "suggestedQueries": []}"#;
        assert!(decode_analysis(blank).is_err());
    }

    #[test]
    fn test_synthesis_prompt_embeds_capped_excerpts() {
        let long_body = "z".repeat(EXCERPT_CHARS + 500);
        let sources = vec![source("https://a.test", &long_body)];
        let prompt = build_synthesis_prompt(
            "widgets",
            &["Are they safe?".to_string()],
            &["durability".to_string()],
            &sources,
        );
        assert!(prompt.contains("Research topic: widgets"));
        assert!(prompt.contains("1. Are they safe?"));
        assert!(prompt.contains("Focus areas: durability"));
        assert!(prompt.contains("URL: https://a.test"));
        assert!(prompt.contains(&"z".repeat(EXCERPT_CHARS)));
        assert!(!prompt.contains(&"z".repeat(EXCERPT_CHARS + 1)));
    }

    #[test]
    fn test_research_framework_contents() {
        let framework = research_framework(
            "solar roofs",
            &["Do they pay off?".to_string()],
            true,
            "AI analysis unavailable",
        );
        assert!(framework.analysis_unavailable);
        assert_eq!(framework.questions[0], "Do they pay off?");
        assert_eq!(framework.questions.len(), 1 + prompts::GENERIC_QUESTIONS.len());
        assert!(framework.questions[1].contains("solar roofs"));
        assert_eq!(framework.suggested_queries[0], "solar roofs");
        assert!(framework.suggested_queries.len() <= Depth::Deep.query_cap());
        assert_eq!(framework.skeptical_analysis.len(), prompts::SKEPTICAL_CHECKS.len());

        let relaxed = research_framework("solar roofs", &[], false, "x");
        assert!(relaxed.skeptical_analysis.is_empty());
    }

    #[test]
    fn test_pick_remark_is_seedable() {
        let a = pick_remark(&mut StdRng::seed_from_u64(7));
        let b = pick_remark(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(prompts::TED_REMARKS.contains(&a));
    }

    #[test]
    fn test_fallback_digests_sources() {
        let body = "Solar panels convert sunlight into electricity using photovoltaic cells. \
            The key result is that efficiency has improved steadily for decades. \
            Installation costs have dropped sharply in most markets.";
        let results = vec![SearchResult {
            title: "Solar".to_string(),
            url: "https://a.test".to_string(),
            description: String::new(),
        }];
        let fallback =
            synthesis_fallback("no model", "solar panels", &results, &[source("https://a.test", body)]);
        assert!(fallback.synthesis_unavailable);
        assert_eq!(fallback.sources, results);
        assert_eq!(fallback.digests.len(), 1);
        assert!(!fallback.digests[0].summary.is_empty());
        assert!(fallback.digests[0].summary.chars().count() <= DIGEST_CHARS);
    }

    #[tokio::test]
    async fn test_synthesize_without_sources_skips_model() {
        let client = llm("http://127.0.0.1:1/v1", Some("key"));
        let outcome = synthesize(&client, "widgets", &[], &[], &[], &[]).await;
        match outcome {
            SynthesisOutcome::Fallback(f) => assert!(f.reason.contains("No sources")),
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_synthesize_without_key_falls_back() {
        let client = llm("http://127.0.0.1:1/v1", None);
        let sources = vec![source("https://a.test", &"text ".repeat(100))];
        let outcome = synthesize(&client, "widgets", &[], &[], &[], &sources).await;
        match outcome {
            SynthesisOutcome::Fallback(f) => {
                assert!(f.reason.contains("LLM_API_KEY"));
                assert_eq!(f.digests.len(), 1);
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_synthesize_decodes_model_answer() {
        let body = completion_body(&format!("```json\n{}\n```", VALID));
        let base = serve(move |_| Reply::json(&body)).await;
        let client = llm(&format!("{}/v1", base), Some("key"));
        let sources = vec![source("https://a.test", &"text ".repeat(100))];

        let outcome = synthesize(&client, "widgets", &[], &[], &[], &sources).await;
        match outcome {
            SynthesisOutcome::Synthesized(s) => assert_eq!(s.key_findings.len(), 2),
            other => panic!("expected synthesis, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_synthesize_garbage_answer_falls_back() {
        let body = completion_body("I'd rather not answer in JSON today.");
        let base = serve(move |_| Reply::json(&body)).await;
        let client = llm(&format!("{}/v1", base), Some("key"));
        let sources = vec![source("https://a.test", &"text ".repeat(100))];

        let outcome = synthesize(&client, "widgets", &[], &[], &[], &sources).await;
        assert!(matches!(outcome, SynthesisOutcome::Fallback(_)));
    }

    #[tokio::test]
    async fn test_analyze_model_error_returns_framework() {
        let base = serve(|_| Reply::status(503)).await;
        let client = llm(&format!("{}/v1", base), Some("key"));
        match analyze(&client, "widgets", &[], true).await {
            AnalysisOutcome::Framework(f) => assert!(f.reason.contains("HTTP 503")),
            other => panic!("expected framework, got {:?}", other),
        }
    }
}
