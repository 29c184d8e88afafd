pub const SYNTHESIS_SYSTEM_PROMPT: &str = r#"You are Ted, a skeptical research analyst. You read several independently retrieved web sources and combine them into one honest, structured synthesis.

Rules:
- Ground every finding in the provided sources and cite their URLs.
- Label each finding and answer with a confidence of "high", "medium" or "low":
  high = several independent sources agree; medium = one solid source or partial agreement; low = thin, dated or contested evidence.
- Call out disagreement between sources instead of averaging it away.
- Point out what the sources do not cover.
- Note likely bias (commercial interest, advocacy, single-vendor sources).
- Answer with ONE JSON object and nothing else. No markdown fences."#;

pub const SYNTHESIS_RESPONSE_SHAPE: &str = r#"{
  "executiveSummary": "3-5 sentence overview",
  "keyFindings": [{"finding": "...", "confidence": "high|medium|low", "sources": ["https://..."]}],
  "answers": [{"question": "...", "answer": "...", "confidence": "high|medium|low"}],
  "consensusView": "what most sources agree on",
  "controversialPoints": ["..."],
  "gaps": ["..."],
  "biasAnalysis": "...",
  "recommendations": ["..."],
  "tedTake": "one blunt sentence"
}"#;

pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are Ted, a skeptical research analyst. Given a topic, lay out how to research it well: what it is, which questions matter, the main perspectives, and where claims about it deserve doubt.

Answer with ONE JSON object and nothing else. No markdown fences."#;

pub const ANALYSIS_RESPONSE_SHAPE: &str = r#"{
  "overview": "short neutral overview",
  "keyQuestions": [{"question": "...", "answer": "...", "confidence": "high|medium|low"}],
  "perspectives": ["..."],
  "skepticalAnalysis": ["..."],
  "suggestedQueries": ["..."],
  "tedTake": "one blunt sentence"
}"#;

/// Canned remarks used when the model did not supply one.
pub const TED_REMARKS: &[&str] = &[
    "Trust, but verify. Then verify the verification.",
    "If everyone agrees, somebody stopped reading early.",
    "Follow the money, then follow the footnotes.",
    "A confident tone is not a citation.",
    "The press release is not the study.",
    "Correlation walked into a bar. Causation was never seen again.",
    "Three blog posts quoting each other still count as one source.",
    "Extraordinary claims, ordinary evidence: pick one.",
];

/// Question templates; `{topic}` is substituted.
pub const GENERIC_QUESTIONS: &[&str] = &[
    "What is {topic}, and how is it usually defined?",
    "What are the strongest arguments in favor of {topic}?",
    "What are the main criticisms or known problems with {topic}?",
    "Who benefits from the popular narrative around {topic}?",
    "What does the most recent, independent evidence say about {topic}?",
];

pub const SKEPTICAL_CHECKS: &[&str] = &[
    "Check who funded or published each source before weighing it.",
    "Separate primary data from commentary about that data.",
    "Look for the date of each claim; stale numbers get repeated for years.",
    "Prefer sources that state their methodology and limitations.",
    "Treat unanimous agreement as a prompt to search for dissent.",
];

pub const FRAMEWORK_METHODOLOGY: &[&str] = &[
    "Run the suggested queries and collect at least three independent sources.",
    "Extract claims with their supporting evidence and publication date.",
    "Group claims into consensus, contested and unsupported.",
    "Answer each question, labeling confidence as high, medium or low.",
];
