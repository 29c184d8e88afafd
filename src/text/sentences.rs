use std::sync::LazyLock;

use regex::Regex;

static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+\s+").unwrap());

/// Candidates outside this character-length window are dropped as noise
/// (fragments, navigation crumbs, run-on boilerplate).
const MIN_SENTENCE_CHARS: usize = 15;
const MAX_SENTENCE_CHARS: usize = 500;

/// Discourse markers that tend to introduce the informative part of a text.
const INDICATORS: &[&str] = &[
    "important",
    "key",
    "significant",
    "main",
    "primary",
    "conclusion",
    "result",
    "finding",
    "therefore",
    "thus",
    "however",
    "although",
    "despite",
    "notably",
    "specifically",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSentence {
    pub text: String,
    pub score: f64,
    pub original_index: usize,
}

/// Split text into candidate sentences.
///
/// Splits on terminal punctuation followed by whitespace and keeps pieces
/// strictly between 15 and 500 characters. This is a noise filter, not a
/// linguistic sentence detector.
pub fn segment(text: &str) -> Vec<String> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| {
            let len = s.chars().count();
            len > MIN_SENTENCE_CHARS && len < MAX_SENTENCE_CHARS
        })
        .map(str::to_string)
        .collect()
}

/// Relevance score of one sentence at `index` out of `total`.
pub fn score(sentence: &str, index: usize, total: usize, keywords: &[String]) -> f64 {
    let lower = sentence.to_lowercase();
    let position = index as f64;
    let total = total as f64;

    let mut score = if position < 0.3 * total {
        2.0
    } else if position < 0.6 * total {
        1.0
    } else {
        0.5
    };

    let len = sentence.chars().count();
    if len > 50 && len < 200 {
        score += 1.0;
    }

    for keyword in keywords {
        let keyword = keyword.trim().to_lowercase();
        if !keyword.is_empty() && lower.contains(&keyword) {
            score += 1.5;
        }
    }

    for indicator in INDICATORS {
        score += 0.5 * lower.matches(indicator).count() as f64;
    }

    if sentence.contains('?') || sentence.starts_with(['"', '\u{201C}', '\'']) {
        score -= 0.5;
    }

    score
}

/// Segment and score in one pass.
pub fn score_all(text: &str, keywords: &[String]) -> Vec<ScoredSentence> {
    let sentences = segment(text);
    let total = sentences.len();
    sentences
        .into_iter()
        .enumerate()
        .map(|(i, text)| ScoredSentence {
            score: score(&text, i, total, keywords),
            text,
            original_index: i,
        })
        .collect()
}
