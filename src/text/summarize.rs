use serde::Serialize;

use super::sentences::{score_all, ScoredSentence};

const MAX_SENTENCES: usize = 5;
const MAX_KEY_POINTS: usize = 3;
const KEY_POINT_CHARS: usize = 100;
/// Room reserved per sentence for the `". "` joiner.
const SEPARATOR_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub summary_text: String,
    pub key_points: Vec<String>,
    pub word_count: usize,
}

/// Extractive summary of `text` in at most `max_length` characters.
///
/// Highest-scoring sentences are taken greedily (ties go to the earlier
/// sentence) until the budget or the five-sentence cap is hit, then put back
/// into source order. A sentence that does not fit is skipped; no attempt is
/// made to find a better-packing combination.
pub fn summarize(text: &str, max_length: usize, keywords: &[String]) -> SummaryResult {
    let word_count = text.split_whitespace().count();
    let mut ranked = score_all(text, keywords);

    if ranked.is_empty() {
        return SummaryResult {
            summary_text: take_chars(text, max_length),
            key_points: Vec::new(),
            word_count,
        };
    }

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.original_index.cmp(&b.original_index))
    });

    let key_points = ranked
        .iter()
        .take(MAX_KEY_POINTS)
        .map(|s| key_point(&s.text))
        .collect();

    let mut selected: Vec<&ScoredSentence> = Vec::new();
    let mut current_len = 0;
    for sentence in &ranked {
        if selected.len() >= MAX_SENTENCES {
            break;
        }
        let len = sentence.text.chars().count();
        if current_len + len + SEPARATOR_CHARS <= max_length {
            current_len += len + SEPARATOR_CHARS;
            selected.push(sentence);
        }
    }
    selected.sort_by_key(|s| s.original_index);

    SummaryResult {
        summary_text: join_sentences(&selected),
        key_points,
        word_count,
    }
}

fn join_sentences(sentences: &[&ScoredSentence]) -> String {
    let mut joined = sentences
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(". ");
    if !joined.is_empty() && !joined.ends_with(['.', '!', '?']) {
        joined.push('.');
    }
    joined
}

fn key_point(sentence: &str) -> String {
    if sentence.chars().count() > KEY_POINT_CHARS {
        format!("{}...", take_chars(sentence, KEY_POINT_CHARS))
    } else {
        sentence.to_string()
    }
}

fn take_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}
