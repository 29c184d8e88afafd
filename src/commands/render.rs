//! Markdown rendering of the research envelopes for Discord.

use crate::research::types::{
    Answer, Confidence, DeepResearchResponse, ResearchResponse, SummarizeResponse,
};

fn confidence_tag(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "🟢 high",
        Confidence::Medium => "🟡 medium",
        Confidence::Low => "🔴 low",
    }
}

fn bullets(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n**{}**\n", heading));
    for item in items {
        out.push_str(&format!("- {}\n", item));
    }
}

fn answers(out: &mut String, heading: &str, items: &[Answer]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n**{}**\n", heading));
    for a in items {
        out.push_str(&format!(
            "- **{}** ({})\n  {}\n",
            a.question,
            confidence_tag(a.confidence),
            a.answer
        ));
    }
}

fn source_label(url: &str) -> &str {
    url.trim_end_matches('/')
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or(url)
}

pub fn summary(response: &SummarizeResponse) -> String {
    if !response.success {
        return format!(
            "Could not summarize: {}",
            response.error.as_deref().unwrap_or("unknown error")
        );
    }

    let mut out = String::from("**Summary**\n");
    out.push_str(&response.summary);
    out.push('\n');
    bullets(&mut out, "Key points", &response.key_points);
    out.push_str(&format!(
        "\n_{} words in, {} characters out_",
        response.original_word_count, response.summary_length
    ));
    if let Some(url) = &response.source_url {
        out.push_str(&format!(" | [{}]({})", source_label(url), url));
    }
    out
}

pub fn research(response: &ResearchResponse) -> String {
    if !response.success {
        return format!(
            "Could not research: {}",
            response.error.as_deref().unwrap_or("unknown error")
        );
    }

    let mut out = format!("**Research: {}**\n", response.topic);
    if let Some(analysis) = &response.analysis {
        out.push_str(&analysis.overview);
        out.push('\n');
        answers(&mut out, "Key questions", &analysis.key_questions);
        bullets(&mut out, "Perspectives", &analysis.perspectives);
        bullets(&mut out, "Be skeptical of", &analysis.skeptical_analysis);
        bullets(&mut out, "Search next", &analysis.suggested_queries);
    } else if let Some(framework) = &response.framework {
        out.push_str(&format!("_{}_\n", framework.reason));
        bullets(&mut out, "Questions to answer", &framework.questions);
        bullets(&mut out, "Suggested searches", &framework.suggested_queries);
        bullets(&mut out, "Skeptical checks", &framework.skeptical_analysis);
        bullets(&mut out, "Method", &framework.methodology);
    }
    out.push_str(&format!("\n> **Ted's take:** {}", response.ted_take));
    out
}

pub fn deep(response: &DeepResearchResponse) -> String {
    if !response.success {
        return format!(
            "Could not research: {}",
            response.error.as_deref().unwrap_or("unknown error")
        );
    }

    let m = &response.methodology;
    let mut out = format!(
        "**Deep research: {}** ({} depth)\n_{} queries, {} sources found, {} analyzed_\n",
        response.topic,
        response.depth,
        m.search_queries.len(),
        m.sources_found,
        m.sources_analyzed
    );

    if let Some(s) = &response.synthesis {
        out.push_str(&format!("\n{}\n", s.executive_summary));
        if !s.key_findings.is_empty() {
            out.push_str("\n**Key findings**\n");
            for f in &s.key_findings {
                out.push_str(&format!("- {} ({})", f.finding, confidence_tag(f.confidence)));
                if !f.sources.is_empty() {
                    let links: Vec<String> = f
                        .sources
                        .iter()
                        .map(|u| format!("[{}]({})", source_label(u), u))
                        .collect();
                    out.push_str(&format!(" {}", links.join(" ")));
                }
                out.push('\n');
            }
        }
        answers(&mut out, "Answers", &s.answers);
        if !s.consensus_view.is_empty() {
            out.push_str(&format!("\n**Consensus**\n{}\n", s.consensus_view));
        }
        bullets(&mut out, "Contested", &s.controversial_points);
        bullets(&mut out, "Gaps", &s.gaps);
        if !s.bias_analysis.is_empty() {
            out.push_str(&format!("\n**Bias**\n{}\n", s.bias_analysis));
        }
        bullets(&mut out, "Recommendations", &s.recommendations);
    } else if let Some(fallback) = &response.fallback {
        out.push_str(&format!("\n_{}_\n", fallback.reason));
        for d in &fallback.digests {
            out.push_str(&format!("\n**[{}]({})**\n{}\n", d.title, d.url, d.summary));
        }
    }

    if !response.sources.is_empty() {
        out.push_str("\n**Sources**\n");
        for r in &response.sources {
            let title = if r.title.is_empty() {
                source_label(&r.url)
            } else {
                r.title.as_str()
            };
            out.push_str(&format!("- [{}]({})\n", title, r.url));
        }
    }

    out.push_str(&format!("\n> **Ted's take:** {}", response.ted_take));
    out
}
