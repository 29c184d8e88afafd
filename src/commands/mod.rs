mod deep;
mod render;
mod research;
mod summarize;

use crate::state::Context;

/// Discord message limit minus headroom for the mention prefix.
const CHUNK_CHARS: usize = 1990;

/// Ted - skeptical research assistant
#[poise::command(
    slash_command,
    subcommands("summarize::summarize", "research::research", "deep::deep")
)]
pub async fn ted(_ctx: Context<'_>) -> Result<(), anyhow::Error> {
    Ok(())
}

/// Send a message in Discord-safe chunks.
/// Uses ctx.say() for all chunks so follow-ups go through the interaction
/// webhook, which doesn't require Send Messages channel permission.
async fn send_chunked(ctx: &Context<'_>, text: &str) -> Result<(), anyhow::Error> {
    for chunk in split_chunks(text, CHUNK_CHARS) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

/// Split at the last newline (else space) before `max` characters.
fn split_chunks(text: &str, max: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let limit = remaining
            .char_indices()
            .nth(max)
            .map(|(i, _)| i)
            .unwrap_or(remaining.len());
        let split_at = if limit < remaining.len() {
            remaining[..limit]
                .rfind('\n')
                .or_else(|| remaining[..limit].rfind(' '))
                .map(|i| i + 1)
                .unwrap_or(limit)
        } else {
            limit
        };
        chunks.push(&remaining[..split_at]);
        remaining = &remaining[split_at..];
    }
    chunks
}

/// `"a; b ;;c"` → `["a", "b", "c"]`.
fn split_list(raw: Option<String>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
