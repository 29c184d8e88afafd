use tracing::info;

use crate::research::types::SummarizeRequest;
use crate::state::Context;

use super::{render, send_chunked, split_list};

/// Summarize a web page or a block of text
#[poise::command(slash_command)]
pub async fn summarize(
    ctx: Context<'_>,
    #[description = "Page to summarize"] url: Option<String>,
    #[description = "Text to summarize (instead of a URL)"] text: Option<String>,
    #[description = "Maximum summary length in characters (50-5000)"] max_length: Option<u32>,
    #[description = "Keywords to favor, separated by ;"] keywords: Option<String>,
) -> Result<(), anyhow::Error> {
    ctx.defer().await?;

    info!(user = ctx.author().name, url, "summarize requested");

    let response = ctx
        .data()
        .research
        .summarize(SummarizeRequest {
            url,
            text,
            max_length: max_length.map(|n| n as usize),
            keywords: split_list(keywords),
        })
        .await;

    send_chunked(&ctx, &render::summary(&response)).await
}
