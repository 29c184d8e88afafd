use tracing::info;

use crate::research::types::ResearchRequest;
use crate::state::Context;

use super::{render, send_chunked, split_list};

/// Lay out how to research a topic, skeptically
#[poise::command(slash_command)]
pub async fn research(
    ctx: Context<'_>,
    #[description = "Topic to research"] topic: String,
    #[description = "Questions to answer, separated by ;"] questions: Option<String>,
    #[description = "Include skeptical analysis (default: on)"] skeptical: Option<bool>,
) -> Result<(), anyhow::Error> {
    ctx.defer().await?;

    info!(user = ctx.author().name, topic, "research requested");

    let response = ctx
        .data()
        .research
        .research(ResearchRequest {
            topic,
            questions: split_list(questions),
            skeptical_mode: skeptical,
        })
        .await;

    send_chunked(&ctx, &render::research(&response)).await
}
