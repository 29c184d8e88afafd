use tracing::info;

use crate::research::planner::Depth;
use crate::research::types::DeepResearchRequest;
use crate::state::Context;

use super::{render, send_chunked, split_list};

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum DepthChoice {
    #[name = "quick"]
    Quick,
    #[name = "standard"]
    Standard,
    #[name = "deep"]
    Deep,
}

impl From<DepthChoice> for Depth {
    fn from(choice: DepthChoice) -> Self {
        match choice {
            DepthChoice::Quick => Depth::Quick,
            DepthChoice::Standard => Depth::Standard,
            DepthChoice::Deep => Depth::Deep,
        }
    }
}

/// Search the web, read the sources and synthesize what they say
#[poise::command(slash_command)]
pub async fn deep(
    ctx: Context<'_>,
    #[description = "Topic to research"] topic: String,
    #[description = "How far to dig (default: standard)"] depth: Option<DepthChoice>,
    #[description = "Questions to answer, separated by ;"] questions: Option<String>,
    #[description = "Angles to search, separated by ;"] focus: Option<String>,
) -> Result<(), anyhow::Error> {
    // Gathering and synthesis take a while; acknowledge first and ping when done
    let user_mention = format!("<@{}>", ctx.author().id);
    ctx.say(format!(
        "Digging into **{}**. I'll ping you when the report is ready, {}",
        topic, user_mention
    ))
    .await?;

    let depth = depth.map(Depth::from).unwrap_or_default();
    info!(user = ctx.author().name, topic, depth = %depth, "deep research requested");

    let response = ctx
        .data()
        .research
        .deep_research(DeepResearchRequest {
            topic,
            questions: split_list(questions),
            depth,
            focus_areas: split_list(focus),
        })
        .await;

    let full = format!("{} here's the report:\n\n{}", user_mention, render::deep(&response));
    send_chunked(&ctx, &full).await
}
