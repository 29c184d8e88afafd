use std::sync::Arc;

use crate::research::ResearchEngine;

pub struct AppState {
    pub research: Arc<ResearchEngine>,
}

pub type Context<'a> = poise::Context<'a, AppState, anyhow::Error>;
