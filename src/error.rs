use thiserror::Error;

/// Failures inside the research pipeline.
///
/// Only `Input` (and a failed fetch of a URL the user handed us) ever reach
/// the user as `success: false`; every other variant is absorbed by the
/// fail-soft call sites and turned into an empty or fallback value.
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("{0}")]
    Input(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Transport(String),

    #[error("{0} is not configured")]
    Unavailable(&'static str),

    #[error("could not decode model response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ResearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ResearchError::Timeout
        } else if let Some(status) = e.status() {
            ResearchError::Status(status.as_u16())
        } else {
            ResearchError::Transport(e.to_string())
        }
    }
}

pub type ResearchResult<T> = std::result::Result<T, ResearchError>;
