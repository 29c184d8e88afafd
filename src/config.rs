use std::time::Duration;

const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Web search capability settings.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
}

/// Completion capability settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
}

/// Everything the research engine needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub search: SearchConfig,
    pub llm: LlmConfig,
    /// Per-page fetch timeout.
    pub fetch_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_LLM_MODEL.to_string(),
            max_tokens: 4000,
            temperature: 0.3,
            timeout: Duration::from_secs(120),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            llm: LlmConfig::default(),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Read settings from the process environment (and `.env`, if loaded).
    /// Blank keys count as missing.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let search = SearchConfig {
            api_key: non_empty_var("SEARCH_API_KEY"),
            endpoint: dotenv::var("SEARCH_ENDPOINT").unwrap_or(defaults.search.endpoint),
        };

        let llm = LlmConfig {
            base_url: dotenv::var("LLM_BASE_URL").unwrap_or(defaults.llm.base_url),
            api_key: non_empty_var("LLM_API_KEY"),
            model: dotenv::var("LLM_MODEL").unwrap_or(defaults.llm.model),
            max_tokens: parsed_var("LLM_MAX_TOKENS").unwrap_or(defaults.llm.max_tokens),
            temperature: parsed_var("LLM_TEMPERATURE").unwrap_or(defaults.llm.temperature),
            timeout: parsed_var("LLM_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.llm.timeout),
        };

        let fetch_timeout = parsed_var("FETCH_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.fetch_timeout);

        Self {
            search,
            llm,
            fetch_timeout,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    dotenv::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    dotenv::var(name).ok().and_then(|v| v.trim().parse().ok())
}
