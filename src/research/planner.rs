use serde::{Deserialize, Serialize};

/// Effort level for a deep-research request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Depth {
    Quick,
    #[default]
    Standard,
    Deep,
}

impl Depth {
    /// Upper bound on planned search queries.
    pub fn query_cap(self) -> usize {
        match self {
            Depth::Quick => 2,
            Depth::Standard => 4,
            Depth::Deep => 6,
        }
    }

    /// Upper bound on deduplicated search results kept.
    pub fn result_cap(self) -> usize {
        match self {
            Depth::Quick => 5,
            Depth::Standard => 10,
            Depth::Deep => 20,
        }
    }

    /// How many of the kept results get their pages fetched.
    pub fn fetch_limit(self) -> usize {
        match self {
            Depth::Quick => 3,
            Depth::Standard => 5,
            Depth::Deep => 8,
        }
    }
}

impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Depth::Quick => write!(f, "quick"),
            Depth::Standard => write!(f, "standard"),
            Depth::Deep => write!(f, "deep"),
        }
    }
}

impl std::str::FromStr for Depth {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to `standard`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "quick" => Depth::Quick,
            "deep" | "exhaustive" => Depth::Deep,
            _ => Depth::Standard,
        })
    }
}

impl From<String> for Depth {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(depth) => depth,
            Err(never) => match never {},
        }
    }
}

/// Expand a topic into the search queries to issue, capped by depth.
///
/// Focus areas go right after the base query so that the cap trims the
/// generic expansions before anything the caller asked for.
pub fn plan(topic: &str, depth: Depth, focus_areas: &[String]) -> Vec<String> {
    let topic = topic.trim();
    let mut queries = vec![topic.to_string()];

    if depth != Depth::Quick {
        queries.extend(
            focus_areas
                .iter()
                .map(|f| f.trim())
                .filter(|f| !f.is_empty())
                .map(|f| format!("{} {}", topic, f)),
        );
    }

    queries.push(format!("{} overview", topic));
    queries.push(format!("{} explained", topic));

    if depth != Depth::Quick {
        queries.push(format!("{} criticism", topic));
        queries.push(format!("{} problems", topic));
    }

    let mut seen = std::collections::HashSet::new();
    queries.retain(|q| seen.insert(q.to_lowercase()));
    queries.truncate(depth.query_cap());
    queries
}
