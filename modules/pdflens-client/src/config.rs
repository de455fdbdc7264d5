use std::env;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
}

impl Config {
    /// Reads `PDFLENS_API_URL`, falling back to the local development backend.
    pub fn from_env() -> Self {
        Self::from_api_url(env::var("PDFLENS_API_URL").ok())
    }

    fn from_api_url(api_url: Option<String>) -> Self {
        let api_url = api_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self { api_url }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_api_url(None)
    }
}
